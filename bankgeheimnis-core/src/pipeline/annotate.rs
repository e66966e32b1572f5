//! Proximity annotator: nearest toilets and shops, street distance and
//! the smoking-restriction flag.
//!
//! Nearest-neighbour joins run against an r-tree over the target points
//! and return explicit target ids, never positional alignment. The tree
//! is local to this stage and dropped when it completes.

use geo::{Distance, Euclidean, Intersects, LineString, MultiLineString, MultiPolygon, Point};
use rayon::prelude::*;
use rstar::RTree;
use rstar::primitives::GeomWithData;

use crate::crs::{Crs, Projection};
use crate::geometry::{buffer_all, centroid_point};
use crate::model::{Bench, EnrichedBench, FeatureSet, RawFeature};
use crate::{Error, Result};

/// Buffer radius around smoking-restricted sources, metres. One metre
/// beyond the 100 m display threshold so the boundary case stays
/// unambiguous.
const SMOKING_BUFFER_M: f64 = 101.0;

type TargetTree = RTree<GeomWithData<Point<f64>, usize>>;

struct NearestHit {
    target: usize,
    distance: f64,
}

/// Dissolves the buffered smoking-restricted sources into one zone.
/// An empty source class yields an empty zone: every bench allowed.
pub fn smoking_zone(sources: &FeatureSet) -> Result<MultiPolygon<f64>> {
    sources.ensure_crs(Crs::Utm32N)?;
    let zone = buffer_all(
        sources.features.iter().map(|source| &source.geometry),
        SMOKING_BUFFER_M,
    );
    log::info!(
        "Smoking-restriction zone dissolved from {} sources into {} polygon(s)",
        sources.len(),
        zone.0.len()
    );
    Ok(zone)
}

/// Annotates every bench with its proximity fields in a single pure pass
/// per record. All inputs must already share the metric CRS.
pub fn annotate_benches(
    benches: &FeatureSet,
    toilets: &FeatureSet,
    shops: &FeatureSet,
    streets: &FeatureSet,
    smoking_zone: &MultiPolygon<f64>,
    projection: &Projection,
) -> Result<Vec<EnrichedBench>> {
    for set in [benches, toilets, shops, streets] {
        set.ensure_crs(Crs::Utm32N)?;
    }

    let candidates = bench_points(benches);
    let toilet_points = target_points(toilets);
    let (shop_points, shop_details) = shop_targets(shops);
    if toilet_points.is_empty() {
        return Err(Error::NoTargets("toilets"));
    }
    if shop_points.is_empty() {
        return Err(Error::NoTargets("shops"));
    }
    let street_union = surface_street_union(streets);
    if street_union.0.is_empty() {
        return Err(Error::NoTargets("surface streets"));
    }

    let toilet_tree = target_tree(&toilet_points);
    let shop_tree = target_tree(&shop_points);

    log::info!("Annotating {} benches", candidates.len());
    let enriched = candidates
        .par_iter()
        .map(|bench| {
            let toilet = nearest(&toilet_tree, bench.position)?;
            let shop = nearest(&shop_tree, bench.position)?;
            let shop_detail = &shop_details[shop.target];

            Ok(EnrichedBench {
                id: bench.id,
                position: bench.position,
                toilet_dist: toilet.distance,
                toilet_location: projection.to_geographic(&toilet_points[toilet.target]),
                shop_dist: shop.distance,
                shop_location: projection.to_geographic(&shop_points[shop.target]),
                shop_name: shop_detail.name.clone(),
                shop_opening_hours: shop_detail.opening_hours.clone(),
                street_dist: Euclidean.distance(&bench.position, &street_union),
                kiffen_erlaubt: !bench.position.intersects(smoking_zone),
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(enriched)
}

fn bench_points(benches: &FeatureSet) -> Vec<Bench> {
    benches
        .features
        .iter()
        .filter_map(|feature| match centroid_point(&feature.geometry) {
            Some(position) => Some(Bench {
                id: feature.id,
                position,
            }),
            None => {
                log::warn!("Bench {} has an empty geometry, skipping", feature.id);
                None
            }
        })
        .collect()
}

fn target_points(targets: &FeatureSet) -> Vec<Point<f64>> {
    targets
        .features
        .iter()
        .filter_map(|feature| centroid_point(&feature.geometry))
        .collect()
}

struct ShopDetail {
    name: Option<String>,
    opening_hours: Option<String>,
}

fn shop_targets(shops: &FeatureSet) -> (Vec<Point<f64>>, Vec<ShopDetail>) {
    shops
        .features
        .iter()
        .filter_map(|feature| {
            centroid_point(&feature.geometry).map(|point| {
                (
                    point,
                    ShopDetail {
                        name: feature.tag("name").map(str::to_string),
                        opening_hours: feature.tag("opening_hours").map(str::to_string),
                    },
                )
            })
        })
        .unzip()
}

/// Surface streets dissolved into one line set; distance to it carries
/// minimum-distance-to-set semantics without per-segment tie-breaking.
fn surface_street_union(streets: &FeatureSet) -> MultiLineString<f64> {
    let lines: Vec<LineString<f64>> = streets
        .features
        .iter()
        .filter(|street| street.surface_level())
        .flat_map(|street| street_lines(street))
        .collect();
    MultiLineString::new(lines)
}

fn street_lines(street: &RawFeature) -> Vec<LineString<f64>> {
    match &street.geometry {
        geo::Geometry::LineString(line) => vec![line.clone()],
        geo::Geometry::MultiLineString(lines) => lines.0.clone(),
        geo::Geometry::Line(line) => vec![LineString::from(vec![line.start, line.end])],
        geo::Geometry::Polygon(polygon) => std::iter::once(polygon.exterior())
            .chain(polygon.interiors())
            .cloned()
            .collect(),
        geo::Geometry::MultiPolygon(polygons) => polygons
            .iter()
            .flat_map(|polygon| {
                std::iter::once(polygon.exterior())
                    .chain(polygon.interiors())
                    .cloned()
            })
            .collect(),
        other => {
            log::debug!("Street {} has non-linear geometry {other:?}", street.id);
            vec![]
        }
    }
}

fn target_tree(points: &[Point<f64>]) -> TargetTree {
    RTree::bulk_load(
        points
            .iter()
            .enumerate()
            .map(|(index, point)| GeomWithData::new(*point, index))
            .collect(),
    )
}

fn nearest(tree: &TargetTree, origin: Point<f64>) -> Result<NearestHit> {
    tree.nearest_neighbor(&origin)
        .map(|hit| NearestHit {
            target: hit.data,
            distance: Euclidean.distance(&origin, hit.geom()),
        })
        .ok_or(Error::NoTargets("indexed points"))
}
