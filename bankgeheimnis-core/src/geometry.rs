//! Metric-plane geometry helpers: buffering, dissolving and centroids.
//!
//! All functions here assume their inputs are already in the projected
//! metric CRS; callers are responsible for the reprojection contract.

use geo::{
    BooleanOps, Centroid, ConvexHull, Coord, Geometry, LineString, MultiPoint, MultiPolygon, Point,
    Polygon,
};

/// Vertex count used to approximate a circle. High enough that the
/// inscribed-polygon sag stays below 0.13% of the radius.
const CIRCLE_SEGMENTS: usize = 64;

/// Reduces any geometry to a representative point: points pass through,
/// everything else collapses to its centroid.
pub fn centroid_point(geometry: &Geometry<f64>) -> Option<Point<f64>> {
    match geometry {
        Geometry::Point(point) => Some(*point),
        other => other.centroid(),
    }
}

/// Buffers an arbitrary geometry by `radius` metres and returns the area
/// covered, dissolved into a single multipolygon.
pub fn buffer(geometry: &Geometry<f64>, radius: f64) -> MultiPolygon<f64> {
    union_all(buffer_parts(geometry, radius))
}

/// Buffers every geometry in a collection and dissolves the result.
pub fn buffer_all<'a>(
    geometries: impl IntoIterator<Item = &'a Geometry<f64>>,
    radius: f64,
) -> MultiPolygon<f64> {
    let parts = geometries
        .into_iter()
        .flat_map(|geometry| buffer_parts(geometry, radius))
        .collect();
    union_all(parts)
}

/// Dissolves a set of multipolygons into one, merging pairwise so the
/// intermediate results stay small.
pub fn union_all(mut parts: Vec<MultiPolygon<f64>>) -> MultiPolygon<f64> {
    while parts.len() > 1 {
        parts = parts
            .chunks(2)
            .map(|pair| match pair {
                [a, b] => a.union(b),
                [a] => a.clone(),
                _ => unreachable!("chunks(2) yields one or two items"),
            })
            .collect();
    }
    parts
        .into_iter()
        .next()
        .unwrap_or_else(|| MultiPolygon::new(vec![]))
}

fn buffer_parts(geometry: &Geometry<f64>, radius: f64) -> Vec<MultiPolygon<f64>> {
    match geometry {
        Geometry::Point(point) => vec![MultiPolygon::new(vec![circle(point.0, radius)])],
        Geometry::MultiPoint(points) => points
            .iter()
            .map(|point| MultiPolygon::new(vec![circle(point.0, radius)]))
            .collect(),
        Geometry::Line(line) => vec![MultiPolygon::new(vec![capsule(
            line.start, line.end, radius,
        )])],
        Geometry::LineString(line) => buffer_line_string(line, radius),
        Geometry::MultiLineString(lines) => lines
            .iter()
            .flat_map(|line| buffer_line_string(line, radius))
            .collect(),
        Geometry::Polygon(polygon) => buffer_polygon(polygon, radius),
        Geometry::MultiPolygon(polygons) => polygons
            .iter()
            .flat_map(|polygon| buffer_polygon(polygon, radius))
            .collect(),
        Geometry::Rect(rect) => buffer_polygon(&rect.to_polygon(), radius),
        Geometry::Triangle(triangle) => buffer_polygon(&triangle.to_polygon(), radius),
        Geometry::GeometryCollection(collection) => collection
            .iter()
            .flat_map(|member| buffer_parts(member, radius))
            .collect(),
    }
}

fn buffer_line_string(line: &LineString<f64>, radius: f64) -> Vec<MultiPolygon<f64>> {
    if line.0.len() < 2 {
        return line
            .0
            .first()
            .map(|coord| vec![MultiPolygon::new(vec![circle(*coord, radius)])])
            .unwrap_or_default();
    }
    line.lines()
        .map(|segment| MultiPolygon::new(vec![capsule(segment.start, segment.end, radius)]))
        .collect()
}

fn buffer_polygon(polygon: &Polygon<f64>, radius: f64) -> Vec<MultiPolygon<f64>> {
    // The interior is covered by the polygon itself; the rim comes from
    // buffering every ring segment.
    let mut parts = vec![MultiPolygon::new(vec![polygon.clone()])];
    for ring in std::iter::once(polygon.exterior()).chain(polygon.interiors()) {
        parts.extend(buffer_line_string(ring, radius));
    }
    parts
}

fn circle(center: Coord<f64>, radius: f64) -> Polygon<f64> {
    let ring: Vec<Coord<f64>> = (0..CIRCLE_SEGMENTS)
        .map(|i| {
            let angle = std::f64::consts::TAU * i as f64 / CIRCLE_SEGMENTS as f64;
            Coord {
                x: center.x + radius * angle.cos(),
                y: center.y + radius * angle.sin(),
            }
        })
        .collect();
    Polygon::new(LineString::from(ring), vec![])
}

fn capsule(start: Coord<f64>, end: Coord<f64>, radius: f64) -> Polygon<f64> {
    let points: Vec<Point<f64>> = circle(start, radius)
        .exterior()
        .coords()
        .chain(circle(end, radius).exterior().coords())
        .map(|coord| Point::from(*coord))
        .collect();
    MultiPoint::new(points).convex_hull()
}

#[cfg(test)]
mod tests {
    use geo::{Intersects, line_string, point, polygon};

    use super::*;

    #[test]
    fn point_buffer_contains_nearby_point_and_boundary() {
        let bench = Geometry::Point(point!(x: 0.0, y: 0.0));
        let zone = buffer(&bench, 101.0);
        assert!(zone.intersects(&point!(x: 50.0, y: 0.0)));
        // The first circle vertex lies due east, exactly on the boundary;
        // touching the boundary counts as inside.
        assert!(zone.intersects(&point!(x: 101.0, y: 0.0)));
        assert!(!zone.intersects(&point!(x: 102.0, y: 0.0)));
    }

    #[test]
    fn segment_buffer_covers_offset_points() {
        let street = Geometry::LineString(line_string![
            (x: 0.0, y: 0.0),
            (x: 100.0, y: 0.0),
        ]);
        let zone = buffer(&street, 10.0);
        assert!(zone.intersects(&point!(x: 50.0, y: 9.0)));
        assert!(zone.intersects(&point!(x: -5.0, y: 0.0)));
        assert!(!zone.intersects(&point!(x: 50.0, y: 12.0)));
    }

    #[test]
    fn polygon_buffer_keeps_interior_and_grows_rim() {
        let yard = Geometry::Polygon(polygon![
            (x: 0.0, y: 0.0),
            (x: 100.0, y: 0.0),
            (x: 100.0, y: 100.0),
            (x: 0.0, y: 100.0),
        ]);
        let zone = buffer(&yard, 20.0);
        assert!(zone.intersects(&point!(x: 50.0, y: 50.0)));
        assert!(zone.intersects(&point!(x: 115.0, y: 50.0)));
        assert!(!zone.intersects(&point!(x: 125.0, y: 50.0)));
    }

    #[test]
    fn union_all_dissolves_overlapping_circles() {
        let parts = vec![
            MultiPolygon::new(vec![circle(Coord { x: 0.0, y: 0.0 }, 10.0)]),
            MultiPolygon::new(vec![circle(Coord { x: 5.0, y: 0.0 }, 10.0)]),
        ];
        let dissolved = union_all(parts);
        assert_eq!(dissolved.0.len(), 1);
    }

    #[test]
    fn union_all_of_nothing_is_empty() {
        assert!(union_all(vec![]).0.is_empty());
    }

    #[test]
    fn centroid_point_passes_points_through() {
        let bench = Geometry::Point(point!(x: 3.0, y: 4.0));
        assert_eq!(centroid_point(&bench), Some(point!(x: 3.0, y: 4.0)));

        let slab = Geometry::Polygon(polygon![
            (x: 0.0, y: 0.0),
            (x: 2.0, y: 0.0),
            (x: 2.0, y: 2.0),
            (x: 0.0, y: 2.0),
        ]);
        let center = centroid_point(&slab).unwrap();
        assert!((center.x() - 1.0).abs() < 1e-12);
        assert!((center.y() - 1.0).abs() < 1e-12);
    }
}
