//! The fixed tag taxonomy that partitions raw features into typed classes.

use crate::model::feature::RawFeature;

/// Shop kinds that count as bench-relevant supply.
pub const SHOP_KINDS: &[&str] = &["convenience", "supermarket", "kiosk", "alcohol"];

/// Major road classes considered for street distance.
pub const MAJOR_HIGHWAYS: &[&str] = &[
    "primary",
    "secondary",
    "tertiary",
    "motorway",
    "trunk",
    "primary_link",
    "secondary_link",
    "tertiary_link",
    "motorway_link",
    "trunk_link",
];

/// Tag keys whose union drives the single bulk feature download.
pub const QUERY_KEYS: &[&str] = &[
    "amenity",
    "shop",
    "leisure",
    "highway",
    "public_transport",
    "railway",
];

/// Feature classes of the pipeline. A feature may match several classes;
/// each predicate is evaluated independently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FeatureClass {
    Bench,
    Toilet,
    Shop,
    SmokingRestricted,
    Street,
    Platform,
}

impl FeatureClass {
    pub const ALL: [FeatureClass; 6] = [
        FeatureClass::Bench,
        FeatureClass::Toilet,
        FeatureClass::Shop,
        FeatureClass::SmokingRestricted,
        FeatureClass::Street,
        FeatureClass::Platform,
    ];

    pub fn matches(self, feature: &RawFeature) -> bool {
        match self {
            FeatureClass::Bench => feature.tag("amenity") == Some("bench"),
            FeatureClass::Toilet => feature.tag("amenity") == Some("toilets"),
            FeatureClass::Shop => feature
                .tag("shop")
                .is_some_and(|value| SHOP_KINDS.contains(&value)),
            FeatureClass::SmokingRestricted => {
                matches!(feature.tag("amenity"), Some("kindergarten" | "school"))
                    || matches!(feature.tag("leisure"), Some("playground" | "schoolyard"))
            }
            FeatureClass::Street => feature
                .tag("highway")
                .is_some_and(|value| MAJOR_HIGHWAYS.contains(&value)),
            FeatureClass::Platform => {
                feature.tag("public_transport") == Some("platform")
                    || feature.tag("highway") == Some("bus_stop")
                    || feature.tag("railway") == Some("platform")
            }
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            FeatureClass::Bench => "benches",
            FeatureClass::Toilet => "toilets",
            FeatureClass::Shop => "shops",
            FeatureClass::SmokingRestricted => "smoking-restricted sources",
            FeatureClass::Street => "streets",
            FeatureClass::Platform => "platforms",
        }
    }
}

#[cfg(test)]
mod tests {
    use geo::{Geometry, point};
    use hashbrown::HashMap;

    use super::*;

    fn feature(tags: &[(&str, &str)]) -> RawFeature {
        RawFeature {
            id: 0,
            geometry: Geometry::Point(point!(x: 0.0, y: 0.0)),
            tags: tags
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect::<HashMap<_, _>>(),
        }
    }

    #[test]
    fn benches_and_toilets_split_on_amenity() {
        let bench = feature(&[("amenity", "bench")]);
        let toilet = feature(&[("amenity", "toilets")]);
        assert!(FeatureClass::Bench.matches(&bench));
        assert!(!FeatureClass::Toilet.matches(&bench));
        assert!(FeatureClass::Toilet.matches(&toilet));
    }

    #[test]
    fn only_listed_shop_kinds_match() {
        assert!(FeatureClass::Shop.matches(&feature(&[("shop", "kiosk")])));
        assert!(FeatureClass::Shop.matches(&feature(&[("shop", "supermarket")])));
        assert!(!FeatureClass::Shop.matches(&feature(&[("shop", "furniture")])));
    }

    #[test]
    fn smoking_restriction_comes_from_amenity_or_leisure() {
        assert!(FeatureClass::SmokingRestricted.matches(&feature(&[("amenity", "school")])));
        assert!(FeatureClass::SmokingRestricted.matches(&feature(&[("leisure", "playground")])));
        assert!(!FeatureClass::SmokingRestricted.matches(&feature(&[("leisure", "park")])));
    }

    #[test]
    fn street_class_includes_link_roads_but_not_stops() {
        assert!(FeatureClass::Street.matches(&feature(&[("highway", "primary")])));
        assert!(FeatureClass::Street.matches(&feature(&[("highway", "motorway_link")])));
        assert!(!FeatureClass::Street.matches(&feature(&[("highway", "bus_stop")])));
        assert!(!FeatureClass::Street.matches(&feature(&[("highway", "residential")])));
    }

    #[test]
    fn platforms_match_any_of_three_tags() {
        assert!(FeatureClass::Platform.matches(&feature(&[("public_transport", "platform")])));
        assert!(FeatureClass::Platform.matches(&feature(&[("highway", "bus_stop")])));
        assert!(FeatureClass::Platform.matches(&feature(&[("railway", "platform")])));
        assert!(!FeatureClass::Platform.matches(&feature(&[("railway", "rail")])));
    }

    #[test]
    fn one_feature_may_land_in_two_classes() {
        let kiosk_bench = feature(&[("amenity", "bench"), ("shop", "kiosk")]);
        let matching: Vec<_> = FeatureClass::ALL
            .into_iter()
            .filter(|class| class.matches(&kiosk_bench))
            .collect();
        assert_eq!(matching, vec![FeatureClass::Bench, FeatureClass::Shop]);
    }
}
