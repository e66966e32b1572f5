//! Coordinate reference systems and the projection between them.
//!
//! Two systems are in play: `Wgs84` (EPSG:4326) for storage and display,
//! and `Utm32N` (EPSG:32632) for every distance, buffer and intersection
//! operation. Mixing them silently produces wrong distances, so typed
//! collections carry their [`Crs`] and operations guard it with
//! [`ensure_matching`].
//!
//! Reprojection is a self-contained transverse Mercator implementation
//! (Karney-Krüger series on the WGS84 ellipsoid, accurate to well under a
//! millimetre inside the zone), so no native projection library is needed.

use geo::{Coord, MapCoords};

use crate::{Error, Result};

/// WGS84 semi-major axis in metres.
const SEMI_MAJOR_AXIS: f64 = 6_378_137.0;
/// WGS84 flattening.
const FLATTENING: f64 = 1.0 / 298.257_223_563;
/// UTM scale factor on the central meridian.
const SCALE_FACTOR: f64 = 0.9996;
/// UTM false easting in metres.
const FALSE_EASTING: f64 = 500_000.0;

/// The two coordinate reference systems used by the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Crs {
    /// Geographic longitude/latitude, EPSG:4326.
    Wgs84,
    /// Projected metric coordinates, EPSG:32632 (UTM zone 32 north).
    Utm32N,
}

impl Crs {
    pub fn epsg(self) -> u32 {
        match self {
            Crs::Wgs84 => 4326,
            Crs::Utm32N => 32632,
        }
    }

    pub fn is_metric(self) -> bool {
        matches!(self, Crs::Utm32N)
    }
}

/// Fails with [`Error::CrsMismatch`] unless both operands share a CRS.
pub fn ensure_matching(left: Crs, right: Crs) -> Result<()> {
    if left == right {
        Ok(())
    } else {
        Err(Error::CrsMismatch { left, right })
    }
}

/// Transverse Mercator projection for one UTM zone (northern hemisphere).
#[derive(Debug, Clone)]
pub struct Projection {
    lon0: f64,
    rectifying_radius: f64,
    alpha: [f64; 3],
    beta: [f64; 3],
    delta: [f64; 3],
    third_flattening: f64,
}

impl Projection {
    /// Projection for the given UTM zone, e.g. `utm_zone(32)` for EPSG:32632.
    pub fn utm_zone(zone: u8) -> Self {
        let lon0 = (f64::from(zone) - 0.5) * 6.0 - 180.0;
        let n = FLATTENING / (2.0 - FLATTENING);
        let n2 = n * n;
        let n3 = n2 * n;
        Self {
            lon0: lon0.to_radians(),
            rectifying_radius: SEMI_MAJOR_AXIS / (1.0 + n) * (1.0 + n2 / 4.0 + n2 * n2 / 64.0),
            alpha: [
                n / 2.0 - 2.0 * n2 / 3.0 + 5.0 * n3 / 16.0,
                13.0 * n2 / 48.0 - 3.0 * n3 / 5.0,
                61.0 * n3 / 240.0,
            ],
            beta: [
                n / 2.0 - 2.0 * n2 / 3.0 + 37.0 * n3 / 96.0,
                n2 / 48.0 + n3 / 15.0,
                17.0 * n3 / 480.0,
            ],
            delta: [
                2.0 * n - 2.0 * n2 / 3.0 - 2.0 * n3,
                7.0 * n2 / 3.0 - 8.0 * n3 / 5.0,
                56.0 * n3 / 15.0,
            ],
            third_flattening: n,
        }
    }

    /// Geographic degrees to projected metres.
    pub fn forward(&self, lon: f64, lat: f64) -> (f64, f64) {
        let lat = lat.to_radians();
        let dlon = lon.to_radians() - self.lon0;

        let n = self.third_flattening;
        let c = 2.0 * n.sqrt() / (1.0 + n);
        let sin_lat = lat.sin();
        let t = (sin_lat.atanh() - c * (c * sin_lat).atanh()).sinh();

        let xi_prime = t.atan2(dlon.cos());
        let eta_prime = (dlon.sin() / (t * t + dlon.cos() * dlon.cos()).sqrt()).asinh();

        let mut xi = xi_prime;
        let mut eta = eta_prime;
        for (j, a) in self.alpha.iter().enumerate() {
            let k = 2.0 * (j as f64 + 1.0);
            xi += a * (k * xi_prime).sin() * (k * eta_prime).cosh();
            eta += a * (k * xi_prime).cos() * (k * eta_prime).sinh();
        }

        let x = FALSE_EASTING + SCALE_FACTOR * self.rectifying_radius * eta;
        let y = SCALE_FACTOR * self.rectifying_radius * xi;
        (x, y)
    }

    /// Projected metres back to geographic degrees.
    pub fn inverse(&self, x: f64, y: f64) -> (f64, f64) {
        let xi = y / (SCALE_FACTOR * self.rectifying_radius);
        let eta = (x - FALSE_EASTING) / (SCALE_FACTOR * self.rectifying_radius);

        let mut xi_prime = xi;
        let mut eta_prime = eta;
        for (j, b) in self.beta.iter().enumerate() {
            let k = 2.0 * (j as f64 + 1.0);
            xi_prime -= b * (k * xi).sin() * (k * eta).cosh();
            eta_prime -= b * (k * xi).cos() * (k * eta).sinh();
        }

        let chi = (xi_prime.sin() / eta_prime.cosh()).asin();
        let mut lat = chi;
        for (j, d) in self.delta.iter().enumerate() {
            let k = 2.0 * (j as f64 + 1.0);
            lat += d * (k * chi).sin();
        }
        let lon = self.lon0 + eta_prime.sinh().atan2(xi_prime.cos());

        (lon.to_degrees(), lat.to_degrees())
    }

    /// Reprojects a whole geometry from geographic to metric coordinates.
    pub fn to_metric<G>(&self, geometry: &G) -> G::Output
    where
        G: MapCoords<f64, f64>,
    {
        geometry.map_coords(|c| {
            let (x, y) = self.forward(c.x, c.y);
            Coord { x, y }
        })
    }

    /// Reprojects a whole geometry from metric back to geographic coordinates.
    pub fn to_geographic<G>(&self, geometry: &G) -> G::Output
    where
        G: MapCoords<f64, f64>,
    {
        geometry.map_coords(|c| {
            let (lon, lat) = self.inverse(c.x, c.y);
            Coord { x: lon, y: lat }
        })
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use geo::Point;

    use super::*;

    #[test]
    fn central_meridian_maps_to_false_easting() {
        let projection = Projection::utm_zone(32);
        let (x, _) = projection.forward(9.0, 51.0);
        assert_relative_eq!(x, 500_000.0, epsilon = 1e-6);
    }

    #[test]
    fn roundtrip_is_exact_within_zone() {
        let projection = Projection::utm_zone(32);
        for &(lon, lat) in &[(6.77, 51.22), (9.0, 50.0), (10.9, 52.4), (7.01, 50.94)] {
            let (x, y) = projection.forward(lon, lat);
            let (lon2, lat2) = projection.inverse(x, y);
            assert_relative_eq!(lon, lon2, epsilon = 1e-8);
            assert_relative_eq!(lat, lat2, epsilon = 1e-8);
        }
    }

    #[test]
    fn meridian_scale_close_to_utm_factor() {
        let projection = Projection::utm_zone(32);
        let (_, y1) = projection.forward(9.0, 51.0);
        let (_, y2) = projection.forward(9.0, 51.001);
        // One millidegree of latitude is ~111.3 m on the ground, scaled by k0.
        let per_degree = (y2 - y1) / 0.001;
        assert!((110_700.0..111_700.0).contains(&per_degree), "{per_degree}");
    }

    #[test]
    fn distances_are_stable_across_neighbouring_zones() {
        // The same point pair projected through two different central
        // meridians must yield nearly the same separation.
        let zone32 = Projection::utm_zone(32);
        let zone33 = Projection::utm_zone(33);
        let a = (11.9, 51.0);
        let b = (11.91, 51.005);

        let dist = |p: &Projection| {
            let (ax, ay) = p.forward(a.0, a.1);
            let (bx, by) = p.forward(b.0, b.1);
            ((ax - bx).powi(2) + (ay - by).powi(2)).sqrt()
        };
        let d32 = dist(&zone32);
        let d33 = dist(&zone33);
        assert_relative_eq!(d32, d33, max_relative = 3e-3);
    }

    #[test]
    fn geometry_reprojection_roundtrips() {
        let projection = Projection::utm_zone(32);
        let point = Point::new(7.45, 51.51);
        let metric: Point<f64> = projection.to_metric(&point);
        let back: Point<f64> = projection.to_geographic(&metric);
        assert_relative_eq!(back.x(), point.x(), epsilon = 1e-9);
        assert_relative_eq!(back.y(), point.y(), epsilon = 1e-9);
    }

    #[test]
    fn mismatched_crs_is_rejected() {
        assert!(ensure_matching(Crs::Utm32N, Crs::Utm32N).is_ok());
        let err = ensure_matching(Crs::Wgs84, Crs::Utm32N).unwrap_err();
        assert!(matches!(err, Error::CrsMismatch { .. }));
    }
}
