use cgmath::Point3;

pub struct CoordinatesSystem {}

impl CoordinatesSystem {
    /// Projects a latitude/longitude pair (degrees) onto a sphere of `radius`
    /// centred at the origin, with +y through the north pole.
    ///
    /// The azimuth is measured from -180 degrees of longitude, so the
    /// antimeridian sits on +x and the prime meridian on -x. Inputs are not
    /// range checked.
    pub fn lat_lon_to_cartesian(lat: f64, lon: f64, radius: f64) -> Point3<f64> {
        let phi = (90.0 - lat).to_radians();
        let theta = (lon + 180.0).to_radians();

        let x = radius * phi.sin() * theta.cos();
        let y = radius * phi.cos();
        let z = radius * phi.sin() * theta.sin();

        Point3::new(x, y, z)
    }

    pub fn lat_lon_to_cartesian_f32(lat: f64, lon: f64, radius: f64) -> Point3<f32> {
        let p = CoordinatesSystem::lat_lon_to_cartesian(lat, lon, radius);
        Point3::new(p.x as f32, p.y as f32, p.z as f32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::{EuclideanSpace, InnerSpace, MetricSpace};

    const EPSILON: f64 = 1e-6;

    fn assert_close(actual: Point3<f64>, expected: Point3<f64>) {
        assert!(
            actual.distance(expected) < EPSILON,
            "expected {expected:?}, got {actual:?}"
        );
    }

    #[test]
    fn equator_prime_meridian_lands_on_negative_x() {
        let p = CoordinatesSystem::lat_lon_to_cartesian(0.0, 0.0, 1.0);
        assert_close(p, Point3::new(-1.0, 0.0, 0.0));
    }

    #[test]
    fn poles_collapse_regardless_of_longitude() {
        for lon in [-180.0, -74.006, 0.0, 71.6911, 180.0] {
            let north = CoordinatesSystem::lat_lon_to_cartesian(90.0, lon, 2.5);
            let south = CoordinatesSystem::lat_lon_to_cartesian(-90.0, lon, 2.5);
            assert_close(north, Point3::new(0.0, 2.5, 0.0));
            assert_close(south, Point3::new(0.0, -2.5, 0.0));
        }
    }

    #[test]
    fn points_lie_on_the_sphere() {
        for radius in [0.2, 1.0, 1.05, 3.0] {
            let mut lat = -90.0;
            while lat <= 90.0 {
                let mut lon = -180.0;
                while lon <= 180.0 {
                    let p = CoordinatesSystem::lat_lon_to_cartesian(lat, lon, radius);
                    let r = p.to_vec().magnitude();
                    assert!((r - radius).abs() < EPSILON, "({lat}, {lon}) -> r = {r}");
                    lon += 7.5;
                }
                lat += 7.5;
            }
        }
    }

    #[test]
    fn small_steps_move_the_point_a_little() {
        let base = CoordinatesSystem::lat_lon_to_cartesian(48.8566, 2.3522, 1.0);
        let nudged = CoordinatesSystem::lat_lon_to_cartesian(48.8567, 2.3523, 1.0);
        // 1e-4 degrees is under 2e-6 radians of arc
        assert!(base.distance(nudged) < 1e-5);
    }

    #[test]
    fn antimeridian_wraps_to_the_same_point() {
        let east = CoordinatesSystem::lat_lon_to_cartesian(12.0, 180.0, 1.0);
        let west = CoordinatesSystem::lat_lon_to_cartesian(12.0, -180.0, 1.0);
        assert_close(east, west);
    }

    #[test]
    fn projection_is_pure() {
        let a = CoordinatesSystem::lat_lon_to_cartesian(35.6762, 139.6503, 1.05);
        let b = CoordinatesSystem::lat_lon_to_cartesian(35.6762, 139.6503, 1.05);
        assert_eq!(a, b);
    }
}
