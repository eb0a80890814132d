//! Spherical Web Mercator math between geographic coordinates, fractional
//! tile coordinates and screen pixels.
//!
//! Tile coordinates are expressed at a possibly fractional zoom, so one tile
//! unit always spans [`TILE_SIZE`] screen pixels regardless of how far a pinch
//! has scaled the view. All functions are pure.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

use crate::core::constants::{REFERENCE_ZOOM, TILE_SIZE};
use crate::core::geo::{LatLng, Point};

/// Closed latitude/longitude rectangle
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoRange {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lng: f64,
    pub max_lng: f64,
}

impl GeoRange {
    pub fn contains(&self, point: &LatLng) -> bool {
        point.lat >= self.min_lat
            && point.lat <= self.max_lat
            && point.lng >= self.min_lng
            && point.lng <= self.max_lng
    }

    /// Clamps each axis independently into the range
    pub fn clamp(&self, point: LatLng) -> LatLng {
        LatLng::new(
            point.lat.max(self.min_lat).min(self.max_lat),
            point.lng.max(self.min_lng).min(self.max_lng),
        )
    }
}

/// Latitude/longitude reachable by the projection, taken from the tile
/// pyramid edges at the reference zoom (about ±85.0511° latitude).
pub static ABSOLUTE_RANGE: Lazy<GeoRange> = Lazy::new(|| {
    let tiles = 2_f64.powf(REFERENCE_ZOOM);
    GeoRange {
        min_lat: tile_y_to_lat(tiles, REFERENCE_ZOOM),
        max_lat: tile_y_to_lat(0.0, REFERENCE_ZOOM),
        min_lng: tile_x_to_lng(0.0, REFERENCE_ZOOM),
        max_lng: tile_x_to_lng(tiles, REFERENCE_ZOOM),
    }
});

/// Longitude to fractional tile x
pub fn lng_to_tile_x(lng: f64, zoom: f64) -> f64 {
    (lng + 180.0) / 360.0 * 2_f64.powf(zoom)
}

/// Latitude to fractional tile y. Infinite at ±90°; callers clamp first.
pub fn lat_to_tile_y(lat: f64, zoom: f64) -> f64 {
    let lat_rad = lat.to_radians();
    (1.0 - (lat_rad.tan() + 1.0 / lat_rad.cos()).ln() / PI) / 2.0 * 2_f64.powf(zoom)
}

/// Fractional tile x to longitude
pub fn tile_x_to_lng(x: f64, zoom: f64) -> f64 {
    x / 2_f64.powf(zoom) * 360.0 - 180.0
}

/// Fractional tile y to latitude
pub fn tile_y_to_lat(y: f64, zoom: f64) -> f64 {
    let n = PI - 2.0 * PI * y / 2_f64.powf(zoom);
    n.sinh().atan().to_degrees()
}

/// Converts a screen pixel to geographic coordinates for a view centered on
/// `center` at `zoom`, shifted by the in-progress gesture `offset`.
///
/// The result never leaves [`ABSOLUTE_RANGE`], so it is always safe to feed
/// back into [`lat_to_tile_y`].
pub fn pixel_to_lat_lng(pixel: Point, center: LatLng, zoom: f64, size: Point, offset: Point) -> LatLng {
    let tile_x = lng_to_tile_x(center.lng, zoom) + (pixel.x - size.x / 2.0 - offset.x) / TILE_SIZE;
    let tile_y = lat_to_tile_y(center.lat, zoom) + (pixel.y - size.y / 2.0 - offset.y) / TILE_SIZE;

    ABSOLUTE_RANGE.clamp(LatLng::new(
        tile_y_to_lat(tile_y, zoom),
        tile_x_to_lng(tile_x, zoom),
    ))
}

/// Converts geographic coordinates to a screen pixel, inverse of [`pixel_to_lat_lng`]
pub fn lat_lng_to_pixel(lat_lng: LatLng, center: LatLng, zoom: f64, size: Point, offset: Point) -> Point {
    let tile_center_x = lng_to_tile_x(center.lng, zoom);
    let tile_center_y = lat_to_tile_y(center.lat, zoom);

    Point::new(
        (lng_to_tile_x(lat_lng.lng, zoom) - tile_center_x) * TILE_SIZE + size.x / 2.0 + offset.x,
        (lat_to_tile_y(lat_lng.lat, zoom) - tile_center_y) * TILE_SIZE + size.y / 2.0 + offset.y,
    )
}

/// How many screens apart two views are, averaging the pixel distance measured
/// at both zoom levels.
pub fn distance_in_screens(
    target_center: LatLng,
    target_zoom: f64,
    center: LatLng,
    zoom: f64,
    size: Point,
) -> f64 {
    let origin = Point::default();

    let l1 = lat_lng_to_pixel(center, center, zoom, size, origin);
    let l2 = lat_lng_to_pixel(target_center, center, zoom, size, origin);

    let z1 = lat_lng_to_pixel(center, center, target_zoom, size, origin);
    let z2 = lat_lng_to_pixel(target_center, center, target_zoom, size, origin);

    let w = ((l1.x - l2.x).abs() + (z1.x - z2.x).abs()) / 2.0 / size.x;
    let h = ((l1.y - l2.y).abs() + (z1.y - z2.y).abs()) / 2.0 / size.y;

    (w * w + h * h).sqrt()
}

/// Center to use after zooming from `old_zoom` to `new_zoom` so that `anchor`
/// stays at the same screen pixel. The result is not limited.
pub fn zoom_center(center: LatLng, anchor: LatLng, old_zoom: f64, new_zoom: f64, size: Point) -> LatLng {
    let origin = Point::default();

    let before = lat_lng_to_pixel(anchor, center, old_zoom, size, origin);
    let after = lat_lng_to_pixel(anchor, center, new_zoom, size, origin);

    pixel_to_lat_lng(
        Point::new(size.x / 2.0 + after.x - before.x, size.y / 2.0 + after.y - before.y),
        center,
        new_zoom,
        size,
        origin,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    const SCREEN: Point = Point { x: 512.0, y: 512.0 };

    #[test]
    fn test_tile_math_at_origin() {
        assert_abs_diff_eq!(lng_to_tile_x(0.0, 3.0), 4.0, epsilon = 1e-12);
        assert_abs_diff_eq!(lat_to_tile_y(0.0, 3.0), 4.0, epsilon = 1e-12);
        assert_abs_diff_eq!(tile_x_to_lng(0.0, 3.0), -180.0, epsilon = 1e-12);
        assert_abs_diff_eq!(tile_y_to_lat(4.0, 3.0), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_absolute_range_matches_mercator_limit() {
        assert_abs_diff_eq!(ABSOLUTE_RANGE.max_lat, 85.0511287798, epsilon = 1e-6);
        assert_abs_diff_eq!(ABSOLUTE_RANGE.min_lat, -85.0511287798, epsilon = 1e-6);
        assert_abs_diff_eq!(ABSOLUTE_RANGE.min_lng, -180.0, epsilon = 1e-12);
        assert_abs_diff_eq!(ABSOLUTE_RANGE.max_lng, 180.0, epsilon = 1e-12);
    }

    #[test]
    fn test_inverse_functions() {
        for zoom in [1.0, 4.5, 12.0, 18.0] {
            let lat = 51.4779;
            let lng = -0.0015;
            assert_abs_diff_eq!(tile_y_to_lat(lat_to_tile_y(lat, zoom), zoom), lat, epsilon = 1e-9);
            assert_abs_diff_eq!(tile_x_to_lng(lng_to_tile_x(lng, zoom), zoom), lng, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_screen_center_is_view_center() {
        let center = LatLng::new(37.7749, -122.4194);
        let pixel = lat_lng_to_pixel(center, center, 12.0, SCREEN, Point::default());
        assert_abs_diff_eq!(pixel.x, 256.0, epsilon = 1e-9);
        assert_abs_diff_eq!(pixel.y, 256.0, epsilon = 1e-9);
    }

    #[test]
    fn test_round_trip_through_pixels() {
        let center = LatLng::new(10.0, 20.0);
        let offset = Point::new(13.0, -7.5);
        let samples = [
            LatLng::new(10.01, 20.02),
            LatLng::new(-33.86, 151.21),
            LatLng::new(84.9, -179.9),
            LatLng::new(-84.9, 179.9),
        ];
        for zoom in [1.0, 7.3, 18.0] {
            for geo in samples {
                let pixel = lat_lng_to_pixel(geo, center, zoom, SCREEN, offset);
                let back = pixel_to_lat_lng(pixel, center, zoom, SCREEN, offset);
                assert_abs_diff_eq!(back.lat, geo.lat, epsilon = 1e-4);
                assert_abs_diff_eq!(back.lng, geo.lng, epsilon = 1e-4);
            }
        }
    }

    #[test]
    fn test_pixel_to_lat_lng_clamps_to_absolute_range() {
        // Far above the north edge of the world at zoom 1
        let geo = pixel_to_lat_lng(Point::new(256.0, -10_000.0), LatLng::default(), 1.0, SCREEN, Point::default());
        assert!(geo.lat <= ABSOLUTE_RANGE.max_lat);
        assert!(geo.lat.is_finite());
        assert_abs_diff_eq!(geo.lat, ABSOLUTE_RANGE.max_lat, epsilon = 1e-9);
    }

    #[test]
    fn test_offset_shifts_content() {
        let center = LatLng::default();
        let geo = LatLng::new(1.0, 1.0);
        let plain = lat_lng_to_pixel(geo, center, 5.0, SCREEN, Point::default());
        let shifted = lat_lng_to_pixel(geo, center, 5.0, SCREEN, Point::new(40.0, -25.0));
        assert_abs_diff_eq!(shifted.x - plain.x, 40.0, epsilon = 1e-9);
        assert_abs_diff_eq!(shifted.y - plain.y, -25.0, epsilon = 1e-9);
    }

    #[test]
    fn test_distance_in_screens() {
        let center = LatLng::default();
        assert_abs_diff_eq!(distance_in_screens(center, 5.0, center, 5.0, SCREEN), 0.0);

        // One full screen width to the east at zoom 5
        let east = pixel_to_lat_lng(Point::new(256.0 + 512.0, 256.0), center, 5.0, SCREEN, Point::default());
        assert_abs_diff_eq!(distance_in_screens(east, 5.0, center, 5.0, SCREEN), 1.0, epsilon = 1e-6);
    }

    #[test]
    fn test_zoom_center_keeps_anchor_fixed() {
        let center = LatLng::new(48.8566, 2.3522);
        let anchor_pixel = Point::new(100.0, 400.0);
        let anchor = pixel_to_lat_lng(anchor_pixel, center, 10.0, SCREEN, Point::default());

        let new_center = zoom_center(center, anchor, 10.0, 11.5, SCREEN);
        let after = lat_lng_to_pixel(anchor, new_center, 11.5, SCREEN, Point::default());

        assert_abs_diff_eq!(after.x, anchor_pixel.x, epsilon = 1e-6);
        assert_abs_diff_eq!(after.y, anchor_pixel.y, epsilon = 1e-6);
    }
}
