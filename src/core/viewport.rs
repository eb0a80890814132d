use crate::core::constants::TILE_SIZE;
use crate::core::geo::{LatLng, LatLngBounds, Point};
use crate::core::projection::{
    lat_lng_to_pixel, lat_to_tile_y, lng_to_tile_x, pixel_to_lat_lng, tile_x_to_lng, tile_y_to_lat,
};
use serde::{Deserialize, Serialize};

/// In-progress gesture motion layered over the committed view.
///
/// Only exists while a gesture is active and is folded into the committed
/// view when the gesture ends.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct GestureOverlay {
    /// Screen translation of the map content in pixels
    pub pixel_delta: Point,
    /// Zoom change relative to the committed zoom
    pub zoom_delta: f64,
}

/// The committed view of the map plus the ephemeral gesture overlay
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewportState {
    center: LatLng,
    zoom: f64,
    size: Point,
    overlay: Option<GestureOverlay>,
}

impl ViewportState {
    /// Creates a committed viewport without any gesture overlay
    pub fn new(center: LatLng, zoom: f64, size: Point) -> Self {
        Self {
            center,
            zoom,
            size,
            overlay: None,
        }
    }

    /// The committed center
    pub fn center(&self) -> LatLng {
        self.center
    }

    /// The committed zoom
    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    /// The size of the viewport in pixels
    pub fn size(&self) -> Point {
        self.size
    }

    pub fn is_gesture_active(&self) -> bool {
        self.overlay.is_some()
    }

    /// Committed zoom plus the in-progress pinch delta
    pub fn effective_zoom(&self) -> f64 {
        self.zoom + self.overlay.map_or(0.0, |overlay| overlay.zoom_delta)
    }

    /// Geographic point currently shown at the screen center, with the
    /// gesture overlay folded in at the effective zoom
    pub fn effective_center(&self) -> LatLng {
        let overlay = match self.overlay {
            Some(overlay) => overlay,
            None => return self.center,
        };
        let zoom = self.effective_zoom();

        LatLng::new(
            tile_y_to_lat(
                lat_to_tile_y(self.center.lat, zoom) - overlay.pixel_delta.y / TILE_SIZE,
                zoom,
            ),
            tile_x_to_lng(
                lng_to_tile_x(self.center.lng, zoom) - overlay.pixel_delta.x / TILE_SIZE,
                zoom,
            ),
        )
    }

    /// Screen pixel under which `lat_lng` is drawn right now
    pub fn lat_lng_to_pixel(&self, lat_lng: LatLng) -> Point {
        lat_lng_to_pixel(
            lat_lng,
            self.center,
            self.effective_zoom(),
            self.size,
            self.pixel_offset(),
        )
    }

    /// Geographic point drawn at `pixel` right now
    pub fn pixel_to_lat_lng(&self, pixel: Point) -> LatLng {
        pixel_to_lat_lng(
            pixel,
            self.center,
            self.effective_zoom(),
            self.size,
            self.pixel_offset(),
        )
    }

    /// Geographic extent between the north-east and south-west screen corners
    /// of the view `(center, zoom)` without any overlay
    pub fn bounds_for(&self, center: LatLng, zoom: f64) -> LatLngBounds {
        let origin = Point::default();
        let north_east = pixel_to_lat_lng(Point::new(self.size.x - 1.0, 0.0), center, zoom, self.size, origin);
        let south_west = pixel_to_lat_lng(Point::new(0.0, self.size.y - 1.0), center, zoom, self.size, origin);
        LatLngBounds::new(south_west, north_east)
    }

    /// Geographic extent of what is on screen right now
    pub fn visible_bounds(&self) -> LatLngBounds {
        let north_east = self.pixel_to_lat_lng(Point::new(self.size.x - 1.0, 0.0));
        let south_west = self.pixel_to_lat_lng(Point::new(0.0, self.size.y - 1.0));
        LatLngBounds::new(south_west, north_east)
    }

    pub(crate) fn overlay(&self) -> Option<GestureOverlay> {
        self.overlay
    }

    pub(crate) fn pixel_offset(&self) -> Point {
        self.overlay.map_or_else(Point::default, |overlay| overlay.pixel_delta)
    }

    pub(crate) fn commit(&mut self, center: LatLng, zoom: f64) {
        self.center = center;
        self.zoom = zoom;
    }

    pub(crate) fn set_overlay(&mut self, overlay: GestureOverlay) {
        self.overlay = Some(overlay);
    }

    /// Drops the overlay, returning it for folding
    pub(crate) fn take_overlay(&mut self) -> Option<GestureOverlay> {
        self.overlay.take()
    }

    pub(crate) fn set_size(&mut self, size: Point) {
        self.size = size;
    }
}

impl Default for ViewportState {
    fn default() -> Self {
        Self::new(LatLng::new(0.0, 0.0), 1.0, Point::new(256.0, 256.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_viewport_creation() {
        let viewport = ViewportState::new(LatLng::new(40.7128, -74.0060), 10.0, Point::new(800.0, 600.0));

        assert_eq!(viewport.zoom(), 10.0);
        assert_eq!(viewport.center().lat, 40.7128);
        assert_eq!(viewport.size().x, 800.0);
        assert!(!viewport.is_gesture_active());
        assert_eq!(viewport.effective_zoom(), 10.0);
        assert_eq!(viewport.effective_center(), viewport.center());
    }

    #[test]
    fn test_overlay_folds_into_effective_view() {
        let mut viewport = ViewportState::new(LatLng::default(), 5.0, Point::new(512.0, 512.0));
        viewport.set_overlay(GestureOverlay {
            pixel_delta: Point::new(256.0, 0.0),
            zoom_delta: 0.0,
        });

        // Content moved one tile to the right, so the center moved one tile west
        let center = viewport.effective_center();
        assert_abs_diff_eq!(center.lng, -360.0 / 32.0, epsilon = 1e-9);
        assert_abs_diff_eq!(center.lat, 0.0, epsilon = 1e-9);

        // The committed center is untouched
        assert_eq!(viewport.center(), LatLng::default());
    }

    #[test]
    fn test_take_overlay_resets_to_neutral() {
        let mut viewport = ViewportState::default();
        viewport.set_overlay(GestureOverlay {
            pixel_delta: Point::new(3.0, 4.0),
            zoom_delta: 0.5,
        });
        assert_eq!(viewport.effective_zoom(), 1.5);

        let overlay = viewport.take_overlay();
        assert!(overlay.is_some());
        assert_eq!(viewport.effective_zoom(), 1.0);
        assert_eq!(viewport.pixel_offset(), Point::default());
    }

    #[test]
    fn test_screen_conversion_matches_effective_center() {
        let mut viewport = ViewportState::new(LatLng::new(20.0, 30.0), 7.0, Point::new(640.0, 480.0));
        viewport.set_overlay(GestureOverlay {
            pixel_delta: Point::new(-40.0, 25.0),
            zoom_delta: 0.75,
        });

        let at_center = viewport.pixel_to_lat_lng(Point::new(320.0, 240.0));
        let effective = viewport.effective_center();
        assert_abs_diff_eq!(at_center.lat, effective.lat, epsilon = 1e-9);
        assert_abs_diff_eq!(at_center.lng, effective.lng, epsilon = 1e-9);
    }

    #[test]
    fn test_bounds_corners() {
        let viewport = ViewportState::new(LatLng::default(), 3.0, Point::new(512.0, 512.0));
        let bounds = viewport.visible_bounds();
        assert!(bounds.north_east.lat > 0.0 && bounds.north_east.lng > 0.0);
        assert!(bounds.south_west.lat < 0.0 && bounds.south_west.lng < 0.0);
        assert!(bounds.contains(&LatLng::default()));
        assert_eq!(bounds, viewport.bounds_for(LatLng::default(), 3.0));
    }
}
