use serde::{Deserialize, Serialize};

use crate::core::bounds::Bounds;
use crate::core::constants::MARKER_ANCHOR_SIZE;
use crate::core::geo::{LatLng, LatLngBounds};
use crate::core::viewport::ViewportState;

/// Host content pinned to a geographic position
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Marker {
    pub id: String,
    pub position: LatLng,
    /// Anchor box in pixels, centered on the position
    pub width: f64,
    pub height: f64,
    /// Opaque to the engine, handed back with the placement
    #[serde(default)]
    pub content: serde_json::Value,
}

/// A marker positioned on screen
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlacedMarker {
    pub id: String,
    pub rect: Bounds,
    pub content: serde_json::Value,
}

impl Marker {
    pub fn new(id: impl Into<String>, position: LatLng) -> Self {
        Self {
            id: id.into(),
            position,
            width: MARKER_ANCHOR_SIZE.0,
            height: MARKER_ANCHOR_SIZE.1,
            content: serde_json::Value::Null,
        }
    }

    pub fn with_size(mut self, width: f64, height: f64) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn with_content(mut self, content: serde_json::Value) -> Self {
        self.content = content;
        self
    }

    /// Screen placement, or `None` when the position is outside `visible`
    pub fn place(&self, viewport: &ViewportState, visible: &LatLngBounds) -> Option<PlacedMarker> {
        if !visible.contains(&self.position) {
            return None;
        }
        let pixel = viewport.lat_lng_to_pixel(self.position);
        Some(PlacedMarker {
            id: self.id.clone(),
            rect: Bounds::from_center_and_size(pixel, self.width, self.height),
            content: self.content.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::geo::Point;

    #[test]
    fn test_marker_centered_on_position() {
        let viewport = ViewportState::new(LatLng::default(), 4.0, Point::new(400.0, 300.0));
        let marker = Marker::new("home", LatLng::default()).with_content(serde_json::json!({ "label": "Home" }));

        let placed = marker.place(&viewport, &viewport.visible_bounds()).unwrap();
        assert_eq!(placed.rect, Bounds::from_coords(184.0, 134.0, 216.0, 166.0));
        assert_eq!(placed.content["label"], "Home");
    }

    #[test]
    fn test_marker_outside_view_is_culled() {
        let viewport = ViewportState::new(LatLng::default(), 10.0, Point::new(400.0, 300.0));
        let marker = Marker::new("far", LatLng::new(40.0, 100.0)).with_size(10.0, 20.0);
        assert!(marker.place(&viewport, &viewport.visible_bounds()).is_none());
    }
}
