//! Bounds limiter: the range of centers reachable at a zoom level.

use serde::{Deserialize, Serialize};

use crate::core::constants::TILE_SIZE;
use crate::core::geo::{LatLng, Point};
use crate::core::memo::Memo;
use crate::core::projection::{tile_x_to_lng, tile_y_to_lat, GeoRange, ABSOLUTE_RANGE};

/// How the center is kept inside the world
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LimitBounds {
    /// Screen edges never show area outside the projection
    #[default]
    Edge,
    /// Only the center is kept inside the fixed absolute range
    Center,
}

/// Limit for one axis of the center
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum AxisLimit {
    /// The world is narrower than the screen on this axis
    Free,
    Within { min: f64, max: f64 },
}

impl AxisLimit {
    pub fn contains(&self, value: f64) -> bool {
        match *self {
            AxisLimit::Free => true,
            AxisLimit::Within { min, max } => value >= min && value <= max,
        }
    }

    /// Free axes still respect the absolute range `(min, max)`
    fn clamp(&self, value: f64, absolute: (f64, f64)) -> f64 {
        let (min, max) = match *self {
            AxisLimit::Free => absolute,
            AxisLimit::Within { min, max } => (min, max),
        };
        value.min(max).max(min)
    }
}

/// Reachable center range for one (zoom, size) pair
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CenterRange {
    pub lat: AxisLimit,
    pub lng: AxisLimit,
}

impl CenterRange {
    fn absolute(range: &GeoRange) -> Self {
        Self {
            lat: AxisLimit::Within {
                min: range.min_lat,
                max: range.max_lat,
            },
            lng: AxisLimit::Within {
                min: range.min_lng,
                max: range.max_lng,
            },
        }
    }

    pub fn contains(&self, point: &LatLng) -> bool {
        self.lat.contains(point.lat) && self.lng.contains(point.lng)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct RangeKey {
    zoom: f64,
    width: f64,
    height: f64,
}

/// Clamps candidate centers so the view stays inside the projection.
#[derive(Debug, Clone)]
pub struct BoundsLimiter {
    mode: LimitBounds,
    cache: Memo<RangeKey, CenterRange>,
}

impl BoundsLimiter {
    pub fn new(mode: LimitBounds) -> Self {
        Self {
            mode,
            cache: Memo::new(),
        }
    }

    pub fn mode(&self) -> LimitBounds {
        self.mode
    }

    /// Range of centers reachable at `zoom` for a screen of `size`
    pub fn center_range(&mut self, zoom: f64, size: Point) -> CenterRange {
        if self.mode == LimitBounds::Center {
            return CenterRange::absolute(&ABSOLUTE_RANGE);
        }

        let key = RangeKey {
            zoom,
            width: size.x,
            height: size.y,
        };
        self.cache.get_or_insert_with(key, |key| edge_range(key.zoom, key.width, key.height))
    }

    /// Clamps each axis of `candidate` into the range for `zoom`.
    ///
    /// NaN components are replaced by the matching component of `fallback`,
    /// normally the committed center.
    pub fn limit_center(&mut self, candidate: LatLng, zoom: f64, size: Point, fallback: LatLng) -> LatLng {
        let range = self.center_range(zoom, size);

        let lat = if candidate.lat.is_nan() {
            log::warn!("NaN latitude in candidate center, keeping {}", fallback.lat);
            fallback.lat
        } else {
            candidate.lat
        };
        let lng = if candidate.lng.is_nan() {
            log::warn!("NaN longitude in candidate center, keeping {}", fallback.lng);
            fallback.lng
        } else {
            candidate.lng
        };

        LatLng::new(
            range.lat.clamp(lat, (ABSOLUTE_RANGE.min_lat, ABSOLUTE_RANGE.max_lat)),
            range.lng.clamp(lng, (ABSOLUTE_RANGE.min_lng, ABSOLUTE_RANGE.max_lng)),
        )
    }
}

impl Default for BoundsLimiter {
    fn default() -> Self {
        Self::new(LimitBounds::default())
    }
}

fn edge_range(zoom: f64, width: f64, height: f64) -> CenterRange {
    let tiles = 2_f64.powf(zoom);
    let pixels_at_zoom = tiles * TILE_SIZE;
    // half a screen, in tiles
    let half_width = width / (2.0 * TILE_SIZE);
    let half_height = height / (2.0 * TILE_SIZE);

    let lng = if width > pixels_at_zoom {
        AxisLimit::Free
    } else {
        AxisLimit::Within {
            min: tile_x_to_lng(half_width, zoom),
            max: tile_x_to_lng(tiles - half_width, zoom),
        }
    };
    let lat = if height > pixels_at_zoom {
        AxisLimit::Free
    } else {
        AxisLimit::Within {
            min: tile_y_to_lat(tiles - half_height, zoom),
            max: tile_y_to_lat(half_height, zoom),
        }
    };

    CenterRange { lat, lng }
}
