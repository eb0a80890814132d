//! Configuration surface of the map engine
//!
//! Options deserialize from JSON with every field optional; anything missing
//! takes the documented default. Out-of-range values are normalized rather
//! than rejected.

use serde::{Deserialize, Serialize};

use crate::core::constants::{DEBOUNCE_DELAY_MS, DEFAULT_MAX_ZOOM, DEFAULT_MIN_ZOOM, MAX_SUPPORTED_ZOOM, TILE_SIZE};
use crate::core::geo::{LatLng, Point};
use crate::core::limiter::LimitBounds;
use crate::tiles::source::Provider;
use crate::Result;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapOptions {
    pub min_zoom: f64,
    pub max_zoom: f64,
    pub limit_bounds: LimitBounds,
    /// Controlled center; when set the host owns the view
    pub center: Option<LatLng>,
    /// Controlled zoom
    pub zoom: Option<f64>,
    /// Initial center for uncontrolled use
    pub default_center: Option<LatLng>,
    /// Initial zoom for uncontrolled use
    pub default_zoom: Option<f64>,
    /// Initial layout size; replaced by the first layout report
    pub width: f64,
    pub height: f64,
    pub provider: Provider,
    /// Device pixel ratio used for the tile srcset
    pub pixel_ratio: u32,
    pub debounce_ms: u64,
}

impl Default for MapOptions {
    fn default() -> Self {
        Self {
            min_zoom: DEFAULT_MIN_ZOOM,
            max_zoom: DEFAULT_MAX_ZOOM,
            limit_bounds: LimitBounds::Edge,
            center: None,
            zoom: None,
            default_center: None,
            default_zoom: None,
            width: TILE_SIZE,
            height: TILE_SIZE,
            provider: Provider::default(),
            pixel_ratio: 1,
            debounce_ms: DEBOUNCE_DELAY_MS,
        }
    }
}

impl MapOptions {
    /// Parses options from a JSON object and normalizes them
    pub fn from_json(json: &str) -> Result<Self> {
        let options: MapOptions = serde_json::from_str(json)?;
        Ok(options.normalized())
    }

    pub fn with_center(mut self, center: LatLng, zoom: f64) -> Self {
        self.center = Some(center);
        self.zoom = Some(zoom);
        self
    }

    pub fn with_default_center(mut self, center: LatLng, zoom: f64) -> Self {
        self.default_center = Some(center);
        self.default_zoom = Some(zoom);
        self
    }

    pub fn with_size(mut self, width: f64, height: f64) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn with_zoom_limits(mut self, min_zoom: f64, max_zoom: f64) -> Self {
        self.min_zoom = min_zoom;
        self.max_zoom = max_zoom;
        self
    }

    pub fn with_limit_bounds(mut self, limit_bounds: LimitBounds) -> Self {
        self.limit_bounds = limit_bounds;
        self
    }

    pub fn with_provider(mut self, provider: Provider) -> Self {
        self.provider = provider;
        self
    }

    pub fn with_pixel_ratio(mut self, pixel_ratio: u32) -> Self {
        self.pixel_ratio = pixel_ratio;
        self
    }

    pub fn with_debounce_ms(mut self, debounce_ms: u64) -> Self {
        self.debounce_ms = debounce_ms;
        self
    }

    /// The host controls the view through `center`/`zoom`
    pub fn is_controlled(&self) -> bool {
        self.center.is_some() || self.zoom.is_some()
    }

    pub fn size(&self) -> Point {
        Point::new(self.width, self.height)
    }

    /// Center and zoom to start from. Controlled values win over defaults.
    pub fn initial_view(&self) -> (LatLng, f64) {
        let center = self.center.or(self.default_center).unwrap_or_else(|| {
            log::warn!("no center configured, starting at 0,0");
            LatLng::default()
        });
        let zoom = self.zoom.or(self.default_zoom).unwrap_or(self.min_zoom);
        (center, self.clamp_zoom(zoom))
    }

    pub fn clamp_zoom(&self, zoom: f64) -> f64 {
        if zoom.is_nan() {
            return self.min_zoom;
        }
        zoom.max(self.min_zoom).min(self.max_zoom)
    }

    /// Repairs inconsistent values instead of failing
    pub fn normalized(mut self) -> Self {
        if !self.min_zoom.is_finite() {
            self.min_zoom = DEFAULT_MIN_ZOOM;
        }
        if !self.max_zoom.is_finite() {
            self.max_zoom = DEFAULT_MAX_ZOOM;
        }
        if self.min_zoom > self.max_zoom {
            log::warn!(
                "min_zoom {} is above max_zoom {}, swapping",
                self.min_zoom,
                self.max_zoom
            );
            std::mem::swap(&mut self.min_zoom, &mut self.max_zoom);
        }
        self.min_zoom = self.min_zoom.clamp(0.0, MAX_SUPPORTED_ZOOM);
        self.max_zoom = self.max_zoom.clamp(0.0, MAX_SUPPORTED_ZOOM);
        if !(self.width.is_finite() && self.width > 0.0) {
            self.width = TILE_SIZE;
        }
        if !(self.height.is_finite() && self.height > 0.0) {
            self.height = TILE_SIZE;
        }
        self.pixel_ratio = self.pixel_ratio.max(1);
        self
    }
}
