//! # slipmap
//!
//! A headless viewport engine for slippy raster maps.
//!
//! It turns touch gestures into a pan/pinch overlay over a committed view,
//! computes which Web Mercator tiles to paint and where (cross-fading between
//! zoom levels while new tiles load), projects markers and vector features
//! onto the screen, and keeps a host informed of the settled view through a
//! debounced callback. Fetching and painting are left to the host through the
//! [`tiles::TileLoader`] and [`rendering::RenderSurface`] traits.

pub mod core;
pub mod input;
pub mod layers;
pub mod prelude;
pub mod rendering;
pub mod sync;
pub mod tiles;

#[cfg(feature = "tokio-runtime")]
pub mod runtime;

pub use crate::core::constants;

// Re-export public API
pub use core::{
    config::MapOptions,
    geo::{LatLng, LatLngBounds, Point, TileCoord},
    limiter::LimitBounds,
    map::Map,
    viewport::{GestureOverlay, ViewportState},
};

pub use input::{GestureOutcome, TouchEvent, TouchEventType, TouchPoint};

pub use layers::{Feature, FeatureStyle, Marker, PlacedMarker, ProjectedFeature, TileDescriptor};

pub use rendering::{RenderFrame, RenderSurface};

pub use sync::{BoundsChanged, Clock, ManualClock, SystemClock};

pub use tiles::{FnSource, LoadNotifier, Provider, TileLoadEvent, TileLoader, TileRequest, TileSource};

/// Result type used throughout the library
pub type Result<T> = std::result::Result<T, MapError>;

/// Common error types
#[derive(Debug, thiserror::Error)]
pub enum MapError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Invalid tile key: {0}")]
    InvalidTileKey(String),
}
