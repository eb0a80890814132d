//! Prelude module for common slipmap types and traits
//!
//! This module re-exports the most commonly used types, traits, and functions
//! for easy importing with `use slipmap::prelude::*;`

pub use crate::core::{
    bounds::Bounds,
    config::MapOptions,
    geo::{LatLng, LatLngBounds, Point, TileCoord},
    limiter::LimitBounds,
    map::Map,
    viewport::{GestureOverlay, ViewportState},
};

pub use crate::input::{GestureOutcome, TouchEvent, TouchEventType, TouchPoint};

pub use crate::layers::{Feature, FeatureKind, FeatureStyle, Marker, TileDescriptor};

pub use crate::rendering::{RenderFrame, RenderSurface};

pub use crate::sync::{BoundsChanged, Clock, ManualClock, SystemClock};

pub use crate::tiles::{FnSource, LoadNotifier, Provider, TileLoader, TileRequest, TileSource};

pub use crate::{MapError, Result};

// Fast hash collections used for tile bookkeeping
pub use fxhash::{FxHashMap as HashMap, FxHashSet as HashSet};
