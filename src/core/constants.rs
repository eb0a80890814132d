//! Core constants derived from slippy-map conventions and the engine's own tuning.
//! Keeping them in a single place makes it easier to tweak engine-wide magic numbers.

/// Default square tile size in pixels.
pub const TILE_SIZE: f64 = 256.0;

/// Default zoom limits.
pub const DEFAULT_MIN_ZOOM: f64 = 1.0;
pub const DEFAULT_MAX_ZOOM: f64 = 18.0;

/// Deepest zoom the tile math supports; tile indices must fit in `u32`.
pub const MAX_SUPPORTED_ZOOM: f64 = 30.0;

/// Zoom at which the absolute latitude/longitude range is computed.
pub const REFERENCE_ZOOM: f64 = 10.0;

/// Trailing debounce window for host notifications, in milliseconds.
pub const DEBOUNCE_DELAY_MS: u64 = 60;

/// A gesture whose primary touch moved at most this many pixels on both axes is a tap.
pub const CLICK_TOLERANCE: f64 = 2.0;

/// Retained tile levels further than this from the rendered zoom are dropped.
pub const MAX_RETAINED_ZOOM_DISTANCE: i32 = 4;

/// Outbound change thresholds (commit vs. last reported view).
pub const REPORT_ZOOM_EPSILON: f64 = 0.001;
pub const REPORT_COORD_EPSILON: f64 = 0.00001;

/// Inbound change thresholds (controlled props vs. committed view).
pub const CONTROLLED_ZOOM_EPSILON: f64 = 0.001;
pub const CONTROLLED_COORD_EPSILON: f64 = 0.0001;

/// Default marker anchor box in pixels.
pub const MARKER_ANCHOR_SIZE: (f64, f64) = (32.0, 32.0);
