use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::core::config::MapOptions;
use crate::core::constants::{CONTROLLED_COORD_EPSILON, CONTROLLED_ZOOM_EPSILON};
use crate::core::geo::{LatLng, LatLngBounds, Point, TileCoord};
use crate::core::limiter::BoundsLimiter;
use crate::core::projection::{distance_in_screens, zoom_center};
use crate::core::viewport::ViewportState;
use crate::input::events::{GestureOutcome, TouchEvent};
use crate::input::gestures::{GestureContext, GestureRecognizer, GestureUpdate};
use crate::layers::marker::Marker;
use crate::layers::tile::{TileRange, TileSetBuilder};
use crate::layers::vector::Feature;
use crate::rendering::frame::{RenderFrame, RenderSurface};
use crate::sync::boundary::{BoundarySync, BoundsChanged, ReportedView};
use crate::sync::debounce::{Clock, SystemClock};
use crate::tiles::loader::{self, LoadEvents, LoadNotifier, TileLoadEvent, TileLoader};
use crate::tiles::source::TileSource;
use crate::Result;

/// The viewport engine.
///
/// Owns the committed view, the in-progress gesture, the tile set and the
/// host synchronization. Every change to the committed view goes through
/// [`Map::set_center_zoom`].
pub struct Map {
    options: MapOptions,
    viewport: ViewportState,
    limiter: BoundsLimiter,
    tiles: TileSetBuilder,
    gestures: GestureRecognizer,
    sync: BoundarySync,
    source: Box<dyn TileSource>,
    dprs: Vec<u32>,
    markers: Vec<Marker>,
    features: Vec<Feature>,
    notifier: LoadNotifier,
    events: LoadEvents,
}

impl Map {
    pub fn new(options: MapOptions) -> Self {
        Self::with_clock(options, Arc::new(SystemClock))
    }

    /// Creates a map whose debounce runs on `clock`
    pub fn with_clock(options: MapOptions, clock: Arc<dyn Clock>) -> Self {
        let options = options.normalized();
        let size = options.size();
        let (requested_center, zoom) = options.initial_view();

        let mut limiter = BoundsLimiter::new(options.limit_bounds);
        let center = limiter.limit_center(requested_center, zoom, size, LatLng::default());

        let (notifier, events) = loader::channel();
        let dprs = if options.pixel_ratio > 1 {
            vec![1, options.pixel_ratio]
        } else {
            vec![1]
        };

        log::debug!(
            "map created at {:?} zoom {} ({}x{}, {:?} limits)",
            center,
            zoom,
            size.x,
            size.y,
            options.limit_bounds
        );

        Self {
            viewport: ViewportState::new(center, zoom, size),
            tiles: TileSetBuilder::new(TileRange::for_committed(center, zoom, size)),
            gestures: GestureRecognizer::new(),
            sync: BoundarySync::new(
                ReportedView::new(center, zoom),
                Duration::from_millis(options.debounce_ms),
                clock,
            ),
            source: Box::new(options.provider),
            dprs,
            markers: Vec::new(),
            features: Vec::new(),
            notifier,
            events,
            limiter,
            options,
        }
    }

    /// Replaces the configured provider with a custom tile source
    pub fn with_tile_source(mut self, source: impl TileSource + 'static) -> Self {
        self.source = Box::new(source);
        self
    }

    pub fn options(&self) -> &MapOptions {
        &self.options
    }

    pub fn viewport(&self) -> &ViewportState {
        &self.viewport
    }

    pub fn center(&self) -> LatLng {
        self.viewport.center()
    }

    pub fn zoom(&self) -> f64 {
        self.viewport.zoom()
    }

    pub fn tile_set(&self) -> &TileSetBuilder {
        &self.tiles
    }

    pub fn is_gesture_active(&self) -> bool {
        self.viewport.is_gesture_active()
    }

    /// What is on screen right now, gesture included
    pub fn visible_bounds(&self) -> LatLngBounds {
        self.viewport.visible_bounds()
    }

    /// Commits a new view.
    ///
    /// The zoom is clamped to the configured limits and the center to the
    /// limiter's range; the host hears about the result once it settles.
    pub fn set_center_zoom(&mut self, center: LatLng, zoom: f64) {
        let zoom = if zoom.is_nan() {
            log::warn!("ignoring NaN zoom, keeping {}", self.viewport.zoom());
            self.viewport.zoom()
        } else {
            self.options.clamp_zoom(zoom)
        };
        let size = self.viewport.size();
        let center = self
            .limiter
            .limit_center(center, zoom, size, self.viewport.center());

        self.tiles.commit(TileRange::for_committed(center, zoom, size));
        self.viewport.commit(center, zoom);
        log::debug!("committed {:?} zoom {}", center, zoom);

        if self.sync.note_commit(ReportedView::new(center, zoom)) {
            log::trace!("bounds sync scheduled");
        }
    }

    /// Zooms so that the geographic point under `pixel` stays under it
    pub fn zoom_around(&mut self, pixel: Point, zoom: f64) {
        let old_zoom = self.viewport.zoom();
        let new_zoom = self.options.clamp_zoom(zoom);
        let anchor = self.viewport.pixel_to_lat_lng(pixel);
        let center = zoom_center(self.viewport.center(), anchor, old_zoom, new_zoom, self.viewport.size());
        self.set_center_zoom(center, new_zoom);
    }

    /// Feeds a touch sample; returns the outcome when the gesture finished
    pub fn handle_touch(&mut self, event: &TouchEvent) -> Option<GestureOutcome> {
        let context = GestureContext {
            zoom: self.viewport.zoom(),
            min_zoom: self.options.min_zoom,
            max_zoom: self.options.max_zoom,
            size: self.viewport.size(),
        };

        match self.gestures.handle(event, &context) {
            GestureUpdate::None => None,
            GestureUpdate::Overlay(overlay) => {
                self.viewport.set_overlay(overlay);
                None
            }
            GestureUpdate::Finished { overlay, outcome } => {
                self.viewport.set_overlay(overlay);
                let center = self.viewport.effective_center();
                let zoom = self.viewport.effective_zoom();
                self.viewport.take_overlay();

                log::debug!("gesture finished: {:?}", outcome);
                self.set_center_zoom(center, zoom);
                Some(outcome)
            }
        }
    }

    /// Applies a new layout size. Non-positive sizes are ignored.
    pub fn set_size(&mut self, width: f64, height: f64) {
        if !(width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0) {
            log::warn!("ignoring invalid map size {}x{}", width, height);
            return;
        }
        let size = Point::new(width, height);
        if size == self.viewport.size() {
            return;
        }
        self.viewport.set_size(size);

        // A running gesture re-limits when it commits
        if !self.viewport.is_gesture_active() {
            self.set_center_zoom(self.viewport.center(), self.viewport.zoom());
        }
    }

    /// Inbound controlled values from the host.
    ///
    /// Unchanged or absent values are ignored; the host already knows about
    /// the view it sends, so applying it does not echo back.
    pub fn set_controlled_view(&mut self, center: Option<LatLng>, zoom: Option<f64>) {
        let (center, zoom) = match self.sync.accept_inbound(center, zoom) {
            Some(props) => props,
            None => return,
        };

        let current = ReportedView::new(self.viewport.center(), self.viewport.zoom());
        let next = ReportedView::new(center.unwrap_or(current.center), zoom.unwrap_or(current.zoom));

        if next.differs_from(&current, CONTROLLED_ZOOM_EPSILON, CONTROLLED_COORD_EPSILON) {
            let screens = distance_in_screens(
                next.center,
                next.zoom,
                current.center,
                current.zoom,
                self.viewport.size(),
            );
            log::debug!("controlled view jumps {:.2} screen(s)", screens);
            self.sync.acknowledge(next);
            self.set_center_zoom(next.center, next.zoom);
        }
    }

    /// Registers the host callback for settled view changes
    pub fn on_bounds_changed<F>(&mut self, listener: F)
    where
        F: FnMut(&BoundsChanged) + Send + 'static,
    {
        self.sync.set_listener(Box::new(listener));
    }

    /// Delivers the pending bounds notification if its debounce window passed
    pub fn poll_sync(&mut self) -> Option<BoundsChanged> {
        let viewport = &self.viewport;
        self.sync.poll(|view| viewport.bounds_for(view.center, view.zoom))
    }

    /// Delivers the pending bounds notification right away
    pub fn flush_sync(&mut self) -> Option<BoundsChanged> {
        let viewport = &self.viewport;
        self.sync.flush(|view| viewport.bounds_for(view.center, view.zoom))
    }

    /// When [`Map::poll_sync`] should be called next
    pub fn next_sync_deadline(&self) -> Option<instant::Instant> {
        self.sync.next_deadline()
    }

    /// Handle for loaders to report completions from any thread
    pub fn notifier(&self) -> LoadNotifier {
        self.notifier.clone()
    }

    /// Applies every completion received through the notifier so far
    pub fn process_tile_events(&mut self) -> usize {
        let events = self.events.drain();
        let count = events.len();
        for event in events {
            match event {
                TileLoadEvent::Loaded(coord) => {
                    self.tile_loaded(coord);
                }
                TileLoadEvent::Failed { coord, reason } => self.tile_failed(coord, &reason),
            }
        }
        count
    }

    /// Returns true when this completion ended the cross-fade
    pub fn tile_loaded(&mut self, coord: TileCoord) -> bool {
        self.tiles.tile_loaded(coord)
    }

    pub fn tile_failed(&mut self, coord: TileCoord, reason: &str) {
        self.tiles.tile_failed(coord, reason);
    }

    /// Hands every tile not yet asked for to `loader`
    pub fn request_tiles(&mut self, loader: &mut dyn TileLoader) -> usize {
        let tiles = self.tiles.tiles(&self.viewport, self.source.as_ref(), &self.dprs);
        let requests = self.tiles.take_requests(&tiles);
        for request in &requests {
            loader.request(request, &self.notifier);
        }
        requests.len()
    }

    pub fn markers(&self) -> &[Marker] {
        &self.markers
    }

    pub fn set_markers(&mut self, markers: Vec<Marker>) {
        self.markers = markers;
    }

    pub fn add_marker(&mut self, marker: Marker) {
        self.markers.push(marker);
    }

    pub fn features(&self) -> &[Feature] {
        &self.features
    }

    pub fn set_features(&mut self, features: Vec<Feature>) {
        self.features = features;
    }

    /// Replaces the features with the ones parsed from `json`
    pub fn load_features_json(&mut self, json: &str) -> Result<()> {
        self.features = Feature::from_json(json)?;
        Ok(())
    }

    /// Computes the current frame
    pub fn frame(&self) -> RenderFrame {
        let visible = self.viewport.visible_bounds();
        RenderFrame {
            tiles: self.tiles.tiles(&self.viewport, self.source.as_ref(), &self.dprs),
            features: self.features.iter().map(|f| f.project(&self.viewport)).collect(),
            markers: self
                .markers
                .iter()
                .filter_map(|m| m.place(&self.viewport, &visible))
                .collect(),
        }
    }

    pub fn render(&self, surface: &mut dyn RenderSurface) {
        surface.draw_frame(&self.frame());
    }
}

impl fmt::Debug for Map {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Map")
            .field("viewport", &self.viewport)
            .field("tiles", &self.tiles)
            .field("sync", &self.sync)
            .field("markers", &self.markers.len())
            .field("features", &self.features.len())
            .finish_non_exhaustive()
    }
}
