use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::core::constants::{REPORT_COORD_EPSILON, REPORT_ZOOM_EPSILON};
use crate::core::geo::{LatLng, LatLngBounds};
use crate::sync::debounce::{Clock, Debouncer};

/// Payload delivered to the host when the view settles
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoundsChanged {
    pub center: LatLng,
    pub zoom: f64,
    pub bounds: LatLngBounds,
    /// Only set on the first delivery after the map was created
    pub initial: bool,
}

/// A (center, zoom) pair as seen by the host
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReportedView {
    pub center: LatLng,
    pub zoom: f64,
}

impl ReportedView {
    pub fn new(center: LatLng, zoom: f64) -> Self {
        Self { center, zoom }
    }

    pub fn differs_from(&self, other: &ReportedView, zoom_epsilon: f64, coord_epsilon: f64) -> bool {
        (self.zoom - other.zoom).abs() > zoom_epsilon || !self.center.approx_eq(&other.center, coord_epsilon)
    }
}

pub type BoundsListener = Box<dyn FnMut(&BoundsChanged) + Send>;

/// Keeps the host informed of the committed view without flooding it.
pub struct BoundarySync {
    debouncer: Debouncer<ReportedView>,
    last_reported: ReportedView,
    synced: bool,
    listener: Option<BoundsListener>,
    last_inbound: Option<(Option<LatLng>, Option<f64>)>,
}

impl BoundarySync {
    /// The first notification, flagged `initial`, is scheduled right away
    pub fn new(initial: ReportedView, delay: Duration, clock: Arc<dyn Clock>) -> Self {
        let mut debouncer = Debouncer::new(delay, clock);
        debouncer.schedule(initial);
        Self {
            debouncer,
            last_reported: initial,
            synced: false,
            listener: None,
            last_inbound: None,
        }
    }

    pub fn set_listener(&mut self, listener: BoundsListener) {
        self.listener = Some(listener);
    }

    pub fn last_reported(&self) -> ReportedView {
        self.last_reported
    }

    /// Schedules a notification if `view` moved away from what the host last
    /// heard about. Returns whether one was scheduled.
    pub fn note_commit(&mut self, view: ReportedView) -> bool {
        if !view.differs_from(&self.last_reported, REPORT_ZOOM_EPSILON, REPORT_COORD_EPSILON) {
            return false;
        }
        self.last_reported = view;
        self.debouncer.schedule(view);
        true
    }

    /// Records a view the host already knows about, so committing it does
    /// not echo back. A notification still pending from an earlier commit is
    /// superseded by `view`, so it cannot deliver a stale view afterwards.
    pub fn acknowledge(&mut self, view: ReportedView) {
        self.last_reported = view;
        if self.debouncer.is_pending() {
            self.debouncer.schedule(view);
        }
    }

    /// Filters inbound controlled values: nothing set, or the same values as
    /// last time, yields `None`.
    pub fn accept_inbound(&mut self, center: Option<LatLng>, zoom: Option<f64>) -> Option<(Option<LatLng>, Option<f64>)> {
        if center.is_none() && zoom.is_none() {
            return None;
        }
        let props = (center, zoom);
        if self.last_inbound == Some(props) {
            return None;
        }
        self.last_inbound = Some(props);
        Some(props)
    }

    pub fn next_deadline(&self) -> Option<instant::Instant> {
        self.debouncer.deadline()
    }

    pub fn is_pending(&self) -> bool {
        self.debouncer.is_pending()
    }

    /// Delivers the pending notification once its window has passed.
    /// `bounds_for` supplies the screen extent for the reported view.
    pub fn poll<F>(&mut self, bounds_for: F) -> Option<BoundsChanged>
    where
        F: FnOnce(&ReportedView) -> LatLngBounds,
    {
        let view = self.debouncer.poll()?;
        Some(self.deliver(view, bounds_for))
    }

    /// Delivers the pending notification immediately
    pub fn flush<F>(&mut self, bounds_for: F) -> Option<BoundsChanged>
    where
        F: FnOnce(&ReportedView) -> LatLngBounds,
    {
        let view = self.debouncer.flush()?;
        Some(self.deliver(view, bounds_for))
    }

    fn deliver<F>(&mut self, view: ReportedView, bounds_for: F) -> BoundsChanged
    where
        F: FnOnce(&ReportedView) -> LatLngBounds,
    {
        let payload = BoundsChanged {
            center: view.center,
            zoom: view.zoom,
            bounds: bounds_for(&view),
            initial: !self.synced,
        };
        if let Some(listener) = self.listener.as_mut() {
            listener(&payload);
            self.synced = true;
        }
        payload
    }
}

impl fmt::Debug for BoundarySync {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoundarySync")
            .field("debouncer", &self.debouncer)
            .field("last_reported", &self.last_reported)
            .field("synced", &self.synced)
            .field("has_listener", &self.listener.is_some())
            .finish()
    }
}
