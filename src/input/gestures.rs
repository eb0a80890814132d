use crate::core::constants::CLICK_TOLERANCE;
use crate::core::geo::Point;
use crate::core::viewport::GestureOverlay;
use crate::input::events::{GestureOutcome, TouchEvent, TouchPoint};

/// Below this two touch points count as coincident
const MIN_PINCH_DISTANCE: f64 = 1e-6;

/// Committed view the recognizer measures against
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GestureContext {
    pub zoom: f64,
    pub min_zoom: f64,
    pub max_zoom: f64,
    pub size: Point,
}

/// What the map should do after a touch sample
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GestureUpdate {
    /// Nothing changed
    None,
    /// Replace the gesture overlay
    Overlay(GestureOverlay),
    /// Fold this overlay into the committed view and drop it
    Finished {
        overlay: GestureOverlay,
        outcome: GestureOutcome,
    },
}

/// Where the current run of same-count samples started.
///
/// `base` is the overlay accumulated before this run, so switching between
/// one and two fingers never makes the content jump.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Segment {
    origin: Point,
    distance: f64,
    base: GestureOverlay,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Phase {
    Idle,
    Panning(Segment),
    Pinching(Segment),
}

/// Turns raw touch samples into a pan/pinch overlay.
///
/// One point pans, two points pinch around their midpoint, extra points are
/// ignored. The geographic point under the pinch midpoint stays under it.
#[derive(Debug, Clone)]
pub struct GestureRecognizer {
    phase: Phase,
    overlay: GestureOverlay,
    primary: Option<TouchPoint>,
    primary_start: Point,
}

impl GestureRecognizer {
    pub fn new() -> Self {
        Self {
            phase: Phase::Idle,
            overlay: GestureOverlay::default(),
            primary: None,
            primary_start: Point::default(),
        }
    }

    pub fn is_active(&self) -> bool {
        !matches!(self.phase, Phase::Idle)
    }

    pub fn is_pinching(&self) -> bool {
        matches!(self.phase, Phase::Pinching(_))
    }

    /// The overlay as of the last sample
    pub fn overlay(&self) -> GestureOverlay {
        self.overlay
    }

    pub fn handle(&mut self, event: &TouchEvent, context: &GestureContext) -> GestureUpdate {
        if event.touches.iter().any(|touch| !touch.position.is_finite()) {
            log::warn!("ignoring touch sample with non-finite position");
            return GestureUpdate::None;
        }
        log::trace!("touch {:?} with {} point(s)", event.event_type, event.touches.len());

        if event.is_release() {
            return self.finish();
        }

        let touches = &event.touches[..event.touches.len().min(2)];
        if touches.is_empty() {
            return GestureUpdate::None;
        }

        self.track_primary(touches);

        match (self.phase, touches.len()) {
            (Phase::Idle, _) => {
                self.overlay = GestureOverlay::default();
                self.anchor(touches);
                GestureUpdate::Overlay(self.overlay)
            }
            (Phase::Panning(segment), 1) => {
                self.overlay = GestureOverlay {
                    pixel_delta: segment
                        .base
                        .pixel_delta
                        .add(&touches[0].position.subtract(&segment.origin)),
                    zoom_delta: segment.base.zoom_delta,
                };
                GestureUpdate::Overlay(self.overlay)
            }
            (Phase::Pinching(segment), 2) => self.pinch(segment, touches, context),
            // Finger count changed: continue from where the content is now
            _ => {
                self.anchor(touches);
                GestureUpdate::Overlay(self.overlay)
            }
        }
    }

    fn pinch(&mut self, segment: Segment, touches: &[TouchPoint], context: &GestureContext) -> GestureUpdate {
        let mid = touches[0].position.midpoint(&touches[1].position);
        let distance = touches[0].position.distance_to(&touches[1].position);

        if segment.distance < MIN_PINCH_DISTANCE {
            // No usable reference distance yet; keep the zoom and measure from here
            if distance >= MIN_PINCH_DISTANCE {
                self.anchor(touches);
            }
            return GestureUpdate::None;
        }

        let zoom_delta = if distance < MIN_PINCH_DISTANCE {
            log::warn!("degenerate pinch distance, keeping zoom delta {}", self.overlay.zoom_delta);
            self.overlay.zoom_delta
        } else {
            let target = context.zoom + segment.base.zoom_delta + (distance / segment.distance).log2();
            target.clamp(context.min_zoom, context.max_zoom) - context.zoom
        };
        let scale = (zoom_delta - segment.base.zoom_delta).exp2();
        let screen_center = context.size.multiply(0.5);

        // d = (c - m)(s - 1) + (m - m0)s + s * base
        let pixel_delta = screen_center
            .subtract(&mid)
            .multiply(scale - 1.0)
            .add(&mid.subtract(&segment.origin).multiply(scale))
            .add(&segment.base.pixel_delta.multiply(scale));

        self.overlay = GestureOverlay { pixel_delta, zoom_delta };
        GestureUpdate::Overlay(self.overlay)
    }

    fn anchor(&mut self, touches: &[TouchPoint]) {
        let base = self.overlay;
        self.phase = match touches {
            [only] => Phase::Panning(Segment {
                origin: only.position,
                distance: 0.0,
                base,
            }),
            [first, second, ..] => Phase::Pinching(Segment {
                origin: first.position.midpoint(&second.position),
                distance: first.position.distance_to(&second.position),
                base,
            }),
            [] => Phase::Idle,
        };
    }

    fn track_primary(&mut self, touches: &[TouchPoint]) {
        match self.primary {
            None => {
                self.primary = Some(touches[0]);
                self.primary_start = touches[0].position;
            }
            Some(primary) => {
                if let Some(current) = touches.iter().find(|touch| touch.id == primary.id) {
                    self.primary = Some(*current);
                }
            }
        }
    }

    fn finish(&mut self) -> GestureUpdate {
        if !self.is_active() {
            return GestureUpdate::None;
        }
        let overlay = self.overlay;
        let outcome = match self.primary {
            Some(primary) => {
                let moved = primary.position.subtract(&self.primary_start);
                if moved.x.abs() <= CLICK_TOLERANCE && moved.y.abs() <= CLICK_TOLERANCE {
                    GestureOutcome::Tap {
                        position: primary.position,
                    }
                } else {
                    GestureOutcome::Moved
                }
            }
            None => GestureOutcome::Moved,
        };
        self.reset();
        GestureUpdate::Finished { overlay, outcome }
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }
}

impl Default for GestureRecognizer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::geo::LatLng;
    use crate::core::viewport::ViewportState;
    use approx::assert_abs_diff_eq;

    fn context(zoom: f64) -> GestureContext {
        GestureContext {
            zoom,
            min_zoom: 1.0,
            max_zoom: 18.0,
            size: Point::new(512.0, 512.0),
        }
    }

    fn overlay_of(update: GestureUpdate) -> GestureOverlay {
        match update {
            GestureUpdate::Overlay(overlay) => overlay,
            other => panic!("expected an overlay, got {:?}", other),
        }
    }

    #[test]
    fn test_pan_delta() {
        let mut recognizer = GestureRecognizer::new();
        let ctx = context(5.0);

        recognizer.handle(&TouchEvent::start(vec![TouchPoint::new(1, 100.0, 100.0)]), &ctx);
        let overlay = overlay_of(recognizer.handle(&TouchEvent::moved(vec![TouchPoint::new(1, 150.0, 70.0)]), &ctx));

        assert_eq!(overlay.pixel_delta, Point::new(50.0, -30.0));
        assert_eq!(overlay.zoom_delta, 0.0);
    }

    #[test]
    fn test_tap_and_move_outcomes() {
        let ctx = context(5.0);

        let mut recognizer = GestureRecognizer::new();
        recognizer.handle(&TouchEvent::start(vec![TouchPoint::new(1, 10.0, 10.0)]), &ctx);
        recognizer.handle(&TouchEvent::moved(vec![TouchPoint::new(1, 12.0, 8.0)]), &ctx);
        match recognizer.handle(&TouchEvent::end(vec![]), &ctx) {
            GestureUpdate::Finished { outcome, .. } => {
                assert_eq!(outcome, GestureOutcome::Tap { position: Point::new(12.0, 8.0) })
            }
            other => panic!("unexpected {:?}", other),
        }
        assert!(!recognizer.is_active());

        recognizer.handle(&TouchEvent::start(vec![TouchPoint::new(1, 10.0, 10.0)]), &ctx);
        recognizer.handle(&TouchEvent::moved(vec![TouchPoint::new(1, 13.0, 10.0)]), &ctx);
        match recognizer.handle(&TouchEvent::cancel(), &ctx) {
            GestureUpdate::Finished { outcome, overlay } => {
                assert_eq!(outcome, GestureOutcome::Moved);
                assert_eq!(overlay.pixel_delta, Point::new(3.0, 0.0));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_pinch_zoom_delta() {
        let mut recognizer = GestureRecognizer::new();
        let ctx = context(5.0);

        recognizer.handle(
            &TouchEvent::start(vec![TouchPoint::new(1, 206.0, 256.0), TouchPoint::new(2, 306.0, 256.0)]),
            &ctx,
        );
        let overlay = overlay_of(recognizer.handle(
            &TouchEvent::moved(vec![TouchPoint::new(1, 156.0, 256.0), TouchPoint::new(2, 356.0, 256.0)]),
            &ctx,
        ));

        // Twice the distance around the screen center: one level in, no shift
        assert_abs_diff_eq!(overlay.zoom_delta, 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(overlay.pixel_delta.x, 0.0, epsilon = 1e-9);
        assert_abs_diff_eq!(overlay.pixel_delta.y, 0.0, epsilon = 1e-9);
    }

    #[test]
    fn test_pinch_keeps_anchor_under_midpoint() {
        let mut recognizer = GestureRecognizer::new();
        let ctx = context(5.0);
        let mut viewport = ViewportState::new(LatLng::new(20.0, 10.0), 5.0, ctx.size);

        let start = [TouchPoint::new(1, 80.0, 120.0), TouchPoint::new(2, 180.0, 160.0)];
        let mid0 = start[0].position.midpoint(&start[1].position);
        let anchor = viewport.pixel_to_lat_lng(mid0);
        recognizer.handle(&TouchEvent::start(start.to_vec()), &ctx);

        for (spread, shift) in [(1.3, 10.0), (2.1, -40.0), (0.6, 25.0)] {
            let a = Point::new(80.0 - 50.0 * (spread - 1.0) + shift, 120.0 + shift);
            let b = Point::new(180.0 + 50.0 * (spread - 1.0) + shift, 160.0 + shift);
            let overlay = overlay_of(recognizer.handle(
                &TouchEvent::moved(vec![
                    TouchPoint { id: 1, position: a },
                    TouchPoint { id: 2, position: b },
                ]),
                &ctx,
            ));
            viewport.set_overlay(overlay);

            let drawn = viewport.lat_lng_to_pixel(anchor);
            let mid = a.midpoint(&b);
            assert_abs_diff_eq!(drawn.x, mid.x, epsilon = 1.0);
            assert_abs_diff_eq!(drawn.y, mid.y, epsilon = 1.0);
        }
    }

    #[test]
    fn test_pinch_respects_zoom_limits() {
        let mut recognizer = GestureRecognizer::new();
        let ctx = context(17.5);

        recognizer.handle(
            &TouchEvent::start(vec![TouchPoint::new(1, 246.0, 256.0), TouchPoint::new(2, 266.0, 256.0)]),
            &ctx,
        );
        let overlay = overlay_of(recognizer.handle(
            &TouchEvent::moved(vec![TouchPoint::new(1, 56.0, 256.0), TouchPoint::new(2, 456.0, 256.0)]),
            &ctx,
        ));
        assert_abs_diff_eq!(overlay.zoom_delta, 0.5, epsilon = 1e-12);
    }

    #[test]
    fn test_finger_count_change_does_not_jump() {
        let mut recognizer = GestureRecognizer::new();
        let ctx = context(5.0);

        recognizer.handle(&TouchEvent::start(vec![TouchPoint::new(1, 100.0, 100.0)]), &ctx);
        recognizer.handle(&TouchEvent::moved(vec![TouchPoint::new(1, 120.0, 100.0)]), &ctx);

        // Second finger lands: the overlay carries over unchanged
        let overlay = overlay_of(recognizer.handle(
            &TouchEvent::start(vec![TouchPoint::new(1, 120.0, 100.0), TouchPoint::new(2, 220.0, 100.0)]),
            &ctx,
        ));
        assert_eq!(overlay.pixel_delta, Point::new(20.0, 0.0));
        assert!(recognizer.is_pinching());

        // Same spread, moved together: pure translation on top of the base
        let overlay = overlay_of(recognizer.handle(
            &TouchEvent::moved(vec![TouchPoint::new(1, 130.0, 110.0), TouchPoint::new(2, 230.0, 110.0)]),
            &ctx,
        ));
        assert_abs_diff_eq!(overlay.pixel_delta.x, 30.0, epsilon = 1e-9);
        assert_abs_diff_eq!(overlay.pixel_delta.y, 10.0, epsilon = 1e-9);

        // Second finger lifts: panning resumes from the current overlay
        let overlay = overlay_of(recognizer.handle(&TouchEvent::end(vec![TouchPoint::new(1, 130.0, 110.0)]), &ctx));
        assert_abs_diff_eq!(overlay.pixel_delta.x, 30.0, epsilon = 1e-9);
        let overlay = overlay_of(recognizer.handle(&TouchEvent::moved(vec![TouchPoint::new(1, 140.0, 110.0)]), &ctx));
        assert_abs_diff_eq!(overlay.pixel_delta.x, 40.0, epsilon = 1e-9);
    }

    #[test]
    fn test_extra_touches_are_ignored() {
        let mut recognizer = GestureRecognizer::new();
        let ctx = context(5.0);

        recognizer.handle(
            &TouchEvent::start(vec![
                TouchPoint::new(1, 206.0, 256.0),
                TouchPoint::new(2, 306.0, 256.0),
                TouchPoint::new(3, 0.0, 0.0),
            ]),
            &ctx,
        );
        let overlay = overlay_of(recognizer.handle(
            &TouchEvent::moved(vec![
                TouchPoint::new(1, 156.0, 256.0),
                TouchPoint::new(2, 356.0, 256.0),
                TouchPoint::new(3, 500.0, 500.0),
            ]),
            &ctx,
        ));
        assert_abs_diff_eq!(overlay.zoom_delta, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_zero_distance_pinch_keeps_zoom() {
        let mut recognizer = GestureRecognizer::new();
        let ctx = context(5.0);

        recognizer.handle(
            &TouchEvent::start(vec![TouchPoint::new(1, 200.0, 200.0), TouchPoint::new(2, 200.0, 200.0)]),
            &ctx,
        );
        let update = recognizer.handle(
            &TouchEvent::moved(vec![TouchPoint::new(1, 190.0, 200.0), TouchPoint::new(2, 210.0, 200.0)]),
            &ctx,
        );
        assert_eq!(update, GestureUpdate::None);
        assert_eq!(recognizer.overlay().zoom_delta, 0.0);

        // Measured from the re-anchored distance of 20px
        let overlay = overlay_of(recognizer.handle(
            &TouchEvent::moved(vec![TouchPoint::new(1, 180.0, 200.0), TouchPoint::new(2, 220.0, 200.0)]),
            &ctx,
        ));
        assert_abs_diff_eq!(overlay.zoom_delta, 1.0, epsilon = 1e-12);
        assert!(overlay.pixel_delta.is_finite());
    }

    #[test]
    fn test_end_without_gesture_is_ignored() {
        let mut recognizer = GestureRecognizer::new();
        assert_eq!(recognizer.handle(&TouchEvent::end(vec![]), &context(3.0)), GestureUpdate::None);
    }
}
