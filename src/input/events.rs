use crate::core::geo::Point;
use serde::{Deserialize, Serialize};

/// Types of touch events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TouchEventType {
    Start,
    Move,
    End,
    Cancel,
}

/// Individual touch point
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TouchPoint {
    pub id: u64,
    pub position: Point,
}

impl TouchPoint {
    pub fn new(id: u64, x: f64, y: f64) -> Self {
        Self {
            id,
            position: Point::new(x, y),
        }
    }
}

/// A touch sample in viewport pixel coordinates.
///
/// `touches` lists the points still down after the event, so an `End` with
/// touches left over is a finger lifting mid-gesture.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TouchEvent {
    pub event_type: TouchEventType,
    pub touches: Vec<TouchPoint>,
}

impl TouchEvent {
    pub fn new(event_type: TouchEventType, touches: Vec<TouchPoint>) -> Self {
        Self { event_type, touches }
    }

    pub fn start(touches: Vec<TouchPoint>) -> Self {
        Self::new(TouchEventType::Start, touches)
    }

    pub fn moved(touches: Vec<TouchPoint>) -> Self {
        Self::new(TouchEventType::Move, touches)
    }

    pub fn end(touches: Vec<TouchPoint>) -> Self {
        Self::new(TouchEventType::End, touches)
    }

    pub fn cancel() -> Self {
        Self::new(TouchEventType::Cancel, Vec::new())
    }

    /// True when no finger is left on the surface
    pub fn is_release(&self) -> bool {
        match self.event_type {
            TouchEventType::Cancel => true,
            TouchEventType::End => self.touches.is_empty(),
            _ => false,
        }
    }
}

/// Outcome reported when a gesture finishes
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum GestureOutcome {
    /// The primary touch stayed within the click tolerance
    Tap { position: Point },
    Moved,
}
