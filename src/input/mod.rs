pub mod events;
pub mod gestures;

// Re-export the essential types
pub use events::{GestureOutcome, TouchEvent, TouchEventType, TouchPoint};
pub use gestures::{GestureContext, GestureRecognizer, GestureUpdate};
