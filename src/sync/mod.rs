//! Outbound bounds notifications and inbound controlled values

pub mod boundary;
pub mod debounce;

pub use boundary::{BoundarySync, BoundsChanged, BoundsListener, ReportedView};
pub use debounce::{Clock, Debouncer, ManualClock, SystemClock};
