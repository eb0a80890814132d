pub mod loader;
pub mod source;
pub mod tracker;

// Re-exports for convenience
pub use loader::{LoadEvents, LoadNotifier, TileLoadEvent, TileLoader, TileRequest};
pub use source::{FnSource, Provider, TileSource};
pub use tracker::LoadTracker;
