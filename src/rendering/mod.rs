pub mod frame;

// Re-export main types
pub use frame::{RenderFrame, RenderSurface};
