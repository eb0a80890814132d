pub mod marker;
pub mod tile;
pub mod vector;

pub use marker::{Marker, PlacedMarker};
pub use tile::{TileDescriptor, TileRange, TileSetBuilder};
pub use vector::{Feature, FeatureKind, FeatureStyle, ProjectedFeature};
