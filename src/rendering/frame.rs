use serde::{Deserialize, Serialize};

use crate::layers::marker::PlacedMarker;
use crate::layers::tile::TileDescriptor;
use crate::layers::vector::ProjectedFeature;

/// Everything needed to paint one frame, in paint order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RenderFrame {
    /// Cross-fade backdrops first, then the active level
    pub tiles: Vec<TileDescriptor>,
    pub features: Vec<ProjectedFeature>,
    pub markers: Vec<PlacedMarker>,
}

impl RenderFrame {
    pub fn active_tiles(&self) -> impl Iterator<Item = &TileDescriptor> {
        self.tiles.iter().filter(|tile| tile.active)
    }

    pub fn backdrop_tiles(&self) -> impl Iterator<Item = &TileDescriptor> {
        self.tiles.iter().filter(|tile| !tile.active)
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty() && self.features.is_empty() && self.markers.is_empty()
    }
}

/// A drawing backend. The engine computes positions; the surface paints them.
pub trait RenderSurface {
    fn draw_tiles(&mut self, tiles: &[TileDescriptor]);

    fn draw_features(&mut self, features: &[ProjectedFeature]);

    fn draw_markers(&mut self, markers: &[PlacedMarker]);

    /// Paints a whole frame bottom to top
    fn draw_frame(&mut self, frame: &RenderFrame) {
        self.draw_tiles(&frame.tiles);
        self.draw_features(&frame.features);
        self.draw_markers(&frame.markers);
    }
}
