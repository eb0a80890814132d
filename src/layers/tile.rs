//! Tile set computation and cross-fade bookkeeping
//!
//! The builder answers two questions every frame: which tiles of the rounded
//! effective zoom cover the screen and where they go, and which tiles of
//! earlier zoom levels stay underneath until the new level has loaded.

use serde::{Deserialize, Serialize};

use crate::core::bounds::Bounds;
use crate::core::constants::{MAX_RETAINED_ZOOM_DISTANCE, TILE_SIZE};
use crate::core::geo::{LatLng, Point, TileCoord};
use crate::core::projection::{lat_to_tile_y, lng_to_tile_x};
use crate::core::viewport::ViewportState;
use crate::prelude::HashSet;
use crate::tiles::loader::TileRequest;
use crate::tiles::source::TileSource;
use crate::tiles::tracker::LoadTracker;

/// Integer tile range covering the screen for one view, before edge clipping
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TileRange {
    pub min_x: i64,
    pub max_x: i64,
    pub min_y: i64,
    pub max_y: i64,
    pub tile_center_x: f64,
    pub tile_center_y: f64,
    pub rounded_zoom: u8,
    /// Screen size in pixels of the rounded zoom level
    pub scale_width: f64,
    pub scale_height: f64,
    /// Visual scale between the rounded zoom and the effective zoom
    pub scale: f64,
}

impl TileRange {
    /// Range for `center` at `zoom + zoom_delta` with the content shifted by `pixel_delta`
    pub fn compute(center: LatLng, zoom: f64, zoom_delta: f64, pixel_delta: Point, size: Point) -> Self {
        let effective = zoom + zoom_delta;
        let rounded = effective.round().max(0.0);
        let scale = 2_f64.powf(effective - rounded);

        let scale_width = size.x / scale;
        let scale_height = size.y / scale;

        let tile_center_x = lng_to_tile_x(center.lng, rounded) - pixel_delta.x / TILE_SIZE / scale;
        let tile_center_y = lat_to_tile_y(center.lat, rounded) - pixel_delta.y / TILE_SIZE / scale;

        let half_width = scale_width / 2.0 / TILE_SIZE;
        let half_height = scale_height / 2.0 / TILE_SIZE;

        // The upper edge is exclusive: a tile starting exactly at the screen
        // edge is not visible.
        Self {
            min_x: (tile_center_x - half_width).floor() as i64,
            max_x: (tile_center_x + half_width).ceil() as i64 - 1,
            min_y: (tile_center_y - half_height).floor() as i64,
            max_y: (tile_center_y + half_height).ceil() as i64 - 1,
            tile_center_x,
            tile_center_y,
            rounded_zoom: rounded as u8,
            scale_width,
            scale_height,
            scale,
        }
    }

    /// Range currently on screen, gesture overlay included
    pub fn for_viewport(viewport: &ViewportState) -> Self {
        let overlay = viewport.overlay().unwrap_or_default();
        Self::compute(
            viewport.center(),
            viewport.zoom(),
            overlay.zoom_delta,
            overlay.pixel_delta,
            viewport.size(),
        )
    }

    /// Range of the committed view alone
    pub fn for_committed(center: LatLng, zoom: f64, size: Point) -> Self {
        Self::compute(center, zoom, 0.0, Point::default(), size)
    }

    /// Tile coordinates of the range clipped to `[0, 2^z)`, column by column
    pub fn coords(&self) -> impl Iterator<Item = TileCoord> {
        let last = TileCoord::tiles_per_axis(self.rounded_zoom) as i64 - 1;
        let min_x = self.min_x.max(0);
        let max_x = self.max_x.min(last);
        let min_y = self.min_y.max(0);
        let max_y = self.max_y.min(last);
        let z = self.rounded_zoom;

        (min_x..=max_x).flat_map(move |x| (min_y..=max_y).map(move |y| TileCoord::new(x as u32, y as u32, z)))
    }

    pub fn contains(&self, coord: &TileCoord) -> bool {
        let (x, y) = (coord.x as i64, coord.y as i64);
        coord.z == self.rounded_zoom && x >= self.min_x && x <= self.max_x && y >= self.min_y && y <= self.max_y
    }

    /// Screen position of the top-left corner of tile (`min_x`, `min_y`) before scaling
    fn origin(&self) -> Point {
        Point::new(
            -((self.tile_center_x - self.min_x as f64) * TILE_SIZE - self.scale_width / 2.0),
            -((self.tile_center_y - self.min_y as f64) * TILE_SIZE - self.scale_height / 2.0),
        )
    }

    /// Screen rect of one of this range's own tiles
    fn rect_for(&self, coord: &TileCoord) -> Bounds {
        let origin = self.origin();
        let size = TILE_SIZE * self.scale;
        let left = ((coord.x as f64 - self.min_x as f64) * TILE_SIZE + origin.x) * self.scale;
        let top = ((coord.y as f64 - self.min_y as f64) * TILE_SIZE + origin.y) * self.scale;
        Bounds::from_origin_and_size(Point::new(left, top), size, size)
    }

    /// Screen rect of a tile from an older range, placed under this range's tiles
    fn reprojected_rect(&self, old: &TileRange, coord: &TileCoord) -> Bounds {
        let origin = self.origin();
        // Size of one old tile measured in tiles of this level
        let pow = 2_f64.powi(self.rounded_zoom as i32 - old.rounded_zoom as i32);

        let x_diff = -(self.min_x as f64 - old.min_x as f64 * pow) * TILE_SIZE;
        let y_diff = -(self.min_y as f64 - old.min_y as f64 * pow) * TILE_SIZE;

        let left = (x_diff + (coord.x as f64 - old.min_x as f64) * TILE_SIZE * pow + origin.x) * self.scale;
        let top = (y_diff + (coord.y as f64 - old.min_y as f64) * TILE_SIZE * pow + origin.y) * self.scale;
        let size = TILE_SIZE * pow * self.scale;
        Bounds::from_origin_and_size(Point::new(left, top), size, size)
    }

    fn zoom_distance(&self, other: &TileRange) -> i32 {
        (self.rounded_zoom as i32 - other.rounded_zoom as i32).abs()
    }
}

/// One raster tile to paint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TileDescriptor {
    pub coord: TileCoord,
    pub url: String,
    pub src_set: String,
    pub rect: Bounds,
    pub opacity: f32,
    /// Part of the rounded effective zoom rather than a cross-fade backdrop
    pub active: bool,
    pub loaded: bool,
}

impl TileDescriptor {
    /// The `x-y-z` key loaders report completions with
    pub fn key(&self) -> String {
        self.coord.to_string()
    }
}

/// Owns the committed tile range, the retained cross-fade snapshots and the
/// load bookkeeping for both.
#[derive(Debug, Clone)]
pub struct TileSetBuilder {
    committed: TileRange,
    retained: Vec<TileRange>,
    tracker: LoadTracker,
    loaded: HashSet<TileCoord>,
    requested: HashSet<TileCoord>,
    failed: HashSet<TileCoord>,
}

impl TileSetBuilder {
    pub fn new(committed: TileRange) -> Self {
        let mut tracker = LoadTracker::new();
        tracker.reset(committed.coords(), &HashSet::default());
        Self {
            committed,
            retained: Vec::new(),
            tracker,
            loaded: HashSet::default(),
            requested: HashSet::default(),
            failed: HashSet::default(),
        }
    }

    pub fn committed(&self) -> &TileRange {
        &self.committed
    }

    /// Older zoom levels still kept for cross-fade
    pub fn retained(&self) -> &[TileRange] {
        &self.retained
    }

    pub fn tracker(&self) -> &LoadTracker {
        &self.tracker
    }

    /// Installs the range of a newly committed view.
    ///
    /// When the rounded zoom changes the outgoing range is retained, replacing
    /// any snapshot of the same level. Snapshots too far from the new level,
    /// or at the new level itself, are dropped.
    pub fn commit(&mut self, range: TileRange) {
        let outgoing = std::mem::replace(&mut self.committed, range);

        if outgoing.rounded_zoom != range.rounded_zoom {
            self.retained.retain(|old| old.rounded_zoom != outgoing.rounded_zoom);
            self.retained.push(outgoing);
            log::debug!(
                "zoom level {} -> {}, retaining {} snapshot(s)",
                outgoing.rounded_zoom,
                range.rounded_zoom,
                self.retained.len()
            );
        }

        self.retained.retain(|old| {
            let distance = old.zoom_distance(&range);
            distance != 0 && distance <= MAX_RETAINED_ZOOM_DISTANCE
        });

        // Failed tiles get one more chance per commit
        for coord in self.failed.drain() {
            self.requested.remove(&coord);
        }

        let live: Vec<TileRange> = self.retained.iter().copied().chain(Some(range)).collect();
        let is_live = |coord: &TileCoord| live.iter().any(|r| r.contains(coord));
        self.loaded.retain(is_live);
        self.requested.retain(is_live);

        self.tracker.reset(range.coords(), &self.loaded);
        if self.tracker.all_loaded() {
            self.retained.clear();
        }
    }

    /// Records a completed tile. Returns true when this completion finished the
    /// committed level and the cross-fade backdrop was dropped.
    pub fn tile_loaded(&mut self, coord: TileCoord) -> bool {
        self.loaded.insert(coord);

        if self.tracker.mark_loaded(coord) && self.tracker.all_loaded() && !self.retained.is_empty() {
            log::debug!("level {} fully loaded, dropping cross-fade", self.committed.rounded_zoom);
            self.retained.clear();
            return true;
        }
        false
    }

    /// A failed tile stays unloaded; it is not requested again until the next commit.
    pub fn tile_failed(&mut self, coord: TileCoord, reason: &str) {
        log::warn!("tile {} failed to load: {}", coord, reason);
        if self.requested.contains(&coord) {
            self.failed.insert(coord);
        }
    }

    pub fn is_loaded(&self, coord: &TileCoord) -> bool {
        self.loaded.contains(coord)
    }

    /// Every tile to paint for `viewport`, backdrops first
    pub fn tiles(&self, viewport: &ViewportState, source: &dyn TileSource, dprs: &[u32]) -> Vec<TileDescriptor> {
        let current = TileRange::for_viewport(viewport);
        let mut tiles = Vec::new();

        // During a pinch the committed level is a backdrop too
        let committed_backdrop = Some(self.committed).filter(|c| c.rounded_zoom != current.rounded_zoom);

        for old in self.retained.iter().chain(committed_backdrop.iter()) {
            let distance = old.zoom_distance(&current);
            if distance == 0 || distance > MAX_RETAINED_ZOOM_DISTANCE {
                continue;
            }
            for coord in old.coords() {
                let rect = current.reprojected_rect(old, &coord);
                tiles.push(self.describe(coord, rect, false, source, dprs));
            }
        }

        for coord in current.coords() {
            let rect = current.rect_for(&coord);
            tiles.push(self.describe(coord, rect, true, source, dprs));
        }

        tiles
    }

    /// Requests for tiles that are neither loaded nor already asked for
    pub fn take_requests(&mut self, tiles: &[TileDescriptor]) -> Vec<TileRequest> {
        tiles
            .iter()
            .filter(|tile| !tile.loaded)
            .filter(|tile| self.requested.insert(tile.coord))
            .map(|tile| TileRequest {
                coord: tile.coord,
                url: tile.url.clone(),
                src_set: tile.src_set.clone(),
            })
            .collect()
    }

    fn describe(
        &self,
        coord: TileCoord,
        rect: Bounds,
        active: bool,
        source: &dyn TileSource,
        dprs: &[u32],
    ) -> TileDescriptor {
        TileDescriptor {
            coord,
            url: source.url(coord, None),
            src_set: source.src_set(coord, dprs),
            rect,
            opacity: 1.0,
            active,
            loaded: self.loaded.contains(&coord),
        }
    }
}
