use crate::core::geo::TileCoord;
use crate::prelude::{HashMap, HashSet};

/// Tracks which tiles of the committed zoom level have finished loading.
///
/// Completions may arrive in any order; coordinates that are not tracked are
/// ignored so late results from abandoned levels cannot flip the state.
#[derive(Debug, Clone, Default)]
pub struct LoadTracker {
    expected: HashMap<TileCoord, bool>,
    pending: usize,
}

impl LoadTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts tracking a fresh set of tiles, forgetting the previous one.
    /// Tiles already known to be loaded start out complete.
    pub fn reset<I>(&mut self, coords: I, already_loaded: &HashSet<TileCoord>)
    where
        I: IntoIterator<Item = TileCoord>,
    {
        self.expected.clear();
        for coord in coords {
            self.expected.insert(coord, already_loaded.contains(&coord));
        }
        self.pending = self.expected.values().filter(|loaded| !**loaded).count();
    }

    /// Records a completion. Returns true if the tile was tracked and not yet loaded.
    pub fn mark_loaded(&mut self, coord: TileCoord) -> bool {
        match self.expected.get_mut(&coord) {
            Some(loaded) if !*loaded => {
                *loaded = true;
                self.pending -= 1;
                true
            }
            _ => false,
        }
    }

    pub fn is_tracked(&self, coord: &TileCoord) -> bool {
        self.expected.contains_key(coord)
    }

    pub fn unloaded_count(&self) -> usize {
        self.pending
    }

    /// Every tracked tile has loaded
    pub fn all_loaded(&self) -> bool {
        self.pending == 0
    }

    pub fn len(&self) -> usize {
        self.expected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.expected.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coords() -> Vec<TileCoord> {
        vec![
            TileCoord::new(0, 0, 1),
            TileCoord::new(1, 0, 1),
            TileCoord::new(0, 1, 1),
        ]
    }

    #[test]
    fn test_out_of_order_completion() {
        let mut tracker = LoadTracker::new();
        tracker.reset(coords(), &HashSet::default());
        assert_eq!(tracker.unloaded_count(), 3);

        assert!(tracker.mark_loaded(TileCoord::new(0, 1, 1)));
        assert!(tracker.mark_loaded(TileCoord::new(0, 0, 1)));
        assert!(!tracker.all_loaded());
        assert!(tracker.mark_loaded(TileCoord::new(1, 0, 1)));
        assert!(tracker.all_loaded());
    }

    #[test]
    fn test_duplicates_and_strangers_are_ignored() {
        let mut tracker = LoadTracker::new();
        tracker.reset(coords(), &HashSet::default());

        assert!(tracker.mark_loaded(TileCoord::new(0, 0, 1)));
        assert!(!tracker.mark_loaded(TileCoord::new(0, 0, 1)));
        assert!(!tracker.mark_loaded(TileCoord::new(5, 5, 4)));
        assert_eq!(tracker.unloaded_count(), 2);
    }

    #[test]
    fn test_reset_respects_known_loads() {
        let mut loaded = HashSet::default();
        loaded.insert(TileCoord::new(1, 0, 1));

        let mut tracker = LoadTracker::new();
        tracker.reset(coords(), &loaded);
        assert_eq!(tracker.len(), 3);
        assert_eq!(tracker.unloaded_count(), 2);
        assert!(tracker.is_tracked(&TileCoord::new(1, 0, 1)));
    }
}
