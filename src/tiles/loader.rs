use crossbeam_channel::{unbounded, Receiver, Sender};
use serde::{Deserialize, Serialize};

use crate::core::geo::TileCoord;
use crate::Result;

/// Outcome of one tile request, keyed by the requested coordinate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TileLoadEvent {
    Loaded(TileCoord),
    Failed { coord: TileCoord, reason: String },
}

impl TileLoadEvent {
    pub fn coord(&self) -> TileCoord {
        match self {
            TileLoadEvent::Loaded(coord) => *coord,
            TileLoadEvent::Failed { coord, .. } => *coord,
        }
    }
}

/// A tile the engine wants on screen
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TileRequest {
    pub coord: TileCoord,
    pub url: String,
    pub src_set: String,
}

/// Cloneable handle loaders use to report completions, from any thread.
#[derive(Debug, Clone)]
pub struct LoadNotifier {
    tx: Sender<TileLoadEvent>,
}

impl LoadNotifier {
    pub fn loaded(&self, coord: TileCoord) {
        self.send(TileLoadEvent::Loaded(coord));
    }

    pub fn failed(&self, coord: TileCoord, reason: impl Into<String>) {
        self.send(TileLoadEvent::Failed {
            coord,
            reason: reason.into(),
        });
    }

    /// Reports a completion by its `x-y-z` key
    pub fn loaded_key(&self, key: &str) -> Result<()> {
        self.loaded(key.parse()?);
        Ok(())
    }

    fn send(&self, event: TileLoadEvent) {
        // The map owns the receiver; once it is gone nobody needs the event.
        if self.tx.send(event).is_err() {
            log::debug!("tile event dropped, map no longer listening");
        }
    }
}

/// Receiving side of the completion channel, drained by the map
#[derive(Debug)]
pub struct LoadEvents {
    rx: Receiver<TileLoadEvent>,
}

impl LoadEvents {
    /// Takes every completion that has arrived so far, in arrival order
    pub fn drain(&self) -> Vec<TileLoadEvent> {
        self.rx.try_iter().collect()
    }
}

pub fn channel() -> (LoadNotifier, LoadEvents) {
    let (tx, rx) = unbounded();
    (LoadNotifier { tx }, LoadEvents { rx })
}

/// Collaborator that turns a tile request into a displayable image and
/// reports back through the notifier. Fetching and disk caching live here,
/// outside the engine.
pub trait TileLoader {
    fn request(&mut self, request: &TileRequest, notifier: &LoadNotifier);
}
