//! Tokio driver for the debounced host notifications
//!
//! The engine itself never sleeps; it only reports when the next
//! notification is due. These helpers wait for that deadline on a tokio
//! runtime and deliver the notification.

use std::time::Duration;

use crate::core::map::Map;
use crate::sync::boundary::BoundsChanged;

/// Shortest wait between polls, so a deadline that has just passed is not
/// polled in a tight loop.
const MIN_POLL_INTERVAL: Duration = Duration::from_millis(1);

/// Waits until no notification is pending, applying tile completions along
/// the way. Returns the last notification delivered.
///
/// The map must run on [`crate::sync::SystemClock`]; a manual clock never
/// reaches its deadline on its own.
pub async fn settle(map: &mut Map) -> Option<BoundsChanged> {
    let mut last = None;

    loop {
        map.process_tile_events();

        let deadline = match map.next_sync_deadline() {
            Some(deadline) => deadline,
            None => return last,
        };

        let wait = deadline
            .saturating_duration_since(instant::Instant::now())
            .max(MIN_POLL_INTERVAL);
        tokio::time::sleep(wait).await;

        if let Some(event) = map.poll_sync() {
            log::debug!("settled at {:?} zoom {}", event.center, event.zoom);
            last = Some(event);
        }
    }
}

/// Delivers whatever is due right now and returns how long to wait before
/// calling again, if anything is still pending.
pub fn tick(map: &mut Map) -> (Option<BoundsChanged>, Option<Duration>) {
    map.process_tile_events();
    let delivered = map.poll_sync();
    let next = map
        .next_sync_deadline()
        .map(|deadline| deadline.saturating_duration_since(instant::Instant::now()));
    (delivered, next)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::MapOptions;
    use crate::core::geo::LatLng;

    #[tokio::test]
    async fn test_settle_delivers_latest_view() {
        let mut map = Map::new(MapOptions::default().with_default_center(LatLng::default(), 4.0));
        map.set_center_zoom(LatLng::new(10.0, 10.0), 5.0);
        map.set_center_zoom(LatLng::new(20.0, 20.0), 6.0);

        let event = settle(&mut map).await.unwrap();
        assert_eq!(event.zoom, 6.0);
        assert_eq!(event.center, LatLng::new(20.0, 20.0));
        assert!(map.next_sync_deadline().is_none());
    }

    #[tokio::test]
    async fn test_settle_without_pending_returns_immediately() {
        let mut map = Map::new(MapOptions::default());
        map.flush_sync();
        assert!(settle(&mut map).await.is_none());
    }

    #[test]
    fn test_tick_reports_remaining_wait() {
        let mut map = Map::new(MapOptions::default().with_debounce_ms(60_000));
        let (delivered, next) = tick(&mut map);
        assert!(delivered.is_none());
        assert!(next.unwrap() > Duration::from_millis(50_000));
    }
}
