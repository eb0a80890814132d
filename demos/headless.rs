use anyhow::Context;
use slipmap::prelude::*;
use std::sync::Arc;
use std::time::Duration;

/// Loader that "fetches" every tile instantly, failing a few to show the
/// failure path.
struct InstantLoader {
    fetched: usize,
}

impl TileLoader for InstantLoader {
    fn request(&mut self, request: &TileRequest, notifier: &LoadNotifier) {
        self.fetched += 1;
        log::debug!("fetching {}", request.url);
        if request.coord.x % 7 == 0 && request.coord.y % 5 == 0 {
            notifier.failed(request.coord, "simulated 503");
        } else {
            notifier.loaded(request.coord);
        }
    }
}

/// Surface that prints what it would paint
struct ConsoleSurface;

impl RenderSurface for ConsoleSurface {
    fn draw_tiles(&mut self, tiles: &[TileDescriptor]) {
        let backdrops = tiles.iter().filter(|tile| !tile.active).count();
        let loaded = tiles.iter().filter(|tile| tile.loaded).count();
        println!(
            "   tiles: {} ({} backdrop, {} loaded)",
            tiles.len(),
            backdrops,
            loaded
        );
    }

    fn draw_features(&mut self, features: &[slipmap::ProjectedFeature]) {
        for feature in features {
            println!("   {:?} with {} points, stroke {}", feature.kind, feature.points.len(), feature.stroke);
        }
    }

    fn draw_markers(&mut self, markers: &[slipmap::PlacedMarker]) {
        for marker in markers {
            println!("   marker {} at ({:.1}, {:.1})", marker.id, marker.rect.min.x, marker.rect.min.y);
        }
    }
}

/// Drives the engine without any UI: a pan, a pinch and a host update.
fn main() -> anyhow::Result<()> {
    env_logger::init();

    let options = MapOptions::from_json(
        r#"{ "default_center": { "lat": 37.7749, "lng": -122.4194 }, "default_zoom": 12, "width": 1024, "height": 768, "provider": "osm", "pixel_ratio": 2 }"#,
    )
    .context("parsing map options")?;

    let clock = Arc::new(ManualClock::new());
    let mut map = Map::with_clock(options, clock.clone());
    map.on_bounds_changed(|event| {
        println!(
            "-> host: center {:.4}, {:.4} zoom {:.2}{}",
            event.center.lat,
            event.center.lng,
            event.zoom,
            if event.initial { " (initial)" } else { "" }
        );
    });

    map.set_markers(vec![
        Marker::new("ferry-building", LatLng::new(37.7955, -122.3937)),
        Marker::new("golden-gate", LatLng::new(37.8199, -122.4783)).with_size(24.0, 40.0),
    ]);
    map.load_features_json(
        r#"[{ "type": "multiline", "coords": [[37.7749, -122.4194], [37.7955, -122.3937]], "stroke": "red" }]"#,
    )
    .context("parsing features")?;

    let mut loader = InstantLoader { fetched: 0 };
    let mut surface = ConsoleSurface;

    let mut step = |label: &str, map: &mut Map, surface: &mut ConsoleSurface| {
        map.request_tiles(&mut loader);
        map.process_tile_events();
        clock.advance(Duration::from_millis(60));
        map.poll_sync();
        println!("{} (zoom {:.2})", label, map.zoom());
        map.render(surface);
    };

    step("start", &mut map, &mut surface);

    map.handle_touch(&TouchEvent::start(vec![TouchPoint::new(1, 500.0, 400.0)]));
    map.handle_touch(&TouchEvent::moved(vec![TouchPoint::new(1, 380.0, 460.0)]));
    map.handle_touch(&TouchEvent::end(vec![]));
    step("after pan", &mut map, &mut surface);

    map.handle_touch(&TouchEvent::start(vec![
        TouchPoint::new(1, 462.0, 384.0),
        TouchPoint::new(2, 562.0, 384.0),
    ]));
    map.handle_touch(&TouchEvent::moved(vec![
        TouchPoint::new(1, 412.0, 384.0),
        TouchPoint::new(2, 612.0, 384.0),
    ]));
    println!("mid-pinch frame:");
    map.render(&mut surface);
    map.handle_touch(&TouchEvent::end(vec![]));
    step("after pinch", &mut map, &mut surface);

    map.set_controlled_view(Some(LatLng::new(37.8199, -122.4783)), Some(14.0));
    step("after host update", &mut map, &mut surface);

    println!("{} tile requests issued", loader.fetched);
    Ok(())
}
