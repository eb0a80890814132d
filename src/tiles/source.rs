use serde::{Deserialize, Serialize};

use crate::core::geo::TileCoord;
use crate::MapError;

/// Trait representing anything that can produce tile URLs for a given coordinate.
///
/// Implementations must be pure: the same coordinate and pixel ratio always
/// yield the same URL, so results can be cached by the loader.
pub trait TileSource: Send + Sync {
    /// Build a URL for the requested `coord`, optionally for a device pixel ratio.
    fn url(&self, coord: TileCoord, dpr: Option<u32>) -> String;

    /// `srcset`-style list of one URL per pixel ratio
    fn src_set(&self, coord: TileCoord, dprs: &[u32]) -> String {
        dprs.iter()
            .map(|&dpr| {
                let url = self.url(coord, Some(dpr));
                if dpr == 1 {
                    url
                } else {
                    format!("{} {}x", url, dpr)
                }
            })
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Built-in raster tile providers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    Osm,
    #[serde(rename = "otm")]
    OpenTopoMap,
    #[default]
    Wikimedia,
    Stamen,
    Wikimapia,
    Dark,
}

impl Provider {
    /// Rotating `a`/`b`/`c` subdomain
    fn subdomain(coord: TileCoord) -> char {
        let index = (coord.x as u64 + coord.y as u64 + coord.z as u64) % 3;
        (b'a' + index as u8) as char
    }

    fn retina_suffix(dpr: Option<u32>) -> &'static str {
        match dpr {
            Some(dpr) if dpr >= 2 => "@2x",
            _ => "",
        }
    }
}

impl TileSource for Provider {
    fn url(&self, coord: TileCoord, dpr: Option<u32>) -> String {
        let TileCoord { x, y, z } = coord;
        match self {
            Provider::Osm => format!(
                "https://{}.tile.openstreetmap.org/{}/{}/{}.png",
                Self::subdomain(coord),
                z,
                x,
                y
            ),
            Provider::OpenTopoMap => format!(
                "https://{}.tile.opentopomap.org/{}/{}/{}.png",
                Self::subdomain(coord),
                z,
                x,
                y
            ),
            Provider::Wikimedia => format!(
                "https://maps.wikimedia.org/osm-intl/{}/{}/{}{}.png",
                z,
                x,
                y,
                Self::retina_suffix(dpr)
            ),
            Provider::Stamen => format!(
                "https://stamen-tiles.a.ssl.fastly.net/terrain/{}/{}/{}{}.jpg",
                z,
                x,
                y,
                Self::retina_suffix(dpr)
            ),
            Provider::Wikimapia => {
                let server = x % 4 + (y % 4) * 4;
                format!(
                    "http://i{}.wikimapia.org/?x={}&y={}&zoom={}&lng=1",
                    server, x, y, z
                )
            }
            Provider::Dark => format!(
                "https://cartodb-basemaps-{}.global.ssl.fastly.net/dark_all/{}/{}/{}.png",
                Self::subdomain(coord),
                z,
                x,
                y
            ),
        }
    }
}

impl std::str::FromStr for Provider {
    type Err = MapError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        match name.to_ascii_lowercase().as_str() {
            "osm" => Ok(Provider::Osm),
            "otm" | "opentopomap" => Ok(Provider::OpenTopoMap),
            "wikimedia" => Ok(Provider::Wikimedia),
            "stamen" => Ok(Provider::Stamen),
            "wikimapia" => Ok(Provider::Wikimapia),
            "dark" => Ok(Provider::Dark),
            other => Err(MapError::Config(format!("unknown tile provider {:?}", other))),
        }
    }
}

/// Adapts a closure into a [`TileSource`]
pub struct FnSource<F> {
    build: F,
}

impl<F> FnSource<F>
where
    F: Fn(TileCoord, Option<u32>) -> String + Send + Sync,
{
    pub fn new(build: F) -> Self {
        Self { build }
    }
}

impl<F> TileSource for FnSource<F>
where
    F: Fn(TileCoord, Option<u32>) -> String + Send + Sync,
{
    fn url(&self, coord: TileCoord, dpr: Option<u32>) -> String {
        (self.build)(coord, dpr)
    }
}

impl<F> std::fmt::Debug for FnSource<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnSource").finish_non_exhaustive()
    }
}
