use serde::{Deserialize, Serialize};

use crate::core::geo::{LatLng, Point};
use crate::core::viewport::ViewportState;
use crate::{MapError, Result};

const DEFAULT_STROKE: &str = "rgba(0,0,255, 0.9)";
const DEFAULT_FILL: &str = "rgba(0,0,255, 0.3)";
const DEFAULT_STROKE_WIDTH: f64 = 3.0;

/// Geometry type of a vector overlay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeatureKind {
    Polyline,
    Polygon,
}

/// Style attributes; unset fields fall back to the defaults for the kind
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeatureStyle {
    pub stroke: Option<String>,
    pub stroke_width: Option<f64>,
    pub fill: Option<String>,
}

/// A host supplied polyline or polygon in geographic coordinates
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    pub kind: FeatureKind,
    pub coords: Vec<LatLng>,
    pub style: FeatureStyle,
}

/// Wire form: `{ "type": "multiline", "coords": [[lat, lng], ...], "stroke": ... }`
#[derive(Debug, Deserialize)]
struct RawFeature {
    #[serde(rename = "type")]
    kind: String,
    coords: Vec<[f64; 2]>,
    #[serde(flatten)]
    style: FeatureStyle,
}

/// A feature in screen space, ready for the rendering surface
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectedFeature {
    pub kind: FeatureKind,
    pub points: Vec<Point>,
    pub stroke: String,
    pub stroke_width: f64,
    pub fill: String,
}

impl Feature {
    pub fn polyline(coords: Vec<LatLng>) -> Self {
        Self {
            kind: FeatureKind::Polyline,
            coords,
            style: FeatureStyle::default(),
        }
    }

    pub fn polygon(coords: Vec<LatLng>) -> Self {
        Self {
            kind: FeatureKind::Polygon,
            coords,
            style: FeatureStyle::default(),
        }
    }

    pub fn with_style(mut self, style: FeatureStyle) -> Self {
        self.style = style;
        self
    }

    /// Parses a JSON array of features. Entries of unknown type are skipped.
    pub fn from_json(json: &str) -> Result<Vec<Feature>> {
        let raw: Vec<RawFeature> = serde_json::from_str(json)?;
        let mut features = Vec::with_capacity(raw.len());

        for entry in raw {
            let kind = match entry.kind.to_lowercase().as_str() {
                "multiline" | "polyline" | "linestring" => FeatureKind::Polyline,
                "polygon" => FeatureKind::Polygon,
                other => {
                    log::warn!("skipping feature of unknown type {:?}", other);
                    continue;
                }
            };
            if let Some(width) = entry.style.stroke_width {
                if !width.is_finite() || width < 0.0 {
                    return Err(MapError::Parse(format!("invalid stroke width {}", width)));
                }
            }
            features.push(Feature {
                kind,
                coords: entry.coords.into_iter().map(LatLng::from).collect(),
                style: entry.style,
            });
        }

        Ok(features)
    }

    /// Projects the feature onto the screen as it is drawn right now
    pub fn project(&self, viewport: &ViewportState) -> ProjectedFeature {
        let default_fill = match self.kind {
            FeatureKind::Polyline => "none",
            FeatureKind::Polygon => DEFAULT_FILL,
        };

        ProjectedFeature {
            kind: self.kind,
            points: self.coords.iter().map(|c| viewport.lat_lng_to_pixel(*c)).collect(),
            stroke: self.style.stroke.clone().unwrap_or_else(|| DEFAULT_STROKE.to_string()),
            stroke_width: self.style.stroke_width.unwrap_or(DEFAULT_STROKE_WIDTH),
            fill: self.style.fill.clone().unwrap_or_else(|| default_fill.to_string()),
        }
    }
}

impl From<geo_types::LineString<f64>> for Feature {
    fn from(line: geo_types::LineString<f64>) -> Self {
        Feature::polyline(line.coords().map(|c| LatLng::new(c.y, c.x)).collect())
    }
}

impl From<geo_types::Polygon<f64>> for Feature {
    /// Only the exterior ring is drawn
    fn from(polygon: geo_types::Polygon<f64>) -> Self {
        Feature::polygon(polygon.exterior().coords().map(|c| LatLng::new(c.y, c.x)).collect())
    }
}
