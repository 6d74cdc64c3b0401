use std::fmt;

use geo::Coord;
use serde::{Deserialize, Serialize};

/// Rule governing coordinate rounding.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PrecisionModel {
    /// Full double precision; coordinates pass through unchanged.
    #[default]
    Floating,
    /// Single precision; coordinates are rounded through `f32`.
    FloatingSingle,
    /// Fixed grid of `1 / scale` units.
    Fixed { scale: f64 },
}

impl PrecisionModel {
    /// Snap a coordinate onto this model's grid.
    pub fn make_precise(&self, coord: Coord<f64>) -> Coord<f64> {
        match *self {
            Self::Floating => coord,
            Self::FloatingSingle => Coord {
                x: coord.x as f32 as f64,
                y: coord.y as f32 as f64,
            },
            Self::Fixed { scale } if scale > 0.0 => Coord {
                x: (coord.x * scale).round() / scale,
                y: (coord.y * scale).round() / scale,
            },
            Self::Fixed { .. } => coord,
        }
    }

    pub fn is_floating(&self) -> bool {
        matches!(self, Self::Floating | Self::FloatingSingle)
    }
}

/// Coordinate reference system tag carried by a geometry.
///
/// Only the tag lives here; definitions and transformations belong to a
/// separate subsystem.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ReferenceSystem {
    pub srid: Option<u32>,
    pub name: Option<String>,
}

impl ReferenceSystem {
    /// No reference system declared.
    pub fn unknown() -> Self {
        Self::default()
    }

    pub fn epsg(code: u32) -> Self {
        Self {
            srid: Some(code),
            name: Some(format!("EPSG:{code}")),
        }
    }

    pub fn is_unknown(&self) -> bool {
        self.srid.is_none() && self.name.is_none()
    }
}

impl fmt::Display for ReferenceSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.name, self.srid) {
            (Some(name), _) => write!(f, "{name}"),
            (None, Some(srid)) => write!(f, "SRID={srid}"),
            (None, None) => write!(f, "unknown"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn floating_is_identity() {
        let c = Coord { x: 1.123456789012, y: -7.5 };
        assert_eq!(PrecisionModel::Floating.make_precise(c), c);
    }

    #[test]
    fn fixed_snaps_to_grid() {
        let model = PrecisionModel::Fixed { scale: 100.0 };
        let snapped = model.make_precise(Coord { x: 1.23456, y: 9.8765 });
        assert_eq!(snapped, Coord { x: 1.23, y: 9.88 });
        assert!(!model.is_floating());
    }

    #[test]
    fn fixed_with_non_positive_scale_passes_through() {
        let c = Coord { x: 0.3333, y: 0.6666 };
        assert_eq!(PrecisionModel::Fixed { scale: 0.0 }.make_precise(c), c);
    }

    #[test]
    fn single_rounds_through_f32() {
        let c = Coord { x: 0.1, y: 0.2 };
        let snapped = PrecisionModel::FloatingSingle.make_precise(c);
        assert_eq!(snapped.x, 0.1f32 as f64);
        assert_eq!(snapped.y, 0.2f32 as f64);
    }

    #[test]
    fn reference_system_display() {
        assert_eq!(ReferenceSystem::epsg(4326).to_string(), "EPSG:4326");
        assert_eq!(ReferenceSystem::unknown().to_string(), "unknown");
        assert!(ReferenceSystem::unknown().is_unknown());
        let bare = ReferenceSystem { srid: Some(3857), name: None };
        assert_eq!(bare.to_string(), "SRID=3857");
    }

    #[test]
    fn precision_model_serde() {
        let json = serde_json::to_string(&PrecisionModel::Fixed { scale: 1000.0 }).unwrap();
        assert_eq!(json, r#"{"type":"fixed","scale":1000.0}"#);
        let parsed: PrecisionModel = serde_json::from_str(r#"{"type":"floating"}"#).unwrap();
        assert_eq!(parsed, PrecisionModel::Floating);
    }
}
