use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A single control point of a motion curve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Keyframe {
    /// Time in seconds.
    pub time: f64,
    /// Travelled distance in pixels.
    pub value: f64,
    /// Slope entering this key.
    #[serde(default)]
    pub in_tangent: f64,
    /// Slope leaving this key.
    #[serde(default)]
    pub out_tangent: f64,
}

impl Keyframe {
    pub fn new(time: f64, value: f64, in_tangent: f64, out_tangent: f64) -> Self {
        Self {
            time,
            value,
            in_tangent,
            out_tangent,
        }
    }

    /// A key with flat tangents.
    pub fn flat(time: f64, value: f64) -> Self {
        Self::new(time, value, 0.0, 0.0)
    }
}

/// How values are interpolated between two neighbouring keys.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InterpolationMode {
    /// Cubic Hermite using the key tangents.
    #[default]
    Hermite,
    /// Straight line between keys.
    Linear,
    /// Holds the left key's value until the next key.
    Constant,
}

impl std::str::FromStr for InterpolationMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "hermite" => Ok(Self::Hermite),
            "linear" => Ok(Self::Linear),
            "constant" => Ok(Self::Constant),
            other => Err(format!("unknown interpolation mode '{}'", other)),
        }
    }
}

/// On-disk description of one named curve.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurveDocument {
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interpolation_mode: Option<InterpolationMode>,
    #[serde(default)]
    pub keyframes: Vec<Keyframe>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: BTreeMap<String, serde_json::Value>,
}

/// A named, versioned collection of curve documents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurveLibrary {
    pub name: String,
    pub version: String,
    #[serde(default)]
    pub curves: Vec<CurveDocument>,
}
