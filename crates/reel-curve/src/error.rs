use thiserror::Error;

#[derive(Error, Debug)]
pub enum CurveError {
    #[error("Curve document is missing a name")]
    MissingName,
    #[error("Curve needs at least 2 keyframes, found {found}")]
    TooFewKeys { found: usize },
    #[error("Keyframe {index} at {time}s does not come after the previous key")]
    NonIncreasingTime { index: usize, time: f64 },
    #[error("Keyframe {index} value {value} is below the previous key")]
    DecreasingValue { index: usize, value: f64 },
    #[error("Curve '{name}': {source}")]
    Document {
        name: String,
        #[source]
        source: Box<CurveError>,
    },
    #[error("Curve not found: {0}")]
    NotFound(String),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
