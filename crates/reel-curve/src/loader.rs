//! # Curve Loader
//!
//! Reads and writes curve documents and libraries as JSON, caching loaded curves by name.

use crate::curve::AnimationCurve;
use crate::error::CurveError;
use crate::model::{CurveDocument, CurveLibrary};
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, info, instrument};

/// Loads curves from disk or strings and remembers them by name.
#[derive(Debug, Default)]
pub struct CurveLoader {
    cache: HashMap<String, AnimationCurve>,
}

impl CurveLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses and validates a single document without touching the cache.
    pub fn parse_document(json: &str) -> Result<CurveDocument, CurveError> {
        let doc: CurveDocument = serde_json::from_str(json)?;
        validate_document(&doc)?;
        Ok(doc)
    }

    /// Loads a single curve from a JSON string and caches it.
    pub fn load_json_str(&mut self, json: &str) -> Result<AnimationCurve, CurveError> {
        let doc = Self::parse_document(json)?;
        Ok(self.insert(&doc))
    }

    /// Loads a single curve document from a file and caches it.
    #[instrument(level = "debug", skip(self, path), fields(path = %path.as_ref().display()))]
    pub fn load_document(&mut self, path: impl AsRef<Path>) -> Result<AnimationCurve, CurveError> {
        let json = std::fs::read_to_string(path.as_ref())?;
        self.load_json_str(&json)
    }

    /// Loads every curve of a library file. Any invalid curve fails the whole load
    /// and leaves the cache untouched.
    #[instrument(level = "debug", skip(self, path), fields(path = %path.as_ref().display()))]
    pub fn load_library(&mut self, path: impl AsRef<Path>) -> Result<Vec<(String, AnimationCurve)>, CurveError> {
        let json = std::fs::read_to_string(path.as_ref())?;
        self.load_library_json_str(&json)
    }

    pub fn load_library_json_str(&mut self, json: &str) -> Result<Vec<(String, AnimationCurve)>, CurveError> {
        let library: CurveLibrary = serde_json::from_str(json)?;
        for doc in &library.curves {
            validate_document(doc)?;
        }
        let curves: Vec<_> = library
            .curves
            .iter()
            .map(|doc| (doc.name.clone(), self.insert(doc)))
            .collect();
        info!(
            library = %library.name,
            version = %library.version,
            curves = curves.len(),
            "loaded curve library"
        );
        Ok(curves)
    }

    /// Serializes a curve as a pretty-printed document.
    pub fn export_document(
        curve: &AnimationCurve,
        name: &str,
        description: Option<String>,
    ) -> Result<String, CurveError> {
        Ok(serde_json::to_string_pretty(&curve.to_document(name, description))?)
    }

    /// Serializes named curves as a pretty-printed library.
    pub fn export_library<'a>(
        name: &str,
        version: &str,
        curves: impl IntoIterator<Item = (&'a str, &'a AnimationCurve)>,
    ) -> Result<String, CurveError> {
        let library = CurveLibrary {
            name: name.to_string(),
            version: version.to_string(),
            curves: curves
                .into_iter()
                .map(|(curve_name, curve)| curve.to_document(curve_name, None))
                .collect(),
        };
        Ok(serde_json::to_string_pretty(&library)?)
    }

    pub fn save_document(
        curve: &AnimationCurve,
        name: &str,
        path: impl AsRef<Path>,
    ) -> Result<(), CurveError> {
        let json = Self::export_document(curve, name, None)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Returns a cached curve.
    pub fn get(&self, name: &str) -> Result<&AnimationCurve, CurveError> {
        self.cache
            .get(name)
            .ok_or_else(|| CurveError::NotFound(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.cache.contains_key(name)
    }

    /// Stores a curve under `name`, replacing any previous entry.
    pub fn cache(&mut self, name: impl Into<String>, curve: AnimationCurve) {
        self.cache.insert(name.into(), curve);
    }

    /// Names of all cached curves, sorted.
    pub fn cached_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.cache.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }

    fn insert(&mut self, doc: &CurveDocument) -> AnimationCurve {
        let curve = AnimationCurve::from(doc);
        debug!(name = %doc.name, keys = curve.len(), mode = ?curve.mode(), "cached curve");
        self.cache.insert(doc.name.clone(), curve.clone());
        curve
    }
}

fn validate_document(doc: &CurveDocument) -> Result<(), CurveError> {
    if doc.name.trim().is_empty() {
        return Err(CurveError::MissingName);
    }
    if doc.keyframes.len() < 2 {
        return Err(CurveError::Document {
            name: doc.name.clone(),
            source: Box::new(CurveError::TooFewKeys {
                found: doc.keyframes.len(),
            }),
        });
    }
    Ok(())
}
