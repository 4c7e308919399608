//! Named model snapshots on disk.
//!
//! A snapshot bundles everything needed to reconstruct a trained model:
//! the order, the differenced training series, and the posterior samples.
//! The location is derived deterministically from the model name, so
//! `save` followed by `load` under the same name round-trips.

use crate::error::{Result, SarimaError};
use crate::model::{BayesianSarima, SarimaOrder};
use crate::sampler::PosteriorSamples;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// On-disk snapshot format.
#[derive(Debug, Serialize, Deserialize)]
struct Snapshot {
    name: String,
    order: SarimaOrder,
    differenced: Option<Vec<f64>>,
    posterior: PosteriorSamples,
}

/// A directory of named model snapshots.
#[derive(Debug, Clone)]
pub struct ModelStore {
    dir: PathBuf,
}

impl Default for ModelStore {
    fn default() -> Self {
        Self::new("models/sarima")
    }
}

impl ModelStore {
    /// Create a store rooted at `dir`. The directory is created on first
    /// save.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// The deterministic snapshot path for a model name.
    pub fn path_for(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{name}.json"))
    }

    /// Model names become file stems, so anything that could traverse out
    /// of the store directory is refused.
    fn validate_name(name: &str) -> Result<()> {
        if name.is_empty() || name == "." || name == ".." || name.contains(['/', '\\']) {
            return Err(SarimaError::Persistence(format!(
                "invalid model name '{name}': must be a plain file stem"
            )));
        }
        Ok(())
    }

    /// Serialize a trained model; fails with [`SarimaError::NotTrained`]
    /// if it holds no posterior.
    pub fn save(&self, model: &BayesianSarima) -> Result<PathBuf> {
        Self::validate_name(model.name())?;
        let posterior = model.posterior().ok_or(SarimaError::NotTrained)?;

        let snapshot = Snapshot {
            name: model.name().to_string(),
            order: *model.order(),
            differenced: model.differenced().map(<[f64]>::to_vec),
            posterior: posterior.clone(),
        };

        fs::create_dir_all(&self.dir)
            .map_err(|e| SarimaError::Persistence(format!("{}: {e}", self.dir.display())))?;

        let path = self.path_for(model.name());
        let json = serde_json::to_string(&snapshot)
            .map_err(|e| SarimaError::Persistence(format!("{}: {e}", path.display())))?;
        fs::write(&path, json)
            .map_err(|e| SarimaError::Persistence(format!("{}: {e}", path.display())))?;
        Ok(path)
    }

    /// Load the snapshot saved under `name`.
    pub fn load(&self, name: &str) -> Result<BayesianSarima> {
        Self::validate_name(name)?;
        self.load_from(self.path_for(name))
    }

    /// Load a snapshot from an explicit path.
    ///
    /// A missing, unreadable, or corrupt snapshot fails with
    /// [`SarimaError::Persistence`]; no partial model is ever returned.
    pub fn load_from(&self, path: impl AsRef<Path>) -> Result<BayesianSarima> {
        let path = path.as_ref();
        let json = fs::read_to_string(path)
            .map_err(|e| SarimaError::Persistence(format!("{}: {e}", path.display())))?;
        let snapshot: Snapshot = serde_json::from_str(&json)
            .map_err(|e| SarimaError::Persistence(format!("{}: {e}", path.display())))?;

        Ok(BayesianSarima::from_parts(
            snapshot.name,
            snapshot.order,
            snapshot.differenced,
            snapshot.posterior,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sampler::PosteriorSamples;

    fn trained_model() -> BayesianSarima {
        BayesianSarima::from_parts(
            "aapl-daily",
            SarimaOrder::nonseasonal(1, 1, 0),
            Some(vec![0.1, -0.2, 0.3]),
            PosteriorSamples::from_point_estimates(&[("phi", vec![0.4]), ("sigma", vec![0.5])]),
        )
    }

    #[test]
    fn path_is_derived_from_model_name() {
        let store = ModelStore::new("/tmp/anywhere");
        assert_eq!(
            store.path_for("aapl-daily"),
            PathBuf::from("/tmp/anywhere/aapl-daily.json")
        );
    }

    #[test]
    fn save_refuses_untrained_model() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let store = ModelStore::new(dir.path());
        let model = BayesianSarima::new("fresh", SarimaOrder::nonseasonal(1, 0, 0));
        assert_eq!(store.save(&model).unwrap_err(), SarimaError::NotTrained);
    }

    #[test]
    fn save_load_roundtrip_preserves_everything() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let store = ModelStore::new(dir.path());
        let model = trained_model();

        let path = store.save(&model).unwrap();
        assert_eq!(path, store.path_for("aapl-daily"));

        let loaded = store.load("aapl-daily").unwrap();
        assert_eq!(loaded.name(), model.name());
        assert_eq!(loaded.order(), model.order());
        assert_eq!(loaded.differenced(), model.differenced());
        assert_eq!(loaded.posterior(), model.posterior());
    }

    #[test]
    fn names_with_path_separators_are_refused() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let store = ModelStore::new(dir.path().join("store"));

        for name in ["../escape", "a/b", "a\\b", "", ".", ".."] {
            let model = BayesianSarima::from_parts(
                name,
                SarimaOrder::nonseasonal(1, 0, 0),
                None,
                PosteriorSamples::from_point_estimates(&[("phi", vec![0.1]), ("sigma", vec![1.0])]),
            );
            assert!(
                matches!(store.save(&model), Err(SarimaError::Persistence(_))),
                "save accepted name {name:?}"
            );
            assert!(
                matches!(store.load(name), Err(SarimaError::Persistence(_))),
                "load accepted name {name:?}"
            );
        }
        // Nothing may be written outside (or inside) the store directory.
        assert!(!dir.path().join("escape.json").exists());
        assert!(!dir.path().join("store").exists());
    }

    #[test]
    fn load_missing_snapshot_fails() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let store = ModelStore::new(dir.path());
        assert!(matches!(
            store.load("nope"),
            Err(SarimaError::Persistence(_))
        ));
    }

    #[test]
    fn load_corrupt_snapshot_fails() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let store = ModelStore::new(dir.path());
        std::fs::write(store.path_for("bad"), "{not json").unwrap();
        assert!(matches!(
            store.load("bad"),
            Err(SarimaError::Persistence(_))
        ));
    }
}
