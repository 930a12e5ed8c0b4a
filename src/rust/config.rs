use std::env;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::classifier::ClassifierError;
use crate::classifier::ForestParams;

/// Environment variable overriding the project root.
pub const HOME_ENV: &str = "CARTAS_HOME";

pub const DATASET_FILE: &str = "cartas_dataset.csv";
pub const PIPELINE_FILE: &str = "modelo_emociones.bin";
pub const LABEL_MAP_FILE: &str = "label_encoder.json";

/// Hyper-parameters of a training run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingConfig {
    /// Fraction of samples held out for evaluation
    pub test_size: f64,
    /// Seed for the split, the oversampler and the forest
    pub random_state: u64,
    /// Vocabulary cap of the TF-IDF vectorizer
    pub max_features: usize,
    pub ngram_range: (usize, usize),
    pub smote_k_neighbors: usize,
    pub n_estimators: usize,
    pub max_depth: usize,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
    /// Folds of the cross-validated accuracy estimate; 0 skips it
    pub cv_folds: usize,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            test_size: 0.2,
            random_state: 42,
            max_features: 2000,
            ngram_range: (1, 2),
            smote_k_neighbors: 5,
            n_estimators: 120,
            max_depth: 22,
            min_samples_split: 4,
            min_samples_leaf: 2,
            cv_folds: 5,
        }
    }
}

impl TrainingConfig {
    pub fn validate(&self) -> Result<(), ClassifierError> {
        if !(self.test_size > 0.0 && self.test_size < 1.0) {
            return Err(ClassifierError::Training(format!("test_size must be in (0, 1), got {}", self.test_size)));
        }
        if self.max_features == 0 {
            return Err(ClassifierError::Training("max_features must be positive".into()));
        }
        if self.ngram_range.0 == 0 || self.ngram_range.0 > self.ngram_range.1 {
            return Err(ClassifierError::Training(format!("invalid ngram_range {:?}", self.ngram_range)));
        }
        if self.n_estimators == 0 || self.max_depth == 0 {
            return Err(ClassifierError::Training("forest needs at least one tree of depth >= 1".into()));
        }
        if self.min_samples_split < 2 || self.min_samples_leaf == 0 {
            return Err(ClassifierError::Training(
                "min_samples_split must be >= 2 and min_samples_leaf >= 1".into(),
            ));
        }
        if self.cv_folds == 1 {
            return Err(ClassifierError::Training("cv_folds must be 0 (disabled) or >= 2".into()));
        }
        Ok(())
    }

    pub fn forest_params(&self) -> ForestParams {
        ForestParams {
            n_estimators: self.n_estimators,
            max_depth: self.max_depth,
            min_samples_split: self.min_samples_split,
            min_samples_leaf: self.min_samples_leaf,
            random_state: self.random_state,
        }
    }
}

/// File locations of a project: the dataset CSV and the models directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectPaths {
    root: PathBuf,
}

impl ProjectPaths {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    /// Resolves the project root.
    pub fn from_env() -> Self {
        Self::new(Self::default_root())
    }

    /// Returns the default project root
    pub fn default_root() -> PathBuf {
        // 1. Check environment variable
        if let Ok(path) = env::var(HOME_ENV) {
            if !path.trim().is_empty() {
                return PathBuf::from(path);
            }
        }

        // 2. Current working directory
        if let Ok(dir) = env::current_dir() {
            return dir;
        }

        // 3. Fallback to user's home directory
        if let Some(home_dir) = dirs::home_dir() {
            return home_dir.join(".cartas");
        }

        // 4. If all else fails, use system temp directory
        env::temp_dir().join("cartas")
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn dataset_path(&self) -> PathBuf {
        self.root.join("data").join("processed").join(DATASET_FILE)
    }

    pub fn models_dir(&self) -> PathBuf {
        self.root.join("models")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_matches_reference_pipeline() {
        let config = TrainingConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.max_features, 2000);
        assert_eq!(config.ngram_range, (1, 2));
        let forest = config.forest_params();
        assert_eq!(forest.n_estimators, 120);
        assert_eq!(forest.max_depth, 22);
        assert_eq!(forest.min_samples_split, 4);
        assert_eq!(forest.min_samples_leaf, 2);
        assert_eq!(forest.random_state, 42);
    }

    #[test]
    fn test_invalid_configs() {
        let bad = [
            TrainingConfig { test_size: 0.0, ..Default::default() },
            TrainingConfig { test_size: 1.0, ..Default::default() },
            TrainingConfig { max_features: 0, ..Default::default() },
            TrainingConfig { ngram_range: (2, 1), ..Default::default() },
            TrainingConfig { n_estimators: 0, ..Default::default() },
            TrainingConfig { min_samples_split: 1, ..Default::default() },
            TrainingConfig { cv_folds: 1, ..Default::default() },
        ];
        for config in bad {
            assert!(config.validate().is_err(), "{:?} should be rejected", config);
        }
        assert!(TrainingConfig { cv_folds: 0, ..Default::default() }.validate().is_ok());
    }

    #[test]
    fn test_project_layout() {
        let paths = ProjectPaths::new("/tmp/cartas-project");
        assert_eq!(paths.dataset_path(), PathBuf::from("/tmp/cartas-project/data/processed/cartas_dataset.csv"));
        assert_eq!(paths.models_dir(), PathBuf::from("/tmp/cartas-project/models"));
    }

    #[test]
    fn test_default_root_from_env() {
        env::set_var(HOME_ENV, "/tmp/cartas-home");
        assert_eq!(ProjectPaths::default_root(), PathBuf::from("/tmp/cartas-home"));
        env::remove_var(HOME_ENV);
        assert_ne!(ProjectPaths::default_root(), PathBuf::from("/tmp/cartas-home"));
    }
}
