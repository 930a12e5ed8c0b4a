use std::fs;
use std::io;
use std::path::{Path, PathBuf};


use crate::classifier::{ClassifierBuilder, ClassifierError, EmotionClassifier};
use crate::config::{ProjectPaths, LABEL_MAP_FILE, PIPELINE_FILE};

/// Location of a saved model: the pipeline artifact and its label map,
/// always side by side in one directory.
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    models_dir: PathBuf,
}

impl ArtifactStore {
    /// Creates a store over the default models directory
    pub fn new_default() -> Self {
        Self::new(ProjectPaths::from_env().models_dir())
    }

    /// The directory is created on first save, not here.
    pub fn new<P: AsRef<Path>>(models_dir: P) -> Self {
        Self {
            models_dir: models_dir.as_ref().to_path_buf(),
        }
    }

    pub fn models_dir(&self) -> &Path {
        &self.models_dir
    }

    pub fn pipeline_path(&self) -> PathBuf {
        self.models_dir.join(PIPELINE_FILE)
    }

    pub fn label_map_path(&self) -> PathBuf {
        self.models_dir.join(LABEL_MAP_FILE)
    }

    /// True only when both artifacts of the pair exist.
    pub fn is_model_saved(&self) -> bool {
        let pipeline_path = self.pipeline_path();
        let label_map_path = self.label_map_path();
        log::debug!("Checking for saved model:");
        log::debug!("  Pipeline path: {:?} (exists: {})", pipeline_path, pipeline_path.exists());
        log::debug!("  Label map path: {:?} (exists: {})", label_map_path, label_map_path.exists());
        pipeline_path.exists() && label_map_path.exists()
    }

    pub fn save(&self, classifier: &EmotionClassifier) -> Result<(), ClassifierError> {
        log::info!("Saving model to {:?}", self.models_dir);
        fs::create_dir_all(&self.models_dir)?;
        classifier.save(self.pipeline_path(), self.label_map_path())
    }

    /// Restores a classifier built from `builder` with the stored pair.
    pub fn load_into(&self, builder: ClassifierBuilder) -> Result<EmotionClassifier, ClassifierError> {
        builder
            .with_artifacts(self.pipeline_path(), self.label_map_path())
            .build()
    }

    /// Restores a classifier with default settings.
    pub fn load(&self) -> Result<EmotionClassifier, ClassifierError> {
        self.load_into(ClassifierBuilder::new())
    }

    pub fn remove_artifacts(&self) -> io::Result<()> {
        let pipeline_path = self.pipeline_path();
        let label_map_path = self.label_map_path();

        if pipeline_path.exists() {
            fs::remove_file(&pipeline_path)?;
        }
        if label_map_path.exists() {
            fs::remove_file(&label_map_path)?;
        }
        Ok(())
    }
}
