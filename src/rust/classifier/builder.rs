use std::path::PathBuf;

use log::info;

use super::error::ClassifierError;
use super::model::EmotionClassifier;
use crate::config::TrainingConfig;
use crate::labels::LabelMap;
use crate::stopwords::{StopwordSource, Stopwords};

/// A builder for constructing an EmotionClassifier with a fluent interface.
#[derive(Debug, Default)]
pub struct ClassifierBuilder {
    config: TrainingConfig,
    stopword_source: StopwordSource,
    stopwords: Option<Stopwords>,
    label_map: Option<LabelMap>,
    artifacts: Option<(PathBuf, PathBuf)>,
}

impl ClassifierBuilder {
    /// Creates a builder with the reference hyper-parameters, the embedded
    /// stopword list and the default label map.
    ///
    /// # Example
    /// ```
    /// use cartas_emociones::ClassifierBuilder;
    ///
    /// let classifier = ClassifierBuilder::new().build().unwrap();
    /// assert!(!classifier.is_ready());
    /// ```
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the training hyper-parameters
    pub fn with_config(mut self, config: TrainingConfig) -> Self {
        self.config = config;
        self
    }

    /// Selects where stopwords are read from when the classifier is built.
    ///
    /// # Example
    /// ```
    /// use cartas_emociones::{ClassifierBuilder, StopwordSource};
    ///
    /// let builder = ClassifierBuilder::new()
    ///     .with_stopword_source(StopwordSource::from_env());
    /// ```
    pub fn with_stopword_source(mut self, source: StopwordSource) -> Self {
        self.stopword_source = source;
        self
    }

    /// Uses an already resolved stopword list, bypassing the source.
    pub fn with_stopwords(mut self, stopwords: Stopwords) -> Self {
        self.stopwords = Some(stopwords);
        self
    }

    /// Overrides the label ↔ code map used for encoding.
    pub fn with_label_map(mut self, label_map: LabelMap) -> Self {
        self.label_map = Some(label_map);
        self
    }

    /// Loads a saved pipeline and label map while building.
    ///
    /// # Example
    /// ```no_run
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// use cartas_emociones::ClassifierBuilder;
    ///
    /// let classifier = ClassifierBuilder::new()
    ///     .with_artifacts("models/modelo_emociones.bin", "models/label_encoder.json")
    ///     .build()?;
    /// let prediction = classifier.predict("Ya no siento lo mismo")?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn with_artifacts(mut self, pipeline_path: impl Into<PathBuf>, label_map_path: impl Into<PathBuf>) -> Self {
        self.artifacts = Some((pipeline_path.into(), label_map_path.into()));
        self
    }

    /// Builds and returns the EmotionClassifier.
    ///
    /// # Returns
    /// * `Result<EmotionClassifier, ClassifierError>` - The classifier, or an error if:
    ///   - The training configuration is invalid
    ///   - The label map is empty
    ///   - Artifacts were requested and could not be loaded
    pub fn build(self) -> Result<EmotionClassifier, ClassifierError> {
        self.config.validate()?;

        let label_map = self.label_map.unwrap_or_default();
        if label_map.is_empty() {
            return Err(ClassifierError::MalformedData("label map must contain at least one label".into()));
        }

        let stopwords = match self.stopwords {
            Some(stopwords) => stopwords,
            None => self.stopword_source.resolve(),
        };

        let mut classifier = EmotionClassifier::from_parts(self.config, stopwords, label_map);
        if let Some((pipeline_path, label_map_path)) = self.artifacts {
            classifier.load(&pipeline_path, &label_map_path)?;
        }
        info!("Classifier built ({:?})", classifier.state());
        Ok(classifier)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::ModelState;
    use crate::stopwords::StopwordOrigin;
    use std::collections::BTreeMap;

    #[test]
    fn test_defaults() {
        let classifier = ClassifierBuilder::new().build().unwrap();
        assert_eq!(classifier.state(), ModelState::Untrained);
        assert_eq!(classifier.label_map(), &LabelMap::default());
        assert_eq!(classifier.stopwords().origin(), &StopwordOrigin::Embedded);
        assert_eq!(classifier.config(), &TrainingConfig::default());
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let result = ClassifierBuilder::new()
            .with_config(TrainingConfig {
                test_size: 1.5,
                ..Default::default()
            })
            .build();
        assert!(matches!(result, Err(ClassifierError::Training(_))));
    }

    #[test]
    fn test_empty_label_map_is_rejected() {
        let empty = LabelMap::from_forward(BTreeMap::new()).unwrap();
        let result = ClassifierBuilder::new().with_label_map(empty).build();
        assert!(matches!(result, Err(ClassifierError::MalformedData(_))));
    }

    #[test]
    fn test_missing_artifacts() {
        let dir = tempfile::tempdir().unwrap();
        let result = ClassifierBuilder::new()
            .with_artifacts(dir.path().join("modelo.bin"), dir.path().join("labels.json"))
            .build();
        assert!(matches!(result, Err(ClassifierError::MissingModel { .. })));
    }
}
