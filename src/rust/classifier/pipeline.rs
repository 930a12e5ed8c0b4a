//! Fitted transform chain: TF-IDF → SMOTE → random forest.

use log::{debug, info};
use serde::{Deserialize, Serialize};

use super::error::ClassifierError;
use super::forest::RandomForest;
use super::smote::{class_counts, Smote};
use super::vectorizer::TfidfVectorizer;
use crate::config::TrainingConfig;

/// A fitted pipeline. Created by [`EmotionPipeline::fit`] and immutable
/// afterwards; the oversampler only takes part in fitting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmotionPipeline {
    vectorizer: TfidfVectorizer,
    smote: Smote,
    forest: RandomForest,
    n_classes: usize,
}

impl EmotionPipeline {
    /// Fits the whole chain on normalized texts and their label codes.
    pub fn fit<S: AsRef<str>>(
        texts: &[S],
        labels: &[usize],
        n_classes: usize,
        stop_words: &[String],
        config: &TrainingConfig,
    ) -> Result<Self, ClassifierError> {
        if texts.len() != labels.len() {
            return Err(ClassifierError::Training(format!(
                "{} texts but {} labels",
                texts.len(),
                labels.len()
            )));
        }

        let mut vectorizer = TfidfVectorizer::new(config.max_features, config.ngram_range)
            .with_stop_words(stop_words.iter().cloned());
        let features = vectorizer.fit_transform(texts)?;

        let smote = Smote::new(config.smote_k_neighbors, config.random_state);
        let (resampled, resampled_labels) = smote.fit_resample(&features, labels, n_classes);
        debug!(
            "Class counts before/after oversampling: {:?} -> {:?}",
            class_counts(labels, n_classes),
            class_counts(&resampled_labels, n_classes)
        );

        let mut forest = RandomForest::new(config.forest_params());
        forest.fit(&resampled, &resampled_labels, n_classes)?;
        info!(
            "Pipeline fitted on {} samples ({} after oversampling), vocabulary of {} terms",
            texts.len(),
            resampled_labels.len(),
            vectorizer.vocabulary_size()
        );

        Ok(Self {
            vectorizer,
            smote,
            forest,
            n_classes,
        })
    }

    pub fn n_classes(&self) -> usize {
        self.n_classes
    }

    pub fn vocabulary_size(&self) -> usize {
        self.vectorizer.vocabulary_size()
    }

    /// Class probabilities, indexed by label code, for one normalized text.
    pub fn predict_proba(&self, text: &str) -> Vec<f64> {
        let features = self.vectorizer.transform_one(text);
        self.forest.predict_proba_one(features.view())
    }

    /// Most probable label code for each normalized text.
    pub fn predict<S: AsRef<str>>(&self, texts: &[S]) -> Vec<usize> {
        let features = self.vectorizer.transform(texts);
        self.forest.predict(&features)
    }
}
