use std::collections::BTreeMap;
use std::fs;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use log::{error, info, warn};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::error::ClassifierError;
use super::evaluation::{
    accuracy, stratified_k_fold, train_test_split, ClassificationReport, CrossValidation,
};
use super::pipeline::EmotionPipeline;
use super::utils::argmax;
use crate::config::TrainingConfig;
use crate::corpus;
use crate::labels::{Emotion, LabelMap};
use crate::stopwords::Stopwords;
use crate::text::normalize;

/// Lifecycle of a classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelState {
    Untrained,
    Trained,
    Loaded,
}

/// Result of classifying one text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub label: Emotion,
    /// Probability of `label`
    pub confidence: f64,
    /// Probability of every known label; sums to 1
    pub probabilities: BTreeMap<Emotion, f64>,
}

/// Held-out evaluation of a training run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingReport {
    pub test_texts: Vec<String>,
    pub test_labels: Vec<usize>,
    pub predictions: Vec<usize>,
    pub accuracy: f64,
    pub report: ClassificationReport,
    /// Absent when cross-validation is disabled
    pub cross_validation: Option<CrossValidation>,
}

/// On-disk form of the label map: the forward map plus the checksum of the
/// pipeline artifact it was saved with.
#[derive(Debug, Serialize, Deserialize)]
struct LabelArtifact {
    labels: LabelMap,
    #[serde(default)]
    pipeline_sha256: Option<String>,
}

/// Emotion classifier for short Spanish texts.
///
/// Starts [`ModelState::Untrained`]; [`train`](Self::train) or
/// [`load`](Self::load) make it ready to [`predict`](Self::predict).
///
/// ```rust
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// use cartas_emociones::{corpus, EmotionClassifier, TrainingConfig};
///
/// let examples = corpus::generate(45, 1);
/// let mut classifier = EmotionClassifier::builder()
///     .with_config(TrainingConfig { n_estimators: 10, cv_folds: 0, ..Default::default() })
///     .build()?;
/// let (texts, labels) = classifier.encode_examples(&examples)?;
/// classifier.train(&texts, &labels)?;
///
/// let prediction = classifier.predict("Te quiero con todo mi corazon")?;
/// println!("{} ({:.0}%)", prediction.label, prediction.confidence * 100.0);
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct EmotionClassifier {
    pub(crate) config: TrainingConfig,
    pub(crate) stopwords: Stopwords,
    pub(crate) label_map: LabelMap,
    pipeline: Option<EmotionPipeline>,
    state: ModelState,
}

// Compile-time verification of thread-safety
const _: () = {
    fn assert_send_sync<T: Send + Sync>() {}
    fn verify_thread_safety() {
        assert_send_sync::<EmotionClassifier>();
    }
};

impl EmotionClassifier {
    /// Creates a new ClassifierBuilder for fluent construction
    pub fn builder() -> super::builder::ClassifierBuilder {
        super::builder::ClassifierBuilder::new()
    }

    pub(crate) fn from_parts(config: TrainingConfig, stopwords: Stopwords, label_map: LabelMap) -> Self {
        Self {
            config,
            stopwords,
            label_map,
            pipeline: None,
            state: ModelState::Untrained,
        }
    }

    pub fn state(&self) -> ModelState {
        self.state
    }

    pub fn is_ready(&self) -> bool {
        self.pipeline.is_some()
    }

    pub fn label_map(&self) -> &LabelMap {
        &self.label_map
    }

    pub fn config(&self) -> &TrainingConfig {
        &self.config
    }

    pub fn stopwords(&self) -> &Stopwords {
        &self.stopwords
    }

    /// Reads a `texto,emocion` CSV and returns normalized texts with their
    /// label codes.
    pub fn load_corpus(&self, path: impl AsRef<Path>) -> Result<(Vec<String>, Vec<usize>), ClassifierError> {
        let examples = corpus::read_csv(path)?;
        self.encode_examples(&examples)
    }

    /// Normalizes and label-encodes in-memory examples.
    pub fn encode_examples(&self, examples: &[corpus::Example]) -> Result<(Vec<String>, Vec<usize>), ClassifierError> {
        let texts = examples.iter().map(|e| normalize(&e.texto)).collect();
        let labels = examples
            .iter()
            .map(|e| self.label_map.encode(e.emocion))
            .collect::<Result<Vec<_>, _>>()?;
        Ok((texts, labels))
    }

    /// Fits the pipeline on a stratified 80/20 split, evaluates it on the
    /// held-out part and on k-fold cross-validation, and moves to
    /// [`ModelState::Trained`]. Metrics are reported, not enforced.
    pub fn train<S: AsRef<str>>(&mut self, texts: &[S], labels: &[usize]) -> Result<TrainingReport, ClassifierError> {
        self.config.validate()?;
        if texts.len() != labels.len() {
            return Err(ClassifierError::Training(format!(
                "{} texts but {} labels",
                texts.len(),
                labels.len()
            )));
        }
        self.check_label_codes(labels)?;
        let n_classes = self.label_map.len();

        let split = train_test_split(labels, n_classes, self.config.test_size, self.config.random_state)?;
        let pick_texts = |idx: &[usize]| idx.iter().map(|&i| texts[i].as_ref().to_string()).collect::<Vec<_>>();
        let pick_labels = |idx: &[usize]| idx.iter().map(|&i| labels[i]).collect::<Vec<_>>();
        let (train_texts, train_labels) = (pick_texts(&split.train), pick_labels(&split.train));
        let (test_texts, test_labels) = (pick_texts(&split.test), pick_labels(&split.test));

        info!("Training on {} samples, evaluating on {}", train_texts.len(), test_texts.len());
        let pipeline = EmotionPipeline::fit(
            &train_texts,
            &train_labels,
            n_classes,
            self.stopwords.words(),
            &self.config,
        )?;

        let predictions = pipeline.predict(&test_texts);
        let accuracy = accuracy(&test_labels, &predictions);
        let report = ClassificationReport::new(&test_labels, &predictions, &self.label_map);
        info!("Held-out accuracy: {:.4}", accuracy);
        info!("Classification report:\n{}", report);

        let cross_validation = if self.config.cv_folds >= 2 {
            let cv = self.cross_validate(texts, labels)?;
            info!("Cross-validation ({}-fold): {}", self.config.cv_folds, cv);
            Some(cv)
        } else {
            None
        };

        self.pipeline = Some(pipeline);
        self.state = ModelState::Trained;

        Ok(TrainingReport {
            test_texts,
            test_labels,
            predictions,
            accuracy,
            report,
            cross_validation,
        })
    }

    /// Accuracy of a fresh pipeline on each stratified fold of the full data.
    pub fn cross_validate<S: AsRef<str>>(&self, texts: &[S], labels: &[usize]) -> Result<CrossValidation, ClassifierError> {
        if texts.len() != labels.len() {
            return Err(ClassifierError::Training(format!(
                "{} texts but {} labels",
                texts.len(),
                labels.len()
            )));
        }
        self.check_label_codes(labels)?;
        let n_classes = self.label_map.len();
        let folds = stratified_k_fold(labels, n_classes, self.config.cv_folds)?;
        let mut scores = Vec::with_capacity(folds.len());
        for fold in folds {
            let train_texts: Vec<&str> = fold.train.iter().map(|&i| texts[i].as_ref()).collect();
            let train_labels: Vec<usize> = fold.train.iter().map(|&i| labels[i]).collect();
            let test_texts: Vec<&str> = fold.test.iter().map(|&i| texts[i].as_ref()).collect();
            let test_labels: Vec<usize> = fold.test.iter().map(|&i| labels[i]).collect();

            let pipeline = EmotionPipeline::fit(
                &train_texts,
                &train_labels,
                n_classes,
                self.stopwords.words(),
                &self.config,
            )?;
            scores.push(accuracy(&test_labels, &pipeline.predict(&test_texts)));
        }
        Ok(CrossValidation { scores })
    }

    fn check_label_codes(&self, labels: &[usize]) -> Result<(), ClassifierError> {
        let n_classes = self.label_map.len();
        match labels.iter().position(|&code| code >= n_classes) {
            Some(i) => Err(ClassifierError::MalformedData(format!(
                "label code {} at index {} is outside 0..{}",
                labels[i], i, n_classes
            ))),
            None => Ok(()),
        }
    }

    /// Classifies a raw (unnormalized) text.
    ///
    /// Text that normalizes to nothing still gets a well-formed, typically
    /// low-confidence, prediction.
    pub fn predict(&self, text: &str) -> Result<Prediction, ClassifierError> {
        let pipeline = self.pipeline.as_ref().ok_or(ClassifierError::NotReady)?;

        let cleaned = normalize(text);
        if cleaned.is_empty() {
            warn!("Input normalizes to an empty string; prediction carries no signal");
        }
        let proba = pipeline.predict_proba(&cleaned);
        let best = argmax(&proba);

        let mut probabilities = BTreeMap::new();
        for (code, &p) in proba.iter().enumerate() {
            let label = self.label_map.decode(code).ok_or_else(|| {
                ClassifierError::MalformedData(format!("pipeline produced unknown label code {}", code))
            })?;
            probabilities.insert(label, p);
        }
        let label = self
            .label_map
            .decode(best)
            .ok_or_else(|| ClassifierError::MalformedData(format!("unknown label code {}", best)))?;

        Ok(Prediction {
            label,
            confidence: proba[best],
            probabilities,
        })
    }

    /// Classifies each text, logging the outcome.
    pub fn analyze_examples<S: AsRef<str>>(&self, examples: &[S]) -> Result<Vec<(String, Prediction)>, ClassifierError> {
        info!("=== Analyzing {} examples ===", examples.len());
        examples
            .iter()
            .map(|text| {
                let text = text.as_ref();
                let prediction = self.predict(text)?;
                let preview: String = text.chars().take(50).collect();
                info!("'{}...' -> {} ({:.2}%)", preview, prediction.label, prediction.confidence * 100.0);
                Ok((text.to_string(), prediction))
            })
            .collect()
    }

    /// Writes the pipeline and label map as a pair.
    ///
    /// Both files are first written next to their targets and renamed into
    /// place. A failure before the first rename leaves any previous pair
    /// untouched; a failure after it removes both targets, since the old
    /// label map no longer matches the new pipeline.
    pub fn save(&self, pipeline_path: impl AsRef<Path>, label_map_path: impl AsRef<Path>) -> Result<(), ClassifierError> {
        let pipeline = self.pipeline.as_ref().ok_or(ClassifierError::NotReady)?;
        let pipeline_path = pipeline_path.as_ref();
        let label_map_path = label_map_path.as_ref();

        let result = write_pair(pipeline, &self.label_map, pipeline_path, label_map_path);
        match &result {
            Ok(()) => {
                info!("Model saved to {:?}", pipeline_path);
                info!("Label map saved to {:?}", label_map_path);
            }
            Err((stage, e)) => {
                error!("Failed to save model: {}", e);
                // Cleanup on failure
                for path in [pipeline_path, label_map_path] {
                    let _ = fs::remove_file(temp_path(path));
                    if *stage == SaveStage::Committing {
                        let _ = fs::remove_file(path);
                    }
                }
            }
        }
        result.map_err(|(_, e)| e)
    }

    /// Restores a pipeline and its label map, moving to [`ModelState::Loaded`].
    ///
    /// The reverse label map is rebuilt from the stored forward map.
    pub fn load(&mut self, pipeline_path: impl AsRef<Path>, label_map_path: impl AsRef<Path>) -> Result<(), ClassifierError> {
        let pipeline_path = pipeline_path.as_ref();
        let label_map_path = label_map_path.as_ref();
        for path in [pipeline_path, label_map_path] {
            if !path.exists() {
                return Err(ClassifierError::MissingModel {
                    path: path.to_path_buf(),
                });
            }
        }

        let pipeline_bytes = fs::read(pipeline_path)?;
        let artifact: LabelArtifact = serde_json::from_reader(BufReader::new(fs::File::open(label_map_path)?))?;
        if let Some(expected) = artifact.pipeline_sha256 {
            let actual = sha256_hex(&pipeline_bytes);
            if actual != expected {
                return Err(ClassifierError::ArtifactMismatch { expected, actual });
            }
        }

        let pipeline: EmotionPipeline = bincode::deserialize(&pipeline_bytes)?;
        if pipeline.n_classes() != artifact.labels.len() {
            return Err(ClassifierError::MalformedData(format!(
                "pipeline has {} classes but the label map has {}",
                pipeline.n_classes(),
                artifact.labels.len()
            )));
        }

        self.label_map = artifact.labels;
        self.pipeline = Some(pipeline);
        self.state = ModelState::Loaded;
        info!("Model loaded from {:?}", pipeline_path);
        Ok(())
    }
}

/// How far [`write_pair`] got before failing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SaveStage {
    /// Writing temporary siblings; the targets were not touched.
    Staging,
    /// At least one target may already have been replaced.
    Committing,
}

fn write_pair(
    pipeline: &EmotionPipeline,
    label_map: &LabelMap,
    pipeline_path: &Path,
    label_map_path: &Path,
) -> Result<(), (SaveStage, ClassifierError)> {
    let pipeline_tmp = temp_path(pipeline_path);
    let label_tmp = temp_path(label_map_path);

    stage_pair(pipeline, label_map, pipeline_path, label_map_path, &pipeline_tmp, &label_tmp)
        .map_err(|e| (SaveStage::Staging, e))?;

    fs::rename(&pipeline_tmp, pipeline_path).map_err(|e| (SaveStage::Staging, e.into()))?;
    fs::rename(&label_tmp, label_map_path).map_err(|e| (SaveStage::Committing, e.into()))?;
    Ok(())
}

fn stage_pair(
    pipeline: &EmotionPipeline,
    label_map: &LabelMap,
    pipeline_path: &Path,
    label_map_path: &Path,
    pipeline_tmp: &Path,
    label_tmp: &Path,
) -> Result<(), ClassifierError> {
    for path in [pipeline_path, label_map_path] {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
    }

    let pipeline_bytes = bincode::serialize(pipeline)?;
    let artifact = LabelArtifact {
        labels: label_map.clone(),
        pipeline_sha256: Some(sha256_hex(&pipeline_bytes)),
    };

    fs::write(pipeline_tmp, &pipeline_bytes)?;

    let mut writer = BufWriter::new(fs::File::create(label_tmp)?);
    serde_json::to_writer_pretty(&mut writer, &artifact)?;
    writer.flush()?;
    Ok(())
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}
