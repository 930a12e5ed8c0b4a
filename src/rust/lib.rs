//! Emotion classifier for short Spanish love-letter phrases.
//!
//! Generates a synthetic corpus, trains a TF-IDF → SMOTE → random forest
//! pipeline that tells *enamoramiento*, *ruptura* and *confusion* apart, and
//! persists it as a pipeline/label-map pair.
//!
//! # Basic Usage
//!
//! ```rust
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use cartas_emociones::{corpus, EmotionClassifier, TrainingConfig};
//!
//! let examples = corpus::generate(60, 42);
//! let mut classifier = EmotionClassifier::builder()
//!     .with_config(TrainingConfig { n_estimators: 20, cv_folds: 0, ..Default::default() })
//!     .build()?;
//!
//! let (texts, labels) = classifier.encode_examples(&examples)?;
//! let report = classifier.train(&texts, &labels)?;
//! println!("Held-out accuracy: {:.2}", report.accuracy);
//!
//! let prediction = classifier.predict("No se si es amor o costumbre")?;
//! for (label, p) in &prediction.probabilities {
//!     println!("{}: {:.1}%", label, p * 100.0);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Persistence
//!
//! ```rust,no_run
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use cartas_emociones::ArtifactStore;
//!
//! let store = ArtifactStore::new("models");
//! if !store.is_model_saved() {
//!     eprintln!("No model found. Run `cartas train` first.");
//!     return Ok(());
//! }
//! let classifier = store.load()?;
//! println!("{:?}", classifier.predict("Te extrano cuando no estas")?);
//! # Ok(())
//! # }
//! ```
//!
//! # Thread Safety
//!
//! Once trained or loaded, the classifier only needs `&self` to predict and
//! can be shared across threads with `Arc`. Training takes `&mut self`.

pub mod artifacts;
pub mod classifier;
pub mod config;
pub mod corpus;
pub mod labels;
pub mod stopwords;
pub mod text;

pub use artifacts::ArtifactStore;
pub use classifier::{
    ClassifierBuilder, ClassifierError, EmotionClassifier, ModelState, Prediction, TrainingReport,
};
pub use config::{ProjectPaths, TrainingConfig};
pub use corpus::Example;
pub use labels::{Emotion, LabelMap};
pub use stopwords::{StopwordSource, Stopwords};

/// Initializes `env_logger`, defaulting to the `info` level when `RUST_LOG`
/// is unset.
pub fn init_logger() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
}
