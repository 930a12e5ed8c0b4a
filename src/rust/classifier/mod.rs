mod error;
mod model;
pub mod builder;
pub mod evaluation;
pub mod forest;
pub mod pipeline;
pub mod smote;
pub mod vectorizer;
mod utils;

pub use error::ClassifierError;
pub use model::{EmotionClassifier, ModelState, Prediction, TrainingReport};
pub use builder::ClassifierBuilder;
pub use evaluation::{ClassificationReport, ClassMetrics, CrossValidation};
pub use forest::{ForestParams, RandomForest};
pub use pipeline::EmotionPipeline;
pub use smote::Smote;
pub use vectorizer::TfidfVectorizer;
