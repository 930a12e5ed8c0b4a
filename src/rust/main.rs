use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;

use anyhow::{Context, Result};
use cartas_emociones::{
    corpus, ArtifactStore, ClassifierError, EmotionClassifier, Prediction, ProjectPaths, StopwordSource,
};
use clap::{Parser, Subcommand};
use log::info;

const EXAMPLE_LETTERS: [&str; 5] = [
    "Te amo mas que a nada en este mundo y quiero estar contigo siempre",
    "Creo que debemos terminar esta relacion, ya no somos felices juntos",
    "No se que siento por ti, a veces te amo y a veces necesito espacio",
    "Tu presencia llena mi vida de alegria y no imagino un futuro sin ti",
    "Necesito tiempo para pensar en lo nuestro, estoy muy confundido",
];

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Generate the synthetic dataset CSV
    Generate {
        /// Requested number of examples (rounded down to a multiple of 3)
        #[arg(short, long, default_value_t = 300)]
        n: usize,
        #[arg(short, long, default_value_t = 42)]
        seed: u64,
        /// Output CSV path (defaults to data/processed/cartas_dataset.csv)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Train on a dataset CSV and save the model pair
    Train {
        #[arg(short, long)]
        data: Option<PathBuf>,
        #[arg(short, long)]
        models_dir: Option<PathBuf>,
        /// Newline-separated stopword file (overrides CARTAS_STOPWORDS)
        #[arg(long)]
        stopwords: Option<PathBuf>,
    },
    /// Classify a text with the saved model
    Predict {
        text: String,
        #[arg(short, long)]
        models_dir: Option<PathBuf>,
        /// Print the prediction as JSON
        #[arg(long)]
        json: bool,
    },
    /// Train in memory on a fresh corpus and classify the example letters
    Demo {
        #[arg(short, long, default_value_t = 300)]
        n: usize,
        #[arg(short, long, default_value_t = 42)]
        seed: u64,
    },
}

fn main() -> ExitCode {
    cartas_emociones::init_logger();
    let args = Args::parse();

    match run(args.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("\nError: {}", user_message(&e));
            ExitCode::FAILURE
        }
    }
}

fn run(command: Command) -> Result<()> {
    let paths = ProjectPaths::from_env();
    match command {
        Command::Generate { n, seed, output } => {
            let output = output.unwrap_or_else(|| paths.dataset_path());
            let examples = corpus::generate(n, seed);
            corpus::write_csv(&output, &examples)?;

            println!("Dataset saved to {:?}", output);
            println!("Distribution:");
            for (label, count) in corpus::label_distribution(&examples) {
                println!("  {}: {}", label, count);
            }
            println!("\nOne example per class:");
            for label in cartas_emociones::Emotion::ALL {
                if let Some(example) = examples.iter().find(|e| e.emocion == label) {
                    println!("  {}: {}", label, example.texto);
                }
            }
        }
        Command::Train {
            data,
            models_dir,
            stopwords,
        } => {
            let data = data.unwrap_or_else(|| paths.dataset_path());
            let store = ArtifactStore::new(models_dir.unwrap_or_else(|| paths.models_dir()));
            let source = stopwords.map(StopwordSource::File).unwrap_or_else(StopwordSource::from_env);

            let start_time = Instant::now();
            let mut classifier = EmotionClassifier::builder().with_stopword_source(source).build()?;
            info!("Loading data from {:?}", data);
            let (texts, labels) = classifier
                .load_corpus(&data)
                .with_context(|| format!("reading dataset {:?}", data))?;
            let report = classifier.train(&texts, &labels)?;
            store.save(&classifier)?;

            println!("\n=== MODEL RESULTS ===");
            println!("Accuracy: {:.4}", report.accuracy);
            println!("\nClassification report:\n{}", report.report);
            if let Some(cv) = &report.cross_validation {
                println!("Cross-validation ({}-fold): {}", classifier.config().cv_folds, cv);
            }
            println!("\nModel saved to {:?}", store.pipeline_path());
            println!("Label map saved to {:?}", store.label_map_path());
            info!("Training took {:.2?}", start_time.elapsed());

            analyze(&classifier)?;
        }
        Command::Predict {
            text,
            models_dir,
            json,
        } => {
            let store = ArtifactStore::new(models_dir.unwrap_or_else(|| paths.models_dir()));
            if !store.is_model_saved() {
                anyhow::bail!(ClassifierError::MissingModel {
                    path: store.models_dir().to_path_buf(),
                });
            }
            let classifier = store.load_into(
                EmotionClassifier::builder().with_stopword_source(StopwordSource::from_env()),
            )?;
            let prediction = classifier.predict(&text)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&prediction)?);
            } else {
                print_prediction(&text, &prediction);
            }
        }
        Command::Demo { n, seed } => {
            let start_time = Instant::now();
            let examples = corpus::generate(n, seed);
            let mut classifier = EmotionClassifier::builder().build()?;
            let (texts, labels) = classifier.encode_examples(&examples)?;
            let report = classifier.train(&texts, &labels)?;
            println!("Accuracy: {:.4}", report.accuracy);
            info!("Demo training took {:.2?}", start_time.elapsed());
            analyze(&classifier)?;
        }
    }
    Ok(())
}

fn analyze(classifier: &EmotionClassifier) -> Result<()> {
    println!("\n=== EXAMPLE ANALYSIS ===");
    for (text, prediction) in classifier.analyze_examples(&EXAMPLE_LETTERS)? {
        print_prediction(&text, &prediction);
    }
    Ok(())
}

fn print_prediction(text: &str, prediction: &Prediction) {
    let preview: String = text.chars().take(50).collect();
    println!("\nText: '{}...'", preview);
    println!("  Predicted emotion: {}", prediction.label);
    println!("  Confidence: {:.2}%", prediction.confidence * 100.0);

    let mut scores: Vec<_> = prediction.probabilities.iter().collect();
    scores.sort_by(|a, b| b.1.total_cmp(a.1));
    println!("  Probabilities (sorted):");
    for (label, p) in scores {
        println!("    {}: {:.1}%", label, p * 100.0);
    }
}

fn user_message(error: &anyhow::Error) -> String {
    match error.downcast_ref::<ClassifierError>() {
        Some(ClassifierError::MissingModel { path }) => format!(
            "no trained model found at {:?}. Run `cartas generate` and `cartas train` first.",
            path
        ),
        Some(ClassifierError::NotReady) => "the model is not trained or loaded yet.".to_string(),
        Some(ClassifierError::ArtifactMismatch { .. }) => {
            "the saved model files do not belong together; retrain with `cartas train`.".to_string()
        }
        Some(ClassifierError::MalformedData(msg)) => format!("invalid data: {}", msg),
        _ => format!("{:#}", error),
    }
}
