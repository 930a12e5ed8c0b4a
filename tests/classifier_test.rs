use std::collections::HashSet;
use std::sync::Arc;
use std::thread;

use cartas_emociones::{corpus, ClassifierError, Emotion, EmotionClassifier, ModelState, TrainingConfig};
use env_logger::{Builder, Env};

// Initialize test logger
fn init() {
    let _ = Builder::from_env(Env::default().default_filter_or("warn"))
        .is_test(true)
        .try_init();
}

fn setup_trained_classifier(config: TrainingConfig) -> EmotionClassifier {
    init();
    let mut classifier = EmotionClassifier::builder()
        .with_config(config)
        .build()
        .expect("Failed to create classifier");
    let (texts, labels) = classifier
        .encode_examples(&corpus::generate(90, 123))
        .expect("Failed to encode corpus");
    classifier.train(&texts, &labels).expect("Failed to train classifier");
    classifier
}

fn quick_config() -> TrainingConfig {
    TrainingConfig {
        n_estimators: 20,
        cv_folds: 0,
        ..Default::default()
    }
}

#[test]
fn test_model_trains_and_predicts() -> Result<(), Box<dyn std::error::Error>> {
    init();
    let mut classifier = EmotionClassifier::builder().build()?;
    let (texts, labels) = classifier.encode_examples(&corpus::generate(90, 123))?;

    let report = classifier.train(&texts, &labels)?;
    assert_eq!(classifier.state(), ModelState::Trained);
    assert!(!report.predictions.is_empty());
    assert_eq!(report.test_texts.len(), report.predictions.len());
    let known: HashSet<usize> = classifier.label_map().forward().values().copied().collect();
    assert!(report.predictions.iter().all(|p| known.contains(p)));

    assert!((0.0..=1.0).contains(&report.accuracy));
    let cv = report.cross_validation.expect("cross-validation enabled by default");
    assert_eq!(cv.scores.len(), 5);
    assert!(cv.scores.iter().all(|s| (0.0..=1.0).contains(s)));
    assert!((0.0..=1.0).contains(&cv.mean()));

    let prediction = classifier.predict("Te amo mas que a nada en este mundo")?;
    assert!(Emotion::ALL.contains(&prediction.label));
    assert!((0.0..=1.0).contains(&prediction.confidence));
    let keys: HashSet<Emotion> = prediction.probabilities.keys().copied().collect();
    assert_eq!(keys, Emotion::ALL.into_iter().collect::<HashSet<_>>());
    Ok(())
}

#[test]
fn test_probabilities_form_a_distribution() -> Result<(), ClassifierError> {
    let classifier = setup_trained_classifier(quick_config());
    for text in [
        "Te amo mas que a nada en este mundo",
        "Creo que debemos terminar esta relacion",
        "No se que siento por ti",
        "xyz",
    ] {
        let prediction = classifier.predict(text)?;
        let total: f64 = prediction.probabilities.values().sum();
        assert!((total - 1.0).abs() < 1e-9, "sum {} for {:?}", total, text);
        assert!(prediction.probabilities.values().all(|&p| p >= 0.0));
        assert_eq!(prediction.confidence, prediction.probabilities[&prediction.label]);
        let max = prediction.probabilities.values().cloned().fold(0.0, f64::max);
        assert_eq!(prediction.confidence, max);
    }
    Ok(())
}

#[test]
fn test_predict_before_training_is_not_ready() {
    let classifier = EmotionClassifier::builder().build().unwrap();
    assert!(matches!(classifier.predict("te amo"), Err(ClassifierError::NotReady)));
    assert!(matches!(classifier.analyze_examples(&["te amo"]), Err(ClassifierError::NotReady)));
}

#[test]
fn test_degenerate_input_is_tolerated() -> Result<(), ClassifierError> {
    let classifier = setup_trained_classifier(quick_config());
    for text in ["", "   ", "?!...", "12345"] {
        let prediction = classifier.predict(text)?;
        assert_eq!(prediction.probabilities.len(), 3);
        assert!((0.0..=1.0).contains(&prediction.confidence));
    }
    Ok(())
}

#[test]
fn test_training_is_reproducible() -> Result<(), ClassifierError> {
    let a = setup_trained_classifier(quick_config());
    let b = setup_trained_classifier(quick_config());
    let text = "No se si es amor o costumbre";
    assert_eq!(a.predict(text)?, b.predict(text)?);
    Ok(())
}

#[test]
fn test_analyze_examples() -> Result<(), ClassifierError> {
    let classifier = setup_trained_classifier(quick_config());
    let results = classifier.analyze_examples(&["Eres mi persona favorita", "Necesitamos separarnos"])?;
    assert_eq!(results.len(), 2);
    assert_eq!(results[0].0, "Eres mi persona favorita");
    Ok(())
}

#[test]
fn test_train_rejects_mismatched_input() {
    let mut classifier = EmotionClassifier::builder().with_config(quick_config()).build().unwrap();
    let result = classifier.train(&["te amo", "adios"], &[0]);
    assert!(matches!(result, Err(ClassifierError::Training(_))));
    assert_eq!(classifier.state(), ModelState::Untrained);
}

#[test]
fn test_out_of_range_label_code_is_malformed() {
    let mut classifier = EmotionClassifier::builder().with_config(quick_config()).build().unwrap();
    let (texts, mut labels) = classifier.encode_examples(&corpus::generate(30, 1)).unwrap();
    labels[0] = 7;

    match classifier.train(&texts, &labels) {
        Err(ClassifierError::MalformedData(msg)) => assert!(msg.contains("index 0")),
        other => panic!("expected MalformedData, got {:?}", other.map(|r| r.accuracy)),
    }
    assert!(!classifier.is_ready());
}

#[test]
fn test_cross_validation_needs_enough_samples_per_class() {
    let mut classifier = EmotionClassifier::builder()
        .with_config(TrainingConfig {
            n_estimators: 5,
            cv_folds: 5,
            ..Default::default()
        })
        .build()
        .unwrap();
    // Four examples per class.
    let (texts, labels) = classifier.encode_examples(&corpus::generate(12, 1)).unwrap();

    assert!(matches!(classifier.train(&texts, &labels), Err(ClassifierError::Training(_))));
    assert!(matches!(classifier.cross_validate(&texts, &labels), Err(ClassifierError::Training(_))));

    let mut without_cv = EmotionClassifier::builder()
        .with_config(TrainingConfig {
            n_estimators: 5,
            cv_folds: 0,
            ..Default::default()
        })
        .build()
        .unwrap();
    assert!(without_cv.train(&texts, &labels).is_ok());
}

#[test]
fn test_thread_safety() {
    let classifier = Arc::new(setup_trained_classifier(quick_config()));
    let mut handles = vec![];

    for text in ["te amo", "esto se acabo", "no se que sentir"] {
        let classifier = Arc::clone(&classifier);
        let handle = thread::spawn(move || {
            let result = classifier.predict(text);
            assert!(result.is_ok());
        });
        handles.push(handle);
    }

    for handle in handles {
        handle.join().unwrap();
    }
}
