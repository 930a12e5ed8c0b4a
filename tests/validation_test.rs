use cartas_emociones::stopwords::FALLBACK_STOPWORDS;
use cartas_emociones::text::{normalize, normalize_field};
use cartas_emociones::{ClassifierError, EmotionClassifier, StopwordSource, TrainingConfig};

#[test]
fn test_normalize_is_idempotent() {
    for text in [
        "Realmente te amo con todo mi corazon...",
        "A veces  pienso__una cosa y 3 veces otra!!",
        "¿¡Qué!? ¿¡Cómo!?",
        "tab\tand\nnewline",
        "",
        "____",
        "99 problemas",
    ] {
        let once = normalize(text);
        assert_eq!(normalize(&once), once);
    }
}

#[test]
fn test_normalize_tolerates_missing_input() {
    assert_eq!(normalize_field(None), "");
    assert_eq!(normalize("123"), "");
    assert_eq!(normalize(" ... "), "");
}

#[test]
fn test_fallback_stopwords_are_pinned() {
    assert_eq!(FALLBACK_STOPWORDS.len(), 165);
    let stopwords = StopwordSource::Embedded.resolve();
    assert_eq!(stopwords.to_set().len(), 159);
    assert!(stopwords.to_set().contains("porque"));
}

#[test]
fn test_builder_rejects_invalid_config() {
    let result = EmotionClassifier::builder()
        .with_config(TrainingConfig {
            min_samples_leaf: 0,
            ..Default::default()
        })
        .build();
    assert!(matches!(result, Err(ClassifierError::Training(_))));
}

#[test]
fn test_training_needs_every_class_twice() {
    let mut classifier = EmotionClassifier::builder()
        .with_config(TrainingConfig {
            n_estimators: 3,
            cv_folds: 0,
            ..Default::default()
        })
        .build()
        .unwrap();
    let texts = ["te amo mucho", "te adoro", "adios para siempre", "no se que sentir"];
    let result = classifier.train(&texts, &[0, 0, 1, 2]);
    assert!(matches!(result, Err(ClassifierError::Training(_))));
}

#[test]
fn test_error_messages_are_user_facing() {
    let message = ClassifierError::NotReady.to_string();
    assert!(message.contains("train or load"));
    let missing = ClassifierError::MissingModel {
        path: "models/modelo_emociones.bin".into(),
    };
    assert!(missing.to_string().contains("modelo_emociones.bin"));
}
