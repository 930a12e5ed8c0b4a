use std::fs;

use cartas_emociones::{corpus, ArtifactStore, ClassifierError, EmotionClassifier, ModelState, TrainingConfig};

fn trained_classifier() -> EmotionClassifier {
    let mut classifier = EmotionClassifier::builder()
        .with_config(TrainingConfig {
            n_estimators: 15,
            cv_folds: 0,
            ..Default::default()
        })
        .build()
        .expect("Failed to create classifier");
    let (texts, labels) = classifier.encode_examples(&corpus::generate(60, 7)).unwrap();
    classifier.train(&texts, &labels).unwrap();
    classifier
}

#[test]
fn test_save_then_load_predicts_identically() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let store = ArtifactStore::new(dir.path().join("models"));
    let original = trained_classifier();

    store.save(&original)?;
    assert!(store.is_model_saved());

    let restored = store.load()?;
    assert_eq!(restored.state(), ModelState::Loaded);
    assert_eq!(restored.label_map(), original.label_map());
    for text in [
        "Te amo mas que a nada en este mundo",
        "Ya no somos felices juntos",
        "Estoy en una encrucijada emocional",
        "",
    ] {
        assert_eq!(restored.predict(text)?, original.predict(text)?);
    }
    Ok(())
}

#[test]
fn test_load_into_existing_instance() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let pipeline = dir.path().join("modelo.bin");
    let labels = dir.path().join("labels.json");
    let original = trained_classifier();
    original.save(&pipeline, &labels)?;

    let mut fresh = EmotionClassifier::builder().build()?;
    assert!(matches!(fresh.predict("hola"), Err(ClassifierError::NotReady)));
    fresh.load(&pipeline, &labels)?;
    assert_eq!(fresh.predict("Te extrano")?, original.predict("Te extrano")?);

    // No temporary siblings are left behind.
    let leftovers: Vec<_> = fs::read_dir(dir.path())?
        .filter_map(|e| e.ok())
        .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
        .collect();
    assert!(leftovers.is_empty());
    Ok(())
}

#[test]
fn test_label_map_file_holds_forward_map() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let store = ArtifactStore::new(dir.path());
    store.save(&trained_classifier())?;

    let json: serde_json::Value = serde_json::from_str(&fs::read_to_string(store.label_map_path())?)?;
    assert_eq!(json["labels"]["enamoramiento"], 0);
    assert_eq!(json["labels"]["ruptura"], 1);
    assert_eq!(json["labels"]["confusion"], 2);
    assert!(json["pipeline_sha256"].is_string());
    Ok(())
}

#[test]
fn test_missing_half_of_the_pair() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let store = ArtifactStore::new(dir.path());
    store.save(&trained_classifier())?;

    fs::remove_file(store.label_map_path())?;
    assert!(!store.is_model_saved());
    match store.load() {
        Err(ClassifierError::MissingModel { path }) => assert_eq!(path, store.label_map_path()),
        other => panic!("expected MissingModel, got {:?}", other.map(|c| c.state())),
    }
    Ok(())
}

#[test]
fn test_mismatched_pair_is_rejected() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let first = ArtifactStore::new(dir.path().join("first"));
    let second = ArtifactStore::new(dir.path().join("second"));
    first.save(&trained_classifier())?;

    let mut other = EmotionClassifier::builder()
        .with_config(TrainingConfig {
            n_estimators: 5,
            cv_folds: 0,
            ..Default::default()
        })
        .build()?;
    let (texts, labels) = other.encode_examples(&corpus::generate(45, 99))?;
    other.train(&texts, &labels)?;
    second.save(&other)?;

    fs::copy(second.pipeline_path(), first.pipeline_path())?;
    assert!(matches!(first.load(), Err(ClassifierError::ArtifactMismatch { .. })));
    Ok(())
}

#[test]
fn test_legacy_label_map_without_checksum_loads() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let store = ArtifactStore::new(dir.path());
    store.save(&trained_classifier())?;
    fs::write(
        store.label_map_path(),
        r#"{"labels": {"enamoramiento": 0, "ruptura": 1, "confusion": 2}}"#,
    )?;
    assert!(store.load()?.is_ready());
    Ok(())
}

#[test]
fn test_save_untrained_leaves_nothing() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let store = ArtifactStore::new(dir.path().join("models"));
    let untrained = EmotionClassifier::builder().build()?;
    assert!(matches!(store.save(&untrained), Err(ClassifierError::NotReady)));
    assert!(!store.is_model_saved());
    assert!(!store.pipeline_path().exists());
    Ok(())
}
