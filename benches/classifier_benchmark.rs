use cartas_emociones::classifier::TfidfVectorizer;
use cartas_emociones::text::normalize;
use cartas_emociones::{corpus, EmotionClassifier, TrainingConfig};
use criterion::{black_box, criterion_group, criterion_main, Criterion};

fn setup_benchmark_classifier(n_estimators: usize) -> EmotionClassifier {
    let mut classifier = EmotionClassifier::builder()
        .with_config(TrainingConfig {
            n_estimators,
            cv_folds: 0,
            ..Default::default()
        })
        .build()
        .unwrap();
    let (texts, labels) = classifier.encode_examples(&corpus::generate(300, 42)).unwrap();
    classifier.train(&texts, &labels).unwrap();
    classifier
}

fn bench_normalization(c: &mut Criterion) {
    let mut group = c.benchmark_group("Normalization");
    group.sample_size(50);
    group.warm_up_time(std::time::Duration::from_secs(1));

    group.bench_function("short_text", |b| b.iter(|| normalize(black_box("¡Te AMO 100%!"))));

    group.bench_function("long_text", |b| b.iter(|| {
        normalize(black_box(
            "Querida mia: no se que siento por ti, a veces te amo y a veces necesito \
             espacio. Pasaron 3 meses desde la ultima carta y todavia pienso en lo \
             nuestro... ¿Sera costumbre? ¿Sera amor? Solo se que cuando no estas, \
             todo parece mas gris y los dias se hacen largos.",
        ))
    }));

    group.finish();
}

fn bench_vectorizer(c: &mut Criterion) {
    let mut group = c.benchmark_group("Vectorizer");
    group.sample_size(20);

    let examples = corpus::generate(300, 42);
    let texts: Vec<String> = examples.iter().map(|e| normalize(&e.texto)).collect();

    group.bench_function("fit_300", |b| b.iter(|| {
        let mut vectorizer = TfidfVectorizer::new(2000, (1, 2));
        vectorizer.fit(black_box(&texts)).unwrap();
        vectorizer
    }));

    group.finish();
}

fn bench_prediction(c: &mut Criterion) {
    let mut group = c.benchmark_group("Prediction");
    group.sample_size(50);
    group.warm_up_time(std::time::Duration::from_secs(1));

    for n_estimators in [20, 120] {
        let classifier = setup_benchmark_classifier(n_estimators);
        group.bench_function(format!("predict_{}_trees", n_estimators), |b| b.iter(|| {
            classifier
                .predict(black_box("Te amo mas que a nada en este mundo y quiero estar contigo siempre"))
                .unwrap()
        }));
    }

    group.finish();
}

criterion_group!(benches, bench_normalization, bench_vectorizer, bench_prediction);
criterion_main!(benches);
