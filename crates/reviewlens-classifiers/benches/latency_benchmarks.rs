//! Latency benchmarks for feature extraction and scoring
//!
//! Run with: cargo bench -p reviewlens-classifiers

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use std::sync::Arc;
use tokio::runtime::Runtime;

use reviewlens_classifiers::{
    Classifier, LogisticParams, SentimentClassifier, SentimentModel, TfidfOptions,
};

fn training_corpus() -> (Vec<String>, Vec<i64>) {
    let positive = [
        "spotless room and very friendly staff",
        "great location lovely breakfast",
        "comfortable bed and helpful reception",
    ];
    let negative = [
        "dirty bathroom and rude staff",
        "noisy room terrible breakfast",
        "uncomfortable bed and unhelpful reception",
    ];

    let mut texts = Vec::new();
    let mut labels = Vec::new();
    for i in 0..200 {
        texts.push(format!("{} visit {i}", positive[i % positive.len()]));
        labels.push(1);
        texts.push(format!("{} visit {i}", negative[i % negative.len()]));
        labels.push(0);
    }
    (texts, labels)
}

fn fitted_model() -> SentimentModel {
    let (texts, labels) = training_corpus();
    SentimentModel::fit(&texts, &labels, TfidfOptions::default(), LogisticParams::default())
        .expect("Failed to fit benchmark model")
}

/// Benchmark TF-IDF transform of a batch of reviews
fn benchmark_vectorizer(c: &mut Criterion) {
    let model = fitted_model();
    let (texts, _) = training_corpus();

    let mut group = c.benchmark_group("TfidfVectorizer");
    for size in [1usize, 64, 400] {
        let batch = &texts[..size];
        group.bench_with_input(BenchmarkId::new("transform", size), &batch, |b, batch| {
            b.iter(|| model.vectorizer().transform(black_box(*batch)).unwrap())
        });
    }
    group.finish();
}

/// Benchmark single-review classification through the Classifier trait
fn benchmark_classifier(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let classifier = SentimentClassifier::new(Arc::new(fitted_model()));

    let test_cases = vec![
        ("short", "Rude staff"),
        (
            "medium",
            "The room was spotless and the staff were friendly, but breakfast was noisy.",
        ),
        ("unknown_words", "Zxq wvut plmk"),
    ];

    let mut group = c.benchmark_group("SentimentClassifier");
    for (name, text) in test_cases {
        group.bench_with_input(BenchmarkId::new("classify", name), &text, |b, text| {
            b.iter(|| rt.block_on(async { classifier.classify(black_box(text)).await.unwrap() }));
        });
    }
    group.finish();
}

criterion_group!(benches, benchmark_vectorizer, benchmark_classifier);
criterion_main!(benches);
