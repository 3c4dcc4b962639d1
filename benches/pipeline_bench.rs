use criterion::{black_box, criterion_group, criterion_main, Criterion};
use vidhuk::{SentenceSegmenter, TextPreprocessor};

const REVIEW: &str = "ЗАМОВЛЯВ телевізор QE55Q90 на rozetka.com.ua!!! Ціна 15000 грн. \
    Доставка на вул.Київську швидка, і т.д. Пишіть test@mail.com або дзвоніть \
    050 123 45 67. Замовлення №48123456 прийшло вчасно. РЕКОМЕНДУЮ!";

fn bench_pipeline(c: &mut Criterion) {
    let preprocessor = TextPreprocessor::with_default_config().unwrap();
    c.bench_function("preprocess_review", |b| {
        b.iter(|| preprocessor.preprocess(black_box(REVIEW)))
    });

    let segmenter = SentenceSegmenter::with_default_abbreviations().unwrap();
    let normalized = preprocessor.preprocess(REVIEW).clean_normalized;
    c.bench_function("segment_sentences", |b| {
        b.iter(|| segmenter.segment(black_box(&normalized)))
    });
}

criterion_group!(benches, bench_pipeline);
criterion_main!(benches);
