//! Benchmarks for rescleaner cleaning performance.
//!
//! Run with: cargo bench
//!
//! These benchmarks test the text normalizer and the full CSV pipeline at
//! various thread sizes.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rescleaner::{CsvPipeline, TextCleaner};

const SAMPLE_POSTS: &[&str] = &[
    ">>1 ｷﾀ━━━━(ﾟ∀ﾟ)━━━━!! 新スレおめ",
    "<b>太字</b>テスト https://example.com/thread/123 を見て",
    "@someone　全角スペースと　ＡＢＣ１２３",
    "顔文字(゚∀゚)と記号★☆※がたくさん！？",
    "普通のレスです。今日は晴れ。",
];

/// Creates a synthetic thread export with the given number of posts.
fn create_test_csv(post_count: usize) -> String {
    let mut csv = String::from("レス番号,内容\n");
    for i in 0..post_count {
        let post = SAMPLE_POSTS[i % SAMPLE_POSTS.len()];
        csv.push_str(&format!("{},\"{} {}\"\n", i + 1, post, i));
    }
    csv
}

/// Benchmark single-post cleaning.
fn bench_clean_text(c: &mut Criterion) {
    let cleaner = TextCleaner::default();

    c.bench_function("clean_text_post", |b| {
        b.iter(|| {
            for post in SAMPLE_POSTS {
                black_box(cleaner.clean(black_box(post)));
            }
        });
    });
}

/// Benchmark the pipeline from file to file.
fn bench_pipeline(c: &mut Criterion) {
    let mut group = c.benchmark_group("csv_pipeline");
    let dir = tempfile::tempdir().unwrap();
    let pipeline = CsvPipeline::default();

    for post_count in [100, 1000, 5000].iter() {
        let data = create_test_csv(*post_count);
        let input = dir.path().join(format!("thread_{}.csv", post_count));
        let output = dir.path().join(format!("cleaned_{}.csv", post_count));
        std::fs::write(&input, &data).unwrap();

        group.throughput(Throughput::Bytes(data.len() as u64));
        group.bench_with_input(BenchmarkId::new("posts", post_count), &input, |b, input| {
            b.iter(|| pipeline.run(black_box(input), &output).unwrap());
        });
    }

    group.finish();
}

/// Benchmark encoding detection on a CP932 file.
fn bench_decode(c: &mut Criterion) {
    let data = create_test_csv(1000);
    let (bytes, _, _) = encoding_rs::SHIFT_JIS.encode(&data);

    c.bench_function("decode_cp932", |b| {
        b.iter(|| rescleaner::detect::decode(black_box(&bytes[..])).unwrap());
    });
}

criterion_group!(benches, bench_clean_text, bench_decode, bench_pipeline);
criterion_main!(benches);
