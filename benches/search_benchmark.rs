use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use seqsearch::{CompressedSuffixTrie, PatternTrie, SearchConfig};
use std::time::Duration;

/// Generate a random DNA text
fn generate_text(len: usize, seed: u64) -> String {
    let mut rng = StdRng::seed_from_u64(seed);
    let bases = ['A', 'C', 'G', 'T'];
    (0..len).map(|_| bases[rng.gen_range(0..4)]).collect()
}

/// Keywords sampled from the text so exact hits exist
fn sample_keywords(text: &str, count: usize, len: usize, seed: u64) -> Vec<String> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..count)
        .map(|_| {
            let start = rng.gen_range(0..text.len() - len);
            text[start..start + len].to_string()
        })
        .collect()
}

fn bench_keyword_search(c: &mut Criterion) {
    let mut group = c.benchmark_group("keyword_search");
    let text = generate_text(10_000, 42);
    let keywords = sample_keywords(&text, 20, 8, 7);
    let trie = PatternTrie::build(&keywords);

    for k in [0usize, 1, 2] {
        group.bench_with_input(BenchmarkId::new("search_all", k), &k, |b, &k| {
            b.iter(|| trie.search_all(black_box(&text), k).unwrap());
        });
    }

    group.finish();
}

fn bench_suffix_construction(c: &mut Criterion) {
    let mut group = c.benchmark_group("suffix_construction");
    group.measurement_time(Duration::from_secs(10));

    for n in [250, 500, 1000] {
        let text = generate_text(n, 42);
        group.bench_with_input(BenchmarkId::new("build", n), &text, |b, text| {
            b.iter(|| CompressedSuffixTrie::build(black_box(text)).unwrap());
        });
    }

    group.finish();
}

fn bench_suffix_search(c: &mut Criterion) {
    let mut group = c.benchmark_group("suffix_search");
    let text = generate_text(1000, 42);
    let keywords = sample_keywords(&text, 10, 8, 7);
    let memo = CompressedSuffixTrie::build(&text).unwrap();
    let plain = CompressedSuffixTrie::build_with_config(
        &text,
        SearchConfig {
            memoize: false,
            ..SearchConfig::default()
        },
    )
    .unwrap();

    for k in [0usize, 1, 2] {
        group.bench_with_input(BenchmarkId::new("memoized", k), &k, |b, &k| {
            b.iter(|| memo.search_approx_many(black_box(keywords.as_slice()), k).unwrap());
        });
        group.bench_with_input(BenchmarkId::new("plain", k), &k, |b, &k| {
            b.iter(|| plain.search_approx_many(black_box(keywords.as_slice()), k).unwrap());
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_keyword_search,
    bench_suffix_construction,
    bench_suffix_search
);
criterion_main!(benches);
