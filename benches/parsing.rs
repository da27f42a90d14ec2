use criterion::{criterion_group, criterion_main, Criterion};
use std::path::Path;

use mboxsearch::parser::decoder::MailDecoder;
use mboxsearch::parser::mbox::{MboxSplitter, SplitOptions};
use mboxsearch::search::{SearchCoordinator, SearchField, SearchTerm, SearchTermSet};

fn bench_split_mbox(c: &mut Criterion) {
    let fixture_path = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join("simple.mbox");

    c.bench_function("split_simple_mbox", |b| {
        b.iter(|| {
            MboxSplitter::open(&fixture_path, &SplitOptions::default())
                .unwrap()
                .filter_map(Result::ok)
                .count()
        })
    });
}

fn bench_search(c: &mut Criterion) {
    let fixture_path = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join("simple.mbox");
    let archives = vec![fixture_path];
    let terms = SearchTermSet::new(vec![
        SearchTerm::new("invoice", SearchField::All),
        SearchTerm::new("user1", SearchField::From),
    ]);
    let coordinator = SearchCoordinator::new(MailDecoder);

    c.bench_function("search_simple_mbox", |b| {
        b.iter(|| coordinator.search(&archives, &terms, true).unwrap())
    });
}

criterion_group!(benches, bench_split_mbox, bench_search);
criterion_main!(benches);
