// Criterion benchmarks for VAN Search

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use serde_json::json;
use van_search::core::unpack_ward_page;
use van_search::{PeoplePage, Record, WardMatcher};

fn create_person(id: usize) -> Record {
    json!({
        "vanId": id,
        "firstName": format!("First {}", id),
        "lastName": format!("Last {}", id),
        "districts": [
            {"name": "Congressional", "districtFieldValues": [{"name": "CD-7"}]},
            {"name": "Ward", "districtFieldValues": [{"name": format!("Ward {}", id % 12)}]},
            {"name": "Precinct", "districtFieldValues": [{"name": format!("P-{}", id % 40)}]}
        ]
    })
    .as_object()
    .cloned()
    .unwrap()
}

fn create_page(size: usize) -> PeoplePage {
    PeoplePage {
        count: size as i64,
        items: (0..size).map(create_person).collect(),
        next_page_link: None,
    }
}

fn bench_extract_ward(c: &mut Criterion) {
    let matcher = WardMatcher::new(1);
    let person = create_person(7);

    c.bench_function("extract_ward", |b| {
        b.iter(|| matcher.extract_ward(black_box(&person)))
    });

    c.bench_function("matches_ward", |b| {
        b.iter(|| matcher.matches_ward(black_box(&person), black_box("Ward 7")))
    });
}

fn bench_unpack_page(c: &mut Criterion) {
    let matcher = WardMatcher::new(1);
    let mut group = c.benchmark_group("unpack_ward_page");

    for size in [10, 50, 200] {
        let page = create_page(size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &page, |b, page| {
            b.iter(|| unpack_ward_page(black_box(page), 1, &matcher))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_extract_ward, bench_unpack_page);
criterion_main!(benches);
