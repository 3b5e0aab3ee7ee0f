use criterion::{black_box, criterion_group, criterion_main, Criterion};

use selfcheck_core::{parse_dataset, validate_dataset};

const HEADER: &str =
    "week\ttask\ttags\tunique-variant\tquestion\tfield-answers\tfield-number\tfield-names\ttolerance";

fn dataset(weeks: u32, tasks: u32) -> String {
    let mut raw = String::from(HEADER);
    for week in 1..=weeks {
        for task in 1..=tasks {
            let tags = if task % 5 == 0 { "bonus" } else { "" };
            raw.push_str(&format!(
                "\n{week}\t{task}\t{tags}\tyes\t\"Week {week} task {task}\nCompute both values\"\t\
                 \"{a},{b},{c},{d}\"\t2\tx,y\t0.5",
                a = week * 10 + task,
                b = week + task,
                c = week * task,
                d = week * 100 + task,
            ));
        }
    }
    raw
}

fn bench_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse_dataset");

    let small = dataset(1, 5);
    let course = dataset(12, 10);
    let large = dataset(50, 40);

    group.bench_function("small", |b| b.iter(|| parse_dataset(black_box(&small))));
    group.bench_function("course", |b| b.iter(|| parse_dataset(black_box(&course))));
    group.bench_function("large", |b| b.iter(|| parse_dataset(black_box(&large))));

    group.finish();
}

fn bench_validate(c: &mut Criterion) {
    let loaded = parse_dataset(&dataset(12, 10)).unwrap();
    c.bench_function("validate_dataset", |b| {
        b.iter(|| validate_dataset(black_box(&loaded)))
    });
}

criterion_group!(benches, bench_parse, bench_validate);
criterion_main!(benches);
