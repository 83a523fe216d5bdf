use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde_json::{json, Value};

use quizforge_core::{assemble, validate_bank, BankRequirements, ExamProfile};

fn large_bank(per_category: usize) -> Value {
    let single: Vec<Value> = (0..per_category)
        .map(|i| {
            let options: Vec<String> = ["a", "b", "c", "d"]
                .iter()
                .map(|body| format!("{}、s{i} {body}", body.to_uppercase()))
                .collect();
            json!({
                "question": format!("single {i}"),
                "options": options,
                "answer": "B"
            })
        })
        .collect();
    let multiple: Vec<Value> = (0..per_category)
        .map(|i| {
            let options: Vec<String> = ["a", "b", "c", "d", "e"]
                .iter()
                .map(|body| format!("{}、m{i} {body}", body.to_uppercase()))
                .collect();
            json!({
                "question": format!("multiple {i}"),
                "options": options,
                "answer": "ACE"
            })
        })
        .collect();
    let tf: Vec<Value> = (0..per_category)
        .map(|i| json!({ "question": format!("statement {i}"), "answer": i % 3 == 0 }))
        .collect();
    json!({ "single_choice": single, "multiple_choice": multiple, "true_false": tf })
}

fn bench_assembly(c: &mut Criterion) {
    let mut group = c.benchmark_group("assembly");
    let document = large_bank(500);
    let profile = ExamProfile::standard();

    group.bench_function("validate_500", |b| {
        b.iter(|| validate_bank(black_box(&document), &BankRequirements::standard()))
    });

    let bank = match validate_bank(&document, &profile.requirements()) {
        Ok(bank) => bank,
        Err(e) => panic!("benchmark bank is invalid: {e}"),
    };
    let mut rng = StdRng::seed_from_u64(1);
    group.bench_function("standard_profile", |b| {
        b.iter(|| assemble(black_box(&bank), &profile, &mut rng))
    });

    group.finish();
}

criterion_group!(benches, bench_assembly);
criterion_main!(benches);
