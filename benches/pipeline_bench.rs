//! Pipeline throughput benchmarks: full resolutions per second.
//!
//! Run with: `cargo bench`

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use mathhammer::pipeline::{resolve, CritEffect, RollInput, Ruleset};
use mathhammer::prob::{convolve_n, parse_dice_expression, Pmf};

fn simple_input() -> RollInput {
    RollInput {
        attacks: "10".to_string(),
        hit: Some(3),
        strength: Some(4),
        toughness: Some(4),
        ap: 1,
        save: Some(3),
        damage: "1".to_string(),
        wounds_per_model: 1,
        ..RollInput::default()
    }
}

fn heavy_input() -> RollInput {
    RollInput {
        attacks: "3d6".to_string(),
        hit: Some(3),
        hit_crit_effect: CritEffect::MortalDamage,
        bonus_hits: Some("d3".to_string()),
        strength: Some(6),
        toughness: Some(4),
        wound_crit_effect: CritEffect::PlusOneMortal,
        save: Some(3),
        invulnerable: Some(5),
        ap: 2,
        damage: "d6".to_string(),
        wounds_per_model: 4,
        feel_no_pain: Some(6),
        ..RollInput::default()
    }
}

fn bench_resolve(c: &mut Criterion) {
    c.bench_function("resolve_simple_40k", |b| {
        let input = simple_input();
        b.iter(|| resolve(black_box(Ruleset::FortyK), black_box(&input)))
    });

    c.bench_function("resolve_heavy_40k", |b| {
        let input = heavy_input();
        b.iter(|| resolve(black_box(Ruleset::FortyK), black_box(&input)))
    });
}

fn bench_primitives(c: &mut Criterion) {
    c.bench_function("parse_dice_expression", |b| {
        b.iter(|| parse_dice_expression(black_box("3d6+2d3+4")))
    });

    c.bench_function("convolve_20d6", |b| {
        let d6 = Pmf::uniform_die(6);
        b.iter(|| convolve_n(black_box(20), black_box(&d6)))
    });
}

criterion_group!(benches, bench_resolve, bench_primitives);
criterion_main!(benches);
