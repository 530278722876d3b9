//! Benchmarks for CF training and scoring
//!
//! Run with: cargo bench --package collab
//!
//! Uses a synthetic interaction set so no dataset has to be on disk.

use collab::{CandidateScorer, TrainingConfig, train};
use criterion::{Criterion, black_box, criterion_group, criterion_main};
use data_loader::{Interaction, Signal};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const USERS: usize = 500;
const REPOS: usize = 5_000;
const INTERACTIONS_PER_USER: usize = 40;

fn synthetic_interactions() -> Vec<Interaction> {
    let mut rng = StdRng::seed_from_u64(7);
    let mut interactions = Vec::with_capacity(USERS * INTERACTIONS_PER_USER);
    for user in 0..USERS {
        for _ in 0..INTERACTIONS_PER_USER {
            let repo = rng.random_range(0..REPOS);
            let signal = if rng.random_bool(0.7) {
                Signal::Positive
            } else {
                Signal::Negative
            };
            interactions.push(Interaction::new(
                format!("user{user}"),
                format!("repo{repo}"),
                signal,
            ));
        }
    }
    interactions
}

fn bench_train(c: &mut Criterion) {
    let interactions = synthetic_interactions();
    let config = TrainingConfig::default().with_epochs(5);

    let mut group = c.benchmark_group("train");
    group.sample_size(10);
    group.bench_function("bpr_5_epochs", |b| {
        b.iter(|| black_box(train(black_box(&interactions), &config).unwrap()))
    });
    group.finish();
}

fn bench_score(c: &mut Criterion) {
    let model = train(&synthetic_interactions(), &TrainingConfig::default().with_epochs(2))
        .expect("Failed to train benchmark model");
    let scorer = CandidateScorer::new();

    c.bench_function("score_full_universe", |b| {
        b.iter(|| black_box(scorer.score(black_box("user42"), &model)))
    });
}

criterion_group!(benches, bench_train, bench_score);
criterion_main!(benches);
