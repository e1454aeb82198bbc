//! Benchmarks for suggestion and scoring over a mid-sized course.

use std::sync::Arc;

use chrono::{TimeZone, Utc};
use criterion::{black_box, criterion_group, criterion_main, Criterion};

use paideia::{Concept, ConceptId, Difficulty, Engine, KnowledgeGraph, LearnerProfile, Quiz};

fn course(concepts: usize, quizzes_per_concept: usize) -> (Engine, Vec<Quiz>) {
    let ids: Vec<String> = (0..concepts).map(|i| format!("concept-{i:03}")).collect();
    let nodes: Vec<Concept> = ids.iter().map(|id| Concept::new(id.clone(), id.clone())).collect();
    // A layered DAG: each concept depends on the one four positions back.
    let edges: Vec<(ConceptId, ConceptId)> = (4..concepts)
        .map(|i| (ConceptId::new(ids[i - 4].as_str()), ConceptId::new(ids[i].as_str())))
        .collect();
    let graph = KnowledgeGraph::build(nodes, edges).unwrap();

    let mut bank = Vec::new();
    for (i, id) in ids.iter().enumerate() {
        for j in 0..quizzes_per_concept {
            let difficulty = Difficulty::new((j % 5 + 1) as u8).unwrap();
            let style = if j % 2 == 0 { "multiple_choice" } else { "fill_in_blank" };
            bank.push(Quiz::new(
                format!("quiz-{i:03}-{j}"),
                vec![ConceptId::new(id.as_str())],
                difficulty,
                style,
            ));
        }
    }
    (Engine::with_defaults(Arc::new(graph)), bank)
}

fn bench_suggest(c: &mut Criterion) {
    let (engine, bank) = course(60, 5);
    let now = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
    let mut profile = LearnerProfile::new("bench-learner", now);
    // A mixed profile: some weak, some in-progress, some mastered.
    for (i, id) in engine.graph().concept_ids().iter().enumerate() {
        let score = match i % 4 {
            0 => -2.0,
            1 => 0.5,
            2 => 2.0,
            _ => 5.0,
        };
        profile.scores.insert(id.clone(), score);
    }

    c.bench_function("suggest_60x5", |bench| {
        bench.iter(|| black_box(engine.suggest_next_quiz(&profile, &bank, now).unwrap()))
    });
}

fn bench_update(c: &mut Criterion) {
    let (engine, bank) = course(60, 5);
    let now = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
    let profile = LearnerProfile::new("bench-learner", now);
    let quiz = &bank[0];

    c.bench_function("update_scores_60x5", |bench| {
        bench.iter(|| black_box(engine.update_scores(&profile, quiz, true, now).unwrap()))
    });
}

fn bench_round_trip(c: &mut Criterion) {
    let (engine, bank) = course(60, 5);
    let now = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();

    c.bench_function("suggest_then_update_60x5", |bench| {
        bench.iter(|| {
            let profile = LearnerProfile::new("bench-learner", now);
            let quiz = engine.suggest_next_quiz(&profile, &bank, now).unwrap();
            black_box(engine.update_scores(&profile, quiz, true, now).unwrap())
        })
    });
}

criterion_group!(benches, bench_suggest, bench_update, bench_round_trip);
criterion_main!(benches);
