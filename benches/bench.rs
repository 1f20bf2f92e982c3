// Criterion benchmarks for PeerLink Match

use chrono::Weekday;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use peerlink_match::core::{availability_overlap, similarity, Matcher};
use peerlink_match::models::{
    AvailabilityWindow, ConversationStyle, CopingStyle, DistressLevel, EnergyLevel,
    HelperProfile, MatchMode, SeekerProfile, ThemeIntensity,
};

const DIM: usize = 1536;

const THEMES: &[&str] = &[
    "Exam Stress / Academic Pressure",
    "Loneliness / Isolation",
    "Self-Confidence / Self-Esteem",
    "Family Problems",
    "Friendship / Social Issues",
    "Burnout / Emotional Exhaustion",
    "Life Direction / Purpose",
];

fn embedding(seed: usize) -> Vec<f32> {
    (0..DIM)
        .map(|i| (((seed * 31 + i * 17) % 97) as f32 / 48.5) - 1.0)
        .collect()
}

fn unit(seed: usize, salt: usize) -> f64 {
    ((seed * 13 + salt * 7) % 101) as f64 / 100.0
}

fn create_seeker() -> SeekerProfile {
    SeekerProfile {
        id: "seeker".to_string(),
        embedding: embedding(0),
        vent_text: None,
        themes: vec![
            ThemeIntensity::new(THEMES[0], 0.95),
            ThemeIntensity::new(THEMES[1], 0.8),
        ],
        coping_style_preference: CopingStyle {
            problem_focused: 0.3,
            emotion_focused: 0.8,
            social_support: 0.9,
            avoidant: 0.1,
            meaning_making: 0.4,
        },
        conversation_preference: ConversationStyle {
            direct_advice: 0.3,
            reflective_listening: 0.9,
            collaborative_problem_solving: 0.5,
            validation_focused: 0.8,
        },
        availability_windows: vec![
            AvailabilityWindow::new(Weekday::Mon, 1080, 1260),
            AvailabilityWindow::new(Weekday::Wed, 1080, 1260),
            AvailabilityWindow::new(Weekday::Sat, 600, 780),
        ],
        energy_level: EnergyLevel::Depleted,
        distress_level: DistressLevel::High,
        urgency: 0.85,
    }
}

fn create_helper(id: usize) -> HelperProfile {
    HelperProfile {
        id: format!("helper-{}", id),
        embedding: embedding(id + 1),
        experience_narrative: None,
        themes_experience: THEMES
            .iter()
            .enumerate()
            .map(|(i, t)| (t.to_string(), unit(id, i)))
            .collect(),
        coping_style_expertise: CopingStyle {
            problem_focused: unit(id, 10),
            emotion_focused: unit(id, 11),
            social_support: unit(id, 12),
            avoidant: unit(id, 13),
            meaning_making: unit(id, 14),
        },
        conversation_style: ConversationStyle {
            direct_advice: unit(id, 20),
            reflective_listening: unit(id, 21),
            collaborative_problem_solving: unit(id, 22),
            validation_focused: unit(id, 23),
        },
        availability_windows: vec![
            AvailabilityWindow::new(Weekday::Mon, 1020 + (id % 60) as u16, 1200),
            AvailabilityWindow::new(Weekday::Sat, 540, 720),
        ],
        energy_level: EnergyLevel::Moderate,
        energy_consistency: unit(id, 30),
        reliability_score: unit(id, 31),
        response_rate: unit(id, 32),
        completion_rate: unit(id, 33),
        support_strengths: Default::default(),
    }
}

fn bench_similarity(c: &mut Criterion) {
    let a = embedding(1);
    let b = embedding(2);

    c.bench_function("similarity_1536", |bench| {
        bench.iter(|| similarity(black_box(&a), black_box(&b)));
    });
}

fn bench_availability(c: &mut Criterion) {
    let seeker = create_seeker();
    let helper = create_helper(7);

    c.bench_function("availability_overlap", |bench| {
        bench.iter(|| {
            availability_overlap(
                black_box(&seeker.availability_windows),
                black_box(&helper.availability_windows),
            )
        });
    });
}

fn bench_matching(c: &mut Criterion) {
    let matcher = Matcher::with_default_weights();
    let seeker = create_seeker();

    let mut group = c.benchmark_group("matching");

    for pool_size in [10, 50, 100, 500, 1000].iter() {
        let helpers: Vec<HelperProfile> = (0..*pool_size).map(create_helper).collect();

        group.bench_with_input(
            BenchmarkId::new("rank", pool_size),
            pool_size,
            |bench, _| {
                bench.iter(|| {
                    matcher.rank(
                        black_box(&seeker),
                        black_box(&helpers),
                        black_box(5),
                        MatchMode::Heuristic,
                    )
                });
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_similarity, bench_availability, bench_matching);

criterion_main!(benches);
