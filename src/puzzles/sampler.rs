//! Weekly batch selection with a target difficulty mix.

use chrono::{DateTime, Utc};
use rand::seq::SliceRandom;
use rand::Rng;

use crate::puzzles::catalog::available_templates;
use crate::puzzles::types::{Difficulty, Puzzle, PuzzleTemplate, WeekPeriod};

pub const DEFAULT_BATCH_SIZE: usize = 5;

/// Per-difficulty target counts for a batch of `count`, each rounded up.
/// The targets may sum to more than `count`; the sampler truncates.
pub fn bucket_targets(count: usize) -> [(Difficulty, usize); 4] {
    Difficulty::ALL.map(|d| (d, (count * d.target_percent()).div_ceil(100)))
}

/// Pick up to `count` templates from `pool`, filling each difficulty bucket
/// towards its target and topping up from any difficulty when buckets run dry.
/// The selection is shuffled before truncation so the rounding overshoot can
/// fall on any difficulty.
pub fn sample_balanced<R>(pool: &[PuzzleTemplate], count: usize, rng: &mut R) -> Vec<PuzzleTemplate>
where
    R: Rng + ?Sized,
{
    if count == 0 || pool.is_empty() {
        return Vec::new();
    }

    let mut taken = vec![false; pool.len()];
    let mut selected = Vec::with_capacity(count + Difficulty::ALL.len());

    for (difficulty, target) in bucket_targets(count) {
        let mut bucket: Vec<usize> = pool
            .iter()
            .enumerate()
            .filter(|(_, t)| t.difficulty == difficulty)
            .map(|(idx, _)| idx)
            .collect();
        bucket.shuffle(rng);
        for idx in bucket.into_iter().take(target) {
            taken[idx] = true;
            selected.push(pool[idx]);
        }
    }

    if selected.len() < count {
        let rest: Vec<usize> = (0..pool.len()).filter(|idx| !taken[*idx]).collect();
        let needed = count - selected.len();
        selected.extend(rest.choose_multiple(rng, needed).map(|idx| pool[*idx]));
    }

    selected.shuffle(rng);
    selected.truncate(count);
    selected
}

/// Turn sampled templates into fresh, active, auto-generated puzzles.
pub fn instantiate(
    templates: &[PuzzleTemplate],
    period: WeekPeriod,
    now: DateTime<Utc>,
) -> Vec<Puzzle> {
    templates
        .iter()
        .map(|t| Puzzle {
            id: uuid::Uuid::new_v4().to_string(),
            question: t.question.to_string(),
            answer: t.answer.to_string(),
            difficulty: t.difficulty,
            is_active: true,
            week_number: period.week_number,
            year: period.year,
            auto_generated: true,
            created_at: now,
        })
        .collect()
}

/// New batch for `period` drawn from catalog templates unused by `existing`.
/// Returns an empty batch when the catalog is exhausted.
pub fn auto_generate_puzzles_with_rng<R>(
    existing: &[Puzzle],
    count: usize,
    period: WeekPeriod,
    now: DateTime<Utc>,
    rng: &mut R,
) -> Vec<Puzzle>
where
    R: Rng + ?Sized,
{
    let pool = available_templates(existing);
    let picked = sample_balanced(&pool, count, rng);
    instantiate(&picked, period, now)
}

pub fn auto_generate_puzzles(
    existing: &[Puzzle],
    count: usize,
    period: WeekPeriod,
    now: DateTime<Utc>,
) -> Vec<Puzzle> {
    auto_generate_puzzles_with_rng(existing, count, period, now, &mut rand::thread_rng())
}
