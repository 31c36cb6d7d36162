//! Leaderboard aggregation, re-derived from the attempt history on every read.
//!
//! Points come from the `score` stored on each attempt when it was confirmed
//! correct (at submission or at review). Rejected and pending attempts count
//! toward `total_attempts` only. Attempts whose puzzle no longer exists are
//! skipped for scoring.

use std::collections::HashMap;

use crate::puzzles::types::{Puzzle, PuzzleAttempt, PuzzleScore, WeekPeriod};

pub const UNKNOWN_USER_NAME: &str = "Unknown Warrior";

/// Resolves a user id to the name shown on the leaderboard.
pub trait UserDirectory {
    fn display_name(&self, user_id: &str) -> Option<String>;
}

impl UserDirectory for HashMap<String, String> {
    fn display_name(&self, user_id: &str) -> Option<String> {
        self.get(user_id).cloned()
    }
}

fn empty_score(user_id: &str, user_name: String) -> PuzzleScore {
    PuzzleScore {
        user_id: user_id.to_string(),
        user_name,
        total_score: 0,
        weekly_score: 0,
        correct_answers: 0,
        total_attempts: 0,
        last_activity: None,
        rank: None,
    }
}

/// Ranked scores for every user with at least one attempt, highest
/// `total_score` first. Ties keep the order in which users first appear in
/// `attempts`.
pub fn compute_leaderboard<D>(
    attempts: &[PuzzleAttempt],
    puzzles: &[Puzzle],
    users: &D,
    current: WeekPeriod,
) -> Vec<PuzzleScore>
where
    D: UserDirectory + ?Sized,
{
    let puzzles_by_id: HashMap<&str, &Puzzle> =
        puzzles.iter().map(|p| (p.id.as_str(), p)).collect();

    let mut scores: Vec<PuzzleScore> = Vec::new();
    let mut slot_by_user: HashMap<&str, usize> = HashMap::new();

    for attempt in attempts {
        let slot = *slot_by_user
            .entry(attempt.user_id.as_str())
            .or_insert_with(|| {
                let name = users
                    .display_name(&attempt.user_id)
                    .unwrap_or_else(|| UNKNOWN_USER_NAME.to_string());
                scores.push(empty_score(&attempt.user_id, name));
                scores.len() - 1
            });
        let entry = &mut scores[slot];
        entry.total_attempts += 1;

        if attempt.is_correct != Some(true) {
            continue;
        }
        let Some(puzzle) = puzzles_by_id.get(attempt.puzzle_id.as_str()) else {
            tracing::debug!(
                attempt_id = %attempt.id,
                puzzle_id = %attempt.puzzle_id,
                "Skipping correct attempt on missing puzzle"
            );
            continue;
        };

        entry.total_score += attempt.score;
        if puzzle.period() == current {
            entry.weekly_score += attempt.score;
        }
        entry.correct_answers += 1;
        entry.last_activity = match entry.last_activity {
            Some(prev) if prev >= attempt.submitted_at => Some(prev),
            _ => Some(attempt.submitted_at),
        };
    }

    // sort_by is stable
    scores.sort_by(|a, b| b.total_score.cmp(&a.total_score));
    for (idx, score) in scores.iter_mut().enumerate() {
        score.rank = Some(idx as u32 + 1);
    }
    scores
}

/// Totals for a single user's profile: their leaderboard row, or an unranked
/// zero row when they have never submitted anything.
pub fn user_totals<D>(leaderboard: &[PuzzleScore], users: &D, user_id: &str) -> PuzzleScore
where
    D: UserDirectory + ?Sized,
{
    leaderboard
        .iter()
        .find(|s| s.user_id == user_id)
        .cloned()
        .unwrap_or_else(|| {
            let name = users
                .display_name(user_id)
                .unwrap_or_else(|| UNKNOWN_USER_NAME.to_string());
            empty_score(user_id, name)
        })
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, Duration, Utc};

    use super::*;
    use crate::puzzles::types::Difficulty;

    const CURRENT: WeekPeriod = WeekPeriod {
        week_number: 20,
        year: 2026,
    };

    fn puzzle(id: &str, difficulty: Difficulty, period: WeekPeriod) -> Puzzle {
        Puzzle {
            id: id.to_string(),
            question: format!("question {id}"),
            answer: "answer".to_string(),
            difficulty,
            is_active: true,
            week_number: period.week_number,
            year: period.year,
            auto_generated: false,
            created_at: Utc::now(),
        }
    }

    fn attempt(
        user: &str,
        puzzle: &Puzzle,
        is_correct: Option<bool>,
        at: DateTime<Utc>,
    ) -> PuzzleAttempt {
        let score = if is_correct == Some(true) {
            puzzle.difficulty.points()
        } else {
            0
        };
        PuzzleAttempt {
            id: uuid::Uuid::new_v4().to_string(),
            puzzle_id: puzzle.id.clone(),
            user_id: user.to_string(),
            user_answer: "whatever".to_string(),
            is_correct,
            submitted_at: at,
            score,
            reviewed_at: None,
            reviewed_by: None,
        }
    }

    fn names() -> HashMap<String, String> {
        HashMap::from([
            ("u1".to_string(), "Aria".to_string()),
            ("u2".to_string(), "Bram".to_string()),
            ("u3".to_string(), "Cyra".to_string()),
        ])
    }

    #[test]
    fn correct_and_pending_attempts_totals() {
        let easy = puzzle("p1", Difficulty::Easy, CURRENT);
        let medium = puzzle("p2", Difficulty::Medium, CURRENT);
        let hard = puzzle("p3", Difficulty::Hard, CURRENT);
        let now = Utc::now();
        let attempts = vec![
            attempt("u1", &easy, Some(true), now),
            attempt("u1", &medium, Some(true), now),
            attempt("u1", &hard, None, now),
        ];

        let board = compute_leaderboard(
            &attempts,
            &[easy, medium, hard],
            &names(),
            CURRENT,
        );
        assert_eq!(board.len(), 1);
        let row = &board[0];
        assert_eq!(row.user_name, "Aria");
        assert_eq!(row.total_score, 15);
        assert_eq!(row.weekly_score, 15);
        assert_eq!(row.correct_answers, 2);
        assert_eq!(row.total_attempts, 3);
        assert_eq!(row.rank, Some(1));
    }

    #[test]
    fn higher_total_ranks_first() {
        let now = Utc::now();
        let p20 = puzzle("p20", Difficulty::SuperHard, CURRENT);
        let p10 = puzzle("p10", Difficulty::Medium, CURRENT);
        let attempts = vec![
            attempt("u2", &p20, Some(true), now),
            attempt("u1", &p20, Some(true), now),
            attempt("u1", &p10, Some(true), now),
        ];
        let board = compute_leaderboard(&attempts, &[p20, p10], &names(), CURRENT);
        assert_eq!(board[0].user_id, "u1");
        assert_eq!(board[0].total_score, 30);
        assert_eq!(board[0].rank, Some(1));
        assert_eq!(board[1].user_id, "u2");
        assert_eq!(board[1].total_score, 20);
        assert_eq!(board[1].rank, Some(2));
    }

    #[test]
    fn prior_week_counts_toward_total_only() {
        let now = Utc::now();
        let old = puzzle(
            "old",
            Difficulty::Hard,
            WeekPeriod {
                week_number: 19,
                year: 2026,
            },
        );
        let last_year = puzzle(
            "ly",
            Difficulty::Easy,
            WeekPeriod {
                week_number: 20,
                year: 2025,
            },
        );
        let fresh = puzzle("new", Difficulty::Easy, CURRENT);
        let attempts = vec![
            attempt("u1", &old, Some(true), now),
            attempt("u1", &last_year, Some(true), now),
            attempt("u1", &fresh, Some(true), now),
        ];
        let board = compute_leaderboard(&attempts, &[old, last_year, fresh], &names(), CURRENT);
        assert_eq!(board[0].total_score, 25);
        assert_eq!(board[0].weekly_score, 5);
    }

    #[test]
    fn missing_puzzle_is_skipped() {
        let now = Utc::now();
        let kept = puzzle("kept", Difficulty::Medium, CURRENT);
        let deleted = puzzle("gone", Difficulty::SuperHard, CURRENT);
        let attempts = vec![
            attempt("u1", &deleted, Some(true), now),
            attempt("u1", &kept, Some(true), now),
        ];
        let board = compute_leaderboard(&attempts, &[kept], &names(), CURRENT);
        assert_eq!(board[0].total_score, 10);
        assert_eq!(board[0].correct_answers, 1);
        assert_eq!(board[0].total_attempts, 2);
    }

    #[test]
    fn rejected_attempts_earn_nothing() {
        let now = Utc::now();
        let p = puzzle("p", Difficulty::Hard, CURRENT);
        let attempts = vec![attempt("u3", &p, Some(false), now)];
        let board = compute_leaderboard(&attempts, &[p], &names(), CURRENT);
        assert_eq!(board[0].total_score, 0);
        assert_eq!(board[0].correct_answers, 0);
        assert_eq!(board[0].total_attempts, 1);
        assert_eq!(board[0].last_activity, None);
    }

    #[test]
    fn ties_keep_first_seen_order() {
        let now = Utc::now();
        let p = puzzle("p", Difficulty::Easy, CURRENT);
        let attempts = vec![
            attempt("u3", &p, Some(true), now),
            attempt("u1", &p, Some(true), now),
            attempt("u2", &p, Some(true), now),
        ];
        let board = compute_leaderboard(&attempts, &[p], &names(), CURRENT);
        let order: Vec<&str> = board.iter().map(|s| s.user_id.as_str()).collect();
        assert_eq!(order, vec!["u3", "u1", "u2"]);
        let ranks: Vec<Option<u32>> = board.iter().map(|s| s.rank).collect();
        assert_eq!(ranks, vec![Some(1), Some(2), Some(3)]);
    }

    #[test]
    fn last_activity_is_latest_correct_submission() {
        let now = Utc::now();
        let earlier = now - Duration::hours(3);
        let a = puzzle("a", Difficulty::Easy, CURRENT);
        let b = puzzle("b", Difficulty::Easy, CURRENT);
        let attempts = vec![
            attempt("u1", &a, Some(true), now),
            attempt("u1", &b, Some(true), earlier),
            attempt("u1", &b, None, now + Duration::hours(1)),
        ];
        let board = compute_leaderboard(&attempts, &[a, b], &names(), CURRENT);
        assert_eq!(board[0].last_activity, Some(now));
    }

    #[test]
    fn unknown_users_get_placeholder_name() {
        let now = Utc::now();
        let p = puzzle("p", Difficulty::Easy, CURRENT);
        let attempts = vec![attempt("ghost", &p, Some(true), now)];
        let board = compute_leaderboard(&attempts, &[p], &names(), CURRENT);
        assert_eq!(board[0].user_name, UNKNOWN_USER_NAME);
    }

    #[test]
    fn user_totals_falls_back_to_unranked_row() {
        let board: Vec<PuzzleScore> = Vec::new();
        let totals = user_totals(&board, &names(), "u2");
        assert_eq!(totals.user_name, "Bram");
        assert_eq!(totals.rank, None);
        assert_eq!(totals.total_attempts, 0);
    }
}
