use sled::transaction::ConflictableTransactionError;
use sled::Transactional;

use crate::puzzles::types::{Puzzle, PuzzleAttempt};
use crate::store::keys;
use crate::store::{Store, StoreError};

impl Store {
    pub fn insert_puzzle(&self, puzzle: &Puzzle) -> Result<(), StoreError> {
        let key = keys::puzzle_key(&puzzle.id);
        self.puzzles
            .insert(key.as_bytes(), Self::serialize(puzzle)?)?;
        Ok(())
    }

    /// Persist a whole generated batch atomically.
    pub fn insert_puzzles(&self, puzzles: &[Puzzle]) -> Result<(), StoreError> {
        let mut batch = sled::Batch::default();
        for puzzle in puzzles {
            let key = keys::puzzle_key(&puzzle.id);
            batch.insert(key.as_bytes(), Self::serialize(puzzle)?);
        }
        self.puzzles.apply_batch(batch)?;
        Ok(())
    }

    pub fn get_puzzle(&self, puzzle_id: &str) -> Result<Option<Puzzle>, StoreError> {
        let key = keys::puzzle_key(puzzle_id);
        match self.puzzles.get(key.as_bytes())? {
            Some(raw) => Ok(Some(Self::deserialize(&raw)?)),
            None => Ok(None),
        }
    }

    pub fn update_puzzle(&self, puzzle: &Puzzle) -> Result<(), StoreError> {
        let key = keys::puzzle_key(&puzzle.id);
        if !self.puzzles.contains_key(key.as_bytes())? {
            return Err(StoreError::NotFound {
                entity: "puzzle".to_string(),
                key: puzzle.id.clone(),
            });
        }
        self.puzzles
            .insert(key.as_bytes(), Self::serialize(puzzle)?)?;
        Ok(())
    }

    /// All puzzles in any lifecycle state, oldest first.
    pub fn list_puzzles(&self) -> Result<Vec<Puzzle>, StoreError> {
        let mut puzzles = Vec::new();
        for item in self.puzzles.iter() {
            let (_, v) = item?;
            puzzles.push(Self::deserialize::<Puzzle>(&v)?);
        }
        puzzles.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(puzzles)
    }

    pub fn list_active_puzzles(&self) -> Result<Vec<Puzzle>, StoreError> {
        let mut puzzles = self.list_puzzles()?;
        puzzles.retain(|p| p.is_active);
        Ok(puzzles)
    }

    pub fn count_puzzles(&self) -> Result<usize, StoreError> {
        Ok(self.puzzles.len())
    }

    /// Remove a puzzle together with every attempt made on it. Returns the
    /// number of attempts removed.
    ///
    /// The puzzle goes first, in its own transaction. Attempt writes check
    /// for the puzzle inside their transactions, so once it is gone no new
    /// attempt or verdict can land and the sweep that follows sees every
    /// attempt left behind. Rerunning after an interrupted sweep finishes it.
    pub fn delete_puzzle_cascade(&self, puzzle_id: &str) -> Result<usize, StoreError> {
        let puzzle_key = keys::puzzle_key(puzzle_id);
        let existed = self.puzzles.remove(puzzle_key.as_bytes())?.is_some();
        let removed = self.sweep_attempts_of(puzzle_id)?;

        if !existed && removed == 0 {
            return Err(StoreError::NotFound {
                entity: "puzzle".to_string(),
                key: puzzle_id.to_string(),
            });
        }
        Ok(removed)
    }

    fn sweep_attempts_of(&self, puzzle_id: &str) -> Result<usize, StoreError> {
        let mut attempt_keys: Vec<Vec<u8>> = Vec::new();
        let mut index_keys: Vec<String> = Vec::new();
        let mut solved_keys: Vec<String> = Vec::new();
        for item in self.attempts.iter() {
            let (k, v) = item?;
            let attempt: PuzzleAttempt = Self::deserialize(&v)?;
            if attempt.puzzle_id != puzzle_id {
                continue;
            }
            attempt_keys.push(k.to_vec());
            index_keys.push(keys::attempt_id_index_key(&attempt.id));
            solved_keys.push(keys::solved_key(&attempt.user_id, puzzle_id));
        }
        if attempt_keys.is_empty() {
            return Ok(0);
        }

        (&self.attempts, &self.attempt_ids, &self.solved).transaction(
            |(tx_attempts, tx_ids, tx_solved)| {
                for k in &attempt_keys {
                    tx_attempts.remove(k.as_slice())?;
                }
                for k in &index_keys {
                    tx_ids.remove(k.as_bytes())?;
                }
                for k in &solved_keys {
                    tx_solved.remove(k.as_bytes())?;
                }
                Ok::<(), ConflictableTransactionError<StoreError>>(())
            },
        )?;

        tracing::debug!(puzzle_id, removed = attempt_keys.len(), "Swept attempts of deleted puzzle");
        Ok(attempt_keys.len())
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use tempfile::tempdir;

    use super::*;
    use crate::puzzles::types::Difficulty;

    fn sample_puzzle(id: &str, is_active: bool) -> Puzzle {
        Puzzle {
            id: id.to_string(),
            question: format!("Question {id}?"),
            answer: "answer".to_string(),
            difficulty: Difficulty::Medium,
            is_active,
            week_number: 3,
            year: 2026,
            auto_generated: false,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn active_listing_hides_inactive_puzzles() {
        let dir = tempdir().unwrap();
        let store = Store::open(dir.path().join("db").to_str().unwrap()).unwrap();

        store
            .insert_puzzles(&[sample_puzzle("p1", true), sample_puzzle("p2", false)])
            .unwrap();

        assert_eq!(store.list_puzzles().unwrap().len(), 2);
        let active = store.list_active_puzzles().unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].id, "p1");
    }

    #[test]
    fn update_of_unknown_puzzle_is_not_found() {
        let dir = tempdir().unwrap();
        let store = Store::open(dir.path().join("db").to_str().unwrap()).unwrap();

        let err = store.update_puzzle(&sample_puzzle("nope", true)).unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));
    }

    fn attempt_on(id: &str, puzzle_id: &str, is_correct: Option<bool>) -> PuzzleAttempt {
        PuzzleAttempt {
            id: id.to_string(),
            puzzle_id: puzzle_id.to_string(),
            user_id: "u1".to_string(),
            user_answer: "answer".to_string(),
            is_correct,
            submitted_at: Utc::now(),
            score: if is_correct == Some(true) { 10 } else { 0 },
            reviewed_at: None,
            reviewed_by: None,
        }
    }

    #[test]
    fn cascade_removes_attempts_and_markers() {
        let dir = tempdir().unwrap();
        let store = Store::open(dir.path().join("db").to_str().unwrap()).unwrap();
        store
            .insert_puzzles(&[sample_puzzle("p1", true), sample_puzzle("p2", true)])
            .unwrap();
        store.create_attempt(&attempt_on("a1", "p1", Some(true))).unwrap();
        store.create_attempt(&attempt_on("a2", "p1", None)).unwrap();
        store.create_attempt(&attempt_on("a3", "p2", None)).unwrap();

        assert_eq!(store.delete_puzzle_cascade("p1").unwrap(), 2);

        assert!(store.get_puzzle("p1").unwrap().is_none());
        assert!(store.get_attempt("a1").unwrap().is_none());
        assert!(!store.has_solved("u1", "p1").unwrap());
        assert_eq!(store.count_attempts().unwrap(), 1);

        let err = store.delete_puzzle_cascade("p1").unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));
    }

    #[test]
    fn attempts_cannot_land_on_a_deleted_puzzle() {
        let dir = tempdir().unwrap();
        let store = Store::open(dir.path().join("db").to_str().unwrap()).unwrap();
        store.insert_puzzle(&sample_puzzle("p1", true)).unwrap();
        store.delete_puzzle_cascade("p1").unwrap();

        let err = store
            .create_attempt(&attempt_on("late", "p1", Some(true)))
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));
        assert_eq!(store.count_attempts().unwrap(), 0);
        assert!(!store.has_solved("u1", "p1").unwrap());
    }

    #[test]
    fn rerun_finishes_an_interrupted_sweep() {
        let dir = tempdir().unwrap();
        let store = Store::open(dir.path().join("db").to_str().unwrap()).unwrap();
        store.insert_puzzle(&sample_puzzle("p1", true)).unwrap();
        store.create_attempt(&attempt_on("a1", "p1", Some(true))).unwrap();

        // Puzzle removed but its attempts left behind.
        store.puzzles.remove(keys::puzzle_key("p1").as_bytes()).unwrap();

        assert_eq!(store.delete_puzzle_cascade("p1").unwrap(), 1);
        assert_eq!(store.count_attempts().unwrap(), 0);
        assert!(!store.has_solved("u1", "p1").unwrap());
    }
}
