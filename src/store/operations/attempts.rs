use sled::transaction::ConflictableTransactionError;
use sled::Transactional;

use crate::puzzles::types::PuzzleAttempt;
use crate::store::keys;
use crate::store::{Store, StoreError};

fn already_solved(attempt: &PuzzleAttempt) -> StoreError {
    StoreError::Conflict {
        entity: "solved".to_string(),
        key: keys::solved_key(&attempt.user_id, &attempt.puzzle_id),
    }
}

fn not_found(entity: &str, key: &str) -> ConflictableTransactionError<StoreError> {
    ConflictableTransactionError::Abort(StoreError::NotFound {
        entity: entity.to_string(),
        key: key.to_string(),
    })
}

impl Store {
    /// Persist a new attempt. The puzzle must still exist when the
    /// transaction commits. A correct attempt also claims the solved marker
    /// for its (user, puzzle) pair and fails with `Conflict` if the marker is
    /// already held, leaving nothing written.
    pub fn create_attempt(&self, attempt: &PuzzleAttempt) -> Result<(), StoreError> {
        let puzzle_key = keys::puzzle_key(&attempt.puzzle_id);
        let primary_key = keys::attempt_key(attempt.submitted_at.timestamp_millis(), &attempt.id);
        let index_key = keys::attempt_id_index_key(&attempt.id);
        let solved_key = keys::solved_key(&attempt.user_id, &attempt.puzzle_id);
        let claims_solved = attempt.is_correct == Some(true);
        let bytes = Self::serialize(attempt)?;

        (&self.puzzles, &self.attempts, &self.attempt_ids, &self.solved).transaction(
            |(tx_puzzles, tx_attempts, tx_ids, tx_solved)| {
                if tx_puzzles.get(puzzle_key.as_bytes())?.is_none() {
                    return Err(not_found("puzzle", &attempt.puzzle_id));
                }
                if claims_solved {
                    if tx_solved.get(solved_key.as_bytes())?.is_some() {
                        return Err(ConflictableTransactionError::Abort(already_solved(attempt)));
                    }
                    tx_solved.insert(solved_key.as_bytes(), attempt.id.as_bytes())?;
                }
                tx_attempts.insert(primary_key.as_bytes(), bytes.as_slice())?;
                tx_ids.insert(index_key.as_bytes(), primary_key.as_bytes())?;
                Ok(())
            },
        )?;
        Ok(())
    }

    /// Persist the verdict on a pending attempt. The stored attempt is
    /// re-read inside the transaction: a verdict already recorded fails with
    /// `AlreadyReviewed`, and a puzzle or attempt removed in the meantime
    /// fails with `NotFound`. Approving claims the solved marker the same way
    /// `create_attempt` does.
    pub fn save_reviewed_attempt(&self, attempt: &PuzzleAttempt) -> Result<(), StoreError> {
        let puzzle_key = keys::puzzle_key(&attempt.puzzle_id);
        let index_key = keys::attempt_id_index_key(&attempt.id);
        let solved_key = keys::solved_key(&attempt.user_id, &attempt.puzzle_id);
        let claims_solved = attempt.is_correct == Some(true);
        let bytes = Self::serialize(attempt)?;

        (&self.puzzles, &self.attempts, &self.attempt_ids, &self.solved).transaction(
            |(tx_puzzles, tx_attempts, tx_ids, tx_solved)| {
                if tx_puzzles.get(puzzle_key.as_bytes())?.is_none() {
                    return Err(not_found("puzzle", &attempt.puzzle_id));
                }
                let Some(primary_key) = tx_ids.get(index_key.as_bytes())? else {
                    return Err(not_found("attempt", &attempt.id));
                };
                let Some(raw) = tx_attempts.get(&primary_key)? else {
                    return Err(not_found("attempt", &attempt.id));
                };
                let stored: PuzzleAttempt =
                    Self::deserialize(&raw).map_err(ConflictableTransactionError::Abort)?;
                if !stored.is_pending() {
                    return Err(ConflictableTransactionError::Abort(StoreError::AlreadyReviewed(
                        attempt.id.clone(),
                    )));
                }

                if claims_solved {
                    if tx_solved.get(solved_key.as_bytes())?.is_some() {
                        return Err(ConflictableTransactionError::Abort(already_solved(attempt)));
                    }
                    tx_solved.insert(solved_key.as_bytes(), attempt.id.as_bytes())?;
                }
                tx_attempts.insert(primary_key, bytes.as_slice())?;
                Ok(())
            },
        )?;
        Ok(())
    }

    pub fn get_attempt(&self, attempt_id: &str) -> Result<Option<PuzzleAttempt>, StoreError> {
        let index_key = keys::attempt_id_index_key(attempt_id);
        let Some(primary_key) = self.attempt_ids.get(index_key.as_bytes())? else {
            return Ok(None);
        };
        match self.attempts.get(primary_key)? {
            Some(raw) => Ok(Some(Self::deserialize(&raw)?)),
            None => {
                tracing::warn!(attempt_id, "Attempt id index points at a missing attempt");
                Ok(None)
            }
        }
    }

    pub fn has_solved(&self, user_id: &str, puzzle_id: &str) -> Result<bool, StoreError> {
        let key = keys::solved_key(user_id, puzzle_id);
        Ok(self.solved.contains_key(key.as_bytes())?)
    }

    /// Every attempt, oldest submission first.
    pub fn list_attempts(&self) -> Result<Vec<PuzzleAttempt>, StoreError> {
        let mut attempts = Vec::new();
        for item in self.attempts.iter() {
            let (_, v) = item?;
            attempts.push(Self::deserialize::<PuzzleAttempt>(&v)?);
        }
        Ok(attempts)
    }

    /// A user's attempts, newest first.
    pub fn list_user_attempts(&self, user_id: &str) -> Result<Vec<PuzzleAttempt>, StoreError> {
        let mut attempts = Vec::new();
        for item in self.attempts.iter().rev() {
            let (_, v) = item?;
            let attempt: PuzzleAttempt = Self::deserialize(&v)?;
            if attempt.user_id == user_id {
                attempts.push(attempt);
            }
        }
        Ok(attempts)
    }

    /// Attempts awaiting an administrator's judgment, oldest first.
    pub fn list_pending_attempts(&self) -> Result<Vec<PuzzleAttempt>, StoreError> {
        let mut attempts = self.list_attempts()?;
        attempts.retain(PuzzleAttempt::is_pending);
        Ok(attempts)
    }

    pub fn count_attempts(&self) -> Result<usize, StoreError> {
        Ok(self.attempts.len())
    }
}
