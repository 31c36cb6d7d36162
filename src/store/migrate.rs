use crate::puzzles::types::PuzzleAttempt;
use crate::store::keys;
use crate::store::{Store, StoreError};

const VERSION_KEY: &str = "_meta:version";

type MigrationFn = fn(&Store) -> Result<(), StoreError>;

fn migrations() -> Vec<(&'static str, MigrationFn)> {
    vec![
        ("001_initial", m001_initial),
        ("002_attempt_indexes", m002_attempt_indexes),
    ]
}

pub fn latest_version() -> u32 {
    migrations().len() as u32
}

/// Apply every migration newer than the stored version.
///
/// Each migration must be idempotent: a crash between the migration body and
/// `set_version` reruns it on the next start. Versions only move forward.
pub fn run(store: &Store) -> Result<(), StoreError> {
    let current = get_current_version(store)?;
    let all = migrations();

    for (index, (name, func)) in all.iter().enumerate() {
        let version = (index + 1) as u32;
        if version > current {
            tracing::info!(version, name, "Running migration");
            func(store)?;
            set_version(store, version)?;
            tracing::info!(version, name, "Migration complete");
        } else {
            tracing::debug!(version, name, "Migration already applied, skipping");
        }
    }

    Ok(())
}

pub fn get_current_version(store: &Store) -> Result<u32, StoreError> {
    match store.config_versions.get(VERSION_KEY.as_bytes())? {
        Some(raw) => {
            let bytes: [u8; 4] = raw.as_ref().try_into().map_err(|_| StoreError::Migration {
                version: 0,
                message: format!("Malformed version marker ({} bytes)", raw.len()),
            })?;
            Ok(u32::from_be_bytes(bytes))
        }
        None => Ok(0),
    }
}

pub fn set_version(store: &Store, version: u32) -> Result<(), StoreError> {
    let current = get_current_version(store)?;
    if version < current {
        return Err(StoreError::Migration {
            version,
            message: format!("Refuse to downgrade from {} to {}", current, version),
        });
    }

    store
        .config_versions
        .insert(VERSION_KEY.as_bytes(), &version.to_be_bytes())?;
    Ok(())
}

fn m001_initial(_store: &Store) -> Result<(), StoreError> {
    Ok(())
}

/// Rebuild the attempt id index and the solved markers from the attempt log.
fn m002_attempt_indexes(store: &Store) -> Result<(), StoreError> {
    let mut indexed = 0usize;
    for item in store.attempts.iter() {
        let (primary_key, value) = item?;
        let attempt: PuzzleAttempt = Store::deserialize(&value)?;

        let index_key = keys::attempt_id_index_key(&attempt.id);
        store
            .attempt_ids
            .insert(index_key.as_bytes(), primary_key.clone())?;

        if attempt.is_correct == Some(true) {
            let solved_key = keys::solved_key(&attempt.user_id, &attempt.puzzle_id);
            // Keep whichever correct attempt claimed the marker first.
            let _ = store.solved.compare_and_swap(
                solved_key.as_bytes(),
                None::<&[u8]>,
                Some(attempt.id.as_bytes()),
            )?;
        }
        indexed += 1;
    }

    tracing::info!(indexed, "Attempt indexes rebuilt");
    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use tempfile::tempdir;

    use super::*;
    use crate::puzzles::types::{Difficulty, Puzzle};

    #[test]
    fn migration_is_idempotent() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("db");
        let store = Store::open(path.to_str().unwrap()).unwrap();

        run(&store).unwrap();
        let first = get_current_version(&store).unwrap();
        run(&store).unwrap();
        let second = get_current_version(&store).unwrap();

        assert_eq!(first, latest_version());
        assert_eq!(second, latest_version());
    }

    #[test]
    fn downgrade_is_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("db2");
        let store = Store::open(path.to_str().unwrap()).unwrap();

        set_version(&store, 3).unwrap();
        let err = set_version(&store, 2).unwrap_err();
        assert!(matches!(err, StoreError::Migration { .. }));
    }

    #[test]
    fn index_rebuild_restores_lookups() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("db3");
        let store = Store::open(path.to_str().unwrap()).unwrap();
        store
            .insert_puzzle(&Puzzle {
                id: "p1".to_string(),
                question: "Which folds but never tears?".to_string(),
                answer: "map".to_string(),
                difficulty: Difficulty::Medium,
                is_active: true,
                week_number: 1,
                year: 2026,
                auto_generated: false,
                created_at: Utc::now(),
            })
            .unwrap();

        let attempt = PuzzleAttempt {
            id: "a1".to_string(),
            puzzle_id: "p1".to_string(),
            user_id: "u1".to_string(),
            user_answer: "map".to_string(),
            is_correct: Some(true),
            submitted_at: Utc::now(),
            score: 10,
            reviewed_at: None,
            reviewed_by: None,
        };
        store.create_attempt(&attempt).unwrap();
        store.attempt_ids.clear().unwrap();
        store.solved.clear().unwrap();
        assert!(store.get_attempt("a1").unwrap().is_none());

        m002_attempt_indexes(&store).unwrap();
        m002_attempt_indexes(&store).unwrap();

        assert_eq!(store.get_attempt("a1").unwrap().unwrap().id, "a1");
        assert!(store.has_solved("u1", "p1").unwrap());
    }
}
