use chrono::Utc;

use crate::services::puzzle_set;
use crate::state::GenerationLock;
use crate::store::Store;

pub async fn run(store: &Store, lock: &GenerationLock, batch_size: usize, retire_previous: bool) {
    tracing::debug!("weekly_puzzles: start");
    let _guard = lock.lock().await;
    match puzzle_set::ensure_weekly_puzzles(store, batch_size, retire_previous, Utc::now()) {
        Ok(outcome) if outcome.skipped => tracing::debug!(
            week_number = outcome.period.week_number,
            year = outcome.period.year,
            "weekly_puzzles: batch already present"
        ),
        Ok(outcome) => tracing::info!(
            week_number = outcome.period.week_number,
            year = outcome.period.year,
            created = outcome.created.len(),
            retired = outcome.retired,
            "weekly_puzzles: done"
        ),
        Err(e) => tracing::error!(error = %e, "weekly_puzzles failed"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn repeated_runs_generate_a_single_batch() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let store = Store::open(tmp.path().join("weekly.sled").to_str().unwrap()).unwrap();

        let lock = GenerationLock::default();

        run(&store, &lock, 5, false).await;
        run(&store, &lock, 5, false).await;

        assert_eq!(store.count_puzzles().unwrap(), 5);
    }
}
