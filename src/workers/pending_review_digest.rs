use chrono::Utc;

use crate::store::Store;

/// Log how many attempts are waiting for an administrator and how long the
/// oldest has waited.
pub async fn run(store: &Store) {
    tracing::debug!("pending_review_digest: start");
    let pending = match store.list_pending_attempts() {
        Ok(pending) => pending,
        Err(e) => {
            tracing::error!(error = %e, "pending_review_digest failed");
            return;
        }
    };

    let Some(oldest) = pending.first() else {
        tracing::info!(pending = 0, "pending_review_digest: nothing to review");
        return;
    };
    let oldest_age_hours = (Utc::now() - oldest.submitted_at).num_hours();
    tracing::info!(
        pending = pending.len(),
        oldest_age_hours,
        oldest_attempt_id = %oldest.id,
        "pending_review_digest: attempts awaiting review"
    );
}
