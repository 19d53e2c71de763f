use quiz_core::model::Question;
use storage::repository::QuestionSource;
use tracing::{debug, info};

use crate::error::LoadError;

/// Fetch and validate the full question bank. Called once at startup; no retry.
///
/// Failures are returned, not logged; the caller reports them.
///
/// # Errors
///
/// Returns `LoadError` if the source fails, any record is invalid, or the bank is empty.
pub async fn load_bank(source: &dyn QuestionSource) -> Result<Vec<Question>, LoadError> {
    let drafts = source.fetch_questions().await.map_err(|err| {
        debug!(error = %err, "question bank fetch failed");
        LoadError::Source(err)
    })?;

    let bank = drafts
        .into_iter()
        .enumerate()
        .map(|(index, draft)| {
            draft
                .validate()
                .map_err(|source| LoadError::Invalid { index, source })
        })
        .collect::<Result<Vec<_>, _>>()?;

    if bank.is_empty() {
        return Err(LoadError::EmptyBank);
    }

    info!(questions = bank.len(), "question bank loaded");
    Ok(bank)
}
