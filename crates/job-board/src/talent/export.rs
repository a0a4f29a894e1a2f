//! CSV rendering of the unlock log.

use serde::Serialize;

use super::domain::UnlockRecord;

#[derive(Serialize)]
struct UnlockRow<'a> {
    unlocked_at: String,
    employer: &'a str,
    candidate: &'a str,
    credits_used: u64,
}

pub fn unlock_log_csv(records: &[UnlockRecord]) -> Result<String, ExportError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    for record in records {
        writer.serialize(UnlockRow {
            unlocked_at: record.unlocked_at.to_rfc3339(),
            employer: record.employer.as_str(),
            candidate: record.candidate.as_str(),
            credits_used: record.credits_used,
        })?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|err| ExportError::Flush(err.to_string()))?;
    String::from_utf8(bytes).map_err(|err| ExportError::Flush(err.to_string()))
}

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("failed to encode unlock log: {0}")]
    Encode(#[from] csv::Error),
    #[error("failed to flush unlock log: {0}")]
    Flush(String),
}
