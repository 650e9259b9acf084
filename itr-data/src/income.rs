//! Reads income statements already normalized to [`NormalizedIncomeRecord`]
//! JSON.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

use itr_core::NormalizedIncomeRecord;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum IncomeRecordError {
    #[error("cannot read income file '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid income JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("income record has no assessment year")]
    MissingAssessmentYear,
}

pub fn parse_income_record<R: Read>(reader: R) -> Result<NormalizedIncomeRecord, IncomeRecordError> {
    let record: NormalizedIncomeRecord = serde_json::from_reader(reader)?;
    if record.assessment_year.trim().is_empty() {
        return Err(IncomeRecordError::MissingAssessmentYear);
    }
    Ok(record)
}

pub fn read_income_record(path: &Path) -> Result<NormalizedIncomeRecord, IncomeRecordError> {
    let file = File::open(path).map_err(|source| IncomeRecordError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let record = parse_income_record(BufReader::new(file))?;
    debug!(
        path = %path.display(),
        employments = record.employments.len(),
        "income record read"
    );
    Ok(record)
}
