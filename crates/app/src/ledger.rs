//! Loads a JSON ledger (an array of transaction records) from disk.

use std::{fs::File, io::BufReader, path::Path};

use engine::TransactionInput;
use serde_json::Value;

use crate::error::Result;

/// Reads every row of the ledger at `path`.
///
/// The file must hold a JSON array. A row that does not have the shape of a
/// [`TransactionInput`] is logged and skipped; the others are returned.
pub fn read(path: impl AsRef<Path>) -> Result<Vec<TransactionInput>> {
    let path = path.as_ref();
    tracing::debug!(path = %path.display(), "reading ledger");
    let reader = BufReader::new(File::open(path)?);
    let rows: Vec<Value> = serde_json::from_reader(reader)?;

    let total = rows.len();
    let inputs: Vec<TransactionInput> = rows
        .into_iter()
        .enumerate()
        .filter_map(|(row, value)| match serde_json::from_value(value) {
            Ok(input) => Some(input),
            Err(err) => {
                tracing::warn!(row, "skipping malformed ledger row: {err}");
                None
            }
        })
        .collect();
    if inputs.len() < total {
        tracing::warn!(
            path = %path.display(),
            skipped = total - inputs.len(),
            "ledger rows could not be read"
        );
    }
    Ok(inputs)
}
