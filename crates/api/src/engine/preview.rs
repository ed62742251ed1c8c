//! Read-only import preview: decode, validate, and flag duplicates
//! without touching the store.

use agenda_core::csv::{self, raw_values};
use agenda_core::duplicates::{self, BatchDuplicates, DuplicateGroup};
use agenda_core::validation::{self, NormalizedRow};
use agenda_db::repositories::ContactRepo;
use agenda_db::DbPool;
use serde::Serialize;

use crate::error::AppResult;

/// A row that passed validation, with its normalized data.
#[derive(Debug, Serialize)]
pub struct PreviewValidRow {
    pub row_number: i64,
    pub data: NormalizedRow,
}

/// A row that failed validation, with its errors and original values.
#[derive(Debug, Serialize)]
pub struct PreviewInvalidRow {
    pub row_number: i64,
    pub errors: Vec<String>,
    pub data: serde_json::Value,
}

/// The full preview report. Duplicate flags are advisory: flagged rows
/// remain in `valid_rows`.
#[derive(Debug, Serialize)]
pub struct ImportPreview {
    pub total_rows: usize,
    pub valid_rows: Vec<PreviewValidRow>,
    pub invalid_rows: Vec<PreviewInvalidRow>,
    pub duplicate_emails: Vec<DuplicateGroup>,
    pub duplicate_telefonos: Vec<DuplicateGroup>,
}

/// Run the preview pipeline: decode → validate every row → batch-scan
/// duplicates on the valid subset → one store lookup, merged in.
pub async fn preview_import(pool: &DbPool, content: &str) -> AppResult<ImportPreview> {
    let rows = csv::parse_csv(content)?;
    let total_rows = rows.len();

    let mut valid: Vec<(i64, NormalizedRow)> = Vec::new();
    let mut invalid_rows = Vec::new();

    for row in &rows {
        match validation::validate_row(row) {
            Ok(normalized) => valid.push((row.row_number, normalized)),
            Err(errors) => invalid_rows.push(PreviewInvalidRow {
                row_number: row.row_number,
                errors,
                data: raw_values(row),
            }),
        }
    }

    let mut dups = duplicates::find_batch_duplicates(&valid);
    merge_store_scan(pool, &mut dups, &valid).await?;

    Ok(ImportPreview {
        total_rows,
        valid_rows: valid
            .into_iter()
            .map(|(row_number, data)| PreviewValidRow { row_number, data })
            .collect(),
        invalid_rows,
        duplicate_emails: dups.emails,
        duplicate_telefonos: dups.telefonos,
    })
}

/// Look up the batch's distinct emails/telefonos in the store and merge
/// any matches into the duplicate groups.
async fn merge_store_scan(
    pool: &DbPool,
    dups: &mut BatchDuplicates,
    valid: &[(i64, NormalizedRow)],
) -> AppResult<()> {
    let mut emails: Vec<String> = valid
        .iter()
        .filter_map(|(_, row)| row.email.as_deref().map(str::to_lowercase))
        .collect();
    emails.sort();
    emails.dedup();

    let mut telefonos: Vec<String> = valid
        .iter()
        .filter_map(|(_, row)| row.telefono.clone())
        .collect();
    telefonos.sort();
    telefonos.dedup();

    if emails.is_empty() && telefonos.is_empty() {
        return Ok(());
    }

    let matches = ContactRepo::find_matching(pool, &emails, &telefonos).await?;

    // A matched contact may carry an email outside the batch (matched
    // on telefono alone, or vice versa); only batch values are merged.
    let matched_emails: Vec<String> = matches
        .iter()
        .filter_map(|c| c.email.as_deref().map(str::to_lowercase))
        .filter(|e| emails.contains(e))
        .collect();
    let matched_telefonos: Vec<String> = matches
        .iter()
        .filter_map(|c| c.telefono.clone())
        .filter(|t| telefonos.contains(t))
        .collect();

    duplicates::merge_store_matches(dups, valid, &matched_emails, &matched_telefonos);
    Ok(())
}
