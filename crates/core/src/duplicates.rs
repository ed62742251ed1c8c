//! Duplicate detection for contact import batches.
//!
//! Two pure passes, no database access:
//!
//! - *batch-scan*: group validated rows by normalized email (lowercased)
//!   and exact telefono; any group holding more than one row is a
//!   duplicate group.
//! - *store-scan merge*: fold matches found in the persistent store into
//!   the batch groups. A value that exists in the store is always
//!   reported, even when it appears only once in the batch.
//!
//! The store lookup itself lives in `agenda-db`; this module only merges
//! its results.

use std::collections::HashMap;

use serde::Serialize;

use crate::validation::NormalizedRow;

/// Row numbers (ascending) sharing one normalized email or telefono.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DuplicateGroup {
    /// The shared value: lowercased email or exact telefono string.
    pub key: String,
    /// 1-based CSV row numbers carrying the value, ascending.
    pub row_numbers: Vec<i64>,
}

/// Duplicate groups for a batch, split by field.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchDuplicates {
    pub emails: Vec<DuplicateGroup>,
    pub telefonos: Vec<DuplicateGroup>,
}

/// Group validated rows by email and telefono, reporting groups with
/// more than one member. Groups appear in first-occurrence order.
pub fn find_batch_duplicates(rows: &[(i64, NormalizedRow)]) -> BatchDuplicates {
    BatchDuplicates {
        emails: group_values(rows, |row| row.email.as_deref().map(|e| e.to_lowercase())),
        telefonos: group_values(rows, |row| row.telefono.clone()),
    }
}

/// Fold store matches into batch duplicate groups.
///
/// `existing_emails` must already be lowercased; `existing_telefonos`
/// are compared exactly. For a matched value with no batch-internal
/// group, a new group is created listing every batch row carrying it.
pub fn merge_store_matches(
    duplicates: &mut BatchDuplicates,
    rows: &[(i64, NormalizedRow)],
    existing_emails: &[String],
    existing_telefonos: &[String],
) {
    for email in existing_emails {
        if duplicates.emails.iter().any(|g| &g.key == email) {
            continue;
        }
        let row_numbers: Vec<i64> = rows
            .iter()
            .filter(|(_, row)| row.email.as_deref().map(str::to_lowercase).as_ref() == Some(email))
            .map(|(n, _)| *n)
            .collect();
        duplicates.emails.push(DuplicateGroup {
            key: email.clone(),
            row_numbers,
        });
    }

    for telefono in existing_telefonos {
        if duplicates.telefonos.iter().any(|g| &g.key == telefono) {
            continue;
        }
        let row_numbers: Vec<i64> = rows
            .iter()
            .filter(|(_, row)| row.telefono.as_deref() == Some(telefono))
            .map(|(n, _)| *n)
            .collect();
        duplicates.telefonos.push(DuplicateGroup {
            key: telefono.clone(),
            row_numbers,
        });
    }
}

/// Group rows by an extracted key, returning groups with >1 member in
/// first-occurrence order.
fn group_values<F>(rows: &[(i64, NormalizedRow)], extract: F) -> Vec<DuplicateGroup>
where
    F: Fn(&NormalizedRow) -> Option<String>,
{
    let mut members: HashMap<String, Vec<i64>> = HashMap::new();
    let mut order: Vec<String> = Vec::new();

    for (row_number, row) in rows {
        if let Some(key) = extract(row) {
            let entry = members.entry(key.clone()).or_default();
            if entry.is_empty() {
                order.push(key);
            }
            entry.push(*row_number);
        }
    }

    order
        .into_iter()
        .filter_map(|key| {
            let row_numbers = members.remove(&key)?;
            (row_numbers.len() > 1).then_some(DuplicateGroup { key, row_numbers })
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn row(email: Option<&str>, telefono: Option<&str>) -> NormalizedRow {
        NormalizedRow {
            nombre: "Juan".to_string(),
            apellido: "Pérez".to_string(),
            email: email.map(String::from),
            telefono: telefono.map(String::from),
        }
    }

    // -- find_batch_duplicates ------------------------------------------------

    #[test]
    fn no_duplicates_in_distinct_rows() {
        let rows = vec![
            (1, row(Some("a@x.com"), Some("600"))),
            (2, row(Some("b@x.com"), Some("601"))),
        ];
        let dups = find_batch_duplicates(&rows);
        assert!(dups.emails.is_empty());
        assert!(dups.telefonos.is_empty());
    }

    #[test]
    fn email_grouping_is_case_insensitive() {
        let rows = vec![
            (1, row(Some("Juan@X.com"), None)),
            (2, row(Some("juan@x.COM"), None)),
        ];
        let dups = find_batch_duplicates(&rows);
        assert_eq!(dups.emails.len(), 1);
        assert_eq!(dups.emails[0].key, "juan@x.com");
        assert_eq!(dups.emails[0].row_numbers, vec![1, 2]);
    }

    #[test]
    fn telefono_grouping_is_exact() {
        let rows = vec![
            (1, row(None, Some("600 111 222"))),
            (2, row(None, Some("600111222"))),
            (3, row(None, Some("600 111 222"))),
        ];
        let dups = find_batch_duplicates(&rows);
        assert_eq!(dups.telefonos.len(), 1);
        assert_eq!(dups.telefonos[0].row_numbers, vec![1, 3]);
    }

    #[test]
    fn rows_without_values_are_not_grouped() {
        let rows = vec![(1, row(None, None)), (2, row(None, None))];
        let dups = find_batch_duplicates(&rows);
        assert!(dups.emails.is_empty());
        assert!(dups.telefonos.is_empty());
    }

    #[test]
    fn row_numbers_are_ascending_within_groups() {
        let rows = vec![
            (3, row(Some("a@x.com"), None)),
            (7, row(Some("a@x.com"), None)),
            (9, row(Some("a@x.com"), None)),
        ];
        let dups = find_batch_duplicates(&rows);
        assert_eq!(dups.emails[0].row_numbers, vec![3, 7, 9]);
    }

    // -- merge_store_matches --------------------------------------------------

    #[test]
    fn store_match_creates_single_row_group() {
        let rows = vec![(1, row(Some("a@x.com"), None))];
        let mut dups = find_batch_duplicates(&rows);
        merge_store_matches(&mut dups, &rows, &["a@x.com".to_string()], &[]);
        assert_eq!(dups.emails.len(), 1);
        assert_eq!(dups.emails[0].row_numbers, vec![1]);
    }

    #[test]
    fn store_match_does_not_duplicate_existing_group() {
        let rows = vec![
            (1, row(Some("a@x.com"), None)),
            (2, row(Some("a@x.com"), None)),
        ];
        let mut dups = find_batch_duplicates(&rows);
        merge_store_matches(&mut dups, &rows, &["a@x.com".to_string()], &[]);
        assert_eq!(dups.emails.len(), 1);
        assert_eq!(dups.emails[0].row_numbers, vec![1, 2]);
    }

    #[test]
    fn store_telefono_match_is_merged() {
        let rows = vec![(4, row(None, Some("600111222")))];
        let mut dups = find_batch_duplicates(&rows);
        merge_store_matches(&mut dups, &rows, &[], &["600111222".to_string()]);
        assert_eq!(dups.telefonos.len(), 1);
        assert_eq!(dups.telefonos[0].key, "600111222");
        assert_eq!(dups.telefonos[0].row_numbers, vec![4]);
    }
}
