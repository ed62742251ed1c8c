//! Per-row validation and normalization for decoded contact rows.
//!
//! Pure and side-effect-free: takes a decoded [`CsvRow`], returns either
//! the normalized contact data or an ordered list of user-facing
//! field-level error messages (Spanish, the product's single locale).

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::csv::{CsvRow, HEADER_APELLIDO, HEADER_EMAIL, HEADER_NOMBRE, HEADER_TELEFONO};

/// Standard address format check. Intentionally permissive: one `@`,
/// no whitespace, and a dotted domain.
static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid regex"));

/// A contact row that passed validation: trimmed, with blank optional
/// fields converted to `None`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedRow {
    pub nombre: String,
    pub apellido: String,
    pub email: Option<String>,
    pub telefono: Option<String>,
}

/// Validate and normalize one decoded row.
///
/// On failure returns every field-level error, in column order, so the
/// user sees the full picture for the row at once.
pub fn validate_row(row: &CsvRow) -> Result<NormalizedRow, Vec<String>> {
    let field = |h: &str| -> String {
        row.fields
            .get(h)
            .map(|v| v.trim().to_string())
            .unwrap_or_default()
    };

    let nombre = field(HEADER_NOMBRE);
    let apellido = field(HEADER_APELLIDO);
    let email = field(HEADER_EMAIL);
    let telefono = field(HEADER_TELEFONO);

    let mut errors = Vec::new();

    if nombre.is_empty() {
        errors.push("El nombre es obligatorio".to_string());
    }
    if apellido.is_empty() {
        errors.push("El apellido es obligatorio".to_string());
    }
    if !email.is_empty() && !is_valid_email(&email) {
        errors.push(format!("El email '{email}' no tiene un formato válido"));
    }

    if !errors.is_empty() {
        return Err(errors);
    }

    Ok(NormalizedRow {
        nombre,
        apellido,
        email: if email.is_empty() { None } else { Some(email) },
        telefono: if telefono.is_empty() {
            None
        } else {
            Some(telefono)
        },
    })
}

/// Check whether a non-empty string looks like an email address.
pub fn is_valid_email(value: &str) -> bool {
    EMAIL_RE.is_match(value)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn row(nombre: &str, apellido: &str, email: &str, telefono: &str) -> CsvRow {
        let mut fields = HashMap::new();
        fields.insert(HEADER_NOMBRE.to_string(), nombre.to_string());
        fields.insert(HEADER_APELLIDO.to_string(), apellido.to_string());
        fields.insert(HEADER_EMAIL.to_string(), email.to_string());
        fields.insert(HEADER_TELEFONO.to_string(), telefono.to_string());
        CsvRow {
            row_number: 1,
            fields,
        }
    }

    // -- happy path -----------------------------------------------------------

    #[test]
    fn full_row_normalizes() {
        let normalized = validate_row(&row("Juan", "Pérez", "juan@example.com", "600111222"))
            .unwrap();
        assert_eq!(normalized.nombre, "Juan");
        assert_eq!(normalized.email.as_deref(), Some("juan@example.com"));
        assert_eq!(normalized.telefono.as_deref(), Some("600111222"));
    }

    #[test]
    fn fields_are_trimmed() {
        let normalized = validate_row(&row("  Juan ", " Pérez", "", "  ")).unwrap();
        assert_eq!(normalized.nombre, "Juan");
        assert_eq!(normalized.apellido, "Pérez");
        assert_eq!(normalized.email, None);
        assert_eq!(normalized.telefono, None);
    }

    #[test]
    fn blank_optionals_become_none() {
        let normalized = validate_row(&row("Juan", "Pérez", "", "")).unwrap();
        assert_eq!(normalized.email, None);
        assert_eq!(normalized.telefono, None);
    }

    #[test]
    fn missing_optional_columns_are_tolerated() {
        let mut fields = HashMap::new();
        fields.insert(HEADER_NOMBRE.to_string(), "Juan".to_string());
        fields.insert(HEADER_APELLIDO.to_string(), "Pérez".to_string());
        let normalized = validate_row(&CsvRow {
            row_number: 1,
            fields,
        })
        .unwrap();
        assert_eq!(normalized.email, None);
    }

    // -- failures -------------------------------------------------------------

    #[test]
    fn empty_nombre_is_an_error() {
        let errors = validate_row(&row("", "Pérez", "", "")).unwrap_err();
        assert_eq!(errors, vec!["El nombre es obligatorio".to_string()]);
    }

    #[test]
    fn whitespace_only_apellido_is_an_error() {
        let errors = validate_row(&row("Juan", "   ", "", "")).unwrap_err();
        assert_eq!(errors, vec!["El apellido es obligatorio".to_string()]);
    }

    #[test]
    fn bad_email_is_an_error() {
        let errors = validate_row(&row("Juan", "Pérez", "not-an-email", "")).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("not-an-email"));
    }

    #[test]
    fn errors_accumulate_in_column_order() {
        let errors = validate_row(&row("", "", "bad@", "")).unwrap_err();
        assert_eq!(errors.len(), 3);
        assert!(errors[0].contains("nombre"));
        assert!(errors[1].contains("apellido"));
        assert!(errors[2].contains("email"));
    }

    // -- is_valid_email -------------------------------------------------------

    #[test]
    fn accepts_common_addresses() {
        for addr in ["a@b.com", "user.name+tag@sub.example.org", "ñandú@correo.es"] {
            assert!(is_valid_email(addr), "{addr} should be valid");
        }
    }

    #[test]
    fn rejects_malformed_addresses() {
        for addr in ["", "plain", "a@b", "a b@c.com", "a@@b.com", "a@b .com"] {
            assert!(!is_valid_email(addr), "{addr} should be invalid");
        }
    }
}
