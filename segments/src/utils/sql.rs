//! SQL utility functions

/// Check that a table name is a plain, optionally schema-qualified identifier
///
/// Table names come from configuration and are interpolated into queries,
/// so only `[A-Za-z_][A-Za-z0-9_]*` segments joined by a single `.` pass.
///
/// # Example
///
/// ```
/// use segments::utils::sql::is_valid_table_name;
///
/// assert!(is_valid_table_name("saastack_customer_v1.customer"));
/// assert!(!is_valid_table_name("customer; DROP TABLE customer"));
/// ```
pub fn is_valid_table_name(name: &str) -> bool {
    let parts: Vec<&str> = name.split('.').collect();
    if parts.len() > 2 {
        return false;
    }
    parts.iter().all(|part| {
        let mut chars = part.chars();
        match chars.next() {
            Some(c) if c.is_ascii_alphabetic() || c == '_' => {
                chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
            }
            _ => false,
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_name_plain() {
        assert!(is_valid_table_name("customer"));
        assert!(is_valid_table_name("_staging"));
    }

    #[test]
    fn test_table_name_schema_qualified() {
        assert!(is_valid_table_name("demo.segment_rule"));
    }

    #[test]
    fn test_table_name_rejects_injection() {
        assert!(!is_valid_table_name("customer; DROP TABLE customer"));
        assert!(!is_valid_table_name("customer--"));
        assert!(!is_valid_table_name("\"customer\""));
    }

    #[test]
    fn test_table_name_rejects_bad_shapes() {
        assert!(!is_valid_table_name(""));
        assert!(!is_valid_table_name("a.b.c"));
        assert!(!is_valid_table_name("demo."));
        assert!(!is_valid_table_name("1customer"));
    }
}
