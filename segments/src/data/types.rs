//! Row types shared across repositories

use serde::Serialize;

/// A persisted segment rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SegmentRuleRow {
    pub id: String,
    pub name: String,
    /// Raw JSON rule document
    pub rule: String,
}

/// A customer matched by a segment rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CustomerRow {
    pub id: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone_number: Option<String>,
}

impl CustomerRow {
    /// Full name from the non-empty name parts
    pub fn display_name(&self) -> String {
        [self.first_name.as_deref(), self.last_name.as_deref()]
            .into_iter()
            .flatten()
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }
}
