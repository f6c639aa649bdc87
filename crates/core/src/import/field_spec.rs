//! Declarative field contracts for one importable entity.

use serde::Serialize;

use super::cell::normalize_header;

/// How a raw cell is coerced into a typed field value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "values", rename_all = "lowercase")]
pub enum FieldKind {
    /// Trimmed text, no further coercion.
    String,
    /// Finite number.
    Number,
    /// Calendar date.
    Date,
    /// One of a closed set of values, matched case-insensitively.
    Enum(Vec<String>),
}

/// One target field: which headers feed it, whether it is required and how
/// its value is coerced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldSpec {
    /// Key in the validated record.
    pub target_key: String,
    /// Human-facing name used in error messages and templates.
    pub label: String,
    /// Additional header names accepted for this field, in priority order.
    pub aliases: Vec<String>,
    pub required: bool,
    #[serde(flatten)]
    pub kind: FieldKind,
}

impl FieldSpec {
    fn new(target_key: &str, label: &str, kind: FieldKind) -> Self {
        Self {
            target_key: target_key.to_string(),
            label: label.to_string(),
            aliases: Vec::new(),
            required: false,
            kind,
        }
    }

    pub fn string(target_key: &str, label: &str) -> Self {
        Self::new(target_key, label, FieldKind::String)
    }

    pub fn number(target_key: &str, label: &str) -> Self {
        Self::new(target_key, label, FieldKind::Number)
    }

    pub fn date(target_key: &str, label: &str) -> Self {
        Self::new(target_key, label, FieldKind::Date)
    }

    pub fn enumeration(target_key: &str, label: &str, values: &[&str]) -> Self {
        Self::new(
            target_key,
            label,
            FieldKind::Enum(values.iter().map(|v| v.to_string()).collect()),
        )
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn aliases(mut self, aliases: &[&str]) -> Self {
        self.aliases.extend(aliases.iter().map(|a| a.to_string()));
        self
    }

    /// Header candidates in resolution order: the target key, then each
    /// alias as declared. Normalised and de-duplicated.
    pub fn header_candidates(&self) -> Vec<String> {
        let mut candidates: Vec<String> = Vec::with_capacity(self.aliases.len() + 1);
        for name in std::iter::once(&self.target_key).chain(&self.aliases) {
            let normalized = normalize_header(name);
            if !normalized.is_empty() && !candidates.contains(&normalized) {
                candidates.push(normalized);
            }
        }
        candidates
    }

    /// Index of the column that feeds this field, if any.
    ///
    /// Candidates are tried in declaration order; for each, the first column
    /// whose normalised header matches wins. Column order therefore only
    /// matters between duplicate headers.
    pub fn resolve_column(&self, headers: &[String]) -> Option<usize> {
        let normalized: Vec<String> = headers.iter().map(|h| normalize_header(h)).collect();
        self.resolve_normalized(&normalized)
    }

    pub(crate) fn resolve_normalized(&self, normalized_headers: &[String]) -> Option<usize> {
        self.header_candidates()
            .iter()
            .find_map(|candidate| normalized_headers.iter().position(|h| h == candidate))
    }
}
