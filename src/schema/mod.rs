//! Static validation configuration: the expected header layout and the per-field rule chains.
//!
//! - [`HeaderMapping`]: ordered `label → {field, column}` entries. Its labels, in order, are the
//!   expected header row; it also drives the row-to-record projection.
//! - [`Schema`]: ordered [`RuleChain`]s, one per field.
//!
//! Both can be authored in code or loaded from JSON via [`definition::SchemaDefinition`].

pub mod definition;

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::address::check_column;
use crate::error::{ConfigError, ConfigResult};
use crate::rules::RuleChain;

pub use definition::{FieldDefinition, RuleDefinition, RuleName, SchemaDefinition};

/// One expected header and the field it feeds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeaderEntry {
    /// Exact header text expected in the spreadsheet.
    pub label: String,
    /// Record field name the column is projected into.
    pub field: String,
    /// 1-based column the header is expected in.
    pub column: usize,
}

impl HeaderEntry {
    pub fn new(label: impl Into<String>, field: impl Into<String>, column: usize) -> Self {
        Self {
            label: label.into(),
            field: field.into(),
            column,
        }
    }
}

/// Ordered header configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderMapping {
    entries: Vec<HeaderEntry>,
}

impl HeaderMapping {
    /// Create a mapping; labels must be unique and columns addressable.
    pub fn new(entries: Vec<HeaderEntry>) -> ConfigResult<Self> {
        let mut labels = HashSet::new();
        for entry in &entries {
            if !labels.insert(entry.label.as_str()) {
                return Err(ConfigError::DuplicateHeader {
                    label: entry.label.clone(),
                });
            }
            if entry.column == 0 {
                return Err(ConfigError::InvalidColumn {
                    field: entry.field.clone(),
                });
            }
            check_column(entry.column)?;
        }
        Ok(Self { entries })
    }

    pub fn entries(&self) -> &[HeaderEntry] {
        &self.entries
    }

    /// Expected header labels, in order.
    pub fn expected_headers(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.label.as_str()).collect()
    }

    /// Field name for a header label, if the label is mapped.
    pub fn field_for(&self, label: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|e| e.label == label)
            .map(|e| e.field.as_str())
    }

    /// `true` if some header projects into `field`.
    pub fn produces_field(&self, field: &str) -> bool {
        self.entries.iter().any(|e| e.field == field)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Field name → rule chain, in declared order.
#[derive(Debug, Clone, Default)]
pub struct Schema {
    chains: Vec<RuleChain>,
}

impl Schema {
    /// Create a schema; field names must be unique.
    pub fn new(chains: Vec<RuleChain>) -> ConfigResult<Self> {
        let mut seen = HashSet::new();
        for chain in &chains {
            if !seen.insert(chain.field()) {
                return Err(ConfigError::DuplicateField {
                    field: chain.field().to_string(),
                });
            }
        }
        Ok(Self { chains })
    }

    /// Chains in declared order.
    pub fn chains(&self) -> &[RuleChain] {
        &self.chains
    }

    /// Chain bound to `field`, if any.
    pub fn chain(&self, field: &str) -> Option<&RuleChain> {
        self.chains.iter().find(|c| c.field() == field)
    }

    /// Iterate field names in order.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.chains.iter().map(|c| c.field())
    }

    pub fn len(&self) -> usize {
        self.chains.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chains.is_empty()
    }

    /// Reject fields the header mapping can never populate.
    pub fn check_against(&self, mapping: &HeaderMapping) -> ConfigResult<()> {
        match self.field_names().find(|f| !mapping.produces_field(f)) {
            Some(field) => Err(ConfigError::UnknownField {
                field: field.to_string(),
            }),
            None => Ok(()),
        }
    }
}
