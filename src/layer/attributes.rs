use std::collections::BTreeMap;

use serde::Serialize;
use shapefile::dbase::FieldValue;

/// A single attribute value from a vector layer's table.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum AttrValue {
    Null,
    Text(String),
    Number(f64),
    Bool(bool),
}

/// One attribute row, keyed by field name.
pub type Attributes = BTreeMap<String, AttrValue>;

impl AttrValue {
    pub(crate) fn from_field(value: FieldValue) -> Self {
        match value {
            FieldValue::Character(Some(s)) | FieldValue::Memo(s) => {
                let s = s.trim();
                if s.is_empty() { Self::Null } else { Self::Text(s.to_string()) }
            }
            FieldValue::Numeric(Some(n)) | FieldValue::Double(n) | FieldValue::Currency(n) => Self::Number(n),
            FieldValue::Float(Some(f)) => Self::Number(f as f64),
            FieldValue::Integer(i) => Self::Number(i as f64),
            FieldValue::Logical(Some(b)) => Self::Bool(b),
            _ => Self::Null,
        }
    }

    /// Text form of a text or integral numeric value.
    pub fn as_text(&self) -> Option<String> {
        match self {
            Self::Text(s) => Some(s.clone()),
            Self::Number(n) if n.fract() == 0.0 => Some(format!("{n:.0}")),
            Self::Number(n) => Some(n.to_string()),
            Self::Bool(_) | Self::Null => None,
        }
    }
}

/// Name of the first column in `columns` matching a candidate (case-insensitive).
pub(crate) fn find_column<'a>(columns: impl IntoIterator<Item = &'a String> + Clone, candidates: &[String]) -> Option<&'a String> {
    candidates.iter()
        .find_map(|candidate| columns.clone().into_iter().find(|col| col.eq_ignore_ascii_case(candidate)))
}
