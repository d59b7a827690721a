//! Parsed `INFO` output.

use std::collections::HashMap;

use crate::ClientError;

/// Key/value fields from one or more `INFO` sections.
///
/// `INFO` replies are `key:value` lines; `# Section` headers and blank
/// lines are skipped. Values are kept as text and converted on access.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InfoSection {
    fields: HashMap<String, String>,
}

impl InfoSection {
    /// Parses the text body of an `INFO` reply.
    pub fn parse(text: &str) -> Self {
        let fields = text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .filter_map(|line| line.split_once(':'))
            .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
            .collect();
        Self { fields }
    }

    /// Returns the raw value of `key`, if present.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(String::as_str)
    }

    /// Returns `key` parsed as a signed integer.
    pub fn get_i64(&self, key: &str) -> Result<i64, ClientError> {
        let value = self
            .get(key)
            .ok_or_else(|| ClientError::MissingField(key.to_string()))?;
        value.parse().map_err(|_| ClientError::InvalidInteger {
            field: key.to_string(),
            value: value.to_string(),
        })
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for InfoSection {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            fields: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}
