//! Key/value node parameters.
//!
//! The host passes every setting as a string pair. Lookups fall back to a
//! caller-supplied default when the key is absent; a present but unparsable
//! value is a configuration error.

use crate::error::{NodeError, Result};

/// One host-supplied parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeParam<'a> {
    pub key: &'a str,
    pub value: &'a str,
}

impl<'a> NodeParam<'a> {
    pub fn new(key: &'a str, value: &'a str) -> Self {
        Self { key, value }
    }
}

/// Read-only view over the parameter list of one call.
#[derive(Debug, Clone, Copy)]
pub struct NodeParams<'a> {
    params: &'a [NodeParam<'a>],
}

impl<'a> NodeParams<'a> {
    pub fn new(params: &'a [NodeParam<'a>]) -> Self {
        Self { params }
    }

    /// Raw value for `key`; the first occurrence wins.
    pub fn get(&self, key: &str) -> Option<&'a str> {
        self.params
            .iter()
            .find(|p| p.key == key)
            .map(|p| p.value)
    }

    pub fn get_string_parameter(&self, key: &str, default: &'a str) -> &'a str {
        self.get(key).unwrap_or(default)
    }

    pub fn get_int_parameter(&self, key: &str, default: i64) -> Result<i64> {
        match self.get(key) {
            None => Ok(default),
            Some(raw) => raw.trim().parse().map_err(|_| {
                NodeError::Config(format!("{} must be an integer (got '{}')", key, raw))
            }),
        }
    }

    pub fn get_bool_parameter(&self, key: &str, default: bool) -> Result<bool> {
        match self.get(key).map(|v| v.trim().to_ascii_lowercase()) {
            None => Ok(default),
            Some(v) => match v.as_str() {
                "true" | "1" | "yes" | "on" => Ok(true),
                "false" | "0" | "no" | "off" => Ok(false),
                _ => Err(NodeError::Config(format!(
                    "{} must be a boolean (got '{}')",
                    key, v
                ))),
            },
        }
    }

    /// Required strictly positive integer, as used for length bounds.
    pub fn get_positive_parameter(&self, key: &str) -> Result<usize> {
        let value = self.get_int_parameter(key, -1)?;
        if value <= 0 {
            return Err(NodeError::Config(format!(
                "{} param must be larger than 0",
                key
            )));
        }
        usize::try_from(value)
            .map_err(|_| NodeError::Config(format!("{} param is too large ({})", key, value)))
    }

    /// Required non-empty string.
    pub fn get_required_string(&self, key: &str) -> Result<&'a str> {
        let value = self.get_string_parameter(key, "");
        if value.is_empty() {
            return Err(NodeError::Config(format!("{} cannot be empty", key)));
        }
        Ok(value)
    }
}
