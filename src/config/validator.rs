//! Config validation: identifier syntax and duplicate resources.

use crate::config::NamespaceConfig;
use crate::error::ConfigError;
use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;

static IDENTIFIER_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("IDENTIFIER_REGEX: invalid regex pattern"));

/// True when `s` is a plain SQL identifier (letters, digits, underscore; not starting with a digit).
pub fn is_identifier(s: &str) -> bool {
    IDENTIFIER_REGEX.is_match(s)
}

/// Check an identifier, naming what it is in the error.
pub fn check_identifier(kind: &'static str, value: &str) -> Result<(), ConfigError> {
    if is_identifier(value) {
        Ok(())
    } else {
        Err(ConfigError::InvalidIdentifier {
            kind,
            value: value.to_string(),
        })
    }
}

pub fn validate(config: &NamespaceConfig) -> Result<(), ConfigError> {
    if let Some(schema) = &config.schema {
        check_identifier("schema", schema)?;
    }

    let mut names = HashSet::new();
    for r in &config.resources {
        check_identifier("resource", &r.name)?;
        if !names.insert(r.name.as_str()) {
            return Err(ConfigError::DuplicateResource(r.name.clone()));
        }
        if let Some(schema) = &r.schema {
            check_identifier("schema", schema)?;
        }
        if let Some(pk) = &r.primary_key {
            let columns = pk.columns();
            if columns.is_empty() {
                return Err(ConfigError::Validation(format!(
                    "resource {}: primary_key must name at least one column",
                    r.name
                )));
            }
            for c in &columns {
                check_identifier("column", c)?;
            }
        }
    }

    Ok(())
}
