//! Resolver configuration.
//!
//! Loads from YAML with every field defaulted, so a missing file section
//! behaves identically to no file at all. Connection parameters may also
//! arrive via CLI flag or `DATABASE_URL`; precedence is handled in `main`.

use serde::Deserialize;

use crate::error::{ResolveError, Result};

/// Root configuration for an audit-resolver run.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    /// Field separator in the obfuscated audit log.
    pub field_delimiter: char,
    /// Delimiter joining the multi-column user lookup result into one
    /// display string. The two historical exports disagreed (`,` vs `|`);
    /// comma is the default, pipe stays available per deployment.
    pub join_delimiter: String,
    /// Optional connection string. Lowest precedence after the CLI flag
    /// and the `DATABASE_URL` environment variable.
    pub database_url: Option<String>,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            field_delimiter: '|',
            join_delimiter: ",".to_string(),
            database_url: None,
        }
    }
}

impl ResolverConfig {
    /// Load configuration from a YAML file.
    pub fn from_file(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Load configuration from a YAML string.
    pub fn from_yaml(content: &str) -> Result<Self> {
        serde_yaml::from_str(content).map_err(|e| ResolveError::Config(e.to_string()))
    }

    /// The field delimiter as a single byte, as the csv reader wants it.
    pub fn delimiter_byte(&self) -> Result<u8> {
        u8::try_from(self.field_delimiter as u32).map_err(|_| {
            ResolveError::Config(format!(
                "field_delimiter {:?} is not a single-byte character",
                self.field_delimiter
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_pipe_and_comma() {
        let config = ResolverConfig::default();
        assert_eq!(config.field_delimiter, '|');
        assert_eq!(config.join_delimiter, ",");
        assert!(config.database_url.is_none());
        assert_eq!(config.delimiter_byte().unwrap(), b'|');
    }

    #[test]
    fn partial_yaml_keeps_defaults() {
        let config = ResolverConfig::from_yaml("join_delimiter: \"|\"\n").unwrap();
        assert_eq!(config.join_delimiter, "|");
        assert_eq!(config.field_delimiter, '|');
    }

    #[test]
    fn full_yaml_parses() {
        let yaml = r#"
field_delimiter: ";"
join_delimiter: ","
database_url: "postgres://localhost/audit"
"#;
        let config = ResolverConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.field_delimiter, ';');
        assert_eq!(config.database_url.as_deref(), Some("postgres://localhost/audit"));
    }

    #[test]
    fn multibyte_delimiter_is_rejected() {
        let config = ResolverConfig {
            field_delimiter: '†',
            ..Default::default()
        };
        assert!(config.delimiter_byte().is_err());
    }
}
