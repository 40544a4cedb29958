// ABOUTME: Analytics table definition read from YAML.
// ABOUTME: Describes a CSV-backed external table and where query results are written.

use crate::error::{Error, Result};
use nonempty::NonEmpty;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

pub const TABLE_CONFIG_FILENAME: &str = "athena_table.yml";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableConfig {
    pub database: String,
    pub table: String,
    /// Object store prefix holding the CSV data, e.g. `s3://bucket/path/`.
    pub location: String,
    /// Object store prefix for query results.
    pub output_location: String,
    pub columns: NonEmpty<Column>,
    #[serde(default = "default_separator")]
    pub separator: char,
    #[serde(default = "default_quote")]
    pub quote: char,
    #[serde(default = "default_skip_header_lines")]
    pub skip_header_lines: u32,
    #[serde(default = "default_poll_interval", with = "humantime_serde")]
    pub poll_interval: Duration,
    #[serde(default = "default_poll_timeout", with = "humantime_serde")]
    pub poll_timeout: Duration,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    #[serde(rename = "type")]
    pub data_type: String,
}

fn default_separator() -> char {
    ','
}

fn default_quote() -> char {
    '"'
}

fn default_skip_header_lines() -> u32 {
    1
}

fn default_poll_interval() -> Duration {
    Duration::from_secs(1)
}

fn default_poll_timeout() -> Duration {
    Duration::from_secs(600)
}

fn is_identifier(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

impl TableConfig {
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: TableConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(Error::ConfigNotFound(path.to_path_buf()));
        }
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Names end up inside DDL, so only plain identifiers are accepted.
    pub fn validate(&self) -> Result<()> {
        for (what, name) in [("database", &self.database), ("table", &self.table)] {
            if !is_identifier(name) {
                return Err(Error::InvalidConfig(format!("invalid {what} name: '{name}'")));
            }
        }

        for column in &self.columns {
            if !is_identifier(&column.name) {
                return Err(Error::InvalidConfig(format!(
                    "invalid column name: '{}'",
                    column.name
                )));
            }
            if !is_identifier(&column.data_type.replace(['(', ')', ',', '<', '>', ':'], "")) {
                return Err(Error::InvalidConfig(format!(
                    "invalid type for column '{}': '{}'",
                    column.name, column.data_type
                )));
            }
        }

        for (what, location) in [
            ("location", &self.location),
            ("output_location", &self.output_location),
        ] {
            if !location.starts_with("s3://") || location.contains('\'') {
                return Err(Error::InvalidConfig(format!(
                    "{what} must be an s3:// URI, got '{location}'"
                )));
            }
        }

        if self.poll_interval.is_zero() {
            return Err(Error::InvalidConfig("poll_interval must be positive".into()));
        }

        Ok(())
    }

    /// Customer export table used by the lead-capture analytics.
    pub fn template() -> Self {
        let column = |name: &str, data_type: &str| Column {
            name: name.to_string(),
            data_type: data_type.to_string(),
        };
        TableConfig {
            database: "mydata".to_string(),
            table: "customers".to_string(),
            location: "s3://my-bucket/".to_string(),
            output_location: "s3://my-bucket/athena-results/".to_string(),
            columns: NonEmpty::from((
                column("idx", "INT"),
                vec![
                    column("customer_id", "STRING"),
                    column("first_name", "STRING"),
                    column("last_name", "STRING"),
                    column("company", "STRING"),
                    column("city", "STRING"),
                    column("country", "STRING"),
                    column("phone1", "STRING"),
                    column("phone2", "STRING"),
                    column("email", "STRING"),
                    column("subscription_date", "STRING"),
                    column("website", "STRING"),
                ],
            )),
            separator: default_separator(),
            quote: default_quote(),
            skip_header_lines: default_skip_header_lines(),
            poll_interval: default_poll_interval(),
            poll_timeout: default_poll_timeout(),
        }
    }
}
