// ABOUTME: Config scaffolding for analytics table provisioning.
// ABOUTME: Writes an athena_table.yml template to the project directory.

use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

use super::{TABLE_CONFIG_FILENAME, TableConfig};

/// Write the table template, refusing to overwrite unless `force` is set.
pub fn init_table_config(dir: &Path, force: bool) -> Result<PathBuf> {
    let config_path = dir.join(TABLE_CONFIG_FILENAME);

    if config_path.exists() && !force {
        return Err(Error::AlreadyExists(config_path));
    }

    let yaml = serde_yaml::to_string(&TableConfig::template())?;
    std::fs::write(&config_path, yaml)?;

    Ok(config_path)
}
