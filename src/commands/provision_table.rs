// ABOUTME: Analytics table commands.
// ABOUTME: Provisions the table from athena_table.yml or scaffolds that file.

use ebdeploy::cloud::AwsCli;
use ebdeploy::config::{self, TableConfig, resolve_region};
use ebdeploy::error::Result;
use ebdeploy::output::Output;
use std::env;
use std::path::Path;

/// Create the database and table described by the config file.
pub async fn provision_table(
    config_path: &Path,
    region: Option<String>,
    output: &mut Output,
) -> Result<()> {
    let config = TableConfig::load(config_path)?;
    let aws = AwsCli::new(resolve_region(region));

    output.start_timer();
    output.progress(&format!(
        "Provisioning table {}.{} over {}",
        config.database, config.table, config.location
    ));

    ebdeploy::provision::provision_table(&config, &aws, output).await?;

    output.success(&format!("Table {}.{} is ready", config.database, config.table));
    Ok(())
}

/// Write an athena_table.yml template to the current directory.
pub fn init_table(force: bool, output: &Output) -> Result<()> {
    let cwd = env::current_dir()?;
    let path = config::init_table_config(&cwd, force)?;
    output.success(&format!("Wrote {}", path.display()));
    Ok(())
}
