// ABOUTME: Command module aggregator for the ebdeploy CLI.
// ABOUTME: Re-exports deploy, provision-table and init-table command handlers.

mod deploy;
mod provision_table;

pub use deploy::{DeployArgs, deploy};
pub use provision_table::{init_table, provision_table};
