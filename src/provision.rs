// ABOUTME: One-shot provisioning of a CSV-backed analytics table.
// ABOUTME: Runs CREATE DATABASE then CREATE EXTERNAL TABLE, waiting for each query to finish.

use crate::cloud::{CloudError, QueryOps, QueryRequest};
use crate::config::TableConfig;
use crate::deploy::{PollError, PollPolicy, QueryWatch, poll_until_terminal};
use crate::output::Output;
use thiserror::Error;

const CSV_SERDE: &str = "org.apache.hadoop.hive.serde2.OpenCSVSerde";

#[derive(Debug, Error)]
pub enum ProvisionError {
    #[error("failed to start query: {0}")]
    Start(#[source] CloudError),

    #[error(transparent)]
    Query(#[from] PollError),
}

pub fn create_database_query(config: &TableConfig) -> String {
    format!("CREATE DATABASE IF NOT EXISTS {}", config.database)
}

pub fn create_table_query(config: &TableConfig) -> String {
    let columns = config
        .columns
        .iter()
        .map(|c| format!("  `{}` {}", c.name, c.data_type))
        .collect::<Vec<_>>()
        .join(",\n");

    format!(
        "CREATE EXTERNAL TABLE IF NOT EXISTS {database}.{table} (\n{columns}\n)\n\
         ROW FORMAT SERDE '{CSV_SERDE}'\n\
         WITH SERDEPROPERTIES (\n  'separatorChar' = '{separator}',\n  'quoteChar' = '{quote}'\n)\n\
         LOCATION '{location}'\n\
         TBLPROPERTIES ('skip.header.line.count'='{skip}')",
        database = config.database,
        table = config.table,
        separator = escape_char(config.separator),
        quote = escape_char(config.quote),
        location = config.location,
        skip = config.skip_header_lines,
    )
}

fn escape_char(c: char) -> String {
    match c {
        '\'' => "\\'".to_string(),
        '\\' => "\\\\".to_string(),
        '\t' => "\\t".to_string(),
        other => other.to_string(),
    }
}

/// Run one query and wait until it reaches a terminal state.
async fn run_query<Q: QueryOps + ?Sized>(
    queries: &Q,
    request: QueryRequest,
    policy: &PollPolicy,
    output: &Output,
) -> Result<(), ProvisionError> {
    let id = queries
        .start_query(&request)
        .await
        .map_err(ProvisionError::Start)?;
    tracing::debug!(%id, query = %request.query, "query started");

    let watch = QueryWatch {
        queries,
        execution_id: &id,
    };
    poll_until_terminal(&watch, policy, output).await?;
    Ok(())
}

/// Create the database and the table described by `config`.
pub async fn provision_table<Q: QueryOps + ?Sized>(
    config: &TableConfig,
    queries: &Q,
    output: &Output,
) -> Result<(), ProvisionError> {
    let policy = PollPolicy::new(config.poll_interval, config.poll_timeout);

    output.progress(&format!("  → Creating database {}...", config.database));
    run_query(
        queries,
        QueryRequest {
            query: create_database_query(config),
            database: None,
            output_location: config.output_location.clone(),
        },
        &policy,
        output,
    )
    .await?;

    output.progress(&format!(
        "  → Creating table {}.{}...",
        config.database, config.table
    ));
    run_query(
        queries,
        QueryRequest {
            query: create_table_query(config),
            database: Some(config.database.clone()),
            output_location: config.output_location.clone(),
        },
        &policy,
        output,
    )
    .await?;

    Ok(())
}
