use crate::agent::ToolExecutionLog;
use crate::catalog::ToolCatalog;
use crate::config::Config;
use crate::error::Result;
use crate::storage::{ExecutionStatus, Session, SessionStore, SqliteStorage, ToolExecutionRecord};
use crate::synth::OutputSynthesizer;
use colored::Colorize;
use prettytable::{format, Table};
use std::sync::Arc;

/// Handle `nexus sessions`
pub async fn handle_sessions(config: &Config) -> Result<()> {
    let storage = SqliteStorage::open(&config.storage)?;
    let sessions = storage
        .list_by_update(config.chat.session_list_limit)
        .await?;

    if sessions.is_empty() {
        println!("{}", "No sessions found.".yellow());
        return Ok(());
    }

    println!("\nSessions:");
    sessions_table(&sessions).printstd();
    println!();
    println!(
        "Use {} to see a session's tool runs.",
        "nexus executions <ID>".cyan()
    );
    println!();
    Ok(())
}

/// Handle `nexus executions <SESSION_ID>`
pub async fn handle_executions(config: &Config, session_id: &str) -> Result<()> {
    let storage = Arc::new(SqliteStorage::open(&config.storage)?);
    let log = ToolExecutionLog::new(
        storage,
        Arc::new(OutputSynthesizer::new()),
        ToolCatalog::builtin(),
        config.tools.execution_history_limit,
    );
    let records = log.history(session_id).await?;

    if records.is_empty() {
        println!(
            "{}",
            format!("No tool executions for session {}.", session_id).yellow()
        );
        return Ok(());
    }

    println!("\nTool executions for {}:", session_id);
    executions_table(&records).printstd();
    println!();
    Ok(())
}

fn sessions_table(sessions: &[Session]) -> Table {
    let mut table = Table::new();
    table.set_format(*format::consts::FORMAT_BORDERS_ONLY);

    table.add_row(prettytable::row![
        "ID".bold(),
        "Name".bold(),
        "Messages".bold(),
        "Last Updated".bold()
    ]);

    for session in sessions {
        let id_short = session.id.get(..8).unwrap_or(&session.id);
        let name = truncate(&session.name, 40);
        let updated = session.updated_at.format("%Y-%m-%d %H:%M").to_string();

        table.add_row(prettytable::row![
            id_short.cyan(),
            name,
            session.message_count,
            updated
        ]);
    }

    table
}

fn executions_table(records: &[ToolExecutionRecord]) -> Table {
    let mut table = Table::new();
    table.set_format(*format::consts::FORMAT_BORDERS_ONLY);

    table.add_row(prettytable::row![
        "Tool".bold(),
        "Status".bold(),
        "Parameters".bold(),
        "When".bold()
    ]);

    for record in records {
        let status = match record.status {
            ExecutionStatus::Success => record.status.as_str().green(),
            ExecutionStatus::Error => record.status.as_str().red(),
            ExecutionStatus::Running => record.status.as_str().yellow(),
        };
        let params = serde_json::Value::Object(record.parameters.clone()).to_string();

        table.add_row(prettytable::row![
            record.tool_name.cyan(),
            status,
            truncate(&params, 50),
            record.timestamp.format("%Y-%m-%d %H:%M:%S").to_string()
        ]);
    }

    table
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() > max_chars {
        let head: String = text.chars().take(max_chars.saturating_sub(3)).collect();
        format!("{}...", head)
    } else {
        text.to_string()
    }
}
