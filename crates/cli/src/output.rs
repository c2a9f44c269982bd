//! Output formatting utilities

use anyhow::Result;
use bundle_lib::parser::GetTable;
use bundle_lib::{DescribeSections, LogRecord, OrderedMap};
use clap::ValueEnum;
use colored::Colorize;
use serde::Serialize;
use tabled::{builder::Builder, settings::Style, Table, Tabled};

/// Output format for CLI commands
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Table format (default)
    #[default]
    Table,
    /// JSON format
    Json,
}

impl OutputFormat {
    /// Format named in the config file, falling back to the table format
    pub fn from_config(name: Option<&str>) -> Self {
        name.and_then(|name| <Self as ValueEnum>::from_str(name, true).ok())
            .unwrap_or_default()
    }
}

/// Pretty-print any serializable value as JSON
pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Print a table from a list of items
pub fn print_table<T: Tabled + Serialize>(items: &[T], format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Table => {
            if items.is_empty() {
                println!("{}", "No items found".yellow());
                return Ok(());
            }
            let table = Table::new(items).with(Style::rounded()).to_string();
            println!("{}", table);
            Ok(())
        }
        OutputFormat::Json => print_json(items),
    }
}

/// Print a parsed `kubectl get` table with its own columns
pub fn print_get_table(table: &GetTable, format: OutputFormat) -> Result<()> {
    if format == OutputFormat::Json {
        return print_json(table);
    }
    if table.is_empty() {
        println!("{}", "No items found".yellow());
        return Ok(());
    }

    let mut builder = Builder::default();
    let mut header = vec!["NAME".to_string()];
    header.extend(table.columns().iter().cloned());
    builder.push_record(header);

    for (name, row) in table.rows().iter() {
        let mut record = vec![name.to_string()];
        for column in table.columns() {
            let cell = row.get(column).map(String::as_str).unwrap_or_default();
            if column == "STATUS" {
                record.push(color_status(cell));
            } else {
                record.push(cell.to_string());
            }
        }
        builder.push_record(record);
    }

    println!("{}", builder.build().with(Style::rounded()));
    Ok(())
}

/// Print describe records, one block per resource
pub fn print_describe(records: &OrderedMap<DescribeSections>, format: OutputFormat) -> Result<()> {
    if format == OutputFormat::Json {
        return print_json(records);
    }
    if records.is_empty() {
        println!("{}", "No items found".yellow());
        return Ok(());
    }

    for (name, sections) in records.iter() {
        println!("{}", name.bold());
        println!("{}", "=".repeat(50));
        for text in sections.values() {
            println!("{}", text);
        }
        println!();
    }
    Ok(())
}

/// Print a list of names, one per line
pub fn print_names(names: &[String], format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => print_json(names),
        OutputFormat::Table => {
            if names.is_empty() {
                println!("{}", "No items found".yellow());
            }
            for name in names {
                println!("{}", name);
            }
            Ok(())
        }
    }
}

/// Print filtered log records
///
/// Structured records are rendered as `key=value` pairs in projection
/// order; raw lines are printed as they were.
pub fn print_log_records(records: &[LogRecord], format: OutputFormat) -> Result<()> {
    if format == OutputFormat::Json {
        return print_json(records);
    }

    for record in records {
        match record {
            LogRecord::Structured(fields) => {
                let line: Vec<String> = fields
                    .iter()
                    .map(|(key, value)| {
                        let value = match value {
                            serde_json::Value::String(s) => s.clone(),
                            other => other.to_string(),
                        };
                        if key == "level" {
                            format!("{}={}", key, color_level(&value))
                        } else {
                            format!("{}={}", key, value)
                        }
                    })
                    .collect();
                println!("{}", line.join(" "));
            }
            LogRecord::Raw(line) => println!("{}", line.dimmed()),
        }
    }
    Ok(())
}

/// Print an error message
pub fn print_error(message: &str) {
    eprintln!("{} {}", "✗".red().bold(), message);
}

/// Print a warning message
pub fn print_warning(message: &str) {
    println!("{} {}", "⚠".yellow().bold(), message);
}

/// Print an info message
pub fn print_info(message: &str) {
    println!("{} {}", "ℹ".blue().bold(), message);
}

/// Color status based on value
pub fn color_status(status: &str) -> String {
    match status.to_lowercase().as_str() {
        "ready" | "running" | "bound" | "completed" | "succeeded" => status.green().to_string(),
        "pending" | "containercreating" | "released" => status.yellow().to_string(),
        "notready" | "failed" | "error" | "crashloopbackoff" | "lost" => status.red().to_string(),
        s if s.contains("schedulingdisabled") => status.yellow().to_string(),
        _ => status.to_string(),
    }
}

/// Color a log level name
pub fn color_level(level: &str) -> String {
    match level {
        "ERROR" | "FATAL" => level.red().bold().to_string(),
        "WARN" => level.yellow().to_string(),
        "INFO" => level.green().to_string(),
        _ => level.dimmed().to_string(),
    }
}
