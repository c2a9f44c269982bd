//! Environment summary command

use anyhow::Result;
use colored::Colorize;
use tabled::Tabled;

use super::BundleContext;
use crate::output::{print_json, print_table, OutputFormat};
use bundle_lib::EnvInfo;

/// Row for the environment table
#[derive(Tabled, serde::Serialize)]
struct EnvRow {
    #[tabled(rename = "Key")]
    key: String,
    #[tabled(rename = "Value")]
    value: String,
}

/// Show the environment summary
pub fn show_env(ctx: &BundleContext) -> Result<()> {
    let env = EnvInfo::load(ctx.source.as_ref())?;

    match ctx.format {
        OutputFormat::Json => print_json(&env),
        OutputFormat::Table => {
            println!("{} {}", "Namespace:".bold(), env.namespace().cyan());
            println!();
            let rows: Vec<EnvRow> = env
                .values()
                .iter()
                .map(|(key, value)| EnvRow {
                    key: key.to_string(),
                    value: value.clone(),
                })
                .collect();
            print_table(&rows, OutputFormat::Table)
        }
    }
}
