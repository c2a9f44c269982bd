//! Persistent volume claim commands

use anyhow::Result;
use tabled::Tabled;

use super::BundleContext;
use crate::output::{print_describe, print_table, OutputFormat};
use bundle_lib::PvcInfo;

/// Row for the claim to volume table
#[derive(Tabled, serde::Serialize)]
struct VolumeRow {
    #[tabled(rename = "Claim")]
    claim: String,
    #[tabled(rename = "Volume")]
    volume: String,
}

fn pvc_info(ctx: &BundleContext) -> Result<PvcInfo> {
    Ok(PvcInfo::from_source(ctx.source.clone())?)
}

/// Show the claim to volume mapping
pub fn show_volumes(ctx: &BundleContext) -> Result<()> {
    let mapping = pvc_info(ctx)?.volume_mapping()?;

    if ctx.format == OutputFormat::Json {
        return crate::output::print_json(&mapping);
    }

    let rows: Vec<VolumeRow> = mapping
        .iter()
        .map(|(claim, volume)| VolumeRow {
            claim: claim.to_string(),
            volume: volume.clone(),
        })
        .collect();
    print_table(&rows, OutputFormat::Table)
}

/// Show the bound volume's describe output per claim
pub fn describe_volumes(ctx: &BundleContext) -> Result<()> {
    print_describe(&pvc_info(ctx)?.pv_describe()?, ctx.format)
}
