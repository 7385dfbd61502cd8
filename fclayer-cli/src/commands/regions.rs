//! Regions command - list the built-in region catalog.

use std::io::{self, Write};

use clap::Args;
use serde::Serialize;

use fclayer::access::{AccessPolicy, Caller};
use fclayer::catalog::RegionCatalog;

use crate::error::CliError;
use crate::runner::CliRunner;

/// Arguments for the regions command.
#[derive(Debug, Args)]
pub struct RegionsArgs {
    /// Only list regions the configured editor may see
    #[arg(long)]
    pub permitted: bool,

    /// Print JSON instead of a table
    #[arg(long)]
    pub json: bool,
}

/// One catalog entry as listed.
#[derive(Debug, Serialize)]
pub struct RegionRow {
    pub code: String,
    pub name: String,
    pub source: String,
    pub layers: usize,
    pub access: String,
    pub permitted: bool,
    pub url: String,
}

/// Rows for every region, in code order.
pub fn region_rows(
    catalog: &RegionCatalog,
    caller: &Caller,
    policy: &AccessPolicy,
    permitted_only: bool,
) -> Vec<RegionRow> {
    catalog
        .regions()
        .map(|region| RegionRow {
            code: region.code.clone(),
            name: region.name.clone(),
            source: region.source.clone(),
            layers: region.layers.len(),
            access: region.permission.describe(),
            permitted: policy.permits(&region.permission, caller) && policy.selection.includes(&region.code),
            url: region.base_url.clone(),
        })
        .filter(|row| !permitted_only || row.permitted)
        .collect()
}

/// Run the regions command.
pub fn run(runner: &CliRunner, args: RegionsArgs) -> Result<(), CliError> {
    runner.log_startup("regions");
    let config = runner.config();
    let catalog = runner.catalog()?;
    let rows = region_rows(
        &catalog,
        &config.caller(),
        &config.access_policy(),
        args.permitted,
    );

    let mut out = io::stdout().lock();
    if args.json {
        serde_json::to_writer_pretty(&mut out, &rows)?;
        writeln!(out).map_err(|e| CliError::Output(e.to_string()))?;
        return Ok(());
    }

    let name_width = rows.iter().map(|r| r.name.len()).max().unwrap_or(4).max(4);
    let access_width = rows.iter().map(|r| r.access.len()).max().unwrap_or(6).max(6);
    let result: io::Result<()> = (|| {
        writeln!(
            out,
            "{:<6} {:<name_width$} {:>6}  {:<access_width$}  {:<4}  SOURCE",
            "CODE", "NAME", "LAYERS", "ACCESS", "YOU"
        )?;
        for row in &rows {
            writeln!(
                out,
                "{:<6} {:<name_width$} {:>6}  {:<access_width$}  {:<4}  {}",
                row.code,
                row.name,
                row.layers,
                row.access,
                if row.permitted { "yes" } else { "no" },
                row.source
            )?;
        }
        writeln!(out)?;
        writeln!(out, "{} regions", rows.len())
    })();
    result.map_err(|e| CliError::Output(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use fclayer::access::RegionSelection;

    fn catalog() -> RegionCatalog {
        RegionCatalog::builtin().unwrap()
    }

    #[test]
    fn test_rows_cover_catalog_in_order() {
        let catalog = catalog();
        let rows = region_rows(&catalog, &Caller::new(7), &AccessPolicy::default(), false);
        assert_eq!(rows.len(), catalog.len());
        let codes: Vec<&str> = rows.iter().map(|r| r.code.as_str()).collect();
        let mut sorted = codes.clone();
        sorted.sort();
        assert_eq!(codes, sorted);

        let md = rows.iter().find(|r| r.code == "MD").unwrap();
        assert!(md.layers >= 1);
        assert!(md.permitted);
    }

    #[test]
    fn test_permitted_filter_respects_rank() {
        let catalog = catalog();
        let policy = AccessPolicy::default();
        let high = region_rows(&catalog, &Caller::new(7), &policy, true);
        let low = region_rows(&catalog, &Caller::new(1), &policy, true);
        assert!(low.len() < high.len());
        assert!(low.iter().all(|r| r.permitted));
    }

    #[test]
    fn test_selection_limits_permitted_rows() {
        let catalog = catalog();
        let policy = AccessPolicy {
            selection: RegionSelection::Only("MD".into()),
            ..AccessPolicy::default()
        };
        let rows = region_rows(&catalog, &Caller::new(7), &policy, true);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].code, "MD");
    }
}
