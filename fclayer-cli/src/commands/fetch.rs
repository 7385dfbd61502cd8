//! Fetch command - run one generation for a viewport and print the result.
//!
//! The rendered record set and the generation report are written to stdout
//! as JSON. Logs go to the log file and, with `--verbose`, to stderr.

use std::io::{self, Write};
use std::sync::Arc;

use clap::Args;
use serde::Serialize;
use tracing::info;

use fclayer::access::RegionSelection;
use fclayer::config::{ConfigFile, MAX_USER_RANK, MAX_ZOOM};
use fclayer::fetch::{
    ClassifiedLineRecord, FetchController, FetchReport, FetchStatus, GenerationOutcome, MemorySink,
};
use fclayer::geo::{Extent, Viewport};

use crate::error::CliError;
use crate::runner::CliRunner;

/// Default viewport size in degrees when only a centre is given.
const DEFAULT_SPAN_DEGREES: f64 = 0.05;

/// Arguments for the fetch command.
#[derive(Debug, Args)]
pub struct FetchArgs {
    /// Zoom level of the view
    #[arg(long, default_value_t = 14)]
    pub zoom: u8,

    /// Centre longitude in decimal degrees
    #[arg(long, requires = "lat", conflicts_with = "extent", allow_hyphen_values = true)]
    pub lon: Option<f64>,

    /// Centre latitude in decimal degrees
    #[arg(long, requires = "lon", allow_hyphen_values = true)]
    pub lat: Option<f64>,

    /// View width in degrees (with --lon/--lat)
    #[arg(long, default_value_t = DEFAULT_SPAN_DEGREES)]
    pub width: f64,

    /// View height in degrees (with --lon/--lat)
    #[arg(long, default_value_t = DEFAULT_SPAN_DEGREES)]
    pub height: f64,

    /// Explicit view extent: xmin,ymin,xmax,ymax
    #[arg(long, value_parser = parse_extent, allow_hyphen_values = true)]
    pub extent: Option<Extent>,

    /// Region code reported as on screen; repeat for several. Without it,
    /// regions are found by intersecting their bounds with the view
    #[arg(long = "region", value_name = "CODE")]
    pub regions: Vec<String>,

    /// Only fetch this region (overrides [display] active_region; ALL for every region)
    #[arg(long, value_name = "CODE")]
    pub select: Option<RegionSelection>,

    /// Hide local streets
    #[arg(long)]
    pub hide_streets: bool,

    /// Editor rank (overrides [user] rank)
    #[arg(long)]
    pub rank: Option<u8>,

    /// Treat the editor as an area manager
    #[arg(long)]
    pub area_manager: bool,

    /// Print only the report, without the records
    #[arg(long)]
    pub summary: bool,

    /// Pretty-print the JSON output
    #[arg(long)]
    pub pretty: bool,
}

impl FetchArgs {
    /// The viewport described by the arguments.
    pub fn viewport(&self) -> Result<Viewport, CliError> {
        if self.zoom > MAX_ZOOM {
            return Err(CliError::InvalidArgument(format!(
                "Zoom level must be between 0 and {}",
                MAX_ZOOM
            )));
        }

        let extent = match (self.extent, self.lon, self.lat) {
            (Some(extent), _, _) => extent,
            (None, Some(lon), Some(lat)) => {
                if !(self.width > 0.0 && self.height > 0.0) {
                    return Err(CliError::InvalidArgument(
                        "--width and --height must be positive".to_string(),
                    ));
                }
                Extent::around(lon, lat, self.width, self.height)
            }
            _ => {
                return Err(CliError::InvalidArgument(
                    "Give either --extent or both --lon and --lat".to_string(),
                ))
            }
        };

        let viewport = Viewport::new(self.zoom, extent);
        if self.regions.is_empty() {
            Ok(viewport)
        } else {
            Ok(viewport.with_regions(self.regions.iter().map(|code| code.to_ascii_uppercase())))
        }
    }

    /// Apply command-line overrides to the loaded configuration.
    pub fn apply_overrides(&self, config: &mut ConfigFile) -> Result<(), CliError> {
        if let Some(rank) = self.rank {
            if !(1..=MAX_USER_RANK).contains(&rank) {
                return Err(CliError::InvalidArgument(format!(
                    "--rank must be between 1 and {}",
                    MAX_USER_RANK
                )));
            }
            config.user.rank = rank;
        }
        if self.area_manager {
            config.user.area_manager = true;
        }
        if self.hide_streets {
            config.display.hide_streets = true;
        }
        if let Some(selection) = &self.select {
            config.display.active_region = selection.clone();
        }
        Ok(())
    }
}

/// Parse `xmin,ymin,xmax,ymax`.
fn parse_extent(s: &str) -> Result<Extent, String> {
    let values = s
        .split(',')
        .map(|part| part.trim().parse::<f64>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| format!("invalid coordinate: {}", e))?;

    let &[xmin, ymin, xmax, ymax] = values.as_slice() else {
        return Err(format!("expected 4 comma-separated values, got {}", values.len()));
    };
    if xmin == xmax || ymin == ymax {
        return Err("extent has no area".to_string());
    }
    Ok(Extent::new(xmin, ymin, xmax, ymax))
}

/// JSON document printed by the fetch command.
#[derive(Debug, Serialize)]
pub struct FetchOutput {
    pub outcome: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report: Option<ReportOutput>,
    pub status: FetchStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub records: Option<Vec<ClassifiedLineRecord>>,
}

/// Serializable view of a [`FetchReport`].
#[derive(Debug, Serialize)]
pub struct ReportOutput {
    pub generation: u64,
    pub zoom: u8,
    pub regions: Vec<String>,
    pub layers: usize,
    pub rendered: usize,
    pub unclassified: usize,
    pub hidden: usize,
    pub failures: Vec<String>,
    pub elapsed_ms: u128,
}

impl From<&FetchReport> for ReportOutput {
    fn from(report: &FetchReport) -> Self {
        Self {
            generation: report.generation.0,
            zoom: report.zoom,
            regions: report.regions.clone(),
            layers: report.layers,
            rendered: report.rendered,
            unclassified: report.unclassified,
            hidden: report.hidden,
            failures: report.failures.iter().map(ToString::to_string).collect(),
            elapsed_ms: report.elapsed.as_millis(),
        }
    }
}

impl FetchOutput {
    pub fn new(outcome: &GenerationOutcome, sink: &MemorySink, include_records: bool) -> Self {
        let name = match outcome {
            GenerationOutcome::Rendered(_) => "rendered",
            GenerationOutcome::Failed(_) => "failed",
            GenerationOutcome::Cancelled(_) => "cancelled",
            GenerationOutcome::Cleared => "cleared",
            GenerationOutcome::Disabled => "disabled",
        };
        Self {
            outcome: name,
            report: outcome.report().map(ReportOutput::from),
            status: sink.status(),
            records: include_records.then(|| sink.records()),
        }
    }
}

/// Run the fetch command.
pub fn run(runner: &mut CliRunner, args: FetchArgs) -> Result<(), CliError> {
    args.apply_overrides(runner.config_mut())?;
    runner.log_startup("fetch");

    let viewport = args.viewport()?;
    let sink = Arc::new(MemorySink::new());
    let controller = FetchController::new(
        runner.catalog()?,
        runner.feature_source()?,
        Arc::clone(&sink),
        runner.config().controller_settings(),
    );

    let outcome = runner
        .runtime()?
        .block_on(controller.on_viewport_changed(viewport));
    info!(
        rendered = outcome.report().map_or(0, |r| r.rendered),
        status = ?sink.status(),
        "Fetch finished"
    );

    let output = FetchOutput::new(&outcome, &sink, !args.summary);
    write_json(&output, args.pretty)?;

    match outcome {
        GenerationOutcome::Failed(report) => Err(CliError::FetchFailed(report.failure_summary())),
        _ => Ok(()),
    }
}

fn write_json<T: Serialize>(value: &T, pretty: bool) -> Result<(), CliError> {
    let mut out = io::stdout().lock();
    if pretty {
        serde_json::to_writer_pretty(&mut out, value)?;
    } else {
        serde_json::to_writer(&mut out, value)?;
    }
    writeln!(out).map_err(|e| CliError::Output(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct TestCli {
        #[command(flatten)]
        args: FetchArgs,
    }

    fn parse(argv: &[&str]) -> FetchArgs {
        let mut full = vec!["fetch"];
        full.extend_from_slice(argv);
        TestCli::try_parse_from(full).unwrap().args
    }

    #[test]
    fn test_parse_extent() {
        let extent = parse_extent("-77.1, 38.9, -76.9, 39.0").unwrap();
        assert_eq!(extent, Extent::new(-77.1, 38.9, -76.9, 39.0));
    }

    #[test]
    fn test_parse_extent_rejects_bad_input() {
        assert!(parse_extent("1,2,3").is_err());
        assert!(parse_extent("1,2,x,4").is_err());
        assert!(parse_extent("1,2,1,4").is_err());
    }

    #[test]
    fn test_viewport_from_centre() {
        let args = parse(&["--lon", "-77.0", "--lat", "38.95", "--zoom", "15"]);
        let viewport = args.viewport().unwrap();
        assert_eq!(viewport.zoom, 15);
        assert_eq!(viewport.extent, Extent::around(-77.0, 38.95, 0.05, 0.05));
        assert!(viewport.regions_hint.is_none());
    }

    #[test]
    fn test_viewport_with_region_hint() {
        let args = parse(&["--extent", "-78,38,-76,40", "--region", "md", "--region", "DC"]);
        let viewport = args.viewport().unwrap();
        assert_eq!(
            viewport.regions_hint,
            Some(vec!["MD".to_string(), "DC".to_string()])
        );
    }

    #[test]
    fn test_viewport_requires_location() {
        let args = parse(&["--zoom", "14"]);
        assert!(matches!(args.viewport(), Err(CliError::InvalidArgument(_))));
    }

    #[test]
    fn test_viewport_rejects_zoom_above_max() {
        let args = parse(&["--extent", "0,0,1,1", "--zoom", "30"]);
        assert!(args.viewport().is_err());
    }

    #[test]
    fn test_overrides_apply_to_config() {
        let args = parse(&[
            "--extent", "0,0,1,1", "--rank", "5", "--area-manager", "--hide-streets", "--select",
            "md",
        ]);
        let mut config = ConfigFile::default();
        args.apply_overrides(&mut config).unwrap();
        assert_eq!(config.user.rank, 5);
        assert!(config.user.area_manager);
        assert!(config.display.hide_streets);
        assert_eq!(config.display.active_region, RegionSelection::Only("MD".into()));
    }

    #[test]
    fn test_rank_override_is_validated() {
        let args = parse(&["--extent", "0,0,1,1", "--rank", "9"]);
        let mut config = ConfigFile::default();
        assert!(args.apply_overrides(&mut config).is_err());
        assert_eq!(config.user.rank, ConfigFile::default().user.rank);
    }

    #[test]
    fn test_output_for_cleared_outcome() {
        let sink = MemorySink::new();
        let output = FetchOutput::new(&GenerationOutcome::Cleared, &sink, true);
        let json = serde_json::to_value(&output).unwrap();
        assert_eq!(json["outcome"], "cleared");
        assert!(json.get("report").is_none());
        assert_eq!(json["status"]["state"], "idle");
        assert_eq!(json["records"], serde_json::json!([]));
    }

    #[test]
    fn test_summary_output_omits_records() {
        let sink = MemorySink::new();
        let output = FetchOutput::new(&GenerationOutcome::Disabled, &sink, false);
        let json = serde_json::to_value(&output).unwrap();
        assert!(json.get("records").is_none());
    }
}
