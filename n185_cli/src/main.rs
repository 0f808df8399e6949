//! # n185 CLI
//!
//! Command-line front end for `n185_core`: summarize a hydrant flow test,
//! build up a `.n185` project of test and derived curves, and export the
//! `N^1.85` chart as SVG.
//!
//! ```text
//! n185 summary --static 65 --flow 1500 --residual 35
//! n185 project new main_st.n185 --name "Main St"
//! n185 project add-test main_st.n185 --id H-101 --static 65 --flow 1500 --residual 35
//! n185 project tilt main_st.n185 --from H-101 --length 800 --diameter 8
//! n185 plot main_st.n185 -o main_st.svg
//! ```

mod commands;
mod render;

use std::io;
use std::path::PathBuf;

use anyhow::Result;
use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum, ValueHint};
use n185_core::errors::FlowError;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about = "NFPA 291 fire-flow curves on N^1.85 paper", long_about = None)]
struct Cli {
    /// Log debug detail to stderr
    #[arg(short, long, global = true, action = ArgAction::SetTrue)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print AFF/NFF read-outs for a single flow test
    Summary(SummaryArgs),
    /// Create and edit .n185 project files
    #[command(subcommand)]
    Project(ProjectCommand),
    /// Render a project's chart to SVG
    Plot(PlotArgs),
}

#[derive(Args, Debug)]
struct TestArgs {
    /// Static pressure (PSI)
    #[arg(long = "static", value_name = "PSI")]
    static_pressure: String,

    /// Test flow (GPM)
    #[arg(long, value_name = "GPM")]
    flow: String,

    /// Residual pressure at the test flow (PSI)
    #[arg(long, value_name = "PSI")]
    residual: String,
}

#[derive(Args, Debug)]
struct SummaryArgs {
    #[command(flatten)]
    test: TestArgs,

    /// Label for the curve
    #[arg(long, default_value = "Test")]
    id: String,

    /// Extra Available Fire Flow queries at these minimum pressures (PSI)
    #[arg(long = "aff-at", value_name = "PSI", value_delimiter = ',')]
    aff_at: Vec<f64>,

    /// Extra pressure queries at these required flows (GPM)
    #[arg(long = "pressure-at", value_name = "GPM", value_delimiter = ',')]
    pressure_at: Vec<f64>,

    /// Print JSON instead of a table
    #[arg(long, action = ArgAction::SetTrue)]
    json: bool,
}

#[derive(Subcommand, Debug)]
enum ProjectCommand {
    /// Create an empty project
    New(NewArgs),
    /// Add a curve from a hydrant flow test
    AddTest(AddTestArgs),
    /// Derive a curve by adding or removing pipe friction
    Tilt(TiltArgs),
    /// Derive a curve with a different static pressure
    Shift(ShiftArgs),
    /// Add one tilted curve per candidate pipe diameter
    WhatIf(WhatIfArgs),
    /// Add a point, label or reference line to the chart
    Annotate(AnnotateArgs),
    /// Print the project contents
    Show(ShowArgs),
}

#[derive(Args, Debug)]
struct NewArgs {
    /// Project file to create
    #[arg(value_hint = ValueHint::FilePath)]
    file: PathBuf,

    #[arg(long, default_value = "Untitled Project")]
    name: String,

    /// Right edge of the flow axis (GPM)
    #[arg(long, default_value_t = 5000.0)]
    max_flow: f64,

    /// Top of the pressure axis (PSI)
    #[arg(long, default_value_t = 100.0)]
    max_pressure: f64,

    /// Chart title
    #[arg(long, default_value = "")]
    title: String,

    /// Print today's date on the chart
    #[arg(long, action = ArgAction::SetTrue)]
    show_date: bool,

    /// Overwrite an existing file
    #[arg(long, action = ArgAction::SetTrue)]
    force: bool,
}

#[derive(Args, Debug)]
struct CurveStyleArgs {
    /// Line color as #rrggbb
    #[arg(long)]
    color: Option<String>,

    /// Line style
    #[arg(long, value_parser = ["solid", "dashed", "dotted", "dashdot"])]
    line_style: Option<String>,
}

#[derive(Args, Debug)]
struct AddTestArgs {
    #[arg(value_hint = ValueHint::FilePath)]
    file: PathBuf,

    /// Curve label, e.g. the hydrant number
    #[arg(long)]
    id: String,

    #[command(flatten)]
    test: TestArgs,

    #[command(flatten)]
    style: CurveStyleArgs,
}

#[derive(Args, Debug)]
struct TiltArgs {
    #[arg(value_hint = ValueHint::FilePath)]
    file: PathBuf,

    /// Id of the curve to derive from
    #[arg(long)]
    from: String,

    /// Pipe length (ft)
    #[arg(long, value_name = "FT")]
    length: f64,

    /// Pipe inside diameter (in)
    #[arg(long, value_name = "IN")]
    diameter: f64,

    /// Hazen-Williams C
    #[arg(long = "c-factor", default_value_t = n185_core::hydraulics::DEFAULT_C_FACTOR)]
    c_factor: f64,

    /// Remove the pipe from the path instead of adding it
    #[arg(long, action = ArgAction::SetTrue)]
    remove: bool,

    /// Id for the new curve (default: "<from>*")
    #[arg(long)]
    id: Option<String>,

    #[command(flatten)]
    style: CurveStyleArgs,
}

#[derive(Args, Debug)]
struct ShiftArgs {
    #[arg(value_hint = ValueHint::FilePath)]
    file: PathBuf,

    /// Id of the curve to derive from
    #[arg(long)]
    from: String,

    /// New static pressure (PSI)
    #[arg(long = "static", value_name = "PSI", conflicts_with = "elevation", required_unless_present = "elevation")]
    static_pressure: Option<f64>,

    /// Elevation gain (ft) from the test hydrant; negative for lower ground
    #[arg(long, value_name = "FT", allow_negative_numbers = true)]
    elevation: Option<f64>,

    /// Id for the new curve (default: "<from>*")
    #[arg(long)]
    id: Option<String>,

    #[command(flatten)]
    style: CurveStyleArgs,
}

#[derive(Args, Debug)]
struct WhatIfArgs {
    #[arg(value_hint = ValueHint::FilePath)]
    file: PathBuf,

    /// Id of the curve to derive from
    #[arg(long)]
    from: String,

    /// Pipe length (ft)
    #[arg(long, value_name = "FT")]
    length: f64,

    /// Candidate diameters (in), comma separated
    #[arg(long, value_name = "IN", value_delimiter = ',', required = true)]
    diameters: Vec<f64>,

    /// Hazen-Williams C
    #[arg(long = "c-factor", default_value_t = n185_core::hydraulics::DEFAULT_C_FACTOR)]
    c_factor: f64,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum AnnotationKindArg {
    Point,
    Label,
    Hline,
    Vline,
}

#[derive(Args, Debug)]
struct AnnotateArgs {
    #[arg(value_hint = ValueHint::FilePath)]
    file: PathBuf,

    #[arg(value_enum)]
    kind: AnnotationKindArg,

    /// Flow (GPM); the position of a vertical line
    #[arg(long, value_name = "GPM")]
    flow: Option<f64>,

    /// Pressure (PSI); the position of a horizontal line
    #[arg(long, value_name = "PSI")]
    pressure: Option<f64>,

    #[arg(long, default_value = "")]
    text: String,

    /// Color as #rrggbb
    #[arg(long)]
    color: Option<String>,

    /// small, medium or large for points and labels; solid or dashed for lines
    #[arg(long)]
    style: Option<String>,
}

#[derive(Args, Debug)]
struct ShowArgs {
    #[arg(value_hint = ValueHint::FilePath)]
    file: PathBuf,

    /// Print the project JSON
    #[arg(long, action = ArgAction::SetTrue)]
    json: bool,
}

#[derive(Args, Debug)]
struct PlotArgs {
    /// Project file to plot
    #[arg(value_hint = ValueHint::FilePath)]
    file: PathBuf,

    /// SVG output path
    #[arg(short, long, default_value = "fireflow_graph.svg", value_hint = ValueHint::FilePath)]
    output: PathBuf,

    /// Also write the draw list as JSON
    #[arg(long, value_hint = ValueHint::FilePath)]
    scene_json: Option<PathBuf>,

    /// Override the chart title
    #[arg(long)]
    title: Option<String>,

    /// Override the flow axis maximum (GPM)
    #[arg(long)]
    max_flow: Option<f64>,

    /// Override the pressure axis maximum (PSI)
    #[arg(long)]
    max_pressure: Option<f64>,

    /// Canvas width (px)
    #[arg(long)]
    width: Option<f64>,

    /// Canvas height (px)
    #[arg(long)]
    height: Option<f64>,

    /// Sample curves out to this multiple of the flow maximum
    #[arg(long)]
    overscan: Option<f64>,
}

fn main() {
    let cli = Cli::parse();
    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();

    if let Err(err) = run(cli.command) {
        eprintln!("error: {err:#}");
        if let Some(flow) = err.downcast_ref::<FlowError>() {
            if let Ok(json) = serde_json::to_string(flow) {
                eprintln!("{json}");
            }
        }
        std::process::exit(1);
    }
}

fn run(command: Command) -> Result<()> {
    match command {
        Command::Summary(args) => commands::summary(args),
        Command::Project(project) => match project {
            ProjectCommand::New(args) => commands::new_project(args),
            ProjectCommand::AddTest(args) => commands::add_test(args),
            ProjectCommand::Tilt(args) => commands::tilt(args),
            ProjectCommand::Shift(args) => commands::shift(args),
            ProjectCommand::WhatIf(args) => commands::what_if(args),
            ProjectCommand::Annotate(args) => commands::annotate(args),
            ProjectCommand::Show(args) => commands::show(args),
        },
        Command::Plot(args) => commands::plot(args),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_what_if() {
        let cli = Cli::try_parse_from([
            "n185", "project", "what-if", "p.n185", "--from", "H-1", "--length", "1000", "--diameters", "8,12,16",
        ])
        .unwrap();
        match cli.command {
            Command::Project(ProjectCommand::WhatIf(args)) => {
                assert_eq!(args.diameters, vec![8.0, 12.0, 16.0]);
                assert_eq!(args.c_factor, 130.0);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_shift_needs_static_or_elevation() {
        assert!(Cli::try_parse_from(["n185", "project", "shift", "p.n185", "--from", "H-1"]).is_err());
        assert!(Cli::try_parse_from([
            "n185", "project", "shift", "p.n185", "--from", "H-1", "--static", "60", "--elevation", "10",
        ])
        .is_err());
        assert!(Cli::try_parse_from(["n185", "project", "shift", "p.n185", "--from", "H-1", "--elevation", "-12"]).is_ok());
    }
}
