//! Subcommand handlers.

use std::fs;
use std::path::Path;

use anyhow::{anyhow, bail, Context, Result};
use n185_core::annotations::{Annotation, AnnotationKind, FontSize, MarkerSize, Orientation, RefLineStyle};
use n185_core::hydraulics::summary::STANDARD_MIN_PRESSURES;
use n185_core::hydraulics::{
    query, what_if_scenarios, Category, CurveStyle, CurveSummary, FireFlowCurve, FlowQuery, FrictionChange,
    PipeSegment, QueryAnswer,
};
use n185_core::plot::ChartEvent;
use n185_core::style::{LineStyle, Rgb};
use n185_core::units::{format_number, Feet};
use n185_core::{load_project, save_project, Chart, Project};
use tracing::info;

use crate::render::render_svg;
use crate::{
    AddTestArgs, AnnotateArgs, AnnotationKindArg, CurveStyleArgs, NewArgs, PlotArgs, ShiftArgs, ShowArgs,
    SummaryArgs, TiltArgs, WhatIfArgs,
};

fn load(path: &Path) -> Result<Project> {
    load_project(path).with_context(|| format!("failed to load project {}", path.display()))
}

fn save(project: &Project, path: &Path) -> Result<()> {
    save_project(project, path).with_context(|| format!("failed to save project {}", path.display()))
}

fn checked_color(color: &str) -> Result<String> {
    Rgb::parse_hex(color)
        .map(Rgb::to_hex)
        .ok_or_else(|| anyhow!("invalid color '{color}', expected #rrggbb"))
}

/// Apply `--color` / `--line-style` on top of an existing style.
fn apply_style(mut style: CurveStyle, args: &CurveStyleArgs) -> Result<CurveStyle> {
    if let Some(color) = &args.color {
        style.color = checked_color(color)?;
    }
    if let Some(line_style) = &args.line_style {
        style.line_style = LineStyle::from_name(line_style);
    }
    Ok(style)
}

fn print_summary(summary: &CurveSummary) {
    println!("Curve {}", summary.id);
    println!("  Static:        {}", summary.static_pressure);
    match &summary.test {
        Some(test) => println!("  Test:          {} @ {}", test.flow, test.residual),
        None => println!("  Test:          derived"),
    }
    println!("  k:             {:.6e}", summary.k);
    for aff in &summary.available_flows {
        println!("  AFF @ {:>4}:   {} GPM", format_number(aff.min_pressure.0, 0), format_number(aff.flow.0, 0));
    }
    for nff in &summary.pressures_at_flow {
        println!(
            "  P @ {:>6} GPM: {} PSI",
            format_number(nff.required_flow.0, 0),
            format_number(nff.pressure.0, 1)
        );
    }
}

pub fn summary(args: SummaryArgs) -> Result<()> {
    let SummaryArgs {
        test,
        id,
        aff_at,
        pressure_at,
        json,
    } = args;
    let curve = FireFlowCurve::parse(&test.static_pressure, &test.flow, &test.residual, id, CurveStyle::default())?;

    let summary = CurveSummary::for_curve(&curve);
    let queries: Vec<QueryAnswer> = aff_at
        .iter()
        .map(|&p| FlowQuery::AvailableFlow { min_pressure: p })
        .chain(pressure_at.iter().map(|&q| FlowQuery::PressureAtFlow { required_flow: q }))
        .map(|question| query(&curve, question))
        .collect();

    if json {
        let out = serde_json::json!({
            "summary": summary,
            "queries": queries,
            "advisories": curve.advisories().iter().map(ToString::to_string).collect::<Vec<_>>(),
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    print_summary(&summary);
    for answer in &queries {
        match answer {
            QueryAnswer::AvailableFlow(a) => println!(
                "  Query: AFF @ {} PSI = {} GPM",
                format_number(a.min_pressure.0, 1),
                format_number(a.flow.0, 0)
            ),
            QueryAnswer::PressureAtFlow(p) => println!(
                "  Query: P @ {} GPM = {} PSI",
                format_number(p.required_flow.0, 0),
                format_number(p.pressure.0, 1)
            ),
        }
    }
    for advisory in curve.advisories() {
        println!("  Note: {advisory}");
    }
    Ok(())
}

pub fn new_project(args: NewArgs) -> Result<()> {
    if args.file.exists() && !args.force {
        bail!("{} already exists (use --force to overwrite)", args.file.display());
    }
    let mut project = Project::new(args.name);
    project.settings.graph.max_flow = args.max_flow;
    project.settings.graph.max_pressure = args.max_pressure;
    project.settings.graph.title = args.title;
    project.settings.graph.show_date = args.show_date;
    project.settings.graph.validate()?;

    save(&project, &args.file)?;
    info!(path = %args.file.display(), "created project");
    Ok(())
}

/// Store a new curve and report its headline numbers.
fn add_and_report(project: &mut Project, curve: &FireFlowCurve) -> Result<()> {
    project.add_curve(curve)?;
    report_added(curve);
    Ok(())
}

fn report_added(curve: &FireFlowCurve) {
    println!(
        "Added {} (static {}, AFF @ 20 PSI {} GPM)",
        curve.id(),
        format_number(curve.static_pressure(), 1),
        format_number(curve.available_fire_flow(STANDARD_MIN_PRESSURES[0]), 0)
    );
}

pub fn add_test(args: AddTestArgs) -> Result<()> {
    let mut project = load(&args.file)?;
    let style = apply_style(CurveStyle::default(), &args.style)?;
    let curve = FireFlowCurve::parse(
        &args.test.static_pressure,
        &args.test.flow,
        &args.test.residual,
        args.id,
        style,
    )?;
    add_and_report(&mut project, &curve)?;
    save(&project, &args.file)
}

fn finish_derived(mut derived: FireFlowCurve, id: Option<String>, style: &CurveStyleArgs) -> Result<FireFlowCurve> {
    if let Some(id) = id {
        derived.set_id(id);
    }
    derived.style = apply_style(derived.style.clone(), style)?;
    Ok(derived.with_category(Category::Model))
}

/// Pipe headloss at the parent's test flow; derived parents have none.
fn headloss_at_test(parent: &FireFlowCurve, pipe: &PipeSegment) -> Option<f64> {
    parent.test_flow().map(|flow| pipe.headloss(flow))
}

pub fn tilt(args: TiltArgs) -> Result<()> {
    let mut project = load(&args.file)?;
    let parent = project.curve(&args.from)?;
    let pipe = PipeSegment::new(args.length, args.diameter, args.c_factor);
    let change = if args.remove {
        FrictionChange::Remove
    } else {
        FrictionChange::Add
    };

    let derived = finish_derived(parent.tilt_for_pipe(&pipe, change)?, args.id, &args.style)?;
    info!(
        parent = parent.id(),
        headloss_at_test = headloss_at_test(&parent, &pipe),
        "tilted curve"
    );
    add_and_report(&mut project, &derived)?;
    save(&project, &args.file)
}

pub fn shift(args: ShiftArgs) -> Result<()> {
    let mut project = load(&args.file)?;
    let parent = project.curve(&args.from)?;

    let shifted = match (args.static_pressure, args.elevation) {
        (Some(static_pressure), _) => parent.shift(static_pressure)?,
        (None, Some(elevation)) => parent.shift_by_elevation(Feet(elevation))?,
        (None, None) => bail!("either --static or --elevation is required"),
    };

    let derived = finish_derived(shifted, args.id, &args.style)?;
    add_and_report(&mut project, &derived)?;
    save(&project, &args.file)
}

pub fn what_if(args: WhatIfArgs) -> Result<()> {
    let mut project = load(&args.file)?;
    let parent = project.curve(&args.from)?;
    let scenarios = what_if_scenarios(&parent, args.length, args.c_factor, &args.diameters)?;
    project.add_curves(&scenarios)?;
    for scenario in &scenarios {
        report_added(scenario);
    }
    save(&project, &args.file)
}

fn annotation_from_args(args: &AnnotateArgs) -> Result<Annotation> {
    let need = |value: Option<f64>, flag: &str| value.ok_or_else(|| anyhow!("{flag} is required for this annotation"));
    let style = args.style.as_deref().unwrap_or_default();

    let kind = match args.kind {
        AnnotationKindArg::Point => AnnotationKind::Point {
            flow: need(args.flow, "--flow")?,
            pressure: need(args.pressure, "--pressure")?,
            size: MarkerSize::from_name(style),
        },
        AnnotationKindArg::Label => AnnotationKind::Label {
            flow: need(args.flow, "--flow")?,
            pressure: need(args.pressure, "--pressure")?,
            font_size: FontSize::from_name(style),
        },
        AnnotationKindArg::Hline => AnnotationKind::ReferenceLine {
            orientation: Orientation::Horizontal,
            value: need(args.pressure, "--pressure")?,
            line_style: RefLineStyle::from_name(style),
        },
        AnnotationKindArg::Vline => AnnotationKind::ReferenceLine {
            orientation: Orientation::Vertical,
            value: need(args.flow, "--flow")?,
            line_style: RefLineStyle::from_name(style),
        },
    };

    let mut annotation = Annotation::new(kind, args.text.clone());
    if let Some(color) = &args.color {
        annotation.color = checked_color(color)?;
    }
    Ok(annotation)
}

pub fn annotate(args: AnnotateArgs) -> Result<()> {
    let mut project = load(&args.file)?;
    let annotation = annotation_from_args(&args)?;
    let id = project.add_annotation(&annotation);
    println!("Added {} annotation {id}", annotation.kind.type_name());
    save(&project, &args.file)
}

pub fn show(args: ShowArgs) -> Result<()> {
    let project = load(&args.file)?;
    if args.json {
        println!("{}", serde_json::to_string_pretty(&project)?);
        return Ok(());
    }

    let graph = &project.settings.graph;
    println!("{} (schema {})", project.meta.name, project.meta.version);
    println!("  Modified: {}", project.meta.modified.format("%Y-%m-%d %H:%M UTC"));
    println!(
        "  Chart:    0-{} GPM, 0-{} PSI{}",
        format_number(graph.max_flow, 0),
        format_number(graph.max_pressure, 0),
        if graph.title.is_empty() {
            String::new()
        } else {
            format!(", \"{}\"", graph.title)
        }
    );
    println!();

    for curve in project.curves()? {
        let origin = match curve.parent_id() {
            Some(parent) => format!("from {parent}"),
            None => "test".to_string(),
        };
        println!(
            "  {:<16} {:<9} {:<14} static {:>6} PSI  AFF@20 {:>7} GPM{}",
            curve.id(),
            curve.style.category.as_str(),
            origin,
            format_number(curve.static_pressure(), 1),
            format_number(curve.available_fire_flow(STANDARD_MIN_PRESSURES[0]), 0),
            if curve.is_visible() { "" } else { "  (hidden)" }
        );
    }
    if !project.annotations.is_empty() {
        println!();
        println!("  {} annotation(s)", project.annotations.len());
    }
    Ok(())
}

pub fn plot(args: PlotArgs) -> Result<()> {
    let project = load(&args.file)?;

    let mut settings = project.settings.graph.clone();
    if let Some(title) = args.title {
        settings.title = title;
    }
    if let Some(max_flow) = args.max_flow {
        settings.max_flow = max_flow;
    }
    if let Some(max_pressure) = args.max_pressure {
        settings.max_pressure = max_pressure;
    }

    let mut layout = project.settings.layout;
    if let Some(width) = args.width {
        layout.canvas_width = width;
    }
    if let Some(height) = args.height {
        layout.canvas_height = height;
    }
    if let Some(overscan) = args.overscan {
        layout.sampling.overscan = overscan;
    }

    let mut chart = Chart::new(settings, layout)?;
    chart.handle(ChartEvent::CurvesChanged(project.curves()?))?;
    let scene = chart
        .handle(ChartEvent::AnnotationsChanged(project.annotations()?))?
        .ok_or_else(|| anyhow!("canvas {}x{} is too small to plot", layout.canvas_width, layout.canvas_height))?;

    render_svg(&scene, &args.output)?;
    info!(path = %args.output.display(), items = scene.items.len(), "wrote chart");

    if let Some(path) = args.scene_json {
        fs::write(&path, serde_json::to_string_pretty(&scene)?)
            .with_context(|| format!("failed to write {}", path.display()))?;
    }
    Ok(())
}
