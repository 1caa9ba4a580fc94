use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use collage::{
    BackgroundColor, CollageSession, ImageSource, LayoutCatalog, LoadEvent, PositionSink,
    SessionConfig, TransformPatch,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "collage", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the available layouts.
    Layouts(LayoutsArgs),
    /// Arrange photos into a layout and write the collage as PNG.
    Render(RenderArgs),
}

#[derive(Parser, Debug)]
struct LayoutsArgs {
    /// Layout catalog JSON (defaults to the built-in layouts).
    #[arg(long)]
    catalog: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct RenderArgs {
    /// Layout id, e.g. `four-grid`.
    #[arg(long)]
    layout: String,

    /// Layout catalog JSON (defaults to the built-in layouts).
    #[arg(long)]
    catalog: Option<PathBuf>,

    /// Background colour as `#RGB` or `#RRGGBB`.
    #[arg(long)]
    background: Option<String>,

    /// Session config JSON.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Pan/zoom for one slot as `SLOT:X,Y,SCALE` (repeatable).
    #[arg(long = "transform", value_parser = parse_slot_transform)]
    transforms: Vec<SlotTransform>,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,

    /// Photos, bound to slots in order.
    #[arg(required = true)]
    images: Vec<PathBuf>,
}

#[derive(Clone, Copy, Debug)]
struct SlotTransform {
    slot: usize,
    x: f64,
    y: f64,
    scale: f64,
}

fn parse_slot_transform(s: &str) -> Result<SlotTransform, String> {
    let (slot, rest) = s
        .split_once(':')
        .ok_or_else(|| format!("expected SLOT:X,Y,SCALE, got '{s}'"))?;
    let slot = slot
        .trim()
        .parse::<usize>()
        .map_err(|e| format!("bad slot index '{slot}': {e}"))?;
    let nums = rest
        .split(',')
        .map(|v| v.trim().parse::<f64>().map_err(|e| format!("bad number '{v}': {e}")))
        .collect::<Result<Vec<_>, _>>()?;
    let [x, y, scale] = nums[..] else {
        return Err(format!("expected 3 numbers after '{slot}:', got {}", nums.len()));
    };
    Ok(SlotTransform { slot, x, y, scale })
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Layouts(args) => cmd_layouts(args),
        Command::Render(args) => cmd_render(args),
    }
}

fn load_catalog(path: Option<&Path>) -> anyhow::Result<LayoutCatalog> {
    match path {
        Some(p) => Ok(LayoutCatalog::load(p)?),
        None => Ok(LayoutCatalog::builtin()),
    }
}

fn cmd_layouts(args: LayoutsArgs) -> anyhow::Result<()> {
    let catalog = load_catalog(args.catalog.as_deref())?;
    for layout in catalog.iter() {
        println!(
            "{}\t{}\t{}\t{}x{}",
            layout.id(),
            layout.name(),
            layout.slot_count(),
            layout.canvas_width(),
            layout.canvas_height()
        );
    }
    Ok(())
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let catalog = load_catalog(args.catalog.as_deref())?;
    let layout = catalog
        .get(&args.layout)
        .with_context(|| format!("unknown layout '{}'", args.layout))?
        .clone();

    let config = match &args.config {
        Some(p) => SessionConfig::load(p)?,
        None => SessionConfig::default(),
    }
    .with_env_overrides();

    let slots = layout.slot_count();
    if args.images.len() > slots {
        eprintln!(
            "layout '{}' has {slots} slots; ignoring {} extra image(s)",
            layout.id(),
            args.images.len() - slots
        );
    }

    let mut sess = CollageSession::new(config)?;
    sess.set_layout(layout);
    if let Some(bg) = &args.background {
        let bg = BackgroundColor::parse(bg.as_str());
        anyhow::ensure!(bg.is_valid(), "background '{bg}' is not a #RGB or #RRGGBB color");
        sess.set_background(bg);
    }
    sess.set_sources(args.images.iter().map(|p| ImageSource::from_path(p.clone())).collect());

    for t in &args.transforms {
        let Some(id) = sess.placed().get(t.slot).map(|p| p.id) else {
            anyhow::bail!(
                "--transform slot {} out of range ({} placed)",
                t.slot,
                sess.placed().len()
            );
        };
        sess.update_position(
            id,
            TransformPatch {
                x: Some(t.x),
                y: Some(t.y),
                scale: Some(t.scale),
            },
        );
    }

    for ev in sess.wait_for_bitmaps() {
        if let LoadEvent::Failed { id, reason } = ev {
            eprintln!("warning: {id} left empty: {reason}");
        }
    }

    let png = sess.export_png()?;
    if let Some(parent) = args.out.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    std::fs::write(&args.out, &png)
        .with_context(|| format!("write png '{}'", args.out.display()))?;

    eprintln!("wrote {}", args.out.display());
    Ok(())
}
