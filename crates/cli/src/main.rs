mod input;
mod provenance;

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chartlabel::placement::{place_labels_detailed, PlacementCfg};
use chartlabel::spacing::{space_apart, SpacingBounds};
use clap::{Args, Parser, Subcommand};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde_json::json;
use tracing_subscriber::fmt::SubscriberBuilder;

use provenance::{write_sidecar, Payload};

#[derive(Parser)]
#[command(name = "cli")]
#[command(about = "Chart label layout runner")]
struct Cmd {
    /// Optional tag recorded in provenance sidecars and logs
    #[arg(long)]
    tag: Option<String>,

    #[command(subcommand)]
    action: Action,
}

#[derive(Subcommand)]
enum Action {
    /// Space 1-D intervals apart (JSON or position,width CSV)
    SpaceApart {
        #[arg(long)]
        input: PathBuf,
        #[arg(long, default_value_t = 0.0)]
        clearance: f64,
        #[arg(long)]
        lower: Option<f64>,
        #[arg(long)]
        upper: Option<f64>,
        #[arg(long)]
        out: PathBuf,
    },
    /// Place labels next to their curves
    Place {
        #[arg(long)]
        input: PathBuf,
        #[arg(long, default_value_t = 0)]
        seed: u64,
        #[command(flatten)]
        tuning: Tuning,
        #[arg(long)]
        out: PathBuf,
    },
    /// Print a small provenance JSON block
    Report,
}

/// Placement tunables; unset flags keep the library defaults.
#[derive(Args, Debug, Default)]
struct Tuning {
    #[arg(long)]
    restarts: Option<usize>,
    #[arg(long)]
    penalty_incs: Option<usize>,
    #[arg(long)]
    line_buffer: Option<f64>,
    #[arg(long, allow_hyphen_values = true)]
    w_spread: Option<f64>,
    #[arg(long, allow_hyphen_values = true)]
    w_other: Option<f64>,
}

impl Tuning {
    fn cfg(&self) -> PlacementCfg {
        let d = PlacementCfg::default();
        PlacementCfg {
            restarts: self.restarts.unwrap_or(d.restarts),
            penalty_incs: self.penalty_incs.unwrap_or(d.penalty_incs),
            line_buffer: self.line_buffer.unwrap_or(d.line_buffer),
            w_spread: self.w_spread.unwrap_or(d.w_spread),
            w_other: self.w_other.unwrap_or(d.w_other),
        }
    }
}

fn main() -> Result<()> {
    SubscriberBuilder::default().with_target(false).init();
    let cmd = Cmd::parse();
    match cmd.action {
        Action::SpaceApart {
            input,
            clearance,
            lower,
            upper,
            out,
        } => space_apart_cmd(
            &input,
            clearance,
            SpacingBounds::new(lower, upper),
            &out,
            cmd.tag,
        ),
        Action::Place {
            input,
            seed,
            tuning,
            out,
        } => place_cmd(&input, seed, &tuning.cfg(), &out, cmd.tag),
        Action::Report => report(cmd.tag),
    }
}

fn space_apart_cmd(
    input: &Path,
    clearance: f64,
    bounds: SpacingBounds,
    out: &Path,
    tag: Option<String>,
) -> Result<()> {
    tracing::info!(input = %input.display(), clearance, tag = ?tag, "space-apart");
    let intervals = input::read_intervals(input)?;
    let positions = space_apart(&intervals, clearance, bounds).context("spacing solve")?;
    let offsets: Vec<f64> = positions
        .iter()
        .zip(&intervals)
        .map(|(x, iv)| x - iv.position)
        .collect();
    write_json(out, &json!({ "positions": positions, "offsets": offsets }))?;
    let payload = Payload::new(
        "space-apart",
        json!({
            "input": input.to_string_lossy(),
            "intervals": intervals.len(),
            "clearance": clearance,
            "lower": bounds.lower,
            "upper": bounds.upper,
        }),
    )
    .with_tag(tag);
    write_sidecar(out, payload)?;
    tracing::info!(intervals = intervals.len(), out = %out.display(), "space-apart done");
    Ok(())
}

fn place_cmd(
    input: &Path,
    seed: u64,
    cfg: &PlacementCfg,
    out: &Path,
    tag: Option<String>,
) -> Result<()> {
    tracing::info!(input = %input.display(), seed, cfg = ?cfg, tag = ?tag, "place");
    let problem = input::read_placement(input)?;
    let mut rng = StdRng::seed_from_u64(seed);
    let placed = place_labels_detailed(&problem.bbox, &problem.boxes, &problem.curves, cfg, &mut rng)
        .context("label placement")?;
    let positions: Vec<[f64; 2]> = placed.positions.iter().map(|p| [p.x, p.y]).collect();
    write_json(out, &json!({ "positions": positions, "loss": placed.loss }))?;
    let payload = Payload::new(
        "place",
        json!({
            "input": input.to_string_lossy(),
            "seed": seed,
            "restarts": cfg.restarts,
            "penalty_incs": cfg.penalty_incs,
            "line_buffer": cfg.line_buffer,
            "w_spread": cfg.w_spread,
            "w_other": cfg.w_other,
        }),
    )
    .with_tag(tag);
    write_sidecar(out, payload)?;
    tracing::info!(labels = positions.len(), loss = placed.loss, "place done");
    Ok(())
}

fn report(tag: Option<String>) -> Result<()> {
    let obj = json!({
        "code_rev": provenance::current_git_rev(),
        "chartlabel": chartlabel::VERSION,
        "tags": tag.into_iter().collect::<Vec<_>>(),
        "params": {},
        "outputs": []
    });
    println!("{}", serde_json::to_string_pretty(&obj)?);
    Ok(())
}

fn write_json(out: &Path, value: &serde_json::Value) -> Result<()> {
    if let Some(parent) = out.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating output dir {}", parent.display()))?;
        }
    }
    fs::write(out, serde_json::to_vec_pretty(value)?)
        .with_context(|| format!("writing {}", out.display()))
}
