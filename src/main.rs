use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use polyclimb::{
    canvas::Canvas,
    engine::Engine,
    models::drawing::Drawing,
    observer::SnapshotWriter,
    settings::Settings,
};
use rand::{rngs::StdRng, SeedableRng};
use tracing::info;

/// Approximates an image with alpha-blended polygons by greedy hill climbing.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Cli {
    /// Image to approximate
    input: Option<PathBuf>,

    /// JSON settings file; flags given here override it
    #[arg(long)]
    config: Option<PathBuf>,

    #[arg(long, visible_alias = "num-polygons", alias = "num_polygons")]
    polygons: Option<usize>,

    #[arg(
        long,
        visible_alias = "num-points",
        aliases = ["num_points", "num-points-per-polygon", "num_points_per_polygon"]
    )]
    points: Option<usize>,

    /// Number of generations to run
    #[arg(long, short = 'g', visible_alias = "generation-budget", alias = "generation_budget")]
    generations: Option<u64>,

    /// Stop after this many seconds even if generations remain
    #[arg(long, short = 't', visible_alias = "time-budget", alias = "time_budget")]
    time_limit: Option<f64>,

    /// Write a snapshot every N generations, 0 disables
    #[arg(long)]
    snapshot_interval: Option<u64>,

    #[arg(long)]
    snapshot_dir: Option<PathBuf>,

    /// Log progress every N generations
    #[arg(long)]
    progress_interval: Option<u64>,

    #[arg(long)]
    seed: Option<u64>,

    /// Save the best drawing here when the run ends (.json for JSON, raw records otherwise)
    #[arg(long)]
    dump: Option<PathBuf>,

    /// Start from a drawing saved by --dump
    #[arg(long)]
    resume: Option<PathBuf>,

    #[arg(long)]
    max_width: Option<u32>,

    #[arg(long)]
    max_height: Option<u32>,

    /// Mirror the canvas to a window (needs the `preview` feature)
    #[arg(long)]
    preview: bool,
}

impl Cli {
    fn into_settings(self) -> anyhow::Result<Settings> {
        let mut settings = match &self.config {
            Some(path) => Settings::from_file(path)
                .with_context(|| format!("reading settings from {}", path.display()))?,
            None => Settings::default(),
        };
        if let Some(v) = self.input {
            settings.input_path = v;
        }
        if let Some(v) = self.polygons {
            settings.num_polygons = v;
        }
        if let Some(v) = self.points {
            settings.num_points = v;
        }
        if let Some(v) = self.generations {
            settings.generation_budget = v;
        }
        if let Some(v) = self.time_limit {
            settings.time_budget_secs = Some(v);
        }
        if let Some(v) = self.snapshot_interval {
            settings.snapshot_interval = v;
        }
        if let Some(v) = self.snapshot_dir {
            settings.snapshot_dir = v;
        }
        if let Some(v) = self.progress_interval {
            settings.progress_interval = v;
        }
        if self.seed.is_some() {
            settings.seed = self.seed;
        }
        if self.dump.is_some() {
            settings.dump_path = self.dump;
        }
        if self.resume.is_some() {
            settings.resume_from = self.resume;
        }
        if self.max_width.is_some() {
            settings.max_width = self.max_width;
        }
        if self.max_height.is_some() {
            settings.max_height = self.max_height;
        }
        settings.show_live_preview |= self.preview;
        settings.validate()?;
        Ok(settings)
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().init();

    let settings = Cli::parse().into_settings()?;

    let goal = Canvas::load(&settings.input_path, settings.max_width, settings.max_height)?;
    info!(
        "loaded {} ({}x{})",
        settings.input_path.display(),
        goal.width(),
        goal.height()
    );

    let seed = settings.seed.unwrap_or_else(rand::random);
    info!("seed {}", seed);
    let rng = StdRng::seed_from_u64(seed);

    let mut engine = match &settings.resume_from {
        Some(path) => {
            let drawing = Drawing::load(path, settings.num_points)
                .with_context(|| format!("loading drawing from {}", path.display()))?;
            info!("resuming from {}", path.display());
            Engine::with_drawing(goal, &settings, drawing, rng)?
        }
        None => Engine::new(goal, &settings, rng)?,
    };

    if settings.snapshot_interval > 0 {
        engine.add_observer(Box::new(SnapshotWriter::new(
            settings.snapshot_dir.clone(),
            settings.snapshot_interval,
        )?));
    }
    if settings.show_live_preview {
        add_preview(&mut engine, &settings)?;
    }

    let summary = engine.run()?;
    println!("{:.6}", summary.fitness);

    if let Some(path) = &settings.dump_path {
        engine
            .best()
            .save(path)
            .with_context(|| format!("saving drawing to {}", path.display()))?;
        info!("saved best drawing to {}", path.display());
    }
    if settings.snapshot_interval > 0 {
        let path = settings.snapshot_dir.join("best.png");
        engine.render_best().save(&path)?;
        info!("saved best render to {}", path.display());
    }

    Ok(())
}

#[cfg(feature = "preview")]
fn add_preview(engine: &mut Engine, settings: &Settings) -> anyhow::Result<()> {
    let goal = engine.goal();
    let preview = polyclimb::observer::Preview::new(
        goal.width() as u32,
        goal.height() as u32,
        settings.preview_interval,
    )?;
    engine.add_observer(Box::new(preview));
    Ok(())
}

#[cfg(not(feature = "preview"))]
fn add_preview(_engine: &mut Engine, _settings: &Settings) -> anyhow::Result<()> {
    tracing::warn!("live preview requested but this build has no `preview` feature");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Settings {
        Cli::try_parse_from(args).unwrap().into_settings().unwrap()
    }

    #[test]
    fn short_and_option_spellings_agree() {
        let short = parse(&[
            "polyclimb",
            "in.png",
            "--polygons",
            "7",
            "--points",
            "4",
            "-g",
            "3",
            "-t",
            "1.5",
        ]);
        let long = parse(&[
            "polyclimb",
            "in.png",
            "--num-polygons",
            "7",
            "--num_points_per_polygon",
            "4",
            "--generation_budget",
            "3",
            "--time-budget",
            "1.5",
        ]);
        assert_eq!(short, long);
        assert_eq!(long.num_polygons, 7);
        assert_eq!(long.num_points, 4);
        assert_eq!(long.generation_budget, 3);
        assert_eq!(long.time_budget_secs, Some(1.5));
    }

    #[test]
    fn oversized_time_budget_is_rejected() {
        let cli = Cli::try_parse_from(["polyclimb", "--time-limit", "1e30"]).unwrap();
        assert!(cli.into_settings().is_err());
    }
}
