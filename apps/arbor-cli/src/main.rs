use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, bail};
use arbor_common::Transform;
use arbor_grammar::{PRESETS, TreePreset};
use arbor_growth::{TreeConfig, TreePipeline};
use arbor_scene::{DebugTextRenderer, RecordingScene, SceneRenderer, write_scene_obj};
use clap::{Args, Parser, Subcommand};
use glam::Vec3;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "arbor-cli", about = "Procedural L-system trees, grown headlessly")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print version and crate info
    Info,
    /// List the built-in grammar presets
    Presets,
    /// Rewrite a grammar and print the resulting sequence
    Generate {
        #[command(flatten)]
        tree: TreeArgs,
        /// Print the length of every intermediate generation
        #[arg(long)]
        steps: bool,
        /// Print at most this many symbols of the sequence
        #[arg(long, default_value = "200")]
        max_symbols: usize,
    },
    /// Grow a tree to completion in a recording scene
    Grow {
        #[command(flatten)]
        tree: TreeArgs,
        /// Simulated frames per second
        #[arg(long, default_value = "60")]
        fps: f32,
        /// Tree origin
        #[arg(long, num_args = 3, value_names = ["X", "Y", "Z"], allow_negative_numbers = true)]
        origin: Option<Vec<f32>>,
        /// Write the branch meshes to a Wavefront OBJ file
        #[arg(long)]
        obj: Option<PathBuf>,
        /// Number of nodes listed in the scene summary
        #[arg(long, default_value = "12")]
        list: usize,
    },
}

#[derive(Args)]
struct TreeArgs {
    /// Grammar preset (maple, pine, fern, bonsai)
    #[arg(short, long)]
    preset: Option<String>,
    /// YAML or JSON tree configuration
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Override the number of rewriting passes
    #[arg(short, long)]
    iterations: Option<u32>,
    /// Fixed RNG seed for a reproducible tree
    #[arg(short, long)]
    seed: Option<u64>,
}

impl TreeArgs {
    fn resolve(&self) -> anyhow::Result<TreeConfig> {
        let mut config = match (&self.config, &self.preset) {
            (Some(path), _) => load_config(path)?,
            (None, Some(name)) => TreeConfig::from_preset(parse_preset(name)?),
            (None, None) => TreeConfig::default(),
        };
        if let (Some(_), Some(name)) = (&self.config, &self.preset) {
            config.grammar.preset = parse_preset(name)?;
        }
        if let Some(iterations) = self.iterations {
            config.grammar.iterations = Some(iterations);
        }
        if let Some(seed) = self.seed {
            config.seed = Some(seed);
        }
        Ok(config)
    }
}

fn parse_preset(name: &str) -> anyhow::Result<TreePreset> {
    match TreePreset::from_name(name) {
        Some(preset) => Ok(preset),
        None => bail!("unknown preset {name:?}; run `arbor-cli presets` for the list"),
    }
}

fn load_config(path: &Path) -> anyhow::Result<TreeConfig> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading config {}", path.display()))?;
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase();
    let config = match extension.as_str() {
        "yaml" | "yml" => serde_yaml::from_str(&text)
            .with_context(|| format!("parsing YAML config {}", path.display()))?,
        "json" => serde_json::from_str(&text)
            .with_context(|| format!("parsing JSON config {}", path.display()))?,
        other => bail!("unsupported config extension {other:?}, expected yaml, yml or json"),
    };
    tracing::debug!(path = %path.display(), "config loaded");
    Ok(config)
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    match cli.command {
        Commands::Info => {
            println!("arbor-cli v{}", env!("CARGO_PKG_VERSION"));
            println!("common: {}", arbor_common::crate_info());
            println!("grammar: {}", arbor_grammar::crate_info());
            println!("turtle: {}", arbor_turtle::crate_info());
            println!("mesh: {}", arbor_mesh::crate_info());
            println!("leaves: {}", arbor_leaves::crate_info());
            println!("scene: {}", arbor_scene::crate_info());
            println!("growth: {}", arbor_growth::crate_info());
        }
        Commands::Presets => {
            for def in PRESETS {
                let system = def.preset.lsystem();
                let rules: Vec<String> = def
                    .rules
                    .iter()
                    .map(|(symbol, replacement)| format!("{symbol}={replacement}"))
                    .collect();
                println!(
                    "{:<8} axiom={} rules=[{}] iterations={} symbols={}",
                    def.name,
                    def.axiom,
                    rules.join(", "),
                    def.iterations,
                    system.expanded_len(def.iterations)
                );
            }
        }
        Commands::Generate {
            tree,
            steps,
            max_symbols,
        } => {
            let pipeline = TreePipeline::new(tree.resolve()?)?;
            if steps {
                for (i, step) in pipeline.lsystem().generate_steps().iter().enumerate() {
                    println!("generation {i}: {} symbols", step.chars().count());
                }
            }
            let sequence = pipeline.generate();
            let shown: String = sequence.chars().take(max_symbols).collect();
            let total = sequence.chars().count();
            if total > max_symbols {
                println!("{shown}... ({total} symbols)");
            } else {
                println!("{shown}");
            }
        }
        Commands::Grow {
            tree,
            fps,
            origin,
            obj,
            list,
        } => {
            if !(fps > 0.0) {
                bail!("--fps must be positive, got {fps}");
            }
            let origin = match origin.as_deref() {
                Some(&[x, y, z]) => Vec3::new(x, y, z),
                _ => Vec3::ZERO,
            };

            let mut pipeline = TreePipeline::new(tree.resolve()?)?;
            let mut scene = RecordingScene::new();
            let mut growth = pipeline.grow(Transform::from_position(origin))?;
            let stats = growth.run_to_completion(1.0 / fps, &mut scene).clone();
            let draws = growth.leaves().submit(&mut scene);

            print!("{}", DebugTextRenderer::with_max_nodes(list).render(&scene));
            println!(
                "Grew {} branches (peak {} at once) and {} leaves in {} clusters",
                stats.branches_completed,
                stats.peak_active_branches,
                stats.leaves_spawned,
                stats.clusters_spawned
            );
            println!(
                "Simulated {:.2}s over {} frames, {} leaf batches, {} draws",
                stats.elapsed,
                stats.frames,
                growth.leaves().batch_count(),
                draws
            );

            if let Some(path) = obj {
                let file = File::create(&path)
                    .with_context(|| format!("creating {}", path.display()))?;
                let mut out = BufWriter::new(file);
                write_scene_obj(&scene, &mut out)
                    .and_then(|()| out.flush())
                    .with_context(|| format!("writing {}", path.display()))?;
                println!("Wrote {}", path.display());
            }
        }
    }

    Ok(())
}
