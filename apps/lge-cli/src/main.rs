mod script;

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, bail};
use clap::{Parser, Subcommand, ValueEnum};
use lge_damage::{DEFAULT_TILE_SIZE, DamageStrategy};
use lge_engine::{Engine, EngineConfig};
use lge_render::{Canvas, RecordingBackend};
use lge_scene::Placement;
use tracing_subscriber::EnvFilter;

use crate::script::Script;

#[derive(Parser)]
#[command(name = "lge-cli", about = "CLI for the display engine")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Engine config JSON file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Override the damage strategy
    #[arg(long, global = true)]
    strategy: Option<StrategyArg>,

    /// Override the tile size of the tile strategy
    #[arg(long, global = true)]
    tile_size: Option<u32>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum StrategyArg {
    Tiles,
    Rects,
}

#[derive(Subcommand)]
enum Commands {
    /// Print crate versions and the resolved config
    Info,
    /// Spin a lit cube over a moving circle and report blit statistics
    Demo {
        /// Number of frames to render
        #[arg(short, long, default_value = "120")]
        frames: u32,
    },
    /// Convert an OBJ file to a normalized mesh JSON file
    Convert { input: PathBuf, output: PathBuf },
    /// Run a JSON frame script through the engine
    Run {
        script: PathBuf,
        /// Record draw calls and print them after each frame
        #[arg(long)]
        record: bool,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    let config = resolve_config(&cli)?;

    match cli.command {
        Commands::Info => {
            println!("lge-cli v{}", env!("CARGO_PKG_VERSION"));
            println!("render: {}", lge_render::crate_info());
            println!("damage: {}", lge_damage::crate_info());
            println!("scene: {}", lge_scene::crate_info());
            println!("assets: {}", lge_assets::crate_info());
            println!("engine: {}", lge_engine::crate_info());
            println!("config: {}", serde_json::to_string_pretty(&config)?);
        }
        Commands::Demo { frames } => {
            let strategies = if cli.strategy.is_some() {
                vec![config.damage]
            } else {
                vec![
                    DamageStrategy::Rects,
                    DamageStrategy::Tiles {
                        tile_size: cli.tile_size.unwrap_or(DEFAULT_TILE_SIZE),
                    },
                ]
            };
            let full_frame = config.screen().area() * frames as u64;
            println!(
                "Demo: {}x{}, {frames} frames",
                config.width, config.height
            );
            for damage in strategies {
                let stats = run_demo(&EngineConfig { damage, ..config.clone() }, frames)?;
                println!(
                    "  {:5}: {} blits, {} pixels ({:.1}% of full frames), avg present {:?}",
                    stats.strategy,
                    stats.blits,
                    stats.pixels,
                    100.0 * stats.pixels as f64 / full_frame.max(1) as f64,
                    stats.avg_present
                );
            }
            println!("Display matched back buffer on every frame: OK");
        }
        Commands::Convert { input, output } => {
            let text = std::fs::read_to_string(&input)
                .with_context(|| format!("reading {}", input.display()))?;
            let mut mesh = lge_assets::import_obj(&text)
                .with_context(|| format!("importing {}", input.display()))?;
            mesh.normalize();
            mesh.save(&output)
                .with_context(|| format!("writing {}", output.display()))?;
            println!(
                "Wrote {} ({} vertices, {} triangles)",
                output.display(),
                mesh.vertex_count(),
                mesh.face_count()
            );
        }
        Commands::Run { script, record } => {
            let script = Script::load(&script)?;
            let summary = if record {
                let mut engine = Engine::new(RecordingBackend::new(config.screen()), &config);
                script.run(&mut engine, |n, e| {
                    println!("--- frame {n} ---");
                    print!("{}", e.backend().dump());
                    e.backend_mut().take_commands();
                })?
            } else {
                let mut engine = Engine::new(Canvas::new(config.screen()), &config);
                let summary = script.run(&mut engine, |_, _| {})?;
                if !engine.backend().display_matches() {
                    bail!(
                        "display out of sync with back buffer: {} stale pixels",
                        engine.backend().stale_pixels()
                    );
                }
                summary
            };
            println!(
                "Ran {} frames, {} calls: {} rects, {} pixels blitted",
                summary.frames, summary.calls, summary.rects, summary.pixels
            );
        }
    }

    Ok(())
}

/// Config file (or defaults) with command-line overrides applied.
fn resolve_config(cli: &Cli) -> anyhow::Result<EngineConfig> {
    let mut config = match &cli.config {
        Some(path) => EngineConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => EngineConfig::default(),
    };
    let current_tile = match config.damage {
        DamageStrategy::Tiles { tile_size } => Some(tile_size),
        DamageStrategy::Rects => None,
    };
    config.damage = match (cli.strategy, cli.tile_size) {
        (Some(StrategyArg::Rects), _) => DamageStrategy::Rects,
        (Some(StrategyArg::Tiles), size) => DamageStrategy::Tiles {
            tile_size: size.or(current_tile).unwrap_or(DEFAULT_TILE_SIZE),
        },
        (None, Some(size)) if current_tile.is_some() => DamageStrategy::Tiles { tile_size: size },
        (None, Some(_)) => {
            tracing::warn!("--tile-size ignored: configured strategy is rects");
            config.damage
        }
        (None, None) => config.damage,
    };
    Ok(config)
}

struct DemoStats {
    strategy: &'static str,
    blits: usize,
    pixels: u64,
    avg_present: Duration,
}

fn run_demo(config: &EngineConfig, frames: u32) -> anyhow::Result<DemoStats> {
    let mut engine = Engine::new(Canvas::new(config.screen()), config);
    engine.set_3d_light(0.4, -0.6, -1.0, 0.25, 0.75);
    let cube = engine.create_3d_model_from(&lge_assets::unit_cube());
    let palette = ["#e04040", "#40e040", "#4040e0", "#e0e040", "#40e0e0", "#e040e0"];
    let colors: Vec<&str> = palette.iter().flat_map(|c| [*c, *c]).collect();
    let cube = engine.create_3d_instance(cube, colors.as_slice())?;

    let (width, height) = engine.get_canvas_size();
    let (w, h) = (width as i32, height as i32);
    for frame in 0..frames {
        let t = frame as f32;
        engine.clear_canvas("#000000");
        engine.draw_circle((frame as i32 * 3) % w.max(1), h * 3 / 4, 12, "#ffa000");
        engine.draw_text(4, 4, &format!("frame {frame}"), "#ffffff");
        engine.draw_3d_instance(
            cube,
            &Placement::new(0.0, 0.0, 100.0, 40.0, t * 0.03, t * 0.05, t * 0.01),
        );
        engine.present();
        if !engine.backend().display_matches() {
            bail!(
                "{}: frame {frame} left {} stale pixels",
                engine.damage_strategy(),
                engine.backend().stale_pixels()
            );
        }
    }

    let stats = engine.backend().stats();
    Ok(DemoStats {
        strategy: engine.damage_strategy(),
        blits: stats.blits,
        pixels: stats.pixels,
        avg_present: engine.frame_timer().average(),
    })
}
