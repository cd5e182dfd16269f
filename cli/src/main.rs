use breadboard_common::db::core::LayoutDB;
use breadboard_common::db::request::LayoutFile;
use breadboard_common::util::config::Config;
use breadboard_common::util::profiler::ScopedTimer;
use breadboard_common::util::{check, generator, logger};
use breadboard_router::editor::Editor;
use breadboard_router::overlap;
use clap::{Parser, Subcommand};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(short, long, value_name = "FILE", default_value = "config.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Route every pending wire request in a layout file.
    Route {
        #[arg(long)]
        layout: Option<PathBuf>,
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Validate the stored wires of a layout file.
    Check {
        #[arg(long)]
        layout: Option<PathBuf>,
    },
    Generate {
        #[arg(long, default_value_t = 2)]
        boards: usize,
        #[arg(long, default_value_t = 6)]
        components: usize,
        #[arg(long, default_value_t = 20)]
        requests: usize,
        #[arg(long)]
        seed: Option<u64>,
        #[arg(long, default_value = "inputs/random.toml")]
        output: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    logger::init();
    let args = Args::parse();

    let config = if args.config.exists() {
        log::info!("Loading configuration from {:?}", args.config);
        let config_str = std::fs::read_to_string(&args.config)
            .map_err(|e| anyhow::anyhow!("Failed to read config file: {}", e))?;
        toml::from_str(&config_str)
            .map_err(|e| anyhow::anyhow!("Failed to parse config TOML: {}", e))?
    } else {
        log::warn!(
            "Configuration file {:?} not found. Using internal defaults.",
            args.config
        );
        Config::default()
    };

    let command = args.command.unwrap_or(Commands::Route {
        layout: None,
        output: None,
    });

    match command {
        Commands::Route { layout, output } => {
            let layout = layout.unwrap_or_else(|| PathBuf::from(&config.input.layout_file));
            let output = output.unwrap_or_else(|| PathBuf::from(&config.input.output_file));
            if run_routing(&config, &layout, &output).is_err() {
                std::process::exit(1);
            }
        }
        Commands::Check { layout } => {
            let layout = layout.unwrap_or_else(|| PathBuf::from(&config.input.output_file));
            let file = load_layout(&layout)?;
            if check::run(&file.layout).is_err() {
                std::process::exit(1);
            }
        }
        Commands::Generate {
            boards,
            components,
            requests,
            seed,
            output,
        } => {
            let mut rng = match seed {
                Some(seed) => StdRng::seed_from_u64(seed),
                None => StdRng::from_entropy(),
            };
            log::info!(
                "Generating random layout (Boards: {}, Components: {}, Requests: {})...",
                boards,
                components,
                requests
            );
            let file =
                generator::generate_layout(&mut rng, config.grid, boards, components, requests);
            save_layout(&file, &output)?;
            log::info!("Generated: {:?}", output);
        }
    }

    Ok(())
}

fn load_layout(path: &Path) -> anyhow::Result<LayoutFile> {
    if !path.exists() {
        return Err(anyhow::anyhow!("Layout file missing: {:?}", path));
    }
    log::info!("Parsing layout: {:?}", path);
    let text = std::fs::read_to_string(path)?;
    toml::from_str(&text).map_err(|e| anyhow::anyhow!("Invalid layout TOML in {:?}: {}", path, e))
}

fn save_layout(file: &LayoutFile, path: &Path) -> anyhow::Result<()> {
    prepare_output_dir(path)?;
    let text = toml::to_string_pretty(file)
        .map_err(|e| anyhow::anyhow!("Failed to serialize layout: {}", e))?;
    std::fs::write(path, text)?;
    Ok(())
}

fn prepare_output_dir(path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.exists() && !parent.as_os_str().is_empty() {
            log::info!("Creating output directory: {:?}", parent);
            std::fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}

fn run_routing(config: &Config, layout: &Path, output: &Path) -> anyhow::Result<()> {
    let LayoutFile { layout: db, requests } = load_layout(layout)?;
    log::info!(
        "Layout: {} boards, {} components, {} wires, {} requests",
        db.num_boards(),
        db.components.len(),
        db.num_wires(),
        requests.len()
    );

    let mut editor = Editor::new(db, &config.wiring);
    let mut failed = Vec::new();
    {
        let _timer = ScopedTimer::new(format!("Routing {} requests", requests.len()));
        for (i, req) in requests.iter().enumerate() {
            editor.begin_wire(req.start);
            match req.color {
                Some(color) => editor.set_color(color),
                None if i > 0 => {
                    editor.cycle_color();
                }
                None => {}
            }
            for &via in &req.via {
                if !editor.pin(via) {
                    log::warn!("Request {}: waypoint {} unreachable, skipped", i, via);
                }
            }
            if editor.commit(req.end, req.shifted).is_none() {
                log::error!("Request {}: no route {} -> {}", i, req.start, req.end);
                failed.push(req.clone());
            }
        }
    }

    log::info!(
        "Routed {}/{} requests",
        requests.len() - failed.len(),
        requests.len()
    );
    report_overlaps(editor.db(), config.wiring.offset_unit);

    let db = editor.into_db();
    let check_result = check::run(&db);

    log::info!("Writing routed layout to {:?}", output);
    save_layout(
        &LayoutFile {
            layout: db,
            requests: failed,
        },
        output,
    )?;

    check_result.map_err(|e| anyhow::anyhow!(e))
}

fn report_overlaps(db: &LayoutDB, unit: f64) {
    let _timer = ScopedTimer::new(format!("Overlap over {} wires", db.num_wires()));
    let offsets = overlap::disambiguate_all(&db.wires);

    let mut shared_points = 0;
    for wire in &db.wires {
        let Some(wire_offsets) = offsets.get(&wire.id) else {
            continue;
        };
        shared_points += wire_offsets.len();
        let widest = overlap::lane_shifts(&wire.path, wire_offsets, wire.shifted)
            .into_iter()
            .map(|s| {
                let (dx, dy) = s.scaled(unit);
                dx.abs().max(dy.abs())
            })
            .fold(0.0, f64::max);
        log::debug!(
            "Wire {} ({:?} {}): {} points, {} shared, widest shift {:.1}",
            wire.id,
            wire.color,
            wire.color.hex(),
            wire.path.len(),
            wire_offsets.len(),
            widest
        );
    }
    log::info!(
        "Overlap: {} shared points across {} wires",
        shared_points,
        db.num_wires()
    );
}
