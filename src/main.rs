use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use fission_core::{init_logging, init_logging_with_filter, Improvement, PlannerConfig};
use fission_data::ClassicSettings;
use fission_opt_lib::engine::{Engine, Session};
use fission_opt_lib::render;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Reactor model to optimize
    #[arg(short, long, value_enum, default_value = "classic")]
    model: Model,

    /// Settings file (TOML or JSON, chosen by extension)
    #[arg(short, long)]
    settings: Option<PathBuf>,

    /// Planner config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Strategy steps to run before printing the result
    #[arg(long, default_value_t = 1_000_000)]
    steps: u64,

    /// Overrides the seed of the config file
    #[arg(long)]
    seed: Option<u64>,

    /// Writes the best overhaul design as planner JSON
    #[arg(short, long)]
    export: Option<PathBuf>,

    /// Debug level logging
    #[arg(short, long)]
    verbose: bool,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum Model {
    Classic,
    Overhaul,
}

fn load_config(args: &Args) -> Result<PlannerConfig> {
    let mut config = match &args.config {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()))?;
            PlannerConfig::from_toml(&text)?
        }
        None => PlannerConfig::default(),
    };
    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    Ok(config)
}

fn build_engine(args: &Args, config: &PlannerConfig) -> Result<Engine> {
    let engine = match (args.model, &args.settings) {
        (Model::Classic, Some(path)) => {
            Engine::classic(&fission_io::load_classic_settings(path)?, config)?
        }
        (Model::Classic, None) => Engine::classic(&ClassicSettings::default(), config)?,
        (Model::Overhaul, Some(path)) => {
            Engine::overhaul(&fission_io::load_overhaul_settings(path)?, config)?
        }
        (Model::Overhaul, None) => {
            anyhow::bail!("the overhaul model needs a settings file with at least one fuel")
        }
    };
    Ok(engine)
}

fn print_best(engine: &Engine) {
    if let Some(best) = engine.best_classic() {
        println!("Best:");
        print!("{}", render::layers(&**best));
        print!("{}", render::classic_summary(best.metrics()));
    }
    if let Some(best) = engine.best_classic_no_net_heat() {
        println!("Best without net heat:");
        print!("{}", render::layers(&**best));
        print!("{}", render::classic_summary(best.metrics()));
    }
    if let Some(best) = engine.best_overhaul() {
        println!("Best:");
        print!("{}", render::layers(&**best));
        print!("{}", render::overhaul_summary(best.metrics()));
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    if args.verbose {
        init_logging_with_filter("debug");
    } else {
        init_logging();
    }

    let config = load_config(&args)?;
    let engine = build_engine(&args, &config)?;
    let mut session = Session::new(engine);

    let mut improvement = Improvement::None;
    while session.engine().steps() < args.steps {
        match session.run_tick() {
            Some(i) => improvement |= i,
            None => break,
        }
    }
    tracing::info!(
        steps = session.engine().steps(),
        improved = improvement.bits(),
        "Run finished"
    );

    print_best(session.engine());

    if let Some(path) = &args.export {
        let Some(best) = session.engine().best_overhaul() else {
            anyhow::bail!("--export only applies to the overhaul model");
        };
        let Some(trainer) = session.engine().as_staged_trainer() else {
            anyhow::bail!("--export only applies to the overhaul model");
        };
        let doc = fission_io::export_design(best, trainer.settings())
            .with_fingerprint(config.fingerprint());
        fission_io::write_json_file(&doc, path)
            .with_context(|| format!("writing {}", path.display()))?;
        println!("Exported to {}", path.display());
    }

    session.stop();
    Ok(())
}
