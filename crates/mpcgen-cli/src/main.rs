use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result, bail};
use clap::Parser;
use mpcgen_codegen::{Config, GeneratorSettings, ModelGenerator};
use mpcgen_core::{
    DofSelection, DynamicsModel, MoeDynamics, PendulumChain, ReducedModel, Symbol, Tape, assemble,
};

#[derive(Parser)]
#[command(
    name = "mpcgen",
    about = "Generate a reduced-order MPC model for a chosen set of joints"
)]
struct Cli {
    /// Generate a linearized model
    #[arg(short, long)]
    linear: bool,

    /// Active DOF indices (0-based), comma or space separated
    #[arg(short, long, num_args = 1..)]
    dof: Vec<String>,

    /// TOML config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Output directory (overrides MPCGEN_OUT_DIR and the config file)
    #[arg(long)]
    out_dir: Option<PathBuf>,

    /// Use an N-link pendulum chain instead of the exoskeleton
    #[arg(long, value_name = "N")]
    chain: Option<usize>,

    /// Plant user parameters, comma separated
    #[arg(long, value_delimiter = ',', allow_negative_numbers = true)]
    params: Option<Vec<f64>>,

    /// Enable verbose debug output
    #[arg(long)]
    verbose: bool,
}

fn init_tracing(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env().add_directive(tracing::Level::WARN.into())
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();
}

/// Flatten `["1,3"]`, `["1", "3"]` or `["1 3"]` into indices.
fn parse_dof(raw: &[String]) -> Result<Vec<usize>> {
    raw.iter()
        .flat_map(|s| s.split(|c: char| c == ',' || c.is_whitespace()))
        .filter(|t| !t.is_empty())
        .map(|t| t.parse::<usize>().with_context(|| format!("invalid DOF index '{t}'")))
        .collect()
}

fn load_config(cli: &Cli) -> Result<Config> {
    match &cli.config {
        Some(path) => Config::load(path)
            .with_context(|| format!("failed to load config {}", path.display())),
        None => Ok(Config::default()),
    }
}

fn build_plant(cli: &Cli, config: &Config) -> Result<Box<dyn DynamicsModel>> {
    let mut plant: Box<dyn DynamicsModel> = match cli.chain {
        Some(0) => bail!("--chain needs at least one link"),
        Some(links) => Box::new(PendulumChain::new(links)),
        None => Box::new(MoeDynamics::new()),
    };
    if let Some(params) = cli.params.as_ref().or(config.plant.user_params.as_ref()) {
        plant.set_user_params(params).context("failed to configure plant")?;
    }
    tracing::debug!("plant '{}' with {} DOF", plant.name(), plant.dof());
    Ok(plant)
}

fn symbol_list(symbols: &[Symbol]) -> String {
    let names: Vec<&str> = symbols.iter().map(|s| s.name()).collect();
    format!("[{}]", names.join(", "))
}

fn print_model(reduced: &ReducedModel) {
    let x: Vec<Symbol> = reduced.x.iter().filter_map(|e| e.as_symbol().cloned()).collect();
    let u: Vec<Symbol> = reduced.u.iter().filter_map(|e| e.as_symbol().cloned()).collect();
    println!("model: {}", reduced.params.name());
    println!("frozen: {}", symbol_list(&reduced.frozen));
    println!("x: {}", symbol_list(&x));
    println!("u: {}", symbol_list(&u));
    print!("{}", Tape::new(&reduced.x_dot).listing("x_dot"));
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let dof = parse_dof(&cli.dof)?;
    if dof.is_empty() {
        tracing::error!("must specify which DOF is being tested");
        return Ok(ExitCode::from(1));
    }

    let config = load_config(&cli)?;
    let plant = build_plant(&cli, &config)?;
    let selection = DofSelection::new(&dof, plant.dof()).context("invalid DOF selection")?;
    let options = config.model_options(plant.name(), cli.linear);
    let reduced =
        assemble(plant.as_ref(), &selection, &options).context("model reduction failed")?;
    print_model(&reduced);

    let settings = GeneratorSettings::from_config(&config, cli.out_dir.as_deref());
    let mut generator = ModelGenerator::new(settings);
    generator
        .create_model(&reduced.x, &reduced.x_dot, &reduced.u, &reduced.params)
        .context("failed to create model")?;
    generator.generate_c_code().context("failed to generate C code")?;
    let library = generator
        .compile_model()
        .await
        .context("failed to compile model")?;
    tracing::info!("model library at {}", library.display());

    println!("Finished generating models");
    Ok(ExitCode::SUCCESS)
}
