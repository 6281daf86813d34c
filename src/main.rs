use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, ValueEnum};
use trampoline::bundle::{Bundle, CACHE_ROOT_ENV};
use trampoline::config::BundleConfig;
use trampoline::mutator::{self, Mutator};
use trampoline::python;

#[derive(Parser, Debug)]
#[command(
    name = "trampoline",
    version,
    about = "Rewrite Python wheel tasks in a bundle into notebook trampolines",
    long_about = None
)]
struct Cli {
    /// Bundle root containing bundle.toml.
    #[arg(short = 'C', long = "bundle-root", value_name = "PATH", default_value = ".")]
    bundle_root: PathBuf,

    /// Deployment target, overriding `bundle.target`.
    #[arg(short, long)]
    target: Option<String>,

    /// Enable the python-wheel-wrapper experiment regardless of bundle.toml.
    #[arg(long)]
    python_wheel_wrapper: bool,

    /// Output format for the transformed configuration.
    #[arg(long, value_enum, default_value_t = OutputFormat::Toml)]
    format: OutputFormat,

    /// Show debug logs on stderr.
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum OutputFormat {
    Toml,
    Json,
}

fn main() {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .format_timestamp(None)
        .init();

    if let Err(e) = run(cli) {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let mut bundle = Bundle::load(&cli.bundle_root)?;

    if let Some(target) = cli.target {
        bundle.config.bundle.target = target;
    }
    if cli.python_wheel_wrapper {
        bundle.config.set_python_wheel_wrapper(true);
    }
    if let Some(cache_root) = std::env::var_os(CACHE_ROOT_ENV).filter(|v| !v.is_empty()) {
        log::debug!("Using cache root from {}", CACHE_ROOT_ENV);
        bundle = bundle.with_cache_root(cache_root);
    }

    let transform = python::transform_wheel_task();
    let mutators: [&dyn Mutator; 1] = [&transform];
    mutator::apply_all(&mut bundle, &mutators)?;

    println!("{}", render(&bundle.config, cli.format)?);
    Ok(())
}

fn render(config: &BundleConfig, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Toml => {
            toml::to_string(config).context("Failed to serialize configuration as TOML")
        }
        OutputFormat::Json => serde_json::to_string_pretty(config)
            .context("Failed to serialize configuration as JSON"),
    }
}
