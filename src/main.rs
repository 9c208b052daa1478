//! nginx-confgen command line.
//!
//! Loads a plan and an instance from disk and renders the nginx configuration
//! once (`render`), validates a plan's override blocks (`check`), or keeps the
//! output file up to date while the inputs change (`watch`).

use std::error::Error;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use nginx_confgen::config::loader::{load_instance, load_plan, write_atomically};
use nginx_confgen::config::watcher::InputWatcher;
use nginx_confgen::render::UnitCache;
use nginx_confgen::{Composer, ConfigurationData};

#[derive(Parser)]
#[command(name = "nginx-confgen")]
#[command(about = "Render nginx configuration from a plan and an instance", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render the configuration once
    Render {
        /// Plan file (TOML)
        #[arg(short, long)]
        plan: PathBuf,
        /// Instance file (TOML or JSON)
        #[arg(short, long)]
        instance: PathBuf,
        /// Write to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Compose a plan and report invalid override blocks
    Check {
        #[arg(short, long)]
        plan: PathBuf,
    },
    /// Re-render whenever the plan or instance file changes
    Watch {
        #[arg(short, long)]
        plan: PathBuf,
        #[arg(short, long)]
        instance: PathBuf,
        #[arg(short, long)]
        output: PathBuf,
    },
}

#[tokio::main]
async fn main() {
    // Logs go to stderr; stdout may carry the rendered configuration.
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "nginx_confgen=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    if let Err(e) = run(cli.command).await {
        tracing::error!("{}", e);
        std::process::exit(1);
    }
}

async fn run(command: Commands) -> Result<(), Box<dyn Error>> {
    let composer = Composer::new()?;

    match command {
        Commands::Render {
            plan,
            instance,
            output,
        } => {
            let cache = UnitCache::new(composer);
            let rendered = render_once(&cache, &plan, &instance)?;
            match output {
                Some(path) => {
                    write_atomically(&path, &rendered)?;
                    tracing::info!(output = ?path, "Configuration written");
                }
                None => print!("{}", rendered),
            }
        }
        Commands::Check { plan } => {
            let plan = load_plan(&plan)?;
            let unit = composer.compose_plan(&plan)?;
            tracing::info!(
                plan = %plan.name,
                overridden = ?unit.overridden(),
                "Plan composed successfully"
            );
        }
        Commands::Watch {
            plan,
            instance,
            output,
        } => {
            watch(UnitCache::new(composer), &plan, &instance, &output).await?;
        }
    }

    Ok(())
}

fn render_once(
    cache: &UnitCache,
    plan_path: &Path,
    instance_path: &Path,
) -> Result<String, Box<dyn Error>> {
    let plan = load_plan(plan_path)?;
    let instance = load_instance(instance_path)?;
    let unit = cache.get_or_compose(&plan)?;

    tracing::info!(
        plan = %plan.name,
        instance = %instance.name,
        locations = instance.locations.len(),
        replicas = instance.replicas.unwrap_or(0),
        "Rendering configuration"
    );

    Ok(unit.render(&ConfigurationData::new(&plan.config, &instance))?)
}

async fn watch(
    cache: UnitCache,
    plan: &Path,
    instance: &Path,
    output: &Path,
) -> Result<(), Box<dyn Error>> {
    let (watcher, mut updates) = InputWatcher::new(plan, instance);
    let _watcher = watcher.run()?;

    reconcile(&cache, plan, instance, output);

    loop {
        tokio::select! {
            Some(input) = updates.recv() => {
                tracing::debug!(?input, "Reconciling after input change");
                reconcile(&cache, plan, instance, output);
            }
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Shutdown signal received");
                break;
            }
        }
    }

    Ok(())
}

/// Render and persist; on any failure the previous output stays in place.
fn reconcile(cache: &UnitCache, plan: &Path, instance: &Path, output: &Path) {
    let result = render_once(cache, plan, instance)
        .and_then(|rendered| write_atomically(output, &rendered).map_err(Into::into));

    match result {
        Ok(()) => tracing::info!(output = ?output, "Configuration written"),
        Err(e) => tracing::error!("Failed to render configuration: {}. Keeping current output.", e),
    }
}
