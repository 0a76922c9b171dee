use std::io::{self, IsTerminal};
use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};

use dtk::config::KernelConfig;
use dtk::shell::{Shell, ShellOptions};
use dtk::{dlog, Kernel, Result};

/// DTK - a minimal task-dispatch kernel with an interactive shell
#[derive(Parser, Debug)]
#[command(name = "dtk")]
#[command(version, about, long_about = None)]
#[command(after_help = "ENVIRONMENT:\n    DTK_DEBUG=1     Enable debug logging (alternative to --debug)")]
pub struct Cli {
    /// Number of worker nodes (overrides the config file)
    #[arg(short = 'n', long)]
    pub nodes: Option<usize>,

    /// Work units completed per scheduler step (overrides the config file)
    #[arg(short = 'i', long)]
    pub increment: Option<u32>,

    /// Config file to use instead of ~/.dtk/dtk.toml
    #[arg(short = 'c', long)]
    pub config: Option<PathBuf>,

    /// Print `status` as JSON
    #[arg(long)]
    pub json: bool,

    /// Do not pause after dispatching a task
    #[arg(long)]
    pub no_pacing: bool,

    /// Enable debug logging (writes to ~/.dtk/dtk.log)
    #[arg(short = 'd', long)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Print the effective configuration as TOML
    Config,

    /// Write the effective configuration to the config file
    InitConfig,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    dtk::log::init_with_debug(cli.debug);

    let config_path = match &cli.config {
        Some(path) => path.clone(),
        None => KernelConfig::config_path()?,
    };
    let config = effective_config(&cli, &config_path)?;

    match cli.command {
        Some(Command::Config) => {
            print!("{}", toml::to_string_pretty(&config)?);
            return Ok(());
        }
        Some(Command::InitConfig) => {
            config.save_to(&config_path)?;
            println!("Wrote {}", config_path.display());
            return Ok(());
        }
        None => {}
    }

    dlog!(
        "DTK starting: nodes={}, increment={}",
        config.pool_size,
        config.progress_increment
    );

    let stdin = io::stdin();
    let stdout = io::stdout();
    let options = ShellOptions {
        color: stdout.is_terminal(),
        json: cli.json,
        pacing: if cli.no_pacing {
            Duration::ZERO
        } else {
            Duration::from_millis(config.dispatch_pacing_ms)
        },
        ..Default::default()
    };

    let kernel = Kernel::new(config)?;
    let mut shell = Shell::new(kernel, stdout.lock(), options);
    shell.run(stdin.lock())?;

    dlog!("DTK exiting");
    Ok(())
}

fn effective_config(cli: &Cli, path: &std::path::Path) -> Result<KernelConfig> {
    let mut config = KernelConfig::load_from(path)?;
    if let Some(nodes) = cli.nodes {
        config.pool_size = nodes;
    }
    if let Some(increment) = cli.increment {
        config.progress_increment = increment;
    }
    config.validate()?;
    Ok(config)
}
