//! `pox`: a Composer-compatible dependency resolver, as a CLI.

mod command;

use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};

use command::{install, remove, update};

#[derive(Parser, Debug)]
#[command(name = "pox")]
#[command(about = "Composer-compatible dependency resolver")]
struct Args {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Install dependencies from composer.json, honoring composer.lock when present.
    Install(install::InstallArgs),
    /// Update dependencies to the newest versions allowed by composer.json.
    Update(update::UpdateArgs),
    /// Remove a package and re-resolve the remaining dependency set.
    Remove(remove::RemoveArgs),
}

fn run() -> Result<i32> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args = Args::parse();
    log::debug!("dispatching {:?}", args.command);
    match args.command {
        Commands::Install(a) => install::execute(a),
        Commands::Update(a) => update::execute(a),
        Commands::Remove(a) => remove::execute(a),
    }
}

fn main() -> ExitCode {
    match run() {
        Ok(code) => ExitCode::from(code as u8),
        Err(e) => {
            eprintln!("Error: {}", e);
            for cause in e.chain().skip(1) {
                eprintln!("  Caused by: {}", cause);
            }
            ExitCode::FAILURE
        }
    }
}
