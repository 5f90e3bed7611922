mod cli;
mod commands;
mod config;
mod engine;
mod paths;
mod progress;
mod resource;
mod state;
mod ui;

use anyhow::Result;
use clap::{CommandFactory, Parser};
use clap_complete::generate;
use cli::{Cli, Command};
use std::io;
use std::path::PathBuf;

/// Global context for the application
pub struct Context {
    pub quiet: bool,
    pub config_path: Option<PathBuf>,
    pub state_path: Option<PathBuf>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    let log_level = match cli.verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };

    env_logger::Builder::new()
        .filter_level(if cli.quiet {
            log::LevelFilter::Error
        } else {
            log_level
        })
        .format_timestamp(None)
        .init();

    let ctx = Context {
        quiet: cli.quiet,
        config_path: cli.config.map(|p| paths::expand(&p.to_string_lossy())),
        state_path: cli.state.map(|p| paths::expand(&p.to_string_lossy())),
    };

    let result = match cli.command {
        Command::Plan(args) => commands::declarative::plan(&ctx, args.target.as_deref()),
        Command::Apply(args) => commands::declarative::apply(
            &ctx,
            args.target.as_deref(),
            args.dry_run,
            args.yes,
            args.jobs,
        ),
        Command::Refresh => commands::declarative::refresh(&ctx),
        Command::Import { address, id } => commands::import::run(&ctx, &address, &id),
        Command::Destroy(args) => {
            commands::declarative::destroy(&ctx, args.target.as_deref(), args.yes)
        }
        Command::Show { json } => commands::show::run(&ctx, json),
        Command::Completions { shell } => {
            let mut cmd = Cli::command();
            generate(shell, &mut cmd, "blogctl", &mut io::stdout());
            Ok(())
        }
    };

    if let Err(err) = &result {
        print_advice(err);
    }
    result
}

/// Point at a fix when the failure came from the item service
fn print_advice(err: &anyhow::Error) {
    if let Some(api_err) = err
        .chain()
        .find_map(|cause| cause.downcast_ref::<blogapi::Error>())
    {
        let category = api_err.category();
        eprintln!("{}: {}", category, category.advice());
    }
}
