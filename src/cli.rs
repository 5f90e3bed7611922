use clap::{Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "blogctl")]
#[command(version)]
#[command(about = "Declaratively manage items on a blog service", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Config file (default: ~/.config/blogctl/config.toml)
    #[arg(long, global = true, env = "BLOGCTL_CONFIG")]
    pub config: Option<PathBuf>,

    /// State file (default: ~/.local/state/blogctl/state.toml)
    #[arg(long, global = true, env = "BLOGCTL_STATE")]
    pub state: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Show what apply would change
    Plan(PlanArgs),

    /// Make the service match the config
    Apply(ApplyArgs),

    /// Re-read every tracked item and record drift
    Refresh,

    /// Start tracking an item that already exists
    Import {
        /// Config address to track the item under
        address: String,

        /// Identifier (name) of the existing item
        id: String,
    },

    /// Delete tracked items
    Destroy(DestroyArgs),

    /// Print tracked state
    Show {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Parser)]
pub struct PlanArgs {
    /// Limit to a resource type or address (e.g. blog_item.first_post)
    pub target: Option<String>,
}

#[derive(Parser)]
pub struct ApplyArgs {
    /// Limit to a resource type or address (e.g. blog_item.first_post)
    pub target: Option<String>,

    /// Dry run - show what would be done
    #[arg(short, long)]
    pub dry_run: bool,

    /// Skip the confirmation prompt
    #[arg(short, long)]
    pub yes: bool,

    /// Number of parallel jobs
    #[arg(short, long, default_value = "4")]
    pub jobs: usize,
}

#[derive(Parser)]
pub struct DestroyArgs {
    /// Limit to a resource type or address (e.g. blog_item.first_post)
    pub target: Option<String>,

    /// Skip the confirmation prompt
    #[arg(short, long)]
    pub yes: bool,
}
