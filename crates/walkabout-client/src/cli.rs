use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "walkabout", version, about = "Walkabout - first-person walkthrough viewer")]
pub struct CliArgs {
    /// Subcommand (view, replay). Defaults to view.
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Path to walkabout.yaml (otherwise searched upward from the working directory)
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// Path to the scene YAML file
    #[arg(long, global = true)]
    pub scene: Option<String>,

    /// Print the resolved settings and exit without opening a window
    #[arg(long, global = true)]
    pub dry_run: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Open the walkthrough viewer
    View {
        /// Start in first-person instead of the configured mode
        #[arg(long)]
        first_person: bool,
    },
    /// Run an input script headlessly and print a JSON report
    Replay {
        /// Replay script (YAML)
        script: String,
    },
}
