use crate::prelude::*;
use clap::Parser;

mod config;
mod error;
mod export;
mod groups;
mod prelude;
mod provider;
mod report;

#[derive(Debug, clap::Parser)]
#[command(
    author,
    version,
    about,
    long_about = "Filter, group and export GitLab issues as periodic reports"
)]
pub struct App {
    #[command(subcommand)]
    pub command: SubCommands,

    #[clap(flatten)]
    global: Global,
}

#[derive(Debug, Clone, clap::Args)]
pub struct Global {
    /// Whether to display additional information.
    #[clap(long, env = "GLREPORT_VERBOSE", global = true, default_value = "false")]
    verbose: bool,
}

#[derive(Debug, clap::Parser)]
pub enum SubCommands {
    /// Build the report described by a configuration file and export it
    Report(crate::report::Options),

    /// Print issue figures for every accessible group and its projects
    Groups(crate::groups::Options),
}

#[tokio::main]
async fn main() -> Result<()> {
    let app = App::parse();

    let level = if app.global.verbose {
        log::LevelFilter::Info
    } else {
        log::LevelFilter::Warn
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();
    color_eyre::install()?;

    match app.command {
        SubCommands::Report(options) => crate::report::run(options, app.global).await,
        SubCommands::Groups(options) => crate::groups::run(options, app.global).await,
    }
}
