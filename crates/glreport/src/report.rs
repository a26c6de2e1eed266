use std::path::PathBuf;

use chrono::NaiveDate;
use colored::Colorize;
use glreport_core::issues::Issues;
use glreport_core::report::Report;
use indicatif::{ProgressBar, ProgressStyle};

use crate::config::Connection;
use crate::export::{export_dump, Format};
use crate::prelude::{println, *};
use crate::provider::GitLabClient;

#[derive(Debug, clap::Args)]
pub struct Options {
    /// Report configuration file (JSON, or TOML with a `.toml` extension)
    #[arg(value_name = "CONFIG")]
    pub config: PathBuf,

    /// Directory the documents are written to
    #[arg(short, long, default_value = ".")]
    pub output_dir: PathBuf,

    /// File name prefix of the documents [default: %Y%m%d_Report]
    #[arg(short, long)]
    pub prefix: Option<String>,

    /// Output format; repeat to export several
    #[arg(short, long = "format", value_enum, default_values_t = [Format::Json])]
    pub formats: Vec<Format>,

    #[clap(flatten)]
    pub connection: Connection,
}

pub async fn run(options: Options, global: crate::Global) -> Result<()> {
    let config = crate::config::load(&options.config, options.connection)?;

    if !options.output_dir.is_dir() {
        return Err(eyre!(
            "Output directory {} does not exist",
            options.output_dir.display()
        ));
    }

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg}")
            .map_err(|e| eyre!("Invalid spinner template: {}", e))?,
    );
    spinner.enable_steady_tick(std::time::Duration::from_millis(100));

    let client = GitLabClient::new(&config)?;
    let issues = client
        .fetch_issues(config.period_from, config.period_to, Some(&spinner))
        .await;
    spinner.finish_and_clear();
    let issues = issues?;

    let mut report = Report::new(&config);
    report.load(&issues);
    let dump = report.dump()?;

    let (today, prefix) = document_date(&issues, options.prefix);

    for format in options.formats {
        let path = export_dump(&dump, format, &options.output_dir, &prefix, today)?;
        println!("{} {}", "Wrote".green().bold(), path.display());
    }

    if global.verbose {
        println!(
            "{} issue(s) across {} section(s)",
            report.total()?,
            dump.sections.len()
        );
    }

    Ok(())
}

/// Date closing an open period and the file prefix, both taken from the
/// instant overdue issues are measured against
fn document_date(issues: &Issues, prefix: Option<String>) -> (NaiveDate, String) {
    let now = issues.now();
    let prefix = prefix.unwrap_or_else(|| now.format("%Y%m%d_Report").to_string());
    (now.date_naive(), prefix)
}
