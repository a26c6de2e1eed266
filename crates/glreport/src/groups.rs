use std::path::PathBuf;

use colored::Colorize;
use glreport_core::summary::{summarize_hierarchy, Figures, GroupSummary};
use indicatif::{ProgressBar, ProgressStyle};

use crate::config::Connection;
use crate::prelude::{println, *};
use crate::provider::GitLabClient;

#[derive(Debug, clap::Args)]
pub struct Options {
    /// Report configuration file; only connection settings and the period are used
    #[arg(value_name = "CONFIG")]
    pub config: PathBuf,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,

    #[clap(flatten)]
    pub connection: Connection,
}

pub async fn run(options: Options, global: crate::Global) -> Result<()> {
    let config = crate::config::load(&options.config, options.connection)?;

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg}")
            .map_err(|e| eyre!("Invalid spinner template: {}", e))?,
    );
    spinner.enable_steady_tick(std::time::Duration::from_millis(100));

    let client = GitLabClient::new(&config)?;
    let fetched = async {
        let nodes = client.fetch_groups_and_projects(Some(&spinner)).await?;
        let issues = client
            .fetch_issues(config.period_from, config.period_to, Some(&spinner))
            .await?;
        Ok::<_, color_eyre::eyre::Report>((nodes, issues))
    }
    .await;
    spinner.finish_and_clear();
    let (nodes, issues) = fetched?;

    let summaries = summarize_hierarchy(&nodes, &issues);

    if options.json {
        let json = serde_json::to_string_pretty(&summaries)
            .map_err(|e| eyre!("Failed to serialize output: {}", e))?;
        println!("{}", json);
        return Ok(());
    }

    if summaries.is_empty() {
        println!("{}", "No groups found.".yellow());
        return Ok(());
    }

    let mut table = new_table();
    table.set_titles(prettytable::row![
        "Group / Project",
        "Issues",
        "Incidents",
        "Closed issues",
        "Closed incidents",
        "Avg. delay (days)"
    ]);
    for summary in &summaries {
        push_rows(&mut table, summary);
    }
    table.printstd();

    if global.verbose {
        println!(
            "\n{} group(s), {} issue(s) fetched",
            summaries.len(),
            issues.total()
        );
    }

    Ok(())
}

fn figure_cells(figures: &Figures) -> [String; 5] {
    [
        figures.issues.to_string(),
        figures.incidents.to_string(),
        figures.closed_issues.to_string(),
        figures.closed_incidents.to_string(),
        format!("{:.1}", figures.avg_delay),
    ]
}

fn push_rows(table: &mut prettytable::Table, summary: &GroupSummary) {
    let [issues, incidents, closed, closed_incidents, delay] = figure_cells(&summary.figures);
    table.add_row(prettytable::row![
        summary.name.bold(),
        issues,
        incidents,
        closed,
        closed_incidents,
        delay
    ]);

    for project in &summary.projects {
        let [issues, incidents, closed, closed_incidents, delay] = figure_cells(&project.figures);
        table.add_row(prettytable::row![
            format!("  {}", project.name),
            issues,
            incidents,
            closed,
            closed_incidents,
            delay
        ]);
    }
}
