//! Command handlers for Matrix Stats CLI
//!
//! This module implements the command handlers that connect parsed CLI
//! arguments and the loaded configuration to the core application.

use std::fmt::Write as _;
use std::sync::Arc;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info};

use crate::app::capability::CapabilityColumn;
use crate::app::signals::shutdown_signal;
use crate::app::table::write_row;
use crate::app::{
    build_fetcher, ComparisonView, ParsedTable, RefreshOutcome, StatsConfig, StatsPipeline,
    StatsPoller, StatsSnapshot,
};
use crate::cli::{
    ColumnsArgs, ConfigAction, ConfigArgs, OutputFormat, StatsArgs, TableArgs, WatchArgs,
};
use crate::config::AppConfig;
use crate::errors::{AppError, Result, TableError};

/// Handle the table command
///
/// Loads the matrix, applies the search term and hidden columns, and prints
/// each surviving feature with its support ratio.
pub async fn handle_table(args: TableArgs, config: &AppConfig) -> Result<()> {
    let table = ParsedTable::from_path(&args.file).await?;
    info!(
        "Loaded {} features from {}",
        table.rows.len(),
        args.file.display()
    );

    let hidden = hidden_columns(config, &args.hidden);
    let reconciler = config.table.to_runtime_config();
    let view = ComparisonView::build(&table, &args.search, &hidden, &reconciler);
    debug!(
        "{} of {} rows visible with search {:?}",
        view.len(),
        table.rows.len(),
        args.search
    );

    let output = match args.format {
        OutputFormat::Text => render_text(&view),
        OutputFormat::Csv => render_csv(&view),
        OutputFormat::Json => serde_json::to_string_pretty(&view).map_err(TableError::from)?,
    };
    print!("{}", output);
    if args.format == OutputFormat::Json {
        println!();
    }

    Ok(())
}

/// Handle the columns command
pub async fn handle_columns(args: ColumnsArgs, config: &AppConfig) -> Result<()> {
    let table = ParsedTable::from_path(&args.file).await?;
    let reconciler = config.table.to_runtime_config();
    let columns = reconciler.describe_columns(&table.headers);

    print!("{}", render_columns(&columns, &config.table.hidden_columns));
    Ok(())
}

/// Handle the stats command
///
/// Runs a single refresh cycle and prints the summary and recent history.
pub async fn handle_stats(args: StatsArgs, config: &AppConfig) -> Result<()> {
    let stats_config = stats_config(config, args.slug.as_deref(), None);
    let pipeline = build_pipeline(config, &stats_config)?;

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.set_message(format!("Fetching statistics for {}...", stats_config.slug));
    spinner.enable_steady_tick(Duration::from_millis(120));

    let outcome = pipeline.refresh(false).await;
    spinner.finish_and_clear();

    if outcome == RefreshOutcome::SummaryFailed {
        return Err(AppError::generic(format!(
            "Unable to fetch download statistics for {}",
            stats_config.slug
        )));
    }

    print!(
        "{}",
        render_snapshot(&stats_config.slug, &pipeline.snapshot(), args.history)
    );
    Ok(())
}

/// Handle the watch command
///
/// Polls until CTRL-C or SIGTERM, printing a line for every published
/// snapshot.
pub async fn handle_watch(args: WatchArgs, config: &AppConfig) -> Result<()> {
    args.validate().map_err(AppError::generic)?;

    let stats_config = stats_config(config, args.slug.as_deref(), args.interval);
    let pipeline = Arc::new(build_pipeline(config, &stats_config)?);
    let mut updates = pipeline.subscribe();

    println!(
        "Watching {} every {} (Ctrl+C to stop)",
        stats_config.slug,
        humantime_serde::re::humantime::format_duration(stats_config.poll_interval)
    );

    let poller = StatsPoller::spawn(pipeline.clone(), stats_config.poll_interval);
    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
                let snapshot = updates.borrow_and_update().clone();
                if let Some(line) = render_watch_line(&snapshot) {
                    println!("{}", line);
                }
            }
            _ = &mut shutdown => {
                info!("Stopping statistics watch");
                break;
            }
        }
    }

    poller.cancel().await;
    Ok(())
}

/// Handle configuration management
pub async fn handle_config(args: ConfigArgs, config: &AppConfig) -> Result<()> {
    match args.action {
        ConfigAction::Show => {
            print!("{}", config.to_toml()?);
        }
        ConfigAction::Init { path } => {
            let path = match path {
                Some(path) => path,
                None => AppConfig::get_default_config_path()?,
            };
            if AppConfig::write_default_config(&path).await? {
                println!("Created configuration file: {}", path.display());
            } else {
                println!("Configuration file already exists: {}", path.display());
            }
        }
    }
    Ok(())
}

fn hidden_columns(config: &AppConfig, extra: &[String]) -> Vec<String> {
    let mut hidden = config.table.hidden_columns.clone();
    for column in extra {
        if !hidden.contains(column) {
            hidden.push(column.clone());
        }
    }
    hidden
}

fn stats_config(config: &AppConfig, slug: Option<&str>, interval: Option<Duration>) -> StatsConfig {
    let mut stats_config = config.stats.to_runtime_config();
    if let Some(slug) = slug {
        stats_config = stats_config.with_slug(slug);
    }
    if let Some(interval) = interval {
        stats_config = stats_config.with_poll_interval(interval);
    }
    stats_config
}

fn build_pipeline(config: &AppConfig, stats_config: &StatsConfig) -> Result<StatsPipeline> {
    let fetcher = build_fetcher(
        &config.client.to_runtime_config(),
        stats_config.relay_chain(),
    )?;
    Ok(StatsPipeline::new(fetcher, stats_config)?)
}

/// Render the view as an aligned text table followed by the feature count
pub fn render_text(view: &ComparisonView) -> String {
    let mut header = vec!["Feature".to_string()];
    header.extend(view.columns.iter().cloned());
    header.push("Free / Pro".to_string());

    let body: Vec<Vec<String>> = view
        .rows
        .iter()
        .map(|row| {
            let mut line = vec![row.feature.clone()];
            line.extend(row.cells.iter().cloned());
            line.push(row.ratio.to_string());
            line
        })
        .collect();

    let mut widths: Vec<usize> = header.iter().map(|h| h.chars().count()).collect();
    for line in &body {
        for (width, cell) in widths.iter_mut().zip(line) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    for line in std::iter::once(&header).chain(body.iter()) {
        let cells: Vec<String> = line
            .iter()
            .zip(&widths)
            .map(|(cell, &width)| pad(cell, width))
            .collect();
        let _ = writeln!(out, "{}", cells.join("  ").trim_end());
    }
    let _ = writeln!(
        out,
        "\nShowing {} features ({} columns visible)",
        view.len(),
        view.visibility
    );
    out
}

fn pad(cell: &str, width: usize) -> String {
    let fill = width.saturating_sub(cell.chars().count());
    format!("{}{}", cell, " ".repeat(fill))
}

/// Render the view as CSV with trailing free/pro counts
pub fn render_csv(view: &ComparisonView) -> String {
    let mut header = vec!["Feature".to_string(), "Description".to_string()];
    header.extend(view.columns.iter().cloned());
    header.push("Free".to_string());
    header.push("Pro".to_string());

    let mut out = write_row(&header);
    out.push('\n');
    for row in &view.rows {
        let mut fields = vec![row.feature.clone(), row.description.clone()];
        fields.extend(row.cells.iter().cloned());
        fields.push(row.ratio.free.to_string());
        fields.push(row.ratio.pro.to_string());
        out.push_str(&write_row(&fields));
        out.push('\n');
    }
    out
}

fn render_columns(columns: &[CapabilityColumn], hidden: &[String]) -> String {
    let mut out = String::new();
    for column in columns {
        let marker = if hidden.contains(&column.header) {
            " (hidden)"
        } else {
            ""
        };
        let _ = writeln!(
            out,
            "{:>3}  {:<32} {} [{}]{}",
            column.index, column.header, column.product, column.variant, marker
        );
    }
    out
}

fn render_snapshot(slug: &str, snapshot: &StatsSnapshot, history_tail: usize) -> String {
    let mut out = String::new();
    let Some(stats) = &snapshot.stats else {
        let _ = writeln!(out, "{}: no statistics available", slug);
        return out;
    };

    let _ = writeln!(out, "Plugin:          {}", slug);
    let _ = writeln!(out, "Total downloads: {}", stats.total_downloads);
    let _ = writeln!(out, "Today:           {}", stats.today);
    let _ = writeln!(
        out,
        "Last updated:    {}",
        stats.last_updated.format("%Y-%m-%d %H:%M:%S UTC")
    );

    if history_tail > 0 && !snapshot.history.is_empty() {
        let _ = writeln!(out, "\nRecent downloads:");
        let start = snapshot.history.len().saturating_sub(history_tail);
        for point in &snapshot.history[start..] {
            let note = if point.synthetic { "  (today)" } else { "" };
            let _ = writeln!(out, "  {}  {:>8}{}", point.date, point.downloads, note);
        }
    }
    out
}

fn render_watch_line(snapshot: &StatsSnapshot) -> Option<String> {
    let stats = snapshot.stats.as_ref()?;
    Some(format!(
        "[{}] total {} | today {} | {} days of history",
        stats.last_updated.format("%H:%M:%S"),
        stats.total_downloads,
        stats.today,
        snapshot.history.iter().filter(|p| !p.synthetic).count()
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::{parse, DownloadStats, HistoryPoint, ReconcilerConfig};
    use chrono::{NaiveDate, TimeZone, Utc};

    const MATRIX: &str = "Feature,Description,CampaignBay,Acme Free,Acme Pro\n\
                          Coupons,\"Discounts, codes\",✅,✅,✅\n\
                          Bundles,Buy together,✅,❌,✅\n\
                          Gifts,Free items,❌,❌,❌\n";

    fn view(search: &str) -> ComparisonView {
        ComparisonView::build(&parse(MATRIX), search, &[], &ReconcilerConfig::default())
    }

    #[test]
    fn test_render_text() {
        let text = render_text(&view(""));
        let lines: Vec<&str> = text.lines().collect();

        assert!(lines[0].starts_with("Feature"));
        assert!(lines[0].ends_with("Free / Pro"));
        assert!(lines[1].starts_with("Coupons"));
        assert!(lines[1].ends_with("1 / 0"));
        assert!(lines[2].ends_with("0 / 1"));
        assert!(text.contains("Showing 2 features (3/3 columns visible)"));
        assert!(!text.contains("Gifts"));
    }

    #[test]
    fn test_render_csv_reparses() {
        let csv = render_csv(&view("coupon"));
        let reparsed = parse(&csv);

        assert_eq!(
            reparsed.headers,
            vec![
                "Feature",
                "Description",
                "CampaignBay",
                "Acme Free",
                "Acme Pro",
                "Free",
                "Pro"
            ]
        );
        assert_eq!(reparsed.rows.len(), 1);
        assert_eq!(reparsed.rows[0][1], "Discounts, codes");
        assert_eq!(reparsed.rows[0][5], "1");
        assert_eq!(reparsed.rows[0][6], "0");
    }

    #[test]
    fn test_hidden_columns_merge() {
        let mut config = AppConfig::default();
        config.table.hidden_columns = vec!["Acme Pro".to_string()];

        let hidden = hidden_columns(
            &config,
            &["Acme Pro".to_string(), "Acme Free".to_string()],
        );
        assert_eq!(hidden, vec!["Acme Pro", "Acme Free"]);
    }

    #[test]
    fn test_stats_config_overrides() {
        let config = AppConfig::default();
        let stats = stats_config(&config, Some("other"), Some(Duration::from_secs(30)));
        assert_eq!(stats.slug, "other");
        assert_eq!(stats.poll_interval, Duration::from_secs(30));

        let unchanged = stats_config(&config, None, None);
        assert_eq!(unchanged, config.stats.to_runtime_config());
    }

    #[test]
    fn test_render_columns() {
        let config = ReconcilerConfig::default();
        let headers: Vec<String> = parse(MATRIX).headers;
        let columns = config.describe_columns(&headers);
        let text = render_columns(&columns, &["Acme Pro".to_string()]);

        assert_eq!(text.lines().count(), 2);
        assert!(text.contains("Acme [free]"));
        assert!(text.contains("Acme [pro] (hidden)"));
    }

    #[test]
    fn test_render_snapshot() {
        let date = |d| NaiveDate::from_ymd_opt(2024, 5, d).unwrap();
        let mut synthetic = HistoryPoint::new(date(3), 4);
        synthetic.synthetic = true;
        let snapshot = StatsSnapshot {
            stats: Some(DownloadStats {
                total_downloads: 1234,
                today: 4,
                last_updated: Utc.with_ymd_and_hms(2024, 5, 3, 12, 0, 0).unwrap(),
            }),
            history: vec![
                HistoryPoint::new(date(1), 8),
                HistoryPoint::new(date(2), 10),
                synthetic,
            ],
            loading: false,
        };

        let text = render_snapshot("campaignbay", &snapshot, 2);
        assert!(text.contains("Total downloads: 1234"));
        assert!(!text.contains("2024-05-01"));
        assert!(text.contains("2024-05-02"));
        assert!(text.contains("(today)"));

        let line = render_watch_line(&snapshot).unwrap();
        assert!(line.contains("total 1234"));
        assert!(line.contains("2 days of history"));

        assert!(render_watch_line(&StatsSnapshot::default()).is_none());
        assert!(render_snapshot("x", &StatsSnapshot::default(), 3).contains("no statistics"));
    }
}
