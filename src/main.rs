mod analyzer;
mod api;
mod auth;
mod cli;
mod config;
mod dataset;
mod export;
mod source;
mod store;

use crate::analyzer::range::{self, RangeRequest, Window};
use crate::analyzer::report::render_markdown;
use crate::auth::AuthGate;
use crate::cli::login::run_login;
use crate::cli::{Cli, Commands, ConfigCommands, OutputFormat, RangeArgs};
use crate::config::Config;
use crate::dataset::HistoricalReport;
use crate::store::{LoadState, SharedStore};
use anyhow::{Context, Result, bail};
use chrono::Datelike;
use clap::Parser;
use std::sync::Arc;
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .with_target(false)
        .compact()
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Login { passphrase } => run_login(&auth_gate()?, passphrase),
        Commands::Logout => {
            auth_gate()?.logout()?;
            println!("Logged out.");
            Ok(())
        }
        Commands::Summary {
            range,
            format,
            save,
        } => handle_summary(&range, format, save),
        Commands::Range { range } => handle_range(&range),
        Commands::Export { range } => handle_export(&range),
        Commands::Serve => {
            auth_gate()?.require()?;
            let config = load_or_default_config()?;
            run_service(config).await
        }
        Commands::Config { command } => handle_config_command(command),
        Commands::Status => handle_status(),
        Commands::Doctor => handle_doctor(),
    }
}

fn handle_config_command(command: ConfigCommands) -> Result<()> {
    match command {
        ConfigCommands::Set { key, value } => {
            let mut config = load_or_default_config()?;
            config.set_value(&key, &value)?;
            config.ensure_bootstrap_files()?;
            config.save()?;

            println!("Config saved: {key} = {value}");
            Ok(())
        }
        ConfigCommands::Get { key } => {
            let config = load_or_default_config()?;
            let value = config
                .get_value(&key)
                .with_context(|| format!("Unsupported config key: {key}"))?;

            println!("{value}");
            Ok(())
        }
    }
}

fn handle_summary(args: &RangeArgs, format: OutputFormat, save: bool) -> Result<()> {
    auth_gate()?.require()?;
    let config = load_or_default_config()?;
    let request = range_request(&config, args)?;
    let raw = fetch_document(&config)?;

    let summary = if save {
        config.ensure_bootstrap_files()?;
        let (summary, saved) = analyzer::summarize_and_save(&config, &raw, &request)?;
        eprintln!("Summary saved:");
        eprintln!("- Markdown: {}", saved.markdown_path.display());
        eprintln!("- JSON: {}", saved.json_path.display());
        summary
    } else {
        analyzer::summarize(&raw, &request)
    };

    match format {
        OutputFormat::Json => println!(
            "{}",
            serde_json::to_string_pretty(&summary).context("Failed to serialize summary JSON")?
        ),
        OutputFormat::Markdown => print!("{}", render_markdown(&summary)),
    }

    Ok(())
}

fn handle_range(args: &RangeArgs) -> Result<()> {
    let config = load_or_default_config()?;
    let request = range_request(&config, args)?;
    let resolved = range::resolve(&request);

    println!("{}", resolved.label());
    println!("- current: {}", describe_window(&resolved.current));
    println!("- previous: {}", describe_window(&resolved.previous));

    Ok(())
}

fn describe_window(window: &Window) -> String {
    format!(
        "{} ({}) to {} ({}), {} days",
        window.start,
        window.start_date().weekday(),
        window.end,
        window.end_date().weekday(),
        window.day_count()
    )
}

fn handle_export(args: &RangeArgs) -> Result<()> {
    auth_gate()?.require()?;
    let config = load_or_default_config()?;
    let request = range_request(&config, args)?;
    let resolved = range::resolve(&request);
    let links = export::export_links(&config, &resolved.current.start)?;

    println!("Excel download: {}", links.xlsx_url);
    println!("Google Sheets: {}", links.sheets_url);
    Ok(())
}

fn handle_status() -> Result<()> {
    let config_path = Config::config_path()?;
    let config = load_or_default_config()?;
    let gate = auth_gate()?;

    println!("social-report status");
    println!("- config: {}", config_path.display());
    println!("- logged_in: {}", gate.is_authenticated());
    println!("- data_url: {}", config.data_url);
    println!("- week_start: {}", config.week_start);
    println!("- api_port: {}", config.api_port);
    println!("- report_dir: {}", config.report_dir.display());

    Ok(())
}

fn handle_doctor() -> Result<()> {
    let config_path = Config::config_path()?;
    let mut issues = Vec::new();

    if config_path.exists() {
        println!("[OK] config.json found: {}", config_path.display());
    } else {
        println!("[WARN] config.json not found: {}", config_path.display());
        issues.push("config missing".to_string());
    }

    let config = load_or_default_config()?;

    if auth_gate()?.is_authenticated() {
        println!("[OK] logged in");
    } else {
        println!("[WARN] not logged in. Run `social-report login`");
        issues.push("not logged in".to_string());
    }

    match config.parse_week_start() {
        Ok(weekday) => println!("[OK] week_start valid: {weekday}"),
        Err(error) => {
            println!("[WARN] invalid week_start setting: {error}");
            issues.push("invalid week_start".to_string());
        }
    }

    if config.report_dir.exists() {
        println!("[OK] report dir exists: {}", config.report_dir.display());
    } else {
        println!("[WARN] report dir missing: {}", config.report_dir.display());
        issues.push("report dir missing".to_string());
    }

    match source::load_document(&config) {
        Ok(raw) => {
            println!(
                "[OK] report document loaded: {} rows ({} weekly)",
                raw.row_count(),
                raw.weekly_summary.len()
            );
            let mut metrics = Vec::new();
            for row in &raw.weekly_summary {
                if !metrics.contains(&row.metric) {
                    metrics.push(row.metric);
                }
            }
            if !metrics.is_empty() {
                let labels = metrics.iter().map(|metric| metric.label()).collect::<Vec<_>>();
                println!("[OK] weekly metrics: {}", labels.join(", "));
            }
            if let Some(hint) = raw.date_range {
                println!("[OK] data spans {} to {}", hint.earliest, hint.latest);
            }
        }
        Err(error) => {
            println!("[WARN] {} ({}): {error}", error.user_message(), error.kind());
            issues.push(error.kind().to_string());
        }
    }

    if issues.is_empty() {
        println!("doctor result: no issues");
    } else {
        println!("doctor result: {} warning(s)", issues.len());
    }

    Ok(())
}

async fn run_service(config: Config) -> Result<()> {
    config.ensure_bootstrap_files()?;

    let fetch_config = config.clone();
    let initial = tokio::task::spawn_blocking(move || source::load_document(&fetch_config))
        .await
        .context("Initial fetch task failed")?;

    let store = Arc::new(SharedStore::new(initial));
    if let LoadState::Failed { kind, message } = store.current() {
        warn!(kind, "{message}. POST /api/v1/refresh to retry");
    }

    let shared_config = Arc::new(config);

    info!("social-report service started");

    tokio::select! {
        api_result = api::run_server(shared_config, store) => {
            api_result?;
        }
        _ = signal::ctrl_c() => {
            info!("shutdown signal received");
        }
    }

    Ok(())
}

fn fetch_document(config: &Config) -> Result<HistoricalReport> {
    source::load_document(config).or_else(|error| {
        error!(kind = error.kind(), error = %error, "report document unavailable");
        bail!("{}. Run the command again to retry.", error.user_message())
    })
}

fn range_request(config: &Config, args: &RangeArgs) -> Result<RangeRequest> {
    let week_start = config.parse_week_start()?;

    if args.time_frame != range::TimeFrame::Custom && (args.start.is_some() || args.end.is_some()) {
        warn!(time_frame = %args.time_frame, "--start/--end only apply to --time-frame custom");
    }

    range::request_from_inputs(
        args.time_frame,
        args.start.as_deref(),
        args.end.as_deref(),
        args.today.as_deref(),
        week_start,
    )
}

fn auth_gate() -> Result<AuthGate> {
    Ok(AuthGate::new(&Config::root_dir()?))
}

fn load_or_default_config() -> Result<Config> {
    Config::load().or_else(|_| {
        let config = Config::default();
        config.ensure_bootstrap_files()?;
        config.save()?;
        Ok(config)
    })
}
