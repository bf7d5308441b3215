use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing::{info, warn};

use payslip_engine::api::{AppState, create_router};
use payslip_engine::calculation::WageCalculator;
use payslip_engine::config::{ConfigLoader, PayrollConfig};
use payslip_engine::models::SalarySlipRecord;
use payslip_engine::parser::parse_timesheet;
use payslip_engine::pipeline::PayrollPipeline;
use payslip_engine::storage::{DirectorySink, load_input_dir, load_timesheet_file};

mod cli;

use cli::{Cli, Commands, DirArgs, ServeArgs};

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        eprintln!("payslip error: {error:#}");
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.quiet, cli.verbose)?;

    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Process(args) => process(config, &args.dirs),
        Commands::Calculate { file } => calculate(config, &file),
        Commands::Serve(args) => serve(config, args).await,
    }
}

fn init_tracing(quiet: bool, verbose: bool) -> anyhow::Result<()> {
    let level = if quiet {
        "error"
    } else if verbose {
        "debug"
    } else {
        "warn"
    };

    let filter = tracing_subscriber::EnvFilter::try_from_env("PAYSLIP_LOG")
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|error| anyhow::anyhow!("failed to initialize tracing subscriber: {error}"))?;

    Ok(())
}

fn load_config(dir: Option<&Path>) -> anyhow::Result<PayrollConfig> {
    match dir {
        Some(dir) => Ok(ConfigLoader::load(dir)
            .with_context(|| format!("failed to load payroll configuration from {}", dir.display()))?
            .into_config()),
        None => Ok(PayrollConfig::standard()),
    }
}

/// Runs one batch over the input directory and prints the summary as JSON.
fn process(config: PayrollConfig, dirs: &DirArgs) -> anyhow::Result<()> {
    let records = load_input_dir(&dirs.input)
        .with_context(|| format!("failed to read timesheets from {}", dirs.input.display()))?;

    let pipeline = PayrollPipeline::new(Arc::new(config), dirs.format.renderer());
    let sink = DirectorySink::new(&dirs.output);
    let summary = pipeline.run(records, &sink);

    for outcome in summary.failures() {
        if let Some(failure) = &outcome.failure {
            warn!(
                source = %outcome.source,
                employee_id = outcome.employee_id.as_deref().unwrap_or("-"),
                kind = ?failure.kind,
                "{}",
                failure.message
            );
        }
    }

    let json = serde_json::to_string_pretty(&summary).context("failed to encode run summary")?;
    println!("{json}");
    Ok(())
}

/// Calculates every record in one file without rendering anything.
fn calculate(config: PayrollConfig, file: &Path) -> anyhow::Result<()> {
    let calculator = WageCalculator::new(Arc::new(config));
    let records = load_timesheet_file(file);
    let attempted = records.len();

    let mut slips: Vec<SalarySlipRecord> = Vec::with_capacity(attempted);
    for record in records {
        let result = record
            .content
            .and_then(|raw| parse_timesheet(&raw))
            .and_then(|timesheet| calculator.calculate(&timesheet));
        match result {
            Ok(slip) => slips.push(slip),
            Err(error) => warn!(source = %record.source, error = %error, "Record skipped"),
        }
    }

    let json = serde_json::to_string_pretty(&slips).context("failed to encode salary slips")?;
    println!("{json}");

    let failed = attempted - slips.len();
    if failed > 0 {
        anyhow::bail!("{failed} of {attempted} records in {} failed", file.display());
    }
    Ok(())
}

async fn serve(config: PayrollConfig, args: ServeArgs) -> anyhow::Result<()> {
    let state = AppState::new(config, args.dirs.input, args.dirs.output).with_format(args.dirs.format);
    let router = create_router(state);

    let listener = tokio::net::TcpListener::bind(args.bind)
        .await
        .with_context(|| format!("failed to bind {}", args.bind))?;
    info!(address = %args.bind, "Payroll API listening");

    axum::serve(listener, router).await.context("HTTP server failed")?;
    Ok(())
}
