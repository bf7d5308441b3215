use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use payslip_engine::render::SlipFormat;

/// Top-level CLI parser for the `payslip` binary.
#[derive(Debug, Parser)]
#[command(name = "payslip", version, about = "Timesheet to salary slip payroll engine")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Directory holding payroll.yaml and company.yaml (built-in rates when omitted)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Quiet mode (errors only)
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Verbose mode (debug logging)
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Process every timesheet in a directory and print the run summary
    Process(ProcessArgs),
    /// Calculate the slips for one timesheet file and print them as JSON
    Calculate {
        /// Timesheet .json file (one record or an array) or .xlsx workbook
        file: PathBuf,
    },
    /// Serve the HTTP API
    Serve(ServeArgs),
}

/// Input/output locations shared by `process` and `serve`.
#[derive(Debug, Clone, Args)]
pub struct DirArgs {
    /// Directory of timesheet JSON files
    #[arg(short, long, default_value = "timesheets")]
    pub input: PathBuf,

    /// Directory salary slips are written to
    #[arg(short, long, default_value = "salary_slips")]
    pub output: PathBuf,

    /// Slip document format: text, json or pdf
    #[arg(short, long, default_value = "text")]
    pub format: SlipFormat,
}

#[derive(Debug, Args)]
pub struct ProcessArgs {
    #[command(flatten)]
    pub dirs: DirArgs,
}

#[derive(Debug, Args)]
pub struct ServeArgs {
    /// Address to listen on
    #[arg(short, long, default_value = "127.0.0.1:8000")]
    pub bind: SocketAddr,

    #[command(flatten)]
    pub dirs: DirArgs,
}
