//! CLI argument parsing for tracesift

use clap::{ArgGroup, Parser};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "tracesift")]
#[command(version)]
#[command(
    about = "Cluster the failures of a component-testing harness into unique errors and crashes",
    long_about = None
)]
#[command(group(ArgGroup::new("input").required(true).args(["log", "log_dir"])))]
pub struct Cli {
    /// Analyze a single test-controller transcript
    #[arg(short = 'l', long = "log", value_name = "FILE")]
    pub log: Option<PathBuf>,

    /// Discover log groups in a directory and analyze every dynamic test run
    #[arg(short = 'd', long = "log-dir", value_name = "DIR")]
    pub log_dir: Option<PathBuf>,

    /// Report directory (per-group results go to <DIR>/TestResult/<groupId>)
    #[arg(short = 'o', long = "out", value_name = "DIR", default_value = "result")]
    pub out: PathBuf,

    /// Directory holding the generated test-case tables
    #[arg(short = 't', long = "testcases", value_name = "DIR", default_value = "testcases")]
    pub testcases: PathBuf,

    /// Misexposure classification JSON ({pkg: {comp: label}})
    #[arg(short = 'm', long = "mist", value_name = "FILE")]
    pub mist: Option<PathBuf>,

    /// Analyzer configuration file (TOML)
    #[arg(short = 'c', long = "config", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Log groups analyzed at once with --log-dir (default: available cores)
    #[arg(short = 'j', long = "jobs", value_name = "N")]
    pub jobs: Option<usize>,

    /// Enable debug logging to stderr
    #[arg(long = "debug")]
    pub debug: bool,
}
