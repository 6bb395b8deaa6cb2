use anyhow::{Context, Result};
use clap::Parser;
use std::fs;
use std::num::NonZeroUsize;
use std::path::Path;
use std::thread;
use tracesift::analyzer::LogAnalyzer;
use tracesift::cli::Cli;
use tracesift::config::AnalyzerConfig;
use tracesift::log_group::{self, LogGroup};
use tracesift::mist::MistMap;
use tracesift::params::ParamResolver;
use tracesift::report;
use tracing_subscriber::EnvFilter;

/// Initialize tracing subscriber; `RUST_LOG` wins unless --debug is set
fn init_tracing(debug: bool) {
    let filter = if debug {
        EnvFilter::from_default_env().add_directive(tracing::Level::DEBUG.into())
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Settings shared by every transcript of one invocation
struct Session {
    config: AnalyzerConfig,
    resolver: ParamResolver,
    mist: Option<MistMap>,
}

impl Session {
    fn analyze(&self, log_content: &str, out_dir: &Path) -> Result<()> {
        let mut analyzer = LogAnalyzer::new(log_content, &self.config)?;
        if let Some(mist) = &self.mist {
            analyzer = analyzer.with_mist(mist.clone());
        }
        analyzer.run()?;
        report::write_reports(out_dir, &analyzer, &self.resolver)
            .with_context(|| format!("Failed to write reports to {}", out_dir.display()))?;
        Ok(())
    }

    fn analyze_group(&self, group: &LogGroup, out_root: &Path) -> Result<()> {
        let Some(content) = group
            .dynamic_test_log()
            .with_context(|| format!("Failed to read logs of group {}", group.id))?
        else {
            return Ok(());
        };

        tracing::info!(group = %group.id, "Processing dynamic test log");
        let out_dir = out_root.join("TestResult").join(&group.id);
        self.analyze(&content, &out_dir)
            .with_context(|| format!("Failed to analyze group {}", group.id))
    }
}

/// Analyze every group, at most `jobs` groups at a time
fn run_groups(
    session: &Session,
    log_dir: &Path,
    out_root: &Path,
    jobs: Option<usize>,
) -> Result<()> {
    let groups = log_group::discover(log_dir)
        .with_context(|| format!("Failed to discover logs in {}", log_dir.display()))?;
    let groups: Vec<&LogGroup> = groups.values().collect();

    let workers =
        jobs.unwrap_or_else(|| thread::available_parallelism().map_or(1, NonZeroUsize::get));
    tracing::info!(workers, "Analyzing {} log group(s)", groups.len());
    let results = log_group::run_bounded(&groups, workers, |group| {
        session.analyze_group(group, out_root)
    });

    let results = results
        .into_iter()
        .map(|result| result.unwrap_or_else(|| Err(anyhow::anyhow!("Group worker panicked"))));

    let mut failed = 0;
    for err in results.filter_map(Result::err) {
        tracing::error!("{:#}", err);
        failed += 1;
    }
    if failed > 0 {
        anyhow::bail!("{} of {} log group(s) failed", failed, groups.len());
    }
    Ok(())
}

fn main() -> Result<()> {
    let args = Cli::parse();
    init_tracing(args.debug);

    let config = match &args.config {
        Some(path) => AnalyzerConfig::from_toml(path)?,
        None => AnalyzerConfig::default(),
    };
    let mist = args
        .mist
        .as_deref()
        .map(MistMap::load)
        .transpose()
        .context("Failed to load mist result")?;
    let resolver = ParamResolver::new(&args.testcases, &config)?;
    let session = Session {
        config,
        resolver,
        mist,
    };

    match (&args.log, &args.log_dir) {
        (Some(log), None) => {
            let content = fs::read_to_string(log)
                .with_context(|| format!("Failed to read log file: {}", log.display()))?;
            session.analyze(&content, &args.out)
        }
        (None, Some(log_dir)) => run_groups(&session, log_dir, &args.out, args.jobs),
        _ => anyhow::bail!("Specify exactly one of --log or --log-dir"),
    }
}
