//! attrsplit CLI entry point.

use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use attrsplit_engine::AnchorPolicy;
use attrsplit_foundation::Result;
use attrsplit_runtime::{Config, Driver, TelemetryConfig, telemetry};

/// Splits service attribute handlers into CRUD interface implementations.
///
/// Rewritten sources are printed to standard output in input order; logs go
/// to standard error.
#[derive(Debug, Parser)]
#[command(name = "attrsplit", version)]
struct Cli {
    /// TOML configuration file.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Directory the input files are resolved against.
    #[arg(long, value_name = "DIR")]
    base_dir: Option<PathBuf>,

    /// Match anchors by exact name instead of by substring.
    #[arg(long)]
    exact_anchors: bool,

    /// Re-parse every rewritten file before printing it.
    #[arg(long)]
    verify: bool,

    /// Log filter directive, e.g. `debug` or `attrsplit_engine=trace`.
    #[arg(long, value_name = "FILTER")]
    log_level: Option<String>,

    /// Emit logs as JSON.
    #[arg(long)]
    json_logs: bool,

    /// Input files; replace the configured list.
    #[arg(value_name = "FILE")]
    files: Vec<PathBuf>,
}

impl Cli {
    fn telemetry(&self) -> TelemetryConfig {
        TelemetryConfig {
            level: self.log_level.clone(),
            json_logs: self.json_logs,
        }
    }

    fn config(&self) -> Result<Config> {
        let mut config = match &self.config {
            Some(path) => Config::load(path)?,
            None => Config::default(),
        };
        if !self.files.is_empty() {
            config.files.clone_from(&self.files);
            config.base_dir = PathBuf::new();
        }
        if let Some(dir) = &self.base_dir {
            config.base_dir.clone_from(dir);
        }
        if self.exact_anchors {
            config.anchor_policy = AnchorPolicy::Exact;
        }
        if self.verify {
            config.verify_output = true;
        }
        Ok(config)
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            match &e.context {
                Some(context) => eprintln!("error: {e} ({context})"),
                None => eprintln!("error: {e}"),
            }
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<()> {
    telemetry::init(&cli.telemetry())?;
    let driver = Driver::new(cli.config()?)?;
    driver.run_to(&mut io::stdout().lock())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn positional_files_replace_the_list() {
        let cli = Cli::parse_from(["attrsplit", "--verify", "a.go", "b/c.go"]);
        let config = cli.config().unwrap();
        assert_eq!(
            config.inputs(),
            vec![PathBuf::from("a.go"), PathBuf::from("b/c.go")]
        );
        assert!(config.verify_output);
        assert_eq!(config.anchor_policy, AnchorPolicy::LastContaining);
    }

    #[test]
    fn base_dir_applies_to_positional_files() {
        let cli = Cli::parse_from([
            "attrsplit",
            "--base-dir",
            "provider",
            "--exact-anchors",
            "a.go",
        ]);
        let config = cli.config().unwrap();
        assert_eq!(config.inputs(), vec![PathBuf::from("provider/a.go")]);
        assert_eq!(config.anchor_policy, AnchorPolicy::Exact);
    }

    #[test]
    fn defaults_without_arguments() {
        let cli = Cli::parse_from(["attrsplit", "--json-logs", "--log-level", "debug"]);
        let config = cli.config().unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(
            cli.telemetry(),
            TelemetryConfig::default().with_level("debug").with_json_logs(true)
        );
    }
}
