// ABOUTME: Entry point for the redeploy CLI application.
// ABOUTME: Parses arguments, resolves configuration and runs the deploy sequencer.

mod cli;

use clap::Parser;
use clap::error::ErrorKind;
use cli::Cli;
use redeploy::config::{DeployConfig, Settings};
use redeploy::deploy::Sequencer;
use redeploy::error::Result;
use redeploy::exec::{CommandRunner, DryRunRunner, SystemRunner};
use redeploy::output::{Output, OutputMode};
use redeploy::probe::ProbeRouter;
use std::env;
use std::io::IsTerminal;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            e.exit()
        }
        Err(e) => {
            // Usage errors share exit code 1 with every other configuration error
            let _ = e.print();
            std::process::exit(1);
        }
    };

    // Initialize tracing subscriber based on verbose flag
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_ansi(std::io::stderr().is_terminal())
        .with_writer(std::io::stderr)
        .init();

    let mut output = Output::new(cli.output_mode());
    output.start_timer();

    if let Err(e) = run(cli, &output).await {
        output.error(&e.to_string());
        std::process::exit(e.exit_code());
    }
}

async fn run(cli: Cli, output: &Output) -> Result<()> {
    let project_dir = match &cli.project_dir {
        Some(dir) => dir.clone(),
        None => env::current_dir()?,
    };

    let flags = cli.deploy_flags()?;
    let resolution = DeployConfig::load(&project_dir, &flags)?;
    let config = resolution.config;

    let settings = match &cli.settings {
        Some(path) => Settings::load(&project_dir.join(path))?,
        None => Settings::discover(&project_dir)?,
    };

    let dry_run = cli.dry_run.then(|| Arc::new(DryRunRunner::new()));
    let runner: Arc<dyn CommandRunner> = match &dry_run {
        Some(recorder) => recorder.clone(),
        None => Arc::new(
            SystemRunner::new(&project_dir)
                .stream_output(output.mode() == OutputMode::Normal),
        ),
    };
    let settings = if dry_run.is_some() {
        settings.without_delays()
    } else {
        settings
    };

    let probe = Arc::new(ProbeRouter::new(settings.probe, runner.clone()));
    let sequencer = Sequencer::new(&config, &settings, runner, probe, output)
        .with_warnings(resolution.warnings);
    let report = sequencer.run().await?;

    if let Some(recorder) = dry_run {
        let planned = recorder.planned();
        let plan: Vec<String> = planned.iter().map(|inv| format!("$ {inv}")).collect();
        output.block("Planned commands", &plan.join("\n"));
        output.success(&format!(
            "Dry run of {} complete: {} command(s) planned",
            config.display_name,
            planned.len()
        ));
        return Ok(());
    }

    let warnings = report.diagnostics.warnings().len();
    if warnings == 0 {
        output.success(&format!("Deployment of {} complete", config.display_name));
    } else {
        output.success(&format!(
            "Deployment of {} finished with {} warning(s)",
            config.display_name, warnings
        ));
    }

    Ok(())
}
