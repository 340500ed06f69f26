//! ml-pipeline entry point

use clap::Parser;
use ml_pipeline::cli::{cmd_algorithms, cmd_cross_validate, cmd_info, cmd_run, Cli, Commands};
use ml_pipeline::telemetry::{init_tracing, RunReporter};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_level.as_deref(), cli.json_logs);

    let result = match cli.command {
        Commands::Run(args) => cmd_run(&args),
        Commands::CrossValidate(args) => cmd_cross_validate(&args),
        Commands::Info { data_path } => cmd_info(&data_path),
        Commands::Algorithms => cmd_algorithms(),
    };

    if let Err(err) = &result {
        RunReporter::new().run_failed(err);
    }
    result
}
