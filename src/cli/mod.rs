//! Command-line interface
//!
//! Builds a [`PipelineConfig`] from flags or a JSON file, then runs, cross
//! validates or inspects.

use clap::{Args, Parser, Subcommand};
use colored::*;
use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::io::{save_model, DataLoader};
use crate::metric::MetricResult;
use crate::pipeline::{cross_validate, AlgorithmType, PipelineConfig, PipelineFactory};
use crate::telemetry::RunReporter;

// ─── Styling helpers ───────────────────────────────────────────────────────────

fn dim(s: &str) -> ColoredString   { s.truecolor(100, 100, 100) }
fn accent(s: &str) -> ColoredString { s.truecolor(120, 170, 255) }
fn muted(s: &str) -> ColoredString  { s.truecolor(140, 140, 140) }
fn ok(s: &str) -> ColoredString     { s.truecolor(100, 210, 120) }

fn step_ok(msg: &str) {
    println!("  {} {}", ok("✓"), msg);
}

fn step_run(msg: &str) {
    print!("  {} {}... ", accent("›"), msg);
}

fn step_done(detail: &str) {
    println!("{} {}", ok("done"), dim(detail));
}

fn section(title: &str) {
    println!();
    println!("  {}", title.white().bold());
    println!("  {}", dim(&"─".repeat(56)));
}

fn print_metrics(metrics: &MetricResult) {
    for (name, value) in metrics.values() {
        println!("  {:<22} {}", muted(name), format!("{:.4}", value).white().bold());
    }
}

// ─── CLI definition ────────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "ml-pipeline")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Configuration-driven supervised learning pipelines")]
#[command(long_about = None)]
pub struct Cli {
    /// Log level for the ml_pipeline target (overrides RUST_LOG)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Fit on a 70/30 split, report metrics and optionally save the model
    Run(RunArgs),

    /// K-fold cross-validation with --num-folds folds
    CrossValidate(RunArgs),

    /// Show dataset information
    Info {
        /// Input CSV file
        #[arg(short, long)]
        data_path: PathBuf,
    },

    /// List supported algorithms
    Algorithms,
}

/// Pipeline configuration flags.
///
/// `--config` replaces the dataset flags. The remaining flags, when given,
/// override the values read from the file.
#[derive(Args, Debug, Clone)]
pub struct RunArgs {
    /// JSON configuration file
    #[arg(long, conflicts_with_all = ["data_path", "features", "target_column", "algorithm"])]
    pub config: Option<PathBuf>,

    /// Input CSV file
    #[arg(long, required_unless_present = "config")]
    pub data_path: Option<PathBuf>,

    /// Feature columns, comma separated
    #[arg(long, value_delimiter = ',', required_unless_present = "config")]
    pub features: Vec<String>,

    #[arg(long, required_unless_present = "config")]
    pub target_column: Option<String>,

    /// One of the tags printed by `algorithms`
    #[arg(long, required_unless_present = "config")]
    pub algorithm: Option<String>,

    /// Save the fitted model here
    #[arg(long)]
    pub out_file: Option<String>,

    /// Seed for the split and the models [default: 42]
    #[arg(long)]
    pub random_state: Option<u64>,

    /// Folds for cross-validate [default: 5]
    #[arg(long)]
    pub num_folds: Option<usize>,

    #[arg(long, value_delimiter = ',')]
    pub scale_standard: Vec<String>,

    #[arg(long, value_delimiter = ',')]
    pub scale_robust: Vec<String>,

    #[arg(long, value_delimiter = ',')]
    pub scale_minmax: Vec<String>,
}

impl RunArgs {
    /// Resolve the flags into a configuration
    pub fn to_config(&self) -> anyhow::Result<PipelineConfig> {
        let config = match &self.config {
            Some(path) => PipelineConfig::from_json_file(path)?,
            None => self.config_from_flags()?,
        };
        Ok(self.apply_overrides(config))
    }

    fn config_from_flags(&self) -> anyhow::Result<PipelineConfig> {
        let data_path = self
            .data_path
            .clone()
            .ok_or_else(|| anyhow::anyhow!("--data-path is required"))?;
        let target = self
            .target_column
            .clone()
            .ok_or_else(|| anyhow::anyhow!("--target-column is required"))?;
        let algorithm: AlgorithmType = self
            .algorithm
            .as_deref()
            .ok_or_else(|| anyhow::anyhow!("--algorithm is required"))?
            .parse()?;

        Ok(PipelineConfig::new(data_path, self.features.clone(), target, algorithm))
    }

    fn apply_overrides(&self, mut config: PipelineConfig) -> PipelineConfig {
        if let Some(out_file) = &self.out_file {
            config.out_file = out_file.clone();
        }
        if let Some(seed) = self.random_state {
            config.random_state = seed;
        }
        if let Some(num_folds) = self.num_folds {
            config.num_folds = num_folds;
        }
        if !self.scale_standard.is_empty() {
            config.scale_standard = self.scale_standard.clone();
        }
        if !self.scale_robust.is_empty() {
            config.scale_robust = self.scale_robust.clone();
        }
        if !self.scale_minmax.is_empty() {
            config.scale_minmax = self.scale_minmax.clone();
        }
        config
    }
}

// ─── Commands ─────────────────────────────────────────────────────────────────

pub fn cmd_run(args: &RunArgs) -> anyhow::Result<()> {
    let reporter = RunReporter::new();
    let config = args.to_config()?;

    section("Run");
    let mut pipeline = PipelineFactory::build(config)?;
    reporter.config_accepted(pipeline.config());
    println!("  {:<12} {}", muted("Algorithm"), pipeline.algorithm().to_string().cyan());
    println!("  {:<12} {}", muted("Task"), pipeline.model_type());
    println!("  {:<12} {}", muted("Data"), pipeline.config().data_path.display());
    println!();

    let (features, _) = pipeline.base().load_dataset()?;
    reporter.dataset_loaded(&pipeline.config().data_path, &DataLoader::describe(&features));

    step_run("Fitting and predicting");
    let start = Instant::now();
    let run = pipeline.predict()?;
    step_done(&format!(
        "{} train / {} test rows in {:?}",
        run.data().x_train.nrows(),
        run.data().x_test.nrows(),
        start.elapsed()
    ));
    reporter.predictions_produced(&run);

    let metrics = pipeline.compute_metrics(&run)?;
    reporter.metrics_computed(&metrics);

    println!();
    print_metrics(&metrics);
    println!();

    let out_file = pipeline.config().out_file.clone();
    if out_file.is_empty() {
        reporter.model_not_saved();
    } else {
        let path = Path::new(&out_file);
        save_model(pipeline.as_ref(), path)?;
        reporter.model_saved(path);
        step_ok(&format!("Model saved to {}", path.display()));
    }

    Ok(())
}

pub fn cmd_cross_validate(args: &RunArgs) -> anyhow::Result<()> {
    let reporter = RunReporter::new();
    let config = args.to_config()?;
    let num_folds = config.num_folds;

    section("Cross-validate");
    let mut pipeline = PipelineFactory::build(config)?;
    reporter.config_accepted(pipeline.config());
    let (features, _) = pipeline.base().load_dataset()?;
    reporter.dataset_loaded(&pipeline.config().data_path, &DataLoader::describe(&features));

    step_run(&format!("Evaluating {} on {} folds", pipeline.algorithm().to_string().cyan(), num_folds));
    let start = Instant::now();
    let report = cross_validate(pipeline.as_mut(), num_folds)?;
    step_done(&format!("{:?}", start.elapsed()));

    println!();
    for fold in &report.folds {
        reporter.fold_result(fold);
        println!(
            "  {:<8} {}",
            muted(&format!("fold {}", fold.fold)),
            dim(&fold.metrics.to_string())
        );
    }
    reporter.cv_summary(&report);

    println!();
    println!("  {}", "Mean".white().bold());
    print_metrics(&report.mean);
    println!();

    Ok(())
}

pub fn cmd_info(data_path: &Path) -> anyhow::Result<()> {
    section("Data Info");

    let df = DataLoader::new().load_csv(data_path)?;
    let info = DataLoader::describe(&df);
    RunReporter::new().dataset_loaded(data_path, &info);

    println!("  {:<12} {}", muted("File"), data_path.display());
    println!("  {:<12} {}", muted("Rows"), info.n_rows);
    println!("  {:<12} {}", muted("Columns"), info.n_cols);
    println!();

    println!("  {:<20} {:<12} {:>6}", muted("Column"), muted("Type"), muted("Nulls"));
    println!("  {}", dim(&"─".repeat(40)));

    for col in &info.columns {
        println!(
            "  {:<20} {:<12} {:>6}",
            col.name,
            col.dtype.truecolor(140, 140, 140),
            col.null_count
        );
    }

    println!();
    Ok(())
}

pub fn cmd_algorithms() -> anyhow::Result<()> {
    section("Algorithms");

    for algorithm in AlgorithmType::ALL {
        println!(
            "  {:<28} {}",
            algorithm.as_str().cyan(),
            muted(algorithm.model_type().as_str())
        );
    }

    println!();
    println!("  {}", dim("decision_tree is accepted as decision_tree_classifier"));
    println!();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_to_config() {
        let cli = Cli::try_parse_from([
            "ml-pipeline",
            "run",
            "--data-path",
            "data.csv",
            "--features",
            "a,b,c",
            "--target-column",
            "y",
            "--algorithm",
            "random_forest",
            "--scale-robust",
            "b",
        ])
        .unwrap();

        let Commands::Run(args) = cli.command else {
            panic!("expected run");
        };
        let config = args.to_config().unwrap();
        assert_eq!(config.features, vec!["a", "b", "c"]);
        assert_eq!(config.algorithm, AlgorithmType::RandomForest);
        assert_eq!(config.random_state, 42);
        assert_eq!(config.num_folds, 5);
        assert_eq!(config.scale_robust, vec!["b"]);
        assert!(config.out_file.is_empty());
    }

    #[test]
    fn test_unknown_algorithm_flag() {
        let cli = Cli::try_parse_from([
            "ml-pipeline",
            "run",
            "--data-path",
            "data.csv",
            "--features",
            "a",
            "--target-column",
            "y",
            "--algorithm",
            "svm",
        ])
        .unwrap();

        let Commands::Run(args) = cli.command else {
            panic!("expected run");
        };
        let err = args.to_config().unwrap_err();
        assert!(err.to_string().contains("svm"));
    }

    fn write_config(dir: &tempfile::TempDir) -> PathBuf {
        let path = dir.path().join("pipeline.json");
        let json = r#"{
            "data_path": "data.csv",
            "features": ["a", "b"],
            "target_column": "label",
            "algorithm": "logistic_regression",
            "num_folds": 3,
            "random_state": 7,
            "scale_robust": ["b"]
        }"#;
        std::fs::write(&path, json).unwrap();
        path
    }

    fn parse_cross_validate(extra: &[&str], config: &Path) -> RunArgs {
        let mut argv = vec!["ml-pipeline", "cross-validate", "--config", config.to_str().unwrap()];
        argv.extend_from_slice(extra);
        let Commands::CrossValidate(args) = Cli::try_parse_from(argv).unwrap().command else {
            panic!("expected cross-validate");
        };
        args
    }

    #[test]
    fn test_flags_override_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(&dir);

        let args = parse_cross_validate(
            &["--num-folds", "10", "--random-state", "3", "--out-file", "model.json"],
            &path,
        );
        let config = args.to_config().unwrap();
        assert_eq!(config.num_folds, 10);
        assert_eq!(config.random_state, 3);
        assert_eq!(config.out_file, "model.json");
        assert_eq!(config.algorithm, AlgorithmType::LogisticRegression);
        assert_eq!(config.scale_robust, vec!["b"]);
    }

    #[test]
    fn test_config_file_values_kept_without_flags() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(&dir);

        let config = parse_cross_validate(&[], &path).to_config().unwrap();
        assert_eq!(config.num_folds, 3);
        assert_eq!(config.random_state, 7);
        assert!(config.out_file.is_empty());
    }

    #[test]
    fn test_config_conflicts_with_dataset_flags() {
        let result = Cli::try_parse_from([
            "ml-pipeline",
            "run",
            "--config",
            "pipeline.json",
            "--algorithm",
            "random_forest",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_cmd_run_loads_fits_and_saves() {
        let dir = tempfile::tempdir().unwrap();
        let data = dir.path().join("data.csv");
        let rows: Vec<String> = (0..30)
            .map(|i| format!("{},{},{}", i, (i * 7) % 5, 2 * i + 1))
            .collect();
        std::fs::write(&data, format!("a,b,y\n{}\n", rows.join("\n"))).unwrap();
        let out = dir.path().join("model.json");

        let cli = Cli::try_parse_from([
            "ml-pipeline",
            "run",
            "--data-path",
            data.to_str().unwrap(),
            "--features",
            "a,b",
            "--target-column",
            "y",
            "--algorithm",
            "linear_regression",
            "--out-file",
            out.to_str().unwrap(),
        ])
        .unwrap();
        let Commands::Run(args) = cli.command else {
            panic!("expected run");
        };

        cmd_run(&args).unwrap();
        assert!(out.exists());
    }

    #[test]
    fn test_cmd_run_missing_data_file() {
        let cli = Cli::try_parse_from([
            "ml-pipeline",
            "run",
            "--data-path",
            "/nonexistent/data.csv",
            "--features",
            "a",
            "--target-column",
            "y",
            "--algorithm",
            "linear_regression",
        ])
        .unwrap();
        let Commands::Run(args) = cli.command else {
            panic!("expected run");
        };

        let err = cmd_run(&args).unwrap_err();
        assert_eq!(
            crate::telemetry::failure_category(&err),
            Some(crate::error::ErrorCategory::Io)
        );
    }

    #[test]
    fn test_missing_required_flags() {
        assert!(Cli::try_parse_from(["ml-pipeline", "run", "--data-path", "data.csv"]).is_err());
    }
}
