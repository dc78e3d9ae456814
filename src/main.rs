use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use tracing::info;

use remodel_data::{
    DesignMatrix, FeatureSpec, ResampleMode, derive_labels, prepare, rebalance, train_test_split,
};
use remodel_io::{AcquisitionReader, PerformanceReader, ResultWriter, RunName, SearchEntry};
use remodel_learn::{
    Estimator, Evaluation, GridSearch, KnnConfig, MaxFeatures, ParamGrid, RandomForestConfig,
    Scoring, evaluate,
};

#[derive(Parser)]
#[command(name = "remodel")]
#[command(about = "Mortgage modification prediction with class-imbalance handling")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// RNG seed for reproducibility
    #[arg(long, default_value_t = 42, global = true)]
    seed: u64,

    /// Enable verbose (debug-level) logging
    #[arg(long, global = true)]
    verbose: bool,

    /// Suppress all output except errors
    #[arg(long, global = true)]
    quiet: bool,

    /// Number of threads for parallel computation (defaults to all cores)
    #[arg(long, global = true)]
    threads: Option<usize>,
}

/// Shared data-preparation parameters.
#[derive(Args, Debug, Clone)]
struct DataArgs {
    /// Path to the pipe-delimited acquisition flat file
    #[arg(long)]
    acquisition: PathBuf,

    /// Path to the pipe-delimited performance flat file
    #[arg(long)]
    performance: PathBuf,

    /// Fraction of rows held out for evaluation
    #[arg(long, default_value_t = 0.33)]
    test_fraction: f64,

    /// Training-set rebalancing: "none", "oversample", or "undersample"
    #[arg(long, default_value = "none")]
    resample: String,

    /// Run name for output files (must match [a-zA-Z0-9_-]+)
    #[arg(long)]
    run: String,

    /// Output directory for result files
    #[arg(long, default_value = ".")]
    output_dir: PathBuf,
}

#[derive(Subcommand)]
enum Command {
    /// Train a classifier and report accuracy, ROC-AUC, and confusion counts
    Evaluate {
        #[command(flatten)]
        data: DataArgs,

        /// Classifier: "knn" or "forest"
        #[arg(long, default_value = "forest")]
        classifier: String,

        /// Neighbor count for the KNN baseline
        #[arg(long, default_value_t = 5)]
        neighbors: usize,

        /// Number of trees in the random forest
        #[arg(long, default_value_t = 100)]
        n_trees: usize,

        /// Maximum tree depth (unlimited if not set)
        #[arg(long)]
        max_depth: Option<usize>,

        /// Minimum samples required to split a node
        #[arg(long, default_value_t = 2)]
        min_samples_split: usize,

        /// Per-split feature sampling: "sqrt", "log2", "all", or a count
        #[arg(long, default_value = "sqrt")]
        max_features: String,
    },

    /// Exhaustive forest hyperparameter search with stratified k-fold CV
    GridSearch {
        #[command(flatten)]
        data: DataArgs,

        /// Comma-separated tree-count candidates
        #[arg(long, default_value = "50,100,200")]
        n_trees: String,

        /// Comma-separated depth candidates ("none" for unlimited)
        #[arg(long, default_value = "none,4,8")]
        max_depth: String,

        /// Comma-separated split-threshold candidates
        #[arg(long, default_value = "2,10")]
        min_samples_split: String,

        /// Comma-separated feature-sampling candidates
        #[arg(long, default_value = "sqrt")]
        max_features: String,

        /// Number of cross-validation folds
        #[arg(long, default_value_t = 5)]
        folds: usize,

        /// Ranking metric: "accuracy" or "roc-auc"
        #[arg(long, default_value = "roc-auc")]
        scoring: String,
    },
}

// --- JSON stdout output structs ---

#[derive(Serialize)]
struct EvaluateOutput {
    run: String,
    classifier: String,
    resample: String,
    n_train: usize,
    n_test: usize,
    n_features: usize,
    accuracy: f64,
    roc_auc: f64,
    predicted_positive: usize,
    predicted_positive_fraction: f64,
    positive_fraction: f64,
}

#[derive(Serialize)]
struct GridSearchOutput {
    run: String,
    scoring: String,
    n_folds: usize,
    n_candidates: usize,
    best_n_trees: usize,
    best_max_depth: Option<usize>,
    best_min_samples_split: usize,
    best_max_features: String,
    best_mean_score: f64,
    best_std_score: f64,
    test_accuracy: f64,
    test_roc_auc: f64,
}

fn parse_resample(s: &str) -> Result<Option<ResampleMode>> {
    match s {
        "none" => Ok(None),
        "oversample" => Ok(Some(ResampleMode::Oversample)),
        "undersample" => Ok(Some(ResampleMode::Undersample)),
        other => anyhow::bail!(
            "unknown resample mode: {other} (expected none, oversample, or undersample)"
        ),
    }
}

fn parse_max_features(s: &str) -> Result<MaxFeatures> {
    match s {
        "sqrt" => Ok(MaxFeatures::Sqrt),
        "log2" => Ok(MaxFeatures::Log2),
        "all" => Ok(MaxFeatures::All),
        other => {
            let n: usize = other.parse().with_context(|| {
                format!("unknown max-features: {other} (expected sqrt, log2, all, or a count)")
            })?;
            Ok(MaxFeatures::Fixed(n))
        }
    }
}

fn parse_scoring(s: &str) -> Result<Scoring> {
    match s {
        "accuracy" => Ok(Scoring::Accuracy),
        "roc-auc" => Ok(Scoring::RocAuc),
        other => anyhow::bail!("unknown scoring: {other} (expected accuracy or roc-auc)"),
    }
}

fn parse_usize_list(s: &str, name: &str) -> Result<Vec<usize>> {
    s.split(',')
        .map(|v| {
            v.trim()
                .parse()
                .with_context(|| format!("invalid {name} value: {v}"))
        })
        .collect()
}

fn parse_depth_list(s: &str) -> Result<Vec<Option<usize>>> {
    s.split(',')
        .map(|v| {
            let v = v.trim();
            if v == "none" {
                Ok(None)
            } else {
                v.parse()
                    .map(Some)
                    .with_context(|| format!("invalid max-depth value: {v}"))
            }
        })
        .collect()
}

fn parse_features_list(s: &str) -> Result<Vec<MaxFeatures>> {
    s.split(',').map(|v| parse_max_features(v.trim())).collect()
}

/// Load both flat files, derive labels, encode features, split, and
/// optionally rebalance the training half.
fn load_and_prepare(data: &DataArgs, seed: u64) -> Result<(DesignMatrix, DesignMatrix)> {
    let acquisitions = AcquisitionReader::new(&data.acquisition)
        .read()
        .context("failed to read acquisition file")?;
    let performances = PerformanceReader::new(&data.performance)
        .read()
        .context("failed to read performance file")?;
    info!(
        n_acquisitions = acquisitions.len(),
        n_performance_rows = performances.len(),
        "flat files loaded"
    );

    let labels = derive_labels(&acquisitions, &performances);
    let matrix = prepare(&acquisitions, &labels, &FeatureSpec::standard())
        .context("feature preparation failed")?;

    let split = train_test_split(&matrix, data.test_fraction, seed)
        .context("train/test split failed")?;

    let train = match parse_resample(&data.resample)? {
        Some(mode) => rebalance(&split.train, mode, seed).context("resampling failed")?,
        None => split.train,
    };

    Ok((train, split.test))
}

fn write_and_print_evaluation(
    data: &DataArgs,
    classifier: &str,
    n_train: usize,
    n_features: usize,
    report: &Evaluation,
) -> Result<()> {
    let run_name = RunName::new(data.run.clone())?;
    let writer = ResultWriter::new(&data.output_dir, run_name)?;
    writer.write_evaluation(
        classifier,
        &data.resample,
        n_train,
        report.n_test,
        report.accuracy,
        report.roc_auc,
        report.predicted_positive,
        report.predicted_positive_fraction,
        report.positive_fraction,
        report.confusion.as_rows(),
    )?;

    let output = EvaluateOutput {
        run: data.run.clone(),
        classifier: classifier.to_string(),
        resample: data.resample.clone(),
        n_train,
        n_test: report.n_test,
        n_features,
        accuracy: report.accuracy,
        roc_auc: report.roc_auc,
        predicted_positive: report.predicted_positive,
        predicted_positive_fraction: report.predicted_positive_fraction,
        positive_fraction: report.positive_fraction,
    };
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = match (cli.verbose, cli.quiet) {
        (true, _) => "debug",
        (_, true) => "error",
        _ => "info",
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    // Configure Rayon thread pool
    if let Some(threads) = cli.threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
            .context("failed to configure thread pool")?;
        info!(threads, "thread pool configured");
    }

    match cli.command {
        Command::Evaluate {
            data,
            classifier,
            neighbors,
            n_trees,
            max_depth,
            min_samples_split,
            max_features,
        } => {
            let (train, test) = load_and_prepare(&data, cli.seed)?;
            info!(
                n_train = train.n_samples(),
                n_test = test.n_samples(),
                n_features = train.n_features(),
                "dataset prepared"
            );

            let report = match classifier.as_str() {
                "knn" => {
                    let model = KnnConfig::new(neighbors)?
                        .fit(train.features(), train.labels())
                        .context("KNN training failed")?;
                    evaluate(&model, test.features(), test.labels())
                        .context("evaluation failed")?
                }
                "forest" => {
                    let model = RandomForestConfig::new(n_trees)?
                        .with_max_depth(max_depth)
                        .with_min_samples_split(min_samples_split)
                        .with_max_features(parse_max_features(&max_features)?)
                        .with_seed(cli.seed)
                        .fit(train.features(), train.labels())
                        .context("forest training failed")?;
                    evaluate(&model, test.features(), test.labels())
                        .context("evaluation failed")?
                }
                other => anyhow::bail!("unknown classifier: {other} (expected knn or forest)"),
            };

            write_and_print_evaluation(
                &data,
                &classifier,
                train.n_samples(),
                train.n_features(),
                &report,
            )?;
        }

        Command::GridSearch {
            data,
            n_trees,
            max_depth,
            min_samples_split,
            max_features,
            folds,
            scoring,
        } => {
            let (train, test) = load_and_prepare(&data, cli.seed)?;
            info!(
                n_train = train.n_samples(),
                n_features = train.n_features(),
                "dataset prepared"
            );

            let grid = ParamGrid::new()
                .with_n_trees(parse_usize_list(&n_trees, "n-trees")?)
                .with_max_depth(parse_depth_list(&max_depth)?)
                .with_min_samples_split(parse_usize_list(&min_samples_split, "min-samples-split")?)
                .with_max_features(parse_features_list(&max_features)?);

            let search = GridSearch::new(folds)?
                .with_scoring(parse_scoring(&scoring)?)
                .with_seed(cli.seed);

            let result = search
                .run(&grid, train.features(), train.labels())
                .context("grid search failed")?;

            let entries: Vec<SearchEntry> = result
                .candidates
                .iter()
                .map(|c| SearchEntry {
                    n_trees: c.params.n_trees,
                    max_depth: c.params.max_depth,
                    min_samples_split: c.params.min_samples_split,
                    max_features: c.params.max_features.to_string(),
                    fold_scores: c.fold_scores.clone(),
                    mean_score: c.mean_score,
                    std_score: c.std_score,
                })
                .collect();

            let run_name = RunName::new(data.run.clone())?;
            let writer = ResultWriter::new(&data.output_dir, run_name)?;
            writer.write_search(&scoring, folds, result.best_index, &entries)?;

            // Retrain the winner on the full training set and score it on
            // the held-out test rows.
            let best = result.best();
            let model = RandomForestConfig::new(best.params.n_trees)?
                .with_max_depth(best.params.max_depth)
                .with_min_samples_split(best.params.min_samples_split)
                .with_max_features(best.params.max_features)
                .with_seed(cli.seed)
                .fit(train.features(), train.labels())
                .context("retraining best candidate failed")?;
            let report = evaluate(&model, test.features(), test.labels())
                .context("evaluation of best candidate failed")?;

            let output = GridSearchOutput {
                run: data.run.clone(),
                scoring: scoring.clone(),
                n_folds: folds,
                n_candidates: result.candidates.len(),
                best_n_trees: best.params.n_trees,
                best_max_depth: best.params.max_depth,
                best_min_samples_split: best.params.min_samples_split,
                best_max_features: best.params.max_features.to_string(),
                best_mean_score: best.mean_score,
                best_std_score: best.std_score,
                test_accuracy: report.accuracy,
                test_roc_auc: report.roc_auc,
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }

    Ok(())
}
