use std::path::PathBuf;

use anyhow::Context as _;
use atlas_classifier::Label;
use atlas_training::{EvaluationReport, TrainingConfig, TrainingSeed, train_on_catalog};
use serde::Serialize;

use crate::util::{self, DEFAULT_MODEL_PATH};

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct TrainArg {
    /// Training configuration JSON file
    #[clap(long)]
    config: Option<PathBuf>,
    /// Country list JSON file (defaults to the built-in list)
    #[clap(long)]
    countries: Option<PathBuf>,
    /// Seed for negative sample generation (32 hex digits)
    #[clap(long)]
    seed: Option<TrainingSeed>,
    /// Additive smoothing constant
    #[clap(long)]
    smoothing: Option<f64>,
    /// Default acceptance threshold stored in the model
    #[clap(long)]
    threshold: Option<f64>,
    /// Output file path
    #[clap(long, default_value = DEFAULT_MODEL_PATH)]
    output: PathBuf,
    /// Also write the evaluation reports as JSON to this file
    #[clap(long)]
    report: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
struct Reports<'a> {
    seed: TrainingSeed,
    training: &'a EvaluationReport,
    held_out: &'a EvaluationReport,
}

pub(crate) fn run(arg: &TrainArg) -> anyhow::Result<()> {
    let TrainArg {
        config,
        countries,
        seed,
        smoothing,
        threshold,
        output,
        report,
    } = arg;

    let mut config: TrainingConfig = util::read_config_file(config.as_deref())?;
    if let Some(seed) = seed {
        config.seed = Some(*seed);
    }
    if let Some(smoothing) = smoothing {
        config.smoothing = *smoothing;
    }
    if let Some(threshold) = threshold {
        config.acceptance_threshold = *threshold;
    }
    let catalog = util::load_catalog(countries.as_deref())?;

    eprintln!("Training classifier on {} countries...", catalog.len());
    let outcome = train_on_catalog(&catalog, &config).context("Training failed")?;

    eprintln!("Training samples:");
    print_report(&outcome.training_report);
    eprintln!("Held-out negatives:");
    print_report(&outcome.held_out_report);

    let blob = outcome.model.to_blob();
    util::write_file(output, blob.as_bytes())?;

    if let Some(path) = report {
        let reports = Reports {
            seed: outcome.seed,
            training: &outcome.training_report,
            held_out: &outcome.held_out_report,
        };
        util::write_json_file(path, &reports)?;
    }

    let metadata = outcome.model.metadata();
    eprintln!();
    eprintln!("Model saved successfully");
    eprintln!("  Path: {}", output.display());
    eprintln!("  Trained at: {}", metadata.trained_at);
    eprintln!("  Seed: {}", outcome.seed);
    eprintln!(
        "  Samples: {} country / {} not country",
        metadata.samples.country, metadata.samples.not_country
    );
    eprintln!("  Vocabulary: {} tokens", outcome.model.vocabulary_size());
    eprintln!(
        "  Acceptance threshold: {:.2}",
        outcome.model.acceptance_threshold()
    );

    Ok(())
}

fn print_report(report: &EvaluationReport) {
    eprintln!("  Samples:  {}", report.samples());
    eprintln!("  Accuracy: {:.3}", report.accuracy);
    for label in Label::ALL {
        let confusion = report.confusion[label];
        if confusion.total() == 0 {
            continue;
        }
        eprintln!(
            "  {label}: {} accepted / {} rejected",
            confusion.predicted_country, confusion.predicted_not_country
        );
        if let Some(stats) = &report.country_probability[label] {
            eprintln!(
                "    P(country): min {:.3}, median {:.3}, mean {:.3}, max {:.3}, std dev {:.3}",
                stats.min, stats.median, stats.mean, stats.max, stats.std_dev
            );
        }
    }
}
