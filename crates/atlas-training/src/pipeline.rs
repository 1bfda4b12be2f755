use std::collections::HashSet;

use atlas_classifier::{ClassifierModel, Label};
use atlas_engine::CountryCatalog;
use rand::Rng as _;

use crate::{
    EvaluationReport, TrainingConfig, TrainingDataError, TrainingSample, TrainingSeed,
    generate_negatives, name_fragments, trainer::fit,
};

/// A fitted model with the reports of how well it separates the classes.
#[derive(Debug, Clone)]
pub struct TrainingOutcome {
    pub model: ClassifierModel,
    /// Seed the negatives were generated from, for reproducing the run.
    pub seed: TrainingSeed,
    /// Evaluation on the samples the model was fitted on.
    pub training_report: EvaluationReport,
    /// Evaluation on negatives generated from another seed that the model has
    /// not seen.
    pub held_out_report: EvaluationReport,
}

/// Trains a model on every name and alias of `catalog` plus generated negatives.
pub fn train_on_catalog(
    catalog: &CountryCatalog,
    config: &TrainingConfig,
) -> Result<TrainingOutcome, TrainingDataError> {
    config.validate()?;
    let seed = config.seed.unwrap_or_else(|| rand::rng().random());
    let mut rng = seed.rng();
    log::info!("training with seed {seed}");

    let positives = catalog.all_names().map(str::to_owned).collect::<Vec<_>>();
    let fragments = name_fragments(catalog);
    let negatives = generate_negatives(&positives, &fragments, &config.negatives, &mut rng);
    log::info!(
        "corpus: {} positive and {} negative samples",
        positives.len(),
        negatives.len()
    );

    let samples = TrainingSample::labeled(positives.iter().cloned(), Label::Country)
        .chain(TrainingSample::labeled(negatives.iter().cloned(), Label::NotCountry))
        .collect::<Vec<_>>();
    let model = fit(&samples, config)?;
    let training_report = EvaluationReport::evaluate(&model, &samples, config.acceptance_threshold);

    let held_out_seed: TrainingSeed = rng.random();
    let seen = negatives.into_iter().collect::<HashSet<_>>();
    let held_out = generate_negatives(&positives, &[], &config.negatives, &mut held_out_seed.rng())
        .into_iter()
        .filter(|negative| !seen.contains(negative))
        .map(|negative| TrainingSample::new(negative, Label::NotCountry))
        .collect::<Vec<_>>();
    let held_out_report =
        EvaluationReport::evaluate(&model, &held_out, config.acceptance_threshold);

    Ok(TrainingOutcome {
        model,
        seed,
        training_report,
        held_out_report,
    })
}
