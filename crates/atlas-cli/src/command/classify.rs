use std::{
    io::{self, BufRead as _, BufWriter, Write as _},
    path::PathBuf,
};

use anyhow::Context as _;
use atlas_classifier::{ClassificationResult, Classify as _, Label};
use serde::Serialize;

use crate::util::{self, DEFAULT_MODEL_PATH};

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct ClassifyArg {
    /// Path to the model file (JSON format)
    #[clap(long, default_value = DEFAULT_MODEL_PATH)]
    model: PathBuf,
    /// Acceptance threshold (defaults to the one stored in the model)
    #[clap(long)]
    threshold: Option<f64>,
    /// Print one JSON object per line
    #[clap(long, default_value_t = false)]
    json: bool,
    /// Texts to classify; read one per line from stdin if none are given
    texts: Vec<String>,
}

#[derive(Debug, Serialize)]
struct Verdict<'a> {
    text: &'a str,
    label: Label,
    confidence: f64,
    accepted: bool,
}

impl<'a> Verdict<'a> {
    fn new(text: &'a str, result: ClassificationResult, threshold: f64) -> Self {
        Self {
            text,
            label: result.label(),
            confidence: result.confidence(),
            accepted: result.is_confident_country(threshold),
        }
    }
}

pub(crate) fn run(arg: &ClassifyArg) -> anyhow::Result<()> {
    let ClassifyArg {
        model,
        threshold,
        json,
        texts,
    } = arg;

    let model = util::load_model_file(model)?;
    let threshold = threshold.unwrap_or_else(|| model.acceptance_threshold());
    let mut output = BufWriter::new(io::stdout().lock());

    let mut print = |text: &str| -> anyhow::Result<()> {
        let verdict = Verdict::new(text, model.classify(text), threshold);
        if *json {
            serde_json::to_writer(&mut output, &verdict).context("Failed to write JSON")?;
            writeln!(output)?;
        } else {
            writeln!(
                output,
                "{}\t{:.4}\t{}\t{}",
                verdict.label,
                verdict.confidence,
                if verdict.accepted { "accept" } else { "reject" },
                verdict.text
            )?;
        }
        Ok(())
    };

    if texts.is_empty() {
        for line in io::stdin().lock().lines() {
            let line = line.context("Failed to read stdin")?;
            if line.trim().is_empty() {
                continue;
            }
            print(&line)?;
        }
    } else {
        for text in texts {
            print(text)?;
        }
    }
    output.flush()?;

    Ok(())
}
