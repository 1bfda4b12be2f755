use clap::{Parser, Subcommand};

use self::{classify::ClassifyArg, play::PlayArg, train::TrainArg};

mod classify;
mod play;
mod train;

#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct CommandArgs {
    /// What mode to run the program in
    #[command(subcommand)]
    mode: Option<Mode>,
}

#[derive(Debug, Clone, Subcommand)]
enum Mode {
    /// Play the country naming game in the terminal
    Play(#[clap(flatten)] PlayArg),
    /// Train the country classifier
    Train(#[clap(flatten)] TrainArg),
    /// Classify text with a trained model
    Classify(#[clap(flatten)] ClassifyArg),
}

pub fn run() -> anyhow::Result<()> {
    let args = CommandArgs::parse();
    match args.mode.unwrap_or(Mode::Play(PlayArg::default())) {
        Mode::Play(arg) => play::run(&arg)?,
        Mode::Train(arg) => train::run(&arg)?,
        Mode::Classify(arg) => classify::run(&arg)?,
    }
    Ok(())
}
