use std::{
    io::{self, BufRead as _, Write as _},
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::Context as _;
use atlas_engine::{
    Game, GameConfig, GameSession, Player, SessionSeed, TurnOutcome, TurnResult, title_case,
};
use crossterm::style::Stylize as _;

use crate::util::{self, DEFAULT_MODEL_PATH};

#[derive(Default, Debug, Clone, clap::Args)]
pub(crate) struct PlayArg {
    /// Path to the model file (JSON format) [default: models/classifier.json]
    #[clap(long)]
    model: Option<PathBuf>,
    /// Game configuration JSON file
    #[clap(long)]
    config: Option<PathBuf>,
    /// Country list JSON file (defaults to the built-in list)
    #[clap(long)]
    countries: Option<PathBuf>,
    /// Seed of the first round (32 hex digits)
    #[clap(long)]
    seed: Option<SessionSeed>,
    /// Acceptance threshold (overrides the configuration file and the model)
    #[clap(long)]
    threshold: Option<f64>,
    /// Only accept countries from the country list
    #[clap(long, default_value_t = false)]
    strict: bool,
}

const HELP: &str = "\
Commands:
  :history   list the countries named so far
  :forfeit   give up the current round
  :restart   start a new round
  :help      show this help
  :quit      leave the game";

pub(crate) fn run(arg: &PlayArg) -> anyhow::Result<()> {
    let PlayArg {
        model,
        config,
        countries,
        seed,
        threshold,
        strict,
    } = arg;

    let model_path = model.as_deref().unwrap_or(Path::new(DEFAULT_MODEL_PATH));
    let model = util::load_model_file(model_path)?;
    let mut game_config: GameConfig = util::read_config_file(config.as_deref())?;
    game_config.acceptance_threshold = match (threshold, config) {
        (Some(threshold), _) => *threshold,
        (None, Some(_)) => game_config.acceptance_threshold,
        (None, None) => model.acceptance_threshold(),
    };
    game_config.require_catalog_match |= *strict;
    let catalog = util::load_catalog(countries.as_deref())?;
    log::info!(
        "loaded model {} ({} tokens), acceptance threshold {:.2}",
        model_path.display(),
        model.vocabulary_size(),
        game_config.acceptance_threshold
    );

    let game = Game::new(Arc::new(model), Arc::new(catalog), game_config);
    let mut session = start_round(&game, *seed)?;

    let mut lines = io::stdin().lock().lines();
    loop {
        print!("{}", "> ".bold());
        io::stdout().flush()?;
        let Some(line) = lines.next() else {
            println!();
            break;
        };
        let line = line.context("Failed to read stdin")?;
        let input = line.trim();

        match input {
            "" => {}
            ":quit" | ":q" => break,
            ":help" => println!("{HELP}"),
            ":restart" => session = start_round(&game, None)?,
            ":history" => print_history(&game, &session),
            ":forfeit" => {
                let result = game.forfeit(&mut session);
                print_result(&result);
            }
            _ if input.starts_with(':') => {
                println!("{}", format!("Unknown command {input}. Type :help for help.").yellow());
            }
            _ => {
                let result = game.submit_user_turn(&mut session, input);
                print_result(&result);
                if result.is_accepted() {
                    let reply = game.computer_turn(&mut session);
                    print_result(&reply);
                }
            }
        }

        if session.status().is_round_over() && !input.starts_with(':') {
            println!("{}", "Type :restart to play again or :quit to leave.".dark_grey());
        }
    }

    Ok(())
}

fn start_round(game: &Game, seed: Option<SessionSeed>) -> anyhow::Result<GameSession> {
    let session = game
        .new_session(seed)
        .context("Failed to start a new round")?;
    println!("{}", format!("Seed: {}", session.seed()).dark_grey());
    println!("{}", game.opening_message(&session).bold());
    Ok(session)
}

fn print_result(result: &TurnResult) {
    let message = result.message.as_str();
    match &result.outcome {
        TurnOutcome::Accepted {
            player: Player::User,
            ..
        } => println!("{}", message.green()),
        TurnOutcome::Accepted {
            player: Player::Computer,
            ..
        } => println!("{}", message.cyan()),
        TurnOutcome::Rejected {
            classification, ..
        } => {
            println!("{}", message.yellow());
            if let Some(classification) = classification {
                let detail = format!(
                    "  (classified as {} with confidence {:.2})",
                    classification.label(),
                    classification.confidence()
                );
                println!("{}", detail.dark_grey());
            }
        }
        TurnOutcome::RoundOver { winner, .. } => {
            let message = match winner {
                Player::User => message.green(),
                Player::Computer => message.red(),
            };
            println!("{}", message.bold());
        }
    }
}

fn print_history(game: &Game, session: &GameSession) {
    if session.history().is_empty() {
        println!("No countries named yet.");
        return;
    }
    for (i, canonical) in session.history().iter().enumerate() {
        let name = game
            .catalog()
            .get(canonical)
            .map_or_else(|| title_case(canonical), |country| country.name().to_owned());
        println!("{:>3}. {name}", i + 1);
    }
}
