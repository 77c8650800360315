use std::fmt::Write as _;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{Context, bail};
use clap::Parser;
use serde::Deserialize;
use whodunit_core::*;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// What log level to use
    #[command(flatten)]
    verbose: clap_verbosity_flag::Verbosity,

    /// Seated suspects, comma separated
    #[arg(short, long, value_delimiter = ',')]
    players: Vec<Suspect>,

    /// Suspect who moves first instead of a random one
    #[arg(short, long)]
    first: Option<Suspect>,

    /// Force a seed instead of random
    #[arg(short, long)]
    seed: Option<u64>,

    /// TOML file with `players`, `first_player` and `seed`
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct FileConfig {
    players: Vec<Suspect>,
    first_player: Option<Suspect>,
    seed: Option<u64>,
}

fn load_config(args: &Args) -> anyhow::Result<GameConfig> {
    let file: FileConfig = match &args.config {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("Could not read {}", path.display()))?;
            toml::from_str(&text).with_context(|| format!("Could not parse {}", path.display()))?
        }
        None => FileConfig::default(),
    };

    let players = match (args.players.as_slice(), file.players) {
        ([], players) if !players.is_empty() => players,
        ([], _) => Suspect::ALL.to_vec(),
        (players, _) => players.to_vec(),
    };
    let seed = args.seed.or(file.seed).unwrap_or_else(rand::random);
    let config = GameConfig::new(players, seed)?;
    Ok(match args.first.or(file.first_player) {
        Some(first) => config.with_first_player(first)?,
        None => config,
    })
}

#[derive(Debug)]
enum Command {
    Roll,
    Step(Direction),
    Exit(usize),
    Passage,
    Suggest(Suspect, Weapon),
    Eliminate(Suspect),
    End,
    Where,
    Actions,
    Reach,
    Quit,
}

impl FromStr for Command {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        let mut words = s.split_whitespace();
        let Some(verb) = words.next() else {
            bail!("Empty command");
        };
        let mut arg = |what: &str| {
            words
                .next()
                .with_context(|| format!("`{verb}` needs a {what}"))
        };
        let command = match verb.to_ascii_lowercase().as_str() {
            "roll" | "r" => Self::Roll,
            "exit" | "x" => Self::Exit(arg("door number")?.parse()?),
            "passage" | "p" => Self::Passage,
            "suggest" => {
                let suspect = arg("suspect")?.parse()?;
                Self::Suggest(suspect, arg("weapon")?.parse()?)
            }
            "eliminate" => Self::Eliminate(arg("suspect")?.parse()?),
            "end" => Self::End,
            "where" => Self::Where,
            "actions" | "?" => Self::Actions,
            "reach" => Self::Reach,
            "quit" | "q" => Self::Quit,
            other => match other.parse() {
                Ok(direction) => Self::Step(direction),
                Err(_) => bail!("Unknown command `{verb}`"),
            },
        };
        Ok(command)
    }
}

fn describe(game: &Game, action: &Action) -> String {
    match action {
        Action::RollDice => "roll".into(),
        Action::Step(direction) => format!("{direction:?}").to_ascii_lowercase(),
        Action::TakeExit(exit) => {
            let number = game
                .current_room()
                .map(|room| game.available_exits(room))
                .and_then(|exits| exits.iter().position(|other| other == exit))
                .map_or(0, |index| index + 1);
            format!("exit {number} to {:?}", exit.target)
        }
        Action::SecretPassage { to } => format!("passage to {to:?}"),
        Action::Suggest => "suggest <suspect> <weapon>".into(),
        Action::EndTurn => "end".into(),
    }
}

fn status(game: &Game) -> String {
    let player = game.current_player();
    let at = game
        .position(player)
        .map(|coords| format!("{coords:?}"))
        .unwrap_or_else(|_| "nowhere".into());
    let room = game
        .current_room()
        .map(|room| format!(" in the {room}"))
        .unwrap_or_default();
    format!(
        "{player} at {at}{room}, {:?}, {} moves left",
        game.phase(),
        game.remaining_moves()
    )
}

fn run(game: &mut Game, command: Command) -> Result<String> {
    let output = match command {
        Command::Roll => {
            let roll = game.roll_dice()?;
            let (first, second) = roll.faces();
            format!("Rolled {first} + {second} = {}", roll.total())
        }
        Command::Step(direction) => {
            let to = game.step(direction)?;
            format!("Moved to {to:?}, {} moves left", game.remaining_moves())
        }
        Command::Exit(number) => {
            let room = game.current_room().ok_or(GameError::NotInRoom)?;
            let exit = number
                .checked_sub(1)
                .and_then(|index| game.available_exits(room).get(index).copied())
                .ok_or(GameError::NoAvailableExit)?;
            let to = game.take_exit(room, exit.cell)?;
            format!("Left the {room} to {to:?}")
        }
        Command::Passage => {
            let to = game.use_secret_passage()?;
            match game.current_room() {
                Some(room) => format!("Came out in the {room}"),
                None => format!("Came out at {to:?}"),
            }
        }
        Command::Suggest(suspect, weapon) => {
            let suggestion = game.suggest(suspect, weapon)?;
            format!(
                "{} suggests {} with the {} in the {}",
                suggestion.suggester, suggestion.suspect, suggestion.weapon, suggestion.room
            )
        }
        Command::Eliminate(player) => {
            game.eliminate(player)?;
            format!("{player} is out")
        }
        Command::End => format!("{} to play", game.next_turn()?),
        Command::Where => status(game),
        Command::Actions => {
            let actions = game.legal_actions();
            let names: Vec<String> = actions.iter().map(|action| describe(game, action)).collect();
            names.join(", ")
        }
        Command::Reach => {
            let mut output = String::new();
            for coords in game.reachable_cells() {
                let _ = write!(output, "{coords:?} ");
            }
            output.trim_end().to_owned()
        }
        Command::Quit => String::new(),
    };
    Ok(output)
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    env_logger::Builder::new()
        .filter_level(args.verbose.log_level_filter())
        .init();

    let config = load_config(&args)?;
    log::debug!("seed: {}", config.seed);
    let mut game = Game::new(&config)?;

    let mut stdout = io::stdout().lock();
    writeln!(stdout, "{}", status(&game))?;
    for line in io::stdin().lock().lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        match line.parse::<Command>() {
            Ok(Command::Quit) => break,
            Ok(command) => match run(&mut game, command) {
                Ok(output) => writeln!(stdout, "{output}")?,
                Err(err) => writeln!(stdout, "Error: {err}")?,
            },
            Err(err) => writeln!(stdout, "{err}")?,
        }
        stdout.flush()?;
    }
    Ok(())
}
