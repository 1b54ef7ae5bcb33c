//! RPSense CLI
//!
//! Usage:
//!   rpsense --interactive --strategy markov     # Play from the terminal
//!   rpsense --simulate 100 --pattern cycle      # Scripted player vs opponent
//!   rpsense --serve                             # HTTP API server
//!   rpsense --simulate 20 --json                # JSON output

use clap::{Parser, ValueEnum};
use colored::Colorize;
use rand::Rng;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use rpsense::core::{run_server, CurlEstimator, GameSession, RoundEvent, RoundStateMachine};
use rpsense::types::{
    GameConfig, GameError, GestureObservation, Move, RoundOutcome, RoundOutput, StrategyMode,
    StreakPolicy,
};
use rpsense::VERSION;

#[derive(Parser, Debug)]
#[command(
    name = "rpsense",
    version = VERSION,
    about = "RPSense - Rock, paper, scissors against an adaptive opponent",
    long_about = "RPSense runs rounds of rock-paper-scissors: a hand is seen,\n\
                  a countdown runs, and the opponent answers with one of\n\
                  four strategies.\n\n\
                  Strategies:\n  \
                  random       - Uniform random\n  \
                  conditional  - Win-stay, lose-shift\n  \
                  markov       - First-order transition prediction\n  \
                  anticipate   - Counters what it sees during the countdown\n\n\
                  Modes:\n  \
                  --interactive  Type your move each round\n  \
                  --simulate N   Scripted player for N rounds\n  \
                  --serve        HTTP API server mode"
)]
struct Args {
    /// Opponent strategy (random, conditional, markov, anticipate)
    #[arg(short, long)]
    strategy: Option<String>,

    /// Interactive mode - read moves from stdin
    #[arg(short, long)]
    interactive: bool,

    /// Play N rounds with a scripted player
    #[arg(long, value_name = "N")]
    simulate: Option<u32>,

    /// Scripted player behaviour for --simulate
    #[arg(long, value_enum, default_value_t = Pattern::Cycle)]
    pattern: Pattern,

    /// Run as HTTP API server
    #[arg(long)]
    serve: bool,

    /// Server address (default: 127.0.0.1:3000)
    #[arg(long, default_value = "127.0.0.1:3000")]
    addr: String,

    /// JSON config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Countdown start value (overrides config)
    #[arg(long)]
    countdown: Option<u32>,

    /// Milliseconds per countdown tick (overrides config)
    #[arg(long)]
    tick_ms: Option<u64>,

    /// Seed for the opponent RNG (overrides config)
    #[arg(long)]
    seed: Option<u64>,

    /// Streak counter: player-wins or player-losses (overrides config)
    #[arg(long)]
    streak_policy: Option<String>,

    /// Output as JSON
    #[arg(long)]
    json: bool,

    /// Disable colors in output
    #[arg(long)]
    no_color: bool,

    /// Debug logging
    #[arg(short, long)]
    verbose: bool,
}

/// Scripted player behaviours
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Pattern {
    /// Rock, Paper, Scissors, Rock, ...
    Cycle,
    /// Always Rock
    Repeat,
    /// Uniform random
    Random,
    /// Plays whatever the computer played last
    Copycat,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();
    init_logging(args.verbose, args.serve);
    if args.no_color {
        colored::control::set_override(false);
    }

    if let Err(e) = run(args).await {
        eprintln!("{} {}", "error:".red().bold(), e);
        std::process::exit(1);
    }
}

/// RUST_LOG wins; otherwise quiet while playing, chatty when serving
fn init_logging(verbose: bool, serve: bool) {
    let default = match (verbose, serve) {
        (true, _) => "debug",
        (false, true) => "info",
        (false, false) => "warn",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default)).init();
}

async fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config(&args)?;
    let mode = args.strategy.as_deref().map(str::parse::<StrategyMode>).transpose()?;

    if args.serve {
        print_header("API Server");
        run_server(&args.addr, config).await?;
    } else if let Some(rounds) = args.simulate {
        run_simulation(config, mode.unwrap_or(StrategyMode::Markov), rounds, &args)?;
    } else {
        // Default to interactive if no mode specified
        run_interactive(config, mode, &args)?;
    }
    Ok(())
}

/// Config file first, then CLI overrides
fn load_config(args: &Args) -> Result<GameConfig, GameError> {
    let mut config = match &args.config {
        Some(path) => GameConfig::from_file(path)?,
        None => GameConfig::default(),
    };
    if let Some(countdown) = args.countdown {
        config.countdown_secs = countdown;
    }
    if let Some(tick_ms) = args.tick_ms {
        config.tick_interval_ms = tick_ms;
    }
    if let Some(seed) = args.seed {
        config.seed = Some(seed);
    }
    if let Some(policy) = &args.streak_policy {
        config.streak_policy = policy.parse::<StreakPolicy>()?;
    }
    config.validate()?;
    Ok(config)
}

fn new_session(config: &GameConfig) -> GameSession {
    let classifier = CurlEstimator::new(config.min_gesture_score);
    GameSession::new(RoundStateMachine::new(config.clone()), Box::new(classifier))
}

// =============================================================================
// SIMULATION
// =============================================================================

struct ScriptedPlayer {
    pattern: Pattern,
    round: usize,
    rng: rand::rngs::ThreadRng,
}

impl ScriptedPlayer {
    fn new(pattern: Pattern) -> Self {
        Self {
            pattern,
            round: 0,
            rng: rand::thread_rng(),
        }
    }

    fn next_move(&mut self, last_computer: Option<Move>) -> Move {
        let mv = match self.pattern {
            Pattern::Cycle => Move::ALL[self.round % 3],
            Pattern::Repeat => Move::Rock,
            Pattern::Random => Move::ALL[self.rng.gen_range(0..3)],
            Pattern::Copycat => last_computer.unwrap_or(Move::Rock),
        };
        self.round += 1;
        mv
    }
}

/// Run scripted rounds without pacing
fn run_simulation(
    config: GameConfig,
    mode: StrategyMode,
    rounds: u32,
    args: &Args,
) -> Result<(), GameError> {
    let mut session = new_session(&config);
    let mut player = ScriptedPlayer::new(args.pattern);
    let mut tally = [0u32; 4];
    let mut last_computer = None;

    session.apply(RoundEvent::SelectStrategy(mode))?;
    session.apply(RoundEvent::FeedReady)?;

    if !args.json {
        print_header("Simulation");
        println!("Strategy: {} | player pattern: {:?} | rounds: {}", mode, args.pattern, rounds);
        println!();
    }

    for round in 1..=rounds {
        let obs = GestureObservation::new(player.next_move(last_computer), 1.0);
        let output = play_round(&mut session, obs, config.countdown_secs)?;
        last_computer = output.computer_move;

        if let Some(outcome) = output.outcome {
            tally[outcome_slot(outcome)] += 1;
        }
        if args.json {
            println!("{}", serde_json::to_string(&output)?);
        } else if args.no_color {
            println!("#{:<4} {}", round, output.to_parseable_string());
        } else {
            println!("#{:<4} {}", round, format_result(&output));
        }
        session.apply(RoundEvent::ResetRound)?;
    }

    if !args.json {
        let played = rounds.max(1) as f64;
        println!();
        println!(
            "Player {} wins, computer {} wins, {} ties, {} forfeits",
            tally[0], tally[1], tally[2], tally[3]
        );
        println!("Computer win rate: {:.1}%", tally[1] as f64 / played * 100.0);
    }
    Ok(())
}

/// Hold one gesture through the countdown and return the resolved output
fn play_round(
    session: &mut GameSession,
    obs: GestureObservation,
    countdown: u32,
) -> Result<RoundOutput, GameError> {
    let mut output = session.apply(RoundEvent::Observation(Some(obs)))?;
    for _ in 0..countdown {
        output = session.apply(RoundEvent::Tick)?;
        if output.outcome.is_some() {
            break;
        }
        session.apply(RoundEvent::Observation(Some(obs)))?;
    }
    Ok(output)
}

fn outcome_slot(outcome: RoundOutcome) -> usize {
    match outcome {
        RoundOutcome::PlayerWin => 0,
        RoundOutcome::ComputerWin => 1,
        RoundOutcome::Tie => 2,
        RoundOutcome::NoGesture => 3,
    }
}

// =============================================================================
// INTERACTIVE
// =============================================================================

/// Run interactive mode: one typed move per round
fn run_interactive(
    config: GameConfig,
    mode: Option<StrategyMode>,
    args: &Args,
) -> Result<(), GameError> {
    let mut session = new_session(&config);
    let stdin = io::stdin();

    print_header("Interactive");
    let Some(mode) = mode.or_else(|| prompt_strategy(&stdin)) else {
        return Ok(());
    };
    start_session(&mut session, mode)?;

    println!("Show your move: rock, paper or scissors (r/p/s).");
    println!("Blank line = hand not recognized. 'change' picks a new strategy, 'quit' exits.");
    println!();

    loop {
        print!("{} ", "✊✋✌ >".bold());
        io::stdout().flush()?;

        let Some(line) = read_line(&stdin) else { break };
        let line = line.trim();
        if line.eq_ignore_ascii_case("quit") || line.eq_ignore_ascii_case("exit") {
            let scores = session.machine().scores();
            println!("\nSession ended. Final score: you {} - {} computer", scores.player, scores.computer);
            break;
        }
        if line.eq_ignore_ascii_case("change") {
            session.apply(RoundEvent::ChangeStrategy)?;
            let Some(mode) = prompt_strategy(&stdin) else { break };
            start_session(&mut session, mode)?;
            continue;
        }

        let obs = if line.is_empty() {
            None
        } else {
            match line.parse::<Move>() {
                Ok(mv) => Some(GestureObservation::new(mv, 1.0)),
                Err(e) => {
                    println!("{}", format!("  {}", e).yellow());
                    continue;
                }
            }
        };

        let output = countdown_round(&mut session, obs, &config)?;
        if args.json {
            println!("{}", serde_json::to_string(&output)?);
        } else if args.no_color {
            println!("{}", output.to_parseable_string());
        } else {
            println!("{}", format_result(&output));
        }
        session.apply(RoundEvent::ResetRound)?;
    }
    Ok(())
}

fn start_session(session: &mut GameSession, mode: StrategyMode) -> Result<(), GameError> {
    session.apply(RoundEvent::SelectStrategy(mode))?;
    session.apply(RoundEvent::FeedReady)?;
    println!("{} {}", "Opponent strategy:".bold(), mode.to_string().cyan());
    Ok(())
}

/// Run the countdown at the configured pace
fn countdown_round(
    session: &mut GameSession,
    obs: Option<GestureObservation>,
    config: &GameConfig,
) -> Result<RoundOutput, GameError> {
    let mut output = session.apply(RoundEvent::Observation(obs))?;
    while output.outcome.is_none() && session.machine().timer_armed() {
        print!("  {}… ", output.countdown.to_string().yellow().bold());
        io::stdout().flush()?;
        std::thread::sleep(config.tick_interval());
        output = session.apply(RoundEvent::Tick)?;
    }
    println!();
    Ok(output)
}

fn prompt_strategy(stdin: &io::Stdin) -> Option<StrategyMode> {
    println!("{}", "Choose an opponent:".bold());
    for (i, mode) in StrategyMode::ALL.iter().enumerate() {
        println!("  {}. {:<12} {}", i + 1, mode.to_string().cyan(), mode.description().dimmed());
    }
    loop {
        print!("strategy > ");
        io::stdout().flush().ok()?;
        let line = read_line(stdin)?;
        match line.parse::<StrategyMode>() {
            Ok(mode) => return Some(mode),
            Err(e) => println!("{}", format!("  {}", e).yellow()),
        }
    }
}

fn read_line(stdin: &io::Stdin) -> Option<String> {
    let mut line = String::new();
    match stdin.lock().read_line(&mut line) {
        Ok(0) | Err(_) => None,
        Ok(_) => Some(line),
    }
}

// =============================================================================
// FORMATTING
// =============================================================================

fn print_header(mode: &str) {
    println!("{}", "=".repeat(50));
    println!("{}", format!("  RPSense v{} - {}", VERSION, mode).bright_cyan().bold());
    println!("{}", "=".repeat(50));
    println!();
}

fn format_result(output: &RoundOutput) -> String {
    let Some(outcome) = output.outcome else {
        return output.to_terminal_string();
    };
    let message = match outcome {
        RoundOutcome::PlayerWin => outcome.message().bright_green().bold(),
        RoundOutcome::ComputerWin => outcome.message().red().bold(),
        RoundOutcome::Tie => outcome.message().yellow(),
        RoundOutcome::NoGesture => outcome.message().dimmed(),
    };
    let computer = output
        .computer_move
        .map(|m| format!("{} {}", m.emoji(), m))
        .unwrap_or_else(|| "-".to_string());
    format!(
        "{} | computer played {} | {} | score {} - {}",
        output.player_line().bright_blue(),
        computer.bright_magenta(),
        message,
        output.scores.player,
        output.scores.computer
    )
}
