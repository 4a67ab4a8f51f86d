//! Tournament bracket command line tool.
//!
//! Generates brackets and schedules from a JSON request, records match
//! results against a saved bracket and prints standings.

mod config;
mod logging;
mod render;

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Error, anyhow, bail};
use pico_args::Arguments;
use tourney::advancement::{ResultSubmission, record_result};
use tourney::{BracketError, GeneratedTournament, MatchId, TournamentRequest, generate};

use config::CliConfig;

const HELP: &str = "\
Generate and run deterministic tournament brackets

USAGE:
  tourney_cli <COMMAND> [OPTIONS]

COMMANDS:
  generate     Build, schedule and validate a bracket from a request file
  record       Record a match result in a saved bracket
  standings    Print the standings of a saved bracket

GENERATE OPTIONS:
  --input      FILE        Tournament request (JSON)
  --output     FILE        Write the generated tournament here (JSON)
  --json                   Print JSON instead of text

RECORD OPTIONS:
  --bracket    FILE        Generated tournament (JSON)
  --match      N           Match number, `3` or `M3`
  --winner     ID          Participant id of the winner
  --version    V           Bracket version the result was read at
  --score      A:B         Scores in slot order
  --output     FILE        Write here instead of updating --bracket in place

STANDINGS OPTIONS:
  --bracket    FILE        Generated tournament (JSON)

GLOBAL OPTIONS:
  --max-steps  N           Slot search step cap  [default: env TOURNEY_MAX_SEARCH_STEPS or 100000]

FLAGS:
  -h, --help               Print help information

ENVIRONMENT:
  TOURNEY_MAX_SEARCH_STEPS Slot search step cap
  TOURNEY_SLOT_MINUTES     Default slot length in minutes
  TOURNEY_PRETTY_JSON      Pretty-print JSON output (true/false)
  TOURNEY_LOG_LEVEL        Default log level when RUST_LOG is unset
";

struct GenerateArgs {
    input: PathBuf,
    output: Option<PathBuf>,
    json: bool,
}

struct RecordArgs {
    bracket: PathBuf,
    match_id: MatchId,
    winner: String,
    version: u64,
    score: Option<(u32, u32)>,
    output: Option<PathBuf>,
}

enum Command {
    Generate(GenerateArgs),
    Record(RecordArgs),
    Standings { bracket: PathBuf },
}

fn main() -> Result<(), Error> {
    // Load .env file if it exists
    let _ = dotenvy::dotenv();

    let mut pargs = Arguments::from_env();

    // Help has a higher priority and should be handled separately.
    if pargs.contains(["-h", "--help"]) {
        print!("{HELP}");
        std::process::exit(0);
    }

    let max_steps: Option<u64> = pargs.opt_value_from_str("--max-steps")?;
    let command = parse_command(&mut pargs)?;

    let remaining = pargs.finish();
    if !remaining.is_empty() {
        bail!("Unexpected arguments: {remaining:?}");
    }

    let config = CliConfig::from_env(max_steps)?;
    config.validate()?;
    logging::init(&config.log_level);

    match command {
        Command::Generate(args) => run_generate(&config, args),
        Command::Record(args) => run_record(&config, args),
        Command::Standings { bracket } => run_standings(&bracket),
    }
}

fn parse_command(pargs: &mut Arguments) -> Result<Command, Error> {
    let Some(name) = pargs.subcommand()? else {
        bail!("Missing command, run with --help for usage");
    };

    let command = match name.as_str() {
        "generate" => Command::Generate(GenerateArgs {
            input: pargs.value_from_str("--input")?,
            output: pargs.opt_value_from_str("--output")?,
            json: pargs.contains("--json"),
        }),
        "record" => Command::Record(RecordArgs {
            bracket: pargs.value_from_str("--bracket")?,
            match_id: pargs.value_from_fn("--match", parse_match_id)?,
            winner: pargs.value_from_str("--winner")?,
            version: pargs.value_from_str("--version")?,
            score: pargs.opt_value_from_fn("--score", parse_score)?,
            output: pargs.opt_value_from_str("--output")?,
        }),
        "standings" => Command::Standings {
            bracket: pargs.value_from_str("--bracket")?,
        },
        other => bail!("Unknown command '{other}', run with --help for usage"),
    };

    Ok(command)
}

/// Parse `3` or `M3`
fn parse_match_id(s: &str) -> Result<MatchId, String> {
    let digits = s.strip_prefix(['M', 'm']).unwrap_or(s);
    match digits.parse::<usize>() {
        Ok(n) if n > 0 => Ok(MatchId(n)),
        _ => Err(format!("'{s}' is not a match number")),
    }
}

/// Parse `A:B`
fn parse_score(s: &str) -> Result<(u32, u32), String> {
    let (a, b) = s
        .split_once(':')
        .ok_or_else(|| format!("'{s}' is not a score, expected A:B"))?;
    let a = a.trim().parse().map_err(|_| format!("Invalid score '{a}'"))?;
    let b = b.trim().parse().map_err(|_| format!("Invalid score '{b}'"))?;
    Ok((a, b))
}

fn run_generate(config: &CliConfig, args: GenerateArgs) -> Result<(), Error> {
    let raw = fs::read_to_string(&args.input)
        .with_context(|| format!("Failed to read request {}", args.input.display()))?;
    let request: TournamentRequest = serde_json::from_str(&raw)
        .with_context(|| format!("Invalid tournament request in {}", args.input.display()))?;

    tracing::info!(
        name = %request.name,
        format = %request.format,
        participants = request.participants.len(),
        "Generating tournament"
    );

    let generated = generate(&request, &config.scheduler).map_err(|e| reject("generate", e))?;

    if let Some(output) = &args.output {
        write_tournament(config, output, &generated)?;
        tracing::info!(path = %output.display(), "Tournament saved");
    }

    if args.json {
        println!("{}", to_json(config, &generated)?);
    } else {
        println!("{} ({})", generated.name, generated.fingerprint);
        println!();
        print!("{}", render::render_bracket(&generated.bracket));
        println!();
        print!(
            "{}",
            render::render_schedule(&generated.bracket, &generated.schedule)
        );
        println!();
        print!("{}", render::render_violations(&generated.violations));
    }

    Ok(())
}

fn run_record(config: &CliConfig, args: RecordArgs) -> Result<(), Error> {
    let mut tournament = read_tournament(&args.bracket)?;

    let mut submission = ResultSubmission::new(args.match_id, &args.winner, args.version);
    if let Some((a, b)) = args.score {
        submission = submission.with_scores(a, b);
    }

    let bracket = record_result(&mut tournament.bracket, submission)
        .map_err(|e| reject("record", e))?;
    let version = bracket.version();
    let champion = bracket.champion().cloned();

    let output = args.output.as_deref().unwrap_or(&args.bracket);
    write_tournament(config, output, &tournament)?;

    tracing::info!(
        match_id = %args.match_id,
        winner = %args.winner,
        version,
        path = %output.display(),
        "Result recorded"
    );

    println!("Recorded {} for {} (bracket version {version})", args.winner, args.match_id);
    match champion {
        Some(champion) => println!(
            "Champion: {}",
            tournament.bracket.roster().display_name(&champion)
        ),
        None => {
            let ready: Vec<String> = tournament
                .bracket
                .pending_matches()
                .iter()
                .map(ToString::to_string)
                .collect();
            println!("Ready to play: {}", ready.join(", "));
        }
    }

    Ok(())
}

fn run_standings(path: &Path) -> Result<(), Error> {
    let tournament = read_tournament(path)?;
    print!("{}", render::render_standings(&tournament.bracket));
    if let Some(champion) = tournament.bracket.champion() {
        println!(
            "\nChampion: {}",
            tournament.bracket.roster().display_name(champion)
        );
    }
    Ok(())
}

/// Log the rejection and turn it into a user-facing error
fn reject(command: &str, err: BracketError) -> Error {
    let category = if err.is_stale() { "stale" } else { "rejected" };
    logging::log_rejection(command, category, &err.to_string());
    anyhow!(err.client_message())
}

fn read_tournament(path: &Path) -> Result<GeneratedTournament, Error> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read bracket {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("Invalid bracket file {}", path.display()))
}

fn write_tournament(
    config: &CliConfig,
    path: &Path,
    tournament: &GeneratedTournament,
) -> Result<(), Error> {
    let json = to_json(config, tournament)?;
    fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))
}

fn to_json(config: &CliConfig, tournament: &GeneratedTournament) -> Result<String, Error> {
    let json = if config.pretty_json {
        serde_json::to_string_pretty(tournament)?
    } else {
        serde_json::to_string(tournament)?
    };
    Ok(json)
}
