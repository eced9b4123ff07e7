mod input;
mod render;

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use client::{ApiConfig, HttpApi, HurdleApi, load_document};
use hurdle_core::model::PdfId;
use services::{SessionMachine, SessionPhase, SessionSettings};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines, Stdin};
use tracing_subscriber::EnvFilter;

use input::Command as Input;

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    MissingArgument { name: &'static str },
    UnknownArg(String),
    UnknownCommand(String),
    InvalidPdfId { raw: String },
    InvalidChunkCount { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::MissingArgument { name } => write!(f, "missing <{name}>"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::UnknownCommand(cmd) => write!(f, "unknown subcommand: {cmd}"),
            ArgsError::InvalidPdfId { raw } => write!(f, "invalid document id: {raw:?}"),
            ArgsError::InvalidChunkCount { raw } => write!(f, "invalid chunk count: {raw:?}"),
        }
    }
}

impl std::error::Error for ArgsError {}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p app -- play <file.pdf>              [--api <url>]");
    eprintln!("  cargo run -p app -- resume <pdf_id> <num_chunks> [--api <url>]");
    eprintln!("  cargo run -p app -- download <pdf_id> <out.pdf>  [--api <url>]");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  HURDLE_API_URL, HURDLE_API_TIMEOUT_SECS");
    eprintln!("  HURDLE_ADVANCE (auto|confirm), HURDLE_CORRECT_DELAY_MS, HURDLE_INCORRECT_DELAY_MS");
    eprintln!("  HURDLE_SUMMARY (performance|completion), RUST_LOG");
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Command {
    Play { path: PathBuf },
    Resume { pdf_id: PdfId, num_chunks: u32 },
    Download { pdf_id: PdfId, out: PathBuf },
}

#[derive(Debug)]
struct Args {
    api_url: Option<String>,
    command: Command,
}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

fn parse_pdf_id(raw: String) -> Result<PdfId, ArgsError> {
    PdfId::new(&raw).map_err(|_| ArgsError::InvalidPdfId { raw })
}

impl Args {
    /// `Ok(None)` means help was requested.
    fn parse(args: impl IntoIterator<Item = String>) -> Result<Option<Self>, ArgsError> {
        let mut args = args.into_iter();
        let mut api_url = None;
        let mut positional = Vec::new();

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--api" => api_url = Some(require_value(&mut args, "--api")?),
                "--help" | "-h" => return Ok(None),
                flag if flag.starts_with("--") => return Err(ArgsError::UnknownArg(arg)),
                _ => positional.push(arg),
            }
        }

        let mut positional = positional.into_iter();
        let Some(name) = positional.next() else {
            return Ok(None);
        };
        let mut next = |name: &'static str| {
            positional
                .next()
                .ok_or(ArgsError::MissingArgument { name })
        };

        let command = match name.as_str() {
            "play" => Command::Play {
                path: PathBuf::from(next("file.pdf")?),
            },
            "resume" => {
                let pdf_id = parse_pdf_id(next("pdf_id")?)?;
                let raw = next("num_chunks")?;
                let num_chunks = raw
                    .parse()
                    .map_err(|_| ArgsError::InvalidChunkCount { raw: raw.clone() })?;
                Command::Resume { pdf_id, num_chunks }
            }
            "download" => Command::Download {
                pdf_id: parse_pdf_id(next("pdf_id")?)?,
                out: PathBuf::from(next("out.pdf")?),
            },
            _ => return Err(ArgsError::UnknownCommand(name)),
        };
        if let Some(extra) = positional.next() {
            return Err(ArgsError::UnknownArg(extra));
        }

        Ok(Some(Self { api_url, command }))
    }
}

fn init_tracing() {
    // Logs go to stderr so they never interleave with the prompt on stdout.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let parsed = Args::parse(std::env::args().skip(1)).map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;
    let Some(args) = parsed else {
        print_usage();
        return Ok(());
    };

    let env_config = ApiConfig::from_env()?;
    let config = match &args.api_url {
        Some(url) => ApiConfig::new(url)?.with_timeout(env_config.timeout()),
        None => env_config,
    };
    tracing::debug!(base_url = %config.base_url(), "using backend");
    let api = Arc::new(HttpApi::new(&config)?);

    match args.command {
        Command::Download { pdf_id, out } => {
            let bytes = api.download(&pdf_id).await?;
            tokio::fs::write(&out, &bytes).await?;
            println!("Saved {} bytes to {}", bytes.len(), out.display());
            Ok(())
        }
        Command::Play { path } => {
            let document = load_document(&path).await?;
            let machine = SessionMachine::new(api, SessionSettings::from_env());
            println!("Uploading {}...", document.file_name);
            let receipt = machine
                .upload_and_start(&document.file_name, document.bytes)
                .await?;
            println!(
                "Document {} split into {} chunks.",
                receipt.pdf_id, receipt.num_chunks
            );
            play(&machine).await
        }
        Command::Resume { pdf_id, num_chunks } => {
            let machine = SessionMachine::new(api, SessionSettings::from_env());
            if let Err(err) = machine.start_session(pdf_id, num_chunks).await {
                println!("Could not load the first question: {err}");
            }
            play(&machine).await
        }
    }
}

type Stdio = Lines<BufReader<Stdin>>;

async fn prompt(lines: &mut Stdio, text: &str) -> std::io::Result<Option<String>> {
    let mut stdout = tokio::io::stdout();
    stdout.write_all(text.as_bytes()).await?;
    stdout.flush().await?;
    lines.next_line().await
}

/// Interactive loop until the document is finished or the reader quits.
async fn play(machine: &SessionMachine) -> Result<(), Box<dyn std::error::Error>> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        let state = machine.snapshot();
        // An answered hurdle whose follow-up fetch failed needs a retry, not another answer.
        let phase = match state.phase() {
            SessionPhase::Question if state.is_answered() && !state.is_loading() => {
                SessionPhase::AwaitingHurdle
            }
            phase => phase,
        };
        match phase {
            SessionPhase::NoSession => return Ok(()),
            SessionPhase::Done => break,
            SessionPhase::AwaitingHurdle => {
                if let Some(error) = state.error() {
                    println!("Error: {error}");
                }
                let Some(line) = prompt(&mut lines, "Press enter to retry, or type quit: ").await?
                else {
                    return Ok(());
                };
                if line.trim() == "quit" {
                    return Ok(());
                }
                machine.dismiss_error();
                if let Err(err) = machine.fetch_next_hurdle().await {
                    tracing::debug!(error = %err, "retry failed");
                }
                continue;
            }
            SessionPhase::Question => {}
        }

        let Some(hurdle) = state.hurdle() else {
            continue;
        };
        println!("\n{}", render::status(&state));
        print!("{}", render::HurdleView(hurdle));

        let Some(line) = prompt(&mut lines, "> ").await? else {
            return Ok(());
        };
        let command = match input::parse(&line, &hurdle.task) {
            Ok(command) => command,
            Err(err) => {
                println!("{err}. Type help for answer formats.");
                continue;
            }
        };

        match command {
            Input::Quit => return Ok(()),
            Input::Help => println!("{}", render::HELP),
            Input::Ask(query) => match machine.ask(&query).await {
                Ok(response) => println!("\n{response}"),
                Err(err) => println!("Could not answer that: {err}"),
            },
            Input::Skip => match machine.skip().await {
                Ok(_) => {
                    if let Some(note) = machine.snapshot().feedback() {
                        print!("{}", render::FeedbackView(note));
                    }
                }
                Err(err) => println!("Skip failed: {err}"),
            },
            Input::Answer(answer) => match machine.submit_answer(answer).await {
                Ok(feedback) => {
                    print!("{}", render::FeedbackView(&feedback));
                    await_next(machine, &mut lines, &feedback).await?;
                }
                Err(err) => println!("Submit failed: {err}"),
            },
        }
    }

    match machine.request_performance_summary().await {
        Ok(summary) => print!("{}", render::SummaryView(&summary)),
        Err(err) => println!("Document finished. The summary is unavailable: {err}"),
    }
    Ok(())
}

/// Follow the advance policy after feedback: wait out an automatic advance,
/// or ask the reader to continue.
async fn await_next(
    machine: &SessionMachine,
    lines: &mut Stdio,
    feedback: &hurdle_core::model::Feedback,
) -> std::io::Result<()> {
    match machine.settings().advance.delay_after(feedback) {
        Some(delay) => {
            println!("Next question in {}s...", delay.as_secs());
            loop {
                tokio::time::sleep(Duration::from_millis(100)).await;
                let state = machine.snapshot();
                let settled = state.phase() != SessionPhase::Question
                    || state.timer().running
                    || state.error().is_some();
                if settled && !state.is_loading() {
                    return Ok(());
                }
            }
        }
        None => {
            if prompt(lines, "Press enter to continue: ").await?.is_some() {
                if let Err(err) = machine.continue_to_next().await {
                    println!("Could not load the next question: {err}");
                }
            }
            Ok(())
        }
    }
}

#[tokio::main]
async fn main() {
    init_tracing();
    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}
