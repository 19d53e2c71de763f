use std::fmt;
use std::io::Write as _;
use std::sync::Arc;

use services::{Clock, PoolService, QuizConfig, QuizLoopService, QuizSession};
use storage::repository::{QuestionSource, Storage};
use storage::sqlite::SqliteRepository;
use storage::JsonFileSource;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Lines};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod input;
mod render;

use input::{Answer, parse_answer, parse_command};

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidSessionSize { raw: String },
    InvalidSeed { raw: String },
    InvalidDbUrl { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidSessionSize { raw } => {
                write!(f, "invalid --session-size value (must be 1 or more): {raw}")
            }
            ArgsError::InvalidSeed { raw } => write!(f, "invalid --seed value: {raw}"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
        }
    }
}

impl std::error::Error for ArgsError {}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

struct Args {
    questions_path: String,
    db_url: String,
    session_size: usize,
    seed: Option<u64>,
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!(
        "  cargo run -p app -- run   [--questions <path>] [--db <sqlite_url>] [--session-size <n>] [--seed <u64>]"
    );
    eprintln!("  cargo run -p app -- reset [--db <sqlite_url>]   # forget the leftover pool");
    eprintln!();
    eprintln!("Defaults for run:");
    eprintln!("  --questions questions.json");
    eprintln!("  --db sqlite:quiz.sqlite3");
    eprintln!("  --session-size {}", services::config::DEFAULT_SESSION_SIZE);
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  QUIZ_QUESTIONS, QUIZ_DB_URL, QUIZ_SESSION_SIZE, QUIZ_SEED, RUST_LOG");
    eprintln!("  (reset reads only QUIZ_DB_URL)");
}

fn default_db_url() -> String {
    std::env::var("QUIZ_DB_URL")
        .ok()
        .map_or_else(|| normalize_sqlite_url("quiz.sqlite3".into()), normalize_sqlite_url)
}

fn parse_db_url(args: &mut impl Iterator<Item = String>) -> Result<String, ArgsError> {
    let value = require_value(args, "--db")?;
    if value.trim().is_empty() {
        return Err(ArgsError::InvalidDbUrl { raw: value });
    }
    Ok(normalize_sqlite_url(value))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Run,
    Reset,
}

impl Command {
    fn from_arg(arg: &str) -> Option<Self> {
        match arg {
            "run" => Some(Self::Run),
            "reset" => Some(Self::Reset),
            _ => None,
        }
    }
}

fn parse_session_size(raw: String) -> Result<usize, ArgsError> {
    match raw.trim().parse::<usize>() {
        Ok(size) if size > 0 => Ok(size),
        _ => Err(ArgsError::InvalidSessionSize { raw }),
    }
}

fn parse_seed(raw: String) -> Result<u64, ArgsError> {
    raw.trim()
        .parse()
        .map_err(|_| ArgsError::InvalidSeed { raw })
}

impl Args {
    fn parse(args: &mut impl Iterator<Item = String>) -> Result<Self, ArgsError> {
        let mut questions_path =
            std::env::var("QUIZ_QUESTIONS").unwrap_or_else(|_| "questions.json".into());
        let mut db_url = default_db_url();
        let mut session_size = match std::env::var("QUIZ_SESSION_SIZE") {
            Ok(raw) => parse_session_size(raw)?,
            Err(_) => services::config::DEFAULT_SESSION_SIZE,
        };
        let mut seed = match std::env::var("QUIZ_SEED") {
            Ok(raw) => Some(parse_seed(raw)?),
            Err(_) => None,
        };

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--questions" => questions_path = require_value(args, "--questions")?,
                "--db" => db_url = parse_db_url(args)?,
                "--session-size" => {
                    session_size = parse_session_size(require_value(args, "--session-size")?)?;
                }
                "--seed" => seed = Some(parse_seed(require_value(args, "--seed")?)?),
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(Self {
            questions_path,
            db_url,
            session_size,
            seed,
        })
    }
}

/// Arguments for `reset`, which only touches the pool database.
struct ResetArgs {
    db_url: String,
}

impl ResetArgs {
    fn parse(args: &mut impl Iterator<Item = String>) -> Result<Self, ArgsError> {
        let mut db_url = default_db_url();
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => db_url = parse_db_url(args)?,
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }
        Ok(Self { db_url })
    }
}

fn normalize_sqlite_url(raw: String) -> String {
    if raw == "sqlite::memory:" || raw.starts_with("sqlite://") {
        return raw;
    }

    let trimmed = raw.trim().to_string();
    let path_str = trimmed
        .strip_prefix("sqlite:")
        .unwrap_or(trimmed.as_str())
        .to_string();
    let path = std::path::Path::new(&path_str);
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| std::path::PathBuf::from("."))
            .join(path)
    };
    format!("sqlite://{}", absolute.display())
}

fn prepare_sqlite_file(db_url: &str) -> Result<(), Box<dyn std::error::Error>> {
    if db_url == "sqlite::memory:" {
        return Ok(());
    }

    let path = db_url
        .strip_prefix("sqlite://")
        .ok_or_else(|| ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        })?;
    let path = path.split('?').next().unwrap_or(path);
    if path.is_empty() {
        return Err(ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        }
        .into());
    }

    let path = std::path::Path::new(path);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    if !path.exists() {
        std::fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(path)?;
    }

    Ok(())
}

async fn read_line<R>(lines: &mut Lines<R>, prompt: &str) -> std::io::Result<Option<String>>
where
    R: AsyncBufRead + Unpin,
{
    print!("{prompt}");
    std::io::stdout().flush()?;
    lines.next_line().await
}

/// Drive one session on the terminal. Returns `false` if the user quit.
async fn play<R>(
    quiz: &QuizLoopService,
    session: &mut QuizSession,
    lines: &mut Lines<R>,
) -> Result<bool, Box<dyn std::error::Error>>
where
    R: AsyncBufRead + Unpin,
{
    while let Some(view) = session.current_view() {
        let Some(question) = session.current_question().cloned() else {
            break;
        };
        print!("{}", render::question(&view, &session.progress()));

        let graded = loop {
            let Some(line) = read_line(lines, render::prompt(&view)).await? else {
                return Ok(false);
            };
            match parse_answer(&line, &question) {
                Ok(Answer::Quit) => return Ok(false),
                Ok(Answer::Finish) => break None,
                Ok(Answer::Select(selection)) => {
                    match quiz.submit_answer(session, &selection) {
                        Ok(result) => break Some(result),
                        Err(err) if err.is_recoverable() => println!("Please select an answer."),
                        Err(err) => return Err(err.into()),
                    }
                }
                Err(err) => println!("{err}"),
            }
        };

        let Some(result) = graded else {
            return Ok(true);
        };
        println!("{}", render::outcome(&result.outcome));

        let Some(line) = read_line(lines, &format!("{}> ", render::next_hint(&view))).await? else {
            return Ok(false);
        };
        match parse_command(&line) {
            Some(Answer::Quit) => return Ok(false),
            Some(Answer::Finish) => return Ok(true),
            _ => {}
        }
        quiz.next_question(session)?;
    }
    Ok(true)
}

async fn run_quiz(parsed: Args) -> Result<(), Box<dyn std::error::Error>> {
    // Open + migrate SQLite at startup. Keep this in the binary glue so core/services stay pure.
    prepare_sqlite_file(&parsed.db_url)?;
    let questions: Arc<dyn QuestionSource> = Arc::new(JsonFileSource::new(&parsed.questions_path));
    let storage = Storage::sqlite(questions, &parsed.db_url).await?;

    let config = QuizConfig::default().with_session_size(parsed.session_size);
    let mut quiz = QuizLoopService::load(&storage, config, Clock::default_clock()).await?;
    if let Some(seed) = parsed.seed {
        quiz = quiz.with_seed(seed);
    }

    let mut session = quiz.start_session().await?;
    let remaining = quiz.remaining_in_pool().await?;
    println!(
        "Session loaded: {} of {} questions. Remaining in pool for next time: {remaining}.",
        session.total(),
        quiz.bank_len()
    );

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    if !play(&quiz, &mut session, &mut lines).await? {
        info!("quit without report");
        return Ok(());
    }

    let report = if session.is_complete() {
        quiz.get_report(&session)?
    } else {
        quiz.finish_now(&mut session)
    };
    print!("{}", render::report(&report));
    Ok(())
}

async fn reset_pool(parsed: ResetArgs) -> Result<(), Box<dyn std::error::Error>> {
    prepare_sqlite_file(&parsed.db_url)?;
    let repo = SqliteRepository::connect(&parsed.db_url).await?;
    repo.migrate().await?;
    let config = QuizConfig::default();
    PoolService::new(Arc::new(repo), config.queue_key)
        .reset_pool()
        .await?;
    println!("Pool cleared; the next session starts a fresh cycle.");
    Ok(())
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut argv: Vec<String> = std::env::args().skip(1).collect();

    // Default behavior: run a quiz when no subcommand is provided.
    let cmd = match argv.first().map(String::as_str) {
        None => Command::Run,
        Some("--help" | "-h") => {
            print_usage();
            return Ok(());
        }
        Some(first) if first.starts_with("--") => Command::Run,
        Some(first) => Command::from_arg(first).ok_or_else(|| {
            eprintln!("unknown subcommand: {first}");
            print_usage();
            std::io::Error::new(std::io::ErrorKind::InvalidInput, "unknown subcommand")
        })?,
    };

    if !argv.is_empty() && !argv[0].starts_with("--") {
        argv.remove(0);
    }

    let usage_on_error = |e: ArgsError| {
        eprintln!("{e}");
        print_usage();
        e
    };
    let mut argv = argv.into_iter();
    match cmd {
        Command::Run => run_quiz(Args::parse(&mut argv).map_err(usage_on_error)?).await,
        Command::Reset => reset_pool(ResetArgs::parse(&mut argv).map_err(usage_on_error)?).await,
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    if let Err(err) = run().await {
        // The only place errors are printed.
        eprintln!("{err}");
        std::process::exit(2);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::model::QuestionDraft;
    use quiz_core::time::fixed_clock;
    use storage::InMemoryRepository;

    fn quiz(len: usize) -> QuizLoopService {
        let bank = (0..len)
            .map(|i| {
                QuestionDraft::new(format!("Q{i}"), ["right", "wrong"], ["right"])
                    .validate()
                    .unwrap()
            })
            .collect();
        QuizLoopService::new(
            bank,
            Arc::new(InMemoryRepository::new()),
            QuizConfig::default().with_session_size(len),
            fixed_clock(),
        )
        .with_seed(1)
    }

    fn input(text: &'static str) -> Lines<BufReader<&'static [u8]>> {
        BufReader::new(text.as_bytes()).lines()
    }

    fn args(list: &[&str]) -> impl Iterator<Item = String> {
        list.iter().map(|s| (*s).to_string()).collect::<Vec<_>>().into_iter()
    }

    #[test]
    fn parses_flags() {
        let parsed = Args::parse(&mut args(&[
            "--questions",
            "bank.json",
            "--db",
            "sqlite::memory:",
            "--session-size",
            "5",
            "--seed",
            "9",
        ]))
        .unwrap();
        assert_eq!(parsed.questions_path, "bank.json");
        assert_eq!(parsed.db_url, "sqlite::memory:");
        assert_eq!(parsed.session_size, 5);
        assert_eq!(parsed.seed, Some(9));
    }

    #[test]
    fn rejects_zero_session_size() {
        let err = Args::parse(&mut args(&["--session-size", "0"])).err().unwrap();
        assert!(matches!(err, ArgsError::InvalidSessionSize { .. }));
    }

    #[test]
    fn rejects_missing_value_and_unknown_flag() {
        assert!(matches!(
            Args::parse(&mut args(&["--seed"])).err().unwrap(),
            ArgsError::MissingValue { flag: "--seed" }
        ));
        assert!(matches!(
            Args::parse(&mut args(&["--nope"])).err().unwrap(),
            ArgsError::UnknownArg(_)
        ));
    }

    #[test]
    fn reset_accepts_only_db() {
        let parsed = ResetArgs::parse(&mut args(&["--db", "sqlite::memory:"])).unwrap();
        assert_eq!(parsed.db_url, "sqlite::memory:");
        assert!(matches!(
            ResetArgs::parse(&mut args(&["--questions", "x.json"])).err().unwrap(),
            ArgsError::UnknownArg(arg) if arg == "--questions"
        ));
        assert!(matches!(
            ResetArgs::parse(&mut args(&["--session-size", "3"])).err().unwrap(),
            ArgsError::UnknownArg(_)
        ));
    }

    #[tokio::test]
    async fn quit_after_grading_leaves_without_advancing() {
        let mut quiz = quiz(3);
        let mut session = quiz.start_session().await.unwrap();
        let mut lines = input("a\nquit\nb\n");

        assert!(!play(&quiz, &mut session, &mut lines).await.unwrap());
        assert_eq!(session.progress().answered, 1);
        assert!(session.is_answered());
        assert!(!session.is_complete());
    }

    #[tokio::test]
    async fn finish_after_grading_ends_with_report() {
        let mut quiz = quiz(3);
        let mut session = quiz.start_session().await.unwrap();
        let mut lines = input("a\n\nb\nfinish\n");

        assert!(play(&quiz, &mut session, &mut lines).await.unwrap());
        let report = quiz.finish_now(&mut session);
        assert_eq!(report.answered, 2);
        assert_eq!(report.unanswered, 1);
    }

    #[tokio::test]
    async fn enter_walks_through_every_question() {
        let mut quiz = quiz(2);
        let mut session = quiz.start_session().await.unwrap();
        let mut lines = input("a\n\na\n\n");

        assert!(play(&quiz, &mut session, &mut lines).await.unwrap());
        assert!(session.is_complete());
        assert_eq!(quiz.get_report(&session).unwrap().score, 2);
    }

    #[test]
    fn normalizes_relative_sqlite_paths() {
        let url = normalize_sqlite_url("sqlite:data/quiz.sqlite3".into());
        assert!(url.starts_with("sqlite:///"));
        assert!(url.ends_with("data/quiz.sqlite3"));
        assert_eq!(
            normalize_sqlite_url("sqlite:///tmp/q.db".into()),
            "sqlite:///tmp/q.db"
        );
    }
}
