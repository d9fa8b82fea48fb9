use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use quiz_core::model::{Question, SessionPhase};
use quiz_core::rules::{DEFAULT_LOW_TIME_THRESHOLD_SECS, DEFAULT_STARTING_LIVES, DEFAULT_TIME_LIMIT_SECS};
use quiz_core::{Clock, Finalization, GameRules, GameRulesDraft, Resolution, SessionError, SignalKind};
use services::{AppServices, GameLoopService, GameServiceError, GameSession, SessionSnapshot, SessionStep, run_ticker};
use storage::JsonQuestionFile;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::Mutex;
use tracing_subscriber::EnvFilter;

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidDbUrl { raw: String },
    InvalidNumber { flag: &'static str, raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
            ArgsError::InvalidNumber { flag, raw } => write!(f, "invalid {flag} value: {raw}"),
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

fn parse_number(value: String, flag: &'static str) -> Result<u32, ArgsError> {
    value
        .trim()
        .parse()
        .map_err(|_| ArgsError::InvalidNumber { flag, raw: value })
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  quiz [--db <sqlite_url>] [--questions <path>] [--time-limit <secs>] [--lives <n>]");
    eprintln!();
    eprintln!("Defaults:");
    eprintln!("  --db sqlite://quiz.sqlite3");
    eprintln!("  --questions data/questions.json");
    eprintln!("  --time-limit {DEFAULT_TIME_LIMIT_SECS}");
    eprintln!("  --lives {DEFAULT_STARTING_LIVES}");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  QUIZ_DB_URL, QUIZ_QUESTIONS, RUST_LOG");
}

struct Args {
    db_url: String,
    questions: PathBuf,
    time_limit_secs: u32,
    lives: u32,
}

impl Args {
    fn parse(args: &mut impl Iterator<Item = String>) -> Result<Self, ArgsError> {
        let mut db_url = std::env::var("QUIZ_DB_URL")
            .ok()
            .map_or_else(|| normalize_sqlite_url("quiz.sqlite3".into()), normalize_sqlite_url);
        let mut questions = std::env::var("QUIZ_QUESTIONS")
            .map_or_else(|_| PathBuf::from("data/questions.json"), PathBuf::from);
        let mut time_limit_secs = DEFAULT_TIME_LIMIT_SECS;
        let mut lives = DEFAULT_STARTING_LIVES;

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => {
                    let value = require_value(args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    db_url = normalize_sqlite_url(value);
                }
                "--questions" => {
                    questions = PathBuf::from(require_value(args, "--questions")?);
                }
                "--time-limit" => {
                    time_limit_secs = parse_number(require_value(args, "--time-limit")?, "--time-limit")?;
                }
                "--lives" => {
                    lives = parse_number(require_value(args, "--lives")?, "--lives")?;
                }
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(Self {
            db_url,
            questions,
            time_limit_secs,
            lives,
        })
    }

    fn rules(&self) -> Result<GameRules, Box<dyn std::error::Error>> {
        let rules = GameRulesDraft {
            time_limit_secs: self.time_limit_secs,
            starting_lives: self.lives,
            low_time_threshold_secs: DEFAULT_LOW_TIME_THRESHOLD_SECS
                .min(self.time_limit_secs.saturating_sub(1)),
            ..GameRulesDraft::default()
        }
        .validate()?;
        Ok(rules)
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
            .unwrap_or_else(|_| PathBuf::from("."))
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

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

//
// ─── RENDERING ─────────────────────────────────────────────────────────────────
//

fn render_question(snapshot: &SessionSnapshot) {
    let Some(question) = snapshot.question.as_ref() else {
        return;
    };
    println!();
    println!(
        "[{}/{}] lives {}  score {}  streak {}  time {}s  best {}",
        snapshot.question_number,
        snapshot.total_questions,
        snapshot.lives,
        snapshot.score,
        snapshot.streak,
        snapshot.time_remaining,
        snapshot.high_score,
    );
    if question.category().is_empty() {
        println!("{}", question.prompt());
    } else {
        println!("({}) {}", question.category(), question.prompt());
    }
    for (idx, option) in question.options().iter().enumerate() {
        println!("  {}) {option}", idx + 1);
    }
    println!("answer 1-{} (q to quit):", question.options().len());
}

fn report_tick(snapshot: &SessionSnapshot, step: &SessionStep) {
    match step.transition.resolution {
        None if step.transition.crossed_low_time && snapshot.has_signal(SignalKind::LowTime) => {
            println!("!! {}s left", snapshot.time_remaining);
        }
        Some(Resolution::TimedOut) => {
            println!("time's up! -1 life");
            if snapshot.phase == SessionPhase::Active {
                render_question(snapshot);
            }
        }
        _ => {}
    }
}

fn render_feedback(question: &Question, step: &SessionStep) {
    match step.transition.resolution {
        Some(Resolution::Correct {
            awarded,
            bonus_life,
        }) => {
            println!("correct! +{awarded}");
            if bonus_life {
                println!("+1 LIFE! streak bonus");
            }
        }
        Some(Resolution::Incorrect) => {
            println!("wrong. answer was: {}", question.correct_answer());
        }
        Some(Resolution::TimedOut) | None => {}
    }
}

fn render_report(result: &Finalization) {
    let stats = result.stats();
    println!();
    println!("=== GAME OVER ===");
    println!("rank      {}", stats.performance_tier());
    println!("score     {}", stats.final_score());
    println!("answered  {}", stats.total_questions());
    println!("correct   {}", stats.correct_answers());
    println!("wrong     {}", stats.wrong_answers());
    println!("accuracy  {}%", stats.accuracy_percent());
    if let Some(margin) = result.margin() {
        println!("NEW HIGH SCORE! beat the previous record by {margin}");
    } else {
        println!("high score {}", result.high_score());
    }
}

//
// ─── GAME LOOP ─────────────────────────────────────────────────────────────────
//

enum Input {
    Continue,
    Finished,
    Quit,
}

async fn handle_input(
    game_loop: &GameLoopService,
    session: &Mutex<GameSession>,
    input: &str,
) -> Result<Input, GameServiceError> {
    if input.eq_ignore_ascii_case("q") {
        return Ok(Input::Quit);
    }

    let mut guard = session.lock().await;
    let Some(question) = guard.state().current_question().cloned() else {
        return Ok(Input::Continue);
    };
    let Some(option) = input
        .parse::<usize>()
        .ok()
        .and_then(|n| n.checked_sub(1))
        .and_then(|idx| question.options().get(idx))
        .cloned()
    else {
        println!("pick 1-{}, or q to quit", question.options().len());
        return Ok(Input::Continue);
    };

    let step = match game_loop.answer(&mut guard, &option).await {
        Ok(step) => step,
        Err(GameServiceError::Session(SessionError::FeedbackPending)) => {
            println!("hold on...");
            return Ok(Input::Continue);
        }
        Err(GameServiceError::Storage(err)) => {
            eprintln!("could not save high score: {err}");
            return Ok(Input::Finished);
        }
        Err(err) => return Err(err),
    };
    render_feedback(&question, &step);
    if step.ended() {
        return Ok(Input::Finished);
    }

    let delay = guard.rules().feedback_delay().to_std().unwrap_or_default();
    drop(guard);
    tokio::time::sleep(delay).await;

    let mut guard = session.lock().await;
    guard.acknowledge_feedback();
    if guard.phase() == SessionPhase::Active {
        render_question(&guard.snapshot());
    }
    Ok(Input::Continue)
}

async fn play(app: &AppServices, pool: Vec<Question>) -> Result<(), Box<dyn std::error::Error>> {
    let game_loop = app.game_loop();
    let session = Arc::new(Mutex::new(game_loop.start_session(pool).await?));
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        render_question(&session.lock().await.snapshot());
        let mut ticker = tokio::spawn(run_ticker(
            Arc::clone(&game_loop),
            Arc::clone(&session),
            Duration::from_secs(1),
            report_tick,
        ));

        loop {
            tokio::select! {
                joined = &mut ticker => {
                    match joined? {
                        Ok(_) => {}
                        Err(GameServiceError::Storage(err)) => {
                            eprintln!("could not save high score: {err}");
                        }
                        Err(err) => return Err(err.into()),
                    }
                    break;
                }
                line = lines.next_line() => {
                    let Some(line) = line? else {
                        ticker.abort();
                        return Ok(());
                    };
                    match handle_input(&game_loop, &session, line.trim()).await? {
                        Input::Continue => {}
                        Input::Finished => {
                            ticker.abort();
                            break;
                        }
                        Input::Quit => {
                            ticker.abort();
                            return Ok(());
                        }
                    }
                }
            }
        }

        let mut guard = session.lock().await;
        if guard.unsaved_high_score().is_some() {
            if let Err(err) = game_loop.retry_persist(&mut guard).await {
                eprintln!("high score still not saved: {err}");
            }
        }
        if let Some(result) = guard.finalization() {
            render_report(result);
        }
        drop(guard);

        println!("play again? [y/N]");
        match lines.next_line().await? {
            Some(answer) if answer.trim().eq_ignore_ascii_case("y") => {
                game_loop.restart(&mut *session.lock().await)?;
            }
            _ => return Ok(()),
        }
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut argv = std::env::args().skip(1);
    let parsed = Args::parse(&mut argv).map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;
    let rules = parsed.rules()?;
    tracing::info!(
        db = %parsed.db_url,
        questions = %parsed.questions.display(),
        time_limit = rules.time_limit_secs(),
        lives = rules.starting_lives(),
        "starting quiz"
    );

    // Open + migrate SQLite in the binary glue so core/services stay pure.
    prepare_sqlite_file(&parsed.db_url)?;
    let source = Arc::new(JsonQuestionFile::new(&parsed.questions));
    let app = AppServices::new_sqlite(&parsed.db_url, source, Clock::system(), rules).await?;

    let pool = match app.questions().load().await {
        Ok(pool) => pool,
        Err(err) => return Err(format!("{err}\n{}", err.remediation()).into()),
    };

    play(&app, pool).await
}

#[tokio::main]
async fn main() {
    init_tracing();
    if let Err(err) = run().await {
        // At this layer (binary glue), printing once is fine.
        eprintln!("{err}");
        std::process::exit(2);
    }
}
