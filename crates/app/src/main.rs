use std::fmt;
use std::path::PathBuf;

use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use bergen_core::model::SessionId;
use services::quiz::{OptionMark, QuizPhase, QuizSnapshot};
use services::{
    AppServices, BACKGROUND_TRACK, Clock, FlashcardConfig, FlashcardSession, QuizConfig,
    Soundboard,
};

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidNumber { flag: &'static str, raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
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

fn parse_number<T: std::str::FromStr>(raw: String, flag: &'static str) -> Result<T, ArgsError> {
    raw.trim()
        .parse()
        .map_err(|_| ArgsError::InvalidNumber { flag, raw })
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  bergen [quiz]      [options]   # timed multiple-choice quiz (default)");
    eprintln!("  bergen flashcards  [options]   # tap-through flashcards");
    eprintln!("  bergen categories  [options]   # list word categories");
    eprintln!("  bergen soundboard  [options]   # play a random Bergen sample");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --words-dir <dir>   read chapter JSON files from <dir> (default: bundled)");
    eprintln!("  --questions <n>     questions per quiz (default 10)");
    eprintln!("  --cards <n>         cards per flashcard round (default 20)");
    eprintln!("  --seed <u64>        fixed random seed");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  BERGEN_WORDS_DIR, BERGEN_QUIZ_QUESTIONS, BERGEN_FLASHCARDS, BERGEN_SEED,");
    eprintln!("  BERGEN_LOG");
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Quiz,
    Flashcards,
    Categories,
    Soundboard,
}

impl Command {
    fn from_arg(arg: &str) -> Option<Self> {
        match arg {
            "quiz" => Some(Self::Quiz),
            "flashcards" => Some(Self::Flashcards),
            "categories" => Some(Self::Categories),
            "soundboard" => Some(Self::Soundboard),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Args {
    words_dir: Option<PathBuf>,
    questions: usize,
    cards: usize,
    seed: Option<u64>,
}

impl Default for Args {
    fn default() -> Self {
        Self {
            words_dir: None,
            questions: QuizConfig::default().question_count,
            cards: FlashcardConfig::default().card_count,
            seed: None,
        }
    }
}

impl Args {
    /// Defaults overridden by `BERGEN_*` variables. Unparsable values are ignored.
    fn from_env() -> Self {
        let defaults = Self::default();
        let env_number = |key: &str| std::env::var(key).ok().and_then(|v| v.trim().parse().ok());
        Self {
            words_dir: std::env::var_os("BERGEN_WORDS_DIR").map(PathBuf::from),
            questions: env_number("BERGEN_QUIZ_QUESTIONS").unwrap_or(defaults.questions),
            cards: env_number("BERGEN_FLASHCARDS").unwrap_or(defaults.cards),
            seed: std::env::var("BERGEN_SEED")
                .ok()
                .and_then(|v| v.trim().parse().ok()),
        }
    }

    fn apply_flags(mut self, args: &mut impl Iterator<Item = String>) -> Result<Self, ArgsError> {
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--words-dir" => {
                    self.words_dir = Some(PathBuf::from(require_value(args, "--words-dir")?));
                }
                "--questions" => {
                    let raw = require_value(args, "--questions")?;
                    self.questions = parse_number(raw, "--questions")?;
                }
                "--cards" => {
                    self.cards = parse_number(require_value(args, "--cards")?, "--cards")?;
                }
                "--seed" => {
                    self.seed = Some(parse_number(require_value(args, "--seed")?, "--seed")?);
                }
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }
        Ok(self)
    }

    fn quiz_config(&self) -> QuizConfig {
        QuizConfig::default()
            .with_question_count(self.questions)
            .with_seed(self.seed)
    }

    fn flashcard_config(&self) -> FlashcardConfig {
        FlashcardConfig {
            card_count: self.cards,
            seed: self.seed,
        }
    }
}

fn init_logging() {
    let level = std::env::var("BERGEN_LOG").unwrap_or_else(|_| "warn".to_owned());
    let filter = EnvFilter::try_new(&level).unwrap_or_else(|_| EnvFilter::new("warn"));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();

    if let Err(err) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("failed to set global tracing subscriber: {err}");
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut argv: Vec<String> = std::env::args().skip(1).collect();

    // Default behavior: the quiz when no subcommand is provided.
    let cmd = match argv.first().map(String::as_str) {
        None => Command::Quiz,
        Some("--help" | "-h") => {
            print_usage();
            return Ok(());
        }
        Some(first) if first.starts_with("--") => Command::Quiz,
        Some(first) => Command::from_arg(first).ok_or_else(|| {
            eprintln!("unknown subcommand: {first}");
            print_usage();
            ArgsError::UnknownArg(first.to_owned())
        })?,
    };

    if !argv.is_empty() && !argv[0].starts_with("--") {
        argv.remove(0);
    }

    let parsed = Args::from_env()
        .apply_flags(&mut argv.into_iter())
        .map_err(|e| {
            eprintln!("{e}");
            print_usage();
            e
        })?;

    init_logging();

    let clock = Clock::system();
    let services = match &parsed.words_dir {
        Some(dir) => AppServices::from_dir(dir, clock).await?,
        None => AppServices::bundled(clock).await?,
    }
    .with_quiz_config(parsed.quiz_config())
    .with_flashcard_config(parsed.flashcard_config());
    info!(words = services.word_bank().len(), command = ?cmd, "word bank loaded");

    match cmd {
        Command::Quiz => {
            services.audio().play_if_idle(BACKGROUND_TRACK);
            run_quiz(&services).await?;
        }
        Command::Flashcards => {
            services.audio().play_if_idle(BACKGROUND_TRACK);
            run_flashcards(services.start_flashcards()).await?;
        }
        Command::Categories => print_categories(&services),
        Command::Soundboard => play_soundboard(&services, &Soundboard::default()),
    }

    services.audio().stop();
    Ok(())
}

//
// ─── QUIZ ──────────────────────────────────────────────────────────────────────
//

const QUIZ_KEYS: &str = "keys: 1-4 answer, n next, e end, r restart, q quit";

async fn run_quiz(services: &AppServices) -> Result<(), Box<dyn std::error::Error>> {
    let (handle, mut rx, task) = services.start_quiz();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut view = QuizView::default();

    let config = services.quiz_config();
    println!(
        "{} questions, {} s per answer",
        config.question_count,
        config.timings.answer_window.as_secs()
    );
    println!("{QUIZ_KEYS}");
    let first = rx.borrow_and_update().clone();
    view.render(&first);

    loop {
        tokio::select! {
            changed = rx.changed() => {
                if changed.is_err() {
                    break;
                }
                let snapshot = rx.borrow_and_update().clone();
                view.render(&snapshot);
            }
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                match line.trim() {
                    "q" => break,
                    "n" => handle.next_question().await?,
                    "e" => handle.end_early().await?,
                    "r" => handle.restart().await?,
                    key => match key.parse::<usize>() {
                        Ok(n @ 1..=4) => handle.select_option(n - 1).await?,
                        _ => println!("{QUIZ_KEYS}"),
                    },
                }
            }
        }
    }

    if let Err(err) = handle.shutdown().await {
        warn!(error = %err, "quiz controller already stopped");
    }
    task.await?;
    Ok(())
}

/// Prints a snapshot only when something worth showing changed.
#[derive(Debug, Default)]
struct QuizView {
    last: Option<(SessionId, usize, QuizPhase)>,
    last_second: Option<u128>,
}

impl QuizView {
    fn render(&mut self, snapshot: &QuizSnapshot) {
        let key = (snapshot.session_id, snapshot.current_index, snapshot.phase);
        if self.last == Some(key) {
            if snapshot.phase == QuizPhase::OptionsVisible {
                self.render_countdown(snapshot);
            }
            return;
        }
        self.last = Some(key);
        self.last_second = None;

        match snapshot.phase {
            QuizPhase::AwaitingOptions => {
                if let Some(question) = &snapshot.question {
                    println!();
                    println!(
                        "Question {}/{}  [{}]  score {}",
                        snapshot.current_index + 1,
                        snapshot.total,
                        question.category,
                        snapshot.score
                    );
                    println!("  {}", question.term);
                }
            }
            QuizPhase::OptionsVisible => {
                print_options(snapshot);
                self.render_countdown(snapshot);
            }
            QuizPhase::AnswerSelected => {
                if let Some(answer) = &snapshot.selected_answer {
                    println!("  You chose: {answer}");
                }
            }
            QuizPhase::TimedOut => {
                println!("  Time is up!");
                print_options(snapshot);
                print_explanation(snapshot);
                println!("  press n for the next question");
            }
            QuizPhase::ResultRevealed => {
                let selected = snapshot.selected_answer.as_ref();
                let correct = snapshot.question.as_ref().is_some_and(|q| {
                    q.options
                        .iter()
                        .any(|o| o.mark == OptionMark::Correct && Some(&o.text) == selected)
                });
                println!("  {}", if correct { "Correct!" } else { "Wrong." });
                print_options(snapshot);
                print_explanation(snapshot);
            }
            QuizPhase::Completed => {
                println!();
                match &snapshot.summary {
                    Some(summary) => println!(
                        "Done! {}/{} correct ({}%){}",
                        summary.score(),
                        summary.total(),
                        summary.percentage(),
                        if summary.ended_early() { ", ended early" } else { "" }
                    ),
                    None => println!("Done! {}/{} correct", snapshot.score, snapshot.total),
                }
                println!("  r to play again, q to quit");
            }
        }
    }

    fn render_countdown(&mut self, snapshot: &QuizSnapshot) {
        let seconds = snapshot.time_remaining.as_millis().div_ceil(1000);
        if self.last_second == Some(seconds) {
            return;
        }
        self.last_second = Some(seconds);
        if seconds % 5 == 0 || seconds <= 3 {
            println!("  {seconds} s");
        }
    }
}

fn print_options(snapshot: &QuizSnapshot) {
    let Some(question) = &snapshot.question else {
        return;
    };
    for (i, option) in question.options.iter().enumerate() {
        let mark = match option.mark {
            OptionMark::Neutral => ' ',
            OptionMark::Selected => '>',
            OptionMark::Correct => '✓',
            OptionMark::Wrong => '✗',
        };
        println!("  {mark} {}. {}", i + 1, option.text);
    }
}

fn print_explanation(snapshot: &QuizSnapshot) {
    if let Some(explanation) = snapshot.question.as_ref().and_then(|q| q.explanation.as_ref()) {
        println!("  {explanation}");
    }
}

//
// ─── FLASHCARDS ────────────────────────────────────────────────────────────────
//

async fn run_flashcards(mut cards: FlashcardSession) -> Result<(), Box<dyn std::error::Error>> {
    if cards.is_empty() {
        println!("No words available.");
        return Ok(());
    }

    println!("keys: Enter to flip or continue, q quit");
    print_card(&cards);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        if line.trim() == "q" {
            break;
        }
        cards.tap();
        print_card(&cards);
    }
    Ok(())
}

fn print_card(cards: &FlashcardSession) {
    if cards.showing_answer() {
        if let Some(back) = cards.back() {
            for line in back.lines() {
                println!("    {line}");
            }
        }
    } else if let Some(front) = cards.front() {
        println!();
        println!("Card {}/{}: {front}", cards.current_index() + 1, cards.len());
    }
}

fn play_soundboard(services: &AppServices, soundboard: &Soundboard) {
    match soundboard.play_random(services.audio().as_ref()) {
        Some(sample) => println!("Bergen! ({sample})"),
        None => println!("No samples available."),
    }
}

fn print_categories(services: &AppServices) {
    let bank = services.word_bank();
    for name in bank.category_names() {
        let count = bank.chapter(name).map_or(0, |c| c.len());
        println!("{name} ({count})");
    }
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        // At this layer (binary glue), printing once is fine.
        eprintln!("{err}");
        std::process::exit(2);
    }
}
