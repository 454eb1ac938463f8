use std::fmt;

use services::{AppServices, Clock, Dashboard, DashboardConfig};
use tracing_subscriber::EnvFilter;
use tuition_core::chords::ChordPart;
use tuition_core::credentials::{generate_salt, hash_password};
use tuition_core::model::{ItemStatus, ProgressItem, SessionToken};
use tuition_core::pitch::PitchReading;

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    MissingFlag { flag: &'static str },
    UnknownArg(String),
    InvalidDbUrl { raw: String },
    InvalidFrequency { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::MissingFlag { flag } => write!(f, "{flag} is required"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
            ArgsError::InvalidFrequency { raw } => write!(f, "invalid frequency: {raw}"),
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

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  app login  --email <email> [--password <pw>] [--json] [--db <sqlite_url>]");
    eprintln!("  app resume --token <token> [--json] [--db <sqlite_url>]");
    eprintln!("  app logout --token <token> [--db <sqlite_url>]");
    eprintln!("  app hash-password <pw> [--salt <salt>]");
    eprintln!("  app note <hz> [--json]");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  TUITION_SHEET_ID, TUITION_SHEETS_API_KEY, TUITION_SHEETS_TOKEN,");
    eprintln!("  TUITION_SHEETS_BASE_URL, TUITION_STUDENTS_TAB, TUITION_PROGRESS_TAB,");
    eprintln!("  TUITION_DB_URL, TUITION_ENRICH_TITLES, TUITION_PASSWORD, RUST_LOG");
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Login,
    Resume,
    Logout,
    HashPassword,
    Note,
}

impl Command {
    fn from_arg(arg: &str) -> Option<Self> {
        match arg {
            "login" => Some(Self::Login),
            "resume" => Some(Self::Resume),
            "logout" => Some(Self::Logout),
            "hash-password" => Some(Self::HashPassword),
            "note" => Some(Self::Note),
            _ => None,
        }
    }

    /// Commands that take one bare argument.
    fn takes_positional(self) -> bool {
        matches!(self, Self::HashPassword | Self::Note)
    }
}

#[derive(Debug, Default)]
struct Args {
    email: Option<String>,
    password: Option<String>,
    token: Option<String>,
    salt: Option<String>,
    positional: Option<String>,
    db_url: Option<String>,
    json: bool,
}

impl Args {
    fn parse(args: &mut impl Iterator<Item = String>, cmd: Command) -> Result<Self, ArgsError> {
        let mut parsed = Self {
            password: std::env::var("TUITION_PASSWORD").ok(),
            ..Self::default()
        };

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--email" => parsed.email = Some(require_value(args, "--email")?),
                "--password" => parsed.password = Some(require_value(args, "--password")?),
                "--token" => parsed.token = Some(require_value(args, "--token")?),
                "--salt" => parsed.salt = Some(require_value(args, "--salt")?),
                "--db" => {
                    let value = require_value(args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    parsed.db_url = Some(normalize_sqlite_url(value));
                }
                "--json" => parsed.json = true,
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ if cmd.takes_positional()
                    && !arg.starts_with("--")
                    && parsed.positional.is_none() =>
                {
                    parsed.positional = Some(arg);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(parsed)
    }

    fn token(&self) -> Result<SessionToken, ArgsError> {
        self.token
            .as_deref()
            .map(SessionToken::new)
            .ok_or(ArgsError::MissingFlag { flag: "--token" })
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

fn status_marker(status: ItemStatus) -> &'static str {
    match status {
        ItemStatus::Completed => "[x]",
        ItemStatus::InProgress => "[~]",
        ItemStatus::NotStarted => "[ ]",
    }
}

/// Task text with inline chord markers shown as `C [X32010]`.
fn render_detail(task: &ProgressItem) -> String {
    task.detail_parts()
        .into_iter()
        .map(|part| match part {
            ChordPart::Text { content } => content,
            ChordPart::Chord { fingering, name } if name.is_empty() => format!("[{fingering}]"),
            ChordPart::Chord { fingering, name } => format!("{name} [{fingering}]"),
        })
        .collect()
}

fn print_dashboard(dashboard: &Dashboard) {
    let student = &dashboard.student;
    println!("Welcome, {}", student.student_name);
    if let Some(lesson) = &dashboard.next_lesson {
        let stale = if dashboard.next_lesson_upcoming { "" } else { " (past)" };
        println!("Next lesson: {}{stale}", lesson.describe());
    }
    if !student.comments.is_empty() {
        println!("Notes from your tutor: {}", student.comments);
    }
    if !student.share_link.is_empty() {
        println!("Shared folder: {}", student.share_link);
    }

    if !dashboard.has_progress() {
        println!();
        println!("No progress recorded yet.");
        return;
    }

    let summary = dashboard.summary;
    println!(
        "Overall: {}/{} tasks ({}%)",
        summary.completed, summary.total, summary.percentage
    );

    for section in &dashboard.report {
        println!();
        let label = if section.grade.is_empty() {
            "Ungraded"
        } else {
            section.grade.as_str()
        };
        let current = if section.is_current { " (current)" } else { "" };
        println!(
            "{label}{current}: {}/{} ({}%)",
            section.completed, section.total, section.percentage
        );
        for task in &section.tasks {
            println!(
                "  {} {}: {}",
                status_marker(task.item_status),
                task.category,
                render_detail(task)
            );
            for link in &task.resource_links {
                println!("      {} <{}>", link.title, link.url);
            }
        }
    }
}

fn emit(
    dashboard: &Dashboard,
    token: Option<&SessionToken>,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    if json {
        let body = serde_json::json!({
            "token": token.map(SessionToken::as_str),
            "dashboard": dashboard,
        });
        println!("{}", serde_json::to_string_pretty(&body)?);
    } else {
        if let Some(token) = token {
            eprintln!("session token: {token}");
        }
        print_dashboard(dashboard);
    }
    Ok(())
}

async fn build_services(parsed: &Args) -> Result<AppServices, Box<dyn std::error::Error>> {
    let mut config = DashboardConfig::from_env();
    if let Some(db_url) = &parsed.db_url {
        config.db_url.clone_from(db_url);
    }
    config.db_url = normalize_sqlite_url(config.db_url);

    // Open + migrate SQLite here so the services crate never touches the filesystem.
    prepare_sqlite_file(&config.db_url)?;
    tracing::debug!(db_url = %config.db_url, "opening session store");
    Ok(AppServices::new(&config, Clock::default_clock()).await?)
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut argv = std::env::args().skip(1);

    let cmd = match argv.next() {
        None => {
            print_usage();
            return Err(ArgsError::MissingFlag { flag: "<command>" }.into());
        }
        Some(first) if first == "--help" || first == "-h" => {
            print_usage();
            return Ok(());
        }
        Some(first) => Command::from_arg(&first).ok_or_else(|| {
            eprintln!("unknown subcommand: {first}");
            print_usage();
            ArgsError::UnknownArg(first.clone())
        })?,
    };

    let parsed = Args::parse(&mut argv, cmd).map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    match cmd {
        Command::HashPassword => {
            let password = parsed
                .positional
                .as_deref()
                .or(parsed.password.as_deref())
                .ok_or(ArgsError::MissingFlag { flag: "<pw>" })?;
            let salt = parsed.salt.clone().unwrap_or_else(generate_salt);
            let hash = hash_password(password, &salt).map_err(tuition_core::Error::from)?;
            println!("{}", hash.encode());
            Ok(())
        }
        Command::Note => {
            let raw = parsed
                .positional
                .as_deref()
                .ok_or(ArgsError::MissingFlag { flag: "<hz>" })?;
            let reading = raw
                .trim()
                .parse::<f64>()
                .ok()
                .and_then(PitchReading::from_frequency)
                .ok_or_else(|| ArgsError::InvalidFrequency { raw: raw.to_owned() })?;
            if parsed.json {
                println!("{}", serde_json::to_string_pretty(&reading)?);
            } else {
                println!("{} {:+.1} cents", reading.label(), reading.cents);
            }
            Ok(())
        }
        Command::Login => {
            let email = parsed
                .email
                .as_deref()
                .ok_or(ArgsError::MissingFlag { flag: "--email" })?;
            let password = parsed
                .password
                .as_deref()
                .ok_or(ArgsError::MissingFlag { flag: "--password" })?;

            let app = build_services(&parsed).await?;
            let outcome = app.login().login(email, password).await?;
            let dashboard = app.dashboard().load(&outcome.student).await?;
            emit(&dashboard, Some(&outcome.session.token), parsed.json)
        }
        Command::Resume => {
            let token = parsed.token()?;
            let app = build_services(&parsed).await?;
            let student = app.login().resume(&token).await?;
            let dashboard = app.dashboard().load(&student).await?;
            emit(&dashboard, None, parsed.json)
        }
        Command::Logout => {
            let token = parsed.token()?;
            let app = build_services(&parsed).await?;
            app.login().logout(&token).await?;
            eprintln!("logged out");
            Ok(())
        }
    }
}

#[tokio::main]
async fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    if let Err(err) = run().await {
        // At this layer (binary glue), printing once is fine.
        eprintln!("{err}");
        std::process::exit(2);
    }
}
