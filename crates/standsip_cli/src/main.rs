//! Terminal host for the reminder engine.
//!
//! # Responsibility
//! - `status`: print settings, today's counts and the next delay per category.
//! - `history`: print every logged acknowledgement, newest first.
//! - `run`: arm every category, print prompts and apply commands from stdin.
//!
//! # Invariants
//! - Timer fires and stdin commands are handled on one thread, in arrival
//!   order, through a single queue.
//! - Errors are printed and the loop continues; only setup failures exit.

use clap::{Args, Parser, Subcommand};
use log::{info, warn};
use standsip_core::clock::minute_of_day;
use standsip_core::db::{open_db, DbError};
use standsip_core::model::settings::minute_label;
use standsip_core::{
    default_log_level, init_logging, is_in_window, next_delay_minutes, ActionDispatcher,
    Category, Clock, DispatchOutcome, HistoryService, LogStore, Notifier, ReminderPayload,
    SchedulerEvent, SchedulerService, Settings, SettingsService, SettingsStore,
    SqliteLogRepository, SqliteSettingsRepository, SystemClock, ThreadTimerRunner,
};
use std::io::{self, BufRead};
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Sender};
use std::sync::Arc;
use std::thread;

const DB_FILE_NAME: &str = "standsip.sqlite3";
const LOG_DIR_NAME: &str = "standsip-logs";

const COMMANDS_HELP: &str = "commands: done <category> | snooze <category> | log <category> | \
undo <category> | apply <HH:MM> <HH:MM> <interval> | quit";

#[derive(Parser)]
#[command(name = "standsip", version, about = "Recurring stand, water and bathroom reminders")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print settings, today's counts and the next delay per category.
    Status(DbArgs),
    /// Print every logged acknowledgement, newest first.
    History(DbArgs),
    /// Arm every category and apply commands from stdin.
    Run(RunArgs),
}

#[derive(Args)]
struct DbArgs {
    /// SQLite file; defaults to a file in the temp directory.
    #[arg(env = "STANDSIP_DB_PATH")]
    db_path: Option<PathBuf>,
}

#[derive(Args)]
struct RunArgs {
    #[command(flatten)]
    db: DbArgs,

    /// Directory for rotating log files.
    #[arg(long, env = "STANDSIP_LOG_DIR")]
    log_dir: Option<PathBuf>,
}

fn main() {
    let cli = Cli::parse();
    if let Err(message) = run_cli(cli.command) {
        eprintln!("standsip: {message}");
        std::process::exit(1);
    }
}

fn run_cli(command: Command) -> Result<(), String> {
    match command {
        Command::Status(args) => print_status(&resolve_db_path(args.db_path)),
        Command::History(args) => print_history(&resolve_db_path(args.db_path)),
        Command::Run(args) => {
            start_logging(args.log_dir);
            run_host(&resolve_db_path(args.db.db_path))
        }
    }
}

fn resolve_db_path(arg: Option<PathBuf>) -> PathBuf {
    arg.filter(|path| !path.as_os_str().is_empty())
        .unwrap_or_else(|| std::env::temp_dir().join(DB_FILE_NAME))
}

fn start_logging(log_dir: Option<PathBuf>) {
    let log_dir = log_dir
        .filter(|path| !path.as_os_str().is_empty())
        .unwrap_or_else(|| std::env::temp_dir().join(LOG_DIR_NAME));
    if let Err(err) = init_logging(default_log_level(), &log_dir.to_string_lossy()) {
        eprintln!("standsip: logging disabled: {err}");
    }
}

fn open_failed(db_path: &Path) -> impl FnOnce(DbError) -> String + '_ {
    move |err| format!("failed to open `{}`: {err}", db_path.display())
}

fn print_status(db_path: &Path) -> Result<(), String> {
    let conn = open_db(db_path).map_err(open_failed(db_path))?;
    let settings = SqliteSettingsRepository::new(&conn)
        .load()
        .unwrap_or_else(|err| {
            eprintln!("standsip: using default settings: {err}");
            Settings::default()
        });
    let counts = HistoryService::new(SqliteLogRepository::new(&conn))
        .today_counts()
        .map_err(|err| err.to_string())?;

    let now = minute_of_day(&SystemClock.now());
    println!("{}", describe_settings(&settings));
    println!(
        "now {} ({} window)",
        minute_label(now),
        if is_in_window(now, &settings) {
            "inside"
        } else {
            "outside"
        }
    );
    let next_in = next_delay_minutes(now, &settings);
    for category in Category::ALL {
        println!(
            "{:<6} today={:<3} next_in={next_in} min",
            category.log_key(),
            counts.get(category)
        );
    }
    Ok(())
}

fn print_history(db_path: &Path) -> Result<(), String> {
    let conn = open_db(db_path).map_err(open_failed(db_path))?;
    let items = HistoryService::new(SqliteLogRepository::new(&conn))
        .history()
        .map_err(|err| err.to_string())?;
    if items.is_empty() {
        println!("no entries yet");
    }
    for item in items {
        println!("{}  {}", item.when, item.label);
    }
    Ok(())
}

fn describe_settings(settings: &Settings) -> String {
    format!(
        "window {}-{} every {} min",
        minute_label(settings.start_minute),
        minute_label(settings.end_minute),
        settings.interval_minute
    )
}

/// Prints prompts to stdout.
struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn show(&self, category: Category, title: &str, body: &str) {
        println!("[{category}] {title}: {body}  (done {category} | snooze {category})");
    }

    fn dismiss(&self, category: Category) {
        println!("[{category}] cleared");
    }
}

/// One item of the host's single work queue.
enum HostEvent {
    Fired(ReminderPayload),
    Input(String),
    InputClosed,
}

/// Parsed stdin command.
#[derive(Debug, PartialEq, Eq)]
enum HostCommand {
    Empty,
    Quit,
    /// Raw action forwarded to the dispatcher; unknown names are ignored there.
    Action { action: String, category: String },
    Log(Category),
    Undo(Category),
    Apply(Settings),
}

fn parse_command(line: &str) -> Result<HostCommand, String> {
    let mut parts = line.split_whitespace();
    match (parts.next(), parts.next()) {
        (None, _) => Ok(HostCommand::Empty),
        (Some("quit" | "exit"), _) => Ok(HostCommand::Quit),
        (Some("log"), Some(category)) => parse_category(category).map(HostCommand::Log),
        (Some("undo"), Some(category)) => parse_category(category).map(HostCommand::Undo),
        (Some("apply"), Some(start)) => {
            let end = parts.next().ok_or(COMMANDS_HELP)?;
            let interval = parts.next().ok_or(COMMANDS_HELP)?;
            let interval = interval
                .parse::<u32>()
                .map_err(|_| format!("invalid interval `{interval}`"))?;
            Settings::new(parse_clock(start)?, parse_clock(end)?, interval)
                .map(HostCommand::Apply)
                .map_err(|err| err.to_string())
        }
        (Some(action), Some(category)) => Ok(HostCommand::Action {
            action: action.to_string(),
            category: category.to_string(),
        }),
        (Some(_), None) => Err(COMMANDS_HELP.to_string()),
    }
}

fn parse_category(value: &str) -> Result<Category, String> {
    Category::parse(value).ok_or_else(|| format!("unknown category `{value}`"))
}

/// Parses `HH:MM` into minutes since midnight.
fn parse_clock(value: &str) -> Result<u32, String> {
    let invalid = || format!("invalid time `{value}`; expected HH:MM");
    let (hours, minutes) = value.split_once(':').ok_or_else(invalid)?;
    let hours = hours.parse::<u32>().map_err(|_| invalid())?;
    let minutes = minutes.parse::<u32>().map_err(|_| invalid())?;
    if hours >= 24 || minutes >= 60 {
        return Err(invalid());
    }
    Ok(hours * 60 + minutes)
}

fn run_host(db_path: &Path) -> Result<(), String> {
    let conn = open_db(db_path).map_err(open_failed(db_path))?;
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);

    let (fired_tx, fired_rx) = mpsc::channel::<ReminderPayload>();
    let runner = Arc::new(ThreadTimerRunner::start(fired_tx));
    let scheduler = SchedulerService::new(runner.clone(), Arc::new(ConsoleNotifier), clock.clone());
    let _arm_failures = scheduler.subscribe(|event| {
        if let SchedulerEvent::ArmFailed { category, reason } = event {
            eprintln!("standsip: could not schedule {category}: {reason}");
        }
    });

    let settings_service = SettingsService::new(SqliteSettingsRepository::new(&conn), &scheduler);
    let dispatcher = ActionDispatcher::new(&scheduler, SqliteLogRepository::with_clock(&conn, clock));

    match settings_service.on_boot() {
        Ok(settings) => println!("armed: {}", describe_settings(&settings)),
        Err(err) => eprintln!("standsip: {err}"),
    }
    println!("{COMMANDS_HELP}");

    let (host_tx, host_rx) = mpsc::channel::<HostEvent>();
    forward_fires(fired_rx, host_tx.clone());
    read_stdin(host_tx);
    info!("event=host_loop module=cli status=start");

    for event in host_rx {
        match event {
            HostEvent::Fired(payload) => {
                if let Err(err) = dispatcher.on_timer_fired(&payload) {
                    eprintln!("standsip: {err}");
                }
            }
            HostEvent::Input(line) => match parse_command(&line) {
                Ok(HostCommand::Quit) => break,
                Ok(command) => {
                    if let Err(message) = apply_command(command, &dispatcher, &settings_service) {
                        eprintln!("standsip: {message}");
                    }
                }
                Err(message) => eprintln!("standsip: {message}"),
            },
            HostEvent::InputClosed => break,
        }
    }

    runner.shutdown();
    info!("event=host_loop module=cli status=stop");
    Ok(())
}

fn apply_command<L: LogStore, S: SettingsStore>(
    command: HostCommand,
    dispatcher: &ActionDispatcher<'_, L>,
    settings_service: &SettingsService<'_, S>,
) -> Result<(), String> {
    match command {
        HostCommand::Empty | HostCommand::Quit => {}
        HostCommand::Action { action, category } => {
            match dispatcher
                .on_raw_action(&category, &action)
                .map_err(|err| err.to_string())?
            {
                DispatchOutcome::Acknowledged { entry_id } => {
                    println!("logged {category} (#{entry_id})");
                }
                DispatchOutcome::Snoozed => println!("snoozed {category}"),
                DispatchOutcome::Ignored => println!("nothing to {action} for {category}"),
            }
        }
        HostCommand::Log(category) => {
            let entry_id = dispatcher
                .record_manual(category)
                .map_err(|err| err.to_string())?;
            println!("logged {category} (#{entry_id})");
        }
        HostCommand::Undo(category) => {
            if dispatcher
                .undo_latest(category)
                .map_err(|err| err.to_string())?
            {
                println!("removed latest {category} entry");
            } else {
                println!("no {category} entry today");
            }
        }
        HostCommand::Apply(settings) => {
            settings_service
                .save_and_apply(settings)
                .map_err(|err| err.to_string())?;
            println!("armed: {}", describe_settings(&settings));
        }
    }
    Ok(())
}

fn forward_fires(fired: mpsc::Receiver<ReminderPayload>, host: Sender<HostEvent>) {
    thread::spawn(move || {
        for payload in fired {
            if host.send(HostEvent::Fired(payload)).is_err() {
                break;
            }
        }
    });
}

fn read_stdin(host: Sender<HostEvent>) {
    thread::spawn(move || {
        for line in io::stdin().lock().lines() {
            match line {
                Ok(line) => {
                    if host.send(HostEvent::Input(line)).is_err() {
                        return;
                    }
                }
                Err(err) => {
                    warn!("event=stdin_read module=cli status=error error={err}");
                    break;
                }
            }
        }
        let _ = host.send(HostEvent::InputClosed);
    });
}

#[cfg(test)]
mod tests {
    use super::{parse_clock, parse_command, resolve_db_path, Cli, Command, HostCommand};
    use clap::{CommandFactory, Parser};
    use standsip_core::{Category, Settings};
    use std::path::PathBuf;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn subcommands_take_optional_db_path() {
        let cli = Cli::try_parse_from(["standsip", "status", "/tmp/custom.db"]).unwrap();
        match cli.command {
            Command::Status(args) => {
                assert_eq!(args.db_path, Some(PathBuf::from("/tmp/custom.db")))
            }
            _ => panic!("expected status"),
        }

        let cli = Cli::try_parse_from(["standsip", "run", "--log-dir", "/tmp/logs"]).unwrap();
        match cli.command {
            Command::Run(args) => {
                assert_eq!(args.log_dir, Some(PathBuf::from("/tmp/logs")));
            }
            _ => panic!("expected run"),
        }

        assert!(Cli::try_parse_from(["standsip", "launch"]).is_err());
        assert!(Cli::try_parse_from(["standsip"]).is_err());
    }

    #[test]
    fn parse_clock_accepts_valid_times_only() {
        assert_eq!(parse_clock("08:00").unwrap(), 480);
        assert_eq!(parse_clock("23:59").unwrap(), 1439);
        assert!(parse_clock("24:00").is_err());
        assert!(parse_clock("8h").is_err());
    }

    #[test]
    fn parse_command_routes_actions_and_adjustments() {
        assert_eq!(parse_command("   ").unwrap(), HostCommand::Empty);
        assert_eq!(parse_command("quit").unwrap(), HostCommand::Quit);
        assert_eq!(
            parse_command("done water").unwrap(),
            HostCommand::Action {
                action: "done".to_string(),
                category: "water".to_string()
            }
        );
        assert_eq!(
            parse_command("undo bath").unwrap(),
            HostCommand::Undo(Category::Bathroom)
        );
        assert!(parse_command("log coffee").is_err());
        assert!(parse_command("done").is_err());
    }

    #[test]
    fn parse_command_validates_apply() {
        assert_eq!(
            parse_command("apply 22:00 06:00 120").unwrap(),
            HostCommand::Apply(Settings::new(1320, 360, 120).unwrap())
        );
        assert!(parse_command("apply 08:00 20:00 5").is_err());
        assert!(parse_command("apply 08:00").is_err());
    }

    #[test]
    fn db_path_falls_back_to_temp_dir() {
        assert_eq!(
            resolve_db_path(Some(PathBuf::from("/tmp/custom.db"))),
            PathBuf::from("/tmp/custom.db")
        );
        assert_eq!(
            resolve_db_path(None),
            std::env::temp_dir().join("standsip.sqlite3")
        );
    }
}
