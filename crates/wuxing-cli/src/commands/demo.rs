//! Demo subcommands.
//!
//! Each invocation is one serialized trigger against the persisted
//! session: the orchestrator is rebuilt from its snapshot, the command is
//! applied, and the resulting event (if any) is printed as JSON. The
//! `steps` subcommand stands in for the platform pedometer callback;
//! `status` doubles as the app-resume notification.

use chrono::{TimeZone, Utc};
use clap::Subcommand;
use log::info;

use wuxing_core::{
    DemoConfig, DemoOrchestrator, Element, Event, HealthMonitor, NotificationDispatcher,
    NotifyCategory, Sex, SqliteStore, StepSource, SystemClock,
};

#[derive(Subcommand)]
pub enum DemoAction {
    /// Start a fresh demo session
    Start,
    /// Confirm the birthday selection
    Birthday {
        /// Date as YYYY-MM-DD
        date: String,
        /// "male" or "female"
        #[arg(long, default_value = "female")]
        sex: String,
    },
    /// Trigger sedentary detection
    Sedentary,
    /// Advance the active countdown by one tick
    Tick,
    /// Feed a raw cumulative pedometer reading
    Steps {
        /// Raw cumulative step count
        raw: u64,
    },
    /// Mark the voice interaction as finished
    VoiceDone,
    /// Recompute deadlines (app resume) and print the session state
    Status,
    /// Exit the demo and delete the persisted session
    Exit,
    /// Exit and immediately start over
    Reset,
}

/// Pedometer stand-in: the real subscription lives in the watch host,
/// so the CLI only tracks whether monitoring is requested.
#[derive(Default)]
struct CliStepSource {
    running: bool,
}

impl StepSource for CliStepSource {
    fn start(&mut self) {
        self.running = true;
        info!("step source subscribed");
    }
    fn stop(&mut self) {
        self.running = false;
        info!("step source unsubscribed");
    }
    fn is_running(&self) -> bool {
        self.running
    }
}

/// Prints outbound notifications instead of raising platform ones.
#[derive(Default)]
struct ConsoleDispatcher;

impl NotificationDispatcher for ConsoleDispatcher {
    fn send_suggestion(&mut self, element: Element, category: NotifyCategory) {
        println!("notification: suggestion ({} / {category:?})", element.as_str());
    }
    fn send_completion(&mut self, element: Element, category: NotifyCategory) {
        println!("notification: completion ({} / {category:?})", element.as_str());
    }
}

#[derive(Default)]
struct CliHealthMonitor;

impl HealthMonitor for CliHealthMonitor {
    fn pause(&mut self) {
        info!("sibling health monitor paused");
    }
    fn resume(&mut self) {
        info!("sibling health monitor resumed");
    }
}

type CliOrchestrator =
    DemoOrchestrator<SqliteStore, CliStepSource, ConsoleDispatcher, CliHealthMonitor, SystemClock>;

fn open_orchestrator() -> Result<CliOrchestrator, Box<dyn std::error::Error>> {
    let store = SqliteStore::open()?;
    let mut orch = DemoOrchestrator::new(
        DemoConfig::load_or_default(),
        store,
        CliStepSource::default(),
        ConsoleDispatcher::default(),
        CliHealthMonitor::default(),
        SystemClock,
    );
    if let Some(event) = orch.restore() {
        print_event(&event)?;
    }
    Ok(orch)
}

fn print_event(event: &Event) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(event)?);
    Ok(())
}

fn parse_birthday(date: &str) -> Result<chrono::DateTime<Utc>, Box<dyn std::error::Error>> {
    let date = chrono::NaiveDate::parse_from_str(date, "%Y-%m-%d")?;
    Utc.from_local_datetime(&date.and_hms_opt(0, 0, 0).unwrap())
        .single()
        .ok_or_else(|| "ambiguous date".into())
}

fn parse_sex(sex: &str) -> Result<Sex, Box<dyn std::error::Error>> {
    match sex {
        "male" | "m" => Ok(Sex::Male),
        "female" | "f" => Ok(Sex::Female),
        other => Err(format!("unknown sex: {other}").into()),
    }
}

pub fn run(action: DemoAction) -> Result<(), Box<dyn std::error::Error>> {
    let mut orch = open_orchestrator()?;

    match action {
        DemoAction::Start => {
            print_event(&orch.start())?;
        }
        DemoAction::Birthday { date, sex } => {
            let birthday = parse_birthday(&date)?;
            match orch.set_birthday(birthday, parse_sex(&sex)?) {
                Some(event) => print_event(&event)?,
                None => println!("ignored: not in birthday selection"),
            }
        }
        DemoAction::Sedentary => match orch.trigger_sedentary_detection() {
            Some(event) => print_event(&event)?,
            None => println!("ignored: sedentary trigger not valid now"),
        },
        DemoAction::Tick => match orch.tick() {
            Some(event) => print_event(&event)?,
            None => println!("no countdown armed"),
        },
        DemoAction::Steps { raw } => match orch.on_raw_step_count(raw) {
            Some(event) => print_event(&event)?,
            None => print_event(&orch.snapshot())?,
        },
        DemoAction::VoiceDone => match orch.finish_voice_interaction() {
            Some(event) => print_event(&event)?,
            None => println!("ignored: no voice interaction in progress"),
        },
        DemoAction::Status => {
            if let Some(event) = orch.recalculate_on_resume() {
                print_event(&event)?;
            }
            print_event(&orch.snapshot())?;
        }
        DemoAction::Exit => {
            print_event(&orch.exit())?;
        }
        DemoAction::Reset => {
            print_event(&orch.reset())?;
        }
    }

    Ok(())
}
