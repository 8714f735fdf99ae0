//! Interactive shell around the navigation engine.
//!
//! Stdin commands drive the controller the way clicks and the address bar
//! would. A reader thread feeds lines over a channel; the main loop waits on
//! it with a timeout bounded by the controller's next step deadline, so
//! staged transitions fire on time while the shell sits idle. After every
//! observable change a compact state line is printed.

use anyhow::{Context, Error};
use getopts::Options;
use std::env;
use std::io::{self, BufRead};
use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::thread;
use std::time::{Duration, Instant};

use helm_core::catalog::{SectionCatalog, SectionId};
use helm_core::controller::{
    EnterStage, LeaveStage, NavOrigin, NavPhase, NavSnapshot, NavigationController,
};
use helm_core::host::{HostEvent, MemoryHost, NavigationHost};
use helm_core::logging::{get_run_id, init_logging, shutdown_logging};
use helm_core::routing::HashRouter;
use helm_core::settings::SettingsManager;

const GIT_VERSION: &str = env!("GIT_VERSION");

/// Wait cap when no step is pending.
const IDLE_TIMEOUT: Duration = Duration::from_secs(60);

enum ShellEvent {
    Line(String),
    Eof,
}

fn main() -> Result<(), Error> {
    let args: Vec<String> = env::args().collect();
    let program = args.first().map(String::as_str).unwrap_or("helm");

    let mut opts = Options::new();
    opts.optopt("d", "data-dir", "set the data directory", "DIR");
    opts.optflag("l", "list", "list sections and exit");
    opts.optflag("h", "help", "print this help message");

    let matches = opts
        .parse(&args[1..])
        .context("can't parse command line arguments")?;

    if matches.opt_present("h") {
        print_usage(program, &opts);
        return Ok(());
    }

    let data_dir = PathBuf::from(matches.opt_str("d").unwrap_or_else(|| ".".to_string()));

    let catalog = SectionCatalog::load_embedded().context("can't load the section catalog")?;

    if matches.opt_present("l") {
        let router = HashRouter::new(&catalog)?;
        list_sections(&catalog, &router);
        return Ok(());
    }

    let manager = SettingsManager::new(&data_dir, GIT_VERSION.to_string());
    let mut settings = manager.load();

    init_logging(&data_dir.join("logs")).context("can't initialize logging")?;
    tracing::info!(data_dir = %data_dir.display(), "shell starting");

    let (host_hub, host_events) = mpsc::channel();
    let mut host = MemoryHost::new(&settings.start_fragment);
    host.subscribe(host_hub);

    let mut controller = NavigationController::new(catalog, host)
        .context("can't mount the navigation controller")?;

    println!("helm {} (run {})", GIT_VERSION, get_run_id());
    println!("Commands: open <slug|id>, home, back, list, status, quit.");

    let (line_tx, line_rx) = mpsc::channel();
    thread::spawn(move || {
        let stdin = io::stdin();
        for line in stdin.lock().lines() {
            match line {
                Ok(line) => {
                    if line_tx.send(ShellEvent::Line(line)).is_err() {
                        break;
                    }
                }
                Err(_) => break,
            }
        }
        line_tx.send(ShellEvent::Eof).ok();
    });

    let mut last_snapshot = None;
    report_state(&controller, &mut last_snapshot);

    loop {
        let timeout = controller
            .next_deadline()
            .map(|deadline| deadline.saturating_duration_since(Instant::now()))
            .unwrap_or(IDLE_TIMEOUT);

        match line_rx.recv_timeout(timeout) {
            Ok(ShellEvent::Line(line)) => {
                let keep_running = handle_command(line.trim(), &mut controller);
                drain_host_events(&host_events, &mut controller);
                controller.tick(Instant::now());
                report_state(&controller, &mut last_snapshot);
                if !keep_running {
                    break;
                }
            }
            Ok(ShellEvent::Eof) => break,
            Err(RecvTimeoutError::Timeout) => {
                controller.tick(Instant::now());
                report_state(&controller, &mut last_snapshot);
            }
            Err(RecvTimeoutError::Disconnected) => break,
        }
    }

    settings.start_fragment = controller.host().current_fragment();
    if let Err(e) = manager.save(&settings) {
        eprintln!("failed to save settings: {:#}", e);
    }

    tracing::info!("shell exiting");
    shutdown_logging();
    Ok(())
}

fn print_usage(program: &str, opts: &Options) {
    let brief = format!("Usage: {} [options]", program);
    print!("{}", opts.usage(&brief));
}

/// Runs one command line. Returns false when the shell should exit.
fn handle_command(line: &str, controller: &mut NavigationController<MemoryHost>) -> bool {
    let now = Instant::now();
    let mut parts = line.splitn(2, char::is_whitespace);
    let command = parts.next().unwrap_or("");
    let argument = parts.next().map(str::trim).unwrap_or("");

    match command {
        "" => {}
        "open" => {
            if argument.is_empty() {
                println!("usage: open <slug|id>");
            } else {
                match resolve_target(controller, argument) {
                    Some(section) => controller.select_section(section, NavOrigin::User, now),
                    None => println!("unknown section: {}", argument),
                }
            }
        }
        "home" => controller.go_home(NavOrigin::User, now),
        "back" => {
            if !controller.host_mut().back() {
                println!("history is empty");
            }
        }
        "list" => list_sections(controller.catalog(), controller.router()),
        "status" => print_status(controller),
        "quit" | "exit" => return false,
        other => println!(
            "unknown command: {} (try list, open <slug|id>, home, back, status, quit)",
            other
        ),
    }

    true
}

/// Resolves a command argument as a section id or a fragment slug.
fn resolve_target(
    controller: &NavigationController<MemoryHost>,
    token: &str,
) -> Option<SectionId> {
    if let Ok(id) = token.parse::<SectionId>() {
        if controller.catalog().section(id).is_some() {
            return Some(id);
        }
    }
    controller.router().section_from_fragment(token)
}

/// Applies fragment changes the host reported (back navigation).
fn drain_host_events(
    events: &Receiver<HostEvent>,
    controller: &mut NavigationController<MemoryHost>,
) {
    while let Ok(HostEvent::FragmentChanged(fragment)) = events.try_recv() {
        controller.handle_external_navigation(&fragment, Instant::now());
    }
}

fn list_sections(catalog: &SectionCatalog, router: &HashRouter) {
    for section in catalog.sections() {
        println!(
            "  {:>2}  {:<16} #{}",
            section.id,
            section.title,
            router.fragment_for(Some(section.id))
        );
    }
}

fn print_status(controller: &NavigationController<MemoryHost>) {
    let snapshot = controller.snapshot();
    let fragment = controller.host().current_fragment();
    println!("state:    {}", describe_phase(controller));
    println!("address:  {}", format_address(&fragment));
    println!("title:    {}", controller.host().title());
    println!("history:  {} entries", controller.host().history().len());
    match controller.next_deadline() {
        Some(deadline) => println!(
            "pending:  next step in {}ms",
            deadline.saturating_duration_since(Instant::now()).as_millis()
        ),
        None => println!("pending:  none"),
    }
    println!("remounts: {}", snapshot.content_key);
}

/// Prints a compact state line whenever the published snapshot changed.
fn report_state(
    controller: &NavigationController<MemoryHost>,
    last: &mut Option<NavSnapshot>,
) {
    let snapshot = controller.snapshot();
    if last.as_ref() == Some(&snapshot) {
        return;
    }
    let fragment = controller.host().current_fragment();
    println!(
        "-> {} [{}]",
        describe_phase(controller),
        format_address(&fragment)
    );
    *last = Some(snapshot);
}

fn format_address(fragment: &str) -> String {
    if fragment.is_empty() {
        "/".to_string()
    } else {
        format!("/#{}", fragment)
    }
}

fn describe_phase(controller: &NavigationController<MemoryHost>) -> String {
    match controller.phase() {
        NavPhase::IdleHome => "home".to_string(),
        NavPhase::IdleModule { section } => section_label(controller, section),
        NavPhase::EnteringModule { target, stage } => match stage {
            EnterStage::Shimmer => format!("opening {}", section_label(controller, target)),
            EnterStage::Reveal => format!("revealing {}", section_label(controller, target)),
            EnterStage::ItemEntrance => format!("entering {}", section_label(controller, target)),
        },
        NavPhase::LeavingModule { from, stage } => match stage {
            LeaveStage::ItemExit => format!("leaving {}", section_label(controller, from)),
            LeaveStage::Collapse => "returning home".to_string(),
        },
    }
}

fn section_label(controller: &NavigationController<MemoryHost>, id: SectionId) -> String {
    controller
        .catalog()
        .section(id)
        .map(|section| section.title.clone())
        .unwrap_or_else(|| format!("section {}", id))
}
