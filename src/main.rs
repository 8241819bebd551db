//! Stacklight CLI
//!
//! Usage:
//!   stacklight --serve                              # Authority on 0.0.0.0:$PORT (default 9000)
//!   stacklight --serve --addr 127.0.0.1:9100        # Authority on an explicit address
//!   stacklight --observe --role BRD --api http://host:9000
//!   stacklight --observe --role SK                  # Reuses the saved address
//!   stacklight --observe --forget                   # Forget the saved address

use clap::{ArgGroup, Parser};
use colored::Colorize;
use std::error::Error;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tokio::time::Instant;

use stacklight::core::{
    run_server, AddressStore, HttpAuthority, ObserverSession, Pacing, SyncEvent, SyncHandle,
    SyncLoop,
};
use stacklight::types::{Action, Role};
use stacklight::{
    DEBOUNCE_COOLDOWN_MS, DEFAULT_CONFIG_PATH, DEFAULT_PORT, FAILURE_RETRY_MS,
    MIN_POLL_INTERVAL_MS, VERSION,
};

#[derive(Parser, Debug)]
#[command(
    name = "stacklight",
    version = VERSION,
    about = "Stacklight - shared stack light for live events",
    long_about = "Stacklight coordinates a two-channel stack light between the\n\
                  scorekeeper, broadcast, director and back-of-house.\n\n\
                  Modes:\n  \
                  --serve    Run the authority (holds the Show and Scorekeeping channels)\n  \
                  --observe  Attach as an observer for one role\n\n\
                  Roles:\n  \
                  SK   Scorekeeper - issues card / scores / go / halt / clear\n  \
                  BRD  Broadcast   - shows the indicator lights\n  \
                  DIR  Director    - connectivity only\n  \
                  BOH  Back-of-house - connectivity only"
)]
#[command(group(ArgGroup::new("mode").required(true).args(["serve", "observe"])))]
struct Args {
    /// Run the authority HTTP server
    #[arg(short, long)]
    serve: bool,

    /// Authority listen address (overrides --port)
    #[arg(long)]
    addr: Option<String>,

    /// Authority listen port on 0.0.0.0
    #[arg(long, env = "PORT", default_value_t = DEFAULT_PORT)]
    port: u16,

    /// Attach as an observer
    #[arg(short, long)]
    observe: bool,

    /// Observer role: SK, BRD, DIR or BOH
    #[arg(short, long, default_value = "BRD")]
    role: String,

    /// Authority address to use and remember (e.g. http://10.0.0.2:9000)
    #[arg(long)]
    api: Option<String>,

    /// Forget the remembered authority address
    #[arg(long)]
    forget: bool,

    /// File holding the remembered authority address
    #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
    config: String,

    /// Minimum delay between polls (milliseconds)
    #[arg(long, default_value_t = MIN_POLL_INTERVAL_MS)]
    poll_ms: u64,

    /// Delay before retrying after a failed poll (milliseconds)
    #[arg(long, default_value_t = FAILURE_RETRY_MS)]
    retry_ms: u64,

    /// Control cooldown after an action (seconds)
    #[arg(long, default_value_t = DEBOUNCE_COOLDOWN_MS / 1000)]
    cooldown_secs: u64,

    /// Print views as JSON diagnostics
    #[arg(long)]
    json: bool,

    /// Disable colors in output
    #[arg(long)]
    no_color: bool,
}

#[tokio::main]
async fn main() {
    init_tracing();
    let args = Args::parse();
    if args.no_color {
        colored::control::set_override(false);
    }

    // exactly one mode flag is set
    let result = if args.observe {
        run_observe(&args).await
    } else {
        run_serve(&args).await
    };

    if let Err(e) = result {
        eprintln!("{} {}", "error:".red().bold(), e);
        std::process::exit(1);
    }
}

/// Structured logs go to stderr; the terminal view owns stdout
fn init_tracing() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("stacklight=info"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
        .with(filter)
        .init();
}

/// Print header
fn print_header(mode: &str) {
    println!("{}", "========================================".bold());
    println!("{}", format!("  Stacklight v{} - {}", VERSION, mode).bold());
    println!("{}", "========================================".bold());
    println!();
}

/// Run the authority
async fn run_serve(args: &Args) -> Result<(), Box<dyn Error>> {
    print_header("Authority");
    let addr = args
        .addr
        .clone()
        .unwrap_or_else(|| format!("0.0.0.0:{}", args.port));
    run_server(&addr).await
}

/// Run an observer session until stdin closes or `quit`
async fn run_observe(args: &Args) -> Result<(), Box<dyn Error>> {
    let store = AddressStore::new(&args.config);
    if args.forget {
        store.clear()?;
        println!("Authority address forgotten ({})", store.path().display());
    }
    let address = match &args.api {
        Some(api) => Some(store.save(api)?),
        None => store.load()?,
    };

    let cooldown = Duration::from_secs(args.cooldown_secs);
    let mut session = ObserverSession::from_role_code(&args.role, address, cooldown)?;
    let pacing = Pacing {
        min_interval: Duration::from_millis(args.poll_ms),
        failure_retry: Duration::from_millis(args.retry_ms),
    };

    print_header(&format!("Observer {}", session.role()));
    print_help(session.role());

    let client = Arc::new(HttpAuthority::new()?);
    let (tx, mut rx) = mpsc::channel::<SyncEvent>(32);
    let mut sync: Option<SyncHandle> = session
        .address()
        .map(|a| SyncLoop::new(client.clone(), a, pacing).spawn(tx.clone()));

    let mut last_printed = String::new();
    print_view(&session, args, &mut last_printed);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let deadline = session.next_deadline();
        tokio::select! {
            Some(event) = rx.recv() => {
                session.apply(event, Instant::now());
            }
            _ = sleep_until(deadline) => {
                session.tick(Instant::now());
            }
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                let (word, rest) = line.split_once(' ').unwrap_or((line, ""));
                match word.to_ascii_lowercase().as_str() {
                    "quit" | "exit" => break,
                    "help" => print_help(session.role()),
                    "status" => {
                        let diag = session.diagnostics(Instant::now());
                        println!("{}", serde_json::to_string_pretty(&diag)?);
                    }
                    "connect" => {
                        // bare `connect` reconnects to the remembered address
                        let target = if rest.trim().is_empty() {
                            store.require()
                        } else {
                            store.save(rest)
                        };
                        let saved = match target {
                            Ok(saved) => saved,
                            Err(e) => {
                                println!("{} {}", "✗".red(), e);
                                continue;
                            }
                        };
                        if let Some(handle) = sync.take() {
                            handle.stop().await;
                        }
                        while rx.try_recv().is_ok() {}
                        session.set_address(&saved)?;
                        sync = Some(SyncLoop::new(client.clone(), saved, pacing).spawn(tx.clone()));
                    }
                    "forget" => {
                        if let Some(handle) = sync.take() {
                            handle.stop().await;
                        }
                        while rx.try_recv().is_ok() {}
                        store.clear()?;
                        session.clear_address();
                    }
                    other => match Action::from_keyword(other) {
                        Some(action) => {
                            if let Err(e) = session.issue(client.as_ref(), action, Instant::now()).await {
                                println!("{} {}", "✗".red(), e);
                            }
                        }
                        None => println!("{} unknown command: {}", "?".yellow(), other),
                    },
                }
            }
        }
        print_view(&session, args, &mut last_printed);
    }

    if let Some(handle) = sync.take() {
        handle.stop().await;
    }
    println!("\nSession ended.");
    Ok(())
}

/// Sleep until the next cooldown deadline, or forever if none
async fn sleep_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}

/// Print the view when something visible changed
fn print_view(session: &ObserverSession, args: &Args, last_printed: &mut String) {
    let now = Instant::now();
    let view = session.view(now);
    let key = view.to_parseable_string();
    if key == *last_printed {
        return;
    }
    *last_printed = key;

    if args.json {
        if let Ok(json) = serde_json::to_string(&session.diagnostics(now)) {
            println!("{}", json);
        }
    } else if args.no_color {
        println!("{}", view.to_parseable_string());
    } else {
        println!("{}", view.to_terminal_string());
    }
}

/// Print the commands available to a role
fn print_help(role: Role) {
    println!("Commands: connect [url] | forget | status | help | quit");
    if role.can_issue_commands() {
        println!("Actions:  card | scores | go | halt | clear");
    }
    println!();
}
