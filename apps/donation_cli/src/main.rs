use std::{path::PathBuf, sync::Arc};

use anyhow::{Context, Result};
use clap::Parser;
use donation_core::{
    Directory, DonationFlow, FlowConfig, FlowDependencies, HttpSubmitter, InMemoryHistory,
    InMemorySlot, NoopSubmitter, SessionStore, Submitter, SystemClock,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

mod commands;
mod config;
mod console_view;

use commands::{parse_command, SelectChoice, UiCommand, HELP};
use config::{load_settings, Settings, SubmitMode};
use console_view::ConsoleView;

#[derive(Parser, Debug)]
#[command(about = "Church donation intake in the terminal")]
struct Args {
    /// Settings file; defaults to ./donation.toml when present.
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long, value_enum)]
    submit_mode: Option<SubmitMode>,
    #[arg(long)]
    endpoint: Option<String>,
}

fn build_submitter(settings: &Settings) -> Result<Arc<dyn Submitter>> {
    match settings.submit_mode {
        SubmitMode::Local => Ok(Arc::new(NoopSubmitter)),
        SubmitMode::Remote => {
            let submitter =
                HttpSubmitter::with_timeout(settings.endpoint_url()?, settings.submit_timeout())
                    .context("failed to build HTTP client")?;
            Ok(Arc::new(submitter))
        }
    }
}

struct App {
    flow: Arc<DonationFlow>,
    view: Arc<ConsoleView>,
    history: Arc<InMemoryHistory>,
}

impl App {
    /// Returns false once the user asked to quit.
    async fn handle(&self, command: UiCommand) -> bool {
        debug!(command = command.name(), "handling command");
        match command {
            UiCommand::Search { query } => {
                if self.flow.search(&query).is_empty() {
                    println!("(no results)");
                }
            }
            UiCommand::Select { choice } => {
                let entry = match choice {
                    SelectChoice::Index(index) => self.view.result_at(index),
                    SelectChoice::Name(name) => {
                        self.flow.directory().find_by_name(&name).cloned()
                    }
                };
                match entry {
                    Some(entry) => self.flow.select(entry).await,
                    None => println!("! no such result; search first"),
                }
            }
            UiCommand::ClickOutside => self.flow.dismiss_results(),
            UiCommand::Go { screen } => self.flow.advance(screen).await,
            UiCommand::Back => match self.history.back() {
                Some(fragment) => self.restore(&fragment).await,
                None => println!("(no earlier page)"),
            },
            UiCommand::Forward => match self.history.forward() {
                Some(fragment) => self.restore(&fragment).await,
                None => println!("(no later page)"),
            },
            UiCommand::Hash { token } => self.restore(&token).await,
            UiCommand::SetDonation { key, value } => {
                if let Err(message) = self.view.set_donation_field(&key, &value) {
                    println!("! {message}");
                }
            }
            UiCommand::SetDetail { key, value } => {
                if let Err(message) = self.view.set_receipt_field(&key, &value) {
                    println!("! {message}");
                }
            }
            UiCommand::Submit => {
                if let Err(err) = self.flow.submit().await {
                    debug!(error = %err, code = ?err.code(), "submission not completed");
                }
            }
            UiCommand::ToggleInfo => {
                self.flow.toggle_expandable().await;
            }
            UiCommand::ReportIssue => self.flow.report_issue(),
            UiCommand::Restart => self.flow.reset().await,
            UiCommand::Status => {
                let state = self.flow.snapshot().await;
                println!(
                    "screen: {} ({})  location: {}",
                    state.current_screen,
                    state.current_screen.number(),
                    self.history.current_fragment()
                );
                println!(
                    "history: {:?}",
                    state
                        .navigation_history
                        .iter()
                        .map(|screen| screen.number())
                        .collect::<Vec<_>>()
                );
                println!("phase: {:?}", self.flow.phase().await);
                println!("{}", self.view.describe_forms());
            }
            UiCommand::Help => println!("{HELP}"),
            UiCommand::Quit => return false,
        }
        true
    }

    async fn restore(&self, token: &str) {
        if let Err(err) = self.flow.restore_from_external_nav(token).await {
            println!("! {err}");
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
    let args = Args::parse();

    let mut settings = load_settings(args.config.as_deref())?;
    if let Some(mode) = args.submit_mode {
        settings.submit_mode = mode;
    }
    if let Some(endpoint) = args.endpoint {
        settings.submit_endpoint = endpoint;
    }

    let submitter = build_submitter(&settings)?;
    let clock = Arc::new(SystemClock);
    let view = Arc::new(ConsoleView::new());
    let history = Arc::new(InMemoryHistory::new());
    let store = SessionStore::new(
        Arc::new(InMemorySlot::default()),
        clock.clone(),
        settings.session_ttl(),
    );
    let flow = DonationFlow::new(
        FlowConfig {
            auto_advance_delay: settings.auto_advance_delay(),
        },
        FlowDependencies {
            directory: Directory::default(),
            view: view.clone(),
            history: history.clone(),
            store,
            submitter,
            clock,
        },
    );
    info!(transport = %flow.submitter().describe(), "donation intake ready");

    let app = App {
        flow,
        view,
        history,
    };
    app.flow.start().await;
    println!("type 'help' for commands");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await.context("failed to read stdin")? {
        if line.trim().is_empty() {
            continue;
        }
        match parse_command(&line) {
            Ok(command) => {
                if !app.handle(command).await {
                    break;
                }
            }
            Err(message) => println!("! {message}"),
        }
    }

    Ok(())
}
