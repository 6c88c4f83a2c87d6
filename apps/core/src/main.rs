// ScholarMate Backend Entry Point
// Coordinator of study-assistant intent handlers

mod actors;
mod brain;
mod database;
mod error;
mod evaluation;
mod fs_manager;
mod handlers;
mod models;
mod packer;
mod prompts;
mod text_extract;

#[cfg(test)]
mod tests;

use std::io::Write;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use tracing::warn;
use tracing_subscriber::EnvFilter;

use actors::calendar::CalendarClient;
use actors::coordinator::{CoordinatorHandle, HandlerSet};
use actors::model::ModelClient;
use actors::traits::{CalendarBackend, ModelBackend};
use brain::intent::Intent;
use fs_manager::PortablePathManager;
use handlers::{EvaluateHandler, PlanHandler, ScheduleHandler, SummarizeHandler};
use models::{ModelSettings, RoutedResponse};

#[derive(Parser)]
#[command(name = "scholarmate", about = "AI-powered academic assistant", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Route a single request through the coordinator
    Ask {
        /// The request text
        text: Vec<String>,
        /// Force a specific intent instead of classifying
        #[arg(long, value_enum)]
        intent: Option<IntentArg>,
    },
    /// Interactive session
    Chat,
    /// Summarize a lecture file (txt, md, pdf, docx)
    Summarize {
        file: std::path::PathBuf,
    },
    /// Show the current active study plan
    Plan,
    /// List upcoming events from the local store
    Events {
        #[arg(long, default_value_t = 7)]
        days: i64,
    },
    /// Show recent interactions
    History {
        #[arg(long, default_value_t = 10)]
        limit: i64,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum IntentArg {
    Schedule,
    Summarize,
    Plan,
    Evaluate,
}

impl From<IntentArg> for Intent {
    fn from(arg: IntentArg) -> Self {
        match arg {
            IntentArg::Schedule => Intent::Schedule,
            IntentArg::Summarize => Intent::Summarize,
            IntentArg::Plan => Intent::Plan,
            IntentArg::Evaluate => Intent::Evaluate,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    PortablePathManager::init().context("Failed to initialize data directories")?;
    let pool = database::init_db(None)
        .await
        .context("Failed to initialize database")?;

    let model = model_backend_from_env();
    let calendar = calendar_backend_from_env()?;

    let handlers = HandlerSet {
        scheduler: Arc::new(ScheduleHandler::new(pool.clone(), calendar.clone())),
        summarizer: Arc::new(SummarizeHandler::new(pool.clone(), model)),
        planner: Arc::new(PlanHandler::new(pool.clone(), calendar)),
        evaluator: Arc::new(EvaluateHandler::new(pool.clone())),
    };
    let coordinator = CoordinatorHandle::new(handlers, Some(pool.clone()));

    match cli.command {
        Command::Ask { text, intent } => {
            let text = text.join(" ");
            let response = coordinator
                .handle_request(text, intent.map(Into::into))
                .await?;
            render_response(&response);
        }
        Command::Chat => run_chat(&coordinator).await?,
        Command::Summarize { file } => {
            let request = format!("Summarize file: {}", file.display());
            let response = coordinator
                .handle_request(request, Some(Intent::Summarize))
                .await?;
            render_response(&response);
        }
        Command::Plan => {
            match database::current_plan(&pool).await? {
                Some(stored) => {
                    let plan = &stored.plan.0;
                    println!(
                        "Active plan ({} -> {}, {}h/day{})",
                        plan.start_date,
                        plan.deadline,
                        plan.daily_capacity_hours,
                        if plan.feasible { "" } else { ", INFEASIBLE" }
                    );
                    for slot in &plan.slots {
                        println!("  {}  {:.1}h  {}", slot.day, slot.allocated_hours, slot.topic);
                    }
                    if !plan.unplaced_topics.is_empty() {
                        println!("  Unplaced: {}", plan.unplaced_topics.join(", "));
                    }
                }
                None => println!("No active study plan. Try: scholarmate ask \"study plan for ...\""),
            }
        }
        Command::Events { days } => {
            let today = chrono::Utc::now().date_naive();
            let events = database::upcoming_events(&pool, today, days).await?;
            if events.is_empty() {
                println!("No events in the next {} days", days);
            }
            for event in events {
                println!(
                    "#{} {} {} {} ({} min)",
                    event.id,
                    event.date,
                    event.time.as_deref().unwrap_or("all day"),
                    event.title,
                    event.duration_minutes
                );
            }
        }
        Command::History { limit } => {
            for log in database::recent_interactions(&pool, limit).await? {
                let status = if log.success { "ok" } else { "failed" };
                println!("[{}] {} ({}): {}", log.created_at, log.intent, status, log.input);
            }
        }
    }

    Ok(())
}

/// The model collaborator is optional; without `MODEL_SERVER_URL` the
/// summarizer uses its rule-based fallbacks.
fn model_backend_from_env() -> Option<Arc<dyn ModelBackend>> {
    let url = std::env::var("MODEL_SERVER_URL").ok()?;
    let token = std::env::var("MODEL_AUTH_TOKEN").ok();
    Some(Arc::new(ModelClient::new(
        url,
        token,
        ModelSettings::default(),
    )))
}

/// The calendar collaborator is optional; without it events are stored
/// locally only.
fn calendar_backend_from_env() -> anyhow::Result<Option<Arc<dyn CalendarBackend>>> {
    let (Ok(url), Ok(token)) = (
        std::env::var("CALENDAR_API_URL"),
        std::env::var("CALENDAR_API_TOKEN"),
    ) else {
        return Ok(None);
    };

    let client = CalendarClient::new(&url, token).context("Invalid CALENDAR_API_URL")?;
    Ok(Some(Arc::new(client)))
}

fn render_response(response: &RoutedResponse) {
    if response.success {
        println!("{}", response.message);
    } else {
        eprintln!("{}", response.message);
    }

    if !response.payload.is_null() {
        if let Ok(pretty) = serde_json::to_string_pretty(&response.payload) {
            println!("{}", pretty);
        }
    }
}

async fn run_chat(coordinator: &CoordinatorHandle) -> anyhow::Result<()> {
    use tokio::io::{AsyncBufReadExt, BufReader};

    println!("ScholarMate ready. Type a request, or 'quit' to exit.");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        print!("> ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let line = line.trim().to_string();
        if line.is_empty() {
            continue;
        }
        if line.eq_ignore_ascii_case("quit") || line.eq_ignore_ascii_case("exit") {
            break;
        }

        match coordinator.handle_request(line, None).await {
            Ok(response) => render_response(&response),
            Err(e) => warn!("Request failed: {}", e),
        }
    }

    Ok(())
}
