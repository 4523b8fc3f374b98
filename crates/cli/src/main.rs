mod eval;
mod seed;

use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use hotel_assistant::{BookingAssistant, GeminiConfig, HotelProfile, QuoteRequest, TextGenerator};
use hotel_core::{load_catalog, render_text, ChatInput, ChatMessage, ChatRole, RoomCatalog};
use hotel_observability::{init_tracing, AppMetrics};
use hotel_storage::{ReservationRepository, Store};

#[derive(Debug, Parser)]
#[command(name = "hotel")]
#[command(about = "Gran Hotel Bell Ville booking CLI")]
struct Cli {
    /// JSON room catalog replacing the built-in one.
    #[arg(long, env = "HOTEL_CATALOG_PATH")]
    catalog: Option<PathBuf>,

    #[arg(long, env = "HOTEL_DATABASE_URL")]
    database_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print the room catalog as JSON.
    Rooms,
    Quote {
        #[arg(long)]
        room: String,
        #[arg(long)]
        check_in: String,
        #[arg(long)]
        check_out: String,
    },
    /// Render the reservation report.
    Report {
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Insert demo reservations into an empty store.
    SeedDemo {
        #[arg(long, default_value_t = 50)]
        count: usize,
        #[arg(long, default_value_t = 2025)]
        seed: u64,
    },
    Chat,
    /// Score a running API's chat replies against the keyword dataset.
    EvalChat {
        #[arg(long, default_value = "http://localhost:5000")]
        api_url: String,
        #[arg(long, default_value_t = 90.0)]
        min_accuracy: f64,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing("hotel_cli");
    let cli = Cli::parse();

    if let Command::EvalChat {
        api_url,
        min_accuracy,
    } = &cli.command
    {
        return eval_chat(api_url, *min_accuracy).await;
    }

    let assistant = build_assistant(&cli).await?;

    match cli.command {
        Command::Rooms => {
            println!("{}", serde_json::to_string_pretty(assistant.catalog())?);
        }
        Command::Quote {
            room,
            check_in,
            check_out,
        } => {
            let quote = assistant
                .quote(&QuoteRequest {
                    room_type: room,
                    check_in,
                    check_out,
                })
                .context("quote rejected")?;
            println!("{}", serde_json::to_string_pretty(&quote)?);
        }
        Command::Report { output } => {
            let text = render_text(&assistant.report().await?);
            println!("{text}");
            if let Some(path) = output {
                fs::write(&path, &text)
                    .with_context(|| format!("failed writing report to {}", path.display()))?;
                println!("Report saved to {}", path.display());
            }
        }
        Command::SeedDemo { count, seed } => {
            let store = assistant.store();
            let existing = store.count_reservations().await?;
            if existing > 0 {
                println!("Store already holds {existing} reservations, nothing seeded.");
                return Ok(());
            }

            let calculator = hotel_core::PricingCalculator::new(assistant.catalog().clone());
            for reservation in seed::demo_reservations(&calculator, count, seed, Utc::now()) {
                store.insert_reservation(reservation).await?;
            }
            println!("Seeded {count} demo reservations.");
        }
        Command::Chat => run_chat(assistant).await?,
        Command::EvalChat { .. } => {}
    }

    Ok(())
}

async fn eval_chat(api_url: &str, min_accuracy: f64) -> Result<()> {
    let summary = eval::run_chat_eval(api_url).await?;

    for (index, case) in summary.cases.iter().enumerate() {
        let mark = if case.correct { "ok  " } else { "FAIL" };
        println!("[{:>2}] {} {}", index + 1, mark, case.question);
        if !case.correct {
            println!("       {}", case.detail);
        }
    }
    println!(
        "\naccuracy: {:.2}% ({}/{}), target {:.0}%",
        summary.accuracy, summary.correct, summary.total, min_accuracy
    );

    anyhow::ensure!(
        summary.accuracy >= min_accuracy,
        "chat accuracy {:.2}% is below the {:.0}% target",
        summary.accuracy,
        min_accuracy
    );
    Ok(())
}

async fn run_chat(assistant: BookingAssistant<Store>) -> Result<()> {
    let mut history: Vec<ChatMessage> = Vec::new();

    println!("BellBot chat mode. type 'exit' to quit.");

    loop {
        print!("> ");
        io::stdout().flush()?;

        let mut line = String::new();
        if io::stdin().read_line(&mut line)? == 0 {
            break;
        }

        let message = line.trim();
        if message.eq_ignore_ascii_case("exit") || message.eq_ignore_ascii_case("quit") {
            break;
        }

        if message.is_empty() {
            continue;
        }

        let reply = assistant
            .handle_chat(ChatInput {
                message: message.to_string(),
                history: history.clone(),
            })
            .await?;

        println!("\n{}\n", reply.response);
        if !reply.images.is_empty() {
            let rooms = reply
                .images
                .iter()
                .map(|id| id.as_code())
                .collect::<Vec<_>>()
                .join(", ");
            println!("Gallery: {rooms}\n");
        }

        history.push(ChatMessage {
            role: ChatRole::User,
            content: message.to_string(),
        });
        history.push(ChatMessage {
            role: ChatRole::Assistant,
            content: reply.response,
        });
    }

    Ok(())
}

async fn build_assistant(cli: &Cli) -> Result<BookingAssistant<Store>> {
    let catalog = match &cli.catalog {
        Some(path) => load_catalog(path).context("invalid --catalog")?,
        None => RoomCatalog::default(),
    };

    let store = match &cli.database_url {
        Some(database_url) => Store::sqlite(database_url).await?,
        None => Store::memory(),
    };

    let generator = match GeminiConfig::from_env() {
        Some(config) => TextGenerator::gemini(config)?,
        None => TextGenerator::Offline,
    };

    Ok(BookingAssistant::new(
        catalog,
        HotelProfile::default(),
        generator,
        Arc::new(store),
        AppMetrics::shared(),
    ))
}
