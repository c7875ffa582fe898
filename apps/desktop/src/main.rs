use std::sync::Arc;

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use client_core::{
    ChatController, DraftField, HttpChatService, HttpExpenseStore, LedgerController,
};
use tracing_subscriber::EnvFilter;

mod config;
mod interactive;
mod view;

use config::load_settings;

#[derive(Parser, Debug)]
#[command(name = "expense-dashboard", about = "Expense ledger and assistant chat client")]
struct Cli {
    /// Base URL of the expense service.
    #[arg(long)]
    expense_api_url: Option<String>,
    /// Base URL of the chat assistant.
    #[arg(long)]
    chat_api_url: Option<String>,
    /// Per-request timeout in seconds.
    #[arg(long)]
    timeout_secs: Option<u64>,
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the expense list and total.
    List,
    /// Add one expense.
    Add {
        #[arg(long)]
        title: String,
        #[arg(long)]
        amount: String,
        #[arg(long)]
        category: String,
        #[arg(long)]
        date: String,
    },
    /// Ask the assistant a single question.
    Chat { message: Vec<String> },
    /// Line-oriented session combining the ledger and the chat (default).
    Interactive,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut settings = load_settings()?;
    if let Some(url) = cli.expense_api_url {
        settings.expense_api_url = url;
    }
    if let Some(url) = cli.chat_api_url {
        settings.chat_api_url = url;
    }
    if let Some(secs) = cli.timeout_secs {
        settings.request_timeout_secs = secs;
    }

    let endpoints = settings.endpoints()?;
    tracing::info!(
        expenses = %endpoints.expenses_url(),
        chat = %endpoints.chat_url(),
        "using service endpoints"
    );
    let store = Arc::new(HttpExpenseStore::new(&endpoints)?);
    let chat_service = Arc::new(HttpChatService::new(&endpoints)?);

    match cli.command.unwrap_or(Command::Interactive) {
        Command::List => {
            let mut ledger = LedgerController::new(store);
            ledger.initialize().await;
            print!("{}", view::render_ledger(ledger.state()));
            if let Some(error) = ledger.state().error() {
                bail!("{error}");
            }
        }
        Command::Add {
            title,
            amount,
            category,
            date,
        } => {
            let mut ledger = LedgerController::new(store);
            for (field, value) in [
                (DraftField::Title, title),
                (DraftField::Amount, amount),
                (DraftField::Category, category),
                (DraftField::Date, date),
            ] {
                ledger.edit_field(field, value);
            }
            ledger.submit().await;
            if let Some(error) = ledger.state().error() {
                bail!("{error}");
            }
            print!("{}", view::render_ledger(ledger.state()));
        }
        Command::Chat { message } => {
            let mut chat = ChatController::new(chat_service);
            chat.set_input(message.join(" "));
            chat.send().await;
            print!("{}", view::render_transcript(chat.state()));
            if chat.state().transcript().last().is_some_and(|turn| turn.failed) {
                bail!("assistant request failed");
            }
        }
        Command::Interactive => interactive::run(store, chat_service).await?,
    }

    Ok(())
}
