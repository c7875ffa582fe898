//! Line-oriented dashboard session.
//!
//! Remote calls run on their own tasks; their outcomes come back over a channel and are fed
//! into the controllers from the same loop that reads user input, so typing is never blocked
//! by an outstanding request.

use anyhow::{Context, Result};
use client_core::{
    chat, ledger, ChatCommand, ChatController, ChatEvent, ChatService, DraftField,
    ExpenseStore, LedgerCommand, LedgerController, LedgerEvent,
};
use tokio::{
    io::{AsyncBufReadExt, BufReader},
    sync::mpsc,
};
use tracing::debug;

use crate::view;

const HELP: &str = "\
Commands:
  /title <text>     /amount <number>     /category <text>     /date <YYYY-MM-DD>
  /submit           add the drafted expense
  /draft            show the current draft
  /list             show expenses and total
  /history          show the chat transcript
  /help             show this help
  /quit             leave
Anything else is sent to the assistant.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputLine {
    Edit(DraftField, String),
    Submit,
    ShowDraft,
    List,
    History,
    Help,
    Quit,
    Chat(String),
    Blank,
    Unknown(String),
}

pub fn parse_line(line: &str) -> InputLine {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return InputLine::Blank;
    }
    let Some(command) = trimmed.strip_prefix('/') else {
        return InputLine::Chat(line.to_string());
    };

    let (name, rest) = command
        .split_once(char::is_whitespace)
        .map(|(name, rest)| (name, rest.trim()))
        .unwrap_or((command, ""));

    match name {
        "submit" => InputLine::Submit,
        "draft" => InputLine::ShowDraft,
        "list" => InputLine::List,
        "history" => InputLine::History,
        "help" => InputLine::Help,
        "quit" | "exit" => InputLine::Quit,
        other => match other.parse::<DraftField>() {
            Ok(field) => InputLine::Edit(field, rest.to_string()),
            Err(_) => InputLine::Unknown(other.to_string()),
        },
    }
}

enum Completion {
    Ledger(LedgerEvent),
    Chat(ChatEvent),
}

struct Session<S, C> {
    ledger: LedgerController<S>,
    chat: ChatController<C>,
    completions: mpsc::Sender<Completion>,
}

impl<S, C> Session<S, C>
where
    S: ExpenseStore + Clone + 'static,
    C: ChatService + Clone + 'static,
{
    fn spawn_ledger(&self, command: LedgerCommand) {
        debug!(command = command.name(), "spawning ledger call");
        let store = self.ledger.store().clone();
        let tx = self.completions.clone();
        tokio::spawn(async move {
            let outcome = ledger::execute(&store, command).await;
            let _ = tx.send(Completion::Ledger(outcome)).await;
        });
    }

    fn spawn_chat(&self, command: ChatCommand) {
        let service = self.chat.service().clone();
        let tx = self.completions.clone();
        tokio::spawn(async move {
            let outcome = chat::execute(&service, command).await;
            let _ = tx.send(Completion::Chat(outcome)).await;
        });
    }

    fn dispatch_ledger(&mut self, event: LedgerEvent) {
        if let Some(command) = self.ledger.dispatch(event) {
            self.spawn_ledger(command);
        }
    }

    /// Returns `false` when the user asked to leave.
    fn handle_line(&mut self, line: &str) -> bool {
        match parse_line(line) {
            InputLine::Blank => {}
            InputLine::Help => println!("{HELP}"),
            InputLine::Quit => return false,
            InputLine::Unknown(name) => println!("unknown command '/{name}'; try /help"),
            InputLine::Edit(field, value) => {
                self.dispatch_ledger(LedgerEvent::FieldEdited { field, value });
                println!("{}", view::render_draft(self.ledger.state()));
            }
            InputLine::ShowDraft => println!("{}", view::render_draft(self.ledger.state())),
            InputLine::List => print!("{}", view::render_ledger(self.ledger.state())),
            InputLine::History => print!("{}", view::render_transcript(self.chat.state())),
            InputLine::Submit => {
                if !self.ledger.state().can_submit() {
                    println!("still adding the previous expense…");
                    return true;
                }
                self.dispatch_ledger(LedgerEvent::SubmitRequested);
                match self.ledger.state().error() {
                    Some(error) => println!("! {error}"),
                    None => println!("adding expense…"),
                }
            }
            InputLine::Chat(text) => {
                if self.chat.state().is_awaiting_reply() {
                    println!("still waiting for the assistant; send again once it replies");
                    return true;
                }
                self.chat.set_input(text);
                if let Some(command) = self.chat.dispatch(ChatEvent::SendRequested) {
                    self.spawn_chat(command);
                }
            }
        }
        true
    }

    fn apply(&mut self, completion: Completion) {
        match completion {
            Completion::Ledger(event) => {
                self.dispatch_ledger(event);
                print!("{}", view::render_ledger(self.ledger.state()));
            }
            Completion::Chat(event) => {
                self.chat.dispatch(event);
                if let Some(turn) = self.chat.state().transcript().last() {
                    println!("{}", view::render_turn(turn.role, &turn.text, turn.failed));
                }
            }
        }
    }
}

pub async fn run<S, C>(store: S, chat_service: C) -> Result<()>
where
    S: ExpenseStore + Clone + 'static,
    C: ChatService + Clone + 'static,
{
    let (tx, mut rx) = mpsc::channel::<Completion>(64);
    let mut session = Session {
        ledger: LedgerController::new(store),
        chat: ChatController::new(chat_service),
        completions: tx,
    };

    println!("{HELP}");
    session.dispatch_ledger(LedgerEvent::Initialize);
    print!("{}", view::render_ledger(session.ledger.state()));

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line.context("failed to read from stdin")? else {
                    break;
                };
                if !session.handle_line(&line) {
                    break;
                }
            }
            Some(completion) = rx.recv() => session.apply(completion),
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_field_edits_and_commands() {
        assert_eq!(
            parse_line("/amount 12.50"),
            InputLine::Edit(DraftField::Amount, "12.50".into())
        );
        assert_eq!(
            parse_line("/title  Morning coffee "),
            InputLine::Edit(DraftField::Title, "Morning coffee".into())
        );
        assert_eq!(
            parse_line("/date"),
            InputLine::Edit(DraftField::Date, String::new())
        );
        assert_eq!(parse_line("/submit"), InputLine::Submit);
        assert_eq!(parse_line("/exit"), InputLine::Quit);
        assert_eq!(parse_line("/bogus x"), InputLine::Unknown("bogus".into()));
    }

    #[test]
    fn plain_text_goes_to_chat_and_blank_is_ignored() {
        assert_eq!(
            parse_line("how much did I spend on food?"),
            InputLine::Chat("how much did I spend on food?".into())
        );
        assert_eq!(parse_line("   "), InputLine::Blank);
    }
}
