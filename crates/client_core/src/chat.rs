//! Chat session controller: append-only transcript plus the pending input buffer.
//!
//! Sends are serialized. While a reply is outstanding the input stays editable but further
//! sends are refused, so every user turn is followed by its own assistant turn.

use shared::domain::ChatTurn;
use tracing::{debug, warn};

use crate::{
    error::{ClientError, ErrorCategory},
    transport::ChatService,
    types::{RequestId, RequestSequence},
};

#[derive(Debug, Clone, Default)]
pub struct ChatState {
    transcript: Vec<ChatTurn>,
    input: String,
    awaiting: Option<RequestId>,
    requests: RequestSequence,
}

impl ChatState {
    pub fn transcript(&self) -> &[ChatTurn] {
        &self.transcript
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn is_awaiting_reply(&self) -> bool {
        self.awaiting.is_some()
    }

    pub fn can_send(&self) -> bool {
        self.awaiting.is_none() && !self.input.trim().is_empty()
    }
}

#[derive(Debug)]
pub enum ChatEvent {
    InputEdited(String),
    SendRequested,
    ReplyReceived { request: RequestId, text: String },
    ReplyFailed { request: RequestId, error: ClientError },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatCommand {
    Ask { request: RequestId, text: String },
}

fn failure_text(error: &ClientError) -> String {
    let reason = match error.category() {
        ErrorCategory::Timeout => "it took too long to answer",
        ErrorCategory::Transport | ErrorCategory::Validation => "the request failed",
    };
    format!("Sorry, I couldn't reach the assistant ({reason}). Please try again.")
}

pub fn reduce(mut state: ChatState, event: ChatEvent) -> (ChatState, Option<ChatCommand>) {
    let command = match event {
        ChatEvent::InputEdited(text) => {
            state.input = text;
            None
        }
        ChatEvent::SendRequested => {
            let text = state.input.trim().to_string();
            if text.is_empty() {
                None
            } else if let Some(request) = state.awaiting {
                debug!(%request, "send refused while a reply is outstanding");
                None
            } else {
                let request = state.requests.next_id();
                state.transcript.push(ChatTurn::user(text.clone()));
                state.input.clear();
                state.awaiting = Some(request);
                Some(ChatCommand::Ask { request, text })
            }
        }
        ChatEvent::ReplyReceived { request, text } => {
            if state.awaiting == Some(request) {
                state.transcript.push(ChatTurn::assistant(text));
                state.awaiting = None;
            } else {
                warn!(%request, "discarding stale chat reply");
            }
            None
        }
        ChatEvent::ReplyFailed { request, error } => {
            if state.awaiting == Some(request) {
                warn!(%request, %error, "chat request failed");
                state.transcript.push(ChatTurn::failed(failure_text(&error)));
                state.awaiting = None;
            } else {
                warn!(%request, %error, "discarding stale chat failure");
            }
            None
        }
    };

    (state, command)
}

pub async fn execute<C>(service: &C, command: ChatCommand) -> ChatEvent
where
    C: ChatService + ?Sized,
{
    match command {
        ChatCommand::Ask { request, text } => {
            debug!(%request, "asking assistant");
            match service.ask(&text).await {
                Ok(text) => ChatEvent::ReplyReceived { request, text },
                Err(error) => ChatEvent::ReplyFailed { request, error },
            }
        }
    }
}

pub struct ChatController<C> {
    service: C,
    state: ChatState,
}

impl<C: ChatService> ChatController<C> {
    pub fn new(service: C) -> Self {
        Self {
            service,
            state: ChatState::default(),
        }
    }

    pub fn state(&self) -> &ChatState {
        &self.state
    }

    pub fn service(&self) -> &C {
        &self.service
    }

    pub fn dispatch(&mut self, event: ChatEvent) -> Option<ChatCommand> {
        let (state, command) = reduce(std::mem::take(&mut self.state), event);
        self.state = state;
        command
    }

    pub fn set_input(&mut self, text: impl Into<String>) {
        self.dispatch(ChatEvent::InputEdited(text.into()));
    }

    /// Sends the current input and waits for the reply.
    pub async fn send(&mut self) {
        if let Some(command) = self.dispatch(ChatEvent::SendRequested) {
            let outcome = execute(&self.service, command).await;
            self.dispatch(outcome);
        }
    }
}

#[cfg(test)]
#[path = "tests/chat_tests.rs"]
mod tests;
