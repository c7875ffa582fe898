pub mod chat;
pub mod config;
pub mod error;
pub mod ledger;
pub mod transport;
pub mod types;

pub use chat::{ChatCommand, ChatController, ChatEvent, ChatState};
pub use config::{ServiceEndpoints, DEFAULT_REQUEST_TIMEOUT};
pub use error::{ClientError, ErrorCategory, ValidationError};
pub use ledger::{
    Draft, DraftField, LedgerCommand, LedgerController, LedgerEntry, LedgerEvent, LedgerState,
    ListView, RenderKey,
};
pub use transport::{ChatService, ExpenseStore, HttpChatService, HttpExpenseStore};
pub use types::RequestId;
