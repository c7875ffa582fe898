use serde::{Deserialize, Serialize};

use crate::domain::ExpenseId;

pub const EXPENSES_ROUTE: &str = "/expenses";
pub const CHAT_ROUTE: &str = "/chat";

/// Body returned by `POST /expenses`. Only `id` is relied upon; `message` is informational.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateExpenseResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub id: ExpenseId,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    pub user_message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResponse {
    pub bot_response: String,
}
