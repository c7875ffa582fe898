//! Remote collaborators: the expense store and the chat assistant.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{Client, Response};
use shared::{
    domain::{Expense, ExpenseId, NewExpense},
    protocol::{ChatRequest, ChatResponse, CreateExpenseResponse},
};
use tracing::{debug, warn};

use crate::{config::ServiceEndpoints, error::ClientError};

#[async_trait]
pub trait ExpenseStore: Send + Sync {
    async fn list_expenses(&self) -> Result<Vec<Expense>, ClientError>;
    async fn create_expense(&self, payload: &NewExpense) -> Result<ExpenseId, ClientError>;
}

#[async_trait]
pub trait ChatService: Send + Sync {
    async fn ask(&self, text: &str) -> Result<String, ClientError>;
}

#[async_trait]
impl<T> ExpenseStore for Arc<T>
where
    T: ExpenseStore + ?Sized,
{
    async fn list_expenses(&self) -> Result<Vec<Expense>, ClientError> {
        (**self).list_expenses().await
    }

    async fn create_expense(&self, payload: &NewExpense) -> Result<ExpenseId, ClientError> {
        (**self).create_expense(payload).await
    }
}

#[async_trait]
impl<T> ChatService for Arc<T>
where
    T: ChatService + ?Sized,
{
    async fn ask(&self, text: &str) -> Result<String, ClientError> {
        (**self).ask(text).await
    }
}

pub fn build_http_client(endpoints: &ServiceEndpoints) -> Result<Client, ClientError> {
    Client::builder()
        .timeout(endpoints.request_timeout())
        .build()
        .map_err(ClientError::Transport)
}

async fn ensure_success(
    operation: &'static str,
    response: Response,
) -> Result<Response, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    warn!(operation, %status, body = %body.trim(), "service rejected request");
    Err(ClientError::Status { status })
}

#[derive(Debug, Clone)]
pub struct HttpExpenseStore {
    http: Client,
    expenses_url: String,
}

impl HttpExpenseStore {
    pub fn new(endpoints: &ServiceEndpoints) -> Result<Self, ClientError> {
        Ok(Self::with_client(build_http_client(endpoints)?, endpoints))
    }

    pub fn with_client(http: Client, endpoints: &ServiceEndpoints) -> Self {
        Self {
            http,
            expenses_url: endpoints.expenses_url(),
        }
    }
}

#[async_trait]
impl ExpenseStore for HttpExpenseStore {
    async fn list_expenses(&self) -> Result<Vec<Expense>, ClientError> {
        let response = self.http.get(&self.expenses_url).send().await?;
        let response = ensure_success("list_expenses", response).await?;
        // A `null` body is treated as an empty ledger.
        let expenses: Option<Vec<Expense>> = response.json().await?;
        let expenses = expenses.unwrap_or_default();
        debug!(count = expenses.len(), "fetched expenses");
        Ok(expenses)
    }

    async fn create_expense(&self, payload: &NewExpense) -> Result<ExpenseId, ClientError> {
        let response = self
            .http
            .post(&self.expenses_url)
            .json(payload)
            .send()
            .await?;
        let response = ensure_success("create_expense", response).await?;
        let created: CreateExpenseResponse = response.json().await?;
        debug!(id = %created.id, "created expense");
        Ok(created.id)
    }
}

#[derive(Debug, Clone)]
pub struct HttpChatService {
    http: Client,
    chat_url: String,
}

impl HttpChatService {
    pub fn new(endpoints: &ServiceEndpoints) -> Result<Self, ClientError> {
        Ok(Self::with_client(build_http_client(endpoints)?, endpoints))
    }

    pub fn with_client(http: Client, endpoints: &ServiceEndpoints) -> Self {
        Self {
            http,
            chat_url: endpoints.chat_url(),
        }
    }
}

#[async_trait]
impl ChatService for HttpChatService {
    async fn ask(&self, text: &str) -> Result<String, ClientError> {
        let response = self
            .http
            .post(&self.chat_url)
            .json(&ChatRequest {
                user_message: text.to_string(),
            })
            .send()
            .await?;
        let response = ensure_success("ask", response).await?;
        let reply: ChatResponse = response.json().await?;
        Ok(reply.bot_response)
    }
}

#[cfg(test)]
#[path = "tests/transport_tests.rs"]
mod tests;
