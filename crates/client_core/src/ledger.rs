//! Expense ledger controller: local expense list, the add-expense draft, and the flags that
//! track the initial load and in-flight submissions.
//!
//! State changes go through [`reduce`], which never performs I/O. Remote work is returned as a
//! [`LedgerCommand`]; [`execute`] runs it against an [`ExpenseStore`] and produces the event
//! that is fed back into the reducer.

use std::str::FromStr;

use shared::domain::{total_amount, Expense, ExpenseId, NewExpense};
use thiserror::Error;
use tracing::{debug, warn};

use crate::{
    error::{ClientError, ValidationError},
    transport::ExpenseStore,
    types::{RequestId, RequestSequence},
};

pub const EMPTY_LIST_PLACEHOLDER: &str = "No expenses found.";
pub const LOAD_FAILED_MESSAGE: &str = "Failed to fetch expenses";
pub const CREATE_FAILED_MESSAGE: &str = "Failed to add expense";
pub const TIMEOUT_MESSAGE: &str = "The expense service did not respond in time";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DraftField {
    Title,
    Amount,
    Category,
    Date,
}

impl DraftField {
    pub const ALL: [DraftField; 4] = [Self::Title, Self::Amount, Self::Category, Self::Date];

    pub fn name(self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::Amount => "amount",
            Self::Category => "category",
            Self::Date => "date",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown form field '{0}'")]
pub struct UnknownField(pub String);

impl FromStr for DraftField {
    type Err = UnknownField;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|field| field.name().eq_ignore_ascii_case(raw.trim()))
            .ok_or_else(|| UnknownField(raw.to_string()))
    }
}

/// Add-expense form contents, exactly as typed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Draft {
    pub title: String,
    pub amount: String,
    pub category: String,
    pub date: String,
}

impl Draft {
    pub fn get(&self, field: DraftField) -> &str {
        match field {
            DraftField::Title => &self.title,
            DraftField::Amount => &self.amount,
            DraftField::Category => &self.category,
            DraftField::Date => &self.date,
        }
    }

    pub fn set(&mut self, field: DraftField, value: impl Into<String>) {
        let slot = match field {
            DraftField::Title => &mut self.title,
            DraftField::Amount => &mut self.amount,
            DraftField::Category => &mut self.category,
            DraftField::Date => &mut self.date,
        };
        *slot = value.into();
    }

    /// Validates the draft and builds the payload sent to the store.
    pub fn normalize(&self) -> Result<NewExpense, ValidationError> {
        if DraftField::ALL
            .into_iter()
            .any(|field| self.get(field).trim().is_empty())
        {
            return Err(ValidationError::MissingFields);
        }

        let amount = self
            .amount
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|amount| amount.is_finite() && *amount >= 0.0)
            .ok_or(ValidationError::InvalidAmount)?;

        Ok(NewExpense {
            title: self.title.clone(),
            amount,
            category: self.category.clone(),
            date: self.date.clone(),
        })
    }
}

/// Session-local row key, assigned in arrival order. Never sent to the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RenderKey(pub u64);

#[derive(Debug, Clone, PartialEq)]
pub struct LedgerEntry {
    pub key: RenderKey,
    pub expense: Expense,
}

impl LedgerEntry {
    /// Store id when the row has one, otherwise the local key.
    pub fn label(&self) -> String {
        match &self.expense.id {
            Some(id) => format!("#{id}"),
            None => format!("~{}", self.key.0),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ListView<'a> {
    Loading,
    Empty,
    Rows(&'a [LedgerEntry]),
}

#[derive(Debug, Clone)]
struct PendingCreate {
    request: RequestId,
    payload: NewExpense,
}

#[derive(Debug, Clone, Default)]
pub struct LedgerState {
    entries: Vec<LedgerEntry>,
    draft: Draft,
    loading: bool,
    submitting: bool,
    error: Option<String>,
    initialized: bool,
    pending_create: Option<PendingCreate>,
    requests: RequestSequence,
    next_local_key: u64,
}

impl LedgerState {
    pub fn expenses(&self) -> impl Iterator<Item = &Expense> + '_ {
        self.entries.iter().map(|entry| &entry.expense)
    }

    pub fn entries(&self) -> &[LedgerEntry] {
        &self.entries
    }

    pub fn draft(&self) -> &Draft {
        &self.draft
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    /// Whether the submit affordance should be enabled.
    pub fn can_submit(&self) -> bool {
        !self.submitting
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn total(&self) -> f64 {
        total_amount(self.expenses())
    }

    pub fn list_view(&self) -> ListView<'_> {
        if self.loading {
            ListView::Loading
        } else if self.entries.is_empty() {
            ListView::Empty
        } else {
            ListView::Rows(&self.entries)
        }
    }

    fn push_expense(&mut self, expense: Expense) {
        self.next_local_key += 1;
        let key = RenderKey(self.next_local_key);
        self.entries.push(LedgerEntry { key, expense });
    }
}

#[derive(Debug)]
pub enum LedgerEvent {
    Initialize,
    ExpensesLoaded(Vec<Expense>),
    ExpensesFailed(ClientError),
    FieldEdited { field: DraftField, value: String },
    SubmitRequested,
    ExpenseCreated { request: RequestId, id: ExpenseId },
    CreateFailed { request: RequestId, error: ClientError },
}

#[derive(Debug, Clone, PartialEq)]
pub enum LedgerCommand {
    FetchExpenses,
    CreateExpense {
        request: RequestId,
        payload: NewExpense,
    },
}

impl LedgerCommand {
    pub fn name(&self) -> &'static str {
        match self {
            Self::FetchExpenses => "fetch_expenses",
            Self::CreateExpense { .. } => "create_expense",
        }
    }
}

fn banner_for(err: &ClientError, fallback: &str) -> String {
    match err {
        ClientError::Validation(validation) => validation.to_string(),
        ClientError::Timeout => TIMEOUT_MESSAGE.to_string(),
        _ => fallback.to_string(),
    }
}

pub fn reduce(
    mut state: LedgerState,
    event: LedgerEvent,
) -> (LedgerState, Option<LedgerCommand>) {
    let command = match event {
        LedgerEvent::Initialize => {
            if state.initialized {
                debug!("ledger already initialized; skipping fetch");
                None
            } else {
                state.initialized = true;
                state.loading = true;
                state.error = None;
                Some(LedgerCommand::FetchExpenses)
            }
        }
        LedgerEvent::ExpensesLoaded(expenses) => {
            if state.loading {
                // Rows confirmed while the load was in flight stay after the loaded ones.
                let appended = std::mem::take(&mut state.entries);
                for expense in expenses {
                    state.push_expense(expense);
                }
                state.entries.extend(appended);
                state.loading = false;
            } else {
                warn!("discarding expense list that arrived with no load in flight");
            }
            None
        }
        LedgerEvent::ExpensesFailed(error) => {
            if state.loading {
                warn!(%error, "initial expense load failed");
                state.error = Some(banner_for(&error, LOAD_FAILED_MESSAGE));
                state.loading = false;
            } else {
                warn!(%error, "discarding load failure with no load in flight");
            }
            None
        }
        LedgerEvent::FieldEdited { field, value } => {
            state.draft.set(field, value);
            None
        }
        LedgerEvent::SubmitRequested => {
            if state.submitting {
                debug!("submit ignored while another create is in flight");
                None
            } else {
                match state.draft.normalize() {
                    Err(validation) => {
                        state.error = Some(validation.to_string());
                        None
                    }
                    Ok(payload) => {
                        let request = state.requests.next_id();
                        state.submitting = true;
                        state.error = None;
                        state.pending_create = Some(PendingCreate {
                            request,
                            payload: payload.clone(),
                        });
                        Some(LedgerCommand::CreateExpense { request, payload })
                    }
                }
            }
        }
        LedgerEvent::ExpenseCreated { request, id } => {
            match take_pending(&mut state, request) {
                Some(payload) => {
                    state.push_expense(payload.into_expense(Some(id)));
                    state.draft = Draft::default();
                }
                None => warn!(%request, %id, "discarding stale create completion"),
            }
            None
        }
        LedgerEvent::CreateFailed { request, error } => {
            if take_pending(&mut state, request).is_some() {
                warn!(%request, %error, "create expense failed");
                state.error = Some(banner_for(&error, CREATE_FAILED_MESSAGE));
            } else {
                warn!(%request, %error, "discarding stale create failure");
            }
            None
        }
    };

    (state, command)
}

/// Releases the in-flight create if `request` is the one being waited on.
fn take_pending(state: &mut LedgerState, request: RequestId) -> Option<NewExpense> {
    let is_current = state
        .pending_create
        .as_ref()
        .is_some_and(|pending| pending.request == request);
    if !is_current {
        return None;
    }

    state.submitting = false;
    state.pending_create.take().map(|pending| pending.payload)
}

pub async fn execute<S>(store: &S, command: LedgerCommand) -> LedgerEvent
where
    S: ExpenseStore + ?Sized,
{
    debug!(command = command.name(), "executing ledger command");
    match command {
        LedgerCommand::FetchExpenses => match store.list_expenses().await {
            Ok(expenses) => LedgerEvent::ExpensesLoaded(expenses),
            Err(error) => LedgerEvent::ExpensesFailed(error),
        },
        LedgerCommand::CreateExpense { request, payload } => {
            match store.create_expense(&payload).await {
                Ok(id) => LedgerEvent::ExpenseCreated { request, id },
                Err(error) => LedgerEvent::CreateFailed { request, error },
            }
        }
    }
}

pub struct LedgerController<S> {
    store: S,
    state: LedgerState,
}

impl<S: ExpenseStore> LedgerController<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            state: LedgerState::default(),
        }
    }

    pub fn state(&self) -> &LedgerState {
        &self.state
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Applies one event and returns the remote work it requests, if any. Front ends that
    /// run calls concurrently use this together with [`execute`].
    pub fn dispatch(&mut self, event: LedgerEvent) -> Option<LedgerCommand> {
        let (state, command) = reduce(std::mem::take(&mut self.state), event);
        self.state = state;
        command
    }

    /// Applies `event` and drives any resulting commands to completion.
    pub async fn run(&mut self, event: LedgerEvent) {
        let mut next = self.dispatch(event);
        while let Some(command) = next {
            let outcome = execute(&self.store, command).await;
            next = self.dispatch(outcome);
        }
    }

    pub async fn initialize(&mut self) {
        self.run(LedgerEvent::Initialize).await;
    }

    pub fn edit_field(&mut self, field: DraftField, value: impl Into<String>) {
        self.dispatch(LedgerEvent::FieldEdited {
            field,
            value: value.into(),
        });
    }

    pub async fn submit(&mut self) {
        self.run(LedgerEvent::SubmitRequested).await;
    }
}

#[cfg(test)]
#[path = "tests/ledger_tests.rs"]
mod tests;
