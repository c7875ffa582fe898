use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::{Deserialize, Serialize};
use shared::{
    domain::NewExpense,
    error::{ApiException, ErrorCode},
};

pub mod assistant;

/// Expense row as stored and served by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpenseRecord {
    pub id: i64,
    pub title: String,
    pub amount: f64,
    pub category: String,
    pub date: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatedExpense {
    pub message: String,
    pub id: i64,
}

#[derive(Debug, Default)]
struct Ledger {
    next_id: i64,
    rows: Vec<ExpenseRecord>,
}

/// In-memory expense book shared by all request handlers.
#[derive(Clone, Default)]
pub struct ApiContext {
    ledger: Arc<Mutex<Ledger>>,
}

impl ApiContext {
    pub fn new() -> Self {
        Self::default()
    }

    fn ledger(&self) -> MutexGuard<'_, Ledger> {
        self.ledger.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn list_expenses(&self) -> Vec<ExpenseRecord> {
        self.ledger().rows.clone()
    }

    pub fn create_expense(&self, expense: NewExpense) -> Result<CreatedExpense, ApiException> {
        validate_new_expense(&expense)?;

        let mut ledger = self.ledger();
        ledger.next_id += 1;
        let id = ledger.next_id;
        ledger.rows.push(ExpenseRecord {
            id,
            title: expense.title,
            amount: expense.amount,
            category: expense.category,
            date: expense.date,
        });

        Ok(CreatedExpense {
            message: "Expense Added".to_string(),
            id,
        })
    }

    /// Sum of amounts whose category matches `category` case-insensitively.
    pub fn category_total(&self, category: &str) -> f64 {
        self.ledger()
            .rows
            .iter()
            .filter(|row| row.category.eq_ignore_ascii_case(category))
            .map(|row| row.amount)
            .sum()
    }
}

fn validate_new_expense(expense: &NewExpense) -> Result<(), ApiException> {
    for (field, value) in [
        ("title", &expense.title),
        ("category", &expense.category),
        ("date", &expense.date),
    ] {
        if value.trim().is_empty() {
            return Err(ApiException::new(
                ErrorCode::Validation,
                format!("{field} must not be empty"),
            ));
        }
    }

    if !expense.amount.is_finite() {
        return Err(ApiException::new(
            ErrorCode::Validation,
            "amount must be a finite number",
        ));
    }

    Ok(())
}

#[cfg(test)]
#[path = "tests/mod_tests.rs"]
mod tests;
