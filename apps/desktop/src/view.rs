//! Plain-text rendering of controller state.

use client_core::{ledger::EMPTY_LIST_PLACEHOLDER, ChatState, LedgerState, ListView};
use shared::domain::{ChatRole, Expense};

pub fn format_amount(amount: f64) -> String {
    let cents = (amount * 100.0).round() as i64;
    let sign = if cents < 0 { "-" } else { "" };
    let cents = cents.unsigned_abs();
    let whole = (cents / 100).to_string();

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    format!("{sign}${grouped}.{:02}", cents % 100)
}

fn amount_cell(expense: &Expense) -> String {
    format_amount(expense.amount_or_zero())
}

pub fn render_ledger(state: &LedgerState) -> String {
    let mut out = String::new();
    if let Some(error) = state.error() {
        out.push_str(&format!("! {error}\n"));
    }

    match state.list_view() {
        ListView::Loading => out.push_str("Loading expenses…\n"),
        ListView::Empty => out.push_str(&format!("{EMPTY_LIST_PLACEHOLDER}\n")),
        ListView::Rows(rows) => {
            out.push_str(&format!(
                "{:<8} {:<24} {:>12} {:<16} {}\n",
                "key", "title", "amount", "category", "date"
            ));
            for row in rows {
                let expense = &row.expense;
                out.push_str(&format!(
                    "{:<8} {:<24} {:>12} {:<16} {}\n",
                    row.label(),
                    expense.title,
                    amount_cell(expense),
                    expense.category,
                    expense.display_date()
                ));
            }
        }
    }

    out.push_str(&format!("Total: {}\n", format_amount(state.total())));
    out
}

pub fn render_draft(state: &LedgerState) -> String {
    let draft = state.draft();
    let status = if state.is_submitting() {
        "submitting…"
    } else {
        "ready"
    };
    format!(
        "title={:?} amount={:?} category={:?} date={:?} [{status}]",
        draft.title, draft.amount, draft.category, draft.date
    )
}

pub fn render_turn(role: ChatRole, text: &str, failed: bool) -> String {
    let speaker = match role {
        ChatRole::User => "you",
        ChatRole::Assistant if failed => "assistant (error)",
        ChatRole::Assistant => "assistant",
    };
    format!("{speaker}> {text}")
}

pub fn render_transcript(state: &ChatState) -> String {
    if state.transcript().is_empty() {
        return "Ask me about your expenses\n".to_string();
    }

    let mut out = String::new();
    for turn in state.transcript() {
        out.push_str(&render_turn(turn.role, &turn.text, turn.failed));
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use client_core::{ledger, LedgerEvent};
    use shared::domain::ExpenseId;

    #[test]
    fn formats_amounts_with_grouping_and_cents() {
        assert_eq!(format_amount(0.0), "$0.00");
        assert_eq!(format_amount(12.5), "$12.50");
        assert_eq!(format_amount(1234567.891), "$1,234,567.89");
        assert_eq!(format_amount(-40.0), "-$40.00");
    }

    #[test]
    fn empty_ledger_shows_placeholder_and_zero_total() {
        let (state, _) = ledger::reduce(LedgerState::default(), LedgerEvent::Initialize);
        let (state, _) = ledger::reduce(state, LedgerEvent::ExpensesLoaded(Vec::new()));

        let rendered = render_ledger(&state);
        assert!(rendered.contains("No expenses found."));
        assert!(rendered.contains("Total: $0.00"));
    }

    #[test]
    fn rows_show_store_keys_and_dates() {
        let (state, _) = ledger::reduce(LedgerState::default(), LedgerEvent::Initialize);
        let (state, _) = ledger::reduce(
            state,
            LedgerEvent::ExpensesLoaded(vec![Expense {
                id: Some(ExpenseId::new("3")),
                title: "Coffee".into(),
                amount: Some(4.0),
                category: "Food".into(),
                date: "2024-01-01".into(),
            }]),
        );

        let rendered = render_ledger(&state);
        assert!(rendered.contains("#3"));
        assert!(rendered.contains("Jan 1, 2024"));
        assert!(rendered.contains("Total: $4.00"));
    }

    #[test]
    fn failed_turns_are_labelled() {
        assert_eq!(
            render_turn(ChatRole::Assistant, "unreachable", true),
            "assistant (error)> unreachable"
        );
        assert_eq!(render_turn(ChatRole::User, "hi", false), "you> hi");
    }
}
