//! Rule-based replies for the `/chat` endpoint.

use chrono::Utc;
use shared::domain::NewExpense;

use super::ApiContext;

const TRACKED_CATEGORIES: [&str; 5] = ["food", "coffee", "taxi", "transport", "shopping"];

pub const GREETING: &str = "Hi 👋 I can help you track your expenses.";
pub const ADD_USAGE: &str = "❌ Use format: Add <amount> for <category>";
pub const FALLBACK: &str = "🤖 I didn't understand. Try: 'How much did I spend on Food?'";

fn words(message: &str) -> impl Iterator<Item = &str> {
    message
        .split(|c: char| !c.is_alphanumeric() && c != '.')
        .filter(|word| !word.is_empty())
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

pub fn reply(ctx: &ApiContext, message: &str) -> String {
    let message = message.to_lowercase();

    if words(&message).any(|word| word == "hello" || word == "hi") {
        return GREETING.to_string();
    }

    if message.contains("how much") || message.contains("spent") || message.contains("total") {
        if let Some(category) = TRACKED_CATEGORIES
            .iter()
            .find(|category| message.contains(*category))
        {
            let total = ctx.category_total(category);
            return format!(
                "You have spent a total of ₹{total} on {}.",
                capitalize(category)
            );
        }
    }

    if words(&message).any(|word| word == "add") {
        return add_from_message(ctx, &message);
    }

    FALLBACK.to_string()
}

/// Handles `add <amount> for <category>`.
fn add_from_message(ctx: &ApiContext, message: &str) -> String {
    let tokens: Vec<&str> = message.split_whitespace().collect();
    let amount = tokens.get(1).and_then(|raw| raw.parse::<f64>().ok());
    let category = tokens
        .last()
        .map(|raw| raw.trim_matches(|c: char| !c.is_alphanumeric()))
        .filter(|raw| !raw.is_empty() && tokens.len() > 2)
        .map(capitalize);

    let (Some(amount), Some(category)) = (amount, category) else {
        return ADD_USAGE.to_string();
    };

    let created = ctx.create_expense(NewExpense {
        title: category.clone(),
        amount,
        category: category.clone(),
        date: Utc::now().date_naive().format("%Y-%m-%d").to_string(),
    });

    match created {
        Ok(_) => format!("✅ Added ₹{amount} to {category}."),
        Err(_) => ADD_USAGE.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded() -> ApiContext {
        let ctx = ApiContext::new();
        for (category, amount) in [("Food", 120.0), ("food", 30.5), ("Taxi", 200.0)] {
            ctx.create_expense(NewExpense {
                title: category.to_string(),
                amount,
                category: category.to_string(),
                date: "2024-01-01".to_string(),
            })
            .expect("seed");
        }
        ctx
    }

    #[test]
    fn greets_on_hello_or_hi() {
        let ctx = ApiContext::new();
        assert_eq!(reply(&ctx, "Hello there"), GREETING);
        assert_eq!(reply(&ctx, "hi!"), GREETING);
        assert_ne!(reply(&ctx, "this is shipping"), GREETING);
    }

    #[test]
    fn reports_category_totals_case_insensitively() {
        let ctx = seeded();
        assert_eq!(
            reply(&ctx, "How much did I spend on Food?"),
            "You have spent a total of ₹150.5 on Food."
        );
        assert_eq!(
            reply(&ctx, "total shopping"),
            "You have spent a total of ₹0 on Shopping."
        );
    }

    #[test]
    fn add_command_records_an_expense() {
        let ctx = ApiContext::new();
        assert_eq!(reply(&ctx, "add 200 for taxi"), "✅ Added ₹200 to Taxi.");

        let rows = ctx.list_expenses();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].category, "Taxi");
        assert_eq!(rows[0].amount, 200.0);
    }

    #[test]
    fn malformed_add_explains_usage() {
        let ctx = ApiContext::new();
        assert_eq!(reply(&ctx, "add lots for coffee"), ADD_USAGE);
        assert_eq!(reply(&ctx, "add 5"), ADD_USAGE);
        assert!(ctx.list_expenses().is_empty());
    }

    #[test]
    fn unknown_messages_get_the_fallback() {
        assert_eq!(reply(&ApiContext::new(), "what's the weather"), FALLBACK);
    }
}
