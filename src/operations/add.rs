use crate::db::ExpenseStore;
use crate::models::expense::{Category, Expense, NewExpense};
use rust_decimal::Decimal;

/// Parses `name, amount, category` and stores the expense under today's date.
pub fn add_expense_to_db(store: &mut ExpenseStore, input: &str) -> Result<Expense, String> {
    let new_expense = create_expense(input)?;
    store.add(new_expense).map_err(|e| e.to_string())
}

pub fn create_expense(input: &str) -> Result<NewExpense, String> {
    let detail_parts: Vec<&str> = input.split(',').map(|s| s.trim()).collect();
    if detail_parts.len() != 3 {
        return Err(format!(
            "Invalid number of details provided. Expected 3 details separated by commas but got {}",
            detail_parts.len()
        ));
    }

    build_expense(detail_parts[0], detail_parts[1], detail_parts[2])
}

pub fn build_expense(name: &str, amount: &str, category: &str) -> Result<NewExpense, String> {
    let amount = parse_amount(amount)?;
    let category = category.parse::<Category>()?;
    let new_expense = NewExpense::new(name.trim(), amount, category);
    new_expense.validate().map_err(|e| e.to_string())?;
    Ok(new_expense)
}

/// Parses a decimal amount. Range checks belong to `ValidationError`.
pub fn parse_amount(input: &str) -> Result<Decimal, String> {
    input.trim().parse::<Decimal>().map_err(|_| {
        format!(
            "Invalid amount format {}. Please provide a valid decimal number.",
            input.trim()
        )
    })
}
