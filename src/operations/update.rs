use super::add::parse_amount;
use crate::db::ExpenseStore;
use crate::models::expense::{Category, Expense, ExpensePatch};
use uuid::Uuid;

/// Parses `id, name, amount, category`; blank fields keep their stored value.
pub fn update_expense_in_db(store: &mut ExpenseStore, input: &str) -> Result<Expense, String> {
    let (id, patch) = parse_update(input)?;
    store.update(id, &patch).map_err(|e| e.to_string())
}

pub fn parse_update(input: &str) -> Result<(Uuid, ExpensePatch), String> {
    let parts: Vec<&str> = input.split(',').map(|s| s.trim()).collect();
    if parts.len() != 4 {
        return Err(format!(
            "Invalid number of details provided. Expected 4 details separated by commas but got {}",
            parts.len()
        ));
    }

    let id = parse_id(parts[0])?;
    let patch = build_patch(non_blank(parts[1]), non_blank(parts[2]), non_blank(parts[3]))?;
    Ok((id, patch))
}

pub fn build_patch(
    name: Option<&str>,
    amount: Option<&str>,
    category: Option<&str>,
) -> Result<ExpensePatch, String> {
    let patch = ExpensePatch {
        name: name.map(|n| n.trim().to_string()),
        amount: amount.map(parse_amount).transpose()?,
        category: category.map(|c| c.parse::<Category>()).transpose()?,
    };
    if patch.is_empty() {
        return Err("Nothing to update. Provide a name, amount or category.".to_string());
    }
    Ok(patch)
}

pub fn parse_id(input: &str) -> Result<Uuid, String> {
    let input = input.trim();
    if input.is_empty() {
        return Err("Expense ID cannot be empty.".to_string());
    }
    Uuid::parse_str(input)
        .map_err(|_| "Invalid expense ID format. Please provide a valid UUID.".to_string())
}

fn non_blank(s: &str) -> Option<&str> {
    if s.is_empty() { None } else { Some(s) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::expense::NewExpense;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    #[test]
    fn test_parse_update_blank_fields_are_preserved() {
        let id = Uuid::new_v4();
        let (parsed_id, patch) = parse_update(&format!("{}, , 5.00, ", id)).unwrap();

        assert_eq!(parsed_id, id);
        assert_eq!(patch.name, None);
        assert_eq!(patch.amount, Some(Decimal::from_str("5.00").unwrap()));
        assert_eq!(patch.category, None);
    }

    #[test]
    fn test_parse_update_requires_a_field() {
        let result = parse_update(&format!("{}, , , ", Uuid::new_v4()));
        assert!(result.unwrap_err().contains("Nothing to update"));
    }

    #[test]
    fn test_parse_update_invalid_id() {
        let result = parse_update("abc, Tea, 1, food");
        assert!(result.unwrap_err().contains("valid UUID"));
    }

    #[test]
    fn test_update_expense_in_db_success() {
        let mut store = ExpenseStore::open_in_memory().unwrap();
        let added = store
            .add(NewExpense::new("Coffee", Decimal::from_str("4.50").unwrap(), Category::Food))
            .unwrap();

        let updated =
            update_expense_in_db(&mut store, &format!("{}, Latte, , ", added.id)).unwrap();

        assert_eq!(updated.id, added.id);
        assert_eq!(updated.name, "Latte");
        assert_eq!(updated.amount, added.amount);
        assert_eq!(updated.category, Category::Food);
    }

    #[test]
    fn test_update_expense_in_db_rejects_amount_over_limit() {
        let mut store = ExpenseStore::open_in_memory().unwrap();
        let added = store
            .add(NewExpense::new("Coffee", Decimal::from_str("4.50").unwrap(), Category::Food))
            .unwrap();

        let input = format!("{}, , 50000000000000000000000000000, ", added.id);
        let result = update_expense_in_db(&mut store, &input);

        assert!(result.unwrap_err().contains("larger than the maximum"));
        assert_eq!(store.get(added.id).unwrap().unwrap(), added);
    }

    #[test]
    fn test_update_expense_in_db_not_found() {
        let mut store = ExpenseStore::open_in_memory().unwrap();
        let id = Uuid::new_v4();

        let result = update_expense_in_db(&mut store, &format!("{}, , 3, ", id));
        assert_eq!(result.unwrap_err(), format!("Expense with ID {} not found", id));
    }
}
