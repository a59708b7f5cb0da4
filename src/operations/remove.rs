use super::update::parse_id;
use crate::db::ExpenseStore;

/// Returns whether an expense was removed. A missing id is not an error.
pub fn remove_expense_from_db(store: &mut ExpenseStore, input: &str) -> Result<bool, String> {
    let id = parse_id(input)?;
    store.remove(id).map_err(|e| e.to_string())
}
