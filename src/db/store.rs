use super::connection::{establish_connection, establish_in_memory_connection};
use super::error::StoreError;
use super::repository;
use crate::models::expense::{DateBucket, Expense, ExpensePatch, NewExpense, day_key, parse_day_key};
use chrono::{DateTime, Local, Utc};
use rusqlite::Connection;
use std::path::Path;
use tracing::{debug, info};
use uuid::Uuid;

/// Owned handle to the expense database.
///
/// Each mutating call runs in its own transaction and takes `&mut self`, so a
/// handle never has more than one write in flight.
pub struct ExpenseStore {
    conn: Connection,
}

impl ExpenseStore {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        let conn = establish_connection(path)?;
        info!(path = %path.display(), "opened expense store");
        Ok(Self { conn })
    }

    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = establish_in_memory_connection()?;
        Ok(Self { conn })
    }

    /// Appends to today's bucket.
    pub fn add(&mut self, new_expense: NewExpense) -> Result<Expense, StoreError> {
        self.add_at(Local::now(), new_expense)
    }

    /// Appends to the bucket of `now`'s local calendar day.
    pub fn add_at(
        &mut self,
        now: DateTime<Local>,
        new_expense: NewExpense,
    ) -> Result<Expense, StoreError> {
        new_expense.validate()?;

        let key = day_key(now.date_naive());
        let expense = new_expense.into_expense(now.with_timezone(&Utc));

        let tx = self.conn.transaction().map_err(StoreError::Write)?;
        let mut bucket = repository::get_bucket(&tx, &key)?;
        bucket.push(expense.clone());
        repository::put_bucket(&tx, &key, &bucket)?;
        tx.commit().map_err(StoreError::Write)?;

        debug!(id = %expense.id, day = %key, amount = %expense.amount, "added expense");
        Ok(expense)
    }

    pub fn get(&self, id: Uuid) -> Result<Option<Expense>, StoreError> {
        Ok(locate(&self.conn, id)?.map(|(_, mut bucket, pos)| bucket.swap_remove(pos)))
    }

    /// Merges `patch` over the stored record. The record keeps its bucket and position.
    pub fn update(&mut self, id: Uuid, patch: &ExpensePatch) -> Result<Expense, StoreError> {
        let tx = self.conn.transaction().map_err(StoreError::Write)?;
        let (key, mut bucket, pos) = locate(&tx, id)?.ok_or(StoreError::NotFound(id))?;

        let expense = &mut bucket[pos];
        expense.apply(patch);
        expense.validate()?;
        let updated = expense.clone();

        repository::put_bucket(&tx, &key, &bucket)?;
        tx.commit().map_err(StoreError::Write)?;

        debug!(id = %id, day = %key, "updated expense");
        Ok(updated)
    }

    /// Returns false when no record has `id`. A bucket left empty is dropped.
    pub fn remove(&mut self, id: Uuid) -> Result<bool, StoreError> {
        let tx = self.conn.transaction().map_err(StoreError::Write)?;
        let Some((key, mut bucket, pos)) = locate(&tx, id)? else {
            debug!(id = %id, "nothing to remove");
            return Ok(false);
        };

        bucket.remove(pos);
        repository::put_bucket(&tx, &key, &bucket)?;
        tx.commit().map_err(StoreError::Write)?;

        debug!(id = %id, day = %key, remaining = bucket.len(), "removed expense");
        Ok(true)
    }

    /// Full snapshot, most recent day first.
    pub fn list_all(&self) -> Result<Vec<DateBucket>, StoreError> {
        let mut buckets = repository::get_all_buckets(&self.conn)?
            .into_iter()
            .map(|(key, expenses)| {
                let date = parse_day_key(&key)
                    .map_err(|source| StoreError::InvalidKey { key, source })?;
                Ok(DateBucket { date, expenses })
            })
            .collect::<Result<Vec<_>, StoreError>>()?;

        buckets.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(buckets)
    }
}

type Located = (String, Vec<Expense>, usize);

/// Finds the bucket key, bucket contents and position of `id`.
fn locate(conn: &Connection, id: Uuid) -> Result<Option<Located>, StoreError> {
    for (key, bucket) in repository::get_all_buckets(conn)? {
        if let Some(pos) = bucket.iter().position(|e| e.id == id) {
            return Ok(Some((key, bucket, pos)));
        }
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::expense::{Category, ValidationError};
    use chrono::{NaiveDate, TimeZone};
    use rust_decimal::Decimal;
    use std::str::FromStr;
    use tempfile::TempDir;

    fn local_time(year: i32, month: u32, day: u32) -> DateTime<Local> {
        Local.with_ymd_and_hms(year, month, day, 12, 0, 0).unwrap()
    }

    fn coffee() -> NewExpense {
        NewExpense::new("Coffee", Decimal::from_str("4.50").unwrap(), Category::Food)
    }

    fn bus() -> NewExpense {
        NewExpense::new("Bus", Decimal::from_str("2.00").unwrap(), Category::Transport)
    }

    fn all_ids(store: &ExpenseStore) -> Vec<Uuid> {
        store
            .list_all()
            .unwrap()
            .iter()
            .flat_map(|b| b.expenses.iter().map(|e| e.id))
            .collect()
    }

    #[test]
    fn test_list_all_empty() {
        let store = ExpenseStore::open_in_memory().unwrap();
        assert!(store.list_all().unwrap().is_empty());
    }

    #[test]
    fn test_add_then_list_contains_record() {
        let mut store = ExpenseStore::open_in_memory().unwrap();

        let added = store.add_at(local_time(2025, 1, 15), coffee()).unwrap();

        let buckets = store.list_all().unwrap();
        assert_eq!(buckets.len(), 1);
        assert_eq!(buckets[0].date, NaiveDate::from_ymd_opt(2025, 1, 15).unwrap());
        assert_eq!(buckets[0].expenses, vec![added.clone()]);
        assert_eq!(added.name, "Coffee");
        assert_eq!(added.amount, Decimal::from_str("4.50").unwrap());
        assert_eq!(added.category, Category::Food);
    }

    #[test]
    fn test_add_same_day_appends_in_insertion_order() {
        let mut store = ExpenseStore::open_in_memory().unwrap();
        let day = local_time(2025, 1, 15);

        let first = store.add_at(day, coffee()).unwrap();
        let second = store.add_at(day, bus()).unwrap();

        let buckets = store.list_all().unwrap();
        assert_eq!(buckets.len(), 1);
        assert_eq!(buckets[0].key(), "01-15-2025");
        assert_eq!(buckets[0].expenses, vec![first, second]);
    }

    #[test]
    fn test_add_invalid_is_rejected() {
        let mut store = ExpenseStore::open_in_memory().unwrap();

        let result = store.add(NewExpense::new("Coffee", Decimal::ZERO, Category::Food));
        assert!(matches!(
            result,
            Err(StoreError::Invalid(ValidationError::NonPositiveAmount(_)))
        ));
        assert!(store.list_all().unwrap().is_empty());
    }

    #[test]
    fn test_update_amount_keeps_other_fields() {
        let mut store = ExpenseStore::open_in_memory().unwrap();
        let added = store.add(coffee()).unwrap();

        let patch = ExpensePatch {
            amount: Some(Decimal::from_str("5.25").unwrap()),
            ..Default::default()
        };
        let updated = store.update(added.id, &patch).unwrap();

        let stored = store.get(added.id).unwrap().unwrap();
        assert_eq!(stored, updated);
        assert_eq!(stored.amount, Decimal::from_str("5.25").unwrap());
        assert_eq!(stored.name, added.name);
        assert_eq!(stored.category, added.category);
        assert_eq!(stored.created_at, added.created_at);
    }

    #[test]
    fn test_update_keeps_position_in_bucket() {
        let mut store = ExpenseStore::open_in_memory().unwrap();
        let day = local_time(2025, 1, 15);
        let first = store.add_at(day, coffee()).unwrap();
        let second = store.add_at(day, bus()).unwrap();

        let patch = ExpensePatch {
            name: Some("Espresso".to_string()),
            category: Some(Category::Entertainment),
            ..Default::default()
        };
        store.update(first.id, &patch).unwrap();

        let buckets = store.list_all().unwrap();
        assert_eq!(buckets[0].expenses[0].id, first.id);
        assert_eq!(buckets[0].expenses[0].name, "Espresso");
        assert_eq!(buckets[0].expenses[0].category, Category::Entertainment);
        assert_eq!(buckets[0].expenses[1], second);
    }

    #[test]
    fn test_update_not_found() {
        let mut store = ExpenseStore::open_in_memory().unwrap();
        let id = Uuid::new_v4();

        let result = store.update(id, &ExpensePatch::default());
        assert!(matches!(result, Err(StoreError::NotFound(missing)) if missing == id));
    }

    #[test]
    fn test_update_invalid_leaves_record_unchanged() {
        let mut store = ExpenseStore::open_in_memory().unwrap();
        let added = store.add(coffee()).unwrap();

        let patch = ExpensePatch {
            name: Some("  ".to_string()),
            ..Default::default()
        };
        let result = store.update(added.id, &patch);

        assert!(matches!(result, Err(StoreError::Invalid(ValidationError::EmptyName))));
        assert_eq!(store.get(added.id).unwrap().unwrap(), added);
    }

    #[test]
    fn test_remove_then_second_remove_returns_false() {
        let mut store = ExpenseStore::open_in_memory().unwrap();
        let day = local_time(2025, 1, 15);
        let first = store.add_at(day, coffee()).unwrap();
        let second = store.add_at(day, bus()).unwrap();

        assert!(store.remove(first.id).unwrap());
        assert_eq!(all_ids(&store), vec![second.id]);

        assert!(!store.remove(first.id).unwrap());
    }

    #[test]
    fn test_remove_last_expense_drops_bucket() {
        let mut store = ExpenseStore::open_in_memory().unwrap();
        let added = store.add_at(local_time(2025, 1, 15), coffee()).unwrap();
        store.add_at(local_time(2025, 1, 16), bus()).unwrap();

        assert!(store.remove(added.id).unwrap());

        let buckets = store.list_all().unwrap();
        assert_eq!(buckets.len(), 1);
        assert_eq!(buckets[0].date, NaiveDate::from_ymd_opt(2025, 1, 16).unwrap());
    }

    #[test]
    fn test_remove_unknown_id_returns_false() {
        let mut store = ExpenseStore::open_in_memory().unwrap();
        assert!(!store.remove(Uuid::new_v4()).unwrap());
    }

    #[test]
    fn test_list_all_orders_by_date_descending() {
        let mut store = ExpenseStore::open_in_memory().unwrap();
        // MM-DD-YYYY keys sort "12-31-2024" after "01-02-2025" lexically.
        store.add_at(local_time(2024, 12, 31), coffee()).unwrap();
        store.add_at(local_time(2025, 1, 2), coffee()).unwrap();
        store.add_at(local_time(2025, 1, 1), bus()).unwrap();

        let dates: Vec<NaiveDate> = store.list_all().unwrap().iter().map(|b| b.date).collect();
        assert_eq!(
            dates,
            vec![
                NaiveDate::from_ymd_opt(2025, 1, 2).unwrap(),
                NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
                NaiveDate::from_ymd_opt(2024, 12, 31).unwrap(),
            ]
        );
    }

    #[test]
    fn test_list_all_rejects_bad_key() {
        let store = ExpenseStore::open_in_memory().unwrap();
        store
            .conn
            .execute("INSERT INTO expenses (day_key, value) VALUES ('2025-01-15', '[]')", [])
            .unwrap();

        let result = store.list_all();
        assert!(matches!(result, Err(StoreError::InvalidKey { .. })));
    }

    #[test]
    fn test_reopen_from_file_sees_prior_data() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("expenses.db");

        let added = {
            let mut store = ExpenseStore::open(&path).unwrap();
            store.add(coffee()).unwrap()
        };

        let store = ExpenseStore::open(&path).unwrap();
        assert_eq!(store.get(added.id).unwrap(), Some(added));
    }
}
