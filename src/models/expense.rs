use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Storage key format for a day bucket.
pub const DAY_KEY_FORMAT: &str = "%m-%d-%Y";

pub const MAX_NAME_LEN: usize = 255;

/// Largest single amount accepted. Keeps every running total far below `Decimal::MAX`.
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(1_000_000_000, 0, 0, false, 0);

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Food,
    Transport,
    Entertainment,
    Travel,
    Other,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::Food,
        Category::Transport,
        Category::Entertainment,
        Category::Travel,
        Category::Other,
    ];

    pub fn key(self) -> &'static str {
        match self {
            Category::Food => "food",
            Category::Transport => "transport",
            Category::Entertainment => "entertainment",
            Category::Travel => "travel",
            Category::Other => "other",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Category::Food => "Food",
            Category::Transport => "Transport",
            Category::Entertainment => "Entertainment",
            Category::Travel => "Travel",
            Category::Other => "Other",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "food" => Ok(Category::Food),
            "transport" => Ok(Category::Transport),
            "entertainment" => Ok(Category::Entertainment),
            "travel" => Ok(Category::Travel),
            "other" => Ok(Category::Other),
            _ => Err(format!(
                "Invalid category '{}'. Use one of: food, transport, entertainment, travel, other.",
                s.trim()
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Expense name cannot be empty")]
    EmptyName,
    #[error("Expense name is longer than 255 characters")]
    NameTooLong,
    #[error("Amount must be greater than zero, got {0}")]
    NonPositiveAmount(Decimal),
    #[error("Amount {0} is larger than the maximum of 1000000000")]
    AmountTooLarge(Decimal),
}

fn validate_fields(name: &str, amount: Decimal) -> Result<(), ValidationError> {
    if name.trim().is_empty() {
        return Err(ValidationError::EmptyName);
    }
    if name.chars().count() > MAX_NAME_LEN {
        return Err(ValidationError::NameTooLong);
    }
    if amount <= Decimal::ZERO {
        return Err(ValidationError::NonPositiveAmount(amount));
    }
    if amount > MAX_AMOUNT {
        return Err(ValidationError::AmountTooLarge(amount));
    }
    Ok(())
}

/// A stored expense. `id` and `created_at` never change after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Expense {
    pub id: Uuid,
    pub name: String,
    pub amount: Decimal,
    pub category: Category,
    pub created_at: DateTime<Utc>,
}

impl Expense {
    pub fn new(
        id: Uuid,
        name: String,
        amount: Decimal,
        category: Category,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            name,
            amount,
            category,
            created_at,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_fields(&self.name, self.amount)
    }

    /// Overlays the fields present in `patch`, keeping everything else.
    pub fn apply(&mut self, patch: &ExpensePatch) {
        if let Some(name) = &patch.name {
            self.name = name.trim().to_string();
        }
        if let Some(amount) = patch.amount {
            self.amount = amount;
        }
        if let Some(category) = patch.category {
            self.category = category;
        }
    }
}

/// User input for a new expense, before an id is assigned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewExpense {
    pub name: String,
    pub amount: Decimal,
    pub category: Category,
}

impl NewExpense {
    pub fn new(name: impl Into<String>, amount: Decimal, category: Category) -> Self {
        Self {
            name: name.into(),
            amount,
            category,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_fields(&self.name, self.amount)
    }

    pub fn into_expense(self, created_at: DateTime<Utc>) -> Expense {
        Expense::new(
            Uuid::new_v4(),
            self.name.trim().to_string(),
            self.amount,
            self.category,
            created_at,
        )
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExpensePatch {
    pub name: Option<String>,
    pub amount: Option<Decimal>,
    pub category: Option<Category>,
}

impl ExpensePatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.amount.is_none() && self.category.is_none()
    }
}

/// All expenses created on one local calendar day, in insertion order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateBucket {
    pub date: NaiveDate,
    pub expenses: Vec<Expense>,
}

impl DateBucket {
    pub fn key(&self) -> String {
        day_key(self.date)
    }
}

pub fn day_key(date: NaiveDate) -> String {
    date.format(DAY_KEY_FORMAT).to_string()
}

pub fn parse_day_key(key: &str) -> Result<NaiveDate, chrono::ParseError> {
    NaiveDate::parse_from_str(key, DAY_KEY_FORMAT)
}
