use crate::models::expense::{Category, DateBucket};
use chrono::NaiveDate;
use rust_decimal::{Decimal, RoundingStrategy};
use std::collections::BTreeMap;

/// Totals derived from one snapshot of the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Summary {
    pub total_amount: Decimal,
    pub per_category_total: BTreeMap<Category, Decimal>,
    pub per_category_percentage: BTreeMap<Category, Decimal>,
    pub per_date_total: BTreeMap<NaiveDate, Decimal>,
}

impl Summary {
    pub fn category_total(&self, category: Category) -> Decimal {
        self.per_category_total.get(&category).copied().unwrap_or(Decimal::ZERO)
    }

    pub fn category_percentage(&self, category: Category) -> Decimal {
        self.per_category_percentage
            .get(&category)
            .copied()
            .unwrap_or(Decimal::ZERO)
    }
}

pub fn aggregate(buckets: &[DateBucket]) -> Summary {
    let mut per_category_total: BTreeMap<Category, Decimal> =
        Category::ALL.iter().map(|c| (*c, Decimal::ZERO)).collect();
    let mut per_date_total: BTreeMap<NaiveDate, Decimal> = BTreeMap::new();
    let mut total_amount = Decimal::ZERO;

    for bucket in buckets {
        let day_total = per_date_total.entry(bucket.date).or_insert(Decimal::ZERO);
        for expense in &bucket.expenses {
            total_amount += expense.amount;
            *day_total += expense.amount;
            *per_category_total.entry(expense.category).or_insert(Decimal::ZERO) += expense.amount;
        }
    }

    let per_category_percentage = per_category_total
        .iter()
        .map(|(category, amount)| (*category, percentage_of(*amount, total_amount)))
        .collect();

    Summary {
        total_amount,
        per_category_total,
        per_category_percentage,
        per_date_total,
    }
}

/// `part / total * 100` to two decimal places, zero when `total` is zero.
pub fn percentage_of(part: Decimal, total: Decimal) -> Decimal {
    if total.is_zero() {
        return Decimal::ZERO;
    }
    (part / total * Decimal::ONE_HUNDRED)
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}
