use super::aggregate::Summary;
use crate::models::expense::{Category, DateBucket};
use rust_decimal::Decimal;
use std::fmt::Write;

/// One block per day with its subtotal, most recent day first.
pub fn render_listing(buckets: &[DateBucket]) -> String {
    if buckets.is_empty() {
        return "No expenses recorded yet.\n".to_string();
    }

    let mut out = String::new();
    for bucket in buckets {
        let subtotal: Decimal = bucket.expenses.iter().map(|e| e.amount).sum();
        let _ = writeln!(out, "{}  (total {:.2})", bucket.key(), subtotal);
        for expense in &bucket.expenses {
            let _ = writeln!(
                out,
                "  {}  {:<24} {:>10.2}  {}",
                expense.id,
                expense.name,
                expense.amount,
                expense.category.label()
            );
        }
    }
    out
}

pub fn render_summary(summary: &Summary) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Total: {:.2}", summary.total_amount);
    for category in Category::ALL {
        let _ = writeln!(
            out,
            "  {:<14} {:>10.2}  {:>6.2}%",
            category.label(),
            summary.category_total(category),
            summary.category_percentage(category)
        );
    }
    out
}
