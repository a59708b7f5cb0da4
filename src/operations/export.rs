use crate::models::expense::DateBucket;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Writes one `name,amount,category` row per expense, in snapshot order.
pub fn write_csv<W: Write>(buckets: &[DateBucket], writer: W) -> Result<usize, String> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer
        .write_record(["name", "amount", "category"])
        .map_err(|e| format!("Failed to write CSV header: {}", e))?;

    let mut count = 0;
    for expense in buckets.iter().flat_map(|b| b.expenses.iter()) {
        let amount = expense.amount.to_string();
        csv_writer
            .write_record([expense.name.as_str(), amount.as_str(), expense.category.key()])
            .map_err(|e| format!("Failed to write CSV row: {}", e))?;
        count += 1;
    }

    csv_writer
        .flush()
        .map_err(|e| format!("Failed to flush CSV output: {}", e))?;
    Ok(count)
}

pub fn export_to_path(buckets: &[DateBucket], path: &Path) -> Result<usize, String> {
    let file = File::create(path)
        .map_err(|e| format!("Failed to create file '{}': {}", path.display(), e))?;
    write_csv(buckets, file)
}
