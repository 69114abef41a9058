use chrono::NaiveDate;

/// Generate a batch code: `{PREFIX}{NNN}-{YYYY}-{MM}-{DD}`.
///
/// - prefix: first three characters of the medication name, upper-cased
/// - ordinal: 1-based per-medication receipt counter, zero-padded to 3 digits
/// - date: receipt date
///
/// The ordinal must come from a monotonic counter kept independently of the
/// batch collection, so codes never repeat after a batch is retired.
pub fn batch_number(medication_name: &str, ordinal: u32, received: NaiveDate) -> String {
    let prefix: String = medication_name
        .chars()
        .take(3)
        .collect::<String>()
        .to_uppercase();
    format!("{prefix}{ordinal:03}-{}", received.format("%Y-%m-%d"))
}
