use chrono::{Datelike, NaiveDate};

const MONTHS_EN: [&str; 12] = [
    "January", "February", "March", "April", "May", "June",
    "July", "August", "September", "October", "November", "December",
];

const MONTHS_DE: [&str; 12] = [
    "Januar", "Februar", "März", "April", "Mai", "Juni",
    "Juli", "August", "September", "Oktober", "November", "Dezember",
];

/// Long human date, `January 15, 2025` or `15. Januar 2025`.
///
/// Locales without a dedicated format use the English one.
pub fn format_long_date(date: NaiveDate, locale: &str) -> String {
    let month = date.month0() as usize;
    match locale.split('-').next().unwrap_or(locale) {
        "de" => format!("{}. {} {}", date.day(), MONTHS_DE[month], date.year()),
        _ => format!("{} {}, {}", MONTHS_EN[month], date.day(), date.year()),
    }
}

/// `2025-01-15`, used in `datetime` attributes and the sitemap.
pub fn format_iso_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}
