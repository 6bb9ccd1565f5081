use crate::config::{parse_month_day, CandidateEntry, SearchConfig};
use crate::ConfigError;
use chrono::NaiveDate;
use url::Url;

/// Builds the advanced-search URL for one candidate row
///
/// Each name variant is quoted and the variants are joined with spaces
/// (`+` once encoded). A single name searches with an empty operator, more
/// than one with `OR`. The date window is the configured `MM-DD` range in the
/// candidate's year.
///
/// # Example
///
/// ```
/// use loc_harvest::config::{CandidateEntry, SearchConfig};
/// use loc_harvest::query::build_search_url;
///
/// let candidate = CandidateEntry {
///     year: 1860,
///     names: vec!["Abraham Lincoln".to_string()],
/// };
/// let url = build_search_url(&candidate, &SearchConfig::default()).unwrap();
/// assert!(url.as_str().contains("start_date=1860-07-01"));
/// ```
pub fn build_search_url(
    candidate: &CandidateEntry,
    search: &SearchConfig,
) -> Result<Url, ConfigError> {
    let start = window_date(candidate.year, &search.window_start)?;
    let end = window_date(candidate.year, &search.window_end)?;

    let terms = candidate
        .names
        .iter()
        .map(|name| format!("\"{}\"", name.trim()))
        .collect::<Vec<_>>()
        .join(" ");
    let ops = if candidate.names.len() == 1 {
        "\"\""
    } else {
        "OR"
    };

    let mut url = Url::parse(&search.base_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid base_url: {}", e)))?;
    url.query_pairs_mut()
        .append_pair("dl", "page")
        .append_pair("start_date", &start.format("%Y-%m-%d").to_string())
        .append_pair("end_date", &end.format("%Y-%m-%d").to_string())
        .append_pair("qs", &terms)
        .append_pair("ops", ops)
        .append_pair("searchType", "advanced")
        .append_pair("fo", "json");

    Ok(url)
}

fn window_date(year: i32, month_day: &str) -> Result<NaiveDate, ConfigError> {
    let (month, day) = parse_month_day(month_day)?;
    NaiveDate::from_ymd_opt(year, month, day).ok_or_else(|| {
        ConfigError::InvalidDate(format!("{}-{} does not exist", year, month_day))
    })
}
