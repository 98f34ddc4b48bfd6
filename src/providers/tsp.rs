//! TSP daily share prices.
//!
//! The monthly page lists one `<h3>` date heading per trading day, most recent
//! first, each followed by a table of bold fund labels and dollar prices:
//!
//! ```text
//! <h3>Thursday, January 29, 2026</h3>
//! <table class="prices">
//!   <tr><td><b>C Fund</b>&nbsp;</td><td>$99.12</td></tr>
//!   ...
//! </table>
//! ```
//!
//! Only the first heading immediately followed by a table is read. Tag
//! matching is ASCII case-insensitive and tolerant of whitespace between tags.

use crate::core::{Fetcher, FundPriceSet, TspPageError, TspParseError};
use chrono::{DateTime, Datelike, NaiveDate, Utc, Weekday};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, instrument, warn};

const HEADING_FORMAT: &str = "%A, %B %d, %Y";
const HEADING_DATE_FORMAT: &str = "%B %d, %Y";

/// A calendar month to request the share price page for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthYear {
    pub month: u32,
    pub year: i32,
}

impl MonthYear {
    pub fn of(date: DateTime<Utc>) -> Self {
        MonthYear {
            month: date.month(),
            year: date.year(),
        }
    }

    pub fn previous(&self) -> Self {
        if self.month == 1 {
            MonthYear {
                month: 12,
                year: self.year - 1,
            }
        } else {
            MonthYear {
                month: self.month - 1,
                year: self.year,
            }
        }
    }
}

/// Current month first, then the month before it.
pub fn month_candidates(reference: DateTime<Utc>) -> [MonthYear; 2] {
    let current = MonthYear::of(reference);
    [current, current.previous()]
}

#[derive(Debug, Clone, PartialEq)]
pub struct TspQuote {
    pub trade_date: NaiveDate,
    pub funds: FundPriceSet,
}

pub struct TspProvider {
    base_url: String,
    fetcher: Arc<dyn Fetcher>,
}

impl TspProvider {
    pub fn new(base_url: &str, fetcher: Arc<dyn Fetcher>) -> Self {
        TspProvider {
            base_url: base_url.trim_end_matches('/').to_string(),
            fetcher,
        }
    }

    /// Page URL without the month query, as recorded in the payload.
    pub fn source_url(&self) -> String {
        format!("{}/daily-share-prices/", self.base_url)
    }

    pub fn page_url(&self, period: MonthYear) -> String {
        format!(
            "{}?tsp_month={}&tsp_year={}",
            self.source_url(),
            period.month,
            period.year
        )
    }

    /// Most recent quote, trying the reference month and then the month before.
    pub async fn parse_latest(&self, reference: DateTime<Utc>) -> Result<TspQuote, TspParseError> {
        self.first_quote(&month_candidates(reference)).await
    }

    /// Most recent quote in exactly one month, without fallback.
    pub async fn parse_month(&self, period: MonthYear) -> Result<TspQuote, TspParseError> {
        self.first_quote(&[period]).await
    }

    async fn first_quote(&self, candidates: &[MonthYear]) -> Result<TspQuote, TspParseError> {
        let mut last_failure = None;
        for &period in candidates {
            match self.fetch_month(period).await {
                Ok(quote) => return Ok(quote),
                Err(e) => {
                    warn!(
                        month = period.month,
                        year = period.year,
                        error = %e,
                        "TSP page attempt failed"
                    );
                    last_failure = Some((period, e));
                }
            }
        }

        // Candidate lists are never empty; an empty one reports a missing table.
        let (period, source) =
            last_failure.unwrap_or((MonthYear { month: 0, year: 0 }, TspPageError::MissingTable));
        Err(TspParseError {
            month: period.month,
            year: period.year,
            source,
        })
    }

    #[instrument(name = "TspMonthFetch", skip(self), fields(month = period.month, year = period.year))]
    async fn fetch_month(&self, period: MonthYear) -> Result<TspQuote, TspPageError> {
        let url = self.page_url(period);
        debug!("Requesting share prices from {}", url);
        let html = self.fetcher.fetch(&url).await?;
        let quote = parse_page(&html)?;
        debug!(
            trade_date = %quote.trade_date,
            found = quote.funds.found(),
            "Parsed share price table"
        );
        Ok(quote)
    }
}

/// Extracts the first dated table from a share price page.
pub fn parse_page(html: &str) -> Result<TspQuote, TspPageError> {
    let (heading, table) = first_dated_table(html).ok_or(TspPageError::MissingTable)?;

    let trade_date =
        parse_heading(heading).map_err(|source| TspPageError::InvalidHeading {
            heading: heading.to_string(),
            source,
        })?;

    let prices = fund_prices(table);
    let funds = FundPriceSet::from_fn(|code| prices.get(code.label()).copied());

    Ok(TspQuote { trade_date, funds })
}

/// Parses `Thursday, January 29, 2026`. The weekday must be a weekday name
/// but is not checked against the date.
fn parse_heading(heading: &str) -> Result<NaiveDate, chrono::ParseError> {
    match heading.split_once(',') {
        Some((weekday, date)) if weekday.trim().parse::<Weekday>().is_ok() => {
            NaiveDate::parse_from_str(date.trim(), HEADING_DATE_FORMAT)
        }
        _ => NaiveDate::parse_from_str(heading, HEADING_FORMAT),
    }
}

/// Finds the first `<h3>heading</h3>` directly followed by a `<table>` and
/// returns the trimmed heading text and the table's inner markup.
fn first_dated_table(html: &str) -> Option<(&str, &str)> {
    let lower = html.to_ascii_lowercase();
    let mut from = 0;

    while let Some(found) = lower[from..].find("<h3>") {
        let text_start = from + found + "<h3>".len();
        from = text_start;

        let Some(text_len) = lower[text_start..].find('<') else {
            break;
        };
        let text_end = text_start + text_len;
        if text_len == 0 || !lower[text_end..].starts_with("</h3>") {
            continue;
        }

        let Some(table_open) = expect_tag(&lower, text_end + "</h3>".len(), "<table") else {
            continue;
        };
        let Some(attrs_len) = lower[table_open..].find('>') else {
            continue;
        };
        let body_start = table_open + attrs_len + 1;
        let Some(body_len) = lower[body_start..].find("</table>") else {
            continue;
        };

        let heading = html[text_start..text_end].trim();
        return Some((heading, &html[body_start..body_start + body_len]));
    }

    None
}

/// Collects `<b>label</b> &nbsp; </td> <td> $price` pairs, keyed by the
/// trimmed label. A repeated label keeps its last price.
fn fund_prices(table: &str) -> HashMap<&str, f64> {
    let lower = table.to_ascii_lowercase();
    let mut prices = HashMap::new();
    let mut from = 0;

    while let Some(found) = lower[from..].find("<b>") {
        let label_start = from + found + "<b>".len();
        from = label_start;

        let Some(label_len) = lower[label_start..].find('<') else {
            break;
        };
        let label_end = label_start + label_len;
        if label_len == 0 || !lower[label_end..].starts_with("</b>") {
            continue;
        }

        let Some(price_start) = ["&nbsp;", "</td>", "<td>", "$"]
            .into_iter()
            .try_fold(label_end + "</b>".len(), |pos, token| {
                expect_tag(&lower, pos, token)
            })
        else {
            continue;
        };

        let digits_len = lower[price_start..]
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .unwrap_or(lower.len() - price_start);
        if digits_len == 0 {
            continue;
        }

        let label = table[label_start..label_end].trim();
        let digits = &table[price_start..price_start + digits_len];
        match digits.parse::<f64>() {
            Ok(price) => {
                prices.insert(label, price);
            }
            Err(e) => warn!(label, digits, error = %e, "Skipping unparseable fund price"),
        }
        from = price_start + digits_len;
    }

    prices
}

/// Skips whitespace from `pos` and returns the offset just past `token` if
/// it comes next.
fn expect_tag(lower: &str, pos: usize, token: &str) -> Option<usize> {
    let rest = &lower[pos..];
    let trimmed = rest.trim_start();
    trimmed
        .starts_with(token)
        .then(|| pos + (rest.len() - trimmed.len()) + token.len())
}
