//! Page/limit normalization and date-range query bounds shared by the
//! list endpoints.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};

use crate::errors::AppError;

pub const DEFAULT_PAGE: u64 = 1;
pub const DEFAULT_LIMIT: u64 = 10;
pub const MAX_LIMIT: u64 = 100;

/// A resolved `page`/`limit` pair (1-based page, limit in `1..=MAX_LIMIT`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub page: u64,
    pub limit: u64,
}

impl Page {
    /// Missing or zero values fall back to the defaults; `limit` is capped.
    pub fn new(page: Option<u64>, limit: Option<u64>) -> Self {
        let page = page.filter(|p| *p > 0).unwrap_or(DEFAULT_PAGE);
        let limit = limit
            .filter(|l| *l > 0)
            .unwrap_or(DEFAULT_LIMIT)
            .min(MAX_LIMIT);
        Self { page, limit }
    }

    pub fn skip(&self) -> u64 {
        (self.page - 1).saturating_mul(self.limit)
    }
}

impl Default for Page {
    fn default() -> Self {
        Self::new(None, None)
    }
}

/// Which end of a day a bare `YYYY-MM-DD` bound should snap to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bound {
    Start,
    End,
}

/// Parses an RFC 3339 timestamp or a `YYYY-MM-DD` date.
///
/// A bare date used as an [`Bound::End`] bound covers the whole day.
pub fn parse_date_bound(raw: &str, bound: Bound) -> Result<DateTime<Utc>, AppError> {
    let raw = raw.trim();

    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Ok(ts.with_timezone(&Utc));
    }

    let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| {
        AppError::BadRequest(format!(
            "Invalid date '{}': expected RFC 3339 or YYYY-MM-DD",
            raw
        ))
    })?;

    let time = match bound {
        Bound::Start => NaiveTime::MIN,
        Bound::End => NaiveTime::from_hms_milli_opt(23, 59, 59, 999).unwrap_or(NaiveTime::MIN),
    };

    Ok(date.and_time(time).and_utc())
}

/// Parses optional `from`/`to` query values into an inclusive range.
pub fn parse_date_range(
    from: Option<&str>,
    to: Option<&str>,
) -> Result<(Option<DateTime<Utc>>, Option<DateTime<Utc>>), AppError> {
    let from = from
        .filter(|s| !s.trim().is_empty())
        .map(|s| parse_date_bound(s, Bound::Start))
        .transpose()?;
    let to = to
        .filter(|s| !s.trim().is_empty())
        .map(|s| parse_date_bound(s, Bound::End))
        .transpose()?;

    if let (Some(start), Some(end)) = (from, to) {
        if start > end {
            return Err(AppError::BadRequest(
                "'from' must not be after 'to'".to_string(),
            ));
        }
    }

    Ok((from, to))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    #[test]
    fn test_page_defaults_and_cap() {
        assert_eq!(Page::default(), Page { page: 1, limit: 10 });
        assert_eq!(Page::new(Some(0), Some(0)), Page { page: 1, limit: 10 });
        assert_eq!(Page::new(Some(3), Some(500)).limit, MAX_LIMIT);
        assert_eq!(Page::new(Some(3), Some(20)).skip(), 40);
    }

    #[test]
    fn test_parse_date_bound_accepts_plain_dates() {
        let start = parse_date_bound("2024-05-01", Bound::Start).unwrap();
        assert_eq!((start.year(), start.month(), start.day()), (2024, 5, 1));
        assert_eq!(start.hour(), 0);

        let end = parse_date_bound("2024-05-01", Bound::End).unwrap();
        assert_eq!(end.hour(), 23);
        assert_eq!(end.minute(), 59);
    }

    #[test]
    fn test_parse_date_bound_accepts_rfc3339() {
        let ts = parse_date_bound("2024-05-01T10:30:00+02:00", Bound::End).unwrap();
        assert_eq!(ts.hour(), 8);
    }

    #[test]
    fn test_parse_date_range_rejects_garbage_and_inverted() {
        assert!(parse_date_range(Some("yesterday"), None).is_err());
        assert!(parse_date_range(Some("2024-05-02"), Some("2024-05-01")).is_err());
        assert_eq!(parse_date_range(Some(""), None).unwrap(), (None, None));
    }
}
