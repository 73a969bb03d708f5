//! HTTP client for the Fio banking API.
//!
//! Every call is a single `GET` whose path embeds the API token:
//! `{base_url}/ib_api/rest/{operation}/{token}/{segments...}`. The token is
//! therefore a secret inside every URL, and [`sanitize_url`] is applied
//! before a URL reaches a log line or an error.

use chrono::NaiveDate;

/// Base URL for the Fio API.
pub const DEFAULT_BASE_URL: &str = "https://fioapi.fio.cz";

/// Path prefix shared by every REST operation.
const REST_PATH: &str = "ib_api/rest";

/// Replacement for the token in sanitized URLs.
pub const REDACTED: &str = "REDACTED";

/// Transactions in a date range.
const PERIODS: &str = "periods";

/// Official statement by year and number.
const BY_ID: &str = "by-id";

/// Transactions after the server-side cursor.
const LAST: &str = "last";

/// Moves the cursor to a transaction id.
const SET_LAST_ID: &str = "set-last-id";

/// Moves the cursor to a date.
const SET_LAST_DATE: &str = "set-last-date";

/// Replaces every occurrence of `token` in `url` with [`REDACTED`].
///
/// An empty token leaves the URL unchanged.
///
/// ```
/// use fio_rs::client::sanitize_url;
///
/// assert_eq!(sanitize_url("ds", "/dsads"), "/REDACTEDaREDACTED");
/// assert_eq!(sanitize_url("", "/dsa"), "/dsa");
/// ```
#[inline]
#[must_use]
pub fn sanitize_url(token: &str, url: &str) -> String {
    if token.is_empty() {
        return url.to_owned();
    }
    url.replace(token, REDACTED)
}

/// Formats a caller date as the `YYYY-MM-DD` path segment.
fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Joins base URL, operation, token and trailing segments.
///
/// `base_url` must not end with `/`. An empty trailing segment yields a
/// trailing slash.
fn build_url(base_url: &str, operation: &str, token: &str, segments: &[&str]) -> String {
    let mut url = format!("{base_url}/{REST_PATH}/{operation}/{token}");
    for segment in segments {
        url.push('/');
        url.push_str(segment);
    }
    url
}

mod async_client;

pub use async_client::{FioClient, FioClientBuilder};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_replaces_every_occurrence() {
        let cases = [
            ("", "/dsa", "/dsa"),
            ("xx", "/dsa", "/dsa"),
            ("ds", "/dsa", "/REDACTEDa"),
            ("ds", "/dsads", "/REDACTEDaREDACTED"),
        ];
        for (token, url, expected) in cases {
            assert_eq!(sanitize_url(token, url), expected, "{token:?} in {url:?}");
        }
    }

    #[test]
    fn url_segments_keep_their_order() {
        let from = NaiveDate::from_ymd_opt(2017, 1, 1).unwrap();
        let to = NaiveDate::from_ymd_opt(2017, 5, 1).unwrap();
        let url = build_url(
            DEFAULT_BASE_URL,
            PERIODS,
            "tok",
            &[
                format_date(from).as_str(),
                format_date(to).as_str(),
                "transactions.xml",
            ],
        );
        assert_eq!(
            url,
            "https://fioapi.fio.cz/ib_api/rest/periods/tok/2017-01-01/2017-05-01/transactions.xml"
        );
    }

    #[test]
    fn empty_segment_adds_trailing_slash() {
        let url = build_url("http://localhost", SET_LAST_ID, "tok", &["42", ""]);
        assert_eq!(url, "http://localhost/ib_api/rest/set-last-id/tok/42/");
    }

    #[test]
    fn dates_are_zero_padded() {
        let date = NaiveDate::from_ymd_opt(2017, 4, 1).unwrap();
        assert_eq!(format_date(date), "2017-04-01");
    }
}
