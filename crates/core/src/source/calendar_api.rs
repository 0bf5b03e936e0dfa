use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

use super::types::{FiscalPeriod, SourceError, TranscriptKey, TranscriptRef, TranscriptSource};
use crate::config::SourceConfig;
use crate::universe::{Company, TickerSymbol};

/// Earnings calendar client. Asks the calendar API for the latest published
/// call per symbol and turns the reply into a validated [`TranscriptRef`].
pub struct CalendarApiSource {
    client: reqwest::Client,
    config: SourceConfig,
}

impl CalendarApiSource {
    pub fn new(config: SourceConfig) -> Result<Self, SourceError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs as u64))
            .build()
            .map_err(|e| SourceError::Request(e.to_string()))?;
        Ok(Self { client, config })
    }

    fn build_latest_url(&self, symbol: &TickerSymbol) -> String {
        let mut url = format!(
            "{}/v1/earnings/latest?symbol={}",
            self.config.api_base.trim_end_matches('/'),
            urlencoding::encode(symbol.as_str())
        );
        if let Some(key) = &self.config.api_key {
            url.push_str("&apikey=");
            url.push_str(&urlencoding::encode(key));
        }
        url
    }

    fn locator_for(&self, transcript_url: Option<&str>, symbol: &TickerSymbol) -> String {
        match transcript_url.map(str::trim) {
            Some(url) if !url.is_empty() => url.to_string(),
            _ => self
                .config
                .events_url_template
                .replace("{symbol}", symbol.as_str()),
        }
    }
}

#[async_trait]
impl TranscriptSource for CalendarApiSource {
    fn name(&self) -> &str {
        "calendar-api"
    }

    async fn fetch_latest(&self, company: &Company) -> Result<Option<TranscriptRef>, SourceError> {
        let url = self.build_latest_url(&company.symbol);
        let response = self.client.get(&url).send().await.map_err(|e| {
            if e.is_timeout() {
                SourceError::Timeout
            } else {
                SourceError::Request(e.to_string())
            }
        })?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(SourceError::Api {
                status: status.as_u16(),
                detail: detail.chars().take(200).collect(),
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| SourceError::Request(e.to_string()))?;
        if body.trim().is_empty() {
            return Ok(None);
        }
        let reply: Option<CalendarReply> =
            serde_json::from_str(&body).map_err(|e| SourceError::Decode(e.to_string()))?;
        let Some(reply) = reply else {
            return Ok(None);
        };

        if let Some(reported) = reply.symbol.as_deref().and_then(TickerSymbol::new) {
            if reported != company.symbol {
                warn!(
                    requested = %company.symbol,
                    reported = %reported,
                    "calendar reply names a different symbol"
                );
            }
        }

        let Some(period) = period_from_reply(&reply) else {
            if reply.has_period_data() {
                warn!(
                    symbol = %company.symbol,
                    "dropping calendar reply with malformed period labels"
                );
            } else {
                debug!(symbol = %company.symbol, "no earnings event reported");
            }
            return Ok(None);
        };

        let locator = self.locator_for(reply.transcript_url.as_deref(), &company.symbol);
        Ok(Some(TranscriptRef {
            key: TranscriptKey::new(company.symbol.clone(), period),
            locator,
        }))
    }
}

/// Latest-earnings reply. Fields the provider omits or nulls are `None`;
/// `year` arrives as a number from some providers and a string from others.
#[derive(Debug, Deserialize)]
struct CalendarReply {
    #[serde(default)]
    symbol: Option<String>,
    #[serde(default)]
    quarter: Option<String>,
    #[serde(default)]
    year: Option<YearLabel>,
    #[serde(default)]
    earnings_date: Option<String>,
    #[serde(default)]
    transcript_url: Option<String>,
}

impl CalendarReply {
    fn has_period_data(&self) -> bool {
        self.quarter.is_some() || self.year.is_some() || self.earnings_date.is_some()
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum YearLabel {
    Text(String),
    Number(i64),
}

impl YearLabel {
    fn as_string(&self) -> String {
        match self {
            YearLabel::Text(s) => s.clone(),
            YearLabel::Number(n) => n.to_string(),
        }
    }
}

/// Resolves the fiscal period from explicit labels, falling back to the
/// earnings date when the labels are missing or blank.
fn period_from_reply(reply: &CalendarReply) -> Option<FiscalPeriod> {
    let quarter = reply.quarter.as_deref().unwrap_or_default();
    let year = reply.year.as_ref().map(YearLabel::as_string).unwrap_or_default();
    if let Some(period) = FiscalPeriod::new(quarter, &year) {
        return Some(period);
    }
    let date = reply.earnings_date.as_deref()?.trim().parse::<NaiveDate>().ok()?;
    Some(FiscalPeriod::from_date(date))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source_with(api_base: &str, api_key: Option<&str>) -> CalendarApiSource {
        let config = SourceConfig {
            api_base: api_base.to_string(),
            api_key: api_key.map(String::from),
            ..SourceConfig::default()
        };
        CalendarApiSource::new(config).unwrap()
    }

    #[test]
    fn test_build_latest_url() {
        let source = source_with("https://calendar.example.com", None);
        let symbol = TickerSymbol::new("AAPL").unwrap();
        assert_eq!(
            source.build_latest_url(&symbol),
            "https://calendar.example.com/v1/earnings/latest?symbol=AAPL"
        );
    }

    #[test]
    fn test_build_latest_url_with_key_and_trailing_slash() {
        let source = source_with("https://calendar.example.com/", Some("k&y"));
        let symbol = TickerSymbol::new("BRK.B").unwrap();
        let url = source.build_latest_url(&symbol);
        assert_eq!(
            url,
            "https://calendar.example.com/v1/earnings/latest?symbol=BRK.B&apikey=k%26y"
        );
    }

    #[test]
    fn test_locator_prefers_transcript_url() {
        let source = source_with("https://calendar.example.com", None);
        let symbol = TickerSymbol::new("AAPL").unwrap();
        assert_eq!(
            source.locator_for(Some("https://example.com/t/aapl-q3"), &symbol),
            "https://example.com/t/aapl-q3"
        );
    }

    #[test]
    fn test_locator_falls_back_to_events_template() {
        let source = source_with("https://calendar.example.com", None);
        let symbol = TickerSymbol::new("AAPL").unwrap();
        assert_eq!(
            source.locator_for(None, &symbol),
            "https://finance.yahoo.com/quote/AAPL/events?p=AAPL"
        );
        assert_eq!(
            source.locator_for(Some("   "), &symbol),
            "https://finance.yahoo.com/quote/AAPL/events?p=AAPL"
        );
    }

    #[test]
    fn test_decode_reply_with_numeric_year() {
        let reply: CalendarReply = serde_json::from_str(
            r#"{"symbol": "AAPL", "quarter": "Q3", "year": 2024, "transcript_url": null}"#,
        )
        .unwrap();
        let period = period_from_reply(&reply).unwrap();
        assert_eq!(period.quarter(), "Q3");
        assert_eq!(period.year(), "2024");
    }

    #[test]
    fn test_decode_reply_with_string_year() {
        let reply: CalendarReply =
            serde_json::from_str(r#"{"quarter": "2", "year": "2025"}"#).unwrap();
        let period = period_from_reply(&reply).unwrap();
        assert_eq!(period.quarter(), "Q2");
        assert_eq!(period.year(), "2025");
    }

    #[test]
    fn test_period_falls_back_to_earnings_date() {
        let reply: CalendarReply = serde_json::from_str(
            r#"{"quarter": "", "year": null, "earnings_date": "2024-08-01"}"#,
        )
        .unwrap();
        let period = period_from_reply(&reply).unwrap();
        assert_eq!(period.quarter(), "Q3");
        assert_eq!(period.year(), "2024");
    }

    #[test]
    fn test_period_none_when_everything_malformed() {
        let reply: CalendarReply = serde_json::from_str(
            r#"{"quarter": " ", "year": "", "earnings_date": "not-a-date"}"#,
        )
        .unwrap();
        assert!(period_from_reply(&reply).is_none());
    }

    #[test]
    fn test_period_none_when_reply_empty() {
        let reply: CalendarReply = serde_json::from_str("{}").unwrap();
        assert!(period_from_reply(&reply).is_none());
        assert!(!reply.has_period_data());
    }
}
