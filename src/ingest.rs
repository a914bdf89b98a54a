use crate::error::Result;
use serde_json::Value as JsonValue;
use tracing::info;

/// Base URL of the RentCast listing API
pub const DEFAULT_BASE_URL: &str = "https://api.rentcast.io/v1";

/// Page size used when the caller does not pick one
pub const DEFAULT_PAGE_LIMIT: u64 = 500;

/// Blocking client for the RentCast listing API.
///
/// Endpoints page through results with `limit`/`offset` query parameters;
/// a page shorter than the requested limit marks the end of the series.
pub struct RentCastClient {
    http: reqwest::blocking::Client,
    base_url: String,
    api_key: String,
}

impl RentCastClient {
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        Self::with_base_url(api_key, DEFAULT_BASE_URL)
    }

    pub fn with_base_url(api_key: impl Into<String>, base_url: impl Into<String>) -> Result<Self> {
        let http = reqwest::blocking::Client::builder().build()?;
        Ok(RentCastClient {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        })
    }

    /// Fetch one page of listing records from an endpoint
    pub fn fetch_page(
        &self,
        endpoint: &str,
        query: &[(String, String)],
        limit: u64,
        offset: u64,
    ) -> Result<Vec<JsonValue>> {
        let url = format!("{}{}", self.base_url, endpoint);
        let response = self
            .http
            .get(&url)
            .header("Accept", "application/json")
            .header("X-Api-Key", &self.api_key)
            .query(query)
            .query(&[("limit", limit.to_string()), ("offset", offset.to_string())])
            .send()?
            .error_for_status()?;
        let body: JsonValue = response.json()?;
        match body {
            JsonValue::Array(records) => Ok(records),
            other => Ok(vec![other]),
        }
    }

    /// Fetch every page of an endpoint, accumulating all records
    pub fn fetch_all(
        &self,
        endpoint: &str,
        query: &[(String, String)],
        limit: u64,
    ) -> Result<Vec<JsonValue>> {
        info!(endpoint, "starting listing fetch");
        let records = paginate(limit, |offset, limit| {
            self.fetch_page(endpoint, query, limit, offset)
        })?;
        info!(endpoint, records = records.len(), "completed listing fetch");
        Ok(records)
    }
}

/// Drive limit/offset pagination until a page arrives shorter than the
/// requested limit. Takes the page fetcher as a closure so the loop is
/// testable without a network.
pub fn paginate<F>(limit: u64, mut fetch_page: F) -> Result<Vec<JsonValue>>
where
    F: FnMut(u64, u64) -> Result<Vec<JsonValue>>,
{
    let limit = limit.max(1);
    let mut records = Vec::new();
    let mut offset = 0;
    loop {
        info!(offset, limit, "fetching page");
        let page = fetch_page(offset, limit)?;
        let page_len = page.len() as u64;
        records.extend(page);
        if page_len < limit {
            break;
        }
        offset += limit;
    }
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RentRadarError;
    use serde_json::json;

    #[test]
    fn test_paginate_stops_on_short_page() {
        let pages = vec![
            vec![json!({"id": 1}), json!({"id": 2})],
            vec![json!({"id": 3}), json!({"id": 4})],
            vec![json!({"id": 5})],
        ];
        let mut offsets = Vec::new();
        let mut pages = pages.into_iter();
        let records = paginate(2, |offset, _limit| {
            offsets.push(offset);
            Ok(pages.next().unwrap_or_default())
        })
        .unwrap();

        assert_eq!(records.len(), 5);
        assert_eq!(offsets, vec![0, 2, 4]);
    }

    #[test]
    fn test_paginate_exact_multiple_needs_one_empty_fetch() {
        let pages = vec![vec![json!({"id": 1}), json!({"id": 2})], Vec::new()];
        let mut fetches = 0;
        let mut pages = pages.into_iter();
        let records = paginate(2, |_offset, _limit| {
            fetches += 1;
            Ok(pages.next().unwrap_or_default())
        })
        .unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(fetches, 2);
    }

    #[test]
    fn test_paginate_propagates_fetch_errors() {
        let result = paginate(2, |_offset, _limit| {
            Err::<Vec<JsonValue>, _>(RentRadarError::InvalidArguments("boom".to_string()))
        });
        assert!(matches!(result, Err(RentRadarError::InvalidArguments(_))));
    }

    #[test]
    fn test_paginate_zero_limit_still_terminates() {
        let records = paginate(0, |_offset, _limit| Ok(Vec::new())).unwrap();
        assert!(records.is_empty());
    }

    #[test]
    fn test_base_url_trailing_slash_is_trimmed() {
        let client = RentCastClient::with_base_url("key", "http://localhost:9/").unwrap();
        assert_eq!(client.base_url, "http://localhost:9");
    }
}
