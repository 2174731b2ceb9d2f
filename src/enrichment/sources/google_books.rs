//! Google Books volumes API.

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::enrichment::{EnrichmentRecord, EnrichmentSource};
use crate::error::UpstreamError;

pub const GOOGLE_BOOKS_BASE_URL: &str = "https://www.googleapis.com/books/v1";
const NAME: &str = "google_books";

#[derive(Debug, Clone)]
pub struct GoogleBooksSource {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl GoogleBooksSource {
    pub fn new(client: reqwest::Client, api_key: Option<String>) -> Self {
        Self {
            client,
            base_url: GOOGLE_BOOKS_BASE_URL.to_string(),
            api_key,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[async_trait]
impl EnrichmentSource for GoogleBooksSource {
    fn name(&self) -> &str {
        NAME
    }

    async fn fetch(&self, isbn: &str) -> Result<EnrichmentRecord, UpstreamError> {
        let mut query = vec![
            ("q", format!("isbn:{}", isbn)),
            ("maxResults", "1".to_string()),
        ];
        if let Some(key) = &self.api_key {
            query.push(("key", key.clone()));
        }

        let response = self
            .client
            .get(format!("{}/volumes", self.base_url))
            .query(&query)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(UpstreamError::Status {
                source_name: NAME.to_string(),
                status: status.as_u16(),
            });
        }

        let body: Value = response.json().await?;
        parse_volumes(&body)
    }

    fn has_fallback(&self) -> bool {
        true
    }

    async fn fallback(&self, _isbn: &str) -> Result<EnrichmentRecord, UpstreamError> {
        let mut record = EnrichmentRecord::new();
        record.insert(
            "summary".to_string(),
            json!("Details temporarily unavailable"),
        );
        record.insert("source".to_string(), json!("fallback_google_books"));
        Ok(record)
    }
}

/// Extracts catalog fields from a `volumes` search response.
///
/// No matching volume yields an empty record.
pub fn parse_volumes(body: &Value) -> Result<EnrichmentRecord, UpstreamError> {
    if !body.is_object() {
        return Err(UpstreamError::Decode {
            source_name: NAME.to_string(),
            message: "response is not a JSON object".to_string(),
        });
    }

    let info = match body.pointer("/items/0/volumeInfo") {
        Some(info) => info,
        None => return Ok(EnrichmentRecord::new()),
    };

    let mut record = EnrichmentRecord::new();
    let fields = [
        ("title", info.get("title")),
        ("authors", info.get("authors")),
        ("summary", info.get("description")),
        ("cover_url", info.pointer("/imageLinks/thumbnail")),
        ("page_count", info.get("pageCount")),
        ("categories", info.get("categories")),
        ("publisher", info.get("publisher")),
        ("published_date", info.get("publishedDate")),
        ("language", info.get("language")),
    ];
    for (field, value) in fields {
        if let Some(value) = value {
            record.insert(field.to_string(), value.clone());
        }
    }
    record.insert("source".to_string(), json!(NAME));

    Ok(record)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_volume() {
        let body = json!({
            "totalItems": 1,
            "items": [{
                "volumeInfo": {
                    "title": "Dune",
                    "authors": ["Frank Herbert"],
                    "description": "Desert planet.",
                    "imageLinks": {"thumbnail": "http://img/dune.jpg"},
                    "pageCount": 412,
                    "categories": ["Fiction"],
                    "publishedDate": "1965",
                    "language": "en"
                }
            }]
        });

        let record = parse_volumes(&body).unwrap();
        assert_eq!(record["title"], "Dune");
        assert_eq!(record["authors"], json!(["Frank Herbert"]));
        assert_eq!(record["summary"], "Desert planet.");
        assert_eq!(record["cover_url"], "http://img/dune.jpg");
        assert_eq!(record["page_count"], 412);
        assert_eq!(record["source"], "google_books");
        assert!(!record.contains_key("publisher"));
    }

    #[test]
    fn test_parse_no_items() {
        let record = parse_volumes(&json!({"totalItems": 0})).unwrap();
        assert!(record.is_empty());
    }

    #[test]
    fn test_parse_rejects_non_object() {
        assert!(matches!(
            parse_volumes(&json!([1, 2])),
            Err(UpstreamError::Decode { .. })
        ));
    }

    #[tokio::test]
    async fn test_fallback_marks_source() {
        let source = GoogleBooksSource::new(reqwest::Client::new(), None);
        assert!(source.has_fallback());

        let record = source.fallback("123").await.unwrap();
        assert_eq!(record["source"], "fallback_google_books");
    }
}
