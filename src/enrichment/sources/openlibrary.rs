//! OpenLibrary books API.

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::enrichment::{EnrichmentRecord, EnrichmentSource};
use crate::error::UpstreamError;

pub const OPENLIBRARY_BASE_URL: &str = "https://openlibrary.org";
const NAME: &str = "openlibrary";

#[derive(Debug, Clone)]
pub struct OpenLibrarySource {
    client: reqwest::Client,
    base_url: String,
}

impl OpenLibrarySource {
    pub fn new(client: reqwest::Client) -> Self {
        Self {
            client,
            base_url: OPENLIBRARY_BASE_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[async_trait]
impl EnrichmentSource for OpenLibrarySource {
    fn name(&self) -> &str {
        NAME
    }

    async fn fetch(&self, isbn: &str) -> Result<EnrichmentRecord, UpstreamError> {
        let bibkey = format!("ISBN:{}", isbn);
        let response = self
            .client
            .get(format!("{}/api/books", self.base_url))
            .query(&[
                ("bibkeys", bibkey.as_str()),
                ("jscmd", "data"),
                ("format", "json"),
            ])
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
        parse_books(&body, isbn)
    }

    fn has_fallback(&self) -> bool {
        true
    }

    async fn fallback(&self, _isbn: &str) -> Result<EnrichmentRecord, UpstreamError> {
        let mut record = EnrichmentRecord::new();
        record.insert("subjects".to_string(), json!(["Literature"]));
        record.insert("source".to_string(), json!("fallback_openlibrary"));
        Ok(record)
    }
}

/// Collects the `name` field of every object in an array.
fn names(value: Option<&Value>) -> Option<Value> {
    let items = value?.as_array()?;
    let names: Vec<Value> = items
        .iter()
        .filter_map(|item| item.get("name").cloned())
        .collect();
    Some(Value::Array(names))
}

/// Extracts catalog fields from an `api/books?jscmd=data` response.
pub fn parse_books(body: &Value, isbn: &str) -> Result<EnrichmentRecord, UpstreamError> {
    let books = body.as_object().ok_or_else(|| UpstreamError::Decode {
        source_name: NAME.to_string(),
        message: "response is not a JSON object".to_string(),
    })?;

    let info = match books.get(&format!("ISBN:{}", isbn)) {
        Some(info) => info,
        None => return Ok(EnrichmentRecord::new()),
    };

    let mut record = EnrichmentRecord::new();
    let fields = [
        ("title", info.get("title").cloned()),
        ("authors", names(info.get("authors"))),
        ("publisher", info.pointer("/publishers/0/name").cloned()),
        ("publish_date", info.get("publish_date").cloned()),
        ("subjects", names(info.get("subjects"))),
        ("summary", info.pointer("/excerpts/0/text").cloned()),
        ("cover_url", info.pointer("/cover/medium").cloned()),
    ];
    for (field, value) in fields {
        if let Some(value) = value {
            record.insert(field.to_string(), value);
        }
    }
    record.insert("source".to_string(), json!(NAME));

    Ok(record)
}
