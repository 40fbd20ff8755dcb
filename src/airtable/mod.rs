//! Stateless facade over the Airtable REST API.
//!
//! Translates the two logical operations of the service — search by name
//! and save a rating — into Airtable calls. No local persistence or
//! caching; Airtable is the sole source of truth and concurrency arbiter.

pub mod changelog;
pub mod formula;

use chrono::Local;
use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::Config;
use crate::types::{clamp_stars, PersonFields, PersonRecord};

/// Errors crossing the facade boundary.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Validation failure, rejected before any datastore call
    #[error("{0} is required")]
    MissingField(&'static str),

    #[error("record not found: {0}")]
    NotFound(String),

    #[error("Airtable is not configured: {0}")]
    Config(&'static str),

    #[error("Airtable returned HTTP {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Airtable request failed")]
    Transport(#[from] reqwest::Error),

    #[error("unexpected Airtable response: {0}")]
    UnexpectedResponse(&'static str),
}

/// Client for one Airtable base/table pair.
///
/// Configuration (base id, table id, token) is injected once at
/// construction and never read ad hoc mid-request.
pub struct Airtable {
    http: reqwest::Client,
    table_url: String,
    token: String,
    page_size: usize,
    max_stars: u32,
    track_log: bool,
    strict_names: bool,
}

#[derive(Deserialize)]
struct RecordsEnvelope {
    records: Vec<PersonRecord>,
}

#[derive(Serialize)]
struct CreateEnvelope<'a> {
    records: [CreateRecord<'a>; 1],
}

#[derive(Serialize)]
struct CreateRecord<'a> {
    fields: &'a PersonFields,
}

#[derive(Serialize)]
struct PatchEnvelope<'a> {
    records: [PatchRecord<'a>; 1],
}

#[derive(Serialize)]
struct PatchRecord<'a> {
    id: &'a str,
    fields: RatingFields,
}

/// Partial field set written on a rating update. Names are never touched.
#[derive(Serialize)]
struct RatingFields {
    #[serde(rename = "Sterne")]
    stars: u32,
    #[serde(rename = "LOG", skip_serializing_if = "Option::is_none")]
    log: Option<String>,
}

/// Airtable error payload, e.g. {"error": {"type": "...", "message": "..."}}
#[derive(Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ApiErrorDetail {
    Structured { message: String },
    Plain(String),
}

impl Airtable {
    /// Build a client from configuration, resolving the API key once.
    pub fn new(config: &Config) -> Result<Self, StoreError> {
        if config.airtable.base_id.is_empty() {
            return Err(StoreError::Config("airtable.base_id is not set"));
        }
        if config.airtable.table_id.is_empty() {
            return Err(StoreError::Config("airtable.table_id is not set"));
        }
        let token = config
            .airtable
            .resolve_api_key()
            .ok_or(StoreError::Config(
                "airtable.api_key is not set (default reads env:AIRTABLE_TOKEN)",
            ))?;

        let table_url = format!(
            "{}/{}/{}",
            config.airtable.api_url.trim_end_matches('/'),
            config.airtable.base_id,
            config.airtable.table_id
        );

        Ok(Self {
            http: reqwest::Client::new(),
            table_url,
            token,
            page_size: config.search.page_size,
            max_stars: config.ratings.max_stars,
            track_log: config.ratings.track_log,
            strict_names: config.ratings.strict_names,
        })
    }

    /// Search people whose first name, last name, or "first last"
    /// concatenation contains the query, case-insensitively.
    ///
    /// Whitespace-only queries return an empty list without an outbound
    /// call. Results are capped at the configured page size and kept in
    /// whatever order Airtable returns them.
    pub async fn search(&self, query: &str) -> Result<Vec<PersonRecord>, StoreError> {
        let Some(filter) = formula::name_filter(query) else {
            return Ok(Vec::new());
        };

        let resp = self
            .http
            .get(&self.table_url)
            .bearer_auth(&self.token)
            .query(&[
                ("filterByFormula", filter.as_str()),
                ("pageSize", &self.page_size.to_string()),
            ])
            .send()
            .await?;

        let envelope: RecordsEnvelope = Self::check(resp).await?.json().await?;
        Ok(envelope.records)
    }

    /// Fetch a single record by its Airtable id.
    pub async fn get(&self, id: &str) -> Result<PersonRecord, StoreError> {
        let resp = self
            .http
            .get(format!("{}/{}", self.table_url, id))
            .bearer_auth(&self.token)
            .send()
            .await?;

        if resp.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(StoreError::NotFound(id.to_string()));
        }
        Ok(Self::check(resp).await?.json().await?)
    }

    /// Create a new person with an initial rating.
    ///
    /// Names are trimmed; under strict validation a blank name is rejected
    /// before any call, otherwise it is coerced to the empty string. A new
    /// 8-character short id is generated, the rating is clamped, and when
    /// log tracking is on the LOG field is seeded with a created entry.
    pub async fn create_person(
        &self,
        first_name: &str,
        last_name: &str,
        stars: u32,
    ) -> Result<PersonRecord, StoreError> {
        let first_name = first_name.trim();
        let last_name = last_name.trim();
        if self.strict_names {
            if first_name.is_empty() {
                return Err(StoreError::MissingField("vorname"));
            }
            if last_name.is_empty() {
                return Err(StoreError::MissingField("nachname"));
            }
        }

        let stars = clamp_stars(stars, self.max_stars);
        let fields = PersonFields {
            short_id: Some(short_id()),
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            stars,
            log: self
                .track_log
                .then(|| changelog::created_entry(Local::now(), stars)),
        };

        let resp = self
            .http
            .post(&self.table_url)
            .bearer_auth(&self.token)
            .json(&CreateEnvelope {
                records: [CreateRecord { fields: &fields }],
            })
            .send()
            .await?;

        Self::first_record(resp).await
    }

    /// Set a new rating on an existing record.
    ///
    /// The rating is clamped. When log tracking is on, the current record
    /// is read first and the new "von X auf Y" entry is prepended to the
    /// trimmed old log, then rating and merged log are written in one
    /// PATCH. The read-then-write is not atomic: concurrent updates to the
    /// same record are last-writer-wins, a log entry can be lost.
    pub async fn update_rating(
        &self,
        record_id: &str,
        stars: u32,
    ) -> Result<PersonRecord, StoreError> {
        if record_id.is_empty() {
            return Err(StoreError::MissingField("recordId"));
        }

        let stars = clamp_stars(stars, self.max_stars);
        let log = if self.track_log {
            let current = self.get(record_id).await?;
            let entry = changelog::rating_entry(Local::now(), current.fields.stars, stars);
            Some(changelog::prepend(&entry, current.fields.log.as_deref()))
        } else {
            None
        };

        let resp = self
            .http
            .patch(&self.table_url)
            .bearer_auth(&self.token)
            .json(&PatchEnvelope {
                records: [PatchRecord {
                    id: record_id,
                    fields: RatingFields { stars, log },
                }],
            })
            .send()
            .await?;

        Self::first_record(resp).await
    }

    /// Base URL of the table (for display/logging).
    pub fn table_url(&self) -> &str {
        &self.table_url
    }

    async fn check(resp: reqwest::Response) -> Result<reqwest::Response, StoreError> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        let message = match resp.json::<ApiErrorBody>().await {
            Ok(body) => match body.error {
                ApiErrorDetail::Structured { message } => message,
                ApiErrorDetail::Plain(message) => message,
            },
            Err(_) => status.to_string(),
        };
        Err(StoreError::Api {
            status: status.as_u16(),
            message,
        })
    }

    async fn first_record(resp: reqwest::Response) -> Result<PersonRecord, StoreError> {
        let envelope: RecordsEnvelope = Self::check(resp).await?.json().await?;
        envelope
            .records
            .into_iter()
            .next()
            .ok_or(StoreError::UnexpectedResponse("empty records envelope"))
    }
}

/// Generate an 8-character lowercase alphanumeric token for the ID field.
fn short_id() -> String {
    const CHARS: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";
    let mut rng = rand::thread_rng();
    (0..8)
        .map(|_| CHARS[rng.gen_range(0..CHARS.len())] as char)
        .collect()
}
