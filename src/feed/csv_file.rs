//! CSV-file season feed.
//!
//! Events: `id,name,start_date,end_date,purse,multiplier,segment,event_type,is_completed`
//! with `multiplier`, `event_type` and `is_completed` optional.
//! Candidates: `name,rank,tier` with `rank` and `tier` optional.

use super::{CandidateRecord, EventRecord, FeedError, SeasonFeed};
use crate::db::repo::DATE_FORMAT;
use crate::domain::{validate_amounts, Decimal, EventId, Tier};
use async_trait::async_trait;
use chrono::NaiveDate;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct CsvSeasonFeed {
    events_path: PathBuf,
    candidates_path: PathBuf,
}

impl CsvSeasonFeed {
    pub fn new(events_path: impl Into<PathBuf>, candidates_path: impl Into<PathBuf>) -> Self {
        Self {
            events_path: events_path.into(),
            candidates_path: candidates_path.into(),
        }
    }

    pub fn parse_events(csv_bytes: &[u8]) -> Result<Vec<EventRecord>, FeedError> {
        #[derive(Debug, serde::Deserialize)]
        struct Row {
            id: i64,
            name: String,
            start_date: String,
            end_date: String,
            purse: String,
            multiplier: Option<String>,
            segment: String,
            event_type: Option<String>,
            is_completed: Option<String>,
        }

        fn parse_date(field: &str, value: &str) -> Result<NaiveDate, FeedError> {
            NaiveDate::parse_from_str(value.trim(), DATE_FORMAT)
                .map_err(|e| FeedError::InvalidRecord(format!("invalid {}: {}", field, e)))
        }

        fn parse_bool(value: Option<&str>) -> Result<bool, FeedError> {
            match value.map(|v| v.trim().to_ascii_lowercase()).as_deref() {
                None | Some("") | Some("false") | Some("0") => Ok(false),
                Some("true") | Some("1") => Ok(true),
                Some(other) => Err(FeedError::InvalidRecord(format!(
                    "invalid is_completed: {}",
                    other
                ))),
            }
        }

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(csv_bytes);

        let mut events = Vec::new();
        for record in reader.deserialize::<Row>() {
            let row = record.map_err(|e| FeedError::Csv(e.to_string()))?;
            let purse = Decimal::from_str_canonical(&row.purse)
                .map_err(|e| FeedError::InvalidRecord(format!("invalid purse: {}", e)))?;
            let multiplier = match row.multiplier.as_deref().filter(|m| !m.is_empty()) {
                Some(m) => Decimal::from_str_canonical(m)
                    .map_err(|e| FeedError::InvalidRecord(format!("invalid multiplier: {}", e)))?,
                None => Decimal::one(),
            };
            validate_amounts(purse, multiplier)
                .map_err(|e| FeedError::InvalidRecord(format!("event {}: {}", row.id, e)))?;

            let start_date = parse_date("start_date", &row.start_date)?;
            let end_date = parse_date("end_date", &row.end_date)?;
            if end_date < start_date {
                return Err(FeedError::InvalidRecord(format!(
                    "event {} ends before it starts",
                    row.id
                )));
            }

            events.push(EventRecord {
                id: EventId::new(row.id),
                name: row.name,
                start_date,
                end_date,
                purse,
                multiplier,
                segment: row.segment,
                event_type: row
                    .event_type
                    .filter(|t| !t.is_empty())
                    .unwrap_or_else(|| "regular".to_string()),
                is_completed: parse_bool(row.is_completed.as_deref())?,
            });
        }

        Ok(events)
    }

    pub fn parse_candidates(csv_bytes: &[u8]) -> Result<Vec<CandidateRecord>, FeedError> {
        #[derive(Debug, serde::Deserialize)]
        struct Row {
            name: String,
            rank: Option<u32>,
            tier: Option<String>,
        }

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(csv_bytes);

        let mut candidates = Vec::new();
        for record in reader.deserialize::<Row>() {
            let row = record.map_err(|e| FeedError::Csv(e.to_string()))?;
            if row.name.is_empty() {
                return Err(FeedError::InvalidRecord("candidate without a name".to_string()));
            }
            let tier = row
                .tier
                .as_deref()
                .filter(|t| !t.is_empty())
                .map(str::parse::<Tier>)
                .transpose()
                .map_err(FeedError::InvalidRecord)?;

            candidates.push(CandidateRecord {
                name: row.name,
                rank: row.rank,
                tier,
            });
        }

        Ok(candidates)
    }

    async fn read(path: &PathBuf) -> Result<Vec<u8>, FeedError> {
        tokio::fs::read(path).await.map_err(|e| FeedError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })
    }
}

#[async_trait]
impl SeasonFeed for CsvSeasonFeed {
    async fn fetch_events(&self) -> Result<Vec<EventRecord>, FeedError> {
        let bytes = Self::read(&self.events_path).await?;
        Self::parse_events(&bytes)
    }

    async fn fetch_candidates(&self) -> Result<Vec<CandidateRecord>, FeedError> {
        let bytes = Self::read(&self.candidates_path).await?;
        Self::parse_candidates(&bytes)
    }
}
