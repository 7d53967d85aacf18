use std::str::FromStr;

use anyhow::{anyhow, Context, Result};
use serde::Serialize;

use super::models::Candidate;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Json,
}

impl ExportFormat {
    pub fn content_type(&self) -> &'static str {
        match self {
            Self::Csv => "text/csv; charset=utf-8",
            Self::Json => "application/json",
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Json => "json",
        }
    }
}

impl FromStr for ExportFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            "json" => Ok(Self::Json),
            other => Err(anyhow!("unsupported export format: {}", other)),
        }
    }
}

/// Flat row written to CSV.
#[derive(Debug, Serialize)]
struct ExportRow<'a> {
    id: String,
    name_ar: &'a str,
    name_en: Option<&'a str>,
    name_sorani: Option<&'a str>,
    party: Option<&'a str>,
    governorate: &'a str,
    position: Option<&'a str>,
    priority_order: i32,
    influence_score: f64,
    follower_count: i64,
    sentiment_score: f64,
    last_updated: Option<String>,
}

impl<'a> From<&'a Candidate> for ExportRow<'a> {
    fn from(c: &'a Candidate) -> Self {
        ExportRow {
            id: c.id.to_string(),
            name_ar: &c.name_ar,
            name_en: c.name_en.as_deref(),
            name_sorani: c.name_sorani.as_deref(),
            party: c.party.as_deref(),
            governorate: &c.governorate,
            position: c.position.as_deref(),
            priority_order: c.priority_order,
            influence_score: c.influence_score,
            follower_count: c.follower_count,
            sentiment_score: c.sentiment_score,
            last_updated: c.last_updated.map(|t| t.to_rfc3339()),
        }
    }
}

/// Renders candidates in the requested format.
pub fn export_candidates(candidates: &[Candidate], format: ExportFormat) -> Result<String> {
    match format {
        ExportFormat::Json => serde_json::to_string_pretty(candidates).map_err(Into::into),
        ExportFormat::Csv => {
            let mut writer = csv::WriterBuilder::new()
                .has_headers(true)
                .from_writer(Vec::new());
            for candidate in candidates {
                writer.serialize(ExportRow::from(candidate))?;
            }
            let bytes = writer
                .into_inner()
                .map_err(|e| anyhow!("failed to flush csv writer: {}", e))?;
            String::from_utf8(bytes).context("csv output is not utf-8")
        }
    }
}
