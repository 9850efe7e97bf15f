//! Interview record model and row expansion
//!
//! Field names on the wire match the column names of the record store table,
//! so [`InterviewRecord`] serializes directly into a store `fields` object.

use serde::de::Deserializer;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;

use crate::rounds::Round;

/// CSV column names read by the importer
pub mod columns {
    pub const COMPANY: &str = "Company";
    pub const INTERVIEWER: &str = "Interviewer";
    pub const INTERVIEWER_EMAIL: &str = "Interviewer Email";
    pub const CANDIDATE: &str = "Candidate";
    pub const CANDIDATE_EMAIL: &str = "Candidate Email";
    pub const ADDED_ON: &str = "Added On";
    pub const SCHEDULING_METHOD: &str = "Scheduling method";
}

/// One imported CSV line, keyed by header
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportedRow {
    values: HashMap<String, String>,
}

impl ImportedRow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, column: impl Into<String>, value: impl Into<String>) {
        self.values.insert(column.into(), value.into());
    }

    /// Value of a column, or `""` when the column is absent
    pub fn get(&self, column: &str) -> &str {
        self.values.get(column).map(String::as_str).unwrap_or("")
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for ImportedRow
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// Email send status of a record
///
/// Stored as `Pending` / `sent`. Reading is case-insensitive and anything
/// other than `sent` counts as pending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum EmailStatus {
    #[default]
    Pending,
    Sent,
}

impl EmailStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            EmailStatus::Pending => "Pending",
            EmailStatus::Sent => "sent",
        }
    }

    /// Parse a stored status value
    pub fn parse(value: &str) -> Self {
        if value.trim().eq_ignore_ascii_case("sent") {
            EmailStatus::Sent
        } else {
            EmailStatus::Pending
        }
    }

    /// Whether a user-supplied filter value names this status
    pub fn matches(&self, filter: &str) -> bool {
        Self::parse(filter) == *self
    }
}

impl fmt::Display for EmailStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for EmailStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for EmailStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = cell_text(Value::deserialize(deserializer)?);
        Ok(value.as_deref().map(EmailStatus::parse).unwrap_or_default())
    }
}

/// One interview round for one candidate, as stored in the record store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterviewRecord {
    #[serde(rename = "Company", default, deserialize_with = "lenient_text")]
    pub company: String,

    #[serde(rename = "Interviewer", default, deserialize_with = "lenient_text")]
    pub interviewer: String,

    #[serde(rename = "Interviewer Email", default, deserialize_with = "lenient_text")]
    pub interviewer_email: String,

    #[serde(rename = "Candidate", default, deserialize_with = "lenient_text")]
    pub candidate: String,

    #[serde(rename = "Candidate Email", default, deserialize_with = "lenient_text")]
    pub candidate_email: String,

    #[serde(
        rename = "Round Number",
        default = "default_round_number",
        deserialize_with = "lenient_round_number"
    )]
    pub round_number: u32,

    #[serde(rename = "Calendly Link", default, deserialize_with = "lenient_text")]
    pub calendly_link: String,

    #[serde(rename = "Added On", default, deserialize_with = "lenient_text")]
    pub added_on: String,

    #[serde(rename = "Email Status", default)]
    pub email_status: EmailStatus,

    #[serde(
        rename = "Email Sent At",
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient_optional_text"
    )]
    pub email_sent_at: Option<String>,

    #[serde(
        rename = "TAT Minutes",
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient_minutes"
    )]
    pub tat_minutes: Option<f64>,
}

/// Scalar cell rendered as text; lists (multi-select, lookups) are joined
fn cell_text(value: Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Array(items) => Some(
            items
                .into_iter()
                .filter_map(cell_text)
                .collect::<Vec<_>>()
                .join(", "),
        ),
        Value::Object(_) => None,
    }
}

fn lenient_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(cell_text(Value::deserialize(deserializer)?).unwrap_or_default())
}

fn lenient_optional_text<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<String>, D::Error> {
    Ok(cell_text(Value::deserialize(deserializer)?).filter(|s| !s.is_empty()))
}

fn default_round_number() -> u32 {
    1
}

/// Accepts integers, whole floats, numeric strings and text such as
/// `"Round 2"` (store columns drift). Anything unusable, including 0, reads
/// as round 1 so the record still decodes.
fn lenient_round_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
    let value = Value::deserialize(deserializer)?;
    let number = match &value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok().or_else(|| first_number(s)),
        _ => None,
    };
    Ok(match number {
        Some(n) if n >= 1.0 && n.fract() == 0.0 && n <= u32::MAX as f64 => n as u32,
        _ => default_round_number(),
    })
}

/// First run of ASCII digits in `text`
fn first_number(text: &str) -> Option<f64> {
    let digits: String = text
        .chars()
        .skip_while(|c| !c.is_ascii_digit())
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse().ok()
}

fn lenient_minutes<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f64>, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    })
}

impl InterviewRecord {
    /// Build a pending record for one round of an imported row
    pub fn from_row(row: &ImportedRow, round_number: u32, calendly_link: impl Into<String>) -> Self {
        Self {
            company: row.get(columns::COMPANY).to_string(),
            interviewer: row.get(columns::INTERVIEWER).to_string(),
            interviewer_email: row.get(columns::INTERVIEWER_EMAIL).to_string(),
            candidate: row.get(columns::CANDIDATE).to_string(),
            candidate_email: row.get(columns::CANDIDATE_EMAIL).to_string(),
            round_number,
            calendly_link: calendly_link.into(),
            added_on: row.get(columns::ADDED_ON).to_string(),
            email_status: EmailStatus::Pending,
            email_sent_at: None,
            tat_minutes: None,
        }
    }
}

/// A record as returned by the store: id, creation time and fields
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredRecord {
    pub id: String,

    #[serde(
        rename = "createdTime",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub created_time: Option<String>,

    pub fields: InterviewRecord,
}

/// Expand one imported row into interview records
///
/// One record per round; with no rounds, exactly one record for round 1
/// whose link is the raw scheduling text. Never fails.
pub fn expand_row(row: &ImportedRow, rounds: &[Round]) -> Vec<InterviewRecord> {
    if rounds.is_empty() {
        let raw = row.get(columns::SCHEDULING_METHOD);
        return vec![InterviewRecord::from_row(row, 1, raw)];
    }

    rounds
        .iter()
        .map(|round| InterviewRecord::from_row(row, round.round_number, round.link.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_row(scheduling: &str) -> ImportedRow {
        [
            ("Company", "Acme"),
            ("Interviewer", "Pat"),
            ("Interviewer Email", "pat@acme.com"),
            ("Candidate", "Jo"),
            ("Candidate Email", "jo@x.com"),
            ("Added On", "2024-03-01"),
            ("Scheduling method", scheduling),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_expand_without_rounds_uses_raw_text() {
        let row = sample_row("ask the recruiter");
        let records = expand_row(&row, &[]);

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].round_number, 1);
        assert_eq!(records[0].calendly_link, "ask the recruiter");
        assert_eq!(records[0].email_status, EmailStatus::Pending);
    }

    #[test]
    fn test_expand_copies_row_fields_per_round() {
        let row = sample_row("ignored");
        let rounds = vec![Round::new(1, "http://cal/1"), Round::new(2, "http://cal/2")];
        let records = expand_row(&row, &rounds);

        assert_eq!(records.len(), 2);
        for (record, round) in records.iter().zip(&rounds) {
            assert_eq!(record.round_number, round.round_number);
            assert_eq!(record.calendly_link, round.link);
            assert_eq!(record.company, "Acme");
            assert_eq!(record.interviewer, "Pat");
            assert_eq!(record.interviewer_email, "pat@acme.com");
            assert_eq!(record.candidate, "Jo");
            assert_eq!(record.candidate_email, "jo@x.com");
            assert_eq!(record.added_on, "2024-03-01");
            assert_eq!(record.email_status, EmailStatus::Pending);
        }
    }

    #[test]
    fn test_missing_columns_read_empty() {
        let row = ImportedRow::new();
        let records = expand_row(&row, &[]);
        assert_eq!(records[0].company, "");
        assert_eq!(records[0].calendly_link, "");
    }

    #[test]
    fn test_record_serializes_store_field_names() {
        let record = InterviewRecord::from_row(&sample_row(""), 2, "http://cal/2");
        let value = serde_json::to_value(&record).unwrap();

        assert_eq!(value["Company"], "Acme");
        assert_eq!(value["Candidate Email"], "jo@x.com");
        assert_eq!(value["Round Number"], 2);
        assert_eq!(value["Calendly Link"], "http://cal/2");
        assert_eq!(value["Email Status"], "Pending");
        assert!(value.get("Email Sent At").is_none());
        assert!(value.get("TAT Minutes").is_none());
    }

    #[test]
    fn test_stored_record_deserializes_loose_fields() {
        let record: StoredRecord = serde_json::from_value(json!({
            "id": "rec123",
            "createdTime": "2024-03-01T10:00:00.000Z",
            "fields": {
                "Candidate": "Jo",
                "Round Number": "3",
                "Email Status": "SENT",
                "TAT Minutes": "12.5"
            }
        }))
        .unwrap();

        assert_eq!(record.id, "rec123");
        assert_eq!(record.fields.round_number, 3);
        assert_eq!(record.fields.email_status, EmailStatus::Sent);
        assert_eq!(record.fields.tat_minutes, Some(12.5));
        assert_eq!(record.fields.company, "");
    }

    #[test]
    fn test_stored_record_defaults_when_fields_missing() {
        let record: StoredRecord =
            serde_json::from_value(json!({ "id": "rec1", "fields": {} })).unwrap();
        assert_eq!(record.fields.round_number, 1);
        assert_eq!(record.fields.email_status, EmailStatus::Pending);
        assert_eq!(record.created_time, None);
    }

    #[test]
    fn test_unusable_round_number_reads_as_round_one() {
        for raw in [json!(0), json!(-3), json!(1.5), json!("soon"), json!(true)] {
            let record: StoredRecord = serde_json::from_value(json!({
                "id": "rec1",
                "fields": { "Round Number": raw }
            }))
            .unwrap();
            assert_eq!(record.fields.round_number, 1, "raw value {}", raw);
        }

        let record: StoredRecord = serde_json::from_value(json!({
            "id": "rec2",
            "fields": { "Round Number": "Round 2" }
        }))
        .unwrap();
        assert_eq!(record.fields.round_number, 2);
    }

    #[test]
    fn test_non_text_cells_still_decode() {
        let record: StoredRecord = serde_json::from_value(json!({
            "id": "rec3",
            "fields": {
                "Company": ["Acme", "Beta"],
                "Candidate": 42,
                "Added On": null,
                "Email Status": { "name": "sent" },
                "Email Sent At": ""
            }
        }))
        .unwrap();
        assert_eq!(record.fields.company, "Acme, Beta");
        assert_eq!(record.fields.candidate, "42");
        assert_eq!(record.fields.added_on, "");
        assert_eq!(record.fields.email_status, EmailStatus::Pending);
        assert_eq!(record.fields.email_sent_at, None);
    }

    #[test]
    fn test_email_status_parsing() {
        assert_eq!(EmailStatus::parse("sent"), EmailStatus::Sent);
        assert_eq!(EmailStatus::parse(" Sent "), EmailStatus::Sent);
        assert_eq!(EmailStatus::parse("pending"), EmailStatus::Pending);
        assert_eq!(EmailStatus::parse("Pending"), EmailStatus::Pending);
        assert_eq!(EmailStatus::parse("weird"), EmailStatus::Pending);
        assert!(EmailStatus::Pending.matches("pending"));
        assert!(!EmailStatus::Sent.matches("Pending"));
    }
}
