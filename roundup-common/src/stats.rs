//! Record statistics and filters for the dashboard

use serde::Serialize;

use crate::records::{EmailStatus, StoredRecord};

/// Aggregate counts over a set of records
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecordStats {
    pub total: usize,
    pub sent: usize,
    pub pending: usize,
    /// Mean TAT over records that have one; `None` when none do
    pub avg_tat_minutes: Option<f64>,
}

/// Compute dashboard statistics
pub fn compute_stats(records: &[StoredRecord]) -> RecordStats {
    let sent = records
        .iter()
        .filter(|r| r.fields.email_status == EmailStatus::Sent)
        .count();

    let tats: Vec<f64> = records.iter().filter_map(|r| r.fields.tat_minutes).collect();
    let avg_tat_minutes = if tats.is_empty() {
        None
    } else {
        let mean = tats.iter().sum::<f64>() / tats.len() as f64;
        Some((mean * 100.0).round() / 100.0)
    };

    RecordStats {
        total: records.len(),
        sent,
        pending: records.len() - sent,
        avg_tat_minutes,
    }
}

/// Distinct non-empty company names, in first-seen order
pub fn companies(records: &[StoredRecord]) -> Vec<String> {
    let mut seen: Vec<String> = Vec::new();
    for record in records {
        let company = &record.fields.company;
        if !company.is_empty() && !seen.contains(company) {
            seen.push(company.clone());
        }
    }
    seen
}

/// Record filter; empty criteria match everything
#[derive(Debug, Clone, Default)]
pub struct RecordFilter {
    pub company: Option<String>,
    pub status: Option<String>,
}

impl RecordFilter {
    pub fn matches(&self, record: &StoredRecord) -> bool {
        let company_ok = match self.company.as_deref() {
            Some(company) if !company.is_empty() => record.fields.company == company,
            _ => true,
        };
        let status_ok = match self.status.as_deref() {
            Some(status) if !status.is_empty() => record.fields.email_status.matches(status),
            _ => true,
        };
        company_ok && status_ok
    }

    pub fn apply(&self, records: &[StoredRecord]) -> Vec<StoredRecord> {
        records.iter().filter(|r| self.matches(r)).cloned().collect()
    }
}
