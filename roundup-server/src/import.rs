//! Concurrent batch submission of imported records
//!
//! Records are split into batches the store accepts in one request and all
//! batches are submitted at once. Every outcome is collected; the import
//! succeeds only if every batch did. Batches that succeeded are not rolled
//! back when another fails.

use futures::future::join_all;
use roundup_common::csv_import::{into_batches, BATCH_SIZE};
use roundup_common::InterviewRecord;
use serde::Serialize;
use tracing::{info, warn};

use crate::airtable::{AirtableClient, StoreCredentials};

/// Result of one create request
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchOutcome {
    /// 0-based batch position
    pub index: usize,
    pub size: usize,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Aggregated import result
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImportReport {
    pub success: bool,
    pub total_records: usize,
    /// Records in batches the store accepted; these stay created
    pub created_records: usize,
    /// Operator-facing summary when any batch failed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub batches: Vec<BatchOutcome>,
}

impl ImportReport {
    pub fn new(total_records: usize, batches: Vec<BatchOutcome>) -> Self {
        let failed = batches.iter().filter(|b| !b.success).count();
        let created_records = batches.iter().filter(|b| b.success).map(|b| b.size).sum();
        let error = (failed > 0).then(|| {
            format!(
                "{} of {} batches failed; {} of {} records created",
                failed,
                batches.len(),
                created_records,
                total_records
            )
        });

        Self {
            success: failed == 0,
            total_records,
            created_records,
            error,
            batches,
        }
    }

    /// Indices of batches that failed
    pub fn failed_batches(&self) -> Vec<usize> {
        self.batches
            .iter()
            .filter(|b| !b.success)
            .map(|b| b.index)
            .collect()
    }

    /// Upstream status of the first failed batch
    pub fn first_failure_status(&self) -> Option<u16> {
        self.batches
            .iter()
            .find(|b| !b.success)
            .map(|b| b.status.unwrap_or(502))
    }
}

/// Submit all records to the store, one concurrent request per batch
pub async fn submit_records(
    store: &AirtableClient,
    creds: &StoreCredentials,
    records: &[InterviewRecord],
) -> ImportReport {
    let batches = into_batches(records, BATCH_SIZE);

    let submissions = batches.iter().enumerate().map(|(index, batch)| async move {
        match store.create_records(creds, batch).await {
            Ok(_) => BatchOutcome {
                index,
                size: batch.len(),
                success: true,
                status: None,
                error: None,
            },
            Err(e) => {
                warn!(batch = index, error = %e, "Batch create failed");
                BatchOutcome {
                    index,
                    size: batch.len(),
                    success: false,
                    status: Some(e.status_code()),
                    error: Some(e.to_string()),
                }
            }
        }
    });

    let report = ImportReport::new(records.len(), join_all(submissions).await);

    info!(
        records = records.len(),
        created = report.created_records,
        batches = report.batches.len(),
        failed = report.failed_batches().len(),
        "Import submission finished"
    );

    report
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outcome(index: usize, success: bool, status: Option<u16>) -> BatchOutcome {
        BatchOutcome {
            index,
            size: 10,
            success,
            status,
            error: (!success).then(|| "boom".to_string()),
        }
    }

    #[test]
    fn test_report_failure_helpers() {
        let report = ImportReport::new(
            30,
            vec![
                outcome(0, true, None),
                outcome(1, false, Some(422)),
                outcome(2, false, None),
            ],
        );
        assert!(!report.success);
        assert_eq!(report.created_records, 10);
        assert_eq!(
            report.error.as_deref(),
            Some("2 of 3 batches failed; 10 of 30 records created")
        );
        assert_eq!(report.failed_batches(), vec![1, 2]);
        assert_eq!(report.first_failure_status(), Some(422));
    }

    #[test]
    fn test_report_all_ok() {
        let report = ImportReport::new(10, vec![outcome(0, true, None)]);
        assert!(report.success);
        assert_eq!(report.created_records, 10);
        assert_eq!(report.error, None);
        assert!(report.failed_batches().is_empty());
        assert_eq!(report.first_failure_status(), None);
    }

    #[tokio::test]
    async fn test_empty_import_is_trivially_successful() {
        let store = AirtableClient::new("http://127.0.0.1:9/v0", std::time::Duration::from_secs(1)).unwrap();
        let creds = StoreCredentials {
            token: "t".into(),
            base_id: "b".into(),
            table_id: "x".into(),
        };
        let report = submit_records(&store, &creds, &[]).await;
        assert!(report.success);
        assert_eq!(report.total_records, 0);
        assert!(report.batches.is_empty());
    }
}
