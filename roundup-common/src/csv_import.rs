//! Simple CSV import
//!
//! The import format is "simple CSV": the first line is the header, every
//! other non-blank line is split on commas and zipped against the header by
//! position. There is no quoting, so a comma inside a value splits it.

use crate::records::{columns, expand_row, ImportedRow, InterviewRecord};
use crate::rounds::extract_rounds;

/// Maximum number of records the record store accepts per create request
pub const BATCH_SIZE: usize = 10;

/// Parse CSV text into header-keyed rows
///
/// Ragged rows get `""` for missing trailing columns; surplus values are
/// dropped. Blank lines are skipped. Malformed input never fails.
pub fn parse_rows(text: &str) -> Vec<ImportedRow> {
    let mut lines = text.lines();

    let headers: Vec<&str> = match lines.next() {
        Some(header_line) if !header_line.trim().is_empty() => {
            header_line.split(',').map(str::trim).collect()
        }
        _ => return Vec::new(),
    };

    lines
        .filter(|line| !line.trim().is_empty())
        .map(|line| {
            let values: Vec<&str> = line.split(',').map(str::trim).collect();
            headers
                .iter()
                .enumerate()
                .map(|(idx, header)| (*header, values.get(idx).copied().unwrap_or("")))
                .collect()
        })
        .collect()
}

/// Parse CSV text and expand every row into interview records
///
/// Output order is row-major, then round order within a row.
pub fn import_records(text: &str) -> Vec<InterviewRecord> {
    let rows = parse_rows(text);
    let records: Vec<InterviewRecord> = rows
        .iter()
        .flat_map(|row| {
            let rounds = extract_rounds(row.get(columns::SCHEDULING_METHOD));
            expand_row(row, &rounds)
        })
        .collect();

    tracing::debug!(
        rows = rows.len(),
        records = records.len(),
        "Expanded CSV rows into interview records"
    );

    records
}

/// Split records into consecutive batches of at most `size`
///
/// A `size` of zero is treated as one.
pub fn into_batches<T: Clone>(records: &[T], size: usize) -> Vec<Vec<T>> {
    records
        .chunks(size.max(1))
        .map(|chunk| chunk.to_vec())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::EmailStatus;

    const HEADER: &str =
        "Company,Interviewer,Interviewer Email,Candidate,Candidate Email,Added On,Scheduling method";

    #[test]
    fn test_parse_trims_headers_and_values() {
        let rows = parse_rows(" Company , Candidate \n Acme , Jo \n");
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get("Company"), "Acme");
        assert_eq!(rows[0].get("Candidate"), "Jo");
    }

    #[test]
    fn test_parse_pads_ragged_rows() {
        let rows = parse_rows("a,b,c\n1\n1,2,3,4");
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].get("a"), "1");
        assert_eq!(rows[0].get("b"), "");
        assert_eq!(rows[0].get("c"), "");
        assert_eq!(rows[1].get("c"), "3");
        assert_eq!(rows[1].len(), 3);
    }

    #[test]
    fn test_parse_skips_blank_lines_and_crlf() {
        let rows = parse_rows("a,b\r\n\r\n1,2\r\n   \r\n3,4\r\n");
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].get("b"), "2");
        assert_eq!(rows[1].get("a"), "3");
    }

    #[test]
    fn test_parse_empty_input() {
        assert!(parse_rows("").is_empty());
        assert!(parse_rows("\n\n").is_empty());
        assert!(parse_rows("only,a,header").is_empty());
    }

    #[test]
    fn test_import_end_to_end_row() {
        let csv = "Company,Candidate,Candidate Email,Scheduling method\n\
                   Acme,Jo,jo@x.com,Round1: http://cal/1 Round2: http://cal/2";
        let records = import_records(csv);

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].round_number, 1);
        assert_eq!(records[0].calendly_link, "http://cal/1");
        assert_eq!(records[1].round_number, 2);
        assert_eq!(records[1].calendly_link, "http://cal/2");
        for record in &records {
            assert_eq!(record.company, "Acme");
            assert_eq!(record.candidate, "Jo");
            assert_eq!(record.email_status, EmailStatus::Pending);
        }
    }

    #[test]
    fn test_import_flattens_row_major() {
        let csv = format!(
            "{HEADER}\n\
             A,I1,i1@a.com,C1,c1@x.com,2024-01-01,Round1: http://a/1 Round2: http://a/2 Round3: http://a/3\n\
             B,I2,i2@b.com,C2,c2@x.com,2024-01-02,no link yet\n\
             C,I3,i3@c.com,C3,c3@x.com,2024-01-03,http://c/1"
        );
        let records = import_records(&csv);

        assert_eq!(records.len(), 3 + 1 + 1);
        let order: Vec<(&str, u32)> = records
            .iter()
            .map(|r| (r.company.as_str(), r.round_number))
            .collect();
        assert_eq!(
            order,
            vec![("A", 1), ("A", 2), ("A", 3), ("B", 1), ("C", 1)]
        );
        assert_eq!(records[3].calendly_link, "no link yet");
        assert_eq!(records[4].calendly_link, "http://c/1");
    }

    #[test]
    fn test_batches_of_ten() {
        let items: Vec<u32> = (0..25).collect();
        let sizes: Vec<usize> = into_batches(&items, BATCH_SIZE)
            .iter()
            .map(Vec::len)
            .collect();
        assert_eq!(sizes, vec![10, 10, 5]);
    }

    #[test]
    fn test_batches_preserve_order_and_handle_empty() {
        let items: Vec<u32> = (0..12).collect();
        let batches = into_batches(&items, BATCH_SIZE);
        assert_eq!(batches[1], vec![10, 11]);
        assert!(into_batches::<u32>(&[], BATCH_SIZE).is_empty());
        assert_eq!(into_batches(&[1, 2], 0).len(), 2);
    }
}
