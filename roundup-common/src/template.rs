//! Interview invitation email template

use serde::Serialize;
use std::fmt::{self, Display};

use crate::records::InterviewRecord;

/// Signature used at the bottom of invitations
pub const DEFAULT_TEAM_NAME: &str = "Weekday Team";

/// Invitation email for one interview round
pub struct InvitationEmail<'a> {
    pub record: &'a InterviewRecord,
    pub team_name: &'a str,
}

impl<'a> InvitationEmail<'a> {
    pub fn new(record: &'a InterviewRecord) -> Self {
        Self {
            record,
            team_name: DEFAULT_TEAM_NAME,
        }
    }

    pub fn subject(&self) -> String {
        format!(
            "Interview Invitation - Round {} at {}",
            self.record.round_number, self.record.company
        )
    }

    pub fn html(&self) -> String {
        self.to_string()
    }

    /// Full preview as the operator would see it before sending
    pub fn preview(&self, from_email: &str) -> EmailPreview {
        EmailPreview {
            from: from_email.to_string(),
            to: self.record.candidate_email.clone(),
            subject: self.subject(),
            html: self.html(),
        }
    }
}

impl<'a> Display for InvitationEmail<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let candidate = escape_html(&self.record.candidate);
        let company = escape_html(&self.record.company);
        let interviewer = escape_html(&self.record.interviewer);
        let link = escape_html(&self.record.calendly_link);
        let round = self.record.round_number;
        let team = escape_html(self.team_name);

        write!(
            f,
            r#"
    <h2>Interview Invitation</h2>
    <p>Dear {candidate},</p>
    <p>We are pleased to invite you for <strong>Round {round}</strong> of the interview process with <strong>{company}</strong>.</p>
    <p><strong>Interview Details:</strong></p>
    <ul>
      <li>Company: {company}</li>
      <li>Interviewer: {interviewer}</li>
      <li>Round: {round}</li>
    </ul>
    <p><a href="{link}" style="background: #667eea; color: white; padding: 12px 24px; text-decoration: none; border-radius: 8px; display: inline-block;">Schedule Interview</a></p>
    <p>Best regards,<br/>{team}</p>
  "#
        )
    }
}

/// Rendered email as shown in the preview dialog
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmailPreview {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub html: String,
}

/// Escape text for interpolation into HTML content or attribute values
pub fn escape_html(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
