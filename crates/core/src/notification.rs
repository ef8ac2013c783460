//! Failure notification message assembly.
//!
//! Builds the subject and HTML body for an audit failure email and
//! classifies the outcome of a batch send. Transport lives in the API crate.

use std::fmt::Write;

// ---------------------------------------------------------------------------
// Message content
// ---------------------------------------------------------------------------

/// Audit fields shown in a failure notification.
#[derive(Debug, Clone, Copy)]
pub struct FailureNotice<'a> {
    pub plant: &'a str,
    pub module: &'a str,
    pub purchase_order: &'a str,
    pub style: Option<&'a str>,
    pub defect_rate: f64,
    pub remarks: Option<&'a str>,
}

/// One defect row in the notification table.
#[derive(Debug, Clone, Copy)]
pub struct DefectLine<'a> {
    pub category: &'a str,
    pub code: &'a str,
    pub location: Option<&'a str>,
    pub quantity: i32,
}

const CELL: &str = "border: 1px solid #ddd; padding: 8px;";

pub fn subject(notice: &FailureNotice<'_>) -> String {
    format!(
        "FCA Failure Notification - {} - PO: {}",
        notice.plant, notice.purchase_order
    )
}

/// Render the HTML body. Every interpolated value is escaped.
pub fn html_body(notice: &FailureNotice<'_>, defects: &[DefectLine<'_>]) -> String {
    let mut html = String::with_capacity(2048);
    html.push_str("<html><body>\n<h2>FCA Failure Notification</h2>\n<h3>Form Details:</h3>\n");
    html.push_str("<table style=\"border-collapse: collapse; width: 100%;\">\n");

    let rate = format!("{:.2}%", notice.defect_rate);
    let details = [
        ("Plant", notice.plant),
        ("Module", notice.module),
        ("PO", notice.purchase_order),
        ("Style", notice.style.unwrap_or("")),
        ("Defect Rate", rate.as_str()),
    ];
    for (label, value) in details {
        let _ = writeln!(
            html,
            "<tr><td style=\"{CELL}\"><strong>{label}:</strong></td><td style=\"{CELL}\">{}</td></tr>",
            escape_html(value)
        );
    }
    html.push_str("</table>\n<h3>Defect Details:</h3>\n");
    html.push_str("<table style=\"border-collapse: collapse; width: 100%;\">\n<thead><tr>");
    for header in ["Category", "Code", "Location", "Quantity"] {
        let _ = write!(html, "<th style=\"{CELL}\">{header}</th>");
    }
    html.push_str("</tr></thead>\n<tbody>\n");

    for d in defects {
        let _ = writeln!(
            html,
            "<tr><td style=\"{CELL}\">{}</td><td style=\"{CELL}\">{}</td>\
             <td style=\"{CELL}\">{}</td><td style=\"{CELL}\">{}</td></tr>",
            escape_html(d.category),
            escape_html(d.code),
            escape_html(d.location.unwrap_or("")),
            d.quantity
        );
    }
    html.push_str("</tbody>\n</table>\n");

    let _ = writeln!(
        html,
        "<p><strong>Remarks:</strong> {}</p>",
        escape_html(notice.remarks.unwrap_or("N/A"))
    );
    html.push_str("</body></html>\n");
    html
}

/// Escape the five HTML-significant characters.
pub fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}

// ---------------------------------------------------------------------------
// Delivery outcome
// ---------------------------------------------------------------------------

/// Aggregate outcome of sending one message per recipient.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryStatus {
    /// Every recipient was sent to.
    Sent,
    /// Some sends failed, some succeeded.
    Partial,
    /// Every send failed.
    Failed,
    /// Nothing to send.
    NoRecipients,
}

impl DeliveryStatus {
    /// Classify a batch given the success flag of each send.
    pub fn from_results(successes: impl IntoIterator<Item = bool>) -> Self {
        let (mut ok, mut failed) = (0usize, 0usize);
        for s in successes {
            if s {
                ok += 1;
            } else {
                failed += 1;
            }
        }
        match (ok, failed) {
            (0, 0) => Self::NoRecipients,
            (_, 0) => Self::Sent,
            (0, _) => Self::Failed,
            _ => Self::Partial,
        }
    }

    /// Value stored in the `email_log.status` column.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Sent => "Sent",
            Self::Partial => "Partial",
            Self::Failed => "Failed",
            Self::NoRecipients => "NoRecipients",
        }
    }
}
