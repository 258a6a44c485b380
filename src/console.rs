use geoloc_core::usecases::{progress_percent, BatchEvent, QuotaStatus};

/// Commands that are read from stdin while a job is running.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserCommand {
    Continue,
    Cancel,
}

impl UserCommand {
    pub fn parse(input: &str) -> Option<Self> {
        match input.trim().to_lowercase().as_str() {
            "c" | "continue" => Some(Self::Continue),
            "q" | "cancel" => Some(Self::Cancel),
            _ => None,
        }
    }
}

pub fn quota_status_lines(status: &QuotaStatus) -> Vec<String> {
    let mut lines = Vec::with_capacity(4);
    if !status.has_api_key {
        lines.push(
            "No API key found. You need an OpenCage API key to use the geocoder.".to_string(),
        );
        lines.push(
            "Run `geolocator api-key <KEY>` or set OPENCAGE_API_KEY to configure it.".to_string(),
        );
    }
    lines.push(usage_line(status.used, status.remaining));
    lines.push(format!("API key resets in: {} (UTC).", status.reset_in));
    lines
}

fn usage_line(used: u32, remaining: u32) -> String {
    format!("API usage: {used} used, {remaining} remaining for today.")
}

/// Render a batch event as lines of the status log.
pub fn status_lines(event: &BatchEvent) -> Vec<String> {
    match event {
        BatchEvent::Started {
            total,
            estimated,
            used,
            remaining,
            reset_in,
        } => {
            let secs = estimated.as_secs();
            vec![
                format!("File loaded successfully! {total} addresses found."),
                format!(
                    "Estimated completion time: {secs} seconds (~{} mins).",
                    secs / 60
                ),
                usage_line(*used, *remaining),
                format!("API key resets in: {reset_in} (UTC)."),
            ]
        }
        BatchEvent::Geocoded { address, .. } => vec![format!("Geocoded: {address}")],
        BatchEvent::NotFound { address, .. } => vec![format!("Address not found: {address}")],
        BatchEvent::LookupFailed {
            address, reason, ..
        } => vec![format!("Error geocoding '{address}': {reason}")],
        BatchEvent::MissingAddress { row } => {
            vec![format!("Row {} has no address, skipped.", row + 1)]
        }
        BatchEvent::FirstRowFailed { .. } => vec![
            "The first address could not be geocoded.".to_string(),
            "Please fix the file and type 'q' to cancel, or type 'c' to proceed with the rest."
                .to_string(),
        ],
        BatchEvent::Resumed => vec!["Continuing with the remaining addresses.".to_string()],
        BatchEvent::Progress { processed, total } => vec![format!(
            "Progress: {processed}/{total} ({:.0}%)",
            progress_percent(*processed, *total)
        )],
        BatchEvent::QuotaLimitReached { used, limit } => vec![format!(
            "Daily limit of {limit} requests reached ({used} used). \
             Further requests may be rejected by OpenCage."
        )],
        BatchEvent::QuotaExhausted { limit } => vec![format!(
            "Daily limit of {limit} requests reached. No further requests are sent today."
        )],
        BatchEvent::Cancelled => vec!["Geocoding cancelled.".to_string()],
        BatchEvent::Completed { rows, resolved } => {
            vec![format!("{resolved} of {rows} addresses geocoded.")]
        }
    }
}
