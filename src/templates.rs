//! Tera templates for the status card.
//!
//! The templates and stylesheet are compiled into the binary instead of being
//! loaded from a themes directory: the service renders a single card, so
//! shipping it as one self-contained executable outweighs theme overrides.

use chrono::{DateTime, Utc};
use tera::Tera;

use crate::error::AppError;

/// Seconds in a minute
const SECONDS_PER_MINUTE: i64 = 60;
/// Seconds in an hour
const SECONDS_PER_HOUR: i64 = 3600;
/// Seconds in a day
const SECONDS_PER_DAY: i64 = 86400;

/// Templates compiled into the binary so the service has no runtime assets
const TEMPLATES: [(&str, &str); 2] = [
    ("base.html", include_str!("../templates/base.html")),
    ("status.html", include_str!("../templates/status.html")),
];

/// Stylesheet served at /static/style.css
pub const STYLESHEET: &str = include_str!("../templates/style.css");

/// Initialize the Tera template engine
pub fn init_templates() -> Result<Tera, AppError> {
    let mut tera = Tera::default();
    tera.add_raw_templates(TEMPLATES.to_vec())?;

    tera.register_filter("timeago", timeago_filter);

    Ok(tera)
}

/// Convert an RFC 3339 timestamp to a relative time (e.g., "12 seconds ago")
fn timeago_filter(
    value: &tera::Value,
    _args: &std::collections::HashMap<String, tera::Value>,
) -> tera::Result<tera::Value> {
    let date_str = value
        .as_str()
        .ok_or_else(|| tera::Error::msg("timeago filter expects a string"))?;

    match DateTime::parse_from_rfc3339(date_str) {
        Ok(date) => {
            let seconds = Utc::now()
                .signed_duration_since(date.with_timezone(&Utc))
                .num_seconds();
            Ok(tera::Value::String(relative(seconds)))
        }
        // Unparseable input is shown as-is
        Err(_) => Ok(tera::Value::String(date_str.to_string())),
    }
}

fn relative(seconds: i64) -> String {
    let (count, unit) = if seconds < 0 {
        return "in the future".to_string();
    } else if seconds < 1 {
        return "just now".to_string();
    } else if seconds < SECONDS_PER_MINUTE {
        (seconds, "second")
    } else if seconds < SECONDS_PER_HOUR {
        (seconds / SECONDS_PER_MINUTE, "minute")
    } else if seconds < SECONDS_PER_DAY {
        (seconds / SECONDS_PER_HOUR, "hour")
    } else {
        (seconds / SECONDS_PER_DAY, "day")
    };

    if count == 1 {
        format!("1 {} ago", unit)
    } else {
        format!("{} {}s ago", count, unit)
    }
}
