//! Timestamp helper tools for building audit filters. No API calls; output
//! is ISO 8601 with a `Z` suffix and no sub-second precision, which is what
//! the activities endpoint accepts.

use chrono::{DateTime, Datelike, Duration, Timelike, Utc};
use serde_json::{Value, json};

use super::{ToolError, opt_str, require_str};

const PINGONE_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

fn format_timestamp(time: DateTime<Utc>) -> String {
    time.format(PINGONE_TIME_FORMAT).to_string()
}

/// `get_current_time`: the current UTC time, shifted by `buffer_hours`.
pub fn get_current_time(args: &Value) -> Result<Value, ToolError> {
    let buffer_hours = args
        .get("buffer_hours")
        .and_then(Value::as_i64)
        .unwrap_or(0);
    let time = Duration::try_hours(buffer_hours)
        .and_then(|delta| Utc::now().checked_add_signed(delta))
        .ok_or_else(|| {
            ToolError::new(format!(
                "buffer_hours {buffer_hours} is out of range for a timestamp offset"
            ))
        })?;
    let formatted = format_timestamp(time);

    Ok(json!({
        "success": true,
        "timestamp": formatted,
        "timezone": "UTC",
        "buffer_applied_hours": buffer_hours,
        "usage_examples": [
            format!("recordedat gt \"{formatted}\""),
            format!("createdAt gt \"{formatted}\""),
            format!("updatedAt lt \"{formatted}\"")
        ]
    }))
}

/// `parse_relative_time`: convert a natural language expression into a
/// timestamp.
pub fn parse_relative_time(args: &Value) -> Result<Value, ToolError> {
    let expression = require_str(args, "time_expression")?;
    let time = parse_expression(expression, Utc::now())?;
    let formatted = format_timestamp(time);

    Ok(json!({
        "success": true,
        "original_expression": expression,
        "timestamp": formatted,
        "timezone": "UTC",
        "parsed_datetime": {
            "year": time.year(),
            "month": time.month(),
            "day": time.day(),
            "hour": time.hour(),
            "minute": time.minute(),
            "second": time.second()
        },
        "usage_examples": [
            format!("recordedat gt \"{formatted}\""),
            format!("createdAt lt \"{formatted}\"")
        ]
    }))
}

/// `create_date_range`: two expressions in, a ready-made `recordedat` SCIM
/// filter out.
pub fn create_date_range(args: &Value) -> Result<Value, ToolError> {
    let start_expression = require_str(args, "start_expression")?;
    let end_expression = opt_str(args, "end_expression").unwrap_or("now");

    let now = Utc::now();
    let start = parse_expression(start_expression, now)?;
    let end = parse_expression(end_expression, now)?;

    if start >= end {
        return Err(ToolError::new(format!(
            "start time ({}) must be before end time ({})",
            format_timestamp(start),
            format_timestamp(end)
        )));
    }

    let start_formatted = format_timestamp(start);
    let end_formatted = format_timestamp(end);
    let scim_filter =
        format!("recordedat gt \"{start_formatted}\" and recordedat lt \"{end_formatted}\"");
    let duration = end - start;

    Ok(json!({
        "success": true,
        "start_time": start_formatted,
        "end_time": end_formatted,
        "scim_filter": scim_filter,
        "duration": {
            "total_seconds": duration.num_seconds(),
            "hours": duration.num_seconds() as f64 / 3600.0,
            "days": duration.num_days()
        },
        "expressions": {
            "start": start_expression,
            "end": end_expression
        },
        "usage_examples": [
            format!("Use in audit activities: filter_by='{scim_filter}'")
        ]
    }))
}

/// Parse a relative time expression against `now`.
///
/// Supported: `now`, `today`, `yesterday`, `this week`, `last week`,
/// `last month`, and `N <unit>(s) ago` where unit is seconds through months.
/// Months are treated as 30 days for filter purposes.
fn parse_expression(expression: &str, now: DateTime<Utc>) -> Result<DateTime<Utc>, ToolError> {
    let lowered = expression.trim().to_lowercase();

    let midnight = |t: DateTime<Utc>| {
        t.with_hour(0)
            .and_then(|t| t.with_minute(0))
            .and_then(|t| t.with_second(0))
            .and_then(|t| t.with_nanosecond(0))
            .unwrap_or(t)
    };

    match lowered.as_str() {
        "now" => return Ok(now),
        "today" => return Ok(midnight(now)),
        "yesterday" => return Ok(midnight(now) - Duration::days(1)),
        "this week" => {
            let days = now.weekday().num_days_from_monday() as i64;
            return Ok(midnight(now) - Duration::days(days));
        }
        "last week" => {
            let days = now.weekday().num_days_from_monday() as i64;
            return Ok(midnight(now) - Duration::days(days + 7));
        }
        "last month" => return Ok(midnight(now) - Duration::days(30)),
        _ => {}
    }

    if let Some(rest) = lowered.strip_suffix(" ago") {
        let mut parts = rest.split_whitespace();
        let amount: i64 = parts
            .next()
            .and_then(|n| n.parse().ok())
            .ok_or_else(|| unparseable(expression))?;
        let unit = parts.next().ok_or_else(|| unparseable(expression))?;
        if parts.next().is_some() {
            return Err(unparseable(expression));
        }

        let delta = match unit.trim_end_matches('s') {
            "second" => Duration::try_seconds(amount),
            "minute" => Duration::try_minutes(amount),
            "hour" => Duration::try_hours(amount),
            "day" => Duration::try_days(amount),
            "week" => Duration::try_weeks(amount),
            "month" => amount.checked_mul(30).and_then(Duration::try_days),
            _ => return Err(unparseable(expression)),
        };
        return delta
            .and_then(|delta| now.checked_sub_signed(delta))
            .ok_or_else(|| unparseable(expression));
    }

    Err(unparseable(expression))
}

fn unparseable(expression: &str) -> ToolError {
    ToolError::new(format!(
        "could not parse time expression: '{expression}'. Try expressions like \
         '2 days ago', 'yesterday', '1 week ago', or '30 minutes ago'"
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn fixed_now() -> DateTime<Utc> {
        // A Saturday, mid-afternoon.
        Utc.with_ymd_and_hms(2024, 6, 22, 15, 30, 45).unwrap()
    }

    #[test]
    fn test_parse_fixed_keywords() {
        let now = fixed_now();
        assert_eq!(parse_expression("now", now).unwrap(), now);
        assert_eq!(
            parse_expression("today", now).unwrap(),
            Utc.with_ymd_and_hms(2024, 6, 22, 0, 0, 0).unwrap()
        );
        assert_eq!(
            parse_expression("Yesterday", now).unwrap(),
            Utc.with_ymd_and_hms(2024, 6, 21, 0, 0, 0).unwrap()
        );
        // Monday of the current week.
        assert_eq!(
            parse_expression("this week", now).unwrap(),
            Utc.with_ymd_and_hms(2024, 6, 17, 0, 0, 0).unwrap()
        );
        assert_eq!(
            parse_expression("last week", now).unwrap(),
            Utc.with_ymd_and_hms(2024, 6, 10, 0, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_parse_n_units_ago() {
        let now = fixed_now();
        assert_eq!(
            parse_expression("30 minutes ago", now).unwrap(),
            now - Duration::minutes(30)
        );
        assert_eq!(
            parse_expression("1 hour ago", now).unwrap(),
            now - Duration::hours(1)
        );
        assert_eq!(
            parse_expression("2 days ago", now).unwrap(),
            now - Duration::days(2)
        );
        assert_eq!(
            parse_expression("1 week ago", now).unwrap(),
            now - Duration::weeks(1)
        );
        assert_eq!(
            parse_expression("3 months ago", now).unwrap(),
            now - Duration::days(90)
        );
    }

    #[test]
    fn test_parse_rejects_garbage() {
        let now = fixed_now();
        assert!(parse_expression("whenever", now).is_err());
        assert!(parse_expression("five days ago", now).is_err());
        assert!(parse_expression("2 fortnights ago", now).is_err());
        assert!(parse_expression("", now).is_err());
    }

    #[test]
    fn test_parse_rejects_out_of_range_amounts() {
        let now = fixed_now();
        assert!(parse_expression("9223372036854775807 days ago", now).is_err());
        assert!(parse_expression("9223372036854775807 seconds ago", now).is_err());
        // 30x multiplier for months must not overflow either.
        assert!(parse_expression("400000000000000000 months ago", now).is_err());
        assert!(parse_expression("-9223372036854775808 weeks ago", now).is_err());
    }

    #[test]
    fn test_get_current_time_rejects_out_of_range_buffer() {
        let err = get_current_time(&json!({"buffer_hours": i64::MAX})).unwrap_err();
        assert!(err.message.contains("out of range"));
        assert!(get_current_time(&json!({"buffer_hours": i64::MIN})).is_err());
    }

    #[test]
    fn test_timestamp_format_has_no_subseconds() {
        let formatted = format_timestamp(fixed_now());
        assert_eq!(formatted, "2024-06-22T15:30:45Z");
    }

    #[test]
    fn test_create_date_range_filter_shape() {
        let out = create_date_range(&json!({"start_expression": "1 week ago"})).unwrap();
        let filter = out["scim_filter"].as_str().unwrap();
        assert!(filter.starts_with("recordedat gt \""));
        assert!(filter.contains("\" and recordedat lt \""));
        assert_eq!(out["duration"]["days"], 7);
        assert_eq!(out["expressions"]["end"], "now");
    }

    #[test]
    fn test_create_date_range_rejects_inverted_range() {
        let err = create_date_range(
            &json!({"start_expression": "now", "end_expression": "1 week ago"}),
        )
        .unwrap_err();
        assert!(err.message.contains("must be before"));
    }

    #[test]
    fn test_get_current_time_buffer() {
        let out = get_current_time(&json!({"buffer_hours": -24})).unwrap();
        assert_eq!(out["buffer_applied_hours"], -24);
        assert_eq!(out["timezone"], "UTC");
        let ts = out["timestamp"].as_str().unwrap();
        assert!(ts.ends_with('Z'));
        assert_eq!(ts.len(), 20);
    }
}
