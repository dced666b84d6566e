//! Normalization of HAL-style API responses into the flat shapes the tool
//! layer returns: `{items, pagination, success}` for lists and
//! `{item, success}` for single resources.

use serde_json::{Map, Value, json};

/// Extract the first embedded collection from a HAL list response.
///
/// PingOne nests list results under `_embedded` keyed by resource type
/// (`users`, `groups`, ...); the key varies per endpoint so the first array
/// value is taken.
pub fn embedded_items(body: &Value) -> Vec<Value> {
    body.get("_embedded")
        .and_then(Value::as_object)
        .and_then(|embedded| embedded.values().find_map(Value::as_array))
        .cloned()
        .unwrap_or_default()
}

/// `_links.next.href` when the server indicates another page.
pub fn next_page_url(body: &Value) -> Option<&str> {
    body.get("_links")?.get("next")?.get("href")?.as_str()
}

/// Summarize paging state from a HAL list body and the items extracted from
/// it.
pub fn pagination_info(body: &Value, item_count: usize) -> Value {
    json!({
        "count": body.get("count").and_then(Value::as_u64).unwrap_or(item_count as u64),
        "size": body.get("size").and_then(Value::as_u64).unwrap_or(item_count as u64),
        "has_next": next_page_url(body).is_some(),
    })
}

/// Flatten a HAL list body into `{items, pagination, success}`, optionally
/// projecting each item through [`filter_fields`].
pub fn normalize_list(body: &Value, fields: Option<&[String]>) -> Value {
    let items: Vec<Value> = embedded_items(body)
        .into_iter()
        .map(|item| normalize_item(&item, fields))
        .collect();
    let pagination = pagination_info(body, items.len());
    json!({
        "items": items,
        "pagination": pagination,
        "success": true,
    })
}

/// Flatten a single-resource body into `{item, success}`.
pub fn normalize_single(body: &Value, fields: Option<&[String]>) -> Value {
    json!({
        "item": normalize_item(body, fields),
        "success": true,
    })
}

fn normalize_item(item: &Value, fields: Option<&[String]>) -> Value {
    let stripped = strip_hal_keys(item);
    match fields {
        Some(fields) if !fields.is_empty() => filter_fields(&stripped, fields),
        _ => stripped,
    }
}

/// Drop HAL plumbing keys that carry no resource data.
fn strip_hal_keys(value: &Value) -> Value {
    match value.as_object() {
        Some(map) => Value::Object(
            map.iter()
                .filter(|(k, _)| k.as_str() != "_links" && k.as_str() != "_embedded")
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
        ),
        None => value.clone(),
    }
}

/// Project an object down to the named fields, supporting dot paths such as
/// `name.given` or `population.id`. Missing paths are silently omitted.
pub fn filter_fields(value: &Value, fields: &[String]) -> Value {
    let mut out = Map::new();
    for field in fields {
        if let Some(found) = lookup_path(value, field) {
            insert_path(&mut out, field, found.clone());
        }
    }
    Value::Object(out)
}

fn lookup_path<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.').try_fold(value, |v, seg| v.get(seg))
}

fn insert_path(out: &mut Map<String, Value>, path: &str, value: Value) {
    match path.split_once('.') {
        None => {
            out.insert(path.to_string(), value);
        }
        Some((head, rest)) => {
            let entry = out
                .entry(head.to_string())
                .or_insert_with(|| Value::Object(Map::new()));
            if let Value::Object(nested) = entry {
                insert_path(nested, rest, value);
            }
        }
    }
}

/// Structured fields from a PingOne error body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiErrorInfo {
    pub code: Option<String>,
    pub message: String,
    pub correlation_id: Option<String>,
}

/// Pull code/message/correlation id out of an error body, tolerating bodies
/// that are not JSON or lack the usual fields.
pub fn error_info(status: u16, body: &Value) -> ApiErrorInfo {
    let code = body
        .get("code")
        .and_then(Value::as_str)
        .map(str::to_string);
    let message = body
        .get("message")
        .and_then(Value::as_str)
        .map(str::to_string)
        .or_else(|| {
            body.get("details")
                .and_then(Value::as_array)
                .and_then(|d| d.first())
                .and_then(|d| d.get("message"))
                .and_then(Value::as_str)
                .map(str::to_string)
        })
        .unwrap_or_else(|| format!("request failed with status {status}"));
    let correlation_id = body
        .get("id")
        .and_then(Value::as_str)
        .map(str::to_string);
    ApiErrorInfo {
        code,
        message,
        correlation_id,
    }
}

/// Clamp a requested page size into `[1, max]`, falling back to the default
/// when absent.
pub fn clamp_page_size(requested: Option<u32>, default: u32, max: u32) -> u32 {
    requested.unwrap_or(default).clamp(1, max)
}
