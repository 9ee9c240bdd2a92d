//! Access-control event detection.

use serde_json::{Map, Value};

/// Major event type of access-controller notifications.
pub const ACCESS_MAJOR_EVENT_TYPE: i64 = 5;

/// Sub event types we care about: access granted (75) and denied (76).
pub const ACCESS_SUB_EVENT_TYPES: [i64; 2] = [75, 76];

/// Pull the `AccessControllerEvent` object out of a parsed body.
#[must_use]
pub fn extract_access_event(parsed: &Value) -> Option<&Map<String, Value>> {
    parsed.get("AccessControllerEvent")?.as_object()
}

/// Event fields arrive as numbers from JSON bodies and as strings from XML.
fn event_int(event: &Map<String, Value>, key: &str) -> Option<i64> {
    match event.get(key)? {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Whether the parsed body is an access-control event (major 5, sub 75/76).
#[must_use]
pub fn is_access_event(parsed: &Value) -> bool {
    let Some(event) = extract_access_event(parsed) else {
        return false;
    };
    let (Some(major), Some(sub)) = (
        event_int(event, "majorEventType"),
        event_int(event, "subEventType"),
    ) else {
        return false;
    };
    major == ACCESS_MAJOR_EVENT_TYPE && ACCESS_SUB_EVENT_TYPES.contains(&sub)
}
