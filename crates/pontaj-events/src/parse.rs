//! Wire-format parsing: multipart, JSON and XML event bodies.

use serde_json::{Map, Value};
use tracing::warn;

/// Extract the boundary parameter from a multipart content-type header.
pub fn extract_boundary(content_type: &str) -> Option<String> {
    content_type.split(';').map(str::trim).find_map(|part| {
        let lowered = part.to_ascii_lowercase();
        if !lowered.starts_with("boundary=") {
            return None;
        }
        let boundary = part["boundary=".len()..].trim_matches('"');
        Some(boundary.to_string())
    })
}

fn find_subslice(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.is_empty() || haystack.len() < needle.len() {
        return None;
    }
    haystack.windows(needle.len()).position(|w| w == needle)
}

fn split_bytes<'a>(haystack: &'a [u8], needle: &[u8]) -> Vec<&'a [u8]> {
    let mut parts = Vec::new();
    let mut rest = haystack;
    while let Some(index) = find_subslice(rest, needle) {
        parts.push(&rest[..index]);
        rest = &rest[index + needle.len()..];
    }
    parts.push(rest);
    parts
}

fn trim_ascii(bytes: &[u8]) -> &[u8] {
    let start = bytes
        .iter()
        .position(|b| !b.is_ascii_whitespace())
        .unwrap_or(bytes.len());
    let end = bytes
        .iter()
        .rposition(|b| !b.is_ascii_whitespace())
        .map_or(start, |i| i + 1);
    &bytes[start..end]
}

/// Parse a multipart body and return the JSON carried by its `event_log`
/// part, if any.
pub fn parse_multipart_event(body: &[u8], content_type: &str) -> Option<Value> {
    let Some(boundary) = extract_boundary(content_type) else {
        warn!("multipart request missing boundary");
        return None;
    };
    let delimiter = format!("--{boundary}");

    for raw_part in split_bytes(body, delimiter.as_bytes()) {
        let mut part = trim_ascii(raw_part);
        if part.is_empty() || part == b"--" {
            continue;
        }
        if part.ends_with(b"--") {
            part = &part[..part.len() - 2];
        }
        let Some(split_at) = find_subslice(part, b"\r\n\r\n") else {
            continue;
        };
        let (headers, content) = part.split_at(split_at);
        if find_subslice(headers, br#"name="event_log""#).is_none() {
            continue;
        }
        let payload = trim_ascii(&content[4..]);
        return match serde_json::from_slice(payload) {
            Ok(value) => Some(value),
            Err(err) => {
                warn!(error = %err, "multipart event_log JSON parse error");
                None
            }
        };
    }
    None
}

/// Parse an XML event body into a JSON value.
///
/// Only the `AccessControllerEvent` element matters downstream; its direct
/// children are collected as string fields, mirroring what the devices put
/// on the wire.
pub fn parse_xml_event(body: &[u8]) -> Option<Value> {
    use quick_xml::events::Event;
    use quick_xml::Reader;

    let text = String::from_utf8_lossy(body);
    let mut reader = Reader::from_str(&text);
    reader.config_mut().trim_text(true);

    let mut fields: Map<String, Value> = Map::new();
    let mut found = false;
    let mut depth_in_event: i32 = -1;
    let mut current_field: Option<String> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                let name = e.local_name();
                let name = std::str::from_utf8(name.as_ref()).unwrap_or("");
                if depth_in_event < 0 {
                    if name == "AccessControllerEvent" {
                        found = true;
                        depth_in_event = 0;
                    }
                } else {
                    depth_in_event += 1;
                    if depth_in_event == 1 {
                        current_field = Some(name.to_string());
                    }
                }
            }
            Ok(Event::Text(t)) => {
                if depth_in_event == 1 {
                    if let Some(field) = current_field.as_ref() {
                        let value = t.unescape().unwrap_or_default().to_string();
                        fields.insert(field.clone(), Value::String(value));
                    }
                }
            }
            Ok(Event::End(_)) => {
                if depth_in_event == 0 {
                    // Leaving AccessControllerEvent; one is enough.
                    break;
                }
                if depth_in_event > 0 {
                    if depth_in_event == 1 {
                        current_field = None;
                    }
                    depth_in_event -= 1;
                }
            }
            Ok(Event::Eof) => break,
            Err(err) => {
                warn!(error = %err, "XML parse error");
                return None;
            }
            _ => {}
        }
    }

    if !found {
        return None;
    }
    let mut root = Map::new();
    root.insert("AccessControllerEvent".to_string(), Value::Object(fields));
    Some(Value::Object(root))
}

/// Parse a request body based on its content type, falling back to a
/// leading-`<` sniff for devices that send XML without a content type.
pub fn parse_request_body(content_type: &str, body: &[u8]) -> Option<Value> {
    if content_type.contains("multipart/form-data") {
        return parse_multipart_event(body, content_type);
    }
    if content_type.contains("application/json") {
        return match serde_json::from_slice(body) {
            Ok(value) => Some(value),
            Err(err) => {
                warn!(error = %err, "JSON parse error");
                None
            }
        };
    }
    if content_type.contains("xml") || trim_ascii(body).starts_with(b"<") {
        return parse_xml_event(body);
    }
    None
}
