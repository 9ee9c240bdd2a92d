//! Parsing for the event bodies access terminals push to the bridge.
//!
//! Terminals deliver notifications as `multipart/form-data` (with the JSON
//! in a part named `event_log`), as plain JSON, or as XML, depending on
//! model and firmware. Whatever the wire shape, the result is normalized to
//! a JSON value so detection and forwarding never branch on the transport.

pub mod event;
pub mod parse;

pub use event::{
    extract_access_event, is_access_event, ACCESS_MAJOR_EVENT_TYPE, ACCESS_SUB_EVENT_TYPES,
};
pub use parse::{extract_boundary, parse_multipart_event, parse_request_body, parse_xml_event};
