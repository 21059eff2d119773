//! ---
//! dsb_section: "03-wire-marshalling"
//! dsb_subsection: "module"
//! dsb_type: "source"
//! dsb_scope: "code"
//! dsb_description: "Type-tagged value marshalling and bus-name sanitisation."
//! dsb_version: "v0.1.0-dev"
//! dsb_owner: "tbd"
//! ---

/// Sanitise a model name for use as a bus object name segment.
///
/// Keeps ASCII alphanumerics and underscores, maps whitespace to `_`, and
/// drops everything else: `"Living Room Sensor #2"` becomes
/// `"Living_Room_Sensor_2"`.
pub fn bus_object_name(raw: &str) -> String {
    sanitize_keep_underscore(raw)
}

/// Sanitise a property, method, or signal name for the bus.
///
/// Same rule as [`bus_object_name`]; kept as a separate entry point because
/// member names and object names are distinct name classes on the bus.
pub fn member_name(raw: &str) -> String {
    sanitize_keep_underscore(raw)
}

/// Encode a string for use inside a top-level service name.
///
/// Only alphanumerics survive (underscores of the source are stripped); when
/// the first retained character is a digit an underscore is prepended, so
/// `"2Fast"` becomes `"_2Fast"`. Empty input stays empty.
pub fn service_name_segment(raw: &str) -> String {
    let kept: String = raw.chars().filter(|c| c.is_ascii_alphanumeric()).collect();
    if kept.is_empty() {
        return kept;
    }
    let mut encoded = String::with_capacity(kept.len() + 1);
    if kept.chars().next().is_some_and(|c| c.is_ascii_digit()) {
        encoded.push('_');
    }
    encoded.push_str(&kept);
    encoded
}

fn sanitize_keep_underscore(raw: &str) -> String {
    let mut built = String::with_capacity(raw.len());
    for c in raw.chars() {
        if c.is_ascii_alphanumeric() || c == '_' {
            built.push(c);
        } else if c.is_whitespace() {
            built.push('_');
        }
        // anything else is dropped
    }
    built
}
