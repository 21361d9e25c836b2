//! Endpoint paths, relative to the hub base URL

use urlencoding::encode;

/// `GET` the device directory
pub fn devices() -> String {
    "/devices/".to_string()
}

/// `GET` a single device's status
pub fn device(id: &str) -> String {
    format!("/devices/{}", encode(id))
}

/// `PUT` a command value, with an optional raw query string
pub fn command(id: &str, value: &str, query: Option<&str>) -> String {
    let path = format!("/devices/{}/{}", encode(id), encode(value));
    match query {
        Some(q) if !q.is_empty() => format!("{}?{}", path, q),
        _ => path,
    }
}
