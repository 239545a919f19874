use axum::http::HeaderMap;

pub const UNKNOWN_CLIENT: &str = "unknown";

// First X-Forwarded-For hop, then X-Real-IP, then a shared sentinel.
// Spoofable unless a proxy in front rewrites both headers.
pub fn client_identifier(headers: &HeaderMap) -> String {
    header_value(headers, "x-forwarded-for")
        .and_then(|chain| chain.split(',').next())
        .map(str::trim)
        .filter(|ip| !ip.is_empty())
        .or_else(|| header_value(headers, "x-real-ip").map(str::trim).filter(|ip| !ip.is_empty()))
        .unwrap_or(UNKNOWN_CLIENT)
        .to_string()
}

fn header_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}
