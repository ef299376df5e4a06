const REDACTED: &str = "[REDACTED]";
const SECRET_PARAMS: [&str; 2] = ["key", "api_key"];

/// Masks secret query parameters so a request target can be logged.
pub fn redact_query(path_and_query: &str) -> String {
    let Some((path, query)) = path_and_query.split_once('?') else {
        return path_and_query.to_string();
    };

    let redacted: Vec<String> = query
        .split('&')
        .map(|pair| match pair.split_once('=') {
            Some((name, _)) if SECRET_PARAMS.contains(&name) => format!("{}={}", name, REDACTED),
            _ => pair.to_string(),
        })
        .collect();

    format!("{}?{}", path, redacted.join("&"))
}
