/// Integer parameter given as a JSON number or a numeric string.
pub fn param_i64(params: &serde_json::Value, key: &str) -> Option<i64> {
    match params.get(key)? {
        serde_json::Value::Number(n) => n.as_i64(),
        serde_json::Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    }
}

pub fn param_str<'a>(params: &'a serde_json::Value, key: &str) -> Option<&'a str> {
    params.get(key).and_then(|v| v.as_str())
}

pub fn param_path(params: &serde_json::Value, key: &str) -> Option<std::path::PathBuf> {
    param_str(params, key)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(std::path::PathBuf::from)
}
