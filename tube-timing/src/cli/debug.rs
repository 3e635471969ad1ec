//! `--debug` output: raw API payloads with credentials removed.

use std::path::Path;

use serde::Serialize;
use serde_json::Value;

use crate::tfl::CapturedPayload;

use super::CliError;

/// Written when `--debug` is given without a path.
pub const DEFAULT_DEBUG_PATH: &str = "tube-timing-debug.json";

const REDACTED: &str = "REDACTED";

/// Everything written to the debug file.
#[derive(Debug, Serialize)]
pub struct DebugReport {
    pub query: String,
    pub stop_id: String,
    pub station_name: String,
    pub departure_count: usize,
    pub payloads: Vec<CapturedPayload>,
}

/// Serialize `report` as pretty JSON to `path`, replacing every occurrence
/// of the given secrets and every `app_key=`/`app_id=` query value.
pub fn write_debug_file(
    path: &Path,
    report: &DebugReport,
    secrets: &[&str],
) -> Result<(), CliError> {
    let mut value = serde_json::to_value(report).map_err(|e| CliError::DebugOutput {
        path: path.to_path_buf(),
        source: e.into(),
    })?;
    redact(&mut value, secrets);

    let text = serde_json::to_string_pretty(&value).map_err(|e| CliError::DebugOutput {
        path: path.to_path_buf(),
        source: e.into(),
    })?;
    std::fs::write(path, text).map_err(|source| CliError::DebugOutput {
        path: path.to_path_buf(),
        source,
    })
}

/// Redact secrets in every string inside `value`.
pub fn redact(value: &mut Value, secrets: &[&str]) {
    match value {
        Value::String(text) => *text = redact_text(text, secrets),
        Value::Array(items) => items.iter_mut().for_each(|item| redact(item, secrets)),
        Value::Object(map) => map.values_mut().for_each(|item| redact(item, secrets)),
        Value::Null | Value::Bool(_) | Value::Number(_) => {}
    }
}

fn redact_text(text: &str, secrets: &[&str]) -> String {
    let mut text = text.to_string();
    for param in ["app_key=", "app_id="] {
        text = redact_param(&text, param);
    }
    for secret in secrets.iter().filter(|s| !s.is_empty()) {
        text = text.replace(secret, REDACTED);
    }
    text
}

/// Replace the value after each `param` up to the next `&` or whitespace.
fn redact_param(text: &str, param: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(pos) = rest.find(param) {
        let value_start = pos + param.len();
        out.push_str(&rest[..value_start]);
        let tail = &rest[value_start..];
        let value_len = tail
            .find(|c: char| c == '&' || c.is_whitespace())
            .unwrap_or(tail.len());
        if value_len > 0 {
            out.push_str(REDACTED);
        }
        rest = &tail[value_len..];
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn redacts_query_parameters() {
        assert_eq!(
            redact_text(
                "https://api.tfl.gov.uk/StopPoint/X/Arrivals?app_key=abc123&app_id=me",
                &[]
            ),
            "https://api.tfl.gov.uk/StopPoint/X/Arrivals?app_key=REDACTED&app_id=REDACTED"
        );
        assert_eq!(redact_text("app_key=", &[]), "app_key=");
    }

    #[test]
    fn redacts_raw_secrets_anywhere() {
        let mut value = json!({
            "payloads": [{"url": "x?app_key=secretkey1", "body": {"note": "key secretkey1 leaked"}}],
            "count": 3
        });
        redact(&mut value, &["secretkey1", ""]);
        assert_eq!(
            value,
            json!({
                "payloads": [{"url": "x?app_key=REDACTED", "body": {"note": "key REDACTED leaked"}}],
                "count": 3
            })
        );
    }

    #[test]
    fn writes_redacted_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("debug.json");
        let report = DebugReport {
            query: "Totteridge".into(),
            stop_id: "940GZZLUTAW".into(),
            station_name: "Totteridge & Whetstone Underground Station".into(),
            departure_count: 2,
            payloads: vec![CapturedPayload {
                label: "arrivals".into(),
                url: "https://api.tfl.gov.uk/StopPoint/940GZZLUTAW/Arrivals?app_key=k3y&app_id=myapp1".into(),
                status: 200,
                body: json!([]),
            }],
        };

        write_debug_file(&path, &report, &["k3y", "myapp1"]).unwrap();

        let written: Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written["departure_count"], 2);
        let url = written["payloads"][0]["url"].as_str().unwrap();
        assert!(!url.contains("k3y"));
        assert!(url.ends_with("app_key=REDACTED&app_id=REDACTED"));
    }

    #[test]
    fn unwritable_path_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("debug.json");
        let report = DebugReport {
            query: String::new(),
            stop_id: String::new(),
            station_name: String::new(),
            departure_count: 0,
            payloads: vec![],
        };
        let err = write_debug_file(&path, &report, &[]).unwrap_err();
        assert!(matches!(err, CliError::DebugOutput { .. }));
    }
}
