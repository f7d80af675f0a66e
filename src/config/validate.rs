//! Configuration validation with unknown field detection.

use serde_json::{Map, Value};
use std::collections::HashSet;

use crate::hardware::validate_serial_path;

/// Known top-level config field names.
const KNOWN_TOP_LEVEL: &[&str] = &["serial", "server", "agent", "provider", "logging"];

/// Known fields for each section. Nested as section.field.
const KNOWN_SERIAL: &[&str] = &[
    "port",
    "baud_rate",
    "settle",
    "command_timeout_secs",
    "refresh_illumination_with_temp_humidity",
];

const KNOWN_SETTLE: &[&str] = &["sensor_ms", "actuator_ms", "display_ms"];

const KNOWN_SERVER: &[&str] = &["host", "port"];

const KNOWN_AGENT: &[&str] = &[
    "api_base_url",
    "primary_model",
    "secondary_model",
    "request_timeout_secs",
    "system_prompt",
];

const KNOWN_PROVIDER: &[&str] = &["api_key", "api_base"];

const KNOWN_LOGGING: &[&str] = &["format", "file", "level"];

/// A validation diagnostic.
#[derive(Debug)]
pub struct Diagnostic {
    pub level: DiagnosticLevel,
    pub path: String,
    pub message: String,
}

#[derive(Debug, PartialEq)]
pub enum DiagnosticLevel {
    Ok,
    Warn,
    Error,
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let prefix = match self.level {
            DiagnosticLevel::Ok => "[OK]",
            DiagnosticLevel::Warn => "[WARN]",
            DiagnosticLevel::Error => "[ERROR]",
        };
        if self.path.is_empty() {
            write!(f, "{} {}", prefix, self.message)
        } else {
            write!(f, "{} {}: {}", prefix, self.path, self.message)
        }
    }
}

/// Simple Levenshtein distance for "did you mean?" suggestions.
pub fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let mut matrix = vec![vec![0usize; b.len() + 1]; a.len() + 1];

    for (i, row) in matrix.iter_mut().enumerate() {
        row[0] = i;
    }
    for (j, val) in matrix[0].iter_mut().enumerate() {
        *val = j;
    }

    for (i, ca) in a.iter().enumerate() {
        for (j, cb) in b.iter().enumerate() {
            let cost = if ca == cb { 0 } else { 1 };
            matrix[i + 1][j + 1] = std::cmp::min(
                std::cmp::min(matrix[i][j + 1] + 1, matrix[i + 1][j] + 1),
                matrix[i][j] + cost,
            );
        }
    }
    matrix[a.len()][b.len()]
}

/// Suggest the closest known field name (if distance <= 3).
pub fn suggest_field(unknown: &str, known: &[&str]) -> Option<String> {
    known
        .iter()
        .map(|k| (k, levenshtein(unknown, k)))
        .filter(|(_, d)| *d <= 3)
        .min_by_key(|(_, d)| *d)
        .map(|(k, _)| format!("did you mean '{}'?", k))
}

/// Report every key of `obj` missing from `known`. Returns true if any was found.
fn check_keys(
    obj: &Map<String, Value>,
    known: &[&str],
    prefix: &str,
    diagnostics: &mut Vec<Diagnostic>,
) -> bool {
    let known_set: HashSet<&str> = known.iter().copied().collect();
    let mut has_unknown = false;
    for key in obj.keys() {
        if known_set.contains(key.as_str()) {
            continue;
        }
        has_unknown = true;
        let msg = match suggest_field(key, known) {
            Some(suggestion) => format!("Unknown field '{}': {}", key, suggestion),
            None => format!("Unknown field '{}'", key),
        };
        let path = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{}.{}", prefix, key)
        };
        diagnostics.push(Diagnostic {
            level: DiagnosticLevel::Error,
            path,
            message: msg,
        });
    }
    has_unknown
}

/// Validate a raw JSON config value against known field names.
pub fn validate_config(raw: &Value) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();

    let obj = match raw.as_object() {
        Some(o) => o,
        None => {
            diagnostics.push(Diagnostic {
                level: DiagnosticLevel::Error,
                path: String::new(),
                message: "Config must be a JSON object".to_string(),
            });
            return diagnostics;
        }
    };

    diagnostics.push(Diagnostic {
        level: DiagnosticLevel::Ok,
        path: String::new(),
        message: "Valid JSON".to_string(),
    });

    let mut has_unknown = check_keys(obj, KNOWN_TOP_LEVEL, "", &mut diagnostics);

    let sections: &[(&str, &[&str])] = &[
        ("serial", KNOWN_SERIAL),
        ("server", KNOWN_SERVER),
        ("agent", KNOWN_AGENT),
        ("provider", KNOWN_PROVIDER),
        ("logging", KNOWN_LOGGING),
    ];
    for (name, known) in sections {
        if let Some(section) = obj.get(*name).and_then(|v| v.as_object()) {
            has_unknown |= check_keys(section, known, name, &mut diagnostics);
        }
    }

    let serial = obj.get("serial").and_then(|v| v.as_object());
    if let Some(settle) = serial
        .and_then(|s| s.get("settle"))
        .and_then(|v| v.as_object())
    {
        has_unknown |= check_keys(settle, KNOWN_SETTLE, "serial.settle", &mut diagnostics);
    }

    if !has_unknown {
        diagnostics.push(Diagnostic {
            level: DiagnosticLevel::Ok,
            path: String::new(),
            message: "All fields recognized".to_string(),
        });
    }

    // Value checks
    if let Some(port) = serial.and_then(|s| s.get("port")).and_then(|v| v.as_str()) {
        if let Err(e) = validate_serial_path(port) {
            diagnostics.push(Diagnostic {
                level: DiagnosticLevel::Error,
                path: "serial.port".to_string(),
                message: e.to_string(),
            });
        }
    }

    if serial
        .and_then(|s| s.get("command_timeout_secs"))
        .and_then(|v| v.as_u64())
        == Some(0)
    {
        diagnostics.push(Diagnostic {
            level: DiagnosticLevel::Warn,
            path: "serial.command_timeout_secs".to_string(),
            message: "Zero timeout fails every send".to_string(),
        });
    }

    if let Some(key) = obj
        .get("provider")
        .and_then(|p| p.get("api_key"))
        .and_then(|v| v.as_str())
    {
        if key.trim().is_empty() {
            diagnostics.push(Diagnostic {
                level: DiagnosticLevel::Warn,
                path: "provider.api_key".to_string(),
                message: "Empty; the agent command will prompt for a key".to_string(),
            });
        }
    }

    diagnostics
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_levenshtein_identical() {
        assert_eq!(levenshtein("hello", "hello"), 0);
    }

    #[test]
    fn test_levenshtein_one_edit() {
        assert_eq!(levenshtein("hello", "helo"), 1);
    }

    #[test]
    fn test_levenshtein_different() {
        assert!(levenshtein("hello", "world") > 3);
    }

    #[test]
    fn test_suggest_field_match() {
        let result = suggest_field("serail", KNOWN_TOP_LEVEL);
        assert!(result.unwrap().contains("serial"));
    }

    #[test]
    fn test_suggest_field_no_match() {
        assert!(suggest_field("xyzabcdef", KNOWN_TOP_LEVEL).is_none());
    }

    #[test]
    fn test_validate_valid_config() {
        let raw = json!({
            "serial": {"port": "/dev/ttyUSB0", "settle": {"sensor_ms": 1500}},
            "server": {"port": 8080},
            "agent": {"primary_model": "gpt-4o"}
        });
        let diags = validate_config(&raw);
        assert!(diags.iter().all(|d| d.level != DiagnosticLevel::Error));
        assert!(diags
            .iter()
            .any(|d| d.message == "All fields recognized"));
    }

    #[test]
    fn test_validate_unknown_top_level() {
        let raw = json!({"sever": {}});
        let diags = validate_config(&raw);
        let err = diags
            .iter()
            .find(|d| d.level == DiagnosticLevel::Error)
            .unwrap();
        assert_eq!(err.path, "sever");
        assert!(err.message.contains("did you mean 'server'?"));
    }

    #[test]
    fn test_validate_unknown_nested_field() {
        let raw = json!({"serial": {"settle": {"sensor_msec": 10}}});
        let diags = validate_config(&raw);
        assert!(diags
            .iter()
            .any(|d| d.level == DiagnosticLevel::Error && d.path == "serial.settle.sensor_msec"));
    }

    #[test]
    fn test_validate_rejects_bad_serial_path() {
        let raw = json!({"serial": {"port": "/etc/passwd"}});
        let diags = validate_config(&raw);
        assert!(diags
            .iter()
            .any(|d| d.level == DiagnosticLevel::Error && d.path == "serial.port"));
    }

    #[test]
    fn test_validate_warns_on_zero_timeout() {
        let raw = json!({"serial": {"command_timeout_secs": 0}});
        let diags = validate_config(&raw);
        assert!(diags.iter().any(|d| d.level == DiagnosticLevel::Warn));
    }

    #[test]
    fn test_validate_not_an_object() {
        let raw = json!("not an object");
        let diags = validate_config(&raw);
        assert!(diags.iter().any(|d| {
            d.level == DiagnosticLevel::Error && d.message.contains("must be a JSON object")
        }));
    }

    #[test]
    fn test_diagnostic_display() {
        let d = Diagnostic {
            level: DiagnosticLevel::Warn,
            path: "provider.api_key".into(),
            message: "Empty".into(),
        };
        assert_eq!(d.to_string(), "[WARN] provider.api_key: Empty");
    }
}
