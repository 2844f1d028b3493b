//! Stage events: the audit trail of a pipeline run.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Severity of a stage event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventLevel {
    Info,
    Success,
    Warning,
    Error,
}

impl EventLevel {
    /// Prefix used when rendering to a terminal.
    pub fn symbol(&self) -> &'static str {
        match self {
            EventLevel::Info => "",
            EventLevel::Success => "✓",
            EventLevel::Warning => "⚠",
            EventLevel::Error => "✗",
        }
    }
}

/// Something a stage wants the user to see.
///
/// Events are observational only and never affect control flow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageEvent {
    pub level: EventLevel,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Map<String, Value>>,
    pub timestamp: DateTime<Utc>,
}

impl StageEvent {
    pub fn new(level: EventLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
            data: None,
            timestamp: Utc::now(),
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(EventLevel::Info, message)
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::new(EventLevel::Success, message)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(EventLevel::Warning, message)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(EventLevel::Error, message)
    }

    /// Attach a structured field.
    pub fn with_data(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.data
            .get_or_insert_with(Map::new)
            .insert(key.into(), value.into());
        self
    }
}

impl fmt::Display for StageEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.level.symbol() {
            "" => f.write_str(&self.message),
            symbol => write!(f, "{} {}", symbol, self.message),
        }
    }
}

/// Render events one per line.
pub fn render_events(events: &[StageEvent]) -> String {
    events
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render() {
        let events = vec![
            StageEvent::info("==> Initializing Terraform..."),
            StageEvent::success("[terraform] Initialized"),
            StageEvent::warning("Failed to retrieve outputs: boom"),
            StageEvent::error("[api] Build failed"),
        ];

        assert_eq!(
            render_events(&events),
            "==> Initializing Terraform...\n✓ [terraform] Initialized\n⚠ Failed to retrieve outputs: boom\n✗ [api] Build failed"
        );
    }

    #[test]
    fn test_with_data() {
        let event = StageEvent::success("Built")
            .with_data("function", "api")
            .with_data("size", 1024);

        let data = event.data.unwrap();
        assert_eq!(data["function"], "api");
        assert_eq!(data["size"], 1024);
    }

    #[test]
    fn test_serialization_levels() {
        let json = serde_json::to_value(StageEvent::warning("x")).unwrap();
        assert_eq!(json["level"], "warning");
        assert!(json.get("data").is_none());
    }
}
