//! Deploy event types for progress reporting and NDJSON output

/// Deploy progress events, emitted through the orchestrator's callback.
///
/// With `--json` each event is printed as one NDJSON line; otherwise the
/// command renders them for humans.
#[derive(Debug, Clone, serde::Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum DeployEvent {
    RunStarted {
        source: String,
        target_root: String,
        targets: usize,
    },
    /// Target already matches the source; nothing written
    UpToDate {
        path: String,
    },
    Replaced {
        path: String,
    },
    ReplaceFailed {
        path: String,
        message: String,
        retryable: bool,
    },
    /// No matching target existed; the source was copied into the tree root
    FallbackCopy {
        destination: String,
    },
    RetryWait {
        pending: usize,
        interval_secs: u64,
    },
    RetryPass {
        pending: usize,
    },
    Cancelled {
        pending: usize,
    },
    RunComplete {
        total: usize,
        succeeded: usize,
        failed: usize,
    },
}

impl DeployEvent {
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_serialize_with_snake_case_tag() {
        let event = DeployEvent::UpToDate {
            path: "dir1/Main.accdb".to_string(),
        };
        let json = event.to_json();
        assert!(json.contains("\"event\":\"up_to_date\""));
        assert!(json.contains("dir1/Main.accdb"));
    }

    #[test]
    fn run_complete_carries_counts() {
        let event = DeployEvent::RunComplete {
            total: 3,
            succeeded: 2,
            failed: 1,
        };
        let json = event.to_json();
        assert!(json.contains("\"event\":\"run_complete\""));
        assert!(json.contains("\"total\":3"));
        assert!(json.contains("\"succeeded\":2"));
        assert!(json.contains("\"failed\":1"));
    }

    #[test]
    fn replace_failed_flags_retryability() {
        let event = DeployEvent::ReplaceFailed {
            path: "x".to_string(),
            message: "permission denied".to_string(),
            retryable: true,
        };
        assert!(event.to_json().contains("\"retryable\":true"));
    }
}
