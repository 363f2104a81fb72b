use serde::{Deserialize, Serialize};

/// Progress message type
#[derive(Debug, Deserialize, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum ProgressType {
    Start,
    Progress,
    Complete,
    Error,
}

/// Progress of a batch run, emitted once before the first item and once after every item
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Progress {
    /// Progress type (start, progress, complete, error)
    pub progress_type: ProgressType,
    /// Number of attempted items, successful or not
    pub completed_tasks: usize,
    /// Total number of items in the batch snapshot
    pub total_tasks: usize,
    /// Progress percentage (0-100)
    pub progress_percentage: usize,
    /// Current status message
    pub status: String,
    /// Source file name of the item this event reports on
    #[serde(default)]
    pub file_name: Option<String>,
    /// Error message when the item failed
    #[serde(default)]
    pub error: Option<String>,
    /// Optional additional metadata
    #[serde(default)]
    pub metadata: Option<serde_json::Value>,
}

impl Progress {
    /// Create a new Progress instance with basic information
    pub fn new(
        progress_type: ProgressType,
        completed_tasks: usize,
        total_tasks: usize,
        status: &str,
    ) -> Self {
        let progress_percentage = if total_tasks > 0 {
            (completed_tasks * 100) / total_tasks
        } else {
            0
        };

        Self {
            progress_type,
            completed_tasks,
            total_tasks,
            progress_percentage,
            status: status.to_string(),
            file_name: None,
            error: None,
            metadata: None,
        }
    }

    pub fn with_file_name(mut self, file_name: impl Into<String>) -> Self {
        self.file_name = Some(file_name.into());
        self
    }

    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self
    }

    pub fn with_metadata(mut self, metadata: serde_json::Value) -> Self {
        self.metadata = Some(metadata);
        self
    }

    /// Completed share of the batch in [0, 1]
    pub fn fraction(&self) -> f64 {
        if self.total_tasks == 0 {
            0.0
        } else {
            self.completed_tasks as f64 / self.total_tasks as f64
        }
    }

    pub fn is_finished(&self) -> bool {
        self.total_tasks > 0 && self.completed_tasks == self.total_tasks
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percentage_is_floored() {
        let progress = Progress::new(ProgressType::Progress, 1, 3, "processing");
        assert_eq!(progress.progress_percentage, 33);
        assert!(!progress.is_finished());

        let done = Progress::new(ProgressType::Complete, 3, 3, "complete");
        assert_eq!(done.progress_percentage, 100);
        assert_eq!(done.fraction(), 1.0);
        assert!(done.is_finished());
    }

    #[test]
    fn serializes_camel_case() {
        let progress = Progress::new(ProgressType::Error, 2, 4, "error")
            .with_file_name("b.png")
            .with_error("Decode error: bad header");
        let json = serde_json::to_value(&progress).unwrap();
        assert_eq!(json["progressType"], "error");
        assert_eq!(json["progressPercentage"], 50);
        assert_eq!(json["fileName"], "b.png");
    }
}
