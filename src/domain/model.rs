use serde::{Deserialize, Serialize};

/// Timestamp layout used in archive keys and state records.
pub const TIMESTAMP_FORMAT: &str = "%Y/%m/%d/%H:%M:%S";

/// Where an artifact archive lives, tagged by backend type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum StorageLocation {
    #[serde(rename = "file_system")]
    FileSystem { path: String },
    #[serde(rename = "aws:s3")]
    AwsS3 { bucket: String, prefix: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelInfo {
    pub domain: String,
    pub model_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_type: Option<String>,
}

/// Meta-data stored for every registered model version.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelMeta {
    pub model: ModelInfo,
    pub storage: StorageLocation,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<String>,
    /// Fields written by other clients are carried through untouched.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl ModelMeta {
    pub fn new(domain: &str, model_id: &str, storage: StorageLocation) -> Self {
        Self {
            model: ModelInfo {
                domain: domain.to_string(),
                model_id: model_id.to_string(),
                model_type: None,
            },
            storage,
            created: Some(chrono::Utc::now().format(TIMESTAMP_FORMAT).to_string()),
            extra: serde_json::Map::new(),
        }
    }

    pub fn with_model_type(mut self, model_type: Option<String>) -> Self {
        self.model.model_type = model_type;
        self
    }
}

/// The marker file written for each created model state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelState {
    pub created: String,
    pub state_name: String,
}

impl ModelState {
    pub fn new(state_name: &str) -> Self {
        Self {
            created: chrono::Utc::now().format(TIMESTAMP_FORMAT).to_string(),
            state_name: state_name.to_string(),
        }
    }
}

/// One `(framework, backend)` pair of the example matrix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Combination {
    pub framework: String,
    pub backend: String,
}

/// A fully resolved external command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub label: String,
    pub program: String,
    pub args: Vec<String>,
    pub working_directory: Option<String>,
}

impl Invocation {
    pub fn command_line(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Exit status of a finished child process. `code` is `None` when the
/// process was terminated by a signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Outcome {
    pub code: Option<i32>,
}

impl Outcome {
    pub fn success() -> Self {
        Self { code: Some(0) }
    }

    pub fn failure(code: i32) -> Self {
        Self { code: Some(code) }
    }

    pub fn is_success(&self) -> bool {
        self.code == Some(0)
    }
}
