use thiserror::Error;

#[derive(Error, Debug)]
pub enum ModelStoreError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration validation failed for '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Manifest {path}:{line}: cannot parse '{content}': {reason}")]
    ManifestParseError {
        path: String,
        line: usize,
        content: String,
        reason: String,
    },

    #[error("Failed to spawn '{program}': {source}")]
    SpawnError {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Example failed for framework={framework} backend={backend} (exit code {code:?})")]
    InvocationFailed {
        framework: String,
        backend: String,
        code: Option<i32>,
    },

    #[error("Bootstrap step '{step}' failed (exit code {code:?})")]
    StepFailed { step: String, code: Option<i32> },

    #[error("Model {domain}={model_id} does not exist")]
    ModelNotFound { domain: String, model_id: String },

    #[error("Model {domain}={model_id} has been deleted")]
    ModelDeleted { domain: String, model_id: String },

    #[error("Domain '{domain}' has no models")]
    DomainNotFound { domain: String },

    #[error("State '{state_name}' does not exist")]
    UnknownState { state_name: String },

    #[error("Cannot create state with name: '{state_name}'")]
    InvalidStateName { state_name: String },

    #[error("Storage error: {message}")]
    StorageError { message: String },
}

impl ModelStoreError {
    /// Process exit code a binary should terminate with for this error.
    /// Failed child processes propagate their own code.
    pub fn exit_code(&self) -> i32 {
        match self {
            ModelStoreError::InvocationFailed { code, .. }
            | ModelStoreError::StepFailed { code, .. } => match code {
                Some(code) if *code != 0 => *code,
                _ => 1,
            },
            ModelStoreError::ConfigError { .. }
            | ModelStoreError::ConfigValidationError { .. }
            | ModelStoreError::InvalidConfigValueError { .. }
            | ModelStoreError::ManifestParseError { .. } => 2,
            _ => 1,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            ModelStoreError::ConfigError { .. }
            | ModelStoreError::ConfigValidationError { .. }
            | ModelStoreError::InvalidConfigValueError { .. } => {
                "Check the configuration file and command line flags"
            }
            ModelStoreError::ManifestParseError { .. } => {
                "Each manifest line must look like 'name==1.2.3' with an optional '; marker'"
            }
            ModelStoreError::SpawnError { .. } => {
                "Make sure the program is installed and on the PATH"
            }
            ModelStoreError::InvocationFailed { .. } => {
                "Re-run the failing combination on its own to see the full output"
            }
            ModelStoreError::StepFailed { .. } => {
                "Fix the failing step and run the bootstrap again; it starts from a fresh environment"
            }
            ModelStoreError::UnknownState { .. } => {
                "Create the state first with 'modelstore create-state <name>'"
            }
            ModelStoreError::InvalidStateName { .. } => {
                "State names need at least 3 characters and no path separators"
            }
            ModelStoreError::ModelNotFound { .. }
            | ModelStoreError::DomainNotFound { .. }
            | ModelStoreError::ModelDeleted { .. } => {
                "Use 'modelstore list-models <domain>' to see the available models"
            }
            _ => "Re-run with --verbose for more detail",
        }
    }
}

pub type Result<T> = std::result::Result<T, ModelStoreError>;
