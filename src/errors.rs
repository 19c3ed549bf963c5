use thiserror::Error;

#[derive(Debug, Error)]
pub enum PopSentryError {
    #[error("Configuration error: {0}")]
    Config(String),

    /// The hierarchy document could not be obtained (URL or local file).
    #[error("Fetch error: {0}")]
    Fetch(String),

    /// The hierarchy document was obtained but is not a well-formed tree.
    #[error("Hierarchy parse error: {0}")]
    Parse(String),

    #[error("LLM provider error: {0}")]
    LlmProvider(String),

    #[error("Missing input: {0}")]
    MissingInput(String),

    #[error("Conflicting input: {0}")]
    ConflictingInput(String),

    #[error("Advisor error: {0}")]
    Advisor(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML deserialize error: {0}")]
    TomlDe(#[from] toml::de::Error),
}

impl serde::Serialize for PopSentryError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::ser::Serializer,
    {
        serializer.serialize_str(self.to_string().as_str())
    }
}

pub type PopSentryResult<T> = Result<T, PopSentryError>;
