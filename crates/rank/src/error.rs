use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("No submission id found in discussion reference: {0}")]
    InvalidReference(String),

    #[error("Unsupported category: {0}")]
    UnsupportedCategory(String),

    #[error("Discussion source unavailable: {0}")]
    SourceUnavailable(#[source] anyhow::Error),
}

impl PipelineError {
    /// Caller mistakes, rejected before any network call.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            PipelineError::InvalidReference(_) | PipelineError::UnsupportedCategory(_)
        )
    }
}
