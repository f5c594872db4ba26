/// Convenience result type used across Folio.
pub type FolioResult<T> = Result<T, FolioError>;

/// Top-level error taxonomy used by engine APIs.
///
/// Only [`FolioError::Construction`], [`FolioError::ContextLost`] and
/// [`FolioError::ModuleLoad`] escalate to a fault boundary. Everything else is
/// handled where it occurs.
#[derive(thiserror::Error, Debug)]
pub enum FolioError {
    /// Invalid user-provided configuration or scenario data.
    #[error("validation error: {0}")]
    Validation(String),

    /// A rendering surface or scene failed to build.
    #[error("construction fault: {0}")]
    Construction(String),

    /// The rendering context was reclaimed by the host mid-session.
    #[error("rendering context lost")]
    ContextLost,

    /// A deferred module failed to resolve.
    #[error("module '{module}' failed to load: {reason}")]
    ModuleLoad {
        /// Module identity.
        module: String,
        /// Loader-provided reason.
        reason: String,
    },

    /// A decorative resource (texture, icon) failed to fetch or decode.
    #[error("resource '{url}' failed to load: {reason}")]
    ResourceLoad {
        /// Resource location.
        url: String,
        /// Fetcher-provided reason.
        reason: String,
    },

    /// Contact message submission failed.
    #[error("submission error: {0}")]
    Submission(String),

    /// Errors when serializing or deserializing data structures.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl FolioError {
    /// Build a [`FolioError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`FolioError::Construction`] value.
    pub fn construction(msg: impl Into<String>) -> Self {
        Self::Construction(msg.into())
    }

    /// Build a [`FolioError::ModuleLoad`] value.
    pub fn module_load(module: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::ModuleLoad {
            module: module.into(),
            reason: reason.into(),
        }
    }

    /// Build a [`FolioError::ResourceLoad`] value.
    pub fn resource_load(url: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::ResourceLoad {
            url: url.into(),
            reason: reason.into(),
        }
    }

    /// Build a [`FolioError::Submission`] value.
    pub fn submission(msg: impl Into<String>) -> Self {
        Self::Submission(msg.into())
    }

    /// Build a [`FolioError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }

    /// Whether this fault is routed to the nearest fault boundary.
    pub fn escalates(&self) -> bool {
        matches!(
            self,
            Self::Construction(_) | Self::ContextLost | Self::ModuleLoad { .. }
        )
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
