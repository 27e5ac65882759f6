use std::io;
use std::path::PathBuf;

use invoice_pdf::PdfError;
use thiserror::Error;

/// Rejected user input. Nothing is rendered or stored when one of these
/// is returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AssemblyError {
    #[error("no sender profile selected; create a sender profile or configure a default sender first")]
    MissingSender,

    #[error("client name is required")]
    MissingClientName,

    #[error("name is required")]
    NameRequired,

    #[error("the default entry is not a stored record and cannot be deleted")]
    CannotDeleteDefault,

    #[error("no sender profile with id {0:?}")]
    UnknownProfile(String),

    #[error("no client template with id {0:?}")]
    UnknownTemplate(String),
}

/// Failure while producing the invoice document.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("an invoice needs at least one service line")]
    NoServices,

    #[error(transparent)]
    Pdf(#[from] PdfError),
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to serialize store contents: {0}")]
    Serialize(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to access config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to write config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("could not determine a home directory")]
    NoHomeDirectory,

    #[error("fonts.regular and fonts.bold must be set together")]
    IncompleteFonts,

    #[error("config file {0} already exists")]
    AlreadyExists(PathBuf),
}
