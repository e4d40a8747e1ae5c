//! Top-level CLI error (spec §7/§6.4): every inner crate's error folds into
//! one of the four non-zero exit codes the CLI contract promises.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("usage error: {0}")]
    Usage(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{path}: {source}")]
    Fetch {
        path: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("codegen failed: {0}")]
    Codegen(#[from] xbc_codegen::Error),

    #[error("schema set did not resolve: {0}")]
    Resolve(#[from] xbc_ir::Error),
}

impl Error {
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::Usage(_) => 1,
            Error::Io(_) | Error::Fetch { .. } => 2,
            Error::Parse { .. } => 3,
            Error::Codegen(_) | Error::Resolve(_) => 4,
        }
    }
}
