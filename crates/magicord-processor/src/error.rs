//! Generation error types.
//!
//! Every error that concerns a single bot names that bot and the stage that
//! failed, so a build with several bots reports which one broke and where.

use std::fmt;
use std::io;
use std::path::PathBuf;

use proc_macro2::{Span, TokenStream};
use thiserror::Error;

use crate::config::ConfigError;

/// Pipeline stage a declaration was in when it failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Discovering the declaration and its command methods.
    Resolve,
    /// Turning one command method into a handler.
    Synthesize,
    /// Reading configuration and assembling the bot unit.
    Assemble,
    /// Persisting the generated unit.
    Emit,
}

impl Stage {
    /// Returns the stage name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Resolve => "resolve",
            Self::Synthesize => "synthesize",
            Self::Assemble => "assemble",
            Self::Emit => "emit",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Source location of a diagnostic.
///
/// Unlike a bare [`Span`], this is `Send + Sync`, so a [`GenerateError`]
/// can cross threads and convert into `anyhow::Error` or
/// `Box<dyn Error + Send + Sync>` in a build script. Away from the thread
/// that produced it, the span falls back to the call site.
#[derive(Clone)]
pub struct Location(syn::Error);

impl Location {
    /// The span to attach a diagnostic to.
    pub fn span(&self) -> Span {
        self.0.span()
    }
}

impl From<Span> for Location {
    fn from(span: Span) -> Self {
        Self(syn::Error::new(span, ""))
    }
}

impl fmt::Debug for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Location").field(&self.span()).finish()
    }
}

/// Errors that can occur while generating bot units.
#[derive(Debug, Error)]
pub enum GenerateError {
    /// The declaration cannot be turned into valid generated code.
    #[error("bot `{declaration}`: {stage} failed: {message}")]
    DeclarationMalformed {
        /// Name of the bot declaration.
        declaration: String,
        /// Stage that rejected it.
        stage: Stage,
        /// What is wrong.
        message: String,
        /// Location of the offending source.
        span: Location,
    },

    /// No `#[bot(...)]` attribute on the declaration.
    #[error("bot `{declaration}`: assemble failed: no #[bot(...)] configuration attribute found")]
    ConfigurationMissing {
        /// Name of the bot declaration.
        declaration: String,
        /// Location of the declaration.
        span: Location,
    },

    /// `#[bot]` is present but a required argument is not.
    #[error("bot `{declaration}`: assemble failed: #[bot] is missing the `{argument}` argument")]
    ConfigurationArgumentMissing {
        /// Name of the bot declaration.
        declaration: String,
        /// Name of the missing argument.
        argument: &'static str,
        /// Location of the attribute.
        span: Location,
    },

    /// The emitter could not persist the unit.
    #[error("bot `{declaration}`: emit failed: could not write `{unit}`: {source}")]
    EmissionFailure {
        /// Name of the bot declaration.
        declaration: String,
        /// Name of the generated unit.
        unit: String,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// A source file handed to the driver could not be read.
    #[error("failed to read `{}`: {source}", .path.display())]
    SourceUnreadable {
        /// The file path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// A source file handed to the driver is not valid Rust.
    #[error("failed to parse `{}`: {source}", .path.display())]
    SourceUnparsable {
        /// The file path.
        path: PathBuf,
        /// Parser error.
        #[source]
        source: syn::Error,
    },

    /// Generator configuration could not be loaded.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl GenerateError {
    /// Creates a malformed-declaration error.
    pub fn malformed(
        declaration: impl Into<String>,
        stage: Stage,
        span: Span,
        message: impl Into<String>,
    ) -> Self {
        Self::DeclarationMalformed {
            declaration: declaration.into(),
            stage,
            message: message.into(),
            span: span.into(),
        }
    }

    /// Name of the bot declaration this error concerns, if any.
    pub fn declaration(&self) -> Option<&str> {
        match self {
            Self::DeclarationMalformed { declaration, .. }
            | Self::ConfigurationMissing { declaration, .. }
            | Self::ConfigurationArgumentMissing { declaration, .. }
            | Self::EmissionFailure { declaration, .. } => Some(declaration),
            Self::SourceUnreadable { .. } | Self::SourceUnparsable { .. } | Self::Config(_) => {
                None
            }
        }
    }

    /// Stage that failed, if the error concerns a single declaration.
    pub fn stage(&self) -> Option<Stage> {
        match self {
            Self::DeclarationMalformed { stage, .. } => Some(*stage),
            Self::ConfigurationMissing { .. } | Self::ConfigurationArgumentMissing { .. } => {
                Some(Stage::Assemble)
            }
            Self::EmissionFailure { .. } => Some(Stage::Emit),
            Self::SourceUnreadable { .. } | Self::SourceUnparsable { .. } | Self::Config(_) => {
                None
            }
        }
    }

    /// Source location to attach a diagnostic to.
    pub fn span(&self) -> Span {
        match self {
            Self::DeclarationMalformed { span, .. }
            | Self::ConfigurationMissing { span, .. }
            | Self::ConfigurationArgumentMissing { span, .. } => span.span(),
            Self::SourceUnparsable { source, .. } => source.span(),
            _ => Span::call_site(),
        }
    }

    /// Renders the error as a `compile_error!` invocation.
    pub fn to_compile_error(&self) -> TokenStream {
        syn::Error::new(self.span(), self.to_string()).to_compile_error()
    }
}

/// Result type for generation operations.
pub type GenerateResult<T> = Result<T, GenerateError>;
