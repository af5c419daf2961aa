//! Diagnostic error types for the thread-lexicon engine.
//!
//! The core pipeline represents absence instead of raising: a post with no
//! text yields no candidates, a lookup miss means "unknown", and malformed
//! fragments are dropped silently. The only errors the crate surfaces are
//! contract violations the caller must fix — a missing or misindexed root
//! post, or an invalid configuration. Each variant carries a miette
//! `#[diagnostic]` with an error code and help text.

use miette::Diagnostic;
use thiserror::Error;

/// Top-level error type for the thread-lexicon crate.
///
/// Each variant wraps a subsystem-specific error, preserving the full
/// diagnostic chain (error codes, help text) through to the user.
#[derive(Debug, Error, Diagnostic)]
pub enum LexiconError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Thread(#[from] ThreadError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Config(#[from] ConfigError),
}

// ---------------------------------------------------------------------------
// Thread errors
// ---------------------------------------------------------------------------

/// Violations of the thread input contract.
#[derive(Debug, Error, Diagnostic)]
pub enum ThreadError {
    #[error("thread contains no posts")]
    #[diagnostic(
        code(lexicon::thread::empty),
        help(
            "A thread must contain at least the root post at index 0. \
             Check that the fetcher completed before handing the thread \
             to the engine."
        )
    )]
    Empty,

    #[error("root post {uri} has no text content")]
    #[diagnostic(
        code(lexicon::thread::missing_root_text),
        help(
            "The root's entry in the text map is mandatory because its text \
             drives boilerplate suppression. Re-run text extraction for this \
             post before constructing the thread."
        )
    )]
    MissingRootText { uri: String },

    #[error("post at index 0 ({uri}) has a parent ({parent}) and cannot be the root")]
    #[diagnostic(
        code(lexicon::thread::misindexed_root),
        help(
            "The post at index 0 must be the thread root. Either the fetcher \
             returned posts out of order, or the true root was not fetched."
        )
    )]
    MisindexedRoot { uri: String, parent: String },
}

// ---------------------------------------------------------------------------
// Config errors
// ---------------------------------------------------------------------------

/// Invalid engine configuration.
#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    #[error("{field} must be within (0.0, 1.0], got {value}")]
    #[diagnostic(
        code(lexicon::config::ratio_out_of_range),
        help(
            "Threshold ratios are fractions of word or occurrence counts. \
             Values at or below zero disable the filter entirely; values \
             above one can never be satisfied."
        )
    )]
    RatioOutOfRange { field: &'static str, value: f64 },

    #[error("{field} must be at least 1, got 0")]
    #[diagnostic(
        code(lexicon::config::zero_bound),
        help("Count and depth bounds of zero would filter every entry or disable traversal.")
    )]
    ZeroBound { field: &'static str },

    #[error("failed to parse TOML configuration: {message}")]
    #[diagnostic(
        code(lexicon::config::toml),
        help("Check the TOML syntax and that field names match the EngineConfig schema.")
    )]
    Toml { message: String },
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        Self::Toml {
            message: err.to_string(),
        }
    }
}

/// Convenience alias for functions returning thread-lexicon results.
pub type LexiconResult<T> = std::result::Result<T, LexiconError>;
