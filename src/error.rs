use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("invalid setting `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Failures of the translation backend. The `Display` text is what the
/// tooltip shows, so every variant reads as a message for the viewer.
#[derive(Debug, Error)]
pub enum TranslateError {
    #[error("Please set your DeepL API key in the configuration file.")]
    MissingApiKey,
    #[error("Translation failed")]
    Http(#[from] reqwest::Error),
    #[error("Translation failed (HTTP {0})")]
    Status(u16),
    #[error("Translation error")]
    UnexpectedPayload,
    #[error("Translation error")]
    EmptyResult,
    #[error("No language to translate back into while the source language is auto-detected.")]
    NoReverseTarget,
}

#[derive(Debug, Error)]
pub enum SubtitleError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("cue {index}: malformed timing line '{line}'")]
    Timing { index: usize, line: String },
    #[error("no cues found")]
    Empty,
}
