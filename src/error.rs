use thiserror::Error;

/// Errors raised while fetching and interpreting homework statuses.
///
/// The `Display` text is forwarded to the chat as-is, so it is written for the
/// person reading the notification.
#[derive(Error, Debug)]
pub enum HomeworkError {
    #[error("{message}")]
    WrongResponseStatus {
        message: String,
        #[source]
        source: Option<reqwest::Error>,
    },

    #[error("Ответ от API не является корректным JSON: {0}")]
    InvalidJson(#[source] reqwest::Error),

    #[error("{0}")]
    TypeMismatch(String),

    #[error("{0}")]
    MissingKey(String),

    #[error("{0}")]
    UnexpectedStatus(String),
}

/// Fatal startup errors.
#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingCredential(&'static str),
}
