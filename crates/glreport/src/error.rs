#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("GitLab request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("GitLab API returned {status}: {body}")]
    Api {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("Invalid TLS configuration: {0}")]
    Tls(String),
}
