use std::io;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to fetch {url}: {source}")]
    Fetch {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("unexpected page structure: {0}")]
    Parse(String),
    #[error("download interrupted: {0}")]
    Download(io::Error),
    #[error("failed to write tags: {0}")]
    Tag(#[from] id3::Error),
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl Error {
    pub fn fetch(url: &reqwest::Url, source: reqwest::Error) -> Self {
        Error::Fetch {
            url: url.to_string(),
            source,
        }
    }
}
