use std::time::Duration;

use thiserror::Error;

pub type Result<T> = core::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Failed to fetch the index page {url}: {source}")]
    IndexUnreachable {
        url: String,
        #[source]
        source: Box<Error>,
    },
    #[error("No category links found on {url}")]
    NoCategories { url: String },

    #[error("Nothing received from the server for {0:?}")]
    Stalled(Duration),

    #[error("The selector you are trying to scrape for is missing. Selector: {0}")]
    ParseMissingSelector(String),

    #[error("Invalid URL {url}: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("Io Error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Reqwest Error: {0}")]
    Reqwest(#[from] reqwest::Error),
}

impl Error {
    /// Fatal errors are the expected ways a run ends early: the site or its species list
    /// is unavailable, or the configured URLs are unusable. Per-page and per-file failures
    /// never reach the caller of `process_site`.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Error::IndexUnreachable { .. } | Error::NoCategories { .. } | Error::InvalidUrl { .. }
        )
    }

    /// Process exit status: 1 for a fatal run condition, 2 for anything unexpected
    /// (client construction, broken selectors).
    pub fn exit_code(&self) -> i32 {
        if self.is_fatal() {
            1
        } else {
            2
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_run_level_failures_are_fatal() {
        let no_categories = Error::NoCategories {
            url: "http://localhost/index.cfm".into(),
        };
        assert!(no_categories.is_fatal());

        let index = Error::IndexUnreachable {
            url: "http://localhost/index.cfm".into(),
            source: Box::new(Error::Stalled(Duration::from_secs(15))),
        };
        assert!(index.is_fatal());

        assert!(!Error::Stalled(Duration::from_secs(30)).is_fatal());
        assert!(!Error::Io(std::io::Error::other("disk full")).is_fatal());
    }

    #[test]
    fn exit_code_separates_fatal_from_unexpected() {
        let no_categories = Error::NoCategories {
            url: "http://localhost/index.cfm".into(),
        };
        assert_eq!(no_categories.exit_code(), 1);
        assert_eq!(Error::ParseMissingSelector("a[".into()).exit_code(), 2);
    }
}
