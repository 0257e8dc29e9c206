use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use url::Url;

use crate::{
    Error, Result, BASE_URL, DOWNLOAD_DIR, FILE_TIMEOUT_SECS, INDEX_PAGE, PAGE_TIMEOUT_SECS,
};

/// Download every best-of sound cut from the WHOI marine mammal sound database.
#[derive(Debug, Parser)]
#[command(name = "whalesounds", version, about)]
pub struct Args {
    /// Site root that relative category and file links are resolved against.
    #[arg(long, default_value = BASE_URL)]
    pub base_url: String,

    /// Index page holding the species dropdown. Defaults to `<base-url>index.cfm`.
    #[arg(long)]
    pub index_url: Option<String>,

    /// Directory the species folders are created in.
    #[arg(long, default_value = DOWNLOAD_DIR)]
    pub download_dir: PathBuf,

    /// Timeout in seconds for index and category pages.
    #[arg(long, default_value_t = PAGE_TIMEOUT_SECS)]
    pub page_timeout: u64,

    /// Timeout in seconds for a single file download.
    #[arg(long, default_value_t = FILE_TIMEOUT_SECS)]
    pub file_timeout: u64,
}

/// Runtime settings for one scrape.
#[derive(Debug, Clone)]
pub struct Config {
    pub base_url: Url,
    pub index_url: Url,
    pub download_dir: PathBuf,
    pub page_timeout: Duration,
    pub file_timeout: Duration,
}

impl Config {
    /// Default timeouts and index page for the given site root and download directory.
    /// `Config::new(BASE_URL, DOWNLOAD_DIR)` is the stock WHOI setup.
    pub fn new(base_url: &str, download_dir: impl Into<PathBuf>) -> Result<Self> {
        let base_url = parse_url(base_url)?;
        let index_url = join_url(&base_url, INDEX_PAGE)?;
        Ok(Self {
            base_url,
            index_url,
            download_dir: download_dir.into(),
            page_timeout: Duration::from_secs(PAGE_TIMEOUT_SECS),
            file_timeout: Duration::from_secs(FILE_TIMEOUT_SECS),
        })
    }

    pub fn from_args(args: Args) -> Result<Self> {
        let mut config = Self::new(&args.base_url, args.download_dir)?;
        if let Some(index_url) = args.index_url {
            config.index_url = parse_url(&index_url)?;
        }
        config.page_timeout = Duration::from_secs(args.page_timeout);
        config.file_timeout = Duration::from_secs(args.file_timeout);
        Ok(config)
    }
}

fn parse_url(url: &str) -> Result<Url> {
    Url::parse(url).map_err(|source| Error::InvalidUrl {
        url: url.into(),
        source,
    })
}

/// Resolves `link` against `base` the way a browser resolves an `href`.
pub(crate) fn join_url(base: &Url, link: &str) -> Result<Url> {
    base.join(link).map_err(|source| Error::InvalidUrl {
        url: link.into(),
        source,
    })
}
