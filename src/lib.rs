//! WHOI WHALE SOUNDS SCRAPER
//! Index page -> species dropdown -> best-of pages -> `.wav` files on disk.

mod config;
mod download;
mod error;
#[doc(hidden)]
pub mod macros;
mod parse;
pub mod process;
mod request;

pub use config::{Args, Config};
pub use download::{download_file, file_name_from_url, sanitize_dir_name, DownloadOutcome};
pub use error::{Error, Result};
pub use parse::{parse_categories, parse_download_links, Category};
pub use request::{build_client, fetch_page};

const BASE_URL: &str = "https://whoicf2.whoi.edu/science/B/whalesounds/";
const INDEX_PAGE: &str = "index.cfm";
const DOWNLOAD_DIR: &str = "whoi_whale_sounds";

/// `id` of the `<select>` holding the common species names.
const SPECIES_SELECT_ID: &str = "getSpeciesCommon";
/// Only options pointing at a best-of page are real categories.
const CATEGORY_MARKER: &str = "bestOf.cfm?code=";
const DOWNLOAD_LABEL: &str = "Download";
const FILE_EXTENSION: &str = ".wav";

const PAGE_TIMEOUT_SECS: u64 = 15;
const FILE_TIMEOUT_SECS: u64 = 30;
/// Size of the write buffer used when streaming a file to disk.
const CHUNK_SIZE: usize = 8192;
