use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use std::time::Duration;

use regex::Regex;
use reqwest::Client;
use tokio::fs::{self, File};
use tokio::io::{AsyncWriteExt, BufWriter};
use url::Url;

use crate::request::{next_chunk, send_get};
use crate::{info_time, warn_time, Error, Result, CHUNK_SIZE, FILE_EXTENSION};

/// Anything that is not a word char, hyphen, underscore, period or space.
static UNSAFE_DIR_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\w\-_. ]").expect("directory name regex is valid"));

/// What happened to a single file. The run only logs and counts these.
#[derive(Debug)]
pub enum DownloadOutcome {
    Downloaded { path: PathBuf, bytes: u64 },
    /// The destination already existed; nothing was written.
    Skipped { path: PathBuf },
    /// The URL has no usable `.wav` file name.
    Malformed,
    Failed { error: Error },
}

/// Turns a species name into a single safe directory component.
/// Every disallowed char becomes `_` and surrounding whitespace is trimmed.
pub fn sanitize_dir_name(name: &str) -> String {
    let cleaned = UNSAFE_DIR_CHARS.replace_all(name, "_");
    let trimmed = cleaned.trim();
    // Empty, "." and ".." would put files in or above the download root.
    if trimmed.chars().all(|c| c == '.') {
        return "_".repeat(trimmed.len().max(1));
    }
    trimmed.to_string()
}

/// Last path segment of `url`, if it ends in `.wav`.
pub fn file_name_from_url(url: &Url) -> Option<&str> {
    url.path_segments()
        .and_then(|mut segments| segments.next_back())
        .filter(|name| name.ends_with(FILE_EXTENSION))
}

/// Downloads one sound file into `<download_dir>/<species>/<file name>`.
///
/// Never fails the caller: a malformed URL, a transport error or a disk error are logged
/// and reported through [`DownloadOutcome`]. An existing destination file is left alone,
/// so re-running a scrape only fetches what is missing.
pub async fn download_file(
    client: &Client,
    url: &Url,
    category_name: &str,
    file_index: usize,
    download_dir: &Path,
    timeout: Duration,
) -> DownloadOutcome {
    let Some(file_name) = file_name_from_url(url) else {
        warn_time!("  Could not determine filename for URL: {}", url);
        return DownloadOutcome::Malformed;
    };

    let category_dir = download_dir.join(sanitize_dir_name(category_name));
    if let Err(e) = fs::create_dir_all(&category_dir).await {
        warn_time!("  Could not create directory {}: {}", category_dir.display(), e);
        return DownloadOutcome::Failed { error: e.into() };
    }

    let file_path = category_dir.join(file_name);
    match fs::try_exists(&file_path).await {
        Ok(true) => {
            info_time!("  File already exists, skipping: {}", file_path.display());
            return DownloadOutcome::Skipped { path: file_path };
        }
        Ok(false) => {}
        Err(e) => {
            warn_time!("  Could not check {}: {}", file_path.display(), e);
            return DownloadOutcome::Failed { error: e.into() };
        }
    }

    info_time!(
        "  Downloading file {}: {} to {}",
        file_index,
        file_name,
        category_dir.display()
    );
    match fetch_to_file(client, url, &file_path, timeout).await {
        Ok(bytes) => {
            info_time!("  Successfully downloaded: {} ({} bytes)", file_name, bytes);
            DownloadOutcome::Downloaded {
                path: file_path,
                bytes,
            }
        }
        Err(error) => {
            warn_time!("  Error downloading {} from {}: {}", file_name, url, error);
            DownloadOutcome::Failed { error }
        }
    }
}

/// Streams the body into `<file_path>.part` and renames it into place once complete.
/// The partial file is removed on failure.
async fn fetch_to_file(
    client: &Client,
    url: &Url,
    file_path: &Path,
    timeout: Duration,
) -> Result<u64> {
    let response = send_get(client, url, timeout).await?;

    let part_path = partial_path(file_path);
    let mut file = File::create(&part_path).await?;
    let streamed = stream_to_file(&mut file, response, timeout).await;
    drop(file);

    match streamed {
        Ok(bytes) => {
            fs::rename(&part_path, file_path).await?;
            Ok(bytes)
        }
        Err(e) => {
            let _ = fs::remove_file(&part_path).await;
            Err(e)
        }
    }
}

/// Writes the response body in blocks of at most `CHUNK_SIZE` bytes, returning bytes written.
/// Fails only if the server goes quiet for `idle`, not on total transfer time.
async fn stream_to_file(
    file: &mut File,
    response: reqwest::Response,
    idle: Duration,
) -> Result<u64> {
    let mut writer = BufWriter::with_capacity(CHUNK_SIZE, file);
    let mut body = response.bytes_stream();
    let mut bytes_written: u64 = 0;

    while let Some(chunk) = next_chunk(&mut body, idle).await? {
        for block in chunk.chunks(CHUNK_SIZE) {
            writer.write_all(block).await?;
        }
        bytes_written += chunk.len() as u64;
    }

    writer.flush().await?;
    Ok(bytes_written)
}

fn partial_path(file_path: &Path) -> PathBuf {
    let mut name = file_path.as_os_str().to_owned();
    name.push(".part");
    PathBuf::from(name)
}
