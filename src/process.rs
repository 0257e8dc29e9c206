use chrono::Local;
use reqwest::Client;

use crate::download::{download_file, DownloadOutcome};
use crate::parse::{parse_categories, parse_download_links, Category};
use crate::request::{build_client, fetch_page};
use crate::{info_time, warn_time, Config, Error, Result};

/// Tally of one run. `attempted` counts every link handed to the downloader,
/// whatever the outcome.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub categories: usize,
    pub categories_skipped: usize,
    pub attempted: usize,
    pub downloaded: usize,
    pub skipped: usize,
    pub malformed: usize,
    pub failed: usize,
}

impl RunSummary {
    fn record(&mut self, outcome: &DownloadOutcome) {
        self.attempted += 1;
        match outcome {
            DownloadOutcome::Downloaded { .. } => self.downloaded += 1,
            DownloadOutcome::Skipped { .. } => self.skipped += 1,
            DownloadOutcome::Malformed => self.malformed += 1,
            DownloadOutcome::Failed { .. } => self.failed += 1,
        }
    }
}

/// Scrapes the whole site, one page and one file at a time.
///
/// Only two things end the run early: an unreachable index page and an index page
/// without any species. Category pages and files that fail are logged and skipped.
pub async fn process_site(config: &Config) -> Result<RunSummary> {
    let start_time = Local::now();
    let client = build_client()?;

    info_time!("Starting WHOI Marine Mammal Sound Database Scraper...");

    let index_html = fetch_page(&client, &config.index_url, config.page_timeout)
        .await
        .map_err(|e| {
            warn_time!("Failed to fetch main page. Exiting.");
            Error::IndexUnreachable {
                url: config.index_url.to_string(),
                source: Box::new(e),
            }
        })?;

    let categories = parse_categories(&index_html, &config.base_url)?;
    if categories.is_empty() {
        warn_time!("No category links found. Exiting.");
        return Err(Error::NoCategories {
            url: config.index_url.to_string(),
        });
    }

    let mut summary = RunSummary {
        categories: categories.len(),
        ..Default::default()
    };
    for category in &categories {
        process_category(&client, config, category, &mut summary).await;
    }

    info_time!("\n--- Scraping Complete ---");
    info_time!(
        "Total files processed (attempted to download): {}",
        summary.attempted
    );
    info_time!(
        "Downloaded: {}, already present: {}, malformed: {}, failed: {}, species skipped: {}",
        summary.downloaded,
        summary.skipped,
        summary.malformed,
        summary.failed,
        summary.categories_skipped
    );
    info_time!(
        start_time,
        "Files are saved in the '{}' directory.",
        config.download_dir.display()
    );

    Ok(summary)
}

/// Fetches one species page and downloads every sound file it links.
async fn process_category(
    client: &Client,
    config: &Config,
    category: &Category,
    summary: &mut RunSummary,
) {
    info_time!("\n--- Processing Species: {} ---", category.name);

    let Ok(html) = fetch_page(client, &category.url, config.page_timeout).await else {
        warn_time!(
            "Failed to fetch category page for {}. Skipping.",
            category.name
        );
        summary.categories_skipped += 1;
        return;
    };

    let links = match parse_download_links(&html, &config.base_url, &category.name) {
        Ok(links) => links,
        Err(e) => {
            warn_time!("Could not parse page for {}: {}. Skipping.", category.name, e);
            summary.categories_skipped += 1;
            return;
        }
    };

    for (file_index, url) in links.iter().enumerate() {
        let outcome = download_file(
            client,
            url,
            &category.name,
            file_index + 1,
            &config.download_dir,
            config.file_timeout,
        )
        .await;
        summary.record(&outcome);
    }
}
