use std::time::Duration;

use futures_util::{Stream, StreamExt};
use reqwest::{Client, Response};
use tokio::time;
use url::Url;

use crate::{info_time, warn_time, Error, Result};

/// One client for the whole run. Timeouts are applied per request, see [`send_get`].
pub fn build_client() -> Result<Client> {
    let client = Client::builder().build()?;
    Ok(client)
}

/// Requests a page and returns a `Result<String>` containing the HTML.
/// Transport failures and non-2xx statuses are logged here; the caller decides whether
/// they end the run or just skip the page.
pub async fn fetch_page(client: &Client, url: &Url, timeout: Duration) -> Result<String> {
    info_time!("Fetching: {}", url);
    match request_page_html(client, url, timeout).await {
        Ok(html) => Ok(html),
        Err(e) => {
            warn_time!("Error fetching {}: {}", url, e);
            Err(e)
        }
    }
}

async fn request_page_html(client: &Client, url: &Url, timeout: Duration) -> Result<String> {
    let mut body = send_get(client, url, timeout).await?.bytes_stream();
    let mut html = Vec::new();
    while let Some(chunk) = next_chunk(&mut body, timeout).await? {
        html.extend_from_slice(&chunk);
    }
    Ok(String::from_utf8_lossy(&html).into_owned())
}

/// GET `url`, waiting at most `timeout` for the connection and the response headers.
/// Non-2xx statuses are errors.
pub(crate) async fn send_get(client: &Client, url: &Url, timeout: Duration) -> Result<Response> {
    let res = time::timeout(timeout, client.get(url.clone()).send())
        .await
        .map_err(|_| Error::Stalled(timeout))??
        .error_for_status()?;
    Ok(res)
}

/// Next piece of a response body. A body that keeps trickling in is fine for as long as it
/// takes; one that goes quiet for `idle` fails with [`Error::Stalled`].
pub(crate) async fn next_chunk<S, T>(body: &mut S, idle: Duration) -> Result<Option<T>>
where
    S: Stream<Item = reqwest::Result<T>> + Unpin,
{
    match time::timeout(idle, body.next()).await {
        Ok(Some(chunk)) => Ok(Some(chunk?)),
        Ok(None) => Ok(None),
        Err(_) => Err(Error::Stalled(idle)),
    }
}
