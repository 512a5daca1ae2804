use std::time::Duration;

use engine_logging::{engine_debug, engine_info};
use futures_util::StreamExt;

use crate::{FetchError, ServerListError};

/// Public BDIX server list.
pub const DEFAULT_SOURCE_URL: &str =
    "https://gist.githubusercontent.com/Tazhossain/e0aecd399c1fb18d1094ebae1f735f0e/raw/Bdix.txt";

#[derive(Debug, Clone)]
pub struct FetchSettings {
    pub source_url: String,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    pub max_bytes: u64,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            source_url: DEFAULT_SOURCE_URL.to_string(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
            max_bytes: 5 * 1024 * 1024,
        }
    }
}

/// Where the raw server-list document comes from.
#[async_trait::async_trait]
pub trait ServerListSource: Send + Sync {
    async fn fetch_document(&self) -> Result<String, FetchError>;
}

#[derive(Debug, Clone)]
pub struct ReqwestServerList {
    settings: FetchSettings,
}

impl ReqwestServerList {
    pub fn new(settings: FetchSettings) -> Self {
        Self { settings }
    }

    fn build_client(&self) -> Result<reqwest::Client, FetchError> {
        reqwest::Client::builder()
            .connect_timeout(self.settings.connect_timeout)
            .timeout(self.settings.request_timeout)
            .build()
            .map_err(|err| FetchError::Transport(err.to_string()))
    }
}

#[async_trait::async_trait]
impl ServerListSource for ReqwestServerList {
    async fn fetch_document(&self) -> Result<String, FetchError> {
        let url = reqwest::Url::parse(&self.settings.source_url)
            .map_err(|err| FetchError::InvalidUrl(err.to_string()))?;
        let client = self.build_client()?;

        engine_info!("Fetching server list from {}", url);
        let response = client.get(url).send().await.map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::HttpStatus(status.as_u16()));
        }

        let max_bytes = self.settings.max_bytes;
        if response.content_length().is_some_and(|len| len > max_bytes) {
            return Err(FetchError::TooLarge { max_bytes });
        }

        let mut bytes = Vec::new();
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(map_reqwest_error)?;
            if bytes.len() as u64 + chunk.len() as u64 > max_bytes {
                return Err(FetchError::TooLarge { max_bytes });
            }
            bytes.extend_from_slice(&chunk);
        }
        engine_debug!("Server list fetched: {} bytes", bytes.len());

        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

/// Fetches the document and extracts the endpoints for `category`.
pub async fn fetch_category(
    source: &dyn ServerListSource,
    category: &str,
) -> Result<Vec<String>, ServerListError> {
    let document = source.fetch_document().await?;
    extract_category(&document, category)
}

/// Returns the lines between `#<CATEGORY>:` and `#<CATEGORY> CATEGORY ENDED#`.
///
/// The category is uppercased. Lines are trimmed and blank lines dropped;
/// order is preserved.
pub fn extract_category(document: &str, category: &str) -> Result<Vec<String>, ServerListError> {
    let category = category.trim().to_ascii_uppercase();
    let start_marker = format!("#{category}:");
    let end_marker = format!("#{category} CATEGORY ENDED#");
    let not_found = || ServerListError::CategoryNotFound(category.clone());

    let start = document.find(&start_marker).ok_or_else(not_found)?;
    let body_start = start + start_marker.len();
    let body_len = document[body_start..]
        .find(&end_marker)
        .ok_or_else(not_found)?;
    let body = &document[body_start..body_start + body_len];

    Ok(body
        .trim()
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(ToOwned::to_owned)
        .collect())
}

fn map_reqwest_error(err: reqwest::Error) -> FetchError {
    if err.is_timeout() {
        return FetchError::Timeout(err.to_string());
    }
    FetchError::Transport(err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_lines_between_markers() {
        let doc = "#FTP:\nsrv1.example\r\n\n  srv2.example  \n#FTP CATEGORY ENDED#\n#TV:\ntv1\n#TV CATEGORY ENDED#";
        assert_eq!(
            extract_category(doc, "ftp").unwrap(),
            vec!["srv1.example".to_string(), "srv2.example".to_string()]
        );
        assert_eq!(extract_category(doc, "TV").unwrap(), vec!["tv1".to_string()]);
    }

    #[test]
    fn missing_end_marker_is_category_not_found() {
        let doc = "#FTP:\nsrv1.example\n";
        assert_eq!(
            extract_category(doc, "FTP"),
            Err(ServerListError::CategoryNotFound("FTP".to_string()))
        );
    }

    #[test]
    fn end_marker_before_start_is_category_not_found() {
        let doc = "#FTP CATEGORY ENDED#\nsrv1.example\n#FTP:\n";
        assert_eq!(
            extract_category(doc, "FTP"),
            Err(ServerListError::CategoryNotFound("FTP".to_string()))
        );
    }

    #[test]
    fn empty_block_yields_empty_list() {
        let doc = "#FTP:\n\n   \n#FTP CATEGORY ENDED#";
        assert_eq!(extract_category(doc, "FTP").unwrap(), Vec::<String>::new());
    }
}
