//! Article image downloads.
//!
//! [`ImageFetcher`] is the seam the extractor downloads through;
//! [`HttpImageFetcher`] is the reqwest-backed implementation used by the
//! binary. Parent directories are never created here.

use crate::error::FetchError;
use std::path::Path;
use tokio::fs;
use tracing::{error, info, instrument};

/// Something that can save a remote image to a local path.
pub trait ImageFetcher {
    /// Fetch `url` and write the body to `destination`.
    async fn download_image(&self, url: &str, destination: &Path) -> Result<(), FetchError>;
}

/// Downloads images over HTTP(S) with a shared [`reqwest::Client`].
#[derive(Debug, Clone, Default)]
pub struct HttpImageFetcher {
    client: reqwest::Client,
}

impl HttpImageFetcher {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

impl ImageFetcher for HttpImageFetcher {
    #[instrument(level = "debug", skip_all, fields(%url, destination = %destination.display()))]
    async fn download_image(&self, url: &str, destination: &Path) -> Result<(), FetchError> {
        let result: Result<usize, FetchError> = async {
            let response = self.client.get(url).send().await?;
            let status = response.status();
            if !status.is_success() {
                return Err(FetchError::Status {
                    url: url.to_string(),
                    status,
                });
            }
            let bytes = response.bytes().await?;
            fs::write(destination, &bytes)
                .await
                .map_err(|source| FetchError::Io {
                    path: destination.to_path_buf(),
                    source,
                })?;
            Ok(bytes.len())
        }
        .await;

        match result {
            Ok(len) => {
                info!(bytes = len, path = %destination.display(), "Image downloaded");
                Ok(())
            }
            Err(e) => {
                error!(%url, error = %e, "Failed to download image");
                Err(e)
            }
        }
    }
}
