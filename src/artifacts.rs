use std::path::{Path, PathBuf};

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use thiserror::Error;
use tracing::info;

use crate::config::Config;

#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("{} does not exist and {url_var} is not set", path.display())]
    Missing {
        path: PathBuf,
        url_var: &'static str,
    },
    #[error("GITHUB_TOKEN is not a valid header value")]
    BadToken,
    #[error("failed to download {url}: {source}")]
    Download {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Makes sure the model and class list are on disk, fetching whichever is
/// missing from its configured URL.
pub async fn ensure_files_exist(config: &Config) -> Result<(), ArtifactError> {
    info!("checking model artifacts");

    let required = [
        (&config.model_path, config.model_url.as_deref(), "MODEL_URL"),
        (
            &config.class_list_path,
            config.class_list_url.as_deref(),
            "CLASS_LIST_URL",
        ),
    ];

    for (path, url, url_var) in required {
        if path.exists() {
            continue;
        }
        let url = url.ok_or_else(|| ArtifactError::Missing {
            path: path.clone(),
            url_var,
        })?;
        download_file(url, path, config.download_token.as_deref()).await?;
    }

    Ok(())
}

async fn download_file(url: &str, path: &Path, token: Option<&str>) -> Result<(), ArtifactError> {
    info!(url, path = %path.display(), "downloading artifact");

    let mut headers = HeaderMap::new();
    if let Some(token) = token {
        let value =
            HeaderValue::from_str(&format!("Bearer {token}")).map_err(|_| ArtifactError::BadToken)?;
        headers.insert(AUTHORIZATION, value);
    }
    headers.insert(ACCEPT, HeaderValue::from_static("application/octet-stream"));

    let download_err = |source| ArtifactError::Download {
        url: url.to_string(),
        source,
    };

    let bytes = reqwest::Client::new()
        .get(url)
        .headers(headers)
        .send()
        .await
        .and_then(|response| response.error_for_status())
        .map_err(download_err)?
        .bytes()
        .await
        .map_err(download_err)?;

    let write_err = |source| ArtifactError::Write {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await.map_err(write_err)?;
    }
    tokio::fs::write(path, &bytes).await.map_err(write_err)?;

    info!(path = %path.display(), bytes = bytes.len(), "artifact saved");
    Ok(())
}
