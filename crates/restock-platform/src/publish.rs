use std::io::Write;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use reqwest::Client;
use restock_core::{PublishError, PublishReceipt, PublishTarget};
use tempfile::NamedTempFile;
use tracing::info;

use crate::config::PublishDestination;

/// Drops the document into a shared folder.
///
/// The file is staged next to its final name and renamed into place, so
/// readers never observe a partial document.
#[derive(Debug, Clone)]
pub struct DirectoryTarget {
    dir: PathBuf,
}

impl DirectoryTarget {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

#[async_trait]
impl PublishTarget for DirectoryTarget {
    fn describe(&self) -> String {
        self.dir.display().to_string()
    }

    async fn publish(
        &self,
        file_name: &str,
        body: Vec<u8>,
    ) -> Result<PublishReceipt, PublishError> {
        let dir = self.dir.clone();
        let destination = dir.join(file_name);
        let bytes = body.len();

        let written = destination.clone();
        tokio::task::spawn_blocking(move || write_atomically(&dir, &written, &body))
            .await
            .map_err(|err| PublishError::Io {
                path: destination.clone(),
                source: std::io::Error::other(err),
            })??;

        info!(path = %destination.display(), bytes, "published model to directory");
        Ok(PublishReceipt {
            location: destination.display().to_string(),
            bytes,
        })
    }
}

fn write_atomically(dir: &Path, destination: &Path, body: &[u8]) -> Result<(), PublishError> {
    let io_error = |source| PublishError::Io {
        path: destination.to_path_buf(),
        source,
    };

    let mut staged = NamedTempFile::new_in(dir).map_err(io_error)?;
    staged.write_all(body).map_err(io_error)?;
    staged.as_file().sync_all().map_err(io_error)?;
    staged
        .persist(destination)
        .map_err(|err| io_error(err.error))?;
    Ok(())
}

/// Uploads the document with `PUT {base_url}/{file_name}`.
#[derive(Clone)]
pub struct HttpTarget {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl HttpTarget {
    pub fn new(base_url: impl Into<String>, token: Option<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
            token,
        }
    }

    fn url(&self, file_name: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), file_name)
    }
}

#[async_trait]
impl PublishTarget for HttpTarget {
    fn describe(&self) -> String {
        self.base_url.clone()
    }

    async fn publish(
        &self,
        file_name: &str,
        body: Vec<u8>,
    ) -> Result<PublishReceipt, PublishError> {
        let url = self.url(file_name);
        let bytes = body.len();

        let mut request = self
            .client
            .put(&url)
            .header(reqwest::header::CONTENT_TYPE, "text/csv; charset=utf-8")
            .body(body);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await.map_err(|err| PublishError::Http {
            destination: url.clone(),
            reason: err.without_url().to_string(),
        })?;
        let status = response.status();
        if !status.is_success() {
            return Err(PublishError::Upload {
                destination: url,
                status: status.as_u16(),
            });
        }

        info!(%url, bytes, "published model over http");
        Ok(PublishReceipt {
            location: url,
            bytes,
        })
    }
}

/// Whichever target the configuration selected.
#[derive(Clone)]
pub enum ConfiguredTarget {
    Directory(DirectoryTarget),
    Http(HttpTarget),
}

impl From<&PublishDestination> for ConfiguredTarget {
    fn from(destination: &PublishDestination) -> Self {
        match destination {
            PublishDestination::Directory(dir) => Self::Directory(DirectoryTarget::new(dir)),
            PublishDestination::Http { base_url, token } => {
                Self::Http(HttpTarget::new(base_url.clone(), token.clone()))
            }
        }
    }
}

#[async_trait]
impl PublishTarget for ConfiguredTarget {
    fn describe(&self) -> String {
        match self {
            Self::Directory(target) => target.describe(),
            Self::Http(target) => target.describe(),
        }
    }

    async fn publish(
        &self,
        file_name: &str,
        body: Vec<u8>,
    ) -> Result<PublishReceipt, PublishError> {
        match self {
            Self::Directory(target) => target.publish(file_name, body).await,
            Self::Http(target) => target.publish(file_name, body).await,
        }
    }
}
