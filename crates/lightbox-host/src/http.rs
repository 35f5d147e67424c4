//! HTTP file transfer

use async_trait::async_trait;
use futures_util::StreamExt;
use lightbox_transfer::{FileTransfer, HostError, HostResult};
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;

/// Downloads over HTTP(S) with reqwest; `file://` sources are copied.
#[derive(Clone, Default)]
pub struct HttpTransfer {
    client: reqwest::Client,
}

impl HttpTransfer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }

    async fn fetch(&self, url: url::Url, dest: &Path) -> HostResult<u64> {
        let response = self.client.get(url).send().await.map_err(HostError::new)?;

        if !response.status().is_success() {
            return Err(HostError::new(format!("HTTP {}", response.status())));
        }

        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(dest)
            .await?;

        let mut written: u64 = 0;
        let mut stream = response.bytes_stream();

        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(HostError::new)?;
            file.write_all(&chunk).await?;
            written = written.saturating_add(chunk.len() as u64);
        }

        file.flush().await?;
        Ok(written)
    }
}

/// Sibling path the transfer writes to before replacing `dest`
fn partial_path(dest: &Path) -> PathBuf {
    let mut name = dest.file_name().unwrap_or_default().to_os_string();
    name.push(".part");
    dest.with_file_name(name)
}

#[async_trait]
impl FileTransfer for HttpTransfer {
    async fn download(&self, url: &str, dest: &Path) -> HostResult<PathBuf> {
        let parsed = url::Url::parse(url)
            .map_err(|e| HostError::new(format!("Invalid URL {}: {}", url, e)))?;

        if let Some(parent) = dest.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let partial = partial_path(dest);
        let result = if parsed.scheme() == "file" {
            match parsed.to_file_path() {
                Ok(source) => tokio::fs::copy(&source, &partial)
                    .await
                    .map_err(HostError::from),
                Err(_) => Err(HostError::new(format!("Invalid file URL: {}", url))),
            }
        } else {
            self.fetch(parsed, &partial).await
        };

        // A failed transfer leaves any earlier copy at `dest` untouched
        let bytes = match result {
            Ok(bytes) => bytes,
            Err(e) => {
                let _ = tokio::fs::remove_file(&partial).await;
                return Err(e);
            }
        };

        if let Err(e) = tokio::fs::rename(&partial, dest).await {
            let _ = tokio::fs::remove_file(&partial).await;
            return Err(e.into());
        }

        tracing::debug!(url = %url, dest = %dest.display(), bytes, "Fetched file");
        Ok(dest.to_path_buf())
    }

    async fn delete(&self, path: &Path) -> HostResult<()> {
        tokio::fs::remove_file(path).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::AsyncReadExt;
    use tokio::net::TcpListener;

    /// Serve a single canned HTTP response on a local port
    async fn serve_once(response: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 1024];
            let _ = socket.read(&mut buf).await;
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.unwrap();
        });

        format!("http://{}/photos/abc.jpg", addr)
    }

    fn direct() -> HttpTransfer {
        let client = reqwest::Client::builder().no_proxy().build().unwrap();
        HttpTransfer::with_client(client)
    }

    #[tokio::test]
    async fn test_download_over_http() {
        let url = serve_once(
            "HTTP/1.1 200 OK\r\nContent-Type: image/jpeg\r\nContent-Length: 5\r\nConnection: close\r\n\r\nhello",
        )
        .await;
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("nested/abc.jpg");

        let path = direct().download(&url, &dest).await.unwrap();
        assert_eq!(path, dest);
        assert_eq!(std::fs::read(&dest).unwrap(), b"hello");
    }

    #[tokio::test]
    async fn test_http_error_status() {
        let url = serve_once(
            "HTTP/1.1 404 Not Found\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
        )
        .await;
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("abc.jpg");

        let err = direct().download(&url, &dest).await.unwrap_err();
        assert_eq!(err.message(), "HTTP 404 Not Found");
        assert!(!dest.exists());
        assert!(!partial_path(&dest).exists());
    }

    #[tokio::test]
    async fn test_failed_download_keeps_previous_copy() {
        let url = serve_once(
            "HTTP/1.1 404 Not Found\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
        )
        .await;
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("abc.jpg");
        std::fs::write(&dest, b"previous download").unwrap();

        let err = direct().download(&url, &dest).await.unwrap_err();
        assert_eq!(err.message(), "HTTP 404 Not Found");
        assert_eq!(std::fs::read(&dest).unwrap(), b"previous download");
        assert!(!partial_path(&dest).exists());
    }

    #[tokio::test]
    async fn test_missing_local_source_keeps_previous_copy() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("abc.jpg");
        std::fs::write(&dest, b"previous download").unwrap();

        let url = url::Url::from_file_path(dir.path().join("gone.jpg"))
            .unwrap()
            .to_string();
        assert!(HttpTransfer::new().download(&url, &dest).await.is_err());
        assert_eq!(std::fs::read(&dest).unwrap(), b"previous download");
    }

    #[test]
    fn test_partial_path_is_a_sibling() {
        let dest = Path::new("/cache/abc.jpg");
        assert_eq!(partial_path(dest), Path::new("/cache/abc.jpg.part"));
    }

    #[tokio::test]
    async fn test_overwrites_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("source.jpg");
        let dest = dir.path().join("abc.jpg");
        std::fs::write(&source, b"new").unwrap();
        std::fs::write(&dest, b"old contents").unwrap();

        let url = url::Url::from_file_path(&source).unwrap().to_string();
        HttpTransfer::new().download(&url, &dest).await.unwrap();
        assert_eq!(std::fs::read(&dest).unwrap(), b"new");
    }

    #[tokio::test]
    async fn test_invalid_url() {
        let dir = tempfile::tempdir().unwrap();
        let err = HttpTransfer::new()
            .download("not a url", &dir.path().join("x.jpg"))
            .await
            .unwrap_err();
        assert!(err.message().starts_with("Invalid URL not a url"));
    }

    #[tokio::test]
    async fn test_delete() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("x.jpg");
        std::fs::write(&path, b"x").unwrap();

        let transfer = HttpTransfer::new();
        transfer.delete(&path).await.unwrap();
        assert!(!path.exists());
        assert!(transfer.delete(&path).await.is_err());
    }
}
