use std::path::Path;

use async_trait::async_trait;
use packsmith_model::{Transfer, TransferError, check_remote_name};
use reqwest::{Method, StatusCode};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: Option<String>,
}

/// Publishes to a WebDAV-style HTTP server: `PUT` uploads, `MOVE` renames
/// and `HEAD` probes.
#[derive(Debug, Clone)]
pub struct HttpTransfer {
    client: reqwest::Client,
    base_url: String,
    credentials: Option<Credentials>,
}

impl HttpTransfer {
    #[must_use]
    pub fn new(
        client: reqwest::Client,
        base_url: impl Into<String>,
        credentials: Option<Credentials>,
    ) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            client,
            base_url,
            credentials,
        }
    }

    fn url_for(&self, remote_name: &str) -> Result<String, TransferError> {
        check_remote_name(remote_name)?;
        Ok(format!(
            "{}/{}",
            self.base_url,
            remote_name.replace('\\', "/").trim_start_matches('/')
        ))
    }

    fn request(&self, method: Method, url: &str) -> reqwest::RequestBuilder {
        let builder = self.client.request(method, url);
        match &self.credentials {
            Some(credentials) => {
                builder.basic_auth(&credentials.username, credentials.password.as_deref())
            }
            None => builder,
        }
    }

    async fn send(
        operation: &'static str,
        builder: reqwest::RequestBuilder,
    ) -> Result<reqwest::Response, TransferError> {
        builder
            .send()
            .await
            .map_err(|error| TransferError::network_request_from(operation, error))
    }

    async fn ensure_success(
        operation: &'static str,
        response: reqwest::Response,
    ) -> Result<(), TransferError> {
        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        let body = response.text().await.unwrap_or_default();
        Err(TransferError::rejected(operation, status.as_u16(), &body))
    }
}

#[async_trait]
impl Transfer for HttpTransfer {
    fn name(&self) -> &'static str {
        "http"
    }

    async fn upload_file(&self, local: &Path, remote_name: &str) -> Result<(), TransferError> {
        let url = self.url_for(remote_name)?;
        let body = match tokio::fs::read(local).await {
            Ok(body) => body,
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => {
                return Err(TransferError::NotFound {
                    name: local.display().to_string(),
                });
            }
            Err(error) => return Err(error.into()),
        };

        log::debug!("PUT {url} ({} bytes)", body.len());
        let response = Self::send("upload", self.request(Method::PUT, &url).body(body)).await?;
        Self::ensure_success("upload", response).await
    }

    async fn rename_directory(&self, from: &str, to: &str) -> Result<(), TransferError> {
        let source = format!("{}/", self.url_for(from)?);
        let destination = format!("{}/", self.url_for(to)?);
        let method = Method::from_bytes(b"MOVE")
            .map_err(|error| TransferError::network_request_from("rename", error))?;

        log::debug!("MOVE {source} -> {destination}");
        let response = Self::send(
            "rename",
            self.request(method, &source)
                .header("Destination", destination)
                .header("Overwrite", "F"),
        )
        .await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(TransferError::NotFound {
                name: from.to_string(),
            });
        }
        Self::ensure_success("rename", response).await
    }

    async fn exists(&self, remote_name: &str) -> Result<bool, TransferError> {
        let url = self.url_for(remote_name)?;
        let response = Self::send("exists", self.request(Method::HEAD, &url)).await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(false);
        }
        Self::ensure_success("exists", response).await?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    use super::*;

    /// Answers one request with `status_line` and returns the raw request
    /// head plus body.
    async fn serve_once(status_line: &'static str) -> (String, tokio::task::JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("listener should bind");
        let port = listener
            .local_addr()
            .expect("listener should have an address")
            .port();

        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.expect("connection should arrive");
            let mut request = Vec::new();
            let mut buffer = [0_u8; 4096];
            loop {
                let read = socket
                    .read(&mut buffer)
                    .await
                    .expect("request should be readable");
                if read == 0 {
                    break;
                }
                request.extend_from_slice(&buffer[..read]);
                let text = String::from_utf8_lossy(&request).to_string();
                if let Some(head_end) = text.find("\r\n\r\n") {
                    let content_length = text[..head_end]
                        .lines()
                        .find_map(|line| {
                            let (name, value) = line.split_once(':')?;
                            name.eq_ignore_ascii_case("content-length")
                                .then(|| value.trim().parse::<usize>().ok())
                                .flatten()
                        })
                        .unwrap_or(0);
                    if request.len() >= head_end + 4 + content_length {
                        break;
                    }
                }
            }
            let response =
                format!("{status_line}\r\nContent-Length: 0\r\nConnection: close\r\n\r\n");
            socket
                .write_all(response.as_bytes())
                .await
                .expect("response should be written");
            String::from_utf8_lossy(&request).to_string()
        });

        (format!("http://127.0.0.1:{port}/updates/"), handle)
    }

    fn header<'a>(request: &'a str, name: &str) -> Option<&'a str> {
        request.lines().find_map(|line| {
            let (key, value) = line.split_once(':')?;
            key.eq_ignore_ascii_case(name).then_some(value.trim())
        })
    }

    #[tokio::test]
    async fn upload_puts_file_with_basic_auth() {
        let temp_dir = tempfile::tempdir().expect("temporary directory should be created");
        let local = temp_dir.path().join("updates.json");
        tokio::fs::write(&local, b"[]")
            .await
            .expect("local file should be written");
        let (base_url, server) = serve_once("HTTP/1.1 201 Created").await;
        let transfer = HttpTransfer::new(
            reqwest::Client::new(),
            base_url,
            Some(Credentials {
                username: "deploy".to_string(),
                password: Some("secret".to_string()),
            }),
        );

        transfer
            .upload_file(&local, "updates.json")
            .await
            .expect("upload should succeed");

        let request = server.await.expect("server task should finish");
        assert!(request.starts_with("PUT /updates/updates.json HTTP/1.1"));
        // base64("deploy:secret")
        assert_eq!(
            header(&request, "authorization"),
            Some("Basic ZGVwbG95OnNlY3JldA==")
        );
        assert!(request.ends_with("[]"));
    }

    #[tokio::test]
    async fn rename_issues_move_with_destination() {
        let (base_url, server) = serve_once("HTTP/1.1 201 Created").await;
        let transfer = HttpTransfer::new(reqwest::Client::new(), base_url.clone(), None);

        transfer
            .rename_directory("1.0.0.0", "1.1.0.0")
            .await
            .expect("rename should succeed");

        let request = server.await.expect("server task should finish");
        assert!(request.starts_with("MOVE /updates/1.0.0.0/ HTTP/1.1"));
        assert_eq!(
            header(&request, "destination"),
            Some(format!("{base_url}1.1.0.0/").as_str())
        );
        assert_eq!(header(&request, "authorization"), None);
    }

    #[tokio::test]
    async fn head_not_found_means_missing() {
        let (base_url, server) = serve_once("HTTP/1.1 404 Not Found").await;
        let transfer = HttpTransfer::new(reqwest::Client::new(), base_url, None);

        assert_eq!(transfer.exists("2.0.0.0/package.zip").await, Ok(false));
        let request = server.await.expect("server task should finish");
        assert!(request.starts_with("HEAD /updates/2.0.0.0/package.zip HTTP/1.1"));
    }

    #[tokio::test]
    async fn error_status_maps_to_rejected() {
        let temp_dir = tempfile::tempdir().expect("temporary directory should be created");
        let local = temp_dir.path().join("updates.json");
        tokio::fs::write(&local, b"[]")
            .await
            .expect("local file should be written");
        let (base_url, server) = serve_once("HTTP/1.1 403 Forbidden").await;
        let transfer = HttpTransfer::new(reqwest::Client::new(), base_url, None);

        let result = transfer.upload_file(&local, "updates.json").await;

        assert!(matches!(
            result,
            Err(TransferError::Rejected {
                operation: "upload",
                status: 403,
                ..
            })
        ));
        server.await.expect("server task should finish");
    }

    #[tokio::test]
    async fn unreachable_server_is_a_network_error() {
        let transfer = HttpTransfer::new(reqwest::Client::new(), "http://127.0.0.1:9", None);

        let result = transfer.exists("updates.json").await;

        assert!(matches!(result, Err(TransferError::NetworkError { .. })));
    }
}
