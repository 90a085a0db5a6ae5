use thiserror::Error;

#[derive(Debug, Error)]
pub enum FeedbackError {
    #[error("Please fill in the {field} field")]
    MissingField { field: &'static str },

    #[error("\"{address}\" is not a valid e-mail address")]
    InvalidAddress { address: String },

    #[error("Invalid feedback endpoint \"{endpoint}\"")]
    InvalidEndpoint { endpoint: String },

    #[error("Failed to send feedback: {0}")]
    Request(#[source] reqwest::Error),

    #[error("Feedback service responded with HTTP {0}")]
    Status(reqwest::StatusCode),

    #[error("Feedback service rejected the message: {0}")]
    Rejected(String),
}

/// One `@`, a non-empty local part and a dotted domain without empty labels.
#[must_use]
pub fn is_valid_mail_address(address: &str) -> bool {
    if address.is_empty() || address.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = address.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && domain.contains('.')
        && domain.split('.').all(|label| !label.is_empty())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedbackMessage {
    pub name: String,
    pub email: String,
    pub content: String,
}

impl FeedbackMessage {
    /// # Errors
    /// Returns [`FeedbackError::MissingField`] for the first blank field or
    /// [`FeedbackError::InvalidAddress`] for a malformed e-mail address.
    pub fn validate(&self) -> Result<(), FeedbackError> {
        for (field, value) in [
            ("name", &self.name),
            ("e-mail", &self.email),
            ("content", &self.content),
        ] {
            if value.trim().is_empty() {
                return Err(FeedbackError::MissingField { field });
            }
        }
        if !is_valid_mail_address(self.email.trim()) {
            return Err(FeedbackError::InvalidAddress {
                address: self.email.clone(),
            });
        }
        Ok(())
    }
}

/// Submits `message` to the feedback endpoint. The service answers with an
/// empty body (or a lone newline) on success and an error text otherwise.
///
/// # Errors
/// Returns a validation error before sending, or a request, status or
/// rejection error afterwards.
pub async fn send_feedback(
    client: &reqwest::Client,
    endpoint: &str,
    message: &FeedbackMessage,
) -> Result<(), FeedbackError> {
    message.validate()?;

    let mut url = reqwest::Url::parse(endpoint).map_err(|_| FeedbackError::InvalidEndpoint {
        endpoint: endpoint.to_string(),
    })?;
    url.query_pairs_mut()
        .append_pair("name", message.name.trim())
        .append_pair("sender", message.email.trim())
        .append_pair("content", &message.content);

    let response = client
        .get(url)
        .send()
        .await
        .map_err(FeedbackError::Request)?;
    if !response.status().is_success() {
        return Err(FeedbackError::Status(response.status()));
    }

    let body = response.text().await.map_err(FeedbackError::Request)?;
    if body.is_empty() || body == "\n" {
        log::info!("Feedback from {} sent", message.email.trim());
        Ok(())
    } else {
        Err(FeedbackError::Rejected(body))
    }
}

#[cfg(test)]
mod tests {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    use super::*;

    fn message() -> FeedbackMessage {
        FeedbackMessage {
            name: "Jane".to_string(),
            email: "jane@example.com".to_string(),
            content: "Works great & fast".to_string(),
        }
    }

    /// Serves one request with `body` and hands back the request line.
    async fn serve_once(body: &'static str) -> (String, tokio::task::JoinHandle<String>) {
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
            let mut buffer = [0_u8; 1024];
            while !request.windows(4).any(|window| window == b"\r\n\r\n") {
                let read = socket
                    .read(&mut buffer)
                    .await
                    .expect("request should be readable");
                if read == 0 {
                    break;
                }
                request.extend_from_slice(&buffer[..read]);
            }
            let response = format!(
                "HTTP/1.1 200 OK\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            socket
                .write_all(response.as_bytes())
                .await
                .expect("response should be written");
            String::from_utf8_lossy(&request)
                .lines()
                .next()
                .unwrap_or_default()
                .to_string()
        });

        (format!("http://127.0.0.1:{port}/mail.php"), handle)
    }

    #[test]
    fn mail_address_validation() {
        assert!(is_valid_mail_address("jane@example.com"));
        assert!(is_valid_mail_address("j.doe+tag@mail.example.org"));
        for address in [
            "",
            "jane",
            "@example.com",
            "jane@example",
            "jane@example.",
            "jane@.com",
            "jane@@example.com",
            "jane doe@example.com",
        ] {
            assert!(!is_valid_mail_address(address), "{address:?} should be invalid");
        }
    }

    #[test]
    fn validate_reports_first_missing_field() {
        let mut msg = message();
        msg.name = " ".to_string();
        msg.content = String::new();
        assert!(matches!(
            msg.validate(),
            Err(FeedbackError::MissingField { field: "name" })
        ));

        let mut msg = message();
        msg.email = "not-an-address".to_string();
        assert!(matches!(
            msg.validate(),
            Err(FeedbackError::InvalidAddress { .. })
        ));
    }

    #[tokio::test]
    async fn newline_response_counts_as_success() {
        let (endpoint, server) = serve_once("\n").await;
        let client = reqwest::Client::new();

        send_feedback(&client, &endpoint, &message())
            .await
            .expect("feedback should be accepted");

        let request_line = server.await.expect("server task should finish");
        assert!(request_line.starts_with("GET /mail.php?name=Jane&sender=jane%40example.com"));
        assert!(request_line.contains("content=Works+great+%26+fast"));
    }

    #[tokio::test]
    async fn any_other_body_is_a_rejection() {
        let (endpoint, server) = serve_once("Mail could not be sent").await;
        let client = reqwest::Client::new();

        let result = send_feedback(&client, &endpoint, &message()).await;

        assert!(matches!(
            result,
            Err(FeedbackError::Rejected(ref body)) if body == "Mail could not be sent"
        ));
        server.await.expect("server task should finish");
    }

    #[tokio::test]
    async fn invalid_message_is_not_sent() {
        let client = reqwest::Client::new();
        let mut msg = message();
        msg.email = "jane".to_string();

        let result = send_feedback(&client, "http://127.0.0.1:9/mail.php", &msg).await;

        assert!(matches!(result, Err(FeedbackError::InvalidAddress { .. })));
    }
}
