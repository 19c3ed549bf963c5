use std::path::Path;

use base64::Engine as _;

use crate::errors::{PopSentryError, PopSentryResult};
use crate::hierarchy::fetcher::is_url;

/// Base64 of a screenshot given as a URL or an existing file path.
pub async fn encode_image(client: &reqwest::Client, source: &str) -> PopSentryResult<String> {
    let bytes = if is_url(source) {
        let response = client
            .get(source)
            .send()
            .await
            .map_err(|e| PopSentryError::Fetch(format!("GET {source} failed: {e}")))?;
        let status = response.status();
        if !status.is_success() {
            return Err(PopSentryError::Fetch(format!("GET {source} returned {status}")));
        }
        response
            .bytes()
            .await
            .map_err(|e| PopSentryError::Fetch(format!("reading body of {source} failed: {e}")))?
            .to_vec()
    } else if Path::new(source).is_file() {
        tokio::fs::read(source)
            .await
            .map_err(|e| PopSentryError::Fetch(format!("cannot read {source}: {e}")))?
    } else {
        return Err(PopSentryError::MissingInput(
            "image must be an http(s) URL or an existing file path".into(),
        ));
    };

    tracing::debug!(bytes = bytes.len(), "screenshot loaded");
    Ok(base64::engine::general_purpose::STANDARD.encode(&bytes))
}

/// `data:` URL for an encoded screenshot.
pub fn data_url(encoded: &str) -> String {
    format!("data:image/jpeg;base64,{encoded}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn encodes_local_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("shot.jpg");
        std::fs::write(&file, b"abc").unwrap();
        let encoded = encode_image(&reqwest::Client::new(), file.to_str().unwrap())
            .await
            .unwrap();
        assert_eq!(encoded, "YWJj");
    }

    #[tokio::test]
    async fn encodes_downloaded_image() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/shot.jpg"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"abc".to_vec()))
            .mount(&server)
            .await;
        let url = format!("{}/shot.jpg", server.uri());
        let encoded = encode_image(&reqwest::Client::new(), &url).await.unwrap();
        assert_eq!(data_url(&encoded), "data:image/jpeg;base64,YWJj");
    }

    #[tokio::test]
    async fn missing_image_is_rejected() {
        let server = MockServer::start().await;
        let url = format!("{}/gone.jpg", server.uri());
        let client = reqwest::Client::new();
        assert!(matches!(
            encode_image(&client, &url).await,
            Err(PopSentryError::Fetch(_))
        ));
        assert!(matches!(
            encode_image(&client, "not/a/file.png").await,
            Err(PopSentryError::MissingInput(_))
        ));
    }
}
