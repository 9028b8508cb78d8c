use super::DatasetKind;
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

/// One record as the backend sends it: a positional JSON array whose slots
/// carry the fields in a fixed, dataset-specific order.
#[derive(Debug, Clone, Deserialize)]
pub struct RawTuple(pub Vec<Value>);

impl RawTuple {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn get(&self, index: usize) -> Option<&Value> {
        self.0.get(index)
    }
}

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Network(#[from] reqwest::Error),
    #[error("backend responded with HTTP {0}")]
    Http(StatusCode),
    #[error("response body is not a JSON array of tuples: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("backend returned zero records")]
    Empty,
}

pub fn request_url(base_url: &str, kind: DatasetKind) -> String {
    format!("{}{}", base_url.trim_end_matches('/'), kind.path())
}

/// Issues the single GET for one dataset and classifies the outcome. One
/// shot: no retries, no caching, transport-default timeout only.
pub async fn fetch(
    client: &reqwest::Client,
    base_url: &str,
    kind: DatasetKind,
) -> Result<Vec<RawTuple>, FetchError> {
    let url = request_url(base_url, kind);
    let response = client.get(&url).send().await?;

    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::Http(status));
    }

    let body = response.bytes().await?;
    decode_body(&body)
}

// Split out of `fetch` so classification is testable without a backend.
fn decode_body(body: &[u8]) -> Result<Vec<RawTuple>, FetchError> {
    let tuples: Vec<RawTuple> = serde_json::from_slice(body)?;
    if tuples.is_empty() {
        return Err(FetchError::Empty);
    }
    Ok(tuples)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn joins_base_and_path() {
        assert_eq!(
            request_url("http://localhost:8080", DatasetKind::Pings),
            "http://localhost:8080/api/pings"
        );
        assert_eq!(
            request_url("http://localhost:8080", DatasetKind::SpeedTests),
            "http://localhost:8080/api/speedtests"
        );
    }

    #[test]
    fn tolerates_trailing_slash_in_base() {
        assert_eq!(
            request_url("http://monitor.local/", DatasetKind::Pings),
            "http://monitor.local/api/pings"
        );
    }

    #[test]
    fn decodes_array_of_tuples() {
        let body = br#"[[1, 1000, "8.8.8.8", true], [2, 1001, "1.1.1.1", false]]"#;
        let tuples = decode_body(body).unwrap();
        assert_eq!(tuples.len(), 2);
        assert_eq!(tuples[0].len(), 4);
        assert_eq!(tuples[1].get(2), Some(&Value::from("1.1.1.1")));
    }

    #[test]
    fn empty_array_is_classified_empty() {
        assert!(matches!(decode_body(b"[]"), Err(FetchError::Empty)));
    }

    #[test]
    fn non_array_body_is_a_decode_error() {
        assert!(matches!(
            decode_body(br#"{"error": "nope"}"#),
            Err(FetchError::Decode(_))
        ));
    }

    #[test]
    fn truncated_body_is_a_decode_error() {
        assert!(matches!(
            decode_body(br#"[[1, 1000, "8.8"#),
            Err(FetchError::Decode(_))
        ));
    }
}
