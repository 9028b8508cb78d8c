pub mod fetch;
pub mod normalize;

use fetch::FetchError;
use normalize::NormalizeError;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatasetKind {
    Pings,
    SpeedTests,
}

impl DatasetKind {
    pub fn path(self) -> &'static str {
        match self {
            DatasetKind::Pings => "/api/pings",
            DatasetKind::SpeedTests => "/api/speedtests",
        }
    }

    // Wording feeds the fixed user-facing messages, so it is part of the
    // contract: "ping data", "speed test data".
    pub fn label(self) -> &'static str {
        match self {
            DatasetKind::Pings => "ping",
            DatasetKind::SpeedTests => "speed test",
        }
    }
}

/// Backend-assigned identifier. Opaque to this client; the backend decides
/// whether it is numeric or textual.
#[derive(Debug, Clone, PartialEq)]
pub enum RecordId {
    Int(i64),
    Text(String),
}

/// When a record was captured. Kept opaque: the backend emits either a
/// numeric epoch or an ISO text form, and this client only orders and
/// labels by it, never parses it.
#[derive(Debug, Clone, PartialEq)]
pub enum Timestamp {
    Epoch(f64),
    Text(String),
}

impl Timestamp {
    pub fn label(&self) -> String {
        match self {
            Timestamp::Epoch(n) => format!("{n}"),
            Timestamp::Text(s) => s.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PingRecord {
    pub id: RecordId,
    pub timestamp: Timestamp,
    pub target: String,
    pub success: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SpeedTestRecord {
    pub id: RecordId,
    pub timestamp: Timestamp,
    pub download: f64,
    pub upload: f64,
    /// Absent on backends that predate the latency column.
    pub ping: Option<f64>,
}

/// Anything that can go wrong between issuing the request and handing
/// normalized records to the dashboard.
#[derive(Debug, Error)]
pub enum DatasetError {
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error(transparent)]
    Normalize(#[from] NormalizeError),
}

impl DatasetError {
    /// The fixed message shown to the operator. Diagnostic detail stays in
    /// the logs.
    pub fn user_message(&self, kind: DatasetKind) -> String {
        match self {
            DatasetError::Fetch(FetchError::Empty) => {
                format!("No {} data available.", kind.label())
            }
            DatasetError::Fetch(_) => format!("Failed to fetch {} data.", kind.label()),
            DatasetError::Normalize(_) => {
                format!("Received malformed {} data.", kind.label())
            }
        }
    }
}

pub async fn load_pings(
    client: &reqwest::Client,
    base_url: &str,
) -> Result<Vec<PingRecord>, DatasetError> {
    let tuples = fetch::fetch(client, base_url, DatasetKind::Pings).await?;
    Ok(normalize::normalize_pings(&tuples)?)
}

pub async fn load_speed_tests(
    client: &reqwest::Client,
    base_url: &str,
) -> Result<Vec<SpeedTestRecord>, DatasetError> {
    let tuples = fetch::fetch(client, base_url, DatasetKind::SpeedTests).await?;
    Ok(normalize::normalize_speed_tests(&tuples)?)
}
