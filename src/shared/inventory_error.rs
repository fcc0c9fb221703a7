use std::fmt;

/// Every failure the library can report. The binary wraps these in `anyhow`
/// and prints the chain; nothing here is logged or swallowed.
#[derive(Debug, thiserror::Error)]
pub enum InventoryError {
    #[error("Failed to connect to document store: {0}")]
    Connection(String),

    #[error("Document store query failed: {0}")]
    Query(String),

    #[error("Failed to decode record {record}: {reason}")]
    Decode { record: String, reason: String },

    #[error("Failed to serialize vars of {name}")]
    Serialization {
        name: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("No host identifiers given")]
    EmptyInput,

    #[error("Host identifiers resolve to more than one cluster: {}", Candidates(.candidates))]
    AmbiguousCluster { candidates: Vec<String> },

    #[error("Invalid collection name: {0}")]
    InvalidIdentifier(String),

    #[error("Invalid pattern {pattern}: {reason}")]
    Pattern { pattern: String, reason: String },
}

struct Candidates<'a>(&'a [String]);

impl fmt::Display for Candidates<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let quoted: Vec<String> = self.0.iter().map(|c| format!("{c:?}")).collect();
        write!(f, "{}", quoted.join(", "))
    }
}

impl From<tokio_postgres::Error> for InventoryError {
    fn from(error: tokio_postgres::Error) -> Self {
        if error.is_closed() {
            InventoryError::Connection(error.to_string())
        } else {
            InventoryError::Query(error.to_string())
        }
    }
}

pub type Result<T> = std::result::Result<T, InventoryError>;
