use thiserror::Error;

/// Fatal conditions of a network reconstruction run.
#[derive(Error, Debug)]
pub enum NetError {
    /// Parameter out of range, or conflicting options
    #[error("{0}")]
    Config(String),

    /// An accession or probe id that is not in the loaded dataset
    #[error("Cannot find marker: {0}")]
    UnknownMarker(String),

    /// The adaptive partitioning stack outgrew its limit
    #[error("Exceeded npar limit! More than {limit} active partitions are needed")]
    PartitionLimit { limit: usize },

    /// The noise level is not below a marker's variance
    #[error("Array measurement noise level {noise} must be below every marker variance, found {variance}")]
    NoiseDomain { variance: f64, noise: f64 },

    /// Malformed expression table, threshold file or adjacency file
    #[error("Incorrect data format at line no: {line}: {message}")]
    Format { line: usize, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl NetError {
    pub fn config(message: impl Into<String>) -> Self {
        NetError::Config(message.into())
    }

    pub fn format(line: usize, message: impl Into<String>) -> Self {
        NetError::Format {
            line,
            message: message.into(),
        }
    }
}
