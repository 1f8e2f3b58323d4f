use thiserror::Error;

/// Failure of a single call to the weather API.
#[derive(Debug, Error)]
pub enum DirectoryError {
    /// The server answered with a non-success status.
    #[error("weather API responded with status {status}")]
    Status { status: u16 },

    /// Geocoding could not resolve the input to a city.
    #[error("could not resolve '{input}' to a city")]
    NotFound { input: String },

    /// Unreachable server, timeout, or a body that could not be read.
    #[error("{operation} request failed")]
    Transport {
        operation: &'static str,
        #[source]
        source: reqwest::Error,
    },

    /// The body was read but did not have the expected shape.
    #[error("malformed {operation} response")]
    Malformed {
        operation: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

impl DirectoryError {
    pub fn status(&self) -> Option<u16> {
        match self {
            DirectoryError::Status { status } => Some(*status),
            _ => None,
        }
    }

    pub fn is_transport(&self) -> bool {
        matches!(self, DirectoryError::Transport { .. } | DirectoryError::Malformed { .. })
    }

    /// The server understood the request and rejected the input itself.
    pub fn is_rejected_input(&self) -> bool {
        match self {
            DirectoryError::NotFound { .. } => true,
            DirectoryError::Status { status } => (400..500).contains(status),
            _ => false,
        }
    }
}

/// Failure of a coordinator flow, as surfaced to the user.
#[derive(Debug, Error)]
pub enum FlowError {
    /// The initial city list has not been loaded; there is nothing to dedup against.
    #[error("the city list has not been loaded yet")]
    NotReady,

    #[error("failed to add city '{input}', wrong input")]
    Validation { input: String },

    #[error(transparent)]
    Directory(#[from] DirectoryError),
}

impl FlowError {
    /// Message suitable for showing to the user as-is.
    pub fn user_message(&self) -> String {
        match self {
            FlowError::NotReady => {
                "Cities are still loading. Try again once the list is shown.".to_string()
            }
            FlowError::Validation { input } => {
                format!("Failed to add city '{input}', wrong input!")
            }
            FlowError::Directory(err) => match err.status() {
                Some(status) => format!("Failed to update the city list (server answered {status})."),
                None => "Failed to update the city list.".to_string(),
            },
        }
    }
}
