use std::{error, fmt, sync::Arc};

use actors::actor::ActorError;

pub mod config;
pub mod directory;
pub mod engine;
pub mod gateway;
pub mod location;
pub mod position;
pub mod publish;
pub mod selection;
pub mod session;

pub use config::{PerturbationBounds, TrackingConfig};
pub use engine::{Phase, TrackingPhase};
pub use gateway::FetchGateway;
pub use location::{Authorization, LocationEvent, LocationProvider};
pub use publish::RosterUpdate;
pub use session::{SessionBuilder, TrackingSession};

/// Roster retrieval failed. Cloned to every roster subscriber, so inner
/// errors are shared behind `Arc`.
#[derive(Debug, Clone)]
pub enum FetchError {
    Request(Arc<dyn error::Error + Send + Sync>),
    Decode(Arc<serde_json::Error>),
    InvalidResponse {
        status_code: u16,
        url: String,
        response: Option<String>,
    },
    DuplicateDriver(String),
    Other(String),
}

impl FetchError {
    pub fn request<E: error::Error + Send + Sync + 'static>(why: E) -> Self {
        Self::Request(Arc::new(why))
    }
}

impl error::Error for FetchError {}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            FetchError::Request(e) => write!(f, "roster request failed: {}", e),
            FetchError::Decode(e) => write!(f, "roster payload is malformed: {}", e),
            FetchError::InvalidResponse {
                status_code,
                url,
                response,
            } => match response {
                Some(text) => {
                    write!(f, "Invalid Response ({}) {}: {}", status_code, text, url)
                }
                None => write!(f, "Invalid Response ({}) {}", status_code, url),
            },
            FetchError::DuplicateDriver(id) => {
                write!(f, "roster lists driver {} more than once", id)
            }
            FetchError::Other(e) => write!(f, "{e}"),
        }
    }
}

impl From<serde_json::Error> for FetchError {
    fn from(e: serde_json::Error) -> Self {
        FetchError::Decode(Arc::new(e))
    }
}

#[derive(Debug)]
pub enum EngineError {
    /// The session was shut down.
    Stopped,
    /// The engine went away before answering.
    NoReply,
}

impl error::Error for EngineError {}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            EngineError::Stopped => write!(f, "tracking session has been shut down"),
            EngineError::NoReply => write!(f, "tracking engine did not answer"),
        }
    }
}

impl From<ActorError> for EngineError {
    fn from(why: ActorError) -> Self {
        match why {
            ActorError::Stopped => EngineError::Stopped,
            ActorError::ReceiveAnswerError(_) => EngineError::NoReply,
        }
    }
}

#[cfg(test)]
pub(crate) mod testing;
