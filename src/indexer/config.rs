use std::collections::BTreeSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::boc;
use crate::indexer::route::{ItemKind, Route};

/// Consumer configuration.
///
/// ```json
/// {
///   "transport": { "kind": "http2", "listen_address": "127.0.0.1:10000" },
///   "payload_encoding": "hex",
///   "data_sources": [
///     { "handlers": [{ "kind": "block", "handler": "blocks" }] }
///   ]
/// }
/// ```
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct IndexerConfig {
    /// Stream transport settings.
    pub transport: TransportConfig,
    /// Encoding of the item payloads.
    #[serde(default)]
    pub payload_encoding: PayloadEncoding,
    /// Streamed data sources.
    pub data_sources: Vec<DataSource>,
}

impl IndexerConfig {
    /// Parses and validates the config from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config = ok!(serde_json::from_str::<Self>(json).map_err(ConfigError::Json));
        ok!(config.validate());
        Ok(config)
    }

    /// Reads, parses and validates the config from a JSON file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let json = ok!(std::fs::read_to_string(path).map_err(ConfigError::Io));
        Self::from_json(&json)
    }

    /// Checks that there is at least one handler, that all handler
    /// names are valid and that no route is declared twice.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut routes = BTreeSet::new();
        for handler in self.handlers() {
            if handler.handler.is_empty() || handler.handler.contains('/') {
                return Err(ConfigError::InvalidHandlerName(handler.handler.clone()));
            }

            let route = handler.route();
            if routes.contains(&route) {
                return Err(ConfigError::DuplicateRoute(route));
            }
            routes.insert(route);
        }

        if routes.is_empty() {
            return Err(ConfigError::NoHandlers);
        }
        Ok(())
    }

    /// Returns all configured handlers across data sources.
    pub fn handlers(&self) -> impl Iterator<Item = &HandlerConfig> {
        self.data_sources
            .iter()
            .flat_map(|source| source.handlers.iter())
    }

    /// Returns routes of all configured handlers in declaration order.
    pub fn routes(&self) -> Vec<Route> {
        self.handlers().map(HandlerConfig::route).collect()
    }
}

/// Stream transport settings.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct TransportConfig {
    /// Transport kind.
    pub kind: TransportKind,
    /// Address of the item producer.
    #[serde(default)]
    pub listen_address: String,
}

/// Stream transport kind.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportKind {
    /// HTTP/2 streams, one per route.
    Http2,
    /// Items are pushed by the caller.
    Mock,
}

/// Encoding of the item payloads.
#[derive(Default, Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PayloadEncoding {
    /// Serialized BOC bytes.
    #[default]
    Raw,
    /// Hex encoded BOC.
    Hex,
    /// Base64 encoded BOC.
    Base64,
}

impl PayloadEncoding {
    /// Returns serialized BOC bytes from a complete payload.
    pub fn to_raw(&self, payload: &[u8]) -> Result<Vec<u8>, boc::de::Error> {
        match self {
            Self::Raw => Ok(payload.to_vec()),
            Self::Hex => hex::decode(payload).map_err(|_| boc::de::Error::InvalidEncoding),
            Self::Base64 => {
                crate::util::decode_base64(payload).map_err(|_| boc::de::Error::InvalidEncoding)
            }
        }
    }
}

/// A group of handlers.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct DataSource {
    /// Handlers of this source.
    pub handlers: Vec<HandlerConfig>,
}

/// A single streamed handler.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct HandlerConfig {
    /// Kind of the streamed items.
    pub kind: ItemKind,
    /// Handler name.
    pub handler: String,
}

impl HandlerConfig {
    /// Returns the route of this handler.
    pub fn route(&self) -> Route {
        Route::new(self.kind, self.handler.clone())
    }
}

/// Error type for config loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the config file.
    #[error("failed to read config")]
    Io(#[from] std::io::Error),
    /// Malformed JSON or unknown values.
    #[error("failed to parse config")]
    Json(#[from] serde_json::Error),
    /// There are no handlers in data sources.
    #[error("no handlers configured")]
    NoHandlers,
    /// Handler name is empty or contains `/`.
    #[error("invalid handler name `{0}`")]
    InvalidHandlerName(String),
    /// The same route is declared twice.
    #[error("duplicate route `{0}`")]
    DuplicateRoute(Route),
}
