use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Kind of the item streamed by the indexer.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    /// Full block BOC.
    Block,
    /// Transaction BOC.
    Transaction,
    /// Message BOC.
    Message,
}

impl ItemKind {
    /// Returns the name used in routes and configs.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Block => "block",
            Self::Transaction => "transaction",
            Self::Message => "message",
        }
    }
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ItemKind {
    type Err = ParseRouteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "block" => Self::Block,
            "transaction" => Self::Transaction,
            "message" => Self::Message,
            _ => return Err(ParseRouteError::UnknownKind(s.to_owned())),
        })
    }
}

/// Stream path of a single handler: `/{kind}/{handler}`.
#[derive(Debug, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct Route {
    /// Item kind.
    pub kind: ItemKind,
    /// Handler name.
    pub handler: String,
}

impl Route {
    /// Creates a new route.
    pub fn new(kind: ItemKind, handler: impl Into<String>) -> Self {
        Self {
            kind,
            handler: handler.into(),
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/{}/{}", self.kind, self.handler)
    }
}

impl FromStr for Route {
    type Err = ParseRouteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let Some(rest) = s.strip_prefix('/') else {
            return Err(ParseRouteError::InvalidFormat);
        };
        let Some((kind, handler)) = rest.split_once('/') else {
            return Err(ParseRouteError::InvalidFormat);
        };
        if handler.is_empty() || handler.contains('/') {
            return Err(ParseRouteError::InvalidFormat);
        }

        Ok(Self {
            kind: kind.parse()?,
            handler: handler.to_owned(),
        })
    }
}

impl Serialize for Route {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Error type for route parsing.
#[derive(Debug, Clone, Eq, PartialEq, thiserror::Error)]
pub enum ParseRouteError {
    /// The path is not in the `/{kind}/{handler}` form.
    #[error("expected `/{{kind}}/{{handler}}`")]
    InvalidFormat,
    /// Unknown item kind.
    #[error("unknown item kind `{0}`")]
    UnknownKind(String),
}
