mod activity;
mod channel;
mod descriptor;
pub mod proxy;
pub mod query;

pub use activity::{ActivityHandle, ActivityMonitor};
pub use channel::{ByteStream, ChannelFactory, GrpcChannelFactory, ServiceChannel};
pub use descriptor::{
    Binding, BindingElement, Composition, ConnectionDescriptor, Credentials, TcpSettings,
    TlsSettings,
};
pub use proto_catalog::catalog::Fault;
pub use proxy::ServiceProxy;
pub use query::{Entity, Framing, QueryResults, StreamingQuery};

use std::collections::BTreeMap;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid service endpoint: '{0}'")]
    InvalidEndpoint(String),
    #[error("invalid credential metadata")]
    Credentials(#[source] tonic::metadata::errors::InvalidMetadataValue),
    #[error("failed to open a connection to the catalog service")]
    Connect(#[source] tonic::transport::Error),
    #[error(transparent)]
    Transport(#[from] tonic::transport::Error),
    #[error(transparent)]
    Grpc(#[from] tonic::Status),
    #[error(transparent)]
    Fault(#[from] Fault),
    #[error("failed to decode query response at offset {offset}")]
    Parsing {
        offset: u64,
        #[source]
        source: serde_json::Error,
    },
    #[error("{0}")]
    Protocol(&'static str),
}

/// Named properties of an entity: property name to JSON value.
/// Insertion order is not significant.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct PropertyBag(pub BTreeMap<String, serde_json::Value>);

impl PropertyBag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(mut self, name: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.0.insert(name.into(), value.into());
        self
    }
}

impl std::ops::Deref for PropertyBag {
    type Target = BTreeMap<String, serde_json::Value>;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl std::ops::DerefMut for PropertyBag {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl FromIterator<(String, serde_json::Value)> for PropertyBag {
    fn from_iter<I: IntoIterator<Item = (String, serde_json::Value)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl std::fmt::Display for PropertyBag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (index, (name, value)) in self.0.iter().enumerate() {
            if index != 0 {
                f.write_str(", ")?;
            }
            write!(f, "{name}={value}")?;
        }
        Ok(())
    }
}

/// A query to execute: query text plus named parameters.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct QueryRequest {
    pub text: String,
    #[serde(default)]
    pub parameters: PropertyBag,
}

impl QueryRequest {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            parameters: PropertyBag::default(),
        }
    }

    pub fn with_parameters(text: impl Into<String>, parameters: PropertyBag) -> Self {
        Self {
            text: text.into(),
            parameters,
        }
    }
}

/// Arguments of a verb invocation whose response is streamed.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct VerbInvokeArguments {
    pub entity: String,
    pub verb: String,
    #[serde(default)]
    pub arguments: Vec<serde_json::Value>,
}
