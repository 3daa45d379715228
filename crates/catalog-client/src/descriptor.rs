use crate::Error;
use std::time::Duration;
use tonic::transport::{Certificate, ClientTlsConfig, Endpoint};

/// Everything needed to reach the catalog service: endpoint address,
/// transport binding, credentials, and the operation timeout applied to
/// the channel when it's opened.
///
/// Descriptors are supplied by configuration collaborators and are
/// immutable once a channel has been opened from them.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ConnectionDescriptor {
    /// Service address, e.g. `https://orion.example.com:17777`.
    pub address: String,
    #[serde(default)]
    pub binding: Binding,
    #[serde(default)]
    pub credentials: Credentials,
    /// Ceiling for a single remote operation. The default is deliberately
    /// long: analytic queries are expected to run for many minutes.
    #[serde(default = "default_operation_timeout", with = "humantime_serde")]
    pub operation_timeout: Duration,
}

fn default_operation_timeout() -> Duration {
    Duration::from_secs(60 * 60)
}

impl ConnectionDescriptor {
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            binding: Binding::default(),
            credentials: Credentials::default(),
            operation_timeout: default_operation_timeout(),
        }
    }

    pub fn with_credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = credentials;
        self
    }

    pub fn with_binding(mut self, binding: Binding) -> Self {
        self.binding = binding;
        self
    }
}

/// Credentials applied to the channel factory and attached to every
/// request as `authorization` metadata.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Credentials {
    #[default]
    Anonymous,
    Basic {
        username: String,
        password: String,
    },
    Bearer {
        token: String,
    },
}

impl Credentials {
    pub(crate) fn metadata(&self) -> crate::Result<tonic::metadata::MetadataMap> {
        let mut metadata = tonic::metadata::MetadataMap::new();

        let header = match self {
            Credentials::Anonymous => return Ok(metadata),
            Credentials::Basic { username, password } => {
                format!("Basic {}", base64::encode(format!("{username}:{password}")))
            }
            Credentials::Bearer { token } => format!("Bearer {token}"),
        };

        let mut header: tonic::metadata::AsciiMetadataValue =
            header.parse().map_err(Error::Credentials)?;
        header.set_sensitive(true);
        metadata.insert("authorization", header);

        Ok(metadata)
    }
}

/// Transport configuration: an ordered list of transport elements plus
/// the four transport-level timeouts.
///
/// A binding is either a named high-level `Profile` or an `Explicit`
/// composition of its element list. Profiles whose elements include a
/// secure-stream layer can't be used for channel creation directly and
/// must be rebuilt as an explicit pipeline first: see [`Binding::corrected`].
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Binding {
    #[serde(default)]
    pub elements: Vec<BindingElement>,
    #[serde(default)]
    pub composition: Composition,
    #[serde(default = "default_open_timeout", with = "humantime_serde")]
    pub open_timeout: Duration,
    #[serde(default = "default_close_timeout", with = "humantime_serde")]
    pub close_timeout: Duration,
    #[serde(default = "default_send_timeout", with = "humantime_serde")]
    pub send_timeout: Duration,
    #[serde(default = "default_receive_timeout", with = "humantime_serde")]
    pub receive_timeout: Duration,
}

fn default_open_timeout() -> Duration {
    Duration::from_secs(60)
}
fn default_close_timeout() -> Duration {
    Duration::from_secs(60)
}
fn default_send_timeout() -> Duration {
    Duration::from_secs(60)
}
fn default_receive_timeout() -> Duration {
    Duration::from_secs(600)
}

#[derive(Debug, Clone, Copy, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Composition {
    #[default]
    Profile,
    Explicit,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BindingElement {
    Tcp(TcpSettings),
    SecureStream(TlsSettings),
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TcpSettings {
    #[serde(default = "default_nodelay")]
    pub nodelay: bool,
    #[serde(default, with = "humantime_serde")]
    pub keepalive: Option<Duration>,
}

fn default_nodelay() -> bool {
    true
}

impl Default for TcpSettings {
    fn default() -> Self {
        Self {
            nodelay: true,
            keepalive: None,
        }
    }
}

/// Settings of a secure-stream transport element.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TlsSettings {
    /// Domain name to verify the server certificate against, when it
    /// differs from the host of the endpoint address.
    #[serde(default)]
    pub domain_name: Option<String>,
    /// PEM-encoded CA certificate to trust, for self-signed installations.
    #[serde(default)]
    pub ca_certificate_pem: Option<String>,
}

impl Default for Binding {
    fn default() -> Self {
        Self::tcp()
    }
}

impl Binding {
    /// The plain TCP profile.
    pub fn tcp() -> Self {
        Self {
            elements: vec![BindingElement::Tcp(TcpSettings::default())],
            composition: Composition::Profile,
            open_timeout: default_open_timeout(),
            close_timeout: default_close_timeout(),
            send_timeout: default_send_timeout(),
            receive_timeout: default_receive_timeout(),
        }
    }

    /// The TCP-with-secure-stream profile.
    pub fn secure(tls: TlsSettings) -> Self {
        let mut binding = Self::tcp();
        binding.elements.push(BindingElement::SecureStream(tls));
        binding
    }

    /// An explicit composition of the given transport elements.
    pub fn custom(elements: Vec<BindingElement>) -> Self {
        Self {
            elements,
            composition: Composition::Explicit,
            ..Self::tcp()
        }
    }

    fn has_secure_stream(&self) -> bool {
        self.elements
            .iter()
            .any(|element| matches!(element, BindingElement::SecureStream(_)))
    }

    /// A binding usable for channel creation.
    ///
    /// A profile binding whose elements include a secure-stream layer is
    /// rebuilt as an explicit composition of the same element list, with
    /// the open/close/send/receive timeouts transferred unchanged from
    /// the original. Other bindings pass through as-is.
    pub fn corrected(&self) -> Binding {
        if self.composition == Composition::Profile && self.has_secure_stream() {
            let mut corrected = Binding::custom(self.elements.clone());
            corrected.open_timeout = self.open_timeout;
            corrected.close_timeout = self.close_timeout;
            corrected.send_timeout = self.send_timeout;
            corrected.receive_timeout = self.receive_timeout;
            corrected
        } else {
            self.clone()
        }
    }

    /// Lower this binding onto a transport endpoint for `address`.
    ///
    /// The open timeout becomes the connect timeout. The send and receive
    /// timeouts are transport ceilings that the descriptor's operation
    /// timeout overrides once the channel is opened; they're carried so
    /// that [`Binding::corrected`] preserves them exactly.
    pub(crate) fn endpoint(&self, address: &str) -> crate::Result<Endpoint> {
        let mut endpoint = Endpoint::from_shared(address.to_string())
            .map_err(|_| Error::InvalidEndpoint(address.to_string()))?
            .connect_timeout(self.open_timeout);

        for element in &self.elements {
            match element {
                BindingElement::Tcp(tcp) => {
                    endpoint = endpoint
                        .tcp_nodelay(tcp.nodelay)
                        .tcp_keepalive(tcp.keepalive);
                }
                BindingElement::SecureStream(tls) => {
                    let mut config = ClientTlsConfig::new();
                    if let Some(domain) = &tls.domain_name {
                        config = config.domain_name(domain);
                    }
                    if let Some(pem) = &tls.ca_certificate_pem {
                        config = config.ca_certificate(Certificate::from_pem(pem));
                    }
                    endpoint = endpoint.tls_config(config)?;
                }
            }
        }

        Ok(endpoint)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn secure_binding() -> Binding {
        let mut binding = Binding::secure(TlsSettings::default());
        binding.open_timeout = Duration::from_secs(7);
        binding.close_timeout = Duration::from_secs(11);
        binding.send_timeout = Duration::from_secs(13);
        binding.receive_timeout = Duration::from_secs(17);
        binding
    }

    #[test]
    fn correction_rebuilds_secure_profiles() {
        let binding = secure_binding();
        let corrected = binding.corrected();

        assert_eq!(corrected.composition, Composition::Explicit);
        assert_eq!(corrected.elements, binding.elements);
        assert_eq!(corrected.open_timeout, Duration::from_secs(7));
        assert_eq!(corrected.close_timeout, Duration::from_secs(11));
        assert_eq!(corrected.send_timeout, Duration::from_secs(13));
        assert_eq!(corrected.receive_timeout, Duration::from_secs(17));
    }

    #[test]
    fn correction_passes_plain_profiles_through() {
        let binding = Binding::tcp();
        assert_eq!(binding.corrected(), binding);
    }

    #[test]
    fn correction_is_idempotent() {
        let corrected = secure_binding().corrected();
        assert_eq!(corrected.corrected(), corrected);
    }

    #[test]
    fn endpoint_rejects_malformed_addresses() {
        let err = Binding::tcp().endpoint("not a uri").unwrap_err();
        assert!(matches!(err, Error::InvalidEndpoint(addr) if addr == "not a uri"));
    }

    #[test]
    fn endpoint_accepts_secure_bindings() {
        secure_binding()
            .corrected()
            .endpoint("https://orion.example.com:17777")
            .unwrap();
    }

    #[test]
    fn credentials_metadata() {
        assert!(Credentials::Anonymous.metadata().unwrap().is_empty());

        let metadata = Credentials::Basic {
            username: "admin".to_string(),
            password: "secret".to_string(),
        }
        .metadata()
        .unwrap();
        let header = metadata.get("authorization").unwrap();
        assert_eq!(header.to_str().unwrap(), "Basic YWRtaW46c2VjcmV0");

        let metadata = Credentials::Bearer {
            token: "tok".to_string(),
        }
        .metadata()
        .unwrap();
        let header = metadata.get("authorization").unwrap();
        assert_eq!(header.to_str().unwrap(), "Bearer tok");
    }

    #[test]
    fn descriptor_round_trips_through_serde() {
        let descriptor = ConnectionDescriptor::new("https://orion.example.com:17777")
            .with_binding(secure_binding())
            .with_credentials(Credentials::Basic {
                username: "admin".to_string(),
                password: "secret".to_string(),
            });

        let json = serde_json::to_string(&descriptor).unwrap();
        let parsed: ConnectionDescriptor = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, descriptor);
    }
}
