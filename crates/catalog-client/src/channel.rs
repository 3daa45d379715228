use crate::activity::ActivityHandle;
use crate::descriptor::ConnectionDescriptor;
use crate::{Error, PropertyBag, QueryRequest, VerbInvokeArguments};
use futures::StreamExt;
use proto_catalog::catalog as proto;
use std::time::Duration;
use tonic::transport::{Channel, Endpoint};

/// A streamed response: opaque byte chunks, decoded incrementally by the
/// caller. Chunk boundaries carry no meaning.
pub type ByteStream = futures::stream::BoxStream<'static, crate::Result<bytes::Bytes>>;

/// The fixed contract of a connection-oriented channel to the catalog
/// service. One channel is one connection; it's opened once, used for any
/// number of requests, and then closed or aborted.
///
/// [`crate::ServiceProxy`] is the only intended caller. The trait exists as
/// the seam between the proxy's lifecycle management and the transport, so
/// embedding tools can substitute their own.
#[async_trait::async_trait]
pub trait ServiceChannel: Send {
    /// Establish the connection. Called exactly once, before any request.
    async fn open(&mut self) -> crate::Result<()>;

    async fn invoke(
        &mut self,
        entity: &str,
        verb: &str,
        arguments: &[serde_json::Value],
    ) -> crate::Result<serde_json::Value>;

    async fn query(&mut self, request: &QueryRequest) -> crate::Result<ByteStream>;

    async fn create(&mut self, entity_type: &str, properties: &PropertyBag)
        -> crate::Result<String>;

    async fn read(&mut self, uri: &str) -> crate::Result<PropertyBag>;

    async fn update(&mut self, uri: &str, properties: &PropertyBag) -> crate::Result<()>;

    async fn bulk_update(&mut self, uris: &[String], properties: &PropertyBag)
        -> crate::Result<()>;

    async fn delete(&mut self, uri: &str) -> crate::Result<()>;

    async fn bulk_delete(&mut self, uris: &[String]) -> crate::Result<()>;

    async fn streamed_invoke(&mut self, arguments: &VerbInvokeArguments)
        -> crate::Result<ByteStream>;

    /// Gracefully tear down the connection, exchanging a session close with
    /// the remote side. The transport is released even when this fails.
    async fn close(&mut self) -> crate::Result<()>;

    /// Release the connection immediately, with no remote exchange.
    fn abort(&mut self);
}

/// Creates channels from an immutable connection configuration.
#[async_trait::async_trait]
pub trait ChannelFactory: Send {
    /// Create a new, not-yet-opened channel. `activity` must be marked on
    /// every request sent over the channel.
    fn create(&self, activity: ActivityHandle) -> Box<dyn ServiceChannel>;

    /// Gracefully release any resources shared across channels.
    async fn close(&mut self) -> crate::Result<()>;

    /// Release shared resources immediately.
    fn abort(&mut self);
}

/// Maps a failed RPC onto the error taxonomy: a structured fault attached
/// to the status details becomes [`Error::Fault`]; everything else stays a
/// transport-level status.
pub(crate) fn fault_from_status(status: tonic::Status) -> Error {
    match proto::Fault::from_status(&status) {
        Some(fault) => Error::Fault(fault),
        None => Error::Grpc(status),
    }
}

fn decode_json<T: serde::de::DeserializeOwned>(json: &str) -> crate::Result<T> {
    serde_json::from_str(json).map_err(|source| Error::Parsing { offset: 0, source })
}

/// Interceptor applied to every request of a [`GrpcChannel`]: attaches the
/// credential metadata and marks the activity flag.
#[derive(Clone)]
struct SessionInterceptor {
    metadata: tonic::metadata::MetadataMap,
    activity: ActivityHandle,
}

impl tonic::service::Interceptor for SessionInterceptor {
    fn call(
        &mut self,
        mut request: tonic::Request<()>,
    ) -> std::result::Result<tonic::Request<()>, tonic::Status> {
        self.activity.mark();

        let out = request.metadata_mut();
        out.reserve(self.metadata.len());

        for entry in self.metadata.iter() {
            match entry {
                tonic::metadata::KeyAndValueRef::Ascii(key, value) => {
                    _ = out.insert(key, value.clone());
                }
                tonic::metadata::KeyAndValueRef::Binary(key, value) => {
                    _ = out.insert_bin(key, value.clone());
                }
            }
        }
        Ok(request)
    }
}

type SubClient = proto::catalog_service_client::CatalogServiceClient<
    tonic::service::interceptor::InterceptedService<Channel, SessionInterceptor>,
>;

/// The production [`ServiceChannel`]: a gRPC connection to the catalog
/// service.
pub(crate) struct GrpcChannel {
    endpoint: Endpoint,
    metadata: tonic::metadata::MetadataMap,
    operation_timeout: Duration,
    close_timeout: Duration,
    activity: ActivityHandle,
    client: Option<SubClient>,
}

impl GrpcChannel {
    fn client(&mut self) -> crate::Result<&mut SubClient> {
        self.client
            .as_mut()
            .ok_or(Error::Protocol("channel is not open"))
    }

    fn chunks(streaming: tonic::codec::Streaming<proto::QueryChunk>) -> ByteStream {
        streaming
            .map(|item| match item {
                Ok(chunk) => Ok(chunk.content),
                Err(status) => Err(fault_from_status(status)),
            })
            .boxed()
    }
}

#[async_trait::async_trait]
impl ServiceChannel for GrpcChannel {
    async fn open(&mut self) -> crate::Result<()> {
        if self.client.is_some() {
            return Ok(());
        }

        let channel = self
            .endpoint
            .clone()
            .timeout(self.operation_timeout)
            .connect()
            .await
            .map_err(Error::Connect)?;

        let interceptor = SessionInterceptor {
            metadata: self.metadata.clone(),
            activity: self.activity.clone(),
        };
        self.client = Some(
            proto::catalog_service_client::CatalogServiceClient::with_interceptor(
                channel,
                interceptor,
            ),
        );
        Ok(())
    }

    async fn invoke(
        &mut self,
        entity: &str,
        verb: &str,
        arguments: &[serde_json::Value],
    ) -> crate::Result<serde_json::Value> {
        let request = proto::InvokeRequest {
            entity: entity.to_string(),
            verb: verb.to_string(),
            arguments_json: arguments.iter().map(|a| a.to_string()).collect(),
        };
        let response = self
            .client()?
            .invoke(request)
            .await
            .map_err(fault_from_status)?
            .into_inner();

        if response.result_json.is_empty() {
            return Ok(serde_json::Value::Null);
        }
        decode_json(&response.result_json)
    }

    async fn query(&mut self, request: &QueryRequest) -> crate::Result<ByteStream> {
        let request = proto::QueryRequest {
            text: request.text.clone(),
            parameters: request
                .parameters
                .iter()
                .map(|(name, value)| proto::query_request::Parameter {
                    name: name.clone(),
                    value_json: value.to_string(),
                })
                .collect(),
        };
        let streaming = self
            .client()?
            .query(request)
            .await
            .map_err(fault_from_status)?
            .into_inner();

        Ok(Self::chunks(streaming))
    }

    async fn create(
        &mut self,
        entity_type: &str,
        properties: &PropertyBag,
    ) -> crate::Result<String> {
        let request = proto::CreateRequest {
            entity_type: entity_type.to_string(),
            properties_json: serde_json::to_string(properties)
                .map_err(|source| Error::Parsing { offset: 0, source })?,
        };
        let response = self
            .client()?
            .create(request)
            .await
            .map_err(fault_from_status)?
            .into_inner();

        Ok(response.uri)
    }

    async fn read(&mut self, uri: &str) -> crate::Result<PropertyBag> {
        let request = proto::ReadRequest {
            uri: uri.to_string(),
        };
        let response = self
            .client()?
            .read(request)
            .await
            .map_err(fault_from_status)?
            .into_inner();

        if response.properties_json.is_empty() {
            return Ok(PropertyBag::default());
        }
        decode_json(&response.properties_json)
    }

    async fn update(&mut self, uri: &str, properties: &PropertyBag) -> crate::Result<()> {
        let request = proto::UpdateRequest {
            uri: uri.to_string(),
            properties_json: serde_json::to_string(properties)
                .map_err(|source| Error::Parsing { offset: 0, source })?,
        };
        self.client()?
            .update(request)
            .await
            .map_err(fault_from_status)?;
        Ok(())
    }

    async fn bulk_update(
        &mut self,
        uris: &[String],
        properties: &PropertyBag,
    ) -> crate::Result<()> {
        let request = proto::BulkUpdateRequest {
            uris: uris.to_vec(),
            properties_json: serde_json::to_string(properties)
                .map_err(|source| Error::Parsing { offset: 0, source })?,
        };
        self.client()?
            .bulk_update(request)
            .await
            .map_err(fault_from_status)?;
        Ok(())
    }

    async fn delete(&mut self, uri: &str) -> crate::Result<()> {
        let request = proto::DeleteRequest {
            uri: uri.to_string(),
        };
        self.client()?
            .delete(request)
            .await
            .map_err(fault_from_status)?;
        Ok(())
    }

    async fn bulk_delete(&mut self, uris: &[String]) -> crate::Result<()> {
        let request = proto::BulkDeleteRequest {
            uris: uris.to_vec(),
        };
        self.client()?
            .bulk_delete(request)
            .await
            .map_err(fault_from_status)?;
        Ok(())
    }

    async fn streamed_invoke(
        &mut self,
        arguments: &VerbInvokeArguments,
    ) -> crate::Result<ByteStream> {
        let request = proto::StreamedInvokeRequest {
            entity: arguments.entity.clone(),
            verb: arguments.verb.clone(),
            arguments_json: arguments.arguments.iter().map(|a| a.to_string()).collect(),
        };
        let streaming = self
            .client()?
            .streamed_invoke(request)
            .await
            .map_err(fault_from_status)?
            .into_inner();

        Ok(Self::chunks(streaming))
    }

    async fn close(&mut self) -> crate::Result<()> {
        // Release the transport regardless of how the session close goes.
        let Some(mut client) = self.client.take() else {
            return Ok(());
        };

        let close = client.close_session(proto::CloseSessionRequest {});
        match tokio::time::timeout(self.close_timeout, close).await {
            Ok(Ok(_)) => Ok(()),
            Ok(Err(status)) => Err(fault_from_status(status)),
            Err(_elapsed) => Err(Error::Grpc(tonic::Status::deadline_exceeded(
                "session close timed out",
            ))),
        }
    }

    fn abort(&mut self) {
        self.client = None;
    }
}

/// The production [`ChannelFactory`]: builds [`GrpcChannel`]s from a
/// connection descriptor, with the binding correction applied once up
/// front.
pub struct GrpcChannelFactory {
    endpoint: Endpoint,
    metadata: tonic::metadata::MetadataMap,
    operation_timeout: Duration,
    close_timeout: Duration,
}

impl GrpcChannelFactory {
    pub fn new(descriptor: &ConnectionDescriptor) -> crate::Result<Self> {
        let binding = descriptor.binding.corrected();

        Ok(Self {
            endpoint: binding.endpoint(&descriptor.address)?,
            metadata: descriptor.credentials.metadata()?,
            operation_timeout: descriptor.operation_timeout,
            close_timeout: binding.close_timeout,
        })
    }
}

#[async_trait::async_trait]
impl ChannelFactory for GrpcChannelFactory {
    fn create(&self, activity: ActivityHandle) -> Box<dyn ServiceChannel> {
        Box::new(GrpcChannel {
            endpoint: self.endpoint.clone(),
            metadata: self.metadata.clone(),
            operation_timeout: self.operation_timeout,
            close_timeout: self.close_timeout,
            activity,
            client: None,
        })
    }

    // A gRPC endpoint holds no live transport of its own; channels own
    // their connections outright.
    async fn close(&mut self) -> crate::Result<()> {
        Ok(())
    }

    fn abort(&mut self) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::{Binding, Credentials, TlsSettings};
    use prost::Message;

    #[test]
    fn faults_decode_from_status_details() {
        let fault = proto::Fault {
            entity: "Orion.Nodes".to_string(),
            verb: "Unmanage".to_string(),
            message: "verb is not supported".to_string(),
            detail: String::new(),
        };
        let status = tonic::Status::with_details(
            tonic::Code::FailedPrecondition,
            "verb is not supported",
            fault.encode_to_vec().into(),
        );

        match fault_from_status(status) {
            Error::Fault(decoded) => assert_eq!(decoded, fault),
            other => panic!("expected a fault, got {other:?}"),
        }
    }

    #[test]
    fn statuses_without_details_stay_transport_errors() {
        let status = tonic::Status::unavailable("connection reset");
        assert!(matches!(
            fault_from_status(status),
            Error::Grpc(status) if status.code() == tonic::Code::Unavailable
        ));
    }

    #[test]
    fn factory_applies_descriptor_settings() {
        let descriptor = ConnectionDescriptor::new("https://orion.example.com:17777")
            .with_binding(Binding::secure(TlsSettings::default()))
            .with_credentials(Credentials::Bearer {
                token: "tok".to_string(),
            });

        let factory = GrpcChannelFactory::new(&descriptor).unwrap();
        assert_eq!(factory.operation_timeout, descriptor.operation_timeout);
        assert_eq!(factory.close_timeout, descriptor.binding.close_timeout);
        assert_eq!(
            factory
                .metadata
                .get("authorization")
                .unwrap()
                .to_str()
                .unwrap(),
            "Bearer tok"
        );
    }

    #[test]
    fn factory_rejects_malformed_addresses() {
        let descriptor = ConnectionDescriptor::new("not a uri");
        assert!(matches!(
            GrpcChannelFactory::new(&descriptor),
            Err(Error::InvalidEndpoint(_))
        ));
    }
}
