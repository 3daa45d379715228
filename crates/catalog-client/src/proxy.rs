use crate::activity::ActivityMonitor;
use crate::channel::{ByteStream, ChannelFactory, GrpcChannelFactory, ServiceChannel};
use crate::descriptor::ConnectionDescriptor;
use crate::{Error, PropertyBag, QueryRequest, VerbInvokeArguments};
use std::time::Duration;

/// Operations whose elapsed time exceeds this threshold are logged as
/// long running, tagged with their identifying context.
const LONG_RUNNING_THRESHOLD: Duration = Duration::from_secs(15);

/// Query issued before closing a channel that never carried a request.
/// Closing a connection whose secure session was negotiated but never
/// used can leak the half-established session on the remote side; one
/// trivial round-trip forces the handshake to complete so teardown is
/// clean. Errors from this probe are discarded.
const CLEANUP_QUERY: &str = "SELECT TOP 1 1 as Test FROM Metadata.Entity";

/// ServiceProxy is the single point of truth for whether a connection to
/// the catalog service exists, and the only place that issues calls on it.
///
/// The channel is created lazily: any operation opens it on demand, and
/// [`ServiceProxy::open`] is idempotent. After [`ServiceProxy::close`] or
/// [`ServiceProxy::abort`] the next operation opens a fresh channel.
///
/// One proxy owns exactly one channel at a time and expects a single
/// logical caller: it provides no internal mutual exclusion. Callers that
/// share a proxy across tasks must serialize access themselves, or use
/// one proxy per logical session.
///
/// Callers must tear the proxy down with [`ServiceProxy::shutdown`] on all
/// exit paths. Dropping it releases memory only; no network teardown runs
/// on drop.
pub struct ServiceProxy {
    factory: Box<dyn ChannelFactory>,
    channel: Option<Box<dyn ServiceChannel>>,
    activity: ActivityMonitor,
}

impl ServiceProxy {
    /// Build a proxy for the given descriptor, with the binding correction
    /// applied and credentials bound to the channel factory.
    pub fn new(descriptor: &ConnectionDescriptor) -> crate::Result<Self> {
        tracing::debug!(
            address = %descriptor.address,
            "creating channel factory for the catalog service"
        );
        Ok(Self::with_factory(Box::new(GrpcChannelFactory::new(
            descriptor,
        )?)))
    }

    /// Build a proxy over a caller-provided channel factory.
    pub fn with_factory(factory: Box<dyn ChannelFactory>) -> Self {
        Self {
            factory,
            channel: None,
            activity: ActivityMonitor::new(),
        }
    }

    /// Whether a channel currently exists.
    pub fn is_open(&self) -> bool {
        self.channel.is_some()
    }

    /// Open the channel if none exists. Idempotent. On failure the channel
    /// reference remains unset; a later operation starts over with a fresh
    /// channel.
    pub async fn open(&mut self) -> crate::Result<()> {
        if self.channel.is_some() {
            return Ok(());
        }

        self.activity.reset();
        let mut channel = self.factory.create(self.activity.handle());

        if let Err(err) = channel.open().await {
            tracing::error!(%err, "failed to open a connection to the catalog service");
            return Err(err);
        }

        self.channel = Some(channel);
        Ok(())
    }

    async fn channel(&mut self) -> crate::Result<&mut dyn ServiceChannel> {
        self.open().await?;
        match self.channel.as_deref_mut() {
            Some(channel) => Ok(channel),
            None => Err(Error::Protocol("connection is not open")),
        }
    }

    /// Invoke a verb on an entity type.
    pub async fn invoke(
        &mut self,
        entity: &str,
        verb: &str,
        arguments: &[serde_json::Value],
    ) -> crate::Result<serde_json::Value> {
        let channel = self.channel().await?;
        let _timer = OpTimer::start("invoke", format!("{entity}.{verb}"));

        match channel.invoke(entity, verb, arguments).await {
            Err(err @ Error::Fault(_)) => {
                tracing::error!(%err, entity, verb, "error executing invoke");
                Err(err)
            }
            result => result,
        }
    }

    /// Execute a query, returning the raw streamed response. Most callers
    /// want [`crate::StreamingQuery`], which decodes the stream into typed
    /// entities.
    pub async fn query(&mut self, request: &QueryRequest) -> crate::Result<ByteStream> {
        tracing::debug!(query = %request.text, "executing query");
        if tracing::enabled!(tracing::Level::DEBUG) {
            for (name, value) in request.parameters.iter() {
                tracing::debug!(%name, %value, "query parameter");
            }
        }

        let channel = self.channel().await?;
        let _timer = OpTimer::start("query", request.text.clone());

        match channel.query(request).await {
            Err(err @ Error::Fault(_)) => {
                tracing::error!(%err, query = %request.text, "error executing query");
                Err(err)
            }
            Err(err) => {
                tracing::error!(
                    %err,
                    query = %request.text,
                    parameters = %request.parameters,
                    "error executing query"
                );
                Err(err)
            }
            result => result,
        }
    }

    /// Create an entity, returning its URI.
    pub async fn create(
        &mut self,
        entity_type: &str,
        properties: &PropertyBag,
    ) -> crate::Result<String> {
        let channel = self.channel().await?;
        let _timer = OpTimer::start("create", entity_type);

        match channel.create(entity_type, properties).await {
            Err(err @ Error::Fault(_)) => {
                tracing::error!(%err, entity_type, %properties, "error executing create operation");
                Err(err)
            }
            result => result,
        }
    }

    /// Read the properties of the entity at `uri`.
    pub async fn read(&mut self, uri: &str) -> crate::Result<PropertyBag> {
        let channel = self.channel().await?;
        let _timer = OpTimer::start("read", uri);

        match channel.read(uri).await {
            Err(err @ Error::Fault(_)) => {
                tracing::error!(%err, uri, "error executing read operation");
                Err(err)
            }
            result => result,
        }
    }

    /// Update properties of the entity at `uri`.
    pub async fn update(&mut self, uri: &str, properties: &PropertyBag) -> crate::Result<()> {
        let channel = self.channel().await?;
        let _timer = OpTimer::start("update", uri);

        match channel.update(uri, properties).await {
            Err(err @ Error::Fault(_)) => {
                tracing::error!(%err, uri, %properties, "error executing update operation");
                Err(err)
            }
            result => result,
        }
    }

    /// Update properties of many entities in one operation.
    pub async fn bulk_update(
        &mut self,
        uris: &[String],
        properties: &PropertyBag,
    ) -> crate::Result<()> {
        let channel = self.channel().await?;
        let _timer = OpTimer::start("bulk update", uris.join(", "));

        match channel.bulk_update(uris, properties).await {
            Err(err @ Error::Fault(_)) => {
                tracing::error!(%err, ?uris, %properties, "error executing bulk update operation");
                Err(err)
            }
            result => result,
        }
    }

    /// Delete the entity at `uri`.
    pub async fn delete(&mut self, uri: &str) -> crate::Result<()> {
        let channel = self.channel().await?;
        let _timer = OpTimer::start("delete", uri);

        match channel.delete(uri).await {
            Err(err @ Error::Fault(_)) => {
                tracing::error!(%err, uri, "error executing delete operation");
                Err(err)
            }
            result => result,
        }
    }

    /// Delete many entities in one operation.
    pub async fn bulk_delete(&mut self, uris: &[String]) -> crate::Result<()> {
        let channel = self.channel().await?;
        let _timer = OpTimer::start("bulk delete", uris.join(", "));

        match channel.bulk_delete(uris).await {
            Err(err @ Error::Fault(_)) => {
                tracing::error!(%err, ?uris, "error executing bulk delete operation");
                Err(err)
            }
            result => result,
        }
    }

    /// Invoke a verb whose response is streamed.
    pub async fn streamed_invoke(
        &mut self,
        arguments: &VerbInvokeArguments,
    ) -> crate::Result<ByteStream> {
        let channel = self.channel().await?;
        let _timer = OpTimer::start(
            "streamed invoke",
            format!("{}.{}", arguments.entity, arguments.verb),
        );

        match channel.streamed_invoke(arguments).await {
            Err(err @ Error::Fault(_)) => {
                tracing::error!(
                    %err,
                    entity = %arguments.entity,
                    verb = %arguments.verb,
                    "error executing invoke"
                );
                Err(err)
            }
            result => result,
        }
    }

    /// Close the channel. A no-op if none exists. Close-time transport
    /// errors are not the caller's problem: the channel is aborted instead
    /// and the error logged. Either way the channel reference is cleared,
    /// so the next operation re-opens.
    pub async fn close(&mut self) {
        let Some(mut channel) = self.channel.take() else {
            return;
        };

        self.validate_used_connection(channel.as_mut()).await;

        if let Err(err) = channel.close().await {
            channel.abort();
            tracing::error!(%err, "error closing the service channel");
        }
    }

    /// Release the channel and factory immediately, with no remote
    /// exchange. A no-op if no channel exists.
    pub async fn abort(&mut self) {
        let Some(mut channel) = self.channel.take() else {
            return;
        };

        self.validate_used_connection(channel.as_mut()).await;

        channel.abort();
        self.factory.abort();
    }

    /// Tear the proxy down: close the channel, then the factory, falling
    /// back to abort on either. Never fails, and is safe to call more than
    /// once.
    pub async fn shutdown(&mut self) {
        self.close().await;

        if let Err(err) = self.factory.close().await {
            tracing::error!(%err, "error closing the channel factory");
            self.factory.abort();
        }
    }

    /// Issue the cleanup probe over a channel that never carried a
    /// request, so its secure session finishes negotiating and tears down
    /// cleanly. Best-effort hygiene: errors here must never mask the
    /// caller's close or abort outcome.
    async fn validate_used_connection(&self, channel: &mut dyn ServiceChannel) {
        if self.activity.request_sent() {
            return;
        }

        tracing::info!("connection was opened but never carried a request; probing before teardown");

        _ = channel.query(&QueryRequest::new(CLEANUP_QUERY)).await;
    }
}

/// Times one wrapped operation, and logs a warning on drop when it ran
/// longer than [`LONG_RUNNING_THRESHOLD`]. Drop fires on success and error
/// paths alike.
struct OpTimer {
    op: &'static str,
    target: String,
    started: tokio::time::Instant,
}

impl OpTimer {
    fn start(op: &'static str, target: impl Into<String>) -> Self {
        Self {
            op,
            target: target.into(),
            started: tokio::time::Instant::now(),
        }
    }
}

impl Drop for OpTimer {
    fn drop(&mut self) {
        let elapsed = self.started.elapsed();
        if elapsed > LONG_RUNNING_THRESHOLD {
            tracing::warn!(
                op = self.op,
                target = %self.target,
                elapsed_ms = elapsed.as_millis() as u64,
                "long running operation"
            );
        }
    }
}
