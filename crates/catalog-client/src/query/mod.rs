use crate::channel::ByteStream;
use crate::proxy::ServiceProxy;
use crate::{PropertyBag, QueryRequest};
use futures::StreamExt;
use std::marker::PhantomData;

mod parse;
pub use parse::{Entity, Framing};
use parse::EntityParser;

/// A query whose results decode as a lazy sequence of `T`.
///
/// The decoding strategy is resolved once, from `T`'s declared framing,
/// when the query is constructed. Each call to [`StreamingQuery::results`]
/// is an independent execution: it issues the query to the service again
/// and decodes a fresh response stream. The sequence is not a rewindable
/// cursor over a buffered result set.
pub struct StreamingQuery<T: Entity> {
    request: QueryRequest,
    framing: Framing,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Entity> StreamingQuery<T> {
    pub fn new(text: impl Into<String>) -> Self {
        Self::with_parameters(text, PropertyBag::default())
    }

    pub fn with_parameters(text: impl Into<String>, parameters: PropertyBag) -> Self {
        Self {
            request: QueryRequest::with_parameters(text, parameters),
            framing: T::FRAMING,
            _marker: PhantomData,
        }
    }

    /// Execute the query and return its decoded results.
    ///
    /// A failure to execute surfaces here, before any entity is produced.
    /// The returned stream is finite, forward-only, and single-pass; call
    /// `results` again for a fresh execution.
    pub async fn results(&self, proxy: &mut ServiceProxy) -> crate::Result<QueryResults<T>> {
        let chunks = proxy.query(&self.request).await?;
        Ok(QueryResults::new(chunks, self.framing))
    }
}

pin_project_lite::pin_project! {
    /// A finite stream of entities decoded lazily from one query
    /// execution.
    ///
    /// Entities are pulled from the response one at a time; nothing is
    /// materialized ahead of the caller. A decode failure surfaces at the
    /// failing pull and terminates the stream — entities already yielded
    /// remain valid.
    pub struct QueryResults<T> {
        inner: ByteStream,
        parser: EntityParser<T>,
        exhausted: bool,
        done: bool,
    }
}

impl<T: serde::de::DeserializeOwned> QueryResults<T> {
    pub(crate) fn new(inner: ByteStream, framing: Framing) -> Self {
        Self {
            inner,
            parser: EntityParser::new(framing),
            exhausted: false,
            done: false,
        }
    }
}

impl<T: serde::de::DeserializeOwned> futures::Stream for QueryResults<T> {
    type Item = crate::Result<T>;

    fn poll_next(
        self: std::pin::Pin<&mut Self>,
        cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Option<Self::Item>> {
        use std::task::Poll;
        let me = self.project();

        if *me.done {
            return Poll::Ready(None);
        }

        loop {
            // Drain entities already buffered before pulling more chunks.
            match me.parser.next() {
                Ok(Some(entity)) => return Poll::Ready(Some(Ok(entity))),
                Ok(None) => {}
                Err(err) => {
                    *me.done = true;
                    return Poll::Ready(Some(Err(err)));
                }
            }

            if *me.exhausted {
                *me.done = true;
                return match me.parser.finish() {
                    Ok(()) => Poll::Ready(None),
                    Err(err) => Poll::Ready(Some(Err(err))),
                };
            }

            match me.inner.poll_next_unpin(cx) {
                Poll::Ready(Some(Ok(chunk))) => me.parser.push(&chunk),
                Poll::Ready(Some(Err(err))) => {
                    *me.done = true;
                    return Poll::Ready(Some(Err(err)));
                }
                Poll::Ready(None) => *me.exhausted = true,
                Poll::Pending => return Poll::Pending,
            }
        }
    }
}

impl<T: serde::de::DeserializeOwned> futures::stream::FusedStream for QueryResults<T> {
    fn is_terminated(&self) -> bool {
        self.done
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;
    use futures::stream;

    #[derive(Debug, PartialEq, serde::Deserialize)]
    struct Node {
        id: u32,
        name: String,
    }

    impl Entity for Node {}

    fn chunks(parts: &[&str]) -> ByteStream {
        let parts: Vec<crate::Result<bytes::Bytes>> = parts
            .iter()
            .map(|part| Ok(bytes::Bytes::from(part.to_string())))
            .collect();
        stream::iter(parts).boxed()
    }

    fn map_result(result: crate::Result<Node>) -> (i64, String) {
        match result {
            Ok(node) => (node.id as i64, node.name),
            Err(err) => (-1, format!("ERR:{err}")),
        }
    }

    async fn collect(inner: ByteStream, framing: Framing) -> Vec<(i64, String)> {
        QueryResults::<Node>::new(inner, framing)
            .map(map_result)
            .collect()
            .await
    }

    #[tokio::test]
    async fn yields_entities_across_chunk_splits() {
        assert_eq!(
            collect(
                chunks(&[r#"{"id": 1, "name": "a"} {"id""#, r#": 2, "name": "b"}"#]),
                Framing::Entities,
            )
            .await,
            vec![(1, "a".to_string()), (2, "b".to_string())],
        );

        assert_eq!(
            collect(
                chunks(&[r#"{"items": [{"id": 1, "name": "a"}"#, r#", {"id": 2, "name": "b"}]}"#]),
                Framing::Collection,
            )
            .await,
            vec![(1, "a".to_string()), (2, "b".to_string())],
        );
    }

    #[tokio::test]
    async fn empty_stream_terminates_cleanly() {
        assert_eq!(collect(chunks(&[]), Framing::Entities).await, vec![]);
    }

    #[tokio::test]
    async fn parse_error_terminates_after_valid_prefix() {
        let out = collect(
            chunks(&[r#"{"id": 1, "name": "a"} garbage"#]),
            Framing::Entities,
        )
        .await;

        assert_eq!(out.len(), 2);
        assert_eq!(out[0], (1, "a".to_string()));
        assert_eq!(out[1].0, -1);
    }

    #[tokio::test]
    async fn transport_error_passes_through() {
        let inner: ByteStream = stream::iter(vec![
            Ok(bytes::Bytes::from_static(br#"{"id": 1, "name": "a"} "#)),
            Err(Error::Protocol("stream reset")),
        ])
        .boxed();

        let out = collect(inner, Framing::Entities).await;
        assert_eq!(out.len(), 2);
        assert_eq!(out[0], (1, "a".to_string()));
        assert_eq!(out[1], (-1, "ERR:stream reset".to_string()));
    }

    #[tokio::test]
    async fn terminates_fused_after_error() {
        use futures::stream::FusedStream;

        let mut results =
            QueryResults::<Node>::new(chunks(&["garbage"]), Framing::Entities);

        assert!(results.next().await.unwrap().is_err());
        assert!(results.is_terminated());
        assert!(results.next().await.is_none());
    }

    #[tokio::test]
    async fn truncated_stream_errors_at_finish() {
        let out = collect(chunks(&[r#"{"id": 1, "name": "a"} {"id":"#]), Framing::Entities).await;
        assert_eq!(out.len(), 2);
        assert_eq!(out[0], (1, "a".to_string()));
        assert_eq!(out[1].0, -1);
    }
}
