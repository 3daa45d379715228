use crate::Error;
use serde::de::Error as _;
use std::marker::PhantomData;

/// How a query response is framed for a given entity type.
///
/// Declared per type through [`Entity::FRAMING`] and resolved once per
/// [`crate::StreamingQuery`] construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Framing {
    /// The response is a concatenated sequence of entity documents.
    Entities,
    /// The response is a collection envelope, `{"items": [...]}`, whose
    /// elements are the entities.
    Collection,
}

/// A typed record decodable from a query response.
///
/// The associated `FRAMING` constant is the per-type metadata that selects
/// the decoding strategy; most types keep the default.
pub trait Entity: serde::de::DeserializeOwned {
    const FRAMING: Framing = Framing::Entities;
}

/// Ad-hoc queries decode rows as plain JSON documents.
impl Entity for serde_json::Value {}

impl Entity for crate::PropertyBag {}

/// Decodes one entity at a time from the chunks of a streamed response.
///
/// The strategy is fixed at construction; the only state carried across
/// calls is buffered stream position. `next` returns `Ok(None)` when more
/// chunks are needed, and `finish` validates clean termination once the
/// chunk stream is exhausted.
pub(crate) enum EntityParser<T> {
    Entities(DocumentParser<T>),
    Collection(CollectionParser<T>),
}

impl<T: serde::de::DeserializeOwned> EntityParser<T> {
    pub(crate) fn new(framing: Framing) -> Self {
        match framing {
            Framing::Entities => Self::Entities(DocumentParser::new()),
            Framing::Collection => Self::Collection(CollectionParser::new()),
        }
    }

    pub(crate) fn push(&mut self, chunk: &[u8]) {
        match self {
            Self::Entities(parser) => parser.buf.push(chunk),
            Self::Collection(parser) => parser.buf.push(chunk),
        }
    }

    pub(crate) fn next(&mut self) -> crate::Result<Option<T>> {
        match self {
            Self::Entities(parser) => parser.next(),
            Self::Collection(parser) => parser.next(),
        }
    }

    pub(crate) fn finish(&mut self) -> crate::Result<()> {
        match self {
            Self::Entities(parser) => parser.finish(),
            Self::Collection(parser) => parser.finish(),
        }
    }
}

fn is_json_ws(byte: u8) -> bool {
    matches!(byte, b' ' | b'\t' | b'\n' | b'\r')
}

/// Buffered, not-yet-consumed response content. `data[pos..]` is pending;
/// `base` is the stream offset of `data[0]`, for error reporting.
struct Buffer {
    data: Vec<u8>,
    pos: usize,
    base: u64,
}

impl Buffer {
    fn new() -> Self {
        Self {
            data: Vec::new(),
            pos: 0,
            base: 0,
        }
    }

    fn push(&mut self, chunk: &[u8]) {
        // Compact the consumed prefix so the buffer tracks the unconsumed
        // suffix of the stream rather than the whole response.
        if self.pos != 0 {
            self.base += self.pos as u64;
            self.data.drain(..self.pos);
            self.pos = 0;
        }
        self.data.extend_from_slice(chunk);
    }

    fn pending(&self) -> &[u8] {
        &self.data[self.pos..]
    }

    fn skip_ws(&mut self) {
        while self.data.get(self.pos).copied().map_or(false, is_json_ws) {
            self.pos += 1;
        }
    }

    fn offset(&self) -> u64 {
        self.base + self.pos as u64
    }

    fn error(&self, source: serde_json::Error) -> Error {
        Error::Parsing {
            offset: self.offset(),
            source,
        }
    }
}

/// Default strategy: the response is a concatenated sequence of entity
/// documents, decoded one at a time. Documents may split across chunk
/// boundaries arbitrarily.
pub(crate) struct DocumentParser<T> {
    buf: Buffer,
    _marker: PhantomData<fn() -> T>,
}

impl<T: serde::de::DeserializeOwned> DocumentParser<T> {
    fn new() -> Self {
        Self {
            buf: Buffer::new(),
            _marker: PhantomData,
        }
    }

    fn next(&mut self) -> crate::Result<Option<T>> {
        let mut iter = serde_json::Deserializer::from_slice(self.buf.pending()).into_iter::<T>();
        match iter.next() {
            None => Ok(None),
            Some(Ok(entity)) => {
                self.buf.pos += iter.byte_offset();
                Ok(Some(entity))
            }
            // The trailing document is incomplete until more chunks arrive.
            Some(Err(err)) if err.is_eof() => Ok(None),
            Some(Err(err)) => Err(self.buf.error(err)),
        }
    }

    fn finish(&mut self) -> crate::Result<()> {
        if self.buf.pending().iter().all(|byte| is_json_ws(*byte)) {
            return Ok(());
        }
        let mut iter = serde_json::Deserializer::from_slice(self.buf.pending()).into_iter::<T>();
        let err = match iter.next() {
            Some(Err(err)) => err,
            _ => serde_json::Error::custom("truncated entity document"),
        };
        Err(self.buf.error(err))
    }
}

/// Collection strategy: the response is a `{"items": [...]}` envelope and
/// entities are its elements, still decoded one at a time. Content after
/// the closing bracket is ignored.
pub(crate) struct CollectionParser<T> {
    buf: Buffer,
    state: CollectionState,
    _marker: PhantomData<fn() -> T>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum CollectionState {
    /// Matching the `{"items": [` envelope prefix.
    Prologue,
    /// Expecting the first element, or `]`.
    FirstItem,
    /// Expecting `,` or `]` after an element.
    Separator,
    /// Expecting an element after a consumed `,`.
    Item,
    Done,
}

impl<T: serde::de::DeserializeOwned> CollectionParser<T> {
    fn new() -> Self {
        Self {
            buf: Buffer::new(),
            state: CollectionState::Prologue,
            _marker: PhantomData,
        }
    }

    fn next(&mut self) -> crate::Result<Option<T>> {
        loop {
            match self.state {
                CollectionState::Prologue => {
                    if !self.scan_prologue()? {
                        return Ok(None);
                    }
                    self.state = CollectionState::FirstItem;
                }
                CollectionState::FirstItem | CollectionState::Item => {
                    self.buf.skip_ws();
                    let Some(&byte) = self.buf.data.get(self.buf.pos) else {
                        return Ok(None);
                    };
                    if byte == b']' && self.state == CollectionState::FirstItem {
                        self.buf.pos += 1;
                        self.state = CollectionState::Done;
                        continue;
                    }
                    return self.next_item();
                }
                CollectionState::Separator => {
                    self.buf.skip_ws();
                    match self.buf.data.get(self.buf.pos) {
                        None => return Ok(None),
                        Some(b',') => {
                            self.buf.pos += 1;
                            self.state = CollectionState::Item;
                        }
                        Some(b']') => {
                            self.buf.pos += 1;
                            self.state = CollectionState::Done;
                        }
                        Some(_) => {
                            return Err(self.buf.error(serde_json::Error::custom(
                                "expected ',' or ']' between collection items",
                            )))
                        }
                    }
                }
                CollectionState::Done => return Ok(None),
            }
        }
    }

    fn next_item(&mut self) -> crate::Result<Option<T>> {
        let mut iter = serde_json::Deserializer::from_slice(self.buf.pending()).into_iter::<T>();
        match iter.next() {
            None => Ok(None),
            Some(Ok(entity)) => {
                self.buf.pos += iter.byte_offset();
                self.state = CollectionState::Separator;
                Ok(Some(entity))
            }
            Some(Err(err)) if err.is_eof() => Ok(None),
            Some(Err(err)) => Err(self.buf.error(err)),
        }
    }

    /// Match the envelope prefix against the buffered content. Returns
    /// false if the buffer ends before the prefix does.
    fn scan_prologue(&mut self) -> crate::Result<bool> {
        const TOKENS: [&[u8]; 4] = [b"{", b"\"items\"", b":", b"["];

        let mut i = self.buf.pos;
        for token in TOKENS {
            while self.buf.data.get(i).copied().map_or(false, is_json_ws) {
                i += 1;
            }
            let tail = &self.buf.data[i..];
            if tail.len() < token.len() {
                if token.starts_with(tail) {
                    return Ok(false);
                }
                return Err(self.envelope_error(i));
            }
            if &tail[..token.len()] != token {
                return Err(self.envelope_error(i));
            }
            i += token.len();
        }

        self.buf.pos = i;
        Ok(true)
    }

    fn envelope_error(&self, at: usize) -> Error {
        Error::Parsing {
            offset: self.buf.base + at as u64,
            source: serde_json::Error::custom(
                "expected a collection envelope of the form {\"items\": [...]}",
            ),
        }
    }

    fn finish(&mut self) -> crate::Result<()> {
        match self.state {
            CollectionState::Done => Ok(()),
            // A response with no content at all decodes as zero entities.
            CollectionState::Prologue if self.buf.data.iter().all(|byte| is_json_ws(*byte)) => {
                Ok(())
            }
            _ => Err(self
                .buf
                .error(serde_json::Error::custom("truncated collection response"))),
        }
    }
}
