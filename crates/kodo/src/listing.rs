//! Bucket listing
//!
//! Bounded listing is one request returning one page. Streaming listing
//! posts to `/v2/list` and reads a long-lived response carrying one JSON
//! record after another; a producer task decodes the records and hands
//! them to the caller's [`ListStream`] one at a time.
//!
//! Streaming states: connecting, streaming, then one of completed,
//! cancelled or failed. Every terminal state closes the response body
//! exactly once.

use bytes::Bytes;
use futures::StreamExt;
use kc_core::{
    Error, ListEntry, ListEntryKind, ListItem, ListPage, ListQuery, ListSender, ListStream,
    Result, StreamOutcome, list_channel,
};
use serde::Deserialize;
use tokio_util::sync::CancellationToken;

use crate::client::KodoClient;
use crate::region::RegionResolver;
use crate::transport::{ByteStream, HttpRequest};
use crate::uri::{uri_list, uri_list_v2};

/// Largest page bounded listing accepts
pub const MAX_LIST_LIMIT: i64 = 1000;

/// Reject a page size outside `[1, MAX_LIST_LIMIT]` before anything is sent
pub fn validate_limit(limit: i64) -> Result<()> {
    if !(1..=MAX_LIST_LIMIT).contains(&limit) {
        return Err(Error::InvalidArgument(format!(
            "invalid list limit {limit}, only [1, {MAX_LIST_LIMIT}] is allowed"
        )));
    }
    Ok(())
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct ListFilesRet {
    marker: String,
    items: Vec<ListItem>,
    common_prefixes: Vec<String>,
}

impl From<ListFilesRet> for ListPage {
    fn from(ret: ListFilesRet) -> Self {
        ListPage {
            items: ret.items.into_iter().filter(|i| !i.is_empty()).collect(),
            common_prefixes: ret.common_prefixes,
            has_more: !ret.marker.is_empty(),
            next_marker: ret.marker,
        }
    }
}

pub(crate) async fn list_page(
    client: &KodoClient,
    resolver: &RegionResolver,
    bucket: &str,
    query: &ListQuery,
    limit: i64,
) -> Result<ListPage> {
    validate_limit(limit)?;

    let host = resolver.rsf_host(bucket).await?;
    let request = HttpRequest::post(format!("{host}{}", uri_list(bucket, query, limit)));
    let ret: Option<ListFilesRet> = client.request(request).await?;
    Ok(ret.unwrap_or_default().into())
}

/// One record of the `/v2/list` stream
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ListRecord {
    marker: String,
    item: Option<ListItem>,
    dir: String,
}

impl ListRecord {
    fn into_entry(self) -> ListEntry {
        let kind = if !self.dir.is_empty() {
            ListEntryKind::Dir(self.dir)
        } else {
            match self.item {
                Some(item) if !item.is_empty() => ListEntryKind::Object(item),
                _ => ListEntryKind::Marker,
            }
        };
        ListEntry {
            marker: self.marker,
            kind,
        }
    }
}

/// Largest record the stream decoder holds while waiting for its end
const MAX_RECORD_BYTES: usize = 1 << 20;

/// Incremental decoder for concatenated JSON records
#[derive(Debug, Default)]
struct RecordDecoder {
    buf: Vec<u8>,
    /// Buffer length at the last parse that ran out of input
    scanned: Option<usize>,
}

impl RecordDecoder {
    fn push(&mut self, chunk: &[u8]) {
        self.buf.extend_from_slice(chunk);
    }

    /// Next complete record, `None` until more bytes arrive
    fn next_record(&mut self) -> Result<Option<ListRecord>> {
        // a record cannot end before another `}` arrives
        if self
            .scanned
            .is_some_and(|scanned| !self.buf[scanned..].contains(&b'}'))
        {
            return self.incomplete();
        }

        let mut records =
            serde_json::Deserializer::from_slice(&self.buf).into_iter::<ListRecord>();
        match records.next() {
            Some(Ok(record)) => {
                let consumed = records.byte_offset();
                self.buf.drain(..consumed);
                self.scanned = None;
                Ok(Some(record))
            }
            Some(Err(e)) if e.is_eof() => {
                self.scanned = Some(self.buf.len());
                self.incomplete()
            }
            Some(Err(e)) => Err(Error::Decode(format!("malformed listing record: {e}"))),
            None => {
                self.buf.clear();
                self.scanned = None;
                Ok(None)
            }
        }
    }

    fn incomplete(&self) -> Result<Option<ListRecord>> {
        if self.buf.len() > MAX_RECORD_BYTES {
            return Err(Error::Decode(format!(
                "listing record larger than {MAX_RECORD_BYTES} bytes"
            )));
        }
        Ok(None)
    }

    /// Check nothing but whitespace is left once the body has ended
    fn finish(&self) -> Result<()> {
        if self.buf.iter().all(u8::is_ascii_whitespace) {
            Ok(())
        } else {
            Err(Error::Decode(
                "listing stream ended in the middle of a record".into(),
            ))
        }
    }
}

/// Owns the response body; `close` releases it once
struct Connection {
    body: Option<ByteStream>,
}

impl Connection {
    fn new(body: ByteStream) -> Self {
        Self { body: Some(body) }
    }

    async fn next_chunk(&mut self) -> Option<Result<Bytes>> {
        match self.body.as_mut() {
            Some(body) => body.next().await,
            None => None,
        }
    }

    fn close(&mut self) {
        if self.body.take().is_some() {
            tracing::debug!("listing connection closed");
        }
    }
}

impl Drop for Connection {
    fn drop(&mut self) {
        self.close();
    }
}

enum Ending {
    Completed,
    Cancelled,
    Failed(Error),
}

/// Producer task: read, decode, hand over, until the stream ends
async fn produce(mut conn: Connection, sender: ListSender) {
    let mut decoder = RecordDecoder::default();
    let mut delivered = 0usize;

    let ending = 'read: loop {
        loop {
            match decoder.next_record() {
                Ok(Some(record)) => {
                    if !sender.send(record.into_entry()).await {
                        break 'read Ending::Cancelled;
                    }
                    delivered += 1;
                }
                Ok(None) => break,
                Err(e) => break 'read Ending::Failed(e),
            }
        }

        let chunk = tokio::select! {
            biased;
            _ = sender.cancellation_token().cancelled() => break 'read Ending::Cancelled,
            chunk = conn.next_chunk() => chunk,
        };
        match chunk {
            Some(Ok(bytes)) => decoder.push(&bytes),
            Some(Err(e)) => break 'read Ending::Failed(e),
            None => match decoder.finish() {
                Ok(()) => break 'read Ending::Completed,
                Err(e) => break 'read Ending::Failed(e),
            },
        }
    };

    conn.close();
    match ending {
        Ending::Completed => {
            tracing::debug!(delivered, "listing stream completed");
            sender.complete().await;
        }
        Ending::Cancelled => {
            tracing::debug!(delivered, "listing stream cancelled");
        }
        Ending::Failed(e) => {
            tracing::warn!(delivered, error = %e, "listing stream failed");
            sender.fail(e).await;
        }
    }
}

pub(crate) async fn list_stream(
    client: &KodoClient,
    resolver: &RegionResolver,
    bucket: &str,
    query: &ListQuery,
    cancel: &CancellationToken,
) -> Result<ListStream> {
    let host = resolver.rsf_host(bucket).await?;
    let request = HttpRequest::post(format!("{host}{}", uri_list_v2(bucket, query)));

    tracing::debug!(bucket, "listing stream connecting");
    let body = tokio::select! {
        biased;
        _ = cancel.cancelled() => {
            tracing::debug!(bucket, "listing stream cancelled while connecting");
            return Ok(ListStream::finished(StreamOutcome::Cancelled));
        }
        body = client.open_stream(request) => body?,
    };

    let (sender, stream) = list_channel(cancel);
    tokio::spawn(produce(Connection::new(body), sender));
    Ok(stream)
}
