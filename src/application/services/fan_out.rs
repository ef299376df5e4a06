use bytes::Bytes;
use tokio::sync::mpsc;

/// Message on the cache branch. The writer commits only after `End`.
#[derive(Debug, Clone, PartialEq)]
pub enum CacheChunk {
    Data(Bytes),
    End,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    Delivered,
    ClientGone,
}

/// Duplicates one upstream byte sequence to the client and the cache writer.
///
/// Each consumer has its own bounded queue. Losing the cache consumer detaches
/// the cache branch and leaves the client untouched; losing the client is
/// reported so the caller can tear the pipeline down.
pub struct FanOut {
    client: mpsc::Sender<Bytes>,
    cache: Option<mpsc::Sender<CacheChunk>>,
}

impl FanOut {
    pub fn new(client: mpsc::Sender<Bytes>, cache: Option<mpsc::Sender<CacheChunk>>) -> Self {
        Self { client, cache }
    }

    pub async fn deliver(&mut self, chunk: Bytes) -> Delivery {
        if self.client.send(chunk.clone()).await.is_err() {
            return Delivery::ClientGone;
        }

        if let Some(cache) = &self.cache {
            if cache.send(CacheChunk::Data(chunk)).await.is_err() {
                tracing::warn!("cache branch detached, continuing without caching");
                self.cache = None;
            }
        }

        Delivery::Delivered
    }

    /// Marks the sequence complete on the cache branch.
    pub async fn complete(&mut self) {
        if let Some(cache) = self.cache.take() {
            if cache.send(CacheChunk::End).await.is_err() {
                tracing::warn!("cache branch closed before completion");
            }
        }
    }

    pub fn is_caching(&self) -> bool {
        self.cache.is_some()
    }

    /// Handle that resolves once the client stops reading.
    pub fn client_watch(&self) -> mpsc::Sender<Bytes> {
        self.client.clone()
    }
}
