//! gRPC Service Implementation
//!
//! Implements the `stash.CacheService` defined in proto/stash.proto.
//!
//! Get, Set, Delete and Purge are bidirectional streams sharing one shape:
//! the session is authorized once from its `authorization` metadata, then a
//! single worker drains the request stream and answers in receive order.
//! End-of-stream and transport errors end the session quietly; a key
//! derivation failure or (outside Get) a storage failure ends it with an
//! `Internal` status. Exists is unary and authorized per call.
//!
//! Misses are data: a Get for an absent or expired key answers with an
//! empty value and a zero ttl, and the stream keeps going.

use std::pin::Pin;
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tokio_stream::Stream;
use tonic::metadata::MetadataMap;
use tonic::{Request, Response, Status, Streaming};

use stash_core::{Clock, StoredItem};
use stash_storage::Store;

use crate::auth::{Authorizer, Token};
use crate::error::ApiError;
use crate::keyspace;

// Include the generated protobuf code
pub mod proto {
    tonic::include_proto!("stash");
}

pub use proto::cache_service_server::CacheServiceServer;

use proto::cache_service_server::CacheService;
use proto::{
    DeleteRequest, DeleteResponse, ExistsRequest, ExistsResponse, GetRequest, GetResponse,
    PurgeRequest, PurgeResponse, SetRequest, SetResponse,
};

/// Buffered responses per streaming session before backpressure kicks in.
const STREAM_BUFFER: usize = 16;

// ============================================================================
// CACHE SERVICE IMPLEMENTATION
// ============================================================================

/// The RPC-facing cache service.
///
/// Holds only injected dependencies; every session gets its own sequential
/// worker and the store is the sole cross-session state.
#[derive(Clone)]
pub struct CacheServiceImpl {
    store: Arc<dyn Store>,
    authorizer: Arc<Authorizer>,
    clock: Arc<dyn Clock>,
}

impl CacheServiceImpl {
    pub fn new(store: Arc<dyn Store>, authorizer: Arc<Authorizer>, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            authorizer,
            clock,
        }
    }

    /// Wrap this service for registration with a tonic server.
    pub fn into_server(self) -> CacheServiceServer<CacheServiceImpl> {
        CacheServiceServer::new(self)
    }

    /// Authorize a session or call from its request metadata.
    fn authorize(&self, metadata: &MetadataMap) -> Result<Token, Status> {
        let header = metadata
            .get("authorization")
            .and_then(|value| value.to_str().ok())
            .unwrap_or("");

        self.authorizer.authorize(header).map_err(|error| {
            tracing::error!(%error, "failed to authorize request");
            ApiError::from(error).into()
        })
    }

    /// Fetch and decode the live item under an internal key.
    ///
    /// `Ok(None)` covers both a miss and an expired entry; expired entries
    /// are reaped best-effort on the way out. Backend and decode failures
    /// surface as errors and the caller decides whether they are fatal.
    async fn lookup(&self, internal_key: &str) -> Result<Option<StoredItem>, ApiError> {
        let bytes = match self.store.get(internal_key).await? {
            Some(bytes) => bytes,
            None => return Ok(None),
        };

        let item = StoredItem::decode(&bytes)?;

        if item.is_expired(self.clock.now_epoch_secs()) {
            tracing::info!(key = %internal_key, expires_at = item.expires_at, "key expired");
            self.reap(internal_key.to_string());
            return Ok(None);
        }

        Ok(Some(item))
    }

    /// Best-effort deletion of an entry already observed stale.
    ///
    /// Runs detached; the read that triggered it has already answered with
    /// a miss, so failure here only costs storage space. A concurrent reap
    /// of the same key is a harmless double delete.
    fn reap(&self, internal_key: String) {
        let store = Arc::clone(&self.store);
        tokio::spawn(async move {
            match store.delete(&internal_key).await {
                Ok(()) => tracing::debug!(key = %internal_key, "reaped expired key"),
                Err(error) => {
                    tracing::warn!(key = %internal_key, %error, "failed to reap expired key")
                }
            }
        });
    }

    fn derive(&self, token: &Token, database: u32, key: &str) -> Result<keyspace::DerivedKey, Status> {
        keyspace::derive(token, database, key).map_err(|error| {
            tracing::error!(%error, "failed to create internal key");
            ApiError::from(error).into()
        })
    }

    // ========================================================================
    // PER-REQUEST HANDLERS
    // ========================================================================

    /// Handle one Get request within an authorized session.
    ///
    /// Every per-item failure on the read path degrades to a miss so one
    /// bad key cannot take the stream down.
    pub async fn handle_get(&self, token: &Token, req: GetRequest) -> Result<GetResponse, Status> {
        let derived = self.derive(token, req.database(), &req.key)?;

        let item = match self.lookup(derived.internal()).await {
            Ok(item) => item,
            Err(error) => {
                tracing::warn!(key = %derived.internal(), %error, "failed to get key");
                None
            }
        };

        Ok(match item {
            Some(item) => GetResponse {
                key: derived.client().to_string(),
                value: item.value,
                ttl: item.expires_at,
            },
            None => GetResponse {
                key: derived.client().to_string(),
                value: Vec::new(),
                ttl: 0,
            },
        })
    }

    /// Handle one Set request within an authorized session.
    pub async fn handle_set(&self, token: &Token, req: SetRequest) -> Result<SetResponse, Status> {
        let derived = self.derive(token, req.database(), &req.key)?;
        let ttl = req.ttl_seconds();
        let value = req.value;

        let item = StoredItem::new(value.clone(), ttl, self.clock.as_ref());
        let encoded = item.encode().map_err(|error| {
            tracing::error!(key = %derived.internal(), %error, "failed to encode item");
            Status::from(ApiError::from(error))
        })?;

        self.store
            .put(derived.internal(), encoded)
            .await
            .map_err(|error| {
                tracing::error!(key = %derived.internal(), %error, "failed to set key");
                Status::from(ApiError::from(error))
            })?;

        tracing::info!(key = %derived.client(), expires_at = item.expires_at, "set key");

        Ok(SetResponse {
            key: derived.client().to_string(),
            value,
            ttl: item.expires_at,
        })
    }

    /// Handle one Delete request within an authorized session.
    ///
    /// Deleting a key that does not exist is a success.
    pub async fn handle_delete(
        &self,
        token: &Token,
        req: DeleteRequest,
    ) -> Result<DeleteResponse, Status> {
        let derived = self.derive(token, req.database(), &req.key)?;

        self.store.delete(derived.internal()).await.map_err(|error| {
            tracing::error!(key = %derived.internal(), %error, "failed to delete key");
            Status::from(ApiError::from(error))
        })?;

        tracing::info!(key = %derived.client(), "deleted key");

        Ok(DeleteResponse { deleted: true })
    }

    /// Handle one Purge request within an authorized session.
    ///
    /// The match prefix is the caller's derived key for the supplied
    /// prefix, so an empty prefix sweeps exactly the caller's
    /// tenant+database namespace; no request shape can reach another
    /// tenant's keys.
    pub async fn handle_purge(
        &self,
        token: &Token,
        req: PurgeRequest,
    ) -> Result<PurgeResponse, Status> {
        let prefix = self.derive(token, req.database(), req.prefix())?;

        let keys = self.store.list_keys().await.map_err(|error| {
            tracing::error!(%error, "failed to list keys");
            Status::from(ApiError::from(error))
        })?;

        let mut purged = 0usize;
        for key in keys.iter().filter(|key| key.starts_with(prefix.internal())) {
            self.store.delete(key).await.map_err(|error| {
                tracing::error!(key = %key, %error, "failed to purge key");
                Status::from(ApiError::from(error))
            })?;
            purged += 1;
        }

        tracing::info!(prefix = %prefix.internal(), purged, "purged keys");

        Ok(PurgeResponse { purged: true })
    }
}

// ============================================================================
// RPC SURFACE
// ============================================================================

#[tonic::async_trait]
impl CacheService for CacheServiceImpl {
    type GetStream = Pin<Box<dyn Stream<Item = Result<GetResponse, Status>> + Send + 'static>>;
    type SetStream = Pin<Box<dyn Stream<Item = Result<SetResponse, Status>> + Send + 'static>>;
    type DeleteStream =
        Pin<Box<dyn Stream<Item = Result<DeleteResponse, Status>> + Send + 'static>>;
    type PurgeStream = Pin<Box<dyn Stream<Item = Result<PurgeResponse, Status>> + Send + 'static>>;

    async fn get(
        &self,
        request: Request<Streaming<GetRequest>>,
    ) -> Result<Response<Self::GetStream>, Status> {
        let token = self.authorize(request.metadata())?;
        let mut stream = request.into_inner();
        let (tx, rx) = mpsc::channel(STREAM_BUFFER);
        let service = self.clone();

        tokio::spawn(async move {
            loop {
                let req = match stream.message().await {
                    Ok(Some(req)) => req,
                    Ok(None) => break,
                    Err(status) => {
                        tracing::debug!(error = %status, "get stream ended");
                        break;
                    }
                };

                let result = service.handle_get(&token, req).await;
                let failed = result.is_err();
                if tx.send(result).await.is_err() || failed {
                    break;
                }
            }
        });

        Ok(Response::new(Box::pin(ReceiverStream::new(rx))))
    }

    async fn set(
        &self,
        request: Request<Streaming<SetRequest>>,
    ) -> Result<Response<Self::SetStream>, Status> {
        let token = self.authorize(request.metadata())?;
        let mut stream = request.into_inner();
        let (tx, rx) = mpsc::channel(STREAM_BUFFER);
        let service = self.clone();

        tokio::spawn(async move {
            loop {
                let req = match stream.message().await {
                    Ok(Some(req)) => req,
                    Ok(None) => break,
                    Err(status) => {
                        tracing::debug!(error = %status, "set stream ended");
                        break;
                    }
                };

                let result = service.handle_set(&token, req).await;
                let failed = result.is_err();
                if tx.send(result).await.is_err() || failed {
                    break;
                }
            }
        });

        Ok(Response::new(Box::pin(ReceiverStream::new(rx))))
    }

    async fn delete(
        &self,
        request: Request<Streaming<DeleteRequest>>,
    ) -> Result<Response<Self::DeleteStream>, Status> {
        let token = self.authorize(request.metadata())?;
        let mut stream = request.into_inner();
        let (tx, rx) = mpsc::channel(STREAM_BUFFER);
        let service = self.clone();

        tokio::spawn(async move {
            loop {
                let req = match stream.message().await {
                    Ok(Some(req)) => req,
                    Ok(None) => break,
                    Err(status) => {
                        tracing::debug!(error = %status, "delete stream ended");
                        break;
                    }
                };

                let result = service.handle_delete(&token, req).await;
                let failed = result.is_err();
                if tx.send(result).await.is_err() || failed {
                    break;
                }
            }
        });

        Ok(Response::new(Box::pin(ReceiverStream::new(rx))))
    }

    async fn purge(
        &self,
        request: Request<Streaming<PurgeRequest>>,
    ) -> Result<Response<Self::PurgeStream>, Status> {
        let token = self.authorize(request.metadata())?;
        let mut stream = request.into_inner();
        let (tx, rx) = mpsc::channel(STREAM_BUFFER);
        let service = self.clone();

        tokio::spawn(async move {
            loop {
                let req = match stream.message().await {
                    Ok(Some(req)) => req,
                    Ok(None) => break,
                    Err(status) => {
                        tracing::debug!(error = %status, "purge stream ended");
                        break;
                    }
                };

                let result = service.handle_purge(&token, req).await;
                let failed = result.is_err();
                if tx.send(result).await.is_err() || failed {
                    break;
                }
            }
        });

        Ok(Response::new(Box::pin(ReceiverStream::new(rx))))
    }

    /// Check which of the provided keys exist and are live.
    ///
    /// Unlike Get, a storage or decode failure here aborts the whole call:
    /// a unary response cannot distinguish "absent" from "unknown", so a
    /// partial answer would be a silent lie.
    async fn exists(
        &self,
        request: Request<ExistsRequest>,
    ) -> Result<Response<ExistsResponse>, Status> {
        let token = self.authorize(request.metadata())?;
        let req = request.into_inner();

        let mut found = Vec::new();
        for key in &req.keys {
            let derived = self.derive(&token, req.database(), key)?;

            match self.lookup(derived.internal()).await {
                Ok(Some(_)) => found.push(key.clone()),
                Ok(None) => {}
                Err(error) => {
                    tracing::error!(key = %derived.internal(), %error, "failed to get key");
                    return Err(error.into());
                }
            }
        }

        tracing::info!(keys = ?found, "found keys");

        let count = found.len() as u32;
        Ok(Response::new(ExistsResponse { keys: found, count }))
    }
}
