//! Decoder HTTP surface
//!
//! Serves `GET /tx/{txid}`: the inscription revealed by the transaction is
//! returned with its own content type. Decode failures are answered with the
//! error message as plain text; unknown routes get a 404.

use bitcoin::Txid;
use hyper::header::{HeaderValue, CONTENT_TYPE};
use hyper::service::{make_service_fn, service_fn};
use hyper::{Body, Method, Request, Response, Server, StatusCode};
use std::convert::Infallible;
use std::net::SocketAddr;
use std::str::FromStr;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::errors::{AppError, AppResult, RpcError};
use crate::inscription::content_type::OCTET_STREAM;
use crate::inscription::{extract_from_script_sig, Inscription};
use crate::rpc::{CacheStats, ScriptCache, TransactionLookup};

const TX_ROUTE: &str = "/tx/";

/// Request handler shared by every connection
pub struct DecodeService {
    lookup: Arc<dyn TransactionLookup>,
    cache: ScriptCache,
}

impl DecodeService {
    pub fn new(lookup: Arc<dyn TransactionLookup>) -> Self {
        Self::with_cache(lookup, ScriptCache::new())
    }

    pub fn with_cache(lookup: Arc<dyn TransactionLookup>, cache: ScriptCache) -> Self {
        Self { lookup, cache }
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.get_stats()
    }

    /// Decode the inscription revealed by `txid`
    ///
    /// Only unlocking scripts that decode to an inscription are cached.
    pub async fn decode(&self, txid: &str) -> AppResult<Inscription> {
        let txid = Txid::from_str(txid).map_err(|_| RpcError::InvalidTxid {
            txid: txid.to_string(),
        })?;

        if let Some(script_sig) = self.cache.get(&txid) {
            return Ok(extract_from_script_sig(&script_sig)?);
        }

        let script_sig = self.lookup.input_script(&txid, 0).await?;
        let inscription = extract_from_script_sig(&script_sig)?;
        self.cache.put(txid, script_sig);
        Ok(inscription)
    }

    pub async fn handle(&self, request: Request<Body>) -> Response<Body> {
        let path = request.uri().path().to_string();
        let txid = match (request.method(), path.strip_prefix(TX_ROUTE)) {
            (&Method::GET, Some(txid)) if !txid.is_empty() && !txid.contains('/') => txid,
            _ => {
                debug!("No route for {} {}", request.method(), path);
                return text_response(StatusCode::NOT_FOUND, "Not Found".to_string());
            }
        };

        match self.decode(txid).await {
            Ok(inscription) => {
                info!(
                    "Served {} ({} bytes) for {}",
                    inscription.content_type,
                    inscription.body.len(),
                    txid
                );
                inscription_response(inscription)
            }
            Err(e) => {
                warn!("Decode of {} failed: {}", txid, e);
                text_response(StatusCode::OK, e.to_string())
            }
        }
    }
}

fn inscription_response(inscription: Inscription) -> Response<Body> {
    let content_type = HeaderValue::from_str(&inscription.content_type)
        .unwrap_or_else(|_| HeaderValue::from_static(OCTET_STREAM));
    let mut response = Response::new(Body::from(inscription.body));
    response.headers_mut().insert(CONTENT_TYPE, content_type);
    response
}

fn text_response(status: StatusCode, message: String) -> Response<Body> {
    let mut response = Response::new(Body::from(message));
    *response.status_mut() = status;
    response
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static("text/plain"));
    response
}

/// Serve `service` on all interfaces until the process stops
pub async fn serve(service: Arc<DecodeService>, port: u16) -> AppResult<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));

    let make_service = make_service_fn(move |_conn| {
        let service = service.clone();
        async move {
            Ok::<_, Infallible>(service_fn(move |request| {
                let service = service.clone();
                async move { Ok::<_, Infallible>(service.handle(request).await) }
            }))
        }
    });

    let server = Server::try_bind(&addr)
        .map_err(|e| AppError::Server(format!("cannot bind port {}: {}", port, e)))?
        .serve(make_service);
    debug!("Decoder server bound to {}", addr);

    server.await.map_err(|e| AppError::Server(e.to_string()))
}
