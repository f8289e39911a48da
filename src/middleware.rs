/* src/middleware.rs */

use axum::{
    extract::{ConnectInfo, FromRequestParts, Request},
    http::{HeaderMap, request::Parts},
    response::Response,
};
use futures_util::future::BoxFuture;
use std::{
    convert::Infallible,
    net::SocketAddr,
    sync::Arc,
    task::{Context, Poll},
};
use tower::{Layer, Service};

use crate::classifier::{Classifier, ResolvedIdentity};
use crate::context::RequestInfo;

/// Layer that classifies each request and stores the [`ResolvedIdentity`]
/// as a request extension.
///
/// The classifier is shared behind an `Arc`; to reconfigure at runtime,
/// build a new layer from a new classifier rather than mutating in place.
///
/// # Examples
///
/// ```rust,no_run
/// use axum::{Router, routing::get};
/// use edgeip::{ResolvedIdentity, TrustLayer};
///
/// async fn handler(identity: ResolvedIdentity) -> String {
///     identity.reported_address
/// }
///
/// let app: Router = Router::new()
///     .route("/", get(handler))
///     .layer(TrustLayer::default());
/// ```
#[derive(Debug, Clone, Default)]
pub struct TrustLayer {
    classifier: Arc<Classifier>,
}

impl TrustLayer {
    /// Create a layer with the default classifier.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a layer around a configured classifier.
    pub fn with_classifier(classifier: impl Into<Arc<Classifier>>) -> Self {
        Self {
            classifier: classifier.into(),
        }
    }
}

impl<S> Layer<S> for TrustLayer {
    type Service = TrustService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        TrustService {
            inner,
            classifier: Arc::clone(&self.classifier),
        }
    }
}

/// Service that classifies requests before handing them on.
#[derive(Debug, Clone)]
pub struct TrustService<S> {
    inner: S,
    classifier: Arc<Classifier>,
}

impl<S> Service<Request> for TrustService<S>
where
    S: Service<Request, Response = Response> + Send + 'static,
    S::Future: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: Request) -> Self::Future {
        let remote_addr = req
            .extensions()
            .get::<ConnectInfo<SocketAddr>>()
            .map(|connect_info| connect_info.0.ip().to_string());
        let info = request_info(req.headers(), remote_addr);

        let identity = self.classifier.classify(&info);
        req.extensions_mut().insert(identity);

        let future = self.inner.call(req);
        Box::pin(future)
    }
}

/// Convert Axum headers into a request context.
///
/// Every header name is kept even when its value is not visible ASCII, and
/// repeated header lines are folded into one value joined by `", "`.
fn request_info(headers: &HeaderMap, remote_addr: Option<String>) -> RequestInfo {
    let mut info = RequestInfo::new(Default::default(), remote_addr);

    for name in headers.keys() {
        for value in headers.get_all(name) {
            info.append_header(name.as_str(), String::from_utf8_lossy(value.as_bytes()));
        }
    }

    info
}

/// Axum extractor for the classified identity.
///
/// Without [`TrustLayer`] in front, falls back to an untrusted identity for
/// the connection address, or `127.0.0.1` when that is unknown too.
impl<S> FromRequestParts<S> for ResolvedIdentity
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        if let Some(identity) = parts.extensions.get::<ResolvedIdentity>() {
            return Ok(identity.clone());
        }

        let addr = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|connect_info| connect_info.0.ip().to_string())
            .unwrap_or_else(|| "127.0.0.1".to_string());
        Ok(ResolvedIdentity::untrusted(&addr))
    }
}
