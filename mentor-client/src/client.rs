//! The API gateway client: dispatch, caching, de-duplication and timeouts.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use futures::future::{BoxFuture, FutureExt, Shared};
use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, warn};

use mentor_cache::{CacheStats, Fingerprint, PersistentCache, ResponseCache};
use mentor_core::{
    AuthRequirement, EndpointClass, HttpRequest, KeyValueStore, MentorError, Method, RequestBody,
    Result, Role, SessionProvider, Transport,
};

use crate::config::ClientConfig;
use crate::{guard, schema, session};

// ═══════════════════════════════════════════════════════════════════════════════
// REQUEST OPTIONS
// ═══════════════════════════════════════════════════════════════════════════════

/// How a single endpoint call is made.
#[derive(Clone, Debug)]
pub struct RequestOptions {
    pub method: Method,
    pub body: RequestBody,
    pub class: EndpointClass,
    /// Cache lifetime; `None` means never cached. Only reads are cached.
    pub cache_ttl: Option<Duration>,
    pub auth: AuthRequirement,
}

impl RequestOptions {
    fn with(method: Method, body: RequestBody) -> Self {
        Self {
            method,
            body,
            class: EndpointClass::Standard,
            cache_ttl: None,
            auth: AuthRequirement::Required,
        }
    }

    pub fn get() -> Self {
        Self::with(Method::Get, RequestBody::Empty)
    }

    pub fn post(body: RequestBody) -> Self {
        Self::with(Method::Post, body)
    }

    pub fn put(body: RequestBody) -> Self {
        Self::with(Method::Put, body)
    }

    pub fn delete() -> Self {
        Self::with(Method::Delete, RequestBody::Empty)
    }

    /// Caches successful responses for `ttl`.
    pub fn cached(mut self, ttl: Duration) -> Self {
        self.cache_ttl = Some(ttl);
        self
    }

    pub fn class(mut self, class: EndpointClass) -> Self {
        self.class = class;
        self
    }

    /// Sends without a token when none is available.
    pub fn optional_auth(mut self) -> Self {
        self.auth = AuthRequirement::Optional;
        self
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// CLIENT
// ═══════════════════════════════════════════════════════════════════════════════

type SharedCall = Shared<BoxFuture<'static, Result<Value>>>;

/// In-flight network call shared by every caller with the same fingerprint.
struct Pending {
    id: u64,
    call: SharedCall,
}

struct ClientInner {
    config: ClientConfig,
    transport: Arc<dyn Transport>,
    session: Arc<dyn SessionProvider>,
    cache: ResponseCache,
    persistent: PersistentCache,
    pending: DashMap<Fingerprint, Pending>,
    next_call_id: AtomicU64,
    disposed: AtomicBool,
    sweeper: Mutex<Option<JoinHandle<()>>>,
}

impl Drop for ClientInner {
    fn drop(&mut self) {
        if let Some(sweeper) = self.sweeper.get_mut().take() {
            sweeper.abort();
        }
    }
}

/// Typed gateway to the MathMentor backend.
///
/// Cheap to clone; all clones share one cache, one pending map and one
/// background sweeper. Identical concurrent requests share a single network
/// call, and cacheable reads are served from memory until their TTL passes.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ClientInner>,
}

impl ApiClient {
    /// Creates a client and starts its cache sweeper.
    ///
    /// Must be called from within a tokio runtime.
    pub fn new(
        config: ClientConfig,
        transport: Arc<dyn Transport>,
        session: Arc<dyn SessionProvider>,
        store: Arc<dyn KeyValueStore>,
    ) -> Result<Self> {
        config.validate()?;
        let handle = Handle::try_current().map_err(|_| {
            MentorError::ConfigError("ApiClient must be created inside a tokio runtime".into())
        })?;

        let period = config.sweep_interval();
        let inner = Arc::new(ClientInner {
            cache: ResponseCache::with_config(config.cache.clone()),
            persistent: PersistentCache::new(store),
            config,
            transport,
            session,
            pending: DashMap::new(),
            next_call_id: AtomicU64::new(0),
            disposed: AtomicBool::new(false),
            sweeper: Mutex::new(None),
        });

        let sweeper = spawn_sweeper(&handle, Arc::downgrade(&inner), period);
        *inner.sweeper.lock() = Some(sweeper);

        debug!(base_url = %inner.config.base_url, "API client created");
        Ok(Self { inner })
    }

    /// Stops the sweeper and drops all cached responses.
    ///
    /// Calls already in flight still settle for their awaiters; new calls fail
    /// with [`MentorError::ClientDisposed`].
    pub fn dispose(&self) {
        if self.inner.disposed.swap(true, Ordering::SeqCst) {
            return;
        }
        if let Some(sweeper) = self.inner.sweeper.lock().take() {
            sweeper.abort();
        }
        self.inner.cache.invalidate_all();
        info!("API client disposed");
    }

    pub fn is_disposed(&self) -> bool {
        self.inner.disposed.load(Ordering::SeqCst)
    }

    pub fn config(&self) -> &ClientConfig {
        &self.inner.config
    }

    /// Performs one endpoint call.
    ///
    /// Cacheable reads are answered from the cache when fresh. A call whose
    /// fingerprint is already in flight joins it instead of going to the
    /// network; every joined caller sees the same value or error.
    #[instrument(skip(self, options), fields(method = %options.method))]
    pub async fn dispatch(&self, endpoint: &str, options: RequestOptions) -> Result<Value> {
        let inner = &self.inner;
        if self.is_disposed() {
            return Err(MentorError::ClientDisposed);
        }

        let key = Fingerprint::new(options.method, endpoint, &options.body);
        let cache_ttl = options
            .cache_ttl
            .filter(|_| inner.config.enable_cache && options.method.is_read());

        if cache_ttl.is_some() {
            if let Some(value) = inner.cache.get(&key) {
                debug!(key = %key, "Cache hit");
                return Ok(value);
            }
            debug!(key = %key, "Cache miss");
        }

        let bearer = session::resolve_token(inner.session.as_ref(), inner.config.timeouts.session).await;
        if bearer.is_none() && options.auth == AuthRequirement::Required {
            return Err(MentorError::AuthenticationMissing(endpoint.to_string()));
        }

        let call = match inner.pending.entry(key.clone()) {
            Entry::Occupied(entry) => {
                debug!(key = %key, "Joining in-flight request");
                entry.get().call.clone()
            }
            Entry::Vacant(entry) => {
                let id = inner.next_call_id.fetch_add(1, Ordering::Relaxed);
                let request = HttpRequest {
                    method: options.method,
                    url: inner.config.url_for(endpoint),
                    bearer,
                    body: options.body,
                };
                let budget = inner.config.timeouts.for_class(options.class);
                let epoch = inner.cache.epoch();
                let call = spawn_call(Arc::clone(inner), key, id, request, budget, cache_ttl, epoch);
                entry.insert(Pending { id, call: call.clone() });
                call
            }
        };

        call.await
    }

    /// Dispatches and decodes a JSON object response.
    pub async fn fetch<T: DeserializeOwned>(&self, endpoint: &str, options: RequestOptions) -> Result<T> {
        let value = self.dispatch(endpoint, options).await?;
        schema::decode_object(endpoint, value)
    }

    /// Dispatches and decodes a JSON array response.
    pub async fn fetch_list<T: DeserializeOwned>(&self, endpoint: &str, options: RequestOptions) -> Result<Vec<T>> {
        let value = self.dispatch(endpoint, options).await?;
        schema::decode_list(endpoint, value)
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // CACHE CONTROL
    // ═══════════════════════════════════════════════════════════════════════════

    // Invalidation also detaches matching in-flight reads, so the next call
    // goes to the network instead of joining a response from before the change.

    /// Drops the cached read of exactly `endpoint` (path with query).
    pub fn invalidate(&self, endpoint: &str) -> bool {
        let key = Fingerprint::new(Method::Get, endpoint, &RequestBody::Empty);
        let removed = self.inner.cache.invalidate(&key);
        self.detach_reads(|pending| *pending == key);
        removed
    }

    /// Drops every cached read at or below `path`.
    pub fn invalidate_prefix(&self, path: &str) -> usize {
        let removed = self.inner.cache.invalidate_prefix(path);
        self.detach_reads(|pending| pending.has_path_prefix(path));
        removed
    }

    /// Drops every cached read.
    pub fn invalidate_all(&self) {
        self.inner.cache.invalidate_all();
        self.detach_reads(|_| true);
    }

    fn detach_reads(&self, matches: impl Fn(&Fingerprint) -> bool) {
        self.inner
            .pending
            .retain(|key, _| !(key.method().is_read() && matches(key)));
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.inner.cache.stats()
    }

    /// Number of network calls currently in flight.
    pub fn pending_count(&self) -> usize {
        self.inner.pending.len()
    }

    pub(crate) fn persistent(&self) -> &PersistentCache {
        &self.inner.persistent
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // SESSION
    // ═══════════════════════════════════════════════════════════════════════════

    /// Checks the session role against `allowed`.
    pub async fn require_role(&self, allowed: &[Role]) -> Result<Role> {
        guard::require_role(self.inner.session.as_ref(), allowed).await
    }
}

/// Runs one network call in its own task so that it settles, caches and
/// leaves the pending map even if every awaiter goes away.
fn spawn_call(
    inner: Arc<ClientInner>,
    key: Fingerprint,
    id: u64,
    request: HttpRequest,
    budget: Duration,
    cache_ttl: Option<Duration>,
    epoch: u64,
) -> SharedCall {
    let task = tokio::spawn(async move {
        let outcome = execute(inner.transport.as_ref(), key.endpoint(), request, budget).await;

        if let (Ok(value), Some(ttl)) = (&outcome, cache_ttl) {
            if !inner.disposed.load(Ordering::SeqCst) {
                inner.cache.put_if_current(key.clone(), value.clone(), ttl, epoch);
            }
        }
        // Cache first, then release: a caller arriving in between hits the cache
        inner.pending.remove_if(&key, |_, pending| pending.id == id);
        outcome
    });

    async move {
        match task.await {
            Ok(outcome) => outcome,
            Err(e) => Err(MentorError::InternalError(format!("request task failed: {e}"))),
        }
    }
    .boxed()
    .shared()
}

async fn execute(
    transport: &dyn Transport,
    endpoint: &str,
    request: HttpRequest,
    budget: Duration,
) -> Result<Value> {
    let response = match tokio::time::timeout(budget, transport.send(request)).await {
        Ok(response) => response?,
        Err(_) => {
            warn!(endpoint, budget_ms = budget.as_millis() as u64, "Request timed out");
            return Err(MentorError::Timeout {
                endpoint: endpoint.to_string(),
                budget_ms: budget.as_millis() as u64,
            });
        }
    };

    if !response.is_success() {
        let err = response.into_error();
        debug!(endpoint, error = %err, "Backend returned an error");
        return Err(err);
    }

    response
        .parse::<Value>()
        .map_err(|e| MentorError::malformed(endpoint, e.to_string()))
}

fn spawn_sweeper(handle: &Handle, inner: Weak<ClientInner>, period: Duration) -> JoinHandle<()> {
    handle.spawn(async move {
        let mut ticker = tokio::time::interval_at(tokio::time::Instant::now() + period, period);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            let Some(inner) = inner.upgrade() else {
                break;
            };
            let removed = inner.cache.sweep();
            if removed > 0 {
                debug!(removed, "Swept expired cache entries");
            }
        }
    })
}
