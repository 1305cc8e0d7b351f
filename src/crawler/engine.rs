//! Callback-driven traversal engine
//!
//! The engine knows nothing about authors. Callers register XPath field
//! callbacks and lifecycle callbacks, queue seed URLs with `visit`, and
//! `run` drives a fixed pool of workers until no queued or in-flight
//! document remains.
//!
//! Every document gets a fresh request-scoped context `C`. Field callbacks
//! for one document run synchronously in that document's worker, in
//! registration order and, within one selector, in document order. The
//! document-done callbacks receive the same context afterwards.

use crate::config::CrawlerConfig;
use crate::crawler::frontier::{Frontier, Request, TraversalPolicy, TraversalStats};
use crate::crawler::parser::{compile_selector, extract, parse_document};
use crate::crawler::{fetch_document, DocumentError, EngineError, VisitRejection};
use crate::state::DocumentState;
use rand::Rng;
use reqwest::Client;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{mpsc, watch, Mutex};
use tokio::task::JoinSet;
use url::Url;

/// Traversal bounds, fixed before the first fetch
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Deepest discovery hop that is still fetched (seed = 0)
    pub max_depth: u32,

    /// Number of workers, and so of fetches in flight at once
    pub concurrency: usize,

    /// Fixed pause before each fetch
    pub delay: Duration,

    /// Upper bound of the uniform jitter added to `delay`
    pub random_delay: Duration,

    /// Host patterns that may be fetched; empty admits any host
    pub allowed_domains: Vec<String>,

    /// When false, a URL is fetched at most once per run
    pub allow_revisit: bool,
}

impl EngineConfig {
    pub fn from_crawler(crawler: &CrawlerConfig, allowed_domains: Vec<String>) -> Self {
        Self {
            max_depth: crawler.max_depth,
            concurrency: crawler.concurrency as usize,
            delay: crawler.delay(),
            random_delay: crawler.random_delay(),
            allowed_domains,
            allow_revisit: crawler.allow_revisit,
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::from_crawler(&CrawlerConfig::default(), Vec::new())
    }
}

/// One node matched by a field selector
pub struct FieldMatch<'a, C> {
    text: &'a str,
    request: &'a Request,
    context: &'a mut C,
    frontier: &'a Frontier,
}

impl<'a, C> FieldMatch<'a, C> {
    /// String value of the matched node
    pub fn text(&self) -> &'a str {
        self.text
    }

    /// URL of the document being processed
    pub fn url(&self) -> &Url {
        &self.request.url
    }

    pub fn context_mut(&mut self) -> &mut C {
        &mut *self.context
    }

    /// Queues `url` one hop deeper than the current document
    pub fn visit(&self, url: &str) -> Result<(), VisitRejection> {
        self.frontier.enqueue(url, self.request.depth + 1)
    }
}

type FieldCallback<C> = Box<dyn Fn(&mut FieldMatch<'_, C>) + Send + Sync>;
type RequestCallback = Box<dyn Fn(&Request) + Send + Sync>;
type DoneCallback<C> = Box<dyn Fn(&Request, &mut C) + Send + Sync>;
type ErrorCallback = Box<dyn Fn(&Request, &DocumentError) + Send + Sync>;

struct FieldHandler<C> {
    selector: String,
    callback: FieldCallback<C>,
}

struct Handlers<C> {
    fields: Vec<FieldHandler<C>>,
    request_start: Vec<RequestCallback>,
    document_done: Vec<DoneCallback<C>>,
    error: Vec<ErrorCallback>,
}

impl<C> Default for Handlers<C> {
    fn default() -> Self {
        Self {
            fields: Vec::new(),
            request_start: Vec::new(),
            document_done: Vec::new(),
            error: Vec::new(),
        }
    }
}

/// Bounded-depth crawler over XML documents
pub struct TraversalEngine<C> {
    config: EngineConfig,
    client: Client,
    frontier: Arc<Frontier>,
    receiver: mpsc::UnboundedReceiver<Request>,
    handlers: Handlers<C>,
}

impl<C: Default + Send + 'static> TraversalEngine<C> {
    pub fn new(config: EngineConfig, client: Client) -> Self {
        let policy = TraversalPolicy {
            allowed_domains: config.allowed_domains.clone(),
            max_depth: config.max_depth,
            allow_revisit: config.allow_revisit,
        };
        let (frontier, receiver) = Frontier::new(policy);

        Self {
            config,
            client,
            frontier: Arc::new(frontier),
            receiver,
            handlers: Handlers::default(),
        }
    }

    /// Registers a callback invoked once per node matching `selector`
    ///
    /// # Errors
    ///
    /// * `EngineError::InvalidSelector` - `selector` is not a valid XPath
    pub fn on_field<F>(&mut self, selector: &str, callback: F) -> Result<(), EngineError>
    where
        F: Fn(&mut FieldMatch<'_, C>) + Send + Sync + 'static,
    {
        compile_selector(selector)?;
        self.handlers.fields.push(FieldHandler {
            selector: selector.to_string(),
            callback: Box::new(callback),
        });
        Ok(())
    }

    /// Registers a callback fired just before each fetch is sent
    pub fn on_request_start<F>(&mut self, callback: F)
    where
        F: Fn(&Request) + Send + Sync + 'static,
    {
        self.handlers.request_start.push(Box::new(callback));
    }

    /// Registers a callback fired after all field callbacks of a document ran
    pub fn on_document_done<F>(&mut self, callback: F)
    where
        F: Fn(&Request, &mut C) + Send + Sync + 'static,
    {
        self.handlers.document_done.push(Box::new(callback));
    }

    /// Registers a callback fired when a document fails to fetch or parse
    pub fn on_error<F>(&mut self, callback: F)
    where
        F: Fn(&Request, &DocumentError) + Send + Sync + 'static,
    {
        self.handlers.error.push(Box::new(callback));
    }

    /// Queues a seed URL at depth 0
    pub fn visit(&self, url: &str) -> Result<(), VisitRejection> {
        self.frontier.enqueue(url, 0)
    }

    /// Number of queued requests
    pub fn pending(&self) -> usize {
        self.frontier.pending()
    }

    /// Crawls until every queued and discovered document has finished
    pub async fn run(self) -> TraversalStats {
        let started = Instant::now();
        let Self {
            config,
            client,
            frontier,
            receiver,
            handlers,
        } = self;

        if frontier.pending() == 0 {
            tracing::info!("Nothing queued, traversal finished immediately");
            return frontier.counters().snapshot(started.elapsed());
        }

        tracing::info!(
            "Starting traversal: {} queued, {} workers, max depth {}",
            frontier.pending(),
            config.concurrency,
            config.max_depth
        );

        let shared = Arc::new(Worker {
            client,
            frontier: Arc::clone(&frontier),
            receiver: Mutex::new(receiver),
            handlers,
            delay: config.delay,
            random_delay: config.random_delay,
        });

        let mut workers = JoinSet::new();
        for worker_id in 0..config.concurrency.max(1) {
            let worker = Arc::clone(&shared);
            workers.spawn(async move { worker.work(worker_id).await });
        }

        while let Some(result) = workers.join_next().await {
            if let Err(e) = result {
                tracing::error!("Worker task ended abnormally: {}", e);
            }
        }

        let stats = frontier.counters().snapshot(started.elapsed());
        tracing::info!(
            "Traversal finished: {} completed, {} failed, {} rejected in {:?}",
            stats.completed,
            stats.failed,
            stats.rejected,
            stats.elapsed
        );
        stats
    }
}

/// State shared by the worker pool
struct Worker<C> {
    client: Client,
    frontier: Arc<Frontier>,
    receiver: Mutex<mpsc::UnboundedReceiver<Request>>,
    handlers: Handlers<C>,
    delay: Duration,
    random_delay: Duration,
}

/// Releases one unit of pending work on drop, including on panic
struct InFlight<'a>(&'a Frontier);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if self.0.complete() {
            tracing::debug!("Work queue drained");
        }
    }
}

impl<C: Default + Send + 'static> Worker<C> {
    async fn work(&self, worker_id: usize) {
        let mut finished = self.frontier.subscribe();

        loop {
            let request = tokio::select! {
                request = self.next_request() => request,
                _ = wait_until_finished(&mut finished) => None,
            };

            let Some(request) = request else {
                break;
            };

            let _in_flight = InFlight(&self.frontier);
            self.handle(request).await;
        }

        tracing::debug!("Worker {} stopped", worker_id);
    }

    async fn next_request(&self) -> Option<Request> {
        self.receiver.lock().await.recv().await
    }

    async fn handle(&self, request: Request) {
        let mut state = DocumentState::Pending;

        let pause = self.delay + jitter(self.random_delay);
        if !pause.is_zero() {
            tokio::time::sleep(pause).await;
        }

        transition(&mut state, DocumentState::Fetching, &request);
        for callback in &self.handlers.request_start {
            callback(&request);
        }

        let body = match fetch_document(&self.client, &request.url).await {
            Ok(body) => body,
            Err(e) => {
                self.fail(&mut state, &request, e);
                return;
            }
        };

        transition(&mut state, DocumentState::Parsing, &request);
        match self.process(&request, &body) {
            Ok(mut context) => {
                for callback in &self.handlers.document_done {
                    callback(&request, &mut context);
                }
                transition(&mut state, DocumentState::Done, &request);
                self.frontier.counters().record_completed();
            }
            Err(e) => self.fail(&mut state, &request, e),
        }
    }

    /// Parses `body` and runs the field callbacks against a fresh context
    ///
    /// Every selector is evaluated before the first callback runs, so a
    /// document that fails here has queued nothing.
    fn process(&self, request: &Request, body: &str) -> Result<C, DocumentError> {
        let package = parse_document(body)?;
        let document = package.as_document();

        let matches = self
            .handlers
            .fields
            .iter()
            .map(|handler| extract(&document, &handler.selector))
            .collect::<Result<Vec<_>, _>>()?;

        let mut context = C::default();
        for (handler, texts) in self.handlers.fields.iter().zip(&matches) {
            for text in texts {
                let mut field = FieldMatch {
                    text,
                    request,
                    context: &mut context,
                    frontier: &self.frontier,
                };
                (handler.callback)(&mut field);
            }
        }

        Ok(context)
    }

    fn fail(&self, state: &mut DocumentState, request: &Request, error: DocumentError) {
        transition(state, DocumentState::Failed, request);
        self.frontier.counters().record_failed();
        for callback in &self.handlers.error {
            callback(request, &error);
        }
    }
}

fn transition(state: &mut DocumentState, next: DocumentState, request: &Request) {
    match state.advance(next) {
        Ok(advanced) => *state = advanced,
        Err(e) => tracing::error!("{} for {}", e, request.url),
    }
}

/// Uniform jitter in `[0, max)`
fn jitter(max: Duration) -> Duration {
    let millis = max.as_millis() as u64;
    if millis == 0 {
        return Duration::ZERO;
    }
    Duration::from_millis(rand::thread_rng().gen_range(0..millis))
}

async fn wait_until_finished(finished: &mut watch::Receiver<bool>) {
    loop {
        if *finished.borrow_and_update() {
            return;
        }
        if finished.changed().await.is_err() {
            return;
        }
    }
}
