use std::sync::Arc;

use bytes::Bytes;
use once_cell::sync::Lazy;
use parking_lot::Mutex;
use rayon::{ThreadPool, ThreadPoolBuilder};
use url::Url;

use crate::{
    status::LoadState, Decode, Fetch, HttpFetcher, ImageData, LoadError, LoadStatus, RgbaDecoder,
};

/// Invoked exactly once per load attempt that reports an outcome. On fetch
/// success it receives the raw bytes even when they later fail to decode.
pub type OnLoadCallback = Box<dyn Fn(Result<&Bytes, &LoadError>) + Send + Sync>;

static DEFAULT_POOL: Lazy<Arc<ThreadPool>> = Lazy::new(|| {
    let pool = ThreadPoolBuilder::new()
        .num_threads(2)
        .thread_name(|ix| format!("netimage-fetch-{}", ix))
        .build()
        .expect("Failed to build fetch thread pool");
    Arc::new(pool)
});

/// Owns the load lifecycle for a single url and publishes the decoded image.
///
/// `load` dispatches at most one fetch at a time onto the thread pool; the
/// completion is parked in a channel until the owning view pumps [`update`]
/// from its own context, so state changes are only ever observed on the
/// observer's thread.
///
/// [`update`]: ImageLoader::update
pub struct ImageLoader {
    url: Option<String>,
    on_load: Option<OnLoadCallback>,
    fetcher: Arc<dyn Fetch>,
    decoder: Arc<dyn Decode>,
    thread_pool: Arc<ThreadPool>,
    state: Mutex<LoadState>,
    fetch_send: flume::Sender<anyhow::Result<Bytes>>,
    fetch_recv: flume::Receiver<anyhow::Result<Bytes>>,
}

impl ImageLoader {
    pub fn builder(url: Option<&str>) -> ImageLoaderBuilder {
        ImageLoaderBuilder {
            url: url.map(|url| url.to_owned()),
            on_load: None,
            fetcher: None,
            decoder: None,
            thread_pool: None,
        }
    }
    pub fn new(url: Option<&str>) -> Self {
        Self::builder(url).build()
    }
    pub fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }
    pub fn status(&self) -> LoadStatus {
        self.state.lock().status()
    }
    /// The published image, if the loader has reached `Loaded`.
    pub fn image(&self) -> Option<Arc<ImageData>> {
        self.state.lock().image()
    }
    /// Trigger a load. Returns immediately; the fetch runs on the thread pool
    /// and its outcome is applied on the next [`update`](Self::update).
    ///
    /// No-op while a fetch is outstanding, and once `Loaded` (the published
    /// image is never cleared). A missing or malformed url reports
    /// [`LoadError::BadUrl`] synchronously without entering `Loading`, so the
    /// caller is free to try again.
    pub fn load(&self) {
        let mut state = self.state.lock();
        if state.is_loading() {
            log::trace!("Load already in flight, dropping request");
            return;
        }
        if state.is_loaded() {
            return;
        }

        let Some(raw) = &self.url else {
            drop(state);
            self.notify(Err(&LoadError::BadUrl));
            return;
        };
        let url = match Url::parse(raw) {
            Ok(url) => url,
            Err(err) => {
                log::error!("Cannot load {:?}: {}", raw, err);
                drop(state);
                self.notify(Err(&LoadError::BadUrl));
                return;
            }
        };

        *state = LoadState::Loading;
        drop(state);

        log::debug!("Fetching {}", url);
        let fetcher = self.fetcher.clone();
        let sender = self.fetch_send.clone();
        self.thread_pool.spawn(move || {
            let result = fetcher.fetch(&url);
            if sender.send(result).is_err() {
                log::error!("Failed to enqueue fetch result");
            }
        });
    }
    /// Drain completed fetches and apply them. Must be called from the
    /// observer's context (the view calls it on every render), which keeps
    /// state changes off the fetch threads.
    pub fn update(&self) {
        for result in self.fetch_recv.try_iter() {
            match result {
                Ok(bytes) => {
                    let next = match self.decoder.decode(&bytes) {
                        Ok(image) => {
                            log::debug!("Loaded {:?} ({} bytes)", self.url, bytes.len());
                            LoadState::Loaded(Arc::new(image))
                        }
                        Err(err) => {
                            log::error!("Failed to decode {:?}: {:#}", self.url, err);
                            LoadState::Failed(LoadError::Decode(err))
                        }
                    };
                    *self.state.lock() = next;
                    self.notify(Ok(&bytes));
                }
                Err(err) => {
                    log::warn!("Failed to fetch {:?}: {:#}", self.url, err);
                    let err = LoadError::Transport(err);
                    self.notify(Err(&err));
                    *self.state.lock() = LoadState::Failed(err);
                }
            }
        }
    }
    fn notify(&self, result: Result<&Bytes, &LoadError>) {
        if let Some(on_load) = &self.on_load {
            on_load(result);
        }
    }
}

pub struct ImageLoaderBuilder {
    url: Option<String>,
    on_load: Option<OnLoadCallback>,
    fetcher: Option<Arc<dyn Fetch>>,
    decoder: Option<Arc<dyn Decode>>,
    thread_pool: Option<Arc<ThreadPool>>,
}

impl ImageLoaderBuilder {
    pub fn on_load(
        mut self,
        on_load: impl Fn(Result<&Bytes, &LoadError>) + Send + Sync + 'static,
    ) -> Self {
        self.on_load = Some(Box::new(on_load));
        self
    }
    pub fn on_load_boxed(mut self, on_load: OnLoadCallback) -> Self {
        self.on_load = Some(on_load);
        self
    }
    pub fn fetcher(mut self, fetcher: Arc<dyn Fetch>) -> Self {
        self.fetcher = Some(fetcher);
        self
    }
    pub fn decoder(mut self, decoder: Arc<dyn Decode>) -> Self {
        self.decoder = Some(decoder);
        self
    }
    pub fn thread_pool(mut self, thread_pool: Arc<ThreadPool>) -> Self {
        self.thread_pool = Some(thread_pool);
        self
    }
    pub fn build(self) -> ImageLoader {
        let (fetch_send, fetch_recv) = flume::unbounded();
        ImageLoader {
            url: self.url,
            on_load: self.on_load,
            fetcher: self
                .fetcher
                .unwrap_or_else(|| Arc::new(HttpFetcher::default())),
            decoder: self.decoder.unwrap_or_else(|| Arc::new(RgbaDecoder)),
            thread_pool: self.thread_pool.unwrap_or_else(|| DEFAULT_POOL.clone()),
            state: Mutex::new(LoadState::Idle),
            fetch_send,
            fetch_recv,
        }
    }
}
