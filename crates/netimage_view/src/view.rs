use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use bytes::Bytes;
use once_cell::sync::OnceCell;
use rayon::ThreadPool;

use netimage_loader::{Decode, Fetch, ImageData, ImageLoader, OnLoadCallback, RgbaDecoder};

/// What the embedder should draw this frame: a decoded image (rendered as a
/// resizable, non-interactive bitmap) or the caller's placeholder content.
pub enum View<V> {
    Image(Arc<ImageData>),
    Placeholder(V),
}

impl<V> View<V> {
    pub fn image(&self) -> Option<&Arc<ImageData>> {
        match self {
            View::Image(image) => Some(image),
            View::Placeholder(_) => None,
        }
    }
    pub fn is_placeholder(&self) -> bool {
        matches!(self, View::Placeholder(_))
    }
}

/// Optional knobs for [`NetworkImage`]. Every field defaults; the url and the
/// placeholder builder are the only required inputs.
#[derive(Default)]
pub struct NetworkImageConfig {
    /// Pre-fetched bytes supplied by the caller. When present and decodable
    /// they win over everything else and the network is never touched.
    pub cache: Option<Bytes>,
    pub on_load: Option<OnLoadCallback>,
    pub fetcher: Option<Arc<dyn Fetch>>,
    pub decoder: Option<Arc<dyn Decode>>,
    pub thread_pool: Option<Arc<ThreadPool>>,
}

/// Renders one of {cache entry, loaded image, placeholder} and drives exactly
/// one load trigger per mount.
///
/// Each instance owns a fresh [`ImageLoader`]; nothing is shared across
/// instances, even for identical urls. The embedding application calls
/// [`mount`](Self::mount) once when the component first becomes visible and
/// [`render`](Self::render) on every frame.
pub struct NetworkImage<F> {
    loader: ImageLoader,
    cache: Option<Bytes>,
    cache_image: OnceCell<Option<Arc<ImageData>>>,
    decoder: Arc<dyn Decode>,
    placeholder: F,
    mounted: AtomicBool,
}

impl<F, V> NetworkImage<F>
where
    F: Fn() -> V,
{
    pub fn new(url: Option<&str>, config: NetworkImageConfig, placeholder: F) -> Self {
        let decoder = config.decoder.unwrap_or_else(|| Arc::new(RgbaDecoder));

        let mut builder = ImageLoader::builder(url).decoder(decoder.clone());
        if let Some(on_load) = config.on_load {
            builder = builder.on_load_boxed(on_load);
        }
        if let Some(fetcher) = config.fetcher {
            builder = builder.fetcher(fetcher);
        }
        if let Some(thread_pool) = config.thread_pool {
            builder = builder.thread_pool(thread_pool);
        }

        Self {
            loader: builder.build(),
            cache: config.cache,
            cache_image: OnceCell::new(),
            decoder,
            placeholder,
            mounted: AtomicBool::new(false),
        }
    }
    /// One-shot visibility trigger. The host calls this when the component
    /// first appears; repeated calls are no-ops. Loading only starts when
    /// neither the cache entry nor an already published image can be shown.
    pub fn mount(&self) {
        if self.mounted.swap(true, Ordering::SeqCst) {
            return;
        }
        if self.cache_image().is_some() {
            return;
        }
        self.loader.update();
        if self.loader.image().is_some() {
            return;
        }
        self.loader.load();
    }
    /// Pumps the loader, then picks a branch. Pure in the sense that unchanged
    /// inputs and unchanged loader state always yield the same branch.
    ///
    /// Precedence: cache entry, then the loader's published image, then the
    /// placeholder.
    pub fn render(&self) -> View<V> {
        self.loader.update();

        if let Some(image) = self.cache_image() {
            return View::Image(image);
        }
        if let Some(image) = self.loader.image() {
            return View::Image(image);
        }
        View::Placeholder((self.placeholder)())
    }
    pub fn loader(&self) -> &ImageLoader {
        &self.loader
    }
    // The cache entry is immutable, so its decode result is memoized after
    // the first evaluation.
    fn cache_image(&self) -> Option<Arc<ImageData>> {
        self.cache_image
            .get_or_init(|| {
                let data = self.cache.as_ref()?;
                match self.decoder.decode(data) {
                    Ok(image) => Some(Arc::new(image)),
                    Err(err) => {
                        log::error!("Failed to decode cache entry: {:#}", err);
                        None
                    }
                }
            })
            .clone()
    }
}
