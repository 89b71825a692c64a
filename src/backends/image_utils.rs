// Icon and big-picture downloads for the background renderer
// Handles fetching remote images, decoding them and caching the bitmaps

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;
use url::Url;

use crate::components::config::PushConfig;
use crate::components::icon::{Bitmap, ImageFetcher};
use crate::components::{PushError, PushResult};

/// Maximum cache entries before forced eviction
const MAX_CACHE_ENTRIES: usize = 100;

/// Anything shorter cannot hold an image header
const MIN_IMAGE_BYTES: usize = 8;

/// Cached bitmap with TTL tracking
#[derive(Debug, Clone)]
struct CachedImage {
    bitmap: Bitmap,
    cached_at: Instant,
}

/// [`ImageFetcher`] backed by reqwest with a decoded-bitmap cache
#[derive(Clone)]
pub struct HttpImageFetcher {
    client: reqwest::Client,
    cache: Arc<DashMap<String, CachedImage>>,
    cache_ttl: Duration,
    timeout: Duration,
    max_image_bytes: u64,
}

impl HttpImageFetcher {
    pub fn new(config: &PushConfig) -> PushResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.image_download_timeout())
            .connect_timeout(config.image_download_timeout())
            .user_agent(concat!("pinpoint-push/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| PushError::platform(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            cache: Arc::new(DashMap::new()),
            cache_ttl: config.image_cache_ttl(),
            timeout: config.image_download_timeout(),
            max_image_bytes: config.max_image_bytes,
        })
    }

    pub fn cached_entries(&self) -> usize {
        self.cache.len()
    }

    pub fn clear_cache(&self) {
        self.cache.clear();
    }

    async fn fetch_bitmap(&self, raw_url: &str) -> PushResult<Bitmap> {
        let url = Url::parse(raw_url)
            .map_err(|e| PushError::resource("image", raw_url, format!("Invalid URL: {}", e)))?;

        evict_stale_entries(&self.cache, self.cache_ttl);
        let cached = self
            .cache
            .get(url.as_str())
            .map(|entry| entry.bitmap.clone());
        if let Some(bitmap) = cached {
            return Ok(bitmap);
        }

        let bytes = match url.scheme() {
            "http" | "https" => self.download(&url).await?,
            "file" => {
                let path = url
                    .to_file_path()
                    .map_err(|_| PushError::resource("image", raw_url, "Invalid file URL"))?;
                tokio::fs::read(&path).await.map_err(|e| {
                    PushError::resource("image", raw_url, format!("Failed to read image file: {}", e))
                })?
            },
            scheme => {
                return Err(PushError::resource(
                    "image",
                    raw_url,
                    format!("Unsupported URL scheme: {}", scheme),
                ));
            },
        };

        let bitmap = decode_bitmap(&bytes)?;
        self.cache.insert(
            url.to_string(),
            CachedImage {
                bitmap: bitmap.clone(),
                cached_at: Instant::now(),
            },
        );

        tracing::debug!(url = %url, width = bitmap.width, height = bitmap.height, "Downloaded image");
        Ok(bitmap)
    }

    async fn download(&self, url: &Url) -> PushResult<Vec<u8>> {
        let url_string = url.to_string();

        let response = self.client.get(url.as_str()).send().await.map_err(|e| {
            if e.is_timeout() {
                PushError::Timeout {
                    operation: format!("image download {}", url_string),
                    timeout: self.timeout,
                }
            } else {
                PushError::resource("image", &url_string, format!("Failed to download image: {}", e))
            }
        })?;

        if !response.status().is_success() {
            return Err(PushError::resource(
                "image",
                &url_string,
                format!("HTTP {} downloading image", response.status()),
            ));
        }

        if let Some(size) = response.content_length()
            && size > self.max_image_bytes
        {
            return Err(PushError::resource(
                "image",
                &url_string,
                format!(
                    "Image too large: {} bytes exceeds {} byte limit",
                    size, self.max_image_bytes
                ),
            ));
        }

        let bytes = response.bytes().await.map_err(|e| {
            PushError::resource("image", &url_string, format!("Failed to read image bytes: {}", e))
        })?;

        if bytes.len() < MIN_IMAGE_BYTES {
            return Err(PushError::resource(
                "image",
                &url_string,
                "Downloaded image is too small to be valid",
            ));
        }
        if bytes.len() as u64 > self.max_image_bytes {
            return Err(PushError::resource(
                "image",
                &url_string,
                format!("Image body exceeds {} byte limit", self.max_image_bytes),
            ));
        }

        Ok(bytes.to_vec())
    }
}

impl ImageFetcher for HttpImageFetcher {
    fn fetch<'a>(
        &'a self,
        url: &'a str,
    ) -> Pin<Box<dyn Future<Output = PushResult<Bitmap>> + Send + 'a>> {
        Box::pin(self.fetch_bitmap(url))
    }
}

/// Decode PNG/JPEG/GIF/WebP bytes into an ARGB bitmap
pub fn decode_bitmap(bytes: &[u8]) -> PushResult<Bitmap> {
    let decoded = image::load_from_memory(bytes)
        .map_err(|e| PushError::ImageDecode(e.to_string()))?
        .to_rgba8();

    let (width, height) = decoded.dimensions();
    let pixels = decoded
        .pixels()
        .map(|pixel| {
            let [r, g, b, a] = pixel.0;
            (u32::from(a) << 24) | (u32::from(r) << 16) | (u32::from(g) << 8) | u32::from(b)
        })
        .collect();

    Ok(Bitmap::new(width, height, pixels))
}

/// Evict stale entries from cache (TTL expired or over size limit)
fn evict_stale_entries(cache: &DashMap<String, CachedImage>, ttl: Duration) {
    let now = Instant::now();
    cache.retain(|_, entry| now.duration_since(entry.cached_at) < ttl);

    while cache.len() > MAX_CACHE_ENTRIES {
        let oldest = cache
            .iter()
            .min_by_key(|entry| entry.cached_at)
            .map(|entry| entry.key().clone());

        match oldest {
            Some(key) => {
                cache.remove(&key);
            },
            None => break,
        }
    }
}
