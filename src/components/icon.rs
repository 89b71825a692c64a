// Icon selection and the monochrome status-bar icon transform

use std::collections::HashSet;
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use super::platform::{IconTier, PlatformCapabilities, ResourceResolver};
use super::{PushError, PushResult};

/// ARGB_8888 bitmap, row-major, one `u32` per pixel (`0xAARRGGBB`)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Bitmap {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u32>,
}

impl Bitmap {
    pub fn new(width: u32, height: u32, pixels: Vec<u32>) -> Self {
        Self {
            width,
            height,
            pixels,
        }
    }

    /// Single-color bitmap
    pub fn filled(width: u32, height: u32, argb: u32) -> Self {
        let len = (width as usize) * (height as usize);
        Self::new(width, height, vec![argb; len])
    }

    /// Non-empty and pixel count agrees with dimensions
    pub fn is_valid(&self) -> bool {
        self.width > 0
            && self.height > 0
            && self.pixels.len() == (self.width as usize) * (self.height as usize)
    }

    /// Number of distinct RGB values among non-transparent pixels
    pub fn distinct_opaque_colors(&self) -> usize {
        self.pixels
            .iter()
            .filter(|pixel| alpha(**pixel) != 0)
            .map(|pixel| pixel & 0x00FF_FFFF)
            .collect::<HashSet<_>>()
            .len()
    }
}

#[inline]
fn alpha(pixel: u32) -> u32 {
    pixel >> 24
}

/// Java-style `Math.round` for non-negative values
#[inline]
fn round_half_up(value: f64) -> u32 {
    (value + 0.5).floor() as u32
}

/// Convert a bitmap into a white, alpha-encoded status-bar icon.
///
/// Each pixel becomes `0x00FFFFFF` with alpha `(255 - luma) * a / 255`, so
/// dark areas stay visible and light areas fade out. A bitmap with at most
/// one distinct non-transparent RGB color is already a valid single-color
/// icon and is returned unchanged.
pub fn grey(bitmap: &Bitmap) -> Bitmap {
    let mut first_color: Option<u32> = None;
    let mut multi_color = false;
    for pixel in &bitmap.pixels {
        if alpha(*pixel) == 0 {
            continue;
        }
        let rgb = pixel & 0x00FF_FFFF;
        match first_color {
            None => first_color = Some(rgb),
            Some(first) if first != rgb => {
                multi_color = true;
                break;
            },
            Some(_) => {},
        }
    }

    if !multi_color {
        return bitmap.clone();
    }

    let pixels = bitmap
        .pixels
        .iter()
        .map(|pixel| {
            let a = alpha(*pixel);
            let r = (pixel >> 16) & 0xFF;
            let g = (pixel >> 8) & 0xFF;
            let b = pixel & 0xFF;
            let luma = round_half_up(r as f64 * 0.299 + g as f64 * 0.587 + b as f64 * 0.114).min(255);
            let alpha_out = round_half_up((255 - luma) as f64 * a as f64 / 255.0).min(255);
            (alpha_out << 24) | 0x00FF_FFFF
        })
        .collect();

    Bitmap::new(bitmap.width, bitmap.height, pixels)
}

/// Icon sources requested by a push
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IconSpec {
    pub base_icon_resource_id: i32,
    pub large_icon_url: Option<String>,
    pub small_icon_url: Option<String>,
}

/// Status-bar icon: a packaged resource or an adapted bitmap
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SmallIcon {
    Resource(i32),
    Bitmap(Bitmap),
}

/// Icons resolved for one notification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IconSelection {
    pub large_icon: Option<Bitmap>,
    pub small_icon: SmallIcon,
}

/// Source of remote bitmaps
pub trait ImageFetcher: Send + Sync {
    fn fetch<'a>(
        &'a self,
        url: &'a str,
    ) -> Pin<Box<dyn Future<Output = PushResult<Bitmap>> + Send + 'a>>;
}

/// Wraps a fetcher so no single download outlives `timeout`
pub struct BoundedFetcher<'a> {
    inner: &'a dyn ImageFetcher,
    timeout: Duration,
}

impl<'a> BoundedFetcher<'a> {
    pub fn new(inner: &'a dyn ImageFetcher, timeout: Duration) -> Self {
        Self { inner, timeout }
    }
}

impl ImageFetcher for BoundedFetcher<'_> {
    fn fetch<'b>(
        &'b self,
        url: &'b str,
    ) -> Pin<Box<dyn Future<Output = PushResult<Bitmap>> + Send + 'b>> {
        Box::pin(async move {
            match tokio::time::timeout(self.timeout, self.inner.fetch(url)).await {
                Ok(result) => result,
                Err(_) => Err(PushError::Timeout {
                    operation: format!("image download {}", url),
                    timeout: self.timeout,
                }),
            }
        })
    }
}

async fn try_fetch(fetcher: &dyn ImageFetcher, url: &str, purpose: &str) -> Option<Bitmap> {
    match fetcher.fetch(url).await {
        Ok(bitmap) => Some(bitmap),
        Err(e) => {
            tracing::debug!(url = %url, purpose = %purpose, error = %e, "Icon download failed");
            None
        },
    }
}

/// Resolve the large and small icon for a notification.
///
/// 1. A downloadable large-icon URL wins.
/// 2. Otherwise mid-tier platforms, and high-tier platforms without a small
///    icon URL, use the app icon as the large icon.
/// 3. High-tier platforms build a bitmap small icon from the small-icon URL
///    or the app icon, passed through [`grey`].
/// 4. Everything else uses the app icon resource as the small icon.
pub async fn select_icons(
    capabilities: &PlatformCapabilities,
    spec: &IconSpec,
    fetcher: &dyn ImageFetcher,
    resources: &dyn ResourceResolver,
) -> IconSelection {
    let tier = capabilities.icon_tier;

    let mut large_icon = match &spec.large_icon_url {
        Some(url) => try_fetch(fetcher, url, "large_icon").await,
        None => None,
    };

    let base_as_large = tier == IconTier::Mid || (tier == IconTier::High && spec.small_icon_url.is_none());
    if large_icon.is_none() && base_as_large {
        large_icon = resources.bitmap_for_resource(spec.base_icon_resource_id);
    }

    if tier == IconTier::High {
        let mut small = match &spec.small_icon_url {
            Some(url) => try_fetch(fetcher, url, "small_icon").await,
            None => None,
        };
        if small.is_none() {
            small = resources.bitmap_for_resource(spec.base_icon_resource_id);
        }
        if let Some(bitmap) = small {
            return IconSelection {
                large_icon,
                small_icon: SmallIcon::Bitmap(grey(&bitmap)),
            };
        }
    }

    IconSelection {
        large_icon,
        small_icon: SmallIcon::Resource(spec.base_icon_resource_id),
    }
}
