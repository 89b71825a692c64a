//! Tests for components/icon.rs

use std::time::Duration;

use pinpoint_push::{
    Bitmap, BoundedFetcher, IconSpec, ImageFetcher, PlatformCapabilities, PushError, SmallIcon,
    grey, select_icons,
};

use crate::common::{APP_ICON_ID, FakeResources, StubImageFetcher, two_color_bitmap};

const LARGE_URL: &str = "https://cdn.example.com/large.png";
const SMALL_URL: &str = "https://cdn.example.com/small.png";

fn spec(large: Option<&str>, small: Option<&str>) -> IconSpec {
    IconSpec {
        base_icon_resource_id: APP_ICON_ID,
        large_icon_url: large.map(str::to_string),
        small_icon_url: small.map(str::to_string),
    }
}

#[test]
fn test_grey_single_color_is_identity() {
    let bitmap = Bitmap::new(2, 2, vec![0xFFFF_0000, 0x0000_0000, 0x80FF_0000, 0x0012_3456]);
    assert_eq!(bitmap.distinct_opaque_colors(), 1);
    assert_eq!(grey(&bitmap), bitmap);
}

#[test]
fn test_grey_two_colors_encodes_luma_in_alpha() {
    let out = grey(&two_color_bitmap());

    assert!(out.pixels.iter().all(|pixel| pixel & 0x00FF_FFFF == 0x00FF_FFFF));
    // red: luma 76, alpha 255 - 76
    assert_eq!(out.pixels[0] >> 24, 179);
    // blue: luma 29, alpha 255 - 29
    assert_eq!(out.pixels[1] >> 24, 226);
}

#[test]
fn test_grey_scales_by_input_alpha() {
    let bitmap = Bitmap::new(3, 1, vec![0x8000_0000, 0x80FF_FFFF, 0x0000_0000]);
    let out = grey(&bitmap);
    assert_eq!(out.pixels, vec![0x80FF_FFFF, 0x00FF_FFFF, 0x00FF_FFFF]);
    assert_eq!((out.width, out.height), (3, 1));
}

#[test]
fn test_bitmap_validity() {
    assert!(Bitmap::filled(4, 4, 0xFF00_0000).is_valid());
    assert!(!Bitmap::new(0, 0, Vec::new()).is_valid());
    assert!(!Bitmap::new(2, 2, vec![0; 3]).is_valid());
}

#[tokio::test]
async fn test_low_tier_uses_resource_only() {
    let fetcher = StubImageFetcher::default();
    let resources = FakeResources::default();
    let caps = PlatformCapabilities::for_api_level(10);

    let icons = select_icons(&caps, &spec(None, Some(SMALL_URL)), &fetcher, &resources).await;
    assert_eq!(icons.large_icon, None);
    assert_eq!(icons.small_icon, SmallIcon::Resource(APP_ICON_ID));
    assert!(fetcher.requests.lock().is_empty());
}

#[tokio::test]
async fn test_downloaded_large_icon_wins() {
    let fetcher = StubImageFetcher::default();
    let large = Bitmap::filled(8, 8, 0xFF11_2233);
    fetcher.serve(LARGE_URL, large.clone());
    let resources = FakeResources::default();

    for api_level in [10, 19, 30] {
        let caps = PlatformCapabilities::for_api_level(api_level);
        let icons = select_icons(&caps, &spec(Some(LARGE_URL), None), &fetcher, &resources).await;
        assert_eq!(icons.large_icon.as_ref(), Some(&large), "api level {}", api_level);
    }
}

#[tokio::test]
async fn test_mid_tier_falls_back_to_app_icon() {
    let fetcher = StubImageFetcher::default();
    let resources = FakeResources::default();
    let caps = PlatformCapabilities::for_api_level(19);

    let icons = select_icons(&caps, &spec(Some(LARGE_URL), Some(SMALL_URL)), &fetcher, &resources).await;
    assert_eq!(icons.large_icon, Some(two_color_bitmap()));
    assert_eq!(icons.small_icon, SmallIcon::Resource(APP_ICON_ID));
}

#[tokio::test]
async fn test_high_tier_greys_downloaded_small_icon() {
    let fetcher = StubImageFetcher::default();
    let small = Bitmap::new(2, 1, vec![0xFF00_0000, 0xFFFF_FFFF]);
    fetcher.serve(SMALL_URL, small.clone());
    let resources = FakeResources::default();
    let caps = PlatformCapabilities::for_api_level(26);

    let icons = select_icons(&caps, &spec(None, Some(SMALL_URL)), &fetcher, &resources).await;
    // Small icon URL given: the app icon is not promoted to large icon.
    assert_eq!(icons.large_icon, None);
    assert_eq!(icons.small_icon, SmallIcon::Bitmap(grey(&small)));
}

#[tokio::test]
async fn test_high_tier_without_urls_uses_app_icon_twice() {
    let fetcher = StubImageFetcher::default();
    let resources = FakeResources::default();
    let caps = PlatformCapabilities::for_api_level(23);

    let icons = select_icons(&caps, &spec(None, None), &fetcher, &resources).await;
    assert_eq!(icons.large_icon, Some(two_color_bitmap()));
    assert_eq!(icons.small_icon, SmallIcon::Bitmap(grey(&two_color_bitmap())));
}

#[tokio::test]
async fn test_high_tier_failed_small_download_uses_app_icon() {
    let fetcher = StubImageFetcher::default();
    let resources = FakeResources::default();
    let caps = PlatformCapabilities::for_api_level(30);

    let icons = select_icons(&caps, &spec(None, Some(SMALL_URL)), &fetcher, &resources).await;
    assert_eq!(icons.small_icon, SmallIcon::Bitmap(grey(&two_color_bitmap())));
}

#[tokio::test]
async fn test_high_tier_without_app_bitmap_uses_resource() {
    let fetcher = StubImageFetcher::default();
    let mut resources = FakeResources::default();
    resources.bitmaps.clear();
    let caps = PlatformCapabilities::for_api_level(30);

    let icons = select_icons(&caps, &spec(None, None), &fetcher, &resources).await;
    assert_eq!(icons.large_icon, None);
    assert_eq!(icons.small_icon, SmallIcon::Resource(APP_ICON_ID));
}

#[tokio::test]
async fn test_bounded_fetcher_times_out() {
    let fetcher = StubImageFetcher::default();
    fetcher.serve(LARGE_URL, Bitmap::filled(1, 1, 0xFF00_0000));
    fetcher.set_delay(Duration::from_millis(500));

    let bounded = BoundedFetcher::new(&fetcher, Duration::from_millis(20));
    match bounded.fetch(LARGE_URL).await {
        Err(PushError::Timeout { timeout, .. }) => assert_eq!(timeout, Duration::from_millis(20)),
        other => panic!("expected timeout, got {:?}", other),
    }
}

#[test]
fn test_bounded_fetcher_passes_through() {
    let fetcher = StubImageFetcher::default();
    let bitmap = Bitmap::filled(1, 1, 0xFF00_0000);
    fetcher.serve(LARGE_URL, bitmap.clone());

    let bounded = BoundedFetcher::new(&fetcher, Duration::from_secs(5));
    let fetched = tokio_test::block_on(bounded.fetch(LARGE_URL));
    assert_eq!(tokio_test::assert_ok!(fetched), bitmap);
    assert_eq!(fetcher.requests.lock().len(), 1);
}
