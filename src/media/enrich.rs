//! Attach asset URLs to photo derivatives.

use crate::api::types::{AssetUrlMap, Photo};

/// Populate derivative URLs from an asset URL map.
///
/// The server keys the map sometimes by derivative checksum and sometimes by
/// photo guid, so each photo gets two passes:
/// 1. every URL-less derivative whose checksum is in the map takes that URL;
/// 2. if the photo guid is in the map, its URL goes to every derivative still
///    without one.
///
/// URLs are only ever set, never replaced, so running this twice with the
/// same map changes nothing.
pub fn enrich_photos(photos: &mut [Photo], urls: &AssetUrlMap) {
    if urls.is_empty() {
        return;
    }

    for photo in photos.iter_mut() {
        for derivative in photo.derivatives.values_mut() {
            if derivative.url.is_none() {
                if let Some(url) = urls.get(&derivative.checksum) {
                    derivative.url = Some(url.to_string());
                }
            }
        }

        if let Some(url) = urls.get(&photo.photo_guid) {
            for derivative in photo.derivatives.values_mut() {
                if derivative.url.is_none() {
                    derivative.url = Some(url.to_string());
                }
            }
        }
    }
}
