use std::collections::BTreeMap;

use serde::Serialize;

use crate::vimeo::types::PictureSize;

/// Thumbnail size buckets understood by the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ThumbnailTier {
    Large,
    Medium,
    Small,
}

impl ThumbnailTier {
    /// Match a picture by either dimension, largest tier first.
    pub fn classify(width: u32, height: u32) -> Option<Self> {
        match (width, height) {
            (1280, _) | (_, 720) => Some(ThumbnailTier::Large),
            (640, _) | (_, 360) => Some(ThumbnailTier::Medium),
            (295, _) | (_, 166) => Some(ThumbnailTier::Small),
            _ => None,
        }
    }
}

/// Bucket picture links by tier. Later pictures overwrite earlier ones in
/// the same tier; unmatched sizes are dropped.
pub fn classify_thumbnails(sizes: &[PictureSize]) -> BTreeMap<ThumbnailTier, String> {
    let mut tiers = BTreeMap::new();
    for picture in sizes {
        if let Some(tier) = ThumbnailTier::classify(picture.width, picture.height) {
            tiers.insert(tier, picture.link.clone());
        }
    }
    tiers
}
