//! Mapping from raw Vimeo videos to the flat records the VidApp catalog
//! ingests.

pub mod thumbnails;

pub use thumbnails::ThumbnailTier;

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{error, warn};

use crate::vimeo::types::{RawVideo, Tag, VideoFile};

/// Prefix of the synthesized `OriginalFilename`.
pub const ORIGINAL_FILENAME_PREFIX: &str = "vimeo-";
/// `AppId` used when the request doesn't name one.
pub const DEFAULT_APP_ID: &str = "";
const RECORD_TYPE: &str = "video";
const DATA_SOURCE: &str = "Vimeo";
const PUBLISHED: &str = "Published";
const TAG_DELIMITER: &str = "|";
/// Upload timestamp layout the catalog expects.
const UPLOAD_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Caller-supplied values that are the same for every record of a batch.
#[derive(Debug, Clone, Default)]
pub struct TransformContext {
    pub app_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct OutputRecord {
    #[serde(rename = "Type")]
    pub kind: String,
    pub app_id: String,
    pub original_filename: String,
    pub title: String,
    pub thumbnail_source: String,
    pub duration_seconds: String,
    pub data_source: String,
    pub source_id: String,
    pub source_description: String,
    pub source_thumbnail_source: String,
    pub source_date_uploaded: String,
    pub published: String,
    pub tag: String,
    pub thumbnails: BTreeMap<ThumbnailTier, String>,
    pub files: Vec<FileEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileEntry {
    #[serde(rename = "Type")]
    pub kind: String,
    #[serde(rename = "URL")]
    pub url: String,
    #[serde(rename = "Size")]
    pub size: String,
}

impl From<VideoFile> for FileEntry {
    fn from(file: VideoFile) -> Self {
        Self {
            kind: file.kind,
            url: file.link,
            size: file.size.to_string(),
        }
    }
}

/// The video id at the end of a resource URI (`/videos/372726546`).
///
/// `None` when the URI has no path separator or ends without a segment.
pub fn source_id(uri: &str) -> Option<&str> {
    let (_, last) = uri.trim_end_matches('/').rsplit_once('/')?;
    (!last.is_empty()).then_some(last)
}

pub fn original_filename(source_id: &str) -> String {
    format!("{ORIGINAL_FILENAME_PREFIX}{source_id}")
}

/// Render `release_time` the way the catalog stores upload dates. Values
/// that aren't RFC 3339 are passed through untouched.
fn upload_date(release_time: &str) -> String {
    DateTime::parse_from_rfc3339(release_time.trim())
        .map(|dt| dt.with_timezone(&Utc).format(UPLOAD_DATE_FORMAT).to_string())
        .unwrap_or_else(|_| release_time.to_string())
}

/// Map one video, or `None` (logged) when its source id can't be resolved.
pub fn transform_video(video: RawVideo, ctx: &TransformContext) -> Option<OutputRecord> {
    let Some(id) = source_id(&video.uri) else {
        error!(uri = %video.uri, "Cannot resolve source id from video uri, skipping");
        return None;
    };
    let id = id.to_string();

    let thumbnails = thumbnails::classify_thumbnails(&video.pictures.sizes);
    let large = thumbnails
        .get(&ThumbnailTier::Large)
        .cloned()
        .unwrap_or_default();
    let tag = video
        .tags
        .iter()
        .map(Tag::as_str)
        .collect::<Vec<_>>()
        .join(TAG_DELIMITER);

    Some(OutputRecord {
        kind: RECORD_TYPE.to_string(),
        app_id: ctx
            .app_id
            .clone()
            .unwrap_or_else(|| DEFAULT_APP_ID.to_string()),
        original_filename: original_filename(&id),
        title: video.name,
        thumbnail_source: large.clone(),
        duration_seconds: video.duration.to_string(),
        data_source: DATA_SOURCE.to_string(),
        source_id: id,
        source_description: video.description,
        source_thumbnail_source: large,
        source_date_uploaded: upload_date(&video.release_time),
        published: PUBLISHED.to_string(),
        tag,
        thumbnails,
        files: video.files.into_iter().map(FileEntry::from).collect(),
    })
}

/// Map a batch, preserving order. Records without a source id are dropped
/// individually; the rest of the batch is unaffected.
pub fn transform(videos: Vec<RawVideo>, ctx: &TransformContext) -> Vec<OutputRecord> {
    let total = videos.len();
    let records: Vec<OutputRecord> = videos
        .into_iter()
        .filter_map(|video| transform_video(video, ctx))
        .collect();
    if records.len() < total {
        warn!(
            skipped = total - records.len(),
            total,
            "Some videos were skipped during transformation"
        );
    }
    records
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw(value: serde_json::Value) -> RawVideo {
        serde_json::from_value(value).unwrap()
    }

    fn sample(id: u32) -> RawVideo {
        raw(json!({
            "uri": format!("/videos/{id}"),
            "name": format!("Video {id}"),
            "description": "About it",
            "duration": 125,
            "release_time": "2019-11-12T20:47:59+00:00",
            "modified_time": "2019-11-13T00:00:00+00:00",
            "tags": [{"name": "yoga"}, {"name": "morning flow"}],
            "pictures": {"sizes": [
                {"width": 295, "height": 166, "link": "https://i.vimeocdn.com/s"},
                {"width": 640, "height": 360, "link": "https://i.vimeocdn.com/m"},
                {"width": 1280, "height": 720, "link": "https://i.vimeocdn.com/l"}
            ]},
            "files": [
                {"type": "video/mp4", "link": format!("https://player.vimeo.com/external/{id}.sd"), "size": 743098000},
                {"type": "video/mp4", "link": format!("https://player.vimeo.com/external/{id}.hd"), "size": 1500000000}
            ]
        }))
    }

    #[test]
    fn test_source_id() {
        assert_eq!(source_id("/videos/372726546"), Some("372726546"));
        assert_eq!(source_id("/users/9/videos/42/"), Some("42"));
        assert_eq!(source_id(""), None);
        assert_eq!(source_id("/"), None);
        assert_eq!(source_id("372726546"), None);
    }

    #[test]
    fn test_original_filename_is_deterministic() {
        assert_eq!(original_filename("42"), "vimeo-42");
        assert_eq!(original_filename("42"), original_filename("42"));
    }

    #[test]
    fn test_upload_date() {
        assert_eq!(upload_date("2019-11-12T20:47:59+00:00"), "2019-11-12 20:47:59");
        assert_eq!(upload_date("2019-11-12T22:47:59+02:00"), "2019-11-12 20:47:59");
        assert_eq!(upload_date("sometime"), "sometime");
        assert_eq!(upload_date(""), "");
    }

    #[test]
    fn test_transform_maps_fields() {
        let ctx = TransformContext {
            app_id: Some("app-7".into()),
        };
        let record = transform_video(sample(1), &ctx).unwrap();

        assert_eq!(record.kind, "video");
        assert_eq!(record.app_id, "app-7");
        assert_eq!(record.source_id, "1");
        assert_eq!(record.original_filename, "vimeo-1");
        assert_eq!(record.title, "Video 1");
        assert_eq!(record.duration_seconds, "125");
        assert_eq!(record.source_description, "About it");
        assert_eq!(record.source_date_uploaded, "2019-11-12 20:47:59");
        assert_eq!(record.data_source, "Vimeo");
        assert_eq!(record.published, "Published");
        assert_eq!(record.tag, "yoga|morning flow");
        assert_eq!(record.thumbnail_source, "https://i.vimeocdn.com/l");
        assert_eq!(record.source_thumbnail_source, "https://i.vimeocdn.com/l");
        assert_eq!(record.thumbnails.len(), 3);
        assert_eq!(record.thumbnails[&ThumbnailTier::Small], "https://i.vimeocdn.com/s");
        assert_eq!(
            record.files,
            vec![
                FileEntry {
                    kind: "video/mp4".into(),
                    url: "https://player.vimeo.com/external/1.sd".into(),
                    size: "743098000".into(),
                },
                FileEntry {
                    kind: "video/mp4".into(),
                    url: "https://player.vimeo.com/external/1.hd".into(),
                    size: "1500000000".into(),
                },
            ]
        );
    }

    #[test]
    fn test_default_app_id() {
        let record = transform_video(sample(1), &TransformContext::default()).unwrap();
        assert_eq!(record.app_id, DEFAULT_APP_ID);
    }

    #[test]
    fn test_no_matching_pictures() {
        let video = raw(json!({
            "uri": "/videos/5",
            "pictures": {"sizes": [{"width": 100, "height": 75, "link": "x"}]}
        }));
        let record = transform_video(video, &TransformContext::default()).unwrap();
        assert!(record.thumbnails.is_empty());
        assert_eq!(record.thumbnail_source, "");
        assert_eq!(record.tag, "");
        assert!(record.files.is_empty());
    }

    #[test]
    fn test_bad_uri_skipped_siblings_kept() {
        let videos = vec![
            sample(1),
            raw(json!({"uri": "", "name": "broken"})),
            sample(2),
            raw(json!({"name": "no uri at all"})),
            sample(3),
        ];
        let records = transform(videos, &TransformContext::default());
        let ids: Vec<&str> = records.iter().map(|r| r.source_id.as_str()).collect();
        assert_eq!(ids, vec!["1", "2", "3"]);
    }

    #[test]
    fn test_serialized_field_names() {
        let record = transform_video(sample(9), &TransformContext::default()).unwrap();
        let value = serde_json::to_value(&record).unwrap();
        for key in [
            "Type",
            "AppId",
            "OriginalFilename",
            "Title",
            "ThumbnailSource",
            "DurationSeconds",
            "DataSource",
            "SourceId",
            "SourceDescription",
            "SourceThumbnailSource",
            "SourceDateUploaded",
            "Published",
            "Tag",
            "Thumbnails",
            "Files",
        ] {
            assert!(value.get(key).is_some(), "missing {key}");
        }
        assert_eq!(value["Files"][0]["URL"], "https://player.vimeo.com/external/9.sd");
        assert_eq!(value["Files"][0]["Size"], "743098000");
        assert_eq!(value["Thumbnails"]["medium"], "https://i.vimeocdn.com/m");
    }
}
