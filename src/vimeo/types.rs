use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer};

/// Vimeo sends `null` for fields a video simply doesn't have (no
/// description, no pictures yet). Treat those the same as absent.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// One page of `GET /me/videos`.
#[derive(Debug, Deserialize)]
pub struct VideoPage {
    #[serde(default, deserialize_with = "null_as_default")]
    pub data: Vec<RawVideo>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub paging: Paging,
}

#[derive(Debug, Default, Deserialize)]
pub struct Paging {
    #[serde(default)]
    pub next: Option<String>,
}

/// A video object as returned by the API. Only the fields the catalog
/// mapping reads are decoded; everything else is ignored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawVideo {
    #[serde(default, deserialize_with = "null_as_default")]
    pub uri: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub duration: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub release_time: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub modified_time: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub tags: Vec<Tag>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub pictures: Pictures,
    #[serde(default, deserialize_with = "null_as_default")]
    pub files: Vec<VideoFile>,
}

impl RawVideo {
    /// `modified_time` as a timestamp, or `None` when it is missing or
    /// not RFC 3339.
    pub fn modified_at(&self) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(self.modified_time.trim())
            .ok()
            .map(|dt| dt.with_timezone(&Utc))
    }
}

/// Tags arrive either as bare strings or as tag objects carrying a `name`.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Tag {
    Plain(String),
    Object { name: String },
}

impl Tag {
    pub fn as_str(&self) -> &str {
        match self {
            Tag::Plain(s) => s,
            Tag::Object { name } => name,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Pictures {
    #[serde(default, deserialize_with = "null_as_default")]
    pub sizes: Vec<PictureSize>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PictureSize {
    #[serde(default, deserialize_with = "null_as_default")]
    pub width: u32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub height: u32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub link: String,
}

/// A downloadable rendition of a video.
#[derive(Debug, Clone, Deserialize)]
pub struct VideoFile {
    #[serde(rename = "type", default, deserialize_with = "null_as_default")]
    pub kind: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub link: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub size: u64,
}
