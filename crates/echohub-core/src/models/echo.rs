use chrono::{DateTime, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize};

use crate::constants::IMAGE_API_PREFIX;

/// Where an image reference points
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageSource {
    Local,
    Url,
    S3,
}

impl ImageSource {
    /// Unknown tags are treated as local
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "url" => ImageSource::Url,
            "s3" => ImageSource::S3,
            _ => ImageSource::Local,
        }
    }
}

/// Resolve an image reference against the hub it came from.
///
/// Only `url` references are absolute; everything else (including `s3` and
/// unrecognized tags) is served by the hub under its `/api` prefix.
pub fn resolve_image_url(image_url: &str, image_source: &str, base_url: &str) -> String {
    match ImageSource::from_tag(image_source) {
        ImageSource::Url => image_url.to_string(),
        ImageSource::Local | ImageSource::S3 => {
            format!("{}{}{}", base_url, IMAGE_API_PREFIX, image_url)
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Image {
    #[serde(default)]
    pub id: u64,
    #[serde(default)]
    pub message_id: u64,
    #[serde(default)]
    pub image_url: String,
    #[serde(default)]
    pub image_source: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub object_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
}

impl Image {
    pub fn resolved_url(&self, base_url: &str) -> String {
        resolve_image_url(&self.image_url, &self.image_source, base_url)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Tag {
    #[serde(default)]
    pub id: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default)]
    pub usage_count: u64,
    #[serde(default)]
    pub created_at: String,
}

/// One echo. The last four fields are stamped by the aggregator at merge
/// time; whatever the origin hub sends for them is overwritten.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeedItem {
    pub id: u64,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub image_url: String,
    #[serde(default)]
    pub image_source: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub images: Vec<Image>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<Tag>>,
    #[serde(default)]
    pub private: bool,
    #[serde(default)]
    pub user_id: u64,
    #[serde(default)]
    pub extension: String,
    #[serde(default)]
    pub extension_type: String,
    #[serde(default)]
    pub fav_count: u64,
    #[serde(default)]
    pub created_at: String,

    #[serde(default, rename = "createdTs")]
    pub created_ts: i64,
    #[serde(default)]
    pub server_name: String,
    #[serde(default)]
    pub server_url: String,
    #[serde(default)]
    pub logo: String,
}

impl FeedItem {
    /// Resolved URLs for every attached image, against the origin hub
    pub fn image_urls(&self) -> Vec<String> {
        let mut urls: Vec<String> = self
            .images
            .iter()
            .map(|image| image.resolved_url(&self.server_url))
            .collect();

        if urls.is_empty() && !self.image_url.is_empty() {
            urls.push(resolve_image_url(
                &self.image_url,
                &self.image_source,
                &self.server_url,
            ));
        }
        urls
    }

    pub fn tag_names(&self) -> Vec<&str> {
        self.tags
            .iter()
            .flatten()
            .map(|tag| tag.name.as_str())
            .collect()
    }
}

/// Hubs send `null` for empty collections and blank strings
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Parse a hub timestamp into epoch milliseconds.
///
/// Hubs send RFC 3339; a bare `YYYY-MM-DD HH:MM:SS` is read as UTC.
pub fn parse_created_at(created_at: &str) -> Option<i64> {
    let trimmed = created_at.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.timestamp_millis());
    }
    ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(trimmed, fmt).ok())
        .map(|naive| naive.and_utc().timestamp_millis())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_created_at() {
        assert_eq!(parse_created_at("1970-01-01T00:00:01Z"), Some(1000));
        assert_eq!(
            parse_created_at("2025-01-01T08:00:00+08:00"),
            parse_created_at("2025-01-01T00:00:00Z")
        );
        assert_eq!(parse_created_at("1970-01-01 00:00:02"), Some(2000));
        assert_eq!(parse_created_at("1970-01-01T00:00:00.5"), Some(500));
        assert_eq!(parse_created_at("yesterday"), None);
        assert_eq!(parse_created_at(""), None);
    }

    #[test]
    fn test_resolve_image_url() {
        let base = "https://hub.example";
        assert_eq!(
            resolve_image_url("/images/a.png", "local", base),
            "https://hub.example/api/images/a.png"
        );
        assert_eq!(
            resolve_image_url("https://cdn.example/a.png", "url", base),
            "https://cdn.example/a.png"
        );
        // Unknown sources fall back to local
        assert_eq!(
            resolve_image_url("/images/b.png", "ftp", base),
            "https://hub.example/api/images/b.png"
        );
    }

    #[test]
    fn test_parse_item_and_image_urls() {
        let json = r#"{
            "id": 42,
            "content": "hello",
            "username": "alice",
            "images": [
                {"id": 1, "message_id": 42, "image_url": "/images/x.jpg", "image_source": "local"},
                {"id": 2, "message_id": 42, "image_url": "https://cdn.example/y.jpg", "image_source": "url"}
            ],
            "tags": [{"id": 1, "name": "rust", "usage_count": 3, "created_at": ""}],
            "private": false,
            "user_id": 1,
            "extension": "",
            "extension_type": "",
            "fav_count": 2,
            "created_at": "2025-03-01T10:00:00Z"
        }"#;
        let mut item: FeedItem = serde_json::from_str(json).unwrap();
        item.server_url = "https://hub.example".to_string();

        assert_eq!(
            item.image_urls(),
            vec![
                "https://hub.example/api/images/x.jpg".to_string(),
                "https://cdn.example/y.jpg".to_string(),
            ]
        );
        assert_eq!(item.tag_names(), vec!["rust"]);
        assert_eq!(item.created_ts, 0);
    }

    #[test]
    fn test_null_images_and_nameless_tag() {
        let json = r#"{
            "id": 7,
            "images": null,
            "tags": [{"id": 3}, {"id": 4, "name": null}],
            "created_at": "2025-03-01T10:00:00Z"
        }"#;
        let item: FeedItem = serde_json::from_str(json).unwrap();
        assert!(item.images.is_empty());
        assert!(item.image_urls().is_empty());
        assert_eq!(item.tag_names(), vec!["", ""]);
    }

    #[test]
    fn test_legacy_single_image() {
        let item = FeedItem {
            image_url: "/images/old.png".to_string(),
            image_source: "local".to_string(),
            server_url: "https://hub.example".to_string(),
            ..Default::default()
        };
        assert_eq!(
            item.image_urls(),
            vec!["https://hub.example/api/images/old.png"]
        );
    }
}
