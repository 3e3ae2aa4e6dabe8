//! Echo extension payloads.
//!
//! An echo may carry one attachment in `extension`, typed by
//! `extension_type`. Music links are parsed into a provider/kind/id triple
//! so a player can be embedded.

use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;

use crate::constants::extension_types;
use crate::models::FeedItem;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExtensionType {
    Music,
    Video,
    GithubProject,
    Website,
}

impl ExtensionType {
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            extension_types::MUSIC => Some(ExtensionType::Music),
            extension_types::VIDEO => Some(ExtensionType::Video),
            extension_types::GITHUB_PROJECT => Some(ExtensionType::GithubProject),
            extension_types::WEBSITE => Some(ExtensionType::Website),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MusicProvider {
    Netease,
    Tencent,
    Apple,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MusicLink {
    pub provider: MusicProvider,
    /// `song`, `playlist` or `album`
    pub kind: String,
    pub id: String,
}

fn netease_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"music\.163\.com/(?:#/)?(song|playlist|album)(?:\?id=|/)(\d+)")
            .expect("valid netease pattern")
    })
}

fn qq_song_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"y\.qq\.com/n/ryqq/songDetail/([a-zA-Z0-9]+)").expect("valid qq pattern")
    })
}

/// Recognize NetEase and QQ Music links
pub fn parse_music_url(url: &str) -> Option<MusicLink> {
    let url = url.trim();

    if let Some(caps) = netease_pattern().captures(url) {
        return Some(MusicLink {
            provider: MusicProvider::Netease,
            kind: caps[1].to_string(),
            id: caps[2].to_string(),
        });
    }

    qq_song_pattern().captures(url).map(|caps| MusicLink {
        provider: MusicProvider::Tencent,
        kind: "song".to_string(),
        id: caps[1].to_string(),
    })
}

impl FeedItem {
    pub fn extension_type(&self) -> Option<ExtensionType> {
        ExtensionType::from_tag(&self.extension_type)
    }

    /// Parsed music link, if this echo carries one
    pub fn music_link(&self) -> Option<MusicLink> {
        match self.extension_type() {
            Some(ExtensionType::Music) => parse_music_url(&self.extension),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_netease() {
        let link = parse_music_url("https://music.163.com/#/song?id=1901371647").unwrap();
        assert_eq!(link.provider, MusicProvider::Netease);
        assert_eq!(link.kind, "song");
        assert_eq!(link.id, "1901371647");

        let link = parse_music_url("  https://music.163.com/playlist/12345 ").unwrap();
        assert_eq!(link.kind, "playlist");
        assert_eq!(link.id, "12345");
    }

    #[test]
    fn test_parse_qq() {
        let link = parse_music_url("https://y.qq.com/n/ryqq/songDetail/003aAYrm3GE0Ac").unwrap();
        assert_eq!(link.provider, MusicProvider::Tencent);
        assert_eq!(link.kind, "song");
        assert_eq!(link.id, "003aAYrm3GE0Ac");
    }

    #[test]
    fn test_unknown_link() {
        assert!(parse_music_url("https://open.spotify.com/track/abc").is_none());
        assert!(parse_music_url("").is_none());
    }

    #[test]
    fn test_item_music_link() {
        let item = FeedItem {
            extension: "https://music.163.com/#/album?id=42".into(),
            extension_type: "MUSIC".into(),
            ..Default::default()
        };
        assert_eq!(item.extension_type(), Some(ExtensionType::Music));
        assert_eq!(item.music_link().unwrap().kind, "album");

        let website = FeedItem {
            extension: "https://music.163.com/#/album?id=42".into(),
            extension_type: "WEBSITE".into(),
            ..Default::default()
        };
        assert!(website.music_link().is_none());
    }
}
