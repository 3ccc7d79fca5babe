//! Song records as returned by the search endpoint

use serde::Deserialize;

const UNKNOWN_ARTIST: &str = "Unknown Artist";

/// A song from the catalog or a search
#[derive(Clone, Debug, PartialEq)]
pub struct Song {
    pub id: String,
    pub name: String,
    pub artists: String,
    pub album: Option<String>,
    pub duration_secs: Option<u32>,
    pub language: Option<String>,
    /// Image URLs in ascending resolution
    pub images: Vec<String>,
    /// Audio source URLs in ascending bitrate
    pub sources: Vec<String>,
}

impl Song {
    /// The largest image variant
    pub fn thumbnail_url(&self) -> Option<&str> {
        self.images.last().map(String::as_str)
    }

    /// The highest-bitrate source variant
    pub fn playable_url(&self) -> Option<&str> {
        self.sources
            .last()
            .map(String::as_str)
            .filter(|url| !url.is_empty())
    }

    pub fn duration_ms(&self) -> u32 {
        self.duration_secs.unwrap_or(0).saturating_mul(1000)
    }
}

#[derive(Deserialize)]
pub(crate) struct SearchResponse {
    #[serde(default)]
    data: Option<SearchData>,
}

#[derive(Deserialize)]
struct SearchData {
    #[serde(default)]
    results: Vec<RawSong>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawSong {
    id: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    image: Vec<UrlVariant>,
    #[serde(default)]
    download_url: Vec<UrlVariant>,
    #[serde(default)]
    primary_artists: Option<String>,
    #[serde(default)]
    artists: Option<RawArtists>,
    #[serde(default)]
    album: Option<RawAlbum>,
    #[serde(default, deserialize_with = "lenient_seconds")]
    duration: Option<u32>,
    #[serde(default)]
    language: Option<String>,
}

#[derive(Deserialize)]
struct UrlVariant {
    #[serde(default)]
    url: String,
}

#[derive(Deserialize)]
struct RawArtists {
    #[serde(default)]
    primary: Vec<RawArtist>,
}

#[derive(Deserialize)]
struct RawArtist {
    #[serde(default)]
    name: String,
}

#[derive(Deserialize)]
struct RawAlbum {
    #[serde(default)]
    name: Option<String>,
}

/// The API reports durations as either a number or a numeric string
fn lenient_seconds<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::Number(n)) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
        Some(serde_json::Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    })
}

impl SearchResponse {
    pub fn into_songs(self) -> Vec<Song> {
        self.data
            .map(|data| data.results.into_iter().map(Song::from).collect())
            .unwrap_or_default()
    }
}

impl From<RawSong> for Song {
    fn from(raw: RawSong) -> Self {
        let artists = match raw.primary_artists.filter(|s| !s.trim().is_empty()) {
            Some(primary) => primary,
            None => {
                let names: Vec<String> = raw
                    .artists
                    .map(|a| a.primary.into_iter().map(|artist| artist.name).collect())
                    .unwrap_or_default();
                let joined = names
                    .into_iter()
                    .filter(|name| !name.is_empty())
                    .collect::<Vec<_>>()
                    .join(", ");
                if joined.is_empty() {
                    UNKNOWN_ARTIST.to_string()
                } else {
                    joined
                }
            }
        };

        Self {
            id: raw.id,
            name: raw.name,
            artists,
            album: raw.album.and_then(|a| a.name).filter(|n| !n.is_empty()),
            duration_secs: raw.duration,
            language: raw.language.filter(|l| !l.is_empty()),
            images: raw.image.into_iter().map(|v| v.url).collect(),
            sources: raw.download_url.into_iter().map(|v| v.url).collect(),
        }
    }
}

#[cfg(test)]
pub(crate) fn test_song(id: &str) -> Song {
    Song {
        id: id.to_string(),
        name: format!("Song {id}"),
        artists: "Test Artist".to_string(),
        album: None,
        duration_secs: Some(180),
        language: None,
        images: vec![format!("https://img.test/{id}-50.jpg"), format!("https://img.test/{id}-500.jpg")],
        sources: vec![format!("https://cdn.test/{id}-96.mp4"), format!("https://cdn.test/{id}-320.mp4")],
    }
}
