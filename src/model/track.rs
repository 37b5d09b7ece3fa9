//! Catalog track record as served by `GET /api/songs`

use serde::Deserialize;

/// One playable audio item with metadata. Immutable once fetched; the server
/// owns all edits.
#[derive(Clone, Debug, Deserialize)]
pub struct Track {
    pub id: u64,
    pub title: String,
    pub artist: String,
    pub album: Option<String>,
    pub genre: Option<String>,
    /// Size of the stored file in bytes.
    pub file_size: u64,
    /// Encoded bitrate in kbps, when the server could read it.
    pub bitrate: Option<u32>,
    pub format: Option<String>,
    pub upload_date: Option<String>,
}

impl Track {
    /// Advisory duration in seconds, derived from size and bitrate. The
    /// catalog carries no duration; the renderer's reported duration is the
    /// only authoritative value and replaces this once a track is loaded.
    pub fn estimated_duration(&self) -> Option<f64> {
        let bitrate = self.bitrate.filter(|b| *b > 0)?;
        Some((self.file_size as f64 * 8.0) / (bitrate as f64 * 1000.0))
    }

    pub fn album_str(&self) -> &str {
        self.album.as_deref().unwrap_or("-")
    }

    pub fn genre_str(&self) -> &str {
        self.genre.as_deref().unwrap_or("-")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn track(file_size: u64, bitrate: Option<u32>) -> Track {
        Track {
            id: 1,
            title: "t".into(),
            artist: "a".into(),
            album: None,
            genre: None,
            file_size,
            bitrate,
            format: Some("mp3".into()),
            upload_date: None,
        }
    }

    #[test]
    fn estimated_duration_from_size_and_bitrate() {
        // 4_800_000 bytes at 192 kbps -> 200 seconds
        let t = track(4_800_000, Some(192));
        assert_eq!(t.estimated_duration(), Some(200.0));
    }

    #[test]
    fn estimated_duration_unknown_without_bitrate() {
        assert_eq!(track(4_800_000, None).estimated_duration(), None);
        assert_eq!(track(4_800_000, Some(0)).estimated_duration(), None);
    }
}
