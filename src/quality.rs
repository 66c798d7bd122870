//! Quality selectors and their extraction profiles.
//!
//! Every selector the API accepts maps to a fixed [`QualityProfile`] that
//! decides the output extension, the format-selection expression handed to
//! yt-dlp, and the optional transcode step. The table is total: validation
//! guarantees every parsed [`Quality`] has a profile.

use serde::{Deserialize, Serialize};

/// Output quality selector, as it appears in the query string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Quality {
    /// MP3 transcode at 320 kbit/s.
    Mp3_320,
    /// MP3 transcode at 192 kbit/s.
    Mp3_192,
    /// Native AAC stream in an M4A container, no transcode.
    M4a,
    /// Lossless FLAC transcode.
    Flac,
}

/// Static extraction/transcode parameters for one quality selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QualityProfile {
    /// Extension of the file the extractor ends up writing.
    pub ext: &'static str,
    /// yt-dlp format-selection expression.
    pub format: &'static str,
    /// Target codec for the audio-extraction post-processor, if any.
    pub codec: Option<&'static str>,
    /// Target bitrate for the post-processor, if any.
    pub bitrate: Option<&'static str>,
}

const MP3_320: QualityProfile = QualityProfile {
    ext: "mp3",
    format: "bestaudio/best",
    codec: Some("mp3"),
    bitrate: Some("320K"),
};

const MP3_192: QualityProfile = QualityProfile {
    ext: "mp3",
    format: "bestaudio/best",
    codec: Some("mp3"),
    bitrate: Some("192K"),
};

const M4A: QualityProfile = QualityProfile {
    ext: "m4a",
    format: "bestaudio[ext=m4a]/best",
    codec: None,
    bitrate: None,
};

const FLAC: QualityProfile = QualityProfile {
    ext: "flac",
    format: "bestaudio/best",
    codec: Some("flac"),
    bitrate: None,
};

impl Quality {
    /// All selectors the API accepts.
    pub const ALL: [Quality; 4] = [Quality::Mp3_320, Quality::Mp3_192, Quality::M4a, Quality::Flac];

    /// The fixed profile for this selector.
    pub fn profile(self) -> &'static QualityProfile {
        match self {
            Quality::Mp3_320 => &MP3_320,
            Quality::Mp3_192 => &MP3_192,
            Quality::M4a => &M4A,
            Quality::Flac => &FLAC,
        }
    }
}

impl std::str::FromStr for Quality {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "mp3_320" => Ok(Quality::Mp3_320),
            "mp3_192" => Ok(Quality::Mp3_192),
            "m4a" => Ok(Quality::M4a),
            "flac" => Ok(Quality::Flac),
            _ => Err(format!("Unknown quality selector: {}", s)),
        }
    }
}

impl std::fmt::Display for Quality {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Quality::Mp3_320 => write!(f, "mp3_320"),
            Quality::Mp3_192 => write!(f, "mp3_192"),
            Quality::M4a => write!(f, "m4a"),
            Quality::Flac => write!(f, "flac"),
        }
    }
}
