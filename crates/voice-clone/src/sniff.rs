/// Container format of an uploaded reference clip
///
/// Only used to pick the file suffix the synthesis backend sees; many audio
/// loaders dispatch on extension rather than content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioFormat {
    Wav,
    Webm,
    Mp4,
}

const RIFF_MAGIC: &[u8] = b"RIFF";
const EBML_MAGIC: &[u8] = &[0x1A, 0x45, 0xDF, 0xA3];
const FTYP_BOX: &[u8] = b"ftyp";

impl AudioFormat {
    /// Classify audio bytes by their leading signature
    ///
    /// Anything unrecognised is treated as WAV; the backend decoder gets the
    /// final say on whether it can read it.
    pub fn sniff(bytes: &[u8]) -> Self {
        if bytes.starts_with(RIFF_MAGIC) {
            Self::Wav
        } else if bytes.starts_with(EBML_MAGIC) {
            Self::Webm
        } else if bytes.len() > 8 && &bytes[4..8] == FTYP_BOX {
            Self::Mp4
        } else {
            Self::Wav
        }
    }

    /// File extension including the leading dot
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Wav => ".wav",
            Self::Webm => ".webm",
            Self::Mp4 => ".mp4",
        }
    }

    pub const fn mime_type(self) -> &'static str {
        match self {
            Self::Wav => "audio/wav",
            Self::Webm => "audio/webm",
            Self::Mp4 => "audio/mp4",
        }
    }

    /// Short lowercase name (e.g. "webm")
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Wav => "wav",
            Self::Webm => "webm",
            Self::Mp4 => "mp4",
        }
    }
}
