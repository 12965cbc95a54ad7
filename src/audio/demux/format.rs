//! Container sniffing on the first bytes of a stream.

/// Containers a source may hand us. Only [`AudioFormat::Webm`] can be
/// demuxed; the rest are named so they can be reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioFormat {
    Webm,
    Ogg,
    Mp4,
    Unknown,
}

impl AudioFormat {
    pub fn as_mime(&self) -> Option<&'static str> {
        match self {
            Self::Webm => Some("audio/webm"),
            Self::Ogg => Some("audio/ogg"),
            Self::Mp4 => Some("audio/mp4"),
            Self::Unknown => None,
        }
    }
}

/// Requires at least 4 bytes. Returns `AudioFormat::Unknown` for anything
/// not recognised.
pub fn detect_format(header: &[u8]) -> AudioFormat {
    if header.len() < 4 {
        return AudioFormat::Unknown;
    }

    // EBML magic: 0x1A 45 DF A3
    if header.starts_with(&[0x1A, 0x45, 0xDF, 0xA3]) {
        return AudioFormat::Webm;
    }

    if header.starts_with(b"OggS") {
        return AudioFormat::Ogg;
    }

    if header.len() >= 8 && &header[4..8] == b"ftyp" {
        return AudioFormat::Mp4;
    }

    AudioFormat::Unknown
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::fixture::minimal_webm;

    #[test]
    fn detect_webm() {
        assert_eq!(detect_format(&minimal_webm("webm", b"x")), AudioFormat::Webm);
    }

    #[test]
    fn detect_other_containers() {
        assert_eq!(detect_format(b"OggS\x00"), AudioFormat::Ogg);
        assert_eq!(detect_format(b"\x00\x00\x00\x1Cftypisom"), AudioFormat::Mp4);
    }

    #[test]
    fn short_or_unknown_headers() {
        assert_eq!(detect_format(&[0x1A, 0x45]), AudioFormat::Unknown);
        assert_eq!(detect_format(&[0, 0, 0, 0]), AudioFormat::Unknown);
    }
}
