/// What the viewer asked to watch. A session is bound to exactly one source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaybackSource {
    pub stream_url: String,
    pub title: String,
    pub channel_id: String,
}

impl PlaybackSource {
    pub fn new(stream_url: &str, title: &str, channel_id: &str) -> Self {
        Self {
            stream_url: stream_url.to_string(),
            title: title.to_string(),
            channel_id: channel_id.to_string(),
        }
    }

    pub fn kind(&self) -> StreamKind {
        StreamKind::classify(&self.stream_url)
    }
}

/// How a stream URL has to be fed to the player
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamKind {
    /// HLS manifest, needs native manifest support or the adaptive engine
    Adaptive,
    /// Anything the media element can open by itself
    Direct,
}

impl StreamKind {
    pub fn classify(url: &str) -> Self {
        let lower = url.to_ascii_lowercase();
        // ".m3u" also covers ".m3u8"
        if lower.contains(".m3u") {
            StreamKind::Adaptive
        } else {
            StreamKind::Direct
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("https://cdn.example.com/live/sport1/index.m3u8", StreamKind::Adaptive)]
    #[case("http://host/playlist.M3U8?token=abc", StreamKind::Adaptive)]
    #[case("http://host/list.m3u", StreamKind::Adaptive)]
    #[case("http://host/channel/1.ts", StreamKind::Direct)]
    #[case("https://host/movie.mp4", StreamKind::Direct)]
    #[case("", StreamKind::Direct)]
    fn test_classify(#[case] url: &str, #[case] expected: StreamKind) {
        assert_eq!(StreamKind::classify(url), expected);
    }

    #[test]
    fn test_source_equality_covers_all_fields() {
        let a = PlaybackSource::new("http://a/x.m3u8", "Azam One", "c1");
        let b = PlaybackSource::new("http://a/x.m3u8", "Azam One", "c2");
        assert_ne!(a, b);
        assert_eq!(a, a.clone());
    }
}
