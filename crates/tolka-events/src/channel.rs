use std::fmt;
use std::str::FromStr;

/// Process-wide channel identifiers.
///
/// The string forms are a stable contract with the UI windows and anything
/// else listening on the host messaging layer; renaming one is a breaking
/// change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    OnOffConfigTrayItem,
    RefreshOverlay,
    NewTranslatedText,
    DownloadProgress,
    StopDownload,
}

impl Channel {
    pub const ALL: [Channel; 5] = [
        Channel::OnOffConfigTrayItem,
        Channel::RefreshOverlay,
        Channel::NewTranslatedText,
        Channel::DownloadProgress,
        Channel::StopDownload,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Channel::OnOffConfigTrayItem => "OnOffConfigTrayItem",
            Channel::RefreshOverlay => "RefreshOverlay",
            Channel::NewTranslatedText => "NewTranslatedText",
            Channel::DownloadProgress => "DownloadProgress",
            Channel::StopDownload => "StopDownload",
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownChannel(pub String);

impl fmt::Display for UnknownChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown channel name: {}", self.0)
    }
}

impl std::error::Error for UnknownChannel {}

impl FromStr for Channel {
    type Err = UnknownChannel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Channel::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| UnknownChannel(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// These literals are observed by external windows; they must never
    /// change.
    #[test]
    fn wire_names_are_stable() {
        assert_eq!(Channel::OnOffConfigTrayItem.as_str(), "OnOffConfigTrayItem");
        assert_eq!(Channel::RefreshOverlay.as_str(), "RefreshOverlay");
        assert_eq!(Channel::NewTranslatedText.as_str(), "NewTranslatedText");
        assert_eq!(Channel::DownloadProgress.as_str(), "DownloadProgress");
        assert_eq!(Channel::StopDownload.as_str(), "StopDownload");
    }

    #[test]
    fn names_round_trip_and_are_unique() {
        let mut seen = std::collections::HashSet::new();
        for channel in Channel::ALL {
            assert!(seen.insert(channel.as_str()));
            assert_eq!(channel.as_str().parse::<Channel>().unwrap(), channel);
        }
        assert!("RefreshOverlays".parse::<Channel>().is_err());
        assert!("".parse::<Channel>().is_err());
    }
}
