//! Presentation context the viewer runs in

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    /// Web-like context: no file system hand-off, no share sheet
    Web,
    Android,
    Ios,
}

impl Platform {
    pub fn is_web(&self) -> bool {
        matches!(self, Platform::Web)
    }

    /// Whether the device exposes a shared media library
    pub fn has_media_library(&self) -> bool {
        matches!(self, Platform::Android | Platform::Ios)
    }

    /// Share of the viewport width the image may occupy
    pub fn viewport_fraction(&self) -> f64 {
        match self {
            Platform::Web => 0.50,
            Platform::Android | Platform::Ios => 0.92,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Web => "web",
            Platform::Android => "android",
            Platform::Ios => "ios",
        }
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Platform {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "web" => Ok(Platform::Web),
            "android" => Ok(Platform::Android),
            "ios" => Ok(Platform::Ios),
            _ => Err(format!("Unknown platform: {}", s)),
        }
    }
}
