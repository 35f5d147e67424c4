//! View request handed to the screen when it opens

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::TransferError;
use crate::Result;

const FALLBACK_FILE_NAME: &str = "download";

/// What to display and where to fetch it from.
///
/// Validated on construction and immutable afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawViewRequest")]
pub struct ViewRequest {
    source_url: String,
    preview_url: String,
    image_width: f64,
    image_height: f64,
    #[serde(skip)]
    file_name: String,
}

#[derive(Deserialize)]
struct RawViewRequest {
    source_url: String,
    #[serde(default)]
    preview_url: String,
    image_width: f64,
    image_height: f64,
}

impl TryFrom<RawViewRequest> for ViewRequest {
    type Error = TransferError;

    fn try_from(raw: RawViewRequest) -> Result<Self> {
        ViewRequest::new(
            raw.source_url,
            raw.preview_url,
            raw.image_width,
            raw.image_height,
        )
    }
}

impl ViewRequest {
    pub fn new(
        source_url: impl Into<String>,
        preview_url: impl Into<String>,
        image_width: f64,
        image_height: f64,
    ) -> Result<Self> {
        let source_url = source_url.into();
        let preview_url = preview_url.into();

        if let Err(e) = url::Url::parse(&source_url) {
            return Err(TransferError::InvalidRequest(format!(
                "source url {:?}: {}",
                source_url, e
            )));
        }

        for (label, value) in [("width", image_width), ("height", image_height)] {
            if !value.is_finite() || value <= 0.0 {
                return Err(TransferError::InvalidRequest(format!(
                    "image {} must be positive, got {}",
                    label, value
                )));
            }
        }

        let file_name = derive_file_name(&preview_url);

        Ok(Self {
            source_url,
            preview_url,
            image_width,
            image_height,
            file_name,
        })
    }

    pub fn source_url(&self) -> &str {
        &self.source_url
    }

    pub fn preview_url(&self) -> &str {
        &self.preview_url
    }

    pub fn image_width(&self) -> f64 {
        self.image_width
    }

    pub fn image_height(&self) -> f64 {
        self.image_height
    }

    /// Local file name shared by every transfer of this request
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn aspect_ratio(&self) -> f64 {
        self.image_width / self.image_height
    }
}

/// Last path segment of the preview URL, reduced to a bare file name.
fn derive_file_name(preview_url: &str) -> String {
    let segment = match url::Url::parse(preview_url) {
        Ok(parsed) => parsed
            .path_segments()
            .and_then(|mut s| s.next_back())
            .map(str::to_string),
        Err(_) => preview_url
            .split(['?', '#'])
            .next()
            .and_then(|path| path.rsplit('/').next())
            .map(str::to_string),
    };

    let segment = segment.unwrap_or_default();
    let name = Path::new(segment.trim())
        .file_name()
        .and_then(|name| name.to_str())
        .map(str::trim)
        .unwrap_or("");

    if name.is_empty() || name == "." || name == ".." {
        FALLBACK_FILE_NAME.to_string()
    } else {
        name.to_string()
    }
}
