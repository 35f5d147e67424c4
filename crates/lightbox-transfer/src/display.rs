//! On-screen sizing of the viewed image

use serde::{Deserialize, Serialize};

use crate::platform::Platform;
use crate::request::ViewRequest;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DisplaySize {
    pub width: f64,
    pub height: f64,
}

/// Fit the image into the width budget for `platform`.
///
/// Landscape images take the full budget width. Portrait images are bounded
/// to a square of the same budget and their width follows from the height.
pub fn compute_display_size(
    request: &ViewRequest,
    viewport_width: f64,
    platform: Platform,
) -> DisplaySize {
    let aspect_ratio = request.aspect_ratio();
    let max_width = viewport_width * platform.viewport_fraction();

    let mut height = max_width / aspect_ratio;
    let mut width = max_width;

    if aspect_ratio < 1.0 {
        height = height.min(max_width);
        width = height * aspect_ratio;
    }

    DisplaySize { width, height }
}
