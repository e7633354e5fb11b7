use std::path::Path;

use serde::Serialize;

use crate::sanitize::redact_path;

/// What the presentation layer can show for a stored photo reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PhotoPreview {
    Image {
        path: String,
        width: u32,
        height: u32,
        mime: String,
    },
    /// The file is missing or could not be decoded; show the path instead.
    RawPath { path: String },
}

impl PhotoPreview {
    pub fn path(&self) -> &str {
        match self {
            PhotoPreview::Image { path, .. } | PhotoPreview::RawPath { path } => path,
        }
    }
}

/// Reads the image header of `path`. Never fails: anything that cannot be
/// decoded falls back to [`PhotoPreview::RawPath`].
pub fn preview(path: &str) -> PhotoPreview {
    let file = Path::new(path);
    match image::image_dimensions(file) {
        Ok((width, height)) => PhotoPreview::Image {
            path: path.to_string(),
            width,
            height,
            mime: mime_guess::from_path(file)
                .first_or_octet_stream()
                .essence_str()
                .to_string(),
        },
        Err(e) => {
            log::debug!("Cannot decode photo {}: {}", redact_path(file), e);
            PhotoPreview::RawPath {
                path: path.to_string(),
            }
        }
    }
}
