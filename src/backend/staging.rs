use super::form::Attachment;
use super::types::StagedFile;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use futures_util::future;
use image::{ImageFormat, ImageReader};
use std::io::{self, Cursor};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::fs;

#[derive(Debug, Error)]
pub enum StageError {
    #[error("Invalid file type: {0}")]
    InvalidFileType(PathBuf),
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Read every selected file and build its preview.
///
/// All or nothing: the first file that can't be read, or isn't an image,
/// rejects the whole batch. On success the attachments are in selection order.
pub async fn stage_images(paths: Vec<PathBuf>) -> Result<Vec<Attachment>, StageError> {
    future::try_join_all(paths.into_iter().map(stage_image)).await
}

async fn stage_image(path: PathBuf) -> Result<Attachment, StageError> {
    let bytes = match fs::read(&path).await {
        Ok(bytes) => bytes,
        Err(source) => return Err(StageError::Read { path, source }),
    };
    let Some(format) = image_format(&path, &bytes) else {
        return Err(StageError::InvalidFileType(path));
    };
    let media_type = format.to_mime_type().to_string();
    let dimensions = ImageReader::with_format(Cursor::new(&bytes), format)
        .into_dimensions()
        .ok();
    let preview = data_url(&media_type, &bytes);
    let name = path
        .file_name()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    Ok(Attachment {
        file: StagedFile {
            name,
            path,
            media_type,
            bytes,
        },
        preview,
        dimensions,
        remote: None,
    })
}

/// Media type by extension first, then by content. Only formats `ImageFormat`
/// knows count as images, so e.g. SVG and HEIC are rejected.
pub fn image_format(path: &Path, bytes: &[u8]) -> Option<ImageFormat> {
    ImageFormat::from_path(path)
        .or_else(|_| image::guess_format(bytes))
        .ok()
}

pub fn data_url(media_type: &str, bytes: &[u8]) -> String {
    format!("data:{media_type};base64,{}", STANDARD.encode(bytes))
}
