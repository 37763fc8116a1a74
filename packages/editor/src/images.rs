//! Image files: validation against the configured policy and resolution to a
//! displayable URL.
//!
//! Validation is synchronous and happens before any task is started, so a
//! rejected file never touches the document. Resolution goes through an
//! [`ImageResolver`], which returns a future; the session decides where that
//! future runs.

use base64::Engine;
use futures::future::{BoxFuture, FutureExt};
use thiserror::Error;

const MEGABYTE: usize = 1024 * 1024;

/// A file handed over by a drop or paste.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageFile {
    pub name: String,
    pub mime: String,
    pub bytes: Vec<u8>,
}

impl ImageFile {
    pub fn new(name: impl Into<String>, mime: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            mime: mime.into(),
            bytes,
        }
    }

    pub fn size(&self) -> usize {
        self.bytes.len()
    }
}

/// Per-file rejection, reported to the user as a notification.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ImageError {
    #[error("File \"{name}\" is not an image and was skipped.")]
    NotAnImage { name: String },

    #[error("Image \"{name}\" exceeds the {limit_mb}MB limit and was skipped.")]
    TooLarge { name: String, limit_mb: usize },

    #[error("Error reading image file")]
    ReadFailed { name: String, reason: String },
}

impl ImageError {
    pub fn file_name(&self) -> &str {
        match self {
            Self::NotAnImage { name } | Self::TooLarge { name, .. } | Self::ReadFailed { name, .. } => {
                name
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImagePolicy {
    pub max_bytes: usize,
    /// MIME prefix a file must carry, `image/` by default
    pub accepted_prefix: String,
}

impl Default for ImagePolicy {
    fn default() -> Self {
        Self {
            max_bytes: 5 * MEGABYTE,
            accepted_prefix: "image/".to_string(),
        }
    }
}

impl ImagePolicy {
    /// Type is checked before size; a file gets at most one error.
    pub fn check(&self, file: &ImageFile) -> Result<(), ImageError> {
        if !file.mime.starts_with(&self.accepted_prefix) {
            return Err(ImageError::NotAnImage {
                name: file.name.clone(),
            });
        }
        if file.size() > self.max_bytes {
            return Err(ImageError::TooLarge {
                name: file.name.clone(),
                limit_mb: self.max_bytes.div_ceil(MEGABYTE),
            });
        }
        Ok(())
    }

    /// Splits `files` into accepted files and one error per rejected file,
    /// both in input order.
    pub fn partition(&self, files: Vec<ImageFile>) -> (Vec<ImageFile>, Vec<ImageError>) {
        let mut accepted = Vec::new();
        let mut rejected = Vec::new();
        for file in files {
            match self.check(&file) {
                Ok(()) => accepted.push(file),
                Err(err) => rejected.push(err),
            }
        }
        (accepted, rejected)
    }
}

/// Content dropped or pasted onto the editing surface.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DataTransfer {
    pub files: Vec<ImageFile>,
    pub text: Option<String>,
}

impl DataTransfer {
    pub fn files(files: Vec<ImageFile>) -> Self {
        Self { files, text: None }
    }

    pub fn text(text: impl Into<String>) -> Self {
        Self {
            files: Vec::new(),
            text: Some(text.into()),
        }
    }
}

pub fn to_data_url(file: &ImageFile) -> String {
    let encoded = base64::engine::general_purpose::STANDARD.encode(&file.bytes);
    format!("data:{};base64,{}", file.mime, encoded)
}

/// Turns an accepted file into a URL the document can reference.
pub trait ImageResolver: Send + Sync {
    fn resolve(&self, file: ImageFile) -> BoxFuture<'static, Result<String, ImageError>>;
}

/// Inlines the file as a base64 `data:` URL.
#[derive(Debug, Clone, Copy, Default)]
pub struct DataUrlResolver;

impl ImageResolver for DataUrlResolver {
    fn resolve(&self, file: ImageFile) -> BoxFuture<'static, Result<String, ImageError>> {
        async move {
            if file.bytes.is_empty() {
                return Err(ImageError::ReadFailed {
                    name: file.name,
                    reason: "file is empty".to_string(),
                });
            }
            Ok(to_data_url(&file))
        }
        .boxed()
    }
}

/// Outcome of one resolution task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageCompletion {
    pub name: String,
    pub result: Result<String, ImageError>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn png(size: usize) -> ImageFile {
        ImageFile::new("cat.png", "image/png", vec![0; size])
    }

    #[test]
    fn test_policy_accepts_small_image() {
        assert_eq!(ImagePolicy::default().check(&png(1024)), Ok(()));
    }

    #[test]
    fn test_policy_rejects_oversized_image() {
        let err = ImagePolicy::default().check(&png(5 * MEGABYTE + 1)).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Image \"cat.png\" exceeds the 5MB limit and was skipped."
        );
    }

    #[test]
    fn test_policy_rejects_non_image_before_size() {
        let file = ImageFile::new("notes.txt", "text/plain", vec![0; 10 * MEGABYTE]);
        let err = ImagePolicy::default().check(&file).unwrap_err();
        assert_eq!(err.to_string(), "File \"notes.txt\" is not an image and was skipped.");
    }

    #[test]
    fn test_partition_reports_one_error_per_file() {
        let (accepted, rejected) = ImagePolicy::default().partition(vec![
            png(10),
            ImageFile::new("a.pdf", "application/pdf", vec![1]),
            png(6 * MEGABYTE),
        ]);
        assert_eq!(accepted.len(), 1);
        assert_eq!(rejected.len(), 2);
        assert_eq!(rejected[0].file_name(), "a.pdf");
    }

    #[test]
    fn test_data_url() {
        let file = ImageFile::new("dot.gif", "image/gif", b"GIF".to_vec());
        assert_eq!(to_data_url(&file), "data:image/gif;base64,R0lG");
    }

    #[test]
    fn test_data_url_resolver() {
        let url = futures::executor::block_on(DataUrlResolver.resolve(png(3))).unwrap();
        assert_eq!(url, "data:image/png;base64,AAAA");

        let empty = futures::executor::block_on(DataUrlResolver.resolve(png(0)));
        assert!(matches!(empty, Err(ImageError::ReadFailed { .. })));
    }
}
