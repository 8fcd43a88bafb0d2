use std::path::{Path, PathBuf};

use image::ImageFormat;

/// An image picked for the disease detector. Only the path is held; the
/// bytes are read when the request is sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub path: PathBuf,
    pub file_name: String,
    pub mime: &'static str,
}

impl Attachment {
    /// Accepts files whose extension names an image format. Returns `None`
    /// for anything else, including paths without a file name.
    pub fn from_path(path: impl AsRef<Path>) -> Option<Self> {
        let path = path.as_ref();
        let file_name = path.file_name()?.to_string_lossy().into_owned();
        let format = ImageFormat::from_path(path).ok()?;

        Some(Attachment {
            path: path.to_path_buf(),
            file_name,
            mime: format.to_mime_type(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_images_by_extension() {
        let attachment = Attachment::from_path("/tmp/leaves/tomato.JPG").unwrap();
        assert_eq!(attachment.file_name, "tomato.JPG");
        assert_eq!(attachment.mime, "image/jpeg");

        let png = Attachment::from_path("wheat.png").unwrap();
        assert_eq!(png.mime, "image/png");
    }

    #[test]
    fn rejects_other_files() {
        assert!(Attachment::from_path("notes.txt").is_none());
        assert!(Attachment::from_path("no_extension").is_none());
        assert!(Attachment::from_path("/").is_none());
    }
}
