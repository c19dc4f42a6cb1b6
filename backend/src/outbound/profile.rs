//! Filesystem profile image store.
//!
//! Keeps one image per user under a configurable root directory, named by
//! account id with the original file extension preserved. The extension also
//! decides the content type reported back on load.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::debug;

use crate::domain::User;
use crate::domain::ports::{ProfileImage, ProfileImageStore, ProfileStoreError};

/// Extensions accepted for profile uploads, with their content types.
const KNOWN_EXTENSIONS: &[(&str, &str)] = &[
    ("png", "image/png"),
    ("jpg", "image/jpeg"),
    ("jpeg", "image/jpeg"),
    ("gif", "image/gif"),
    ("webp", "image/webp"),
];

fn content_type_for(extension: &str) -> &'static str {
    KNOWN_EXTENSIONS
        .iter()
        .find(|(ext, _)| extension.eq_ignore_ascii_case(ext))
        .map_or("application/octet-stream", |(_, mime)| mime)
}

fn extension_of(file_name: &str) -> Option<&str> {
    Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
}

/// [`ProfileImageStore`] persisting images as `<root>/<user id>.<ext>`.
pub struct FsProfileImageStore {
    root: PathBuf,
}

impl FsProfileImageStore {
    /// Open a store rooted at `root`, creating the directory if needed.
    pub fn new(root: impl Into<PathBuf>) -> Result<Self, ProfileStoreError> {
        let root = root.into();
        std::fs::create_dir_all(&root)
            .map_err(|error| ProfileStoreError::io(error.to_string()))?;
        Ok(Self { root })
    }

    /// Find the stored image path for `user`, if one exists.
    fn find_stored(&self, user: &User) -> Result<Option<PathBuf>, ProfileStoreError> {
        for (ext, _) in KNOWN_EXTENSIONS {
            let candidate = self.root.join(format!("{}.{ext}", user.id));
            if candidate.is_file() {
                return Ok(Some(candidate));
            }
        }
        Ok(None)
    }
}

#[async_trait]
impl ProfileImageStore for FsProfileImageStore {
    async fn load(&self, user: &User) -> Result<ProfileImage, ProfileStoreError> {
        let path = self
            .find_stored(user)?
            .ok_or(ProfileStoreError::Missing)?;
        let data = std::fs::read(&path).map_err(|error| match error.kind() {
            ErrorKind::NotFound => ProfileStoreError::Missing,
            _ => ProfileStoreError::io(error.to_string()),
        })?;
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or_default();
        let file_name = path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or_default()
            .to_owned();
        Ok(ProfileImage {
            content_type: content_type_for(extension).to_owned(),
            file_name,
            data,
        })
    }

    async fn save(&self, user: &User, image: ProfileImage) -> Result<(), ProfileStoreError> {
        let extension = extension_of(&image.file_name)
            .ok_or_else(|| ProfileStoreError::io("파일 확장자가 없습니다"))?
            .to_ascii_lowercase();

        // Replace any previous image, including one with a different extension.
        if let Some(previous) = self.find_stored(user)? {
            std::fs::remove_file(&previous)
                .map_err(|error| ProfileStoreError::io(error.to_string()))?;
        }

        let path = self.root.join(format!("{}.{extension}", user.id));
        std::fs::write(&path, &image.data)
            .map_err(|error| ProfileStoreError::io(error.to_string()))?;
        debug!(user_id = user.id, path = %path.display(), "stored profile image");
        Ok(())
    }

    async fn delete(&self, user: &User) -> Result<(), ProfileStoreError> {
        let path = self
            .find_stored(user)?
            .ok_or(ProfileStoreError::Missing)?;
        std::fs::remove_file(&path).map_err(|error| match error.kind() {
            ErrorKind::NotFound => ProfileStoreError::Missing,
            _ => ProfileStoreError::io(error.to_string()),
        })
    }
}
