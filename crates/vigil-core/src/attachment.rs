//! Attachments accompanying a submission and the media types we accept.

use bytes::Bytes;

/// Content types the file intake will store.
pub const ACCEPTED_MEDIA_TYPES: &[&str] = &[
  "image/jpeg",
  "image/png",
  "video/mp4",
  "video/quicktime",
  "video/x-msvideo",
];

/// An uploaded file as received from the transport, not yet stored.
#[derive(Debug, Clone)]
pub struct Upload {
  /// The client-side file name; only used to derive the storage name.
  pub original_name: String,
  /// The declared content type of the part, if any.
  pub content_type:  Option<String>,
  pub bytes:         Bytes,
}

impl Upload {
  pub fn new(original_name: impl Into<String>, content_type: Option<String>, bytes: Bytes) -> Self {
    Self { original_name: original_name.into(), content_type, bytes }
  }

  /// The canonical accepted media type of this upload, or `None` if it must
  /// be rejected.
  pub fn media_type(&self) -> Option<&'static str> {
    accepted_media_type(self.content_type.as_deref(), &self.original_name)
  }
}

/// Resolve the media type of a file from its declared type, falling back to
/// the file-name extension when the declaration is absent or generic.
///
/// `video/mov` and `video/avi` are accepted as aliases because some browsers
/// still send them.
pub fn accepted_media_type(declared: Option<&str>, file_name: &str) -> Option<&'static str> {
  let declared = declared
    .map(|d| d.split(';').next().unwrap_or(d).trim().to_ascii_lowercase())
    .filter(|d| !d.is_empty() && d != "application/octet-stream");

  match declared {
    Some(d) => canonical(&d),
    None => mime_guess::from_path(file_name)
      .iter()
      .find_map(|m| canonical(m.essence_str())),
  }
}

fn canonical(media_type: &str) -> Option<&'static str> {
  match media_type {
    "image/jpg" => Some("image/jpeg"),
    "video/mov" => Some("video/quicktime"),
    "video/avi" | "video/msvideo" => Some("video/x-msvideo"),
    other => ACCEPTED_MEDIA_TYPES.iter().copied().find(|t| *t == other),
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn declared_types_are_canonicalised() {
    assert_eq!(accepted_media_type(Some("image/png"), "a"), Some("image/png"));
    assert_eq!(accepted_media_type(Some("video/mov"), "a"), Some("video/quicktime"));
    assert_eq!(accepted_media_type(Some("video/avi"), "a"), Some("video/x-msvideo"));
    assert_eq!(accepted_media_type(Some("IMAGE/JPEG; q=1"), "a"), Some("image/jpeg"));
  }

  #[test]
  fn declared_type_wins_over_extension() {
    assert_eq!(accepted_media_type(Some("application/pdf"), "photo.png"), None);
    assert_eq!(accepted_media_type(Some("text/plain"), "clip.mp4"), None);
  }

  #[test]
  fn generic_or_missing_type_falls_back_to_extension() {
    assert_eq!(accepted_media_type(None, "clip.mp4"), Some("video/mp4"));
    assert_eq!(
      accepted_media_type(Some("application/octet-stream"), "shot.JPG"),
      Some("image/jpeg")
    );
    assert_eq!(accepted_media_type(None, "notes.txt"), None);
    assert_eq!(accepted_media_type(None, "no-extension"), None);
  }
}
