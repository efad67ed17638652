//! Attachment slots and their reconciliation into multipart parts.
//!
//! # Stored asset names
//!
//! Upload storage names files `<uuid>_<original>`, where `<uuid>` is the
//! hyphenated 8-4-4-4-12 hex form (either case) and `<original>` is non-empty.
//! Any other name is its own original name.
//!
//! # Failure policy
//!
//! An existing asset that cannot be downloaded is left out of the submission
//! and reported as a [`Warning::AttachmentDropped`]; the rest of the submission
//! goes ahead.

use std::borrow::Cow;

use futures_util::future::join_all;
use url::Url;
use uuid::Uuid;

use crate::error::Warning;
use crate::transport::{BinaryPart, Transport};

/// Multipart field for the single avatar image.
pub const AVATAR_FIELD: &str = "avatar";
/// Multipart field for gallery images (repeated).
pub const GALLERY_FIELD: &str = "files";
/// MIME type used when the asset host reports none.
pub const DEFAULT_ASSET_MIME: &str = "image/jpeg";

const FALLBACK_FILENAME: &str = "attachment";
const HYPHENATED_UUID_LEN: usize = 36;

/// One attachment in an edit or create form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttachmentSlot {
    /// File chosen by the user in this session.
    NewBinary {
        /// Raw content.
        bytes: Vec<u8>,
        /// Filename as chosen.
        filename: String,
        /// MIME type of the content.
        mime_type: String,
    },
    /// Asset already held in upload storage.
    ExistingRemote {
        /// Absolute asset URL.
        url: String,
    },
}

impl AttachmentSlot {
    /// Existing asset at `url`.
    #[must_use]
    pub fn remote(url: impl Into<String>) -> Self {
        Self::ExistingRemote { url: url.into() }
    }
}

/// Avatar plus gallery slots of one submission.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttachmentSet {
    /// Optional avatar slot.
    pub avatar: Option<AttachmentSlot>,
    /// Gallery slots in display order.
    pub gallery: Vec<AttachmentSlot>,
}

impl AttachmentSet {
    /// Slot set for an edit form: every stored asset becomes an existing-remote slot.
    #[must_use]
    pub fn from_existing(avatar: Option<&str>, gallery: &[String]) -> Self {
        Self {
            avatar: avatar
                .filter(|url| !url.trim().is_empty())
                .map(AttachmentSlot::remote),
            gallery: gallery
                .iter()
                .filter(|url| !url.trim().is_empty())
                .map(|url| AttachmentSlot::remote(url.as_str()))
                .collect(),
        }
    }

    /// Whether the set holds no slots.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.avatar.is_none() && self.gallery.is_empty()
    }

    fn into_tagged(self) -> Vec<(&'static str, AttachmentSlot)> {
        self.avatar
            .into_iter()
            .map(|slot| (AVATAR_FIELD, slot))
            .chain(self.gallery.into_iter().map(|slot| (GALLERY_FIELD, slot)))
            .collect()
    }
}

/// Output of [`reconcile`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reconciled {
    /// Parts to submit: avatar first, then gallery, each in input order.
    pub parts: Vec<BinaryPart>,
    /// One entry per dropped slot.
    pub warnings: Vec<Warning>,
}

/// Original filename behind a stored asset name.
///
/// ```
/// use handset_sync::extract_original_name;
///
/// assert_eq!(
///     extract_original_name("a1b2c3d4-e5f6-47a8-b9c0-d1e2f3a4b5c6_photo.png"),
///     "photo.png"
/// );
/// assert_eq!(extract_original_name("photo.png"), "photo.png");
/// ```
#[must_use]
pub fn extract_original_name(stored: &str) -> &str {
    match stored.split_once('_') {
        Some((prefix, original)) if !original.is_empty() && is_hyphenated_uuid(prefix) => original,
        _ => stored,
    }
}

fn is_hyphenated_uuid(candidate: &str) -> bool {
    candidate.len() == HYPHENATED_UUID_LEN && Uuid::try_parse(candidate).is_ok()
}

/// Last path segment of an asset URL, percent-decoded.
///
/// Falls back to `attachment` when the URL has no usable segment.
#[must_use]
pub fn filename_from_url(url: &str) -> String {
    let segment = Url::parse(url).map_or_else(
        |_| {
            let path = url.split(['?', '#']).next().unwrap_or_default();
            path.rsplit('/').next().unwrap_or_default().to_string()
        },
        |parsed| {
            parsed
                .path_segments()
                .and_then(|mut segments| segments.next_back())
                .unwrap_or_default()
                .to_string()
        },
    );
    let decoded =
        urlencoding::decode(&segment).map_or_else(|_| segment.clone(), Cow::into_owned);
    if decoded.trim().is_empty() {
        FALLBACK_FILENAME.to_string()
    } else {
        decoded
    }
}

/// Turn attachment slots into binary parts, downloading existing assets.
///
/// Downloads run concurrently; output order follows input order.
pub async fn reconcile(set: AttachmentSet, transport: &dyn Transport) -> Reconciled {
    let resolved = join_all(
        set.into_tagged()
            .into_iter()
            .map(|(field, slot)| resolve_slot(field, slot, transport)),
    )
    .await;

    let mut reconciled = Reconciled::default();
    for outcome in resolved {
        match outcome {
            Ok(part) => reconciled.parts.push(part),
            Err(warning) => reconciled.warnings.push(warning),
        }
    }
    reconciled
}

async fn resolve_slot(
    field: &'static str,
    slot: AttachmentSlot,
    transport: &dyn Transport,
) -> Result<BinaryPart, Warning> {
    match slot {
        AttachmentSlot::NewBinary {
            bytes,
            filename,
            mime_type,
        } => Ok(BinaryPart {
            field: field.to_string(),
            filename,
            mime_type,
            bytes,
        }),
        AttachmentSlot::ExistingRemote { url } => {
            let stored = filename_from_url(&url);
            let filename = extract_original_name(&stored).to_string();
            match transport.fetch_asset(&url).await {
                Ok(asset) => {
                    tracing::debug!(field, %url, %filename, bytes = asset.bytes.len(), "re-submitting stored asset");
                    Ok(BinaryPart {
                        field: field.to_string(),
                        filename,
                        mime_type: asset
                            .mime_type
                            .filter(|mime| !mime.is_empty())
                            .unwrap_or_else(|| DEFAULT_ASSET_MIME.to_string()),
                        bytes: asset.bytes,
                    })
                }
                Err(err) => {
                    tracing::warn!(field, %url, error = %err, "dropping attachment that could not be downloaded");
                    Err(Warning::AttachmentDropped {
                        field: field.to_string(),
                        url,
                        cause: err.to_string(),
                    })
                }
            }
        }
    }
}
