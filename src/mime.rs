//! MIME type registration for HEIC files
//!
//! Installing the descriptor lets the host's file-type database recognize
//! `.heic`/`.heif` files and route them to an image viewer.

use alloc::collections::BTreeMap;
use alloc::string::String;
use alloc::vec::Vec;

use crate::format::HEIC_MIME;

/// The alias removed alongside `image/heic` on uninstall
pub const HEIF_MIME: &str = "image/heif";

/// Everything the host records about one MIME type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MimeRegistration {
    /// MIME type string
    pub mime_type: String,
    /// One-line description
    pub short_description: String,
    /// Full description
    pub long_description: String,
    /// File extensions without the dot
    pub extensions: Vec<String>,
    /// Signature of the application that opens this type by default
    pub preferred_app: Option<String>,
}

impl MimeRegistration {
    /// Descriptor for `image/heic`
    #[must_use]
    pub fn heic() -> Self {
        Self {
            mime_type: HEIC_MIME.into(),
            short_description: "HEIC image".into(),
            long_description: "High-Efficiency Image File Format (HEIC)".into(),
            extensions: alloc::vec!["heic".into(), "heif".into()],
            preferred_app: Some("application/x-vnd.Haiku-ShowImage".into()),
        }
    }
}

/// Host file-type database
pub trait MimeDatabase {
    /// Error reported by the database
    type Error;

    /// Install or replace a registration
    fn install(&mut self, registration: MimeRegistration) -> core::result::Result<(), Self::Error>;

    /// Remove a MIME type. Removing an unknown type is not an error.
    fn delete(&mut self, mime_type: &str) -> core::result::Result<(), Self::Error>;
}

/// Install the HEIC descriptor.
///
/// # Errors
///
/// Whatever the database reports.
pub fn register_heic_mime<M: MimeDatabase + ?Sized>(db: &mut M) -> core::result::Result<(), M::Error> {
    log::debug!("mime: installing {HEIC_MIME}");
    db.install(MimeRegistration::heic())
}

/// Remove `image/heic` and `image/heif`.
///
/// # Errors
///
/// Whatever the database reports. Stops at the first failure.
pub fn unregister_heic_mime<M: MimeDatabase + ?Sized>(
    db: &mut M,
) -> core::result::Result<(), M::Error> {
    for mime_type in [HEIC_MIME, HEIF_MIME] {
        log::debug!("mime: deleting {mime_type}");
        db.delete(mime_type)?;
    }
    Ok(())
}

/// [`MimeDatabase`] kept in memory, keyed by MIME type
#[derive(Debug, Default, Clone)]
pub struct InMemoryMimeDatabase {
    entries: BTreeMap<String, MimeRegistration>,
}

impl InMemoryMimeDatabase {
    /// Empty database
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registration for `mime_type`
    #[must_use]
    pub fn get(&self, mime_type: &str) -> Option<&MimeRegistration> {
        self.entries.get(mime_type)
    }

    /// MIME type that claims the extension `ext` (case-insensitive, no dot)
    #[must_use]
    pub fn type_for_extension(&self, ext: &str) -> Option<&str> {
        self.entries
            .values()
            .find(|r| r.extensions.iter().any(|e| e.eq_ignore_ascii_case(ext)))
            .map(|r| r.mime_type.as_str())
    }

    /// Number of installed types
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing is installed
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl MimeDatabase for InMemoryMimeDatabase {
    type Error = core::convert::Infallible;

    fn install(&mut self, registration: MimeRegistration) -> core::result::Result<(), Self::Error> {
        self.entries
            .insert(registration.mime_type.clone(), registration);
        Ok(())
    }

    fn delete(&mut self, mime_type: &str) -> core::result::Result<(), Self::Error> {
        self.entries.remove(mime_type);
        Ok(())
    }
}
