//! Descriptor for a file accepted into the upload content root.

use serde::Serialize;

/// Metadata of one stored upload, as echoed back to the client.
///
/// `filename` is the storage name: unique within the content root and the
/// only identifier later requests (serve, delete) may use. `originalname` is
/// the untrusted client filename, kept for diagnostics and display.
#[derive(Serialize, Clone, Debug)]
pub struct StoredFile {
    /// Storage name under the content root.
    pub filename: String,

    /// Client-supplied filename, angle brackets stripped.
    pub originalname: String,

    /// Size in bytes as written to disk.
    pub size: u64,

    /// Path of the stored file relative to the working directory.
    pub path: String,

    /// Public URL the file is served under.
    pub url: String,
}
