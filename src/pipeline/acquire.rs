//! Input acquisition: read the user-supplied file as the right kind of
//! payload.
//!
//! Two acquisition strategies exist. The canonical one reads a photo or
//! scan and hands the bytes to the recognition service. The alternate one
//! covers users who already have OCR output in a text file: its bytes are
//! decoded as UTF-8 (lossily, so a stray mojibake byte never aborts the
//! run) and skip the recognition stage entirely.
//!
//! Image payloads are validated by magic bytes before any network call —
//! posting a Word document to the Vision API produces a confusing remote
//! error, while a local check produces an actionable one.

use crate::config::InputKind;
use crate::error::Ink2TextError;
use std::path::PathBuf;
use tracing::debug;

/// The acquired input payload, ready for the matching pipeline entry.
#[derive(Debug)]
pub enum AcquiredInput {
    /// Validated image bytes for the recognition stage.
    Image(Vec<u8>),
    /// Text that already went through OCR elsewhere; recognition is skipped.
    PreRecognized(String),
}

/// Read and validate the input file according to `kind`.
pub fn resolve_input(path_str: &str, kind: InputKind) -> Result<AcquiredInput, Ink2TextError> {
    let path = PathBuf::from(path_str);

    let bytes = match std::fs::read(&path) {
        Ok(b) => b,
        Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
            return Err(Ink2TextError::PermissionDenied { path });
        }
        Err(_) => {
            return Err(Ink2TextError::FileNotFound { path });
        }
    };

    match kind {
        InputKind::Image => {
            if !is_supported_image(&bytes) {
                let mut magic = [0u8; 4];
                for (slot, byte) in magic.iter_mut().zip(bytes.iter()) {
                    *slot = *byte;
                }
                return Err(Ink2TextError::UnsupportedImage { path, magic });
            }
            debug!("Resolved image input: {} ({} bytes)", path.display(), bytes.len());
            Ok(AcquiredInput::Image(bytes))
        }
        InputKind::PreRecognizedText => {
            let text = String::from_utf8_lossy(&bytes).into_owned();
            debug!(
                "Resolved pre-recognized text input: {} ({} chars)",
                path.display(),
                text.len()
            );
            Ok(AcquiredInput::PreRecognized(text))
        }
    }
}

/// Check the magic bytes for the formats the recognition service accepts
/// here: PNG, JPEG, WEBP.
fn is_supported_image(bytes: &[u8]) -> bool {
    if bytes.len() < 12 {
        return false;
    }
    // PNG: \x89PNG
    if bytes.starts_with(&[0x89, b'P', b'N', b'G']) {
        return true;
    }
    // JPEG: FF D8 FF
    if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
        return true;
    }
    // WEBP: RIFF....WEBP
    bytes.starts_with(b"RIFF") && &bytes[8..12] == b"WEBP"
}
