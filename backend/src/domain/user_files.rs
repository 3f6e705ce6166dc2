//! Owner-scoped file records.
//!
//! Payloads travel as standard base64 on the wire. [`UploadRequest::decode`]
//! enforces the size ceiling on the encoded text before any decoding work is
//! done, so oversized requests are rejected cheaply.

use std::fmt;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::user::UserId;

/// Default ceiling on the base64-encoded payload, in bytes.
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;
/// Maximum file name length in characters.
pub const FILE_NAME_MAX: usize = 255;

/// Reasons an upload is rejected before reaching storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadValidationError {
    EmptyFileName,
    FileNameTooLong { max: usize },
    FileNameInvalidCharacters,
    EmptyFileData,
    TooLarge { max: usize },
    InvalidEncoding,
    EmptyPayload,
}

impl fmt::Display for UploadValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyFileName => write!(f, "file_name must not be empty"),
            Self::FileNameTooLong { max } => {
                write!(f, "file_name must be at most {max} characters")
            }
            Self::FileNameInvalidCharacters => write!(
                f,
                "file_name must not contain path separators or control characters"
            ),
            Self::EmptyFileData => write!(f, "file_data must not be empty"),
            Self::TooLarge { max } => write!(f, "file_data exceeds {max} encoded bytes"),
            Self::InvalidEncoding => write!(f, "invalid file data encoding"),
            Self::EmptyPayload => write!(f, "decoded file data must not be empty"),
        }
    }
}

impl std::error::Error for UploadValidationError {}

/// Identifier of a stored file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FileId(Uuid);

impl FileId {
    /// Wrap a UUID produced by persistence.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Generate a new random identifier.
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Access the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for FileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Client supplied file name, stored verbatim apart from trimming.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileName(String);

impl FileName {
    /// Validate a file name.
    pub fn new(raw: impl AsRef<str>) -> Result<Self, UploadValidationError> {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() {
            return Err(UploadValidationError::EmptyFileName);
        }
        if trimmed.chars().count() > FILE_NAME_MAX {
            return Err(UploadValidationError::FileNameTooLong { max: FILE_NAME_MAX });
        }
        if trimmed
            .chars()
            .any(|c| c == '/' || c == '\\' || c.is_control())
        {
            return Err(UploadValidationError::FileNameInvalidCharacters);
        }
        Ok(Self(trimmed.to_owned()))
    }
}

impl AsRef<str> for FileName {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

/// Decoded, non-empty file contents.
#[derive(Clone, PartialEq, Eq)]
pub struct FilePayload(Vec<u8>);

impl FilePayload {
    /// Wrap raw bytes read back from storage.
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    /// Borrow the raw bytes.
    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_slice()
    }

    /// Standard base64 rendering for the wire.
    pub fn to_base64(&self) -> String {
        STANDARD.encode(&self.0)
    }

    /// Payload size in bytes.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the payload holds no bytes.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for FilePayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FilePayload(<{} bytes>)", self.0.len())
    }
}

/// Ceiling applied to uploads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UploadLimits {
    max_encoded_bytes: usize,
}

impl UploadLimits {
    /// Limit uploads to `max_encoded_bytes` of base64 text.
    pub fn new(max_encoded_bytes: usize) -> Self {
        Self { max_encoded_bytes }
    }

    /// Ceiling on the encoded payload.
    pub fn max_encoded_bytes(&self) -> usize {
        self.max_encoded_bytes
    }
}

impl Default for UploadLimits {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_UPLOAD_BYTES)
    }
}

/// Validated upload ready for the file service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadRequest {
    file_name: FileName,
    payload: FilePayload,
}

impl UploadRequest {
    /// Validate the name, check the encoded size and decode the payload.
    ///
    /// # Examples
    /// ```
    /// use filelocker::domain::{UploadLimits, UploadRequest};
    ///
    /// let upload = UploadRequest::decode("x.txt", "aGVsbG8=", UploadLimits::default()).unwrap();
    /// assert_eq!(upload.payload().as_bytes(), b"hello");
    /// ```
    pub fn decode(
        file_name: &str,
        encoded: &str,
        limits: UploadLimits,
    ) -> Result<Self, UploadValidationError> {
        let file_name = FileName::new(file_name)?;
        let encoded = encoded.trim();
        if encoded.is_empty() {
            return Err(UploadValidationError::EmptyFileData);
        }
        if encoded.len() > limits.max_encoded_bytes() {
            return Err(UploadValidationError::TooLarge {
                max: limits.max_encoded_bytes(),
            });
        }
        let bytes = STANDARD
            .decode(encoded)
            .map_err(|_| UploadValidationError::InvalidEncoding)?;
        if bytes.is_empty() {
            return Err(UploadValidationError::EmptyPayload);
        }
        Ok(Self {
            file_name,
            payload: FilePayload(bytes),
        })
    }

    /// Validated name.
    pub fn file_name(&self) -> &FileName {
        &self.file_name
    }

    /// Decoded payload.
    pub fn payload(&self) -> &FilePayload {
        &self.payload
    }

    /// Split into name and payload.
    pub fn into_parts(self) -> (FileName, FilePayload) {
        (self.file_name, self.payload)
    }
}

/// Stored file as returned to its owner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserFile {
    pub id: FileId,
    pub owner: UserId,
    pub file_name: FileName,
    pub payload: FilePayload,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    //! Regression coverage for upload validation.
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("", "aGVsbG8=", UploadValidationError::EmptyFileName)]
    #[case("   ", "aGVsbG8=", UploadValidationError::EmptyFileName)]
    #[case("../etc/passwd", "aGVsbG8=", UploadValidationError::FileNameInvalidCharacters)]
    #[case("dir\\file", "aGVsbG8=", UploadValidationError::FileNameInvalidCharacters)]
    #[case("bad\u{0007}name", "aGVsbG8=", UploadValidationError::FileNameInvalidCharacters)]
    #[case("x.txt", "", UploadValidationError::EmptyFileData)]
    #[case("x.txt", "not base64!", UploadValidationError::InvalidEncoding)]
    #[case("x.txt", "aGVsbG8", UploadValidationError::InvalidEncoding)]
    fn decode_rejects_invalid_uploads(
        #[case] name: &str,
        #[case] data: &str,
        #[case] expected: UploadValidationError,
    ) {
        assert_eq!(
            UploadRequest::decode(name, data, UploadLimits::default()),
            Err(expected)
        );
    }

    #[rstest]
    fn decode_checks_size_before_decoding() {
        // Invalid base64 that is also too large must report the size problem.
        let oversized = "!".repeat(17);
        assert_eq!(
            UploadRequest::decode("x.txt", &oversized, UploadLimits::new(16)),
            Err(UploadValidationError::TooLarge { max: 16 })
        );
    }

    #[rstest]
    fn decode_accepts_payload_at_the_ceiling() {
        let upload = UploadRequest::decode("x.txt", "aGVsbG8=", UploadLimits::new(8))
            .expect("payload fits");
        assert_eq!(upload.payload().as_bytes(), b"hello");
    }

    #[rstest]
    fn file_name_length_is_bounded() {
        let name = "a".repeat(FILE_NAME_MAX + 1);
        assert_eq!(
            FileName::new(name),
            Err(UploadValidationError::FileNameTooLong { max: FILE_NAME_MAX })
        );
    }

    #[rstest]
    fn payload_round_trips_through_base64() {
        let payload = FilePayload::from_bytes(vec![0, 159, 146, 150]);
        let upload = UploadRequest::decode("bin", &payload.to_base64(), UploadLimits::default())
            .expect("valid payload");
        assert_eq!(upload.payload(), &payload);
    }
}
