//! Upload/processing status of a trailer's video on the streaming
//! provider.

use serde::{Deserialize, Serialize};

/// Processing state of the remote video, as observed via the provider
/// or recorded by an import.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UploadStatus {
    Pending,
    Processing,
    Complete,
    Error,
}

impl UploadStatus {
    /// Return the status name as stored in the database.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Processing => "Processing",
            Self::Complete => "Complete",
            Self::Error => "Error",
        }
    }

    /// Parse a status string. Returns `None` for unknown values.
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "Pending" => Some(Self::Pending),
            "Processing" => Some(Self::Processing),
            "Complete" => Some(Self::Complete),
            "Error" => Some(Self::Error),
            _ => None,
        }
    }

    /// Normalize an externally observed status string, falling back to
    /// `Complete` for anything outside the four valid values. CSV
    /// sources routinely carry statuses like "uploaded" or "done".
    pub fn normalize(s: &str) -> Self {
        Self::from_str(s).unwrap_or(Self::Complete)
    }

    /// All valid status values.
    pub const ALL: &'static [&'static str] = &["Pending", "Processing", "Complete", "Error"];
}

impl std::fmt::Display for UploadStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip() {
        for s in UploadStatus::ALL {
            let status = UploadStatus::from_str(s).unwrap();
            assert_eq!(status.as_str(), *s);
        }
    }

    #[test]
    fn unknown_returns_none() {
        assert!(UploadStatus::from_str("uploaded").is_none());
        assert!(UploadStatus::from_str("pending").is_none()); // case-sensitive
    }

    #[test]
    fn normalize_falls_back_to_complete() {
        assert_eq!(UploadStatus::normalize("uploaded"), UploadStatus::Complete);
        assert_eq!(UploadStatus::normalize(""), UploadStatus::Complete);
        assert_eq!(UploadStatus::normalize("Pending"), UploadStatus::Pending);
    }

    #[test]
    fn display_matches_as_str() {
        assert_eq!(format!("{}", UploadStatus::Processing), "Processing");
    }

    #[test]
    fn all_has_four_entries() {
        assert_eq!(UploadStatus::ALL.len(), 4);
    }
}
