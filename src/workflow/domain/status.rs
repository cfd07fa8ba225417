//! Application status values and their display mapping.

use super::ParseStatusError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Status of a loan application within the origination workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationStatus {
    /// Submitted by data entry and waiting for credit administration.
    Diajukan,
    /// Under credit-administration review.
    Diperiksa,
    /// Under credit analysis.
    Dianalisis,
    /// Ready for the decision maker.
    SiapDiputuskan,
    /// Approved. Terminal.
    Disetujui,
    /// Rejected. Terminal.
    Ditolak,
    /// Returned to data entry for correction.
    Dikembalikan,
}

impl ApplicationStatus {
    /// Every status value.
    pub const ALL: [Self; 7] = [
        Self::Diajukan,
        Self::Diperiksa,
        Self::Dianalisis,
        Self::SiapDiputuskan,
        Self::Disetujui,
        Self::Ditolak,
        Self::Dikembalikan,
    ];

    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Diajukan => "diajukan",
            Self::Diperiksa => "diperiksa",
            Self::Dianalisis => "dianalisis",
            Self::SiapDiputuskan => "siap_diputuskan",
            Self::Disetujui => "disetujui",
            Self::Ditolak => "ditolak",
            Self::Dikembalikan => "dikembalikan",
        }
    }

    /// Returns the display label rendered by collaborators.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Diajukan => "Diajukan",
            Self::Diperiksa => "Diperiksa",
            Self::Dianalisis => "Dianalisis",
            Self::SiapDiputuskan => "Siap Diputuskan",
            Self::Disetujui => "Disetujui",
            Self::Ditolak => "Ditolak",
            Self::Dikembalikan => "Dikembalikan",
        }
    }

    /// Returns the badge tone used when rendering the status.
    #[must_use]
    pub const fn tone(self) -> StatusTone {
        match self {
            Self::Diajukan => StatusTone::Neutral,
            Self::Diperiksa | Self::Dianalisis | Self::SiapDiputuskan => StatusTone::Info,
            Self::Dikembalikan => StatusTone::Warning,
            Self::Disetujui => StatusTone::Success,
            Self::Ditolak => StatusTone::Danger,
        }
    }

    /// Returns `true` when no further transitions are permitted.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Disetujui | Self::Ditolak)
    }
}

impl fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for ApplicationStatus {
    type Error = ParseStatusError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == normalized)
            .ok_or_else(|| ParseStatusError(value.to_owned()))
    }
}

/// Visual tone for a status badge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusTone {
    /// Waiting, nothing happened yet.
    Neutral,
    /// In progress.
    Info,
    /// Needs attention from data entry.
    Warning,
    /// Finished successfully.
    Success,
    /// Finished unsuccessfully.
    Danger,
}
