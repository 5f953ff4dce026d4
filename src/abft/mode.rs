//! Protection mode selection

use std::str::FromStr;

use crate::error::Error;

/// Scheme used to protect the sparse matrix data
///
/// The mode is fixed for the lifetime of a matrix: it selects both the encode
/// pass applied at construction and the check run on every nonzero during
/// each SpMV.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[repr(u8)]
pub enum ProtectionMode {
    /// No protection
    #[default]
    None = 0,

    /// Structural index checks (bounds and sort order), no redundant bits
    Constraints = 1,

    /// Single error detection: one overall parity bit in column bit 31
    Sed = 2,

    /// Single error correction: 7 Hamming parity bits in column bits 25..=31
    ///
    /// A nonzero syndrome is always trusted as a single correctable error;
    /// with no independent parity bit, a multi-bit error can be mis-corrected.
    Sec7 = 3,

    /// 7 Hamming parity bits plus an overall parity bit in column bit 24
    Sec8 = 4,

    /// Single error correction, double error detection
    Secded = 5,
}

impl ProtectionMode {
    /// Every mode, in declaration order
    pub const ALL: [ProtectionMode; 6] = [
        ProtectionMode::None,
        ProtectionMode::Constraints,
        ProtectionMode::Sed,
        ProtectionMode::Sec7,
        ProtectionMode::Sec8,
        ProtectionMode::Secded,
    ];

    /// Returns the mode name as used on the command line and in the registry
    pub fn name(&self) -> &'static str {
        match self {
            ProtectionMode::None => "none",
            ProtectionMode::Constraints => "constraints",
            ProtectionMode::Sed => "sed",
            ProtectionMode::Sec7 => "sec7",
            ProtectionMode::Sec8 => "sec8",
            ProtectionMode::Secded => "secded",
        }
    }

    /// Returns true if the mode stores ECC metadata in the column field
    #[inline]
    pub fn is_ecc(&self) -> bool {
        matches!(
            self,
            ProtectionMode::Sed
                | ProtectionMode::Sec7
                | ProtectionMode::Sec8
                | ProtectionMode::Secded
        )
    }

    /// Returns true if the mode can repair single-bit errors
    #[inline]
    pub fn corrects(&self) -> bool {
        matches!(
            self,
            ProtectionMode::Sec7 | ProtectionMode::Sec8 | ProtectionMode::Secded
        )
    }

    /// Returns true if the mode validates index bounds and ordering
    #[inline]
    pub fn checks_constraints(&self) -> bool {
        self.kernel().check_constraints
    }
}

impl std::fmt::Display for ProtectionMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for ProtectionMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ProtectionMode::ALL
            .into_iter()
            .find(|mode| mode.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| Error::UnknownMode(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_parse() {
        assert_eq!("SECDED".parse::<ProtectionMode>().unwrap(), ProtectionMode::Secded);
        assert_eq!("sec7".parse::<ProtectionMode>().unwrap(), ProtectionMode::Sec7);
        assert_eq!("None".parse::<ProtectionMode>().unwrap(), ProtectionMode::None);
        assert!(matches!(
            "sec9".parse::<ProtectionMode>(),
            Err(Error::UnknownMode(name)) if name == "sec9"
        ));
    }

    #[test]
    fn test_mode_properties() {
        for mode in ProtectionMode::ALL {
            assert_eq!(mode.to_string().parse::<ProtectionMode>().unwrap(), mode);
        }
        assert!(!ProtectionMode::Constraints.is_ecc());
        assert!(ProtectionMode::Sed.is_ecc());
        assert!(!ProtectionMode::Sed.corrects());
        assert!(ProtectionMode::Sec7.corrects());
        assert!(ProtectionMode::Constraints.checks_constraints());
        assert!(!ProtectionMode::Secded.checks_constraints());
    }
}
