//! Layout versions and the features they enable
//!
//! A layout version is a negative integer that decreases every time the
//! on-disk format changes. A stream declares its version in the header and
//! that version decides which opcodes exist and which fields each opcode
//! carries. Writers always stamp [`LayoutVersion::CURRENT`].

use crate::error::{Error, Result};
use std::fmt;

/// Format-revision tag carried in every stream header
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LayoutVersion(i32);

impl LayoutVersion {
    /// Version stamped by every writer
    pub const CURRENT: LayoutVersion = LayoutVersion(-66);

    /// Oldest version the codecs can decode
    pub const MINIMUM_SUPPORTED: LayoutVersion = LayoutVersion(-60);

    /// Wrap a raw version without validation
    pub const fn new(raw: i32) -> Self {
        LayoutVersion(raw)
    }

    /// Wrap a raw version, rejecting anything outside the supported range
    pub fn supported(raw: i32) -> Result<Self> {
        let version = LayoutVersion(raw);
        if version.is_supported() {
            Ok(version)
        } else {
            Err(Error::UnsupportedLayoutVersion { version: raw })
        }
    }

    /// Raw integer value
    pub fn get(&self) -> i32 {
        self.0
    }

    /// Whether the codecs can decode streams of this version
    pub fn is_supported(&self) -> bool {
        self.0 <= Self::MINIMUM_SUPPORTED.0 && self.0 >= Self::CURRENT.0
    }

    /// Whether streams of this version carry `feature`
    ///
    /// Versions grow more negative, so a feature introduced at -64 is
    /// present in -64, -65 and -66.
    pub fn supports(&self, feature: LayoutFeature) -> bool {
        self.0 <= feature.version().0
    }
}

impl Default for LayoutVersion {
    fn default() -> Self {
        Self::CURRENT
    }
}

impl fmt::Display for LayoutVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Format changes introduced after the oldest supported version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LayoutFeature {
    /// `OP_TRUNCATE`
    Truncate,
    /// `OP_APPEND`
    AppendNewBlock,
    /// `OP_SET_QUOTA_BY_STORAGETYPE`
    QuotaByStorageType,
    /// Erasure coding policy opcodes and the policy id on add/close
    ErasureCoding,
    /// Modification time on snapshot create/delete/rename
    SnapshotModificationTime,
}

impl LayoutFeature {
    /// Version that introduced this feature
    pub fn version(&self) -> LayoutVersion {
        match self {
            LayoutFeature::Truncate => LayoutVersion(-61),
            LayoutFeature::AppendNewBlock => LayoutVersion(-62),
            LayoutFeature::QuotaByStorageType => LayoutVersion(-63),
            LayoutFeature::ErasureCoding => LayoutVersion(-64),
            LayoutFeature::SnapshotModificationTime => LayoutVersion(-66),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_supported_range() {
        assert!(LayoutVersion::CURRENT.is_supported());
        assert!(LayoutVersion::MINIMUM_SUPPORTED.is_supported());
        assert!(LayoutVersion::new(-63).is_supported());
        assert!(!LayoutVersion::new(-59).is_supported());
        assert!(!LayoutVersion::new(-67).is_supported());
        assert!(!LayoutVersion::new(1).is_supported());
    }

    #[test]
    fn test_supported_constructor() {
        assert_eq!(LayoutVersion::supported(-66).unwrap(), LayoutVersion::CURRENT);
        assert!(matches!(
            LayoutVersion::supported(12),
            Err(Error::UnsupportedLayoutVersion { version: 12 })
        ));
    }

    #[test]
    fn test_feature_gating() {
        let v60 = LayoutVersion::new(-60);
        let v64 = LayoutVersion::new(-64);

        assert!(!v60.supports(LayoutFeature::Truncate));
        assert!(v64.supports(LayoutFeature::Truncate));
        assert!(v64.supports(LayoutFeature::ErasureCoding));
        assert!(!v64.supports(LayoutFeature::SnapshotModificationTime));
        assert!(LayoutVersion::CURRENT.supports(LayoutFeature::SnapshotModificationTime));
    }
}
