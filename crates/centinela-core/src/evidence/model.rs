//! Evidence keys and the closed evidence flag set.

use std::str::FromStr;

use serde::ser::{Serialize, SerializeMap, Serializer};
use strum::{EnumCount, EnumIter, EnumString, IntoEnumIterator};

use crate::error::{CentinelaError, Result};

/// One of the fixed alert indicators describing a suspicious trait of a work.
///
/// Parsing accepts the wire name (`estilo_diferente`) and the English name
/// (`style_mismatch`); see [`EvidenceKey::parse`] for input normalisation.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, EnumIter, EnumCount, EnumString,
)]
#[strum(ascii_case_insensitive)]
pub enum EvidenceKey {
    #[strum(serialize = "estilo_diferente", serialize = "style_mismatch")]
    StyleMismatch = 0,
    #[strum(serialize = "tiempo_sospechoso", serialize = "suspicious_timing")]
    SuspiciousTiming = 1,
    #[strum(serialize = "referencias_raras", serialize = "irregular_references")]
    IrregularReferences = 2,
    #[strum(serialize = "datos_inconsistentes", serialize = "inconsistent_data")]
    InconsistentData = 3,
    #[strum(serialize = "imagenes_sospechosas", serialize = "suspicious_images")]
    SuspiciousImages = 4,
    #[strum(serialize = "sin_borradores", serialize = "missing_drafts")]
    MissingDrafts = 5,
    #[strum(serialize = "defensa_debil", serialize = "weak_defense")]
    WeakDefense = 6,
}

impl EvidenceKey {
    /// Name used in request bodies.
    pub fn wire_name(self) -> &'static str {
        match self {
            Self::StyleMismatch => "estilo_diferente",
            Self::SuspiciousTiming => "tiempo_sospechoso",
            Self::IrregularReferences => "referencias_raras",
            Self::InconsistentData => "datos_inconsistentes",
            Self::SuspiciousImages => "imagenes_sospechosas",
            Self::MissingDrafts => "sin_borradores",
            Self::WeakDefense => "defensa_debil",
        }
    }

    /// Human-readable label.
    pub fn label(self) -> &'static str {
        match self {
            Self::StyleMismatch => "style mismatch",
            Self::SuspiciousTiming => "suspicious timing",
            Self::IrregularReferences => "irregular references",
            Self::InconsistentData => "inconsistent data",
            Self::SuspiciousImages => "suspicious images",
            Self::MissingDrafts => "missing drafts",
            Self::WeakDefense => "weak defense",
        }
    }

    /// Parses operator input. Spaces and hyphens are treated as underscores,
    /// so `"style-mismatch"`, `"style mismatch"` and `"estilo_diferente"` all
    /// resolve. Unknown names are a validation error.
    pub fn parse(input: &str) -> Result<Self> {
        let normalized = input.trim().replace([' ', '-'], "_");
        Self::from_str(&normalized)
            .map_err(|_| CentinelaError::validation(format!("Unknown evidence key: '{input}'")))
    }

    fn index(self) -> usize {
        self as usize
    }
}

/// Presence flags for every [`EvidenceKey`].
///
/// The key set is closed: the backing array has exactly one slot per key, so
/// keys can only be toggled, never added or removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct EvidenceSet {
    flags: [bool; EvidenceKey::COUNT],
}

impl EvidenceSet {
    /// Creates a set with every key absent.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_present(&self, key: EvidenceKey) -> bool {
        self.flags[key.index()]
    }

    pub fn set(&mut self, key: EvidenceKey, present: bool) {
        self.flags[key.index()] = present;
    }

    /// Flips exactly the named key.
    pub fn toggle(&mut self, key: EvidenceKey) {
        let slot = &mut self.flags[key.index()];
        *slot = !*slot;
    }

    /// Iterates over all keys in declaration order with their flags.
    pub fn iter(&self) -> impl Iterator<Item = (EvidenceKey, bool)> + '_ {
        EvidenceKey::iter().map(move |key| (key, self.is_present(key)))
    }

    pub fn present_count(&self) -> usize {
        self.flags.iter().filter(|flag| **flag).count()
    }
}

/// Serialises as `{ "<wire_name>": 0 | 1, ... }`, the shape the analysis
/// service expects.
impl Serialize for EvidenceSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(EvidenceKey::COUNT))?;
        for (key, present) in self.iter() {
            map.serialize_entry(key.wire_name(), &u8::from(present))?;
        }
        map.end()
    }
}
