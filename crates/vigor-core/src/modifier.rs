//! Modifier definitions
//!
//! A modifier is one additive contribution to a stat's derived value,
//! tagged with a combination kind, an ordering key, and an optional source
//! identity used for bulk removal.

use crate::{SourceId, VigorError, VigorResult};

/// How a modifier folds into the derived value
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum ModifierKind {
    /// Flat addition to the base value, applied first
    #[default]
    Flat = 0x00,

    /// Fraction of the base value, summed and added after the flat pass
    PercentAdd = 0x01,

    /// Fraction of the running total, summed and multiplied in last
    PercentMult = 0x02,
}

impl ModifierKind {
    /// Parse from a stored byte
    ///
    /// The kind set is closed; anything outside it is a configuration
    /// error, not a degenerate no-op.
    pub fn from_byte(b: u8) -> VigorResult<Self> {
        match b {
            0x00 => Ok(ModifierKind::Flat),
            0x01 => Ok(ModifierKind::PercentAdd),
            0x02 => Ok(ModifierKind::PercentMult),
            _ => Err(VigorError::UnknownModifierKind(b)),
        }
    }

    #[inline]
    pub fn to_byte(self) -> u8 {
        self as u8
    }

    /// All kinds, in application order
    pub fn all() -> &'static [ModifierKind] {
        &[
            ModifierKind::Flat,
            ModifierKind::PercentAdd,
            ModifierKind::PercentMult,
        ]
    }
}

/// One additive contribution to a stat's derived value.
///
/// Modifiers are immutable value records. Equality over all four fields
/// drives removal and membership tests, so a modifier that could mutate
/// after insertion would silently stale the owning stat's cache.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct Modifier {
    value: f64,
    kind: ModifierKind,
    order: i32,
    source: Option<SourceId>,
}

impl Modifier {
    /// Create a modifier with default ordering and no source
    pub fn new(value: f64, kind: ModifierKind) -> Self {
        Modifier {
            value,
            kind,
            order: 0,
            source: None,
        }
    }

    /// Flat additive modifier
    #[inline]
    pub fn flat(value: f64) -> Self {
        Modifier::new(value, ModifierKind::Flat)
    }

    /// Additive fraction of the base value (0.5 reads as +50% of base)
    #[inline]
    pub fn percent_add(value: f64) -> Self {
        Modifier::new(value, ModifierKind::PercentAdd)
    }

    /// Multiplicative fraction applied after both additive passes
    #[inline]
    pub fn percent_mult(value: f64) -> Self {
        Modifier::new(value, ModifierKind::PercentMult)
    }

    /// Set the ordering key (ascending; ties are unordered)
    ///
    /// The combination formula is commutative within each kind, so the key
    /// only matters to callers that want reproducible iteration.
    pub fn with_order(mut self, order: i32) -> Self {
        self.order = order;
        self
    }

    /// Tag with the identity that granted this modifier
    pub fn with_source(mut self, source: SourceId) -> Self {
        self.source = Some(source);
        self
    }

    #[inline]
    pub fn value(&self) -> f64 {
        self.value
    }

    #[inline]
    pub fn kind(&self) -> ModifierKind {
        self.kind
    }

    #[inline]
    pub fn order(&self) -> i32 {
        self.order
    }

    #[inline]
    pub fn source(&self) -> Option<SourceId> {
        self.source
    }

    /// The contribution fed into this modifier's kind accumulator.
    ///
    /// The base value is reserved for kinds that scale with it; the three
    /// current kinds contribute their raw value.
    #[inline]
    pub fn resolve(&self, _base_value: f64) -> f64 {
        self.value
    }
}
