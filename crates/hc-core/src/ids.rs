use core::fmt;
use core::num::NonZeroU32;

/// Compact identifier for the objects a host simulation hands out.
///
/// - `u32` keeps controller bindings small
/// - `NonZero` lets `Option<Id>` share the same layout
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Id(NonZeroU32);

impl Id {
    /// Create an Id from a 0-based index by storing index+1.
    pub fn from_index(index: u32) -> Self {
        Self(NonZeroU32::MIN.saturating_add(index))
    }

    /// Recover the 0-based index.
    pub fn index(self) -> u32 {
        self.0.get() - 1
    }

    /// The 0-based index as a slot into host storage.
    pub fn slot(self) -> usize {
        self.index() as usize
    }
}

impl fmt::Debug for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Id({})", self.index())
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.index())
    }
}

/// Domain-specific ID aliases (no runtime cost).
pub type CompartmentId = Id;
pub type ConductanceId = Id;
pub type SynapseId = Id;
/// Identifies a mechanism (controller) registered with a compartment.
pub type MechanismId = Id;
