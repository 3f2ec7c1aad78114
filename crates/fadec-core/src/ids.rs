use core::fmt;
use core::num::NonZeroU8;

/// Cockpit engine number, 1-based like the host's variable names.
///
/// - `u8` is plenty for a four-engine aircraft
/// - `NonZero` keeps `Option<EngineId>` the same size and makes "engine 0"
///   unrepresentable
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EngineId(NonZeroU8);

impl EngineId {
    /// Engine number from its 1-based cockpit number.
    pub fn new(number: u8) -> Option<Self> {
        NonZeroU8::new(number).map(Self)
    }

    /// Engine id for a 0-based slot index. Returns `None` past engine 255.
    pub fn from_index(index: usize) -> Option<Self> {
        u8::try_from(index + 1).ok().and_then(Self::new)
    }

    /// 1-based cockpit number.
    pub fn number(self) -> u8 {
        self.0.get()
    }

    /// 0-based slot index.
    pub fn index(self) -> usize {
        usize::from(self.0.get()) - 1
    }
}

impl fmt::Debug for EngineId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EngineId({})", self.number())
    }
}

impl fmt::Display for EngineId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ENG{}", self.number())
    }
}
