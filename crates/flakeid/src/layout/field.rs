use core::fmt;

/// One of the four bit ranges packed into an identifier.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Field {
    Random,
    Time,
    Node,
    Sequence,
}

impl Field {
    /// All fields in declaration order.
    pub const ALL: [Self; 4] = [Self::Random, Self::Time, Self::Node, Self::Sequence];

    /// Position of this field in per-field tables.
    pub(crate) const fn index(self) -> usize {
        match self {
            Self::Random => 0,
            Self::Time => 1,
            Self::Node => 2,
            Self::Sequence => 3,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Random => "random",
            Self::Time => "time",
            Self::Node => "node",
            Self::Sequence => "sequence",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
