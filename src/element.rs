use std::fmt;
use std::str::FromStr;

/// The solid element topologies understood by this crate.
///
/// Each variant is named after its shape and node count; [`ElementKind::code`]
/// gives the element-type code used by analysis containers.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ElementKind {
    Tetra4,
    Pyramid5,
    Wedge6,
    Hexa8,
    Tetra10,
    Wedge15,
    Hexa20,
}

impl ElementKind {
    /// Looks up an element-type code, e.g. `"C3D4"`.
    ///
    /// Returns `None` for codes outside the supported set. Callers that read
    /// input data must treat that as fatal rather than skip the block.
    pub fn from_code(code: &str) -> Option<Self> {
        Some(match code {
            "C3D4" => ElementKind::Tetra4,
            "C3D5" => ElementKind::Pyramid5,
            "C3D6" => ElementKind::Wedge6,
            "C3D8" => ElementKind::Hexa8,
            "C3D10" => ElementKind::Tetra10,
            "C3D15" => ElementKind::Wedge15,
            "C3D20" => ElementKind::Hexa20,
            _ => return None,
        })
    }

    /// The element-type code this kind was read from.
    pub fn code(self) -> &'static str {
        match self {
            ElementKind::Tetra4 => "C3D4",
            ElementKind::Pyramid5 => "C3D5",
            ElementKind::Wedge6 => "C3D6",
            ElementKind::Hexa8 => "C3D8",
            ElementKind::Tetra10 => "C3D10",
            ElementKind::Wedge15 => "C3D15",
            ElementKind::Hexa20 => "C3D20",
        }
    }

    /// Number of nodes in one element's connectivity row.
    pub fn node_count(self) -> usize {
        match self {
            ElementKind::Tetra4 => 4,
            ElementKind::Pyramid5 => 5,
            ElementKind::Wedge6 => 6,
            ElementKind::Hexa8 => 8,
            ElementKind::Tetra10 => 10,
            ElementKind::Wedge15 => 15,
            ElementKind::Hexa20 => 20,
        }
    }
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Error returned by [`ElementKind`]'s [`FromStr`] implementation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnknownCode(pub String);

impl fmt::Display for UnknownCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown element-type code {:?}", self.0)
    }
}

impl std::error::Error for UnknownCode {}

impl FromStr for ElementKind {
    type Err = UnknownCode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ElementKind::from_code(s).ok_or_else(|| UnknownCode(s.to_owned()))
    }
}
