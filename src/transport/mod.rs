//! Two-tier messaging over the shared radio.
//!
//! ```text
//!   Node ──▶ Link (broadcast | reliable unicast) ──▶ Radio ──▶ Link ──▶ Node
//! ```
//!
//! - [`wire`] — message set and its byte encoding
//! - [`link`] — per-node endpoint: best-effort broadcast, single-slot
//!   reliable send with bounded retransmission, radio-level ACKs
//! - [`radio`] — the lossy medium connecting every link

pub mod link;
pub mod radio;
pub mod wire;

use core::fmt;

use serde::{Deserialize, Serialize};

/// Identity of a station on the radio.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeId {
    Central,
    Gate,
    Door,
    Kitchen,
    Bathroom,
}

impl NodeId {
    pub const ALL: [Self; 5] = [
        Self::Central,
        Self::Gate,
        Self::Door,
        Self::Kitchen,
        Self::Bathroom,
    ];

    /// Two-byte link-layer address.
    pub const fn address(self) -> [u8; 2] {
        match self {
            Self::Door => [1, 0],
            Self::Gate => [2, 0],
            Self::Central => [3, 0],
            Self::Kitchen => [4, 0],
            Self::Bathroom => [5, 0],
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Central => "central",
            Self::Gate => "gate",
            Self::Door => "door",
            Self::Kitchen => "kitchen",
            Self::Bathroom => "bathroom",
        }
    }

    /// Parse an operator-facing node name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|id| id.name().eq_ignore_ascii_case(name))
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [hi, lo] = self.address();
        write!(f, "{}({}.{})", self.name(), hi, lo)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn addresses_are_unique() {
        for a in NodeId::ALL {
            for b in NodeId::ALL {
                assert_eq!(a == b, a.address() == b.address());
            }
        }
    }

    #[test]
    fn names_parse_back() {
        for id in NodeId::ALL {
            assert_eq!(NodeId::from_name(id.name()), Some(id));
        }
        assert_eq!(NodeId::from_name("GATE"), Some(NodeId::Gate));
        assert_eq!(NodeId::from_name("garage"), None);
    }
}
