//! Chunk identity: the seed-derived tag handed to the content generator in
//! place of the raw asset path.

use std::fmt::{Display, Formatter};

use crate::math::hash;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeType {
    Corridor,
    Junction,
    DeadEnd,
    Shaft,
    Room,
}

impl NodeType {
    /// Classify an asset path by case-insensitive substring, first match wins.
    pub fn classify(asset_path: &str) -> Self {
        let lowered = asset_path.to_ascii_lowercase();
        [
            ("corridor", Self::Corridor),
            ("junction", Self::Junction),
            ("deadend", Self::DeadEnd),
            ("shaft", Self::Shaft),
        ]
        .into_iter()
        .find(|(needle, _)| lowered.contains(needle))
        .map_or(Self::Room, |(_, node)| node)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Corridor => "corridor",
            Self::Junction => "junction",
            Self::DeadEnd => "deadend",
            Self::Shaft => "shaft",
            Self::Room => "room",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ChunkIdentity {
    pub node_type: NodeType,
    pub variant: u32,
    pub node_id: u32,
}

impl ChunkIdentity {
    pub fn derive(asset_path: &str, seed: u32) -> Self {
        Self {
            node_type: NodeType::classify(asset_path),
            variant: hash(seed, 17, 29) & 3,
            node_id: hash(seed, 41, 53) & 0x7FFF,
        }
    }

    /// `chunk/{type}/v{variant}`
    pub fn tag(&self) -> String {
        format!("chunk/{}/v{}", self.node_type.as_str(), self.variant)
    }
}

impl Display for ChunkIdentity {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}#{}", self.tag(), self.node_id)
    }
}
