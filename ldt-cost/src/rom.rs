//! Cost primitives of Merkle-tree commitments in the Random Oracle Model.

use arbitrary::Arbitrary;
use serde::Deserialize;
use serde::Serialize;

use crate::error::ProtocolError;

/// Models the random oracle, _i.e._, the hash function, and the Merkle trees
/// built from it.
///
/// All sizes are in bits.
#[derive(
    Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize, Arbitrary,
)]
#[cfg_attr(test, derive(test_strategy::Arbitrary))]
pub struct RomParameters {
    /// The output size of the hash function.
    #[cfg_attr(test, strategy(1_usize..=512))]
    pub hash_size_bits: usize,
}

impl Default for RomParameters {
    fn default() -> Self {
        Self::new(256)
    }
}

impl RomParameters {
    pub const fn new(hash_size_bits: usize) -> Self {
        Self { hash_size_bits }
    }

    /// The size of a Merkle root.
    pub const fn commitment_size(&self) -> usize {
        self.hash_size_bits
    }

    /// The total size of `num_queries` authentication paths in an unsalted,
    /// binary Merkle tree with `num_leaves` leafs.
    ///
    /// Queries are assumed to be co-located: `⌊log₂(num_queries)⌋` levels near
    /// the root are shared between them and need not be sent at all.
    ///
    /// The sibling leaf of each opened leaf is _not_ accounted for, since its
    /// size depends on the alphabet. Callers add it.
    ///
    /// # Errors
    ///
    /// If there are no leafs or no queries, the logarithms are undefined.
    pub fn authentication_path_size(
        &self,
        num_leaves: usize,
        num_queries: usize,
    ) -> Result<usize, ProtocolError> {
        if num_leaves == 0 {
            return Err(ProtocolError::UndefinedLogarithm("Merkle tree without leafs"));
        }
        if num_queries == 0 {
            return Err(ProtocolError::UndefinedLogarithm("Merkle tree without queries"));
        }

        let shared_depth = num_queries.ilog2();
        let full_depth = num_leaves.next_power_of_two().ilog2();
        let tree_depth = full_depth.saturating_sub(shared_depth + 1);

        Ok(num_queries * tree_depth as usize * self.hash_size_bits)
    }
}
