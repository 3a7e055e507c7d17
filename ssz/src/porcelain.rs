use ethereum_types::H256;

/// Types with a Merkle root of their own.
///
/// Collections of such types are merkleized from the roots of their elements.
pub trait SszHash {
    fn hash_tree_root(&self) -> H256;
}

impl<T: SszHash + ?Sized> SszHash for &T {
    #[inline]
    fn hash_tree_root(&self) -> H256 {
        (*self).hash_tree_root()
    }
}

#[inline]
#[must_use]
pub fn element_root(element: &impl SszHash) -> H256 {
    element.hash_tree_root()
}

#[must_use]
pub fn element_roots<T: SszHash>(elements: impl IntoIterator<Item = T>) -> Vec<H256> {
    elements
        .into_iter()
        .map(|element| element.hash_tree_root())
        .collect()
}
