//! The `Block` entity and the `Blocks` registry.

use std::collections::HashMap;

use bytes::Bytes;

use crate::error::ValidationError;
use crate::id::{BlockId, ProjectId, StorageId, VaultId};

/// A content-addressed chunk of bytes, scoped to a `(project, vault)` pair.
///
/// Invariant: whenever `data` is present, `block_id` is the SHA-1 digest of
/// it. [`Block::from_data`] satisfies this by construction and
/// [`Block::set_data`] rejects bytes that would break it. A block created
/// from a listing carries no data until it is explicitly downloaded.
#[derive(Debug, Clone)]
pub struct Block {
    project_id: ProjectId,
    vault_id: VaultId,
    block_id: BlockId,
    storage_id: Option<StorageId>,
    data: Option<Bytes>,
    ref_count: Option<u64>,
    ref_modified: Option<i64>,
}

impl Block {
    /// Create a block known only by id, with no data attached.
    pub fn new(project_id: ProjectId, vault_id: VaultId, block_id: BlockId) -> Self {
        Self {
            project_id,
            vault_id,
            block_id,
            storage_id: None,
            data: None,
            ref_count: None,
            ref_modified: None,
        }
    }

    /// Create a block from raw bytes, computing its id from the content.
    pub fn from_data(project_id: ProjectId, vault_id: VaultId, data: Bytes) -> Self {
        let block_id = BlockId::of(&data);
        Self {
            project_id,
            vault_id,
            block_id,
            storage_id: None,
            data: Some(data),
            ref_count: None,
            ref_modified: None,
        }
    }

    pub fn project_id(&self) -> &ProjectId {
        &self.project_id
    }

    pub fn vault_id(&self) -> &VaultId {
        &self.vault_id
    }

    pub fn block_id(&self) -> &BlockId {
        &self.block_id
    }

    pub fn storage_id(&self) -> Option<&StorageId> {
        self.storage_id.as_ref()
    }

    pub fn set_storage_id(&mut self, storage_id: StorageId) {
        self.storage_id = Some(storage_id);
    }

    pub fn data(&self) -> Option<&Bytes> {
        self.data.as_ref()
    }

    /// Attach data to the block, verifying it hashes to the block's id.
    ///
    /// Rejecting a mismatch here keeps the content-address invariant intact
    /// even for bytes received from the server.
    pub fn set_data(&mut self, data: Bytes) -> Result<(), ValidationError> {
        let actual = BlockId::of(&data);
        if actual != self.block_id {
            return Err(ValidationError::DataDigestMismatch {
                expected: self.block_id,
                actual,
            });
        }
        self.data = Some(data);
        Ok(())
    }

    /// Server-reported reference count; opaque to the client.
    pub fn ref_count(&self) -> Option<u64> {
        self.ref_count
    }

    /// Server-reported reference modification time; opaque to the client.
    pub fn ref_modified(&self) -> Option<i64> {
        self.ref_modified
    }

    pub fn set_references(&mut self, ref_count: Option<u64>, ref_modified: Option<i64>) {
        self.ref_count = ref_count;
        self.ref_modified = ref_modified;
    }

    /// Length of the attached data in bytes; 0 when no data is attached.
    pub fn len(&self) -> usize {
        self.data.as_ref().map_or(0, |d| d.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Registry of blocks known to a vault or a file, keyed by block id.
///
/// Reinserting an id replaces the stored block; this is how metadata gets
/// refreshed from a listing call. Membership tests are O(1) expected, and
/// there is no ordering over the registry itself (a file's ordering lives
/// in its offset map).
#[derive(Debug, Clone)]
pub struct Blocks {
    project_id: ProjectId,
    vault_id: VaultId,
    inner: HashMap<BlockId, Block>,
}

impl Blocks {
    pub fn new(project_id: ProjectId, vault_id: VaultId) -> Self {
        Self {
            project_id,
            vault_id,
            inner: HashMap::new(),
        }
    }

    pub fn project_id(&self) -> &ProjectId {
        &self.project_id
    }

    pub fn vault_id(&self) -> &VaultId {
        &self.vault_id
    }

    /// Insert a block, replacing any previous entry for the same id.
    ///
    /// The block must carry the same `(project, vault)` scope as the
    /// registry; a block from another vault is rejected.
    pub fn insert(&mut self, block: Block) -> Result<Option<Block>, ValidationError> {
        if block.project_id() != &self.project_id || block.vault_id() != &self.vault_id {
            return Err(ValidationError::ScopeMismatch {
                entity_scope: format!("{}/{}", block.project_id(), block.vault_id()),
                registry_scope: format!("{}/{}", self.project_id, self.vault_id),
            });
        }
        Ok(self.inner.insert(*block.block_id(), block))
    }

    pub fn get(&self, block_id: &BlockId) -> Option<&Block> {
        self.inner.get(block_id)
    }

    pub fn get_mut(&mut self, block_id: &BlockId) -> Option<&mut Block> {
        self.inner.get_mut(block_id)
    }

    pub fn contains(&self, block_id: &BlockId) -> bool {
        self.inner.contains_key(block_id)
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&BlockId, &Block)> {
        self.inner.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scope() -> (ProjectId, VaultId) {
        (
            ProjectId::new("project-x").unwrap(),
            VaultId::new("vault-a").unwrap(),
        )
    }

    #[test]
    fn test_from_data_id_matches_content() {
        let (p, v) = scope();
        let block = Block::from_data(p, v, Bytes::from_static(b"some content"));
        assert_eq!(*block.block_id(), BlockId::of(b"some content"));
        assert_eq!(block.len(), 12);
    }

    #[test]
    fn test_metadata_block_has_no_data() {
        let (p, v) = scope();
        let block = Block::new(p, v, BlockId::of(b"elsewhere"));
        assert!(block.data().is_none());
        assert_eq!(block.len(), 0);
        assert!(block.is_empty());
    }

    #[test]
    fn test_set_data_accepts_matching_bytes() {
        let (p, v) = scope();
        let mut block = Block::new(p, v, BlockId::of(b"payload"));
        block.set_data(Bytes::from_static(b"payload")).unwrap();
        assert_eq!(block.len(), 7);
    }

    #[test]
    fn test_set_data_rejects_mismatched_bytes() {
        let (p, v) = scope();
        let mut block = Block::new(p, v, BlockId::of(b"payload"));
        let err = block
            .set_data(Bytes::from_static(b"tampered"))
            .unwrap_err();
        assert!(matches!(err, ValidationError::DataDigestMismatch { .. }));
        assert!(block.data().is_none());
    }

    #[test]
    fn test_registry_replaces_on_reinsert() {
        let (p, v) = scope();
        let mut blocks = Blocks::new(p.clone(), v.clone());

        let bare = Block::new(p.clone(), v.clone(), BlockId::of(b"abc"));
        assert!(blocks.insert(bare).unwrap().is_none());
        assert_eq!(blocks.get(&BlockId::of(b"abc")).unwrap().len(), 0);

        // refresh with a data-carrying block under the same id
        let full = Block::from_data(p, v, Bytes::from_static(b"abc"));
        let old = blocks.insert(full).unwrap();
        assert!(old.is_some());
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks.get(&BlockId::of(b"abc")).unwrap().len(), 3);
    }

    #[test]
    fn test_registry_rejects_foreign_scope() {
        let (p, v) = scope();
        let mut blocks = Blocks::new(p.clone(), v);

        let other_vault = VaultId::new("vault-b").unwrap();
        let foreign = Block::from_data(p, other_vault, Bytes::from_static(b"x"));
        let err = blocks.insert(foreign).unwrap_err();
        assert!(matches!(err, ValidationError::ScopeMismatch { .. }));
        assert!(blocks.is_empty());
    }
}
