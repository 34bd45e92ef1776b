//! The `File` entity and the `Files` registry.

use std::collections::{BTreeMap, HashMap};

use crate::block::{Block, Blocks};
use crate::error::ValidationError;
use crate::id::{BlockId, FileId, ProjectId, VaultId};

/// A logical file on the remote service: an ordered sequence of block
/// references at byte offsets.
///
/// A file owns two parallel collections that must stay mutually consistent:
/// `blocks` (the set of blocks known to belong to the file) and `offsets`
/// (which block reconstructs which byte range). The offset map is a
/// `BTreeMap`, so iterating it always walks the file in byte order. The
/// consistency of the two maps is checked by
/// [`prepare_assignment`](crate::assignment::prepare_assignment) before a
/// commit is sent.
#[derive(Debug, Clone)]
pub struct File {
    project_id: ProjectId,
    vault_id: VaultId,
    file_id: FileId,
    url: Option<String>,
    blocks: Blocks,
    offsets: BTreeMap<u64, BlockId>,
}

impl File {
    /// Create a file mirror for a server-assigned id.
    ///
    /// `url` is the `location` header of the create-file response, when the
    /// file came from one.
    pub fn new(
        project_id: ProjectId,
        vault_id: VaultId,
        file_id: FileId,
        url: Option<String>,
    ) -> Self {
        let blocks = Blocks::new(project_id.clone(), vault_id.clone());
        Self {
            project_id,
            vault_id,
            file_id,
            url,
            blocks,
            offsets: BTreeMap::new(),
        }
    }

    pub fn project_id(&self) -> &ProjectId {
        &self.project_id
    }

    pub fn vault_id(&self) -> &VaultId {
        &self.vault_id
    }

    pub fn file_id(&self) -> &FileId {
        &self.file_id
    }

    pub fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }

    pub fn blocks(&self) -> &Blocks {
        &self.blocks
    }

    pub fn blocks_mut(&mut self) -> &mut Blocks {
        &mut self.blocks
    }

    /// Byte offset → block id, ordered by ascending offset.
    pub fn offsets(&self) -> &BTreeMap<u64, BlockId> {
        &self.offsets
    }

    /// Record that `block_id` reconstructs the byte range starting at
    /// `offset`. Reassigning an offset replaces the previous reference.
    pub fn assign_block(&mut self, offset: u64, block_id: BlockId) -> Option<BlockId> {
        self.offsets.insert(offset, block_id)
    }

    /// Add a block to the file's block set and assign it to `offset` in one
    /// step, keeping the two maps in lockstep for the common append path.
    pub fn add_block_at(&mut self, offset: u64, block: Block) -> Result<(), ValidationError> {
        let block_id = *block.block_id();
        self.blocks.insert(block)?;
        self.offsets.insert(offset, block_id);
        Ok(())
    }
}

/// Registry of files in a vault, keyed by file id. Same replace-on-reinsert
/// and scope rules as [`Blocks`].
#[derive(Debug, Clone)]
pub struct Files {
    project_id: ProjectId,
    vault_id: VaultId,
    inner: HashMap<FileId, File>,
}

impl Files {
    pub fn new(project_id: ProjectId, vault_id: VaultId) -> Self {
        Self {
            project_id,
            vault_id,
            inner: HashMap::new(),
        }
    }

    pub fn insert(&mut self, file: File) -> Result<Option<File>, ValidationError> {
        if file.project_id() != &self.project_id || file.vault_id() != &self.vault_id {
            return Err(ValidationError::ScopeMismatch {
                entity_scope: format!("{}/{}", file.project_id(), file.vault_id()),
                registry_scope: format!("{}/{}", self.project_id, self.vault_id),
            });
        }
        Ok(self.inner.insert(*file.file_id(), file))
    }

    pub fn get(&self, file_id: &FileId) -> Option<&File> {
        self.inner.get(file_id)
    }

    pub fn get_mut(&mut self, file_id: &FileId) -> Option<&mut File> {
        self.inner.get_mut(file_id)
    }

    pub fn contains(&self, file_id: &FileId) -> bool {
        self.inner.contains_key(file_id)
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&FileId, &File)> {
        self.inner.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;

    fn scope() -> (ProjectId, VaultId) {
        (
            ProjectId::new("project-x").unwrap(),
            VaultId::new("vault-a").unwrap(),
        )
    }

    fn file_id() -> FileId {
        FileId::parse("6094e3b5-4fcb-45e1-8f4f-d2a49c4c6f5e").unwrap()
    }

    #[test]
    fn test_offsets_iterate_in_byte_order() {
        let (p, v) = scope();
        let mut file = File::new(p, v, file_id(), None);

        // assigned out of order on purpose
        file.assign_block(2048, BlockId::of(b"c"));
        file.assign_block(0, BlockId::of(b"a"));
        file.assign_block(1024, BlockId::of(b"b"));

        let offsets: Vec<u64> = file.offsets().keys().copied().collect();
        assert_eq!(offsets, vec![0, 1024, 2048]);
    }

    #[test]
    fn test_add_block_at_updates_both_maps() {
        let (p, v) = scope();
        let mut file = File::new(p.clone(), v.clone(), file_id(), None);

        let block = Block::from_data(p, v, Bytes::from_static(b"chunk"));
        let id = *block.block_id();
        file.add_block_at(0, block).unwrap();

        assert!(file.blocks().contains(&id));
        assert_eq!(file.offsets().get(&0), Some(&id));
    }

    #[test]
    fn test_reassigning_offset_replaces_reference() {
        let (p, v) = scope();
        let mut file = File::new(p, v, file_id(), None);

        file.assign_block(0, BlockId::of(b"old"));
        let prev = file.assign_block(0, BlockId::of(b"new"));
        assert_eq!(prev, Some(BlockId::of(b"old")));
        assert_eq!(file.offsets().get(&0), Some(&BlockId::of(b"new")));
    }

    #[test]
    fn test_files_registry_scope_check() {
        let (p, v) = scope();
        let mut files = Files::new(p.clone(), v.clone());

        let ok = File::new(p.clone(), v, file_id(), Some("/v1.0/vaults/vault-a/files/f".into()));
        assert!(files.insert(ok).unwrap().is_none());
        assert!(files.contains(&file_id()));

        let foreign = File::new(p, VaultId::new("other").unwrap(), file_id(), None);
        assert!(files.insert(foreign).is_err());
    }
}
