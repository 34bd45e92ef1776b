//! Block/offset reconciliation: validating a file's parallel block and
//! offset maps and building the commit payload.
//!
//! A commit ("assignment") declares to the server which blocks, at which
//! offsets, compose a file. The caller either supplies an explicit ordered
//! list of `(block id, offset)` pairs, which must agree with everything the
//! registries already know, or the payload is derived from the file's own
//! offset map. Either way, an inconsistent state is a caller bug and is
//! rejected here, before any network traffic and without mutating the file.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::file::File;
use crate::id::{BlockId, FileId};
use crate::vault::Vault;

/// One entry of the assignment wire payload:
/// `{"id": "...", "offset": N, "size": N}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockAssignment {
    pub id: BlockId,
    pub offset: u64,
    pub size: u64,
}

/// Cross-reference failures detected while preparing an assignment.
#[derive(Error, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum AssignmentError {
    #[error("file {0} is not in the vault")]
    FileNotInVault(FileId),

    #[error("no block assignments were supplied")]
    EmptyAssignment,

    #[error("file has no offsets assigned")]
    NoOffsets,

    #[error("file has no blocks")]
    NoBlocks,

    #[error("block {0} is not in the vault")]
    BlockNotInVault(BlockId),

    #[error("block {0} is not in the file")]
    BlockNotInFile(BlockId),

    #[error("offset {0} is not assigned in the file")]
    OffsetNotAssigned(u64),

    #[error("offset {offset} is assigned to block {assigned}, not {requested}")]
    OffsetBlockMismatch {
        offset: u64,
        requested: BlockId,
        assigned: BlockId,
    },

    #[error("offset {offset} references block {block_id} that is not in the file's block list")]
    DanglingOffsetReference { offset: u64, block_id: BlockId },
}

/// Validate a file's state against the vault and produce the ordered
/// assignment payload.
///
/// With explicit `pairs`, each pair must already be reflected in the vault's
/// block registry, the file's block registry and the file's offset map at
/// exactly that offset; the payload preserves the caller's order. Without
/// `pairs`, the payload is derived from the file's offset map in ascending
/// byte order, and every referenced block must be in the file's block list.
///
/// `size` for each entry is the byte length of the block's data as known to
/// the file's block registry (0 for a block whose data was never attached).
///
/// Pure and synchronous; a failure leaves the vault and file untouched.
pub fn prepare_assignment(
    vault: &Vault,
    file_id: &FileId,
    pairs: Option<&[(BlockId, u64)]>,
) -> Result<Vec<BlockAssignment>, AssignmentError> {
    let file = vault
        .files()
        .get(file_id)
        .ok_or(AssignmentError::FileNotInVault(*file_id))?;

    match pairs {
        Some(pairs) => prepare_explicit(vault, file, pairs),
        None => prepare_derived(file),
    }
}

fn prepare_explicit(
    vault: &Vault,
    file: &File,
    pairs: &[(BlockId, u64)],
) -> Result<Vec<BlockAssignment>, AssignmentError> {
    if pairs.is_empty() {
        return Err(AssignmentError::EmptyAssignment);
    }

    let mut payload = Vec::with_capacity(pairs.len());
    for &(block_id, offset) in pairs {
        if !vault.blocks().contains(&block_id) {
            return Err(AssignmentError::BlockNotInVault(block_id));
        }
        let block = file
            .blocks()
            .get(&block_id)
            .ok_or(AssignmentError::BlockNotInFile(block_id))?;
        let assigned = file
            .offsets()
            .get(&offset)
            .ok_or(AssignmentError::OffsetNotAssigned(offset))?;
        // guards against correct-looking but stale pairs
        if *assigned != block_id {
            return Err(AssignmentError::OffsetBlockMismatch {
                offset,
                requested: block_id,
                assigned: *assigned,
            });
        }
        payload.push(BlockAssignment {
            id: block_id,
            offset,
            size: block.len() as u64,
        });
    }
    Ok(payload)
}

fn prepare_derived(file: &File) -> Result<Vec<BlockAssignment>, AssignmentError> {
    if file.offsets().is_empty() {
        return Err(AssignmentError::NoOffsets);
    }
    if file.blocks().is_empty() {
        return Err(AssignmentError::NoBlocks);
    }

    let mut payload = Vec::with_capacity(file.offsets().len());
    for (&offset, &block_id) in file.offsets() {
        let block = file.blocks().get(&block_id).ok_or(
            AssignmentError::DanglingOffsetReference { offset, block_id },
        )?;
        payload.push(BlockAssignment {
            id: block_id,
            offset,
            size: block.len() as u64,
        });
    }
    Ok(payload)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::Block;
    use crate::id::{ProjectId, VaultId};
    use bytes::Bytes;

    fn file_id() -> FileId {
        FileId::parse("8d1a7bfc-4c44-4a58-9d95-15ce270f67bd").unwrap()
    }

    /// Vault holding one file with `chunks` blocks of 4 bytes each,
    /// assigned to consecutive offsets, fully consistent.
    fn consistent_vault(chunks: u64) -> Vault {
        let project = ProjectId::new("project-x").unwrap();
        let vault_id = VaultId::new("vault-a").unwrap();
        let mut vault = Vault::new(project.clone(), vault_id.clone());

        let mut file = File::new(project.clone(), vault_id.clone(), file_id(), None);
        for i in 0..chunks {
            let data = Bytes::from(format!("{i:04}"));
            let block = Block::from_data(project.clone(), vault_id.clone(), data);
            vault.blocks_mut().insert(block.clone()).unwrap();
            file.add_block_at(i * 4, block).unwrap();
        }
        vault.files_mut().insert(file).unwrap();
        vault
    }

    #[test]
    fn test_derived_payload_covers_every_offset() {
        let vault = consistent_vault(3);
        let payload = prepare_assignment(&vault, &file_id(), None).unwrap();

        let file = vault.files().get(&file_id()).unwrap();
        assert_eq!(payload.len(), file.offsets().len());
        // ascending byte order, sizes from the file's block registry
        assert_eq!(
            payload.iter().map(|e| e.offset).collect::<Vec<_>>(),
            vec![0, 4, 8]
        );
        assert!(payload.iter().all(|e| e.size == 4));
    }

    #[test]
    fn test_explicit_payload_preserves_caller_order() {
        let vault = consistent_vault(2);
        let file = vault.files().get(&file_id()).unwrap();
        let id_at_0 = file.offsets()[&0];
        let id_at_4 = file.offsets()[&4];

        // reversed relative to byte order
        let pairs = vec![(id_at_4, 4), (id_at_0, 0)];
        let payload = prepare_assignment(&vault, &file_id(), Some(&pairs)).unwrap();
        assert_eq!(payload[0].id, id_at_4);
        assert_eq!(payload[0].offset, 4);
        assert_eq!(payload[1].id, id_at_0);
    }

    #[test]
    fn test_unknown_file_is_rejected() {
        let vault = consistent_vault(1);
        let other = FileId::parse("00000000-0000-0000-0000-000000000001").unwrap();
        assert_eq!(
            prepare_assignment(&vault, &other, None),
            Err(AssignmentError::FileNotInVault(other))
        );
    }

    #[test]
    fn test_empty_explicit_pairs_are_rejected() {
        let vault = consistent_vault(1);
        assert_eq!(
            prepare_assignment(&vault, &file_id(), Some(&[])),
            Err(AssignmentError::EmptyAssignment)
        );
    }

    #[test]
    fn test_block_missing_from_vault_registry() {
        let mut vault = consistent_vault(1);
        // the file knows the block but the vault registry does not
        let project = vault.project_id().clone();
        let vault_id = vault.vault_id().clone();
        let stray = Block::from_data(project, vault_id, Bytes::from_static(b"stray"));
        let stray_id = *stray.block_id();
        let file = vault.files_mut().get_mut(&file_id()).unwrap();
        file.add_block_at(4, stray).unwrap();

        assert_eq!(
            prepare_assignment(&vault, &file_id(), Some(&[(stray_id, 4)])),
            Err(AssignmentError::BlockNotInVault(stray_id))
        );
    }

    #[test]
    fn test_block_missing_from_file_registry() {
        let mut vault = consistent_vault(1);
        // vault-wide block that was never added to the file
        let project = vault.project_id().clone();
        let vault_id = vault.vault_id().clone();
        let loose = Block::from_data(project, vault_id, Bytes::from_static(b"loose"));
        let loose_id = *loose.block_id();
        vault.blocks_mut().insert(loose).unwrap();

        assert_eq!(
            prepare_assignment(&vault, &file_id(), Some(&[(loose_id, 0)])),
            Err(AssignmentError::BlockNotInFile(loose_id))
        );
    }

    #[test]
    fn test_unassigned_offset_is_rejected() {
        let vault = consistent_vault(1);
        let file = vault.files().get(&file_id()).unwrap();
        let id = file.offsets()[&0];

        assert_eq!(
            prepare_assignment(&vault, &file_id(), Some(&[(id, 9999)])),
            Err(AssignmentError::OffsetNotAssigned(9999))
        );
    }

    #[test]
    fn test_stale_pair_hits_offset_block_mismatch() {
        let vault = consistent_vault(2);
        let file = vault.files().get(&file_id()).unwrap();
        let id_at_0 = file.offsets()[&0];
        let id_at_4 = file.offsets()[&4];

        // the pair names a real block and a real offset, but not the block
        // the offset actually maps to
        assert_eq!(
            prepare_assignment(&vault, &file_id(), Some(&[(id_at_0, 4)])),
            Err(AssignmentError::OffsetBlockMismatch {
                offset: 4,
                requested: id_at_0,
                assigned: id_at_4,
            })
        );
    }

    #[test]
    fn test_derived_requires_offsets_and_blocks() {
        let project = ProjectId::new("project-x").unwrap();
        let vault_id = VaultId::new("vault-a").unwrap();
        let mut vault = Vault::new(project.clone(), vault_id.clone());
        vault
            .files_mut()
            .insert(File::new(project.clone(), vault_id.clone(), file_id(), None))
            .unwrap();

        assert_eq!(
            prepare_assignment(&vault, &file_id(), None),
            Err(AssignmentError::NoOffsets)
        );

        // offsets but no blocks
        let file = vault.files_mut().get_mut(&file_id()).unwrap();
        file.assign_block(0, BlockId::of(b"phantom"));
        assert_eq!(
            prepare_assignment(&vault, &file_id(), None),
            Err(AssignmentError::NoBlocks)
        );
    }

    #[test]
    fn test_dangling_offset_reference() {
        let mut vault = consistent_vault(1);
        let phantom = BlockId::of(b"never added");
        let file = vault.files_mut().get_mut(&file_id()).unwrap();
        file.assign_block(4, phantom);

        assert_eq!(
            prepare_assignment(&vault, &file_id(), None),
            Err(AssignmentError::DanglingOffsetReference {
                offset: 4,
                block_id: phantom,
            })
        );
    }

    #[test]
    fn test_payload_wire_shape() {
        let vault = consistent_vault(1);
        let payload = prepare_assignment(&vault, &file_id(), None).unwrap();
        let json = serde_json::to_value(&payload).unwrap();
        let entry = &json[0];
        assert_eq!(entry["id"], serde_json::json!(payload[0].id.to_hex()));
        assert_eq!(entry["offset"], serde_json::json!(0));
        assert_eq!(entry["size"], serde_json::json!(4));
    }
}
