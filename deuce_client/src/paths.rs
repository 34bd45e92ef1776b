//! Deuce v1 URL path construction.

use deuce_core::{BlockId, FileId, VaultId};

pub(crate) fn vault_path(vault_id: &VaultId) -> String {
    format!("/v1.0/vaults/{vault_id}")
}

pub(crate) fn blocks_path(vault_id: &VaultId) -> String {
    format!("/v1.0/vaults/{vault_id}/blocks")
}

pub(crate) fn block_path(vault_id: &VaultId, block_id: &BlockId) -> String {
    format!("/v1.0/vaults/{vault_id}/blocks/{block_id}")
}

pub(crate) fn files_path(vault_id: &VaultId) -> String {
    format!("/v1.0/vaults/{vault_id}/files")
}

pub(crate) fn file_path(vault_id: &VaultId, file_id: &FileId) -> String {
    format!("/v1.0/vaults/{vault_id}/files/{file_id}")
}

pub(crate) fn fileblocks_path(vault_id: &VaultId, file_id: &FileId) -> String {
    format!("/v1.0/vaults/{vault_id}/files/{file_id}/blocks")
}

/// Pagination query string for the listing endpoints.
///
/// The server joins the two parameters with a comma rather than an
/// ampersand: `?marker=M,limit=N`.
pub(crate) fn list_query(marker: Option<&BlockId>, limit: Option<u64>) -> String {
    match (marker, limit) {
        (None, None) => String::new(),
        (Some(marker), None) => format!("?marker={marker}"),
        (None, Some(limit)) => format!("?limit={limit}"),
        (Some(marker), Some(limit)) => format!("?marker={marker},limit={limit}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vault_id() -> VaultId {
        VaultId::new("vault-a").unwrap()
    }

    #[test]
    fn test_paths() {
        let v = vault_id();
        let b = BlockId::of(b"x");
        let f = FileId::parse("76598632-0b26-42ae-9f61-f5e7e9e1ca69").unwrap();

        assert_eq!(vault_path(&v), "/v1.0/vaults/vault-a");
        assert_eq!(blocks_path(&v), "/v1.0/vaults/vault-a/blocks");
        assert_eq!(
            block_path(&v, &b),
            format!("/v1.0/vaults/vault-a/blocks/{}", b.to_hex())
        );
        assert_eq!(files_path(&v), "/v1.0/vaults/vault-a/files");
        assert_eq!(
            file_path(&v, &f),
            "/v1.0/vaults/vault-a/files/76598632-0b26-42ae-9f61-f5e7e9e1ca69"
        );
        assert_eq!(
            fileblocks_path(&v, &f),
            "/v1.0/vaults/vault-a/files/76598632-0b26-42ae-9f61-f5e7e9e1ca69/blocks"
        );
    }

    #[test]
    fn test_list_query_comma_form() {
        let marker = BlockId::of(b"marker");
        assert_eq!(list_query(None, None), "");
        assert_eq!(
            list_query(Some(&marker), None),
            format!("?marker={}", marker.to_hex())
        );
        assert_eq!(list_query(None, Some(20)), "?limit=20");
        assert_eq!(
            list_query(Some(&marker), Some(20)),
            format!("?marker={},limit=20", marker.to_hex())
        );
    }
}
