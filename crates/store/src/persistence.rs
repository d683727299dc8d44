//! Snapshot/restore of the in-process store to a single file on disk.
//!
//! Used at the end of a static load (so a restart does not have to re-parse
//! CSV) and on an explicit "rebuild cache" request. Format is `bincode` over
//! a plain struct; every namespace in the in-process backend round-trips.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{StoreError, StoreResult};
use crate::in_process::InProcessStore;

#[derive(Serialize, Deserialize)]
struct Snapshot {
    hashes: Vec<(String, Vec<(String, Vec<u8>)>)>,
    sets: Vec<(String, Vec<String>)>,
}

/// Writes every namespace in `store` to `path`, replacing any existing file
/// atomically (write to a temp file, then rename).
pub fn write_snapshot(store: &InProcessStore, path: &Path) -> StoreResult<()> {
    let snapshot = Snapshot {
        hashes: store.snapshot_hashes(),
        sets: store.snapshot_sets(),
    };
    let bytes = bincode::serialize(&snapshot)
        .map_err(|why| StoreError::Backend(why.to_string()))?;

    let tmp_path = path.with_extension("tmp");
    fs::write(&tmp_path, bytes).map_err(|why| StoreError::Backend(why.to_string()))?;
    fs::rename(&tmp_path, path).map_err(|why| StoreError::Backend(why.to_string()))?;
    Ok(())
}

/// Loads a snapshot written by [`write_snapshot`] into `store`, replacing
/// its current contents. Returns `Ok(false)` (a no-op) when `path` does not
/// exist.
pub fn load_snapshot(store: &InProcessStore, path: &Path) -> StoreResult<bool> {
    if !path.exists() {
        return Ok(false);
    }
    let bytes = fs::read(path).map_err(|why| StoreError::Backend(why.to_string()))?;
    let snapshot: Snapshot =
        bincode::deserialize(&bytes).map_err(|why| StoreError::Backend(why.to_string()))?;
    store.restore_hashes(snapshot.hashes);
    store.restore_sets(snapshot.sets);
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::Store;

    #[tokio::test]
    async fn snapshot_round_trips_hashes_and_sets() {
        let original = InProcessStore::new();
        original
            .set_bytes("agency", "91", b"Dublin Bus".to_vec())
            .await
            .unwrap();
        original.add("cancelled", "t1").await.unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.snapshot");
        write_snapshot(&original, &path).unwrap();

        let restored = InProcessStore::new();
        assert!(load_snapshot(&restored, &path).unwrap());
        assert_eq!(
            restored.get_bytes("agency", "91").await.unwrap(),
            Some(b"Dublin Bus".to_vec())
        );
        assert!(restored.has("cancelled", "t1").await.unwrap());
    }

    #[tokio::test]
    async fn loading_a_missing_snapshot_is_a_no_op() {
        let store = InProcessStore::new();
        let path = Path::new("/nonexistent/store.snapshot");
        assert!(!load_snapshot(&store, path).unwrap());
    }
}
