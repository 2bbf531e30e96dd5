//! JSON snapshot files.
//!
//! Snapshots are written to a sibling temp file and renamed into place, so
//! a crash mid-write never leaves a truncated snapshot behind.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use fizban_core::WorldSnapshot;

/// Errors raised while reading or writing a snapshot file.
#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    /// Filesystem access failed.
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        /// File involved.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// The file is not a valid snapshot.
    #[error("invalid snapshot {}: {source}", path.display())]
    Json {
        /// File involved.
        path: PathBuf,
        /// The underlying JSON error.
        source: serde_json::Error,
    },
}

fn io_error(path: &Path, source: std::io::Error) -> SnapshotError {
    SnapshotError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// Read a snapshot. A missing file is `Ok(None)`.
///
/// # Errors
///
/// Returns [`SnapshotError`] if the file exists but cannot be read or
/// parsed.
pub fn load(path: &Path) -> Result<Option<WorldSnapshot>, SnapshotError> {
    let contents = match std::fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(io_error(path, e)),
    };
    serde_json::from_str(&contents)
        .map(Some)
        .map_err(|source| SnapshotError::Json {
            path: path.to_path_buf(),
            source,
        })
}

/// Write a snapshot atomically, creating parent directories as needed.
///
/// # Errors
///
/// Returns [`SnapshotError`] if serialization or any filesystem step
/// fails.
pub fn save(path: &Path, snapshot: &WorldSnapshot) -> Result<(), SnapshotError> {
    let json = serde_json::to_string_pretty(snapshot).map_err(|source| SnapshotError::Json {
        path: path.to_path_buf(),
        source,
    })?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| io_error(parent, e))?;
    }

    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);
    std::fs::write(&tmp, json).map_err(|e| io_error(&tmp, e))?;
    std::fs::rename(&tmp, path).map_err(|e| io_error(path, e))?;
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use fizban_core::{ActorRecord, World};
    use fizban_types::{ActorId, LocationId, Selection};
    use fizban_world::create_starting_graph;

    use super::*;

    fn scratch() -> PathBuf {
        std::env::temp_dir().join(format!("fizban-{}", uuid::Uuid::now_v7()))
    }

    #[test]
    fn missing_file_is_none() {
        let path = scratch().join("world.json");
        assert!(load(&path).unwrap().is_none());
    }

    #[test]
    fn save_then_load_restores_world() {
        let dir = scratch();
        let path = dir.join("nested").join("world.json");

        let world = World::new(create_starting_graph().unwrap());
        world
            .apply_selection(&Selection {
                actor: ActorId::from("Player"),
                selection_id: "realm_gate".to_owned(),
                location: LocationId::from("RainbowBridge"),
                effects: Vec::new(),
                tags: vec!["realm_visited".to_owned()],
            })
            .unwrap();
        save(&path, &world.snapshot().unwrap()).unwrap();

        let loaded = load(&path).unwrap().unwrap();
        let fresh = World::new(create_starting_graph().unwrap());
        fresh.restore(loaded).unwrap();
        assert_eq!(
            fresh.where_is(&ActorId::from("Player")).unwrap(),
            Some(LocationId::from("RainbowBridge"))
        );
        assert_eq!(fresh.tick(), 1);

        let _ = std::fs::remove_dir_all(dir);
    }

    #[test]
    fn save_replaces_existing_file() {
        let dir = scratch();
        let path = dir.join("world.json");

        let mut snapshot = WorldSnapshot::default();
        save(&path, &snapshot).unwrap();
        snapshot.tick = 7;
        snapshot
            .actors
            .insert(ActorId::from("Lydia"), ActorRecord::default());
        save(&path, &snapshot).unwrap();

        assert_eq!(load(&path).unwrap(), Some(snapshot));
        assert!(!dir.join("world.json.tmp").exists());

        let _ = std::fs::remove_dir_all(dir);
    }

    #[test]
    fn garbage_file_is_an_error() {
        let dir = scratch();
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("world.json");
        std::fs::write(&path, "not json").unwrap();
        assert!(matches!(load(&path), Err(SnapshotError::Json { .. })));

        let _ = std::fs::remove_dir_all(dir);
    }
}
