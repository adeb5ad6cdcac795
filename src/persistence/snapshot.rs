use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{debug, warn};

use crate::world::GameState;

const FILE_PREFIX: &str = "game-day";
const FILE_SUFFIX: &str = ".bin";

/// A saved game found on disk.
#[derive(Debug, Clone)]
pub struct SnapshotMetadata {
    pub path: PathBuf,
    pub day: u32,
    /// Milliseconds since the Unix epoch, unique within a directory.
    pub timestamp: u64,
    pub file_size: u64,
}

#[derive(Debug)]
pub enum SnapshotError {
    Io(io::Error),
    Serialize(String),
    Deserialize(String),
    /// Decoded, but the game inside is inconsistent.
    Corrupt(PathBuf),
    NoValidSnapshots,
}

impl std::fmt::Display for SnapshotError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SnapshotError::Io(e) => write!(f, "I/O error: {}", e),
            SnapshotError::Serialize(e) => write!(f, "Cannot encode game: {}", e),
            SnapshotError::Deserialize(e) => write!(f, "Cannot decode game: {}", e),
            SnapshotError::Corrupt(path) => {
                write!(f, "Inconsistent game in {}", path.display())
            }
            SnapshotError::NoValidSnapshots => {
                write!(f, "No saved game found. Start one with: ricefield new")
            }
        }
    }
}

impl std::error::Error for SnapshotError {}

impl From<io::Error> for SnapshotError {
    fn from(e: io::Error) -> Self {
        SnapshotError::Io(e)
    }
}

/// `game-day{day}-{timestamp}.bin`. Ordering is save order: timestamp, then day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct SnapshotName {
    timestamp: u64,
    day: u32,
}

impl SnapshotName {
    fn parse(file_name: &str) -> Option<Self> {
        let rest = file_name
            .strip_suffix(FILE_SUFFIX)?
            .strip_prefix(FILE_PREFIX)?;
        let (day, timestamp) = rest.split_once('-')?;
        Some(SnapshotName {
            timestamp: timestamp.parse().ok()?,
            day: day.parse().ok()?,
        })
    }

    fn file_name(self) -> String {
        format!("{}{}-{}{}", FILE_PREFIX, self.day, self.timestamp, FILE_SUFFIX)
    }
}

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or_default()
}

/// Write `bytes` to a hidden sibling of `target`, then rename it into place.
fn write_atomically(target: &Path, bytes: &[u8]) -> io::Result<()> {
    let file_name = target
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("snapshot");
    let tmp = target.with_file_name(format!(".{}.tmp", file_name));

    let result = fs::write(&tmp, bytes).and_then(|_| fs::rename(&tmp, target));
    if result.is_err() {
        let _ = fs::remove_file(&tmp);
    }
    result
}

/// Save the whole game as the newest snapshot in `snapshot_dir`.
///
/// The timestamp is bumped past every existing snapshot, so the file just
/// written is always the one [`load_latest_valid_snapshot`] picks first.
pub fn save_snapshot(game: &GameState, snapshot_dir: &Path) -> Result<PathBuf, SnapshotError> {
    fs::create_dir_all(snapshot_dir)?;

    let newest = list_snapshots(snapshot_dir)?
        .first()
        .map_or(0, |s| s.timestamp + 1);
    let name = SnapshotName {
        timestamp: now_millis().max(newest),
        day: game.day,
    };

    let encoded = bincode::serialize(game).map_err(|e| SnapshotError::Serialize(e.to_string()))?;
    let target = snapshot_dir.join(name.file_name());
    write_atomically(&target, &encoded)?;
    debug!(path = %target.display(), bytes = encoded.len(), "Snapshot written");
    Ok(target)
}

/// Load a game and check it with [`GameState::validate`].
pub fn load_snapshot(path: &Path) -> Result<GameState, SnapshotError> {
    let data = fs::read(path)?;
    let game: GameState =
        bincode::deserialize(&data).map_err(|e| SnapshotError::Deserialize(e.to_string()))?;

    game.validate().map_err(|reason| {
        warn!(path = %path.display(), %reason, "Snapshot failed validation");
        SnapshotError::Corrupt(path.to_path_buf())
    })?;
    Ok(game)
}

/// Snapshots in `snapshot_dir`, most recently saved first.
///
/// Files not matching the snapshot name pattern are ignored; a missing
/// directory lists as empty.
pub fn list_snapshots(snapshot_dir: &Path) -> Result<Vec<SnapshotMetadata>, SnapshotError> {
    if !snapshot_dir.exists() {
        return Ok(Vec::new());
    }

    let mut found = Vec::new();
    for entry in fs::read_dir(snapshot_dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let Some(name) = entry.file_name().to_str().and_then(SnapshotName::parse) else {
            continue;
        };
        let file_size = entry.metadata().map(|m| m.len()).unwrap_or(0);
        found.push((name, entry.path(), file_size));
    }

    found.sort_by(|a, b| b.0.cmp(&a.0));
    Ok(found
        .into_iter()
        .map(|(name, path, file_size)| SnapshotMetadata {
            path,
            day: name.day,
            timestamp: name.timestamp,
            file_size,
        })
        .collect())
}

/// Delete all but the `max_snapshots` most recent snapshots. Returns the deleted paths.
pub fn prune_snapshots(
    snapshot_dir: &Path,
    max_snapshots: usize,
) -> Result<Vec<PathBuf>, SnapshotError> {
    let stale = list_snapshots(snapshot_dir)?.into_iter().skip(max_snapshots);

    let mut deleted = Vec::new();
    for snapshot in stale {
        fs::remove_file(&snapshot.path)?;
        deleted.push(snapshot.path);
    }
    Ok(deleted)
}

/// Newest snapshot that loads and validates, skipping broken ones.
pub fn load_latest_valid_snapshot(snapshot_dir: &Path) -> Result<GameState, SnapshotError> {
    for snapshot in list_snapshots(snapshot_dir)? {
        match load_snapshot(&snapshot.path) {
            Ok(game) => return Ok(game),
            Err(e) => warn!(
                path = %snapshot.path.display(),
                error = %e,
                "Skipping unreadable snapshot"
            ),
        }
    }
    Err(SnapshotError::NoValidSnapshots)
}
