//! Durable flat inner-product index over unit vectors.
//!
//! Two artifacts live side by side: `<path>` holds the vectors as little-endian f32s, and
//! `<path>.labels` holds the matching text labels as a JSON list. They are only ever loaded
//! together and always rewritten together.

use std::ffi::OsString;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, RwLock};

use tempfile::NamedTempFile;
use tracing::{info, warn};

use super::scorer::{dot, unit};
use super::SimilarityError;

#[derive(Debug, Default)]
struct Snapshot {
    vectors: Vec<Vec<f32>>,
    labels: Vec<String>,
}

pub struct SimilarityIndex {
    path: PathBuf,
    labels_path: PathBuf,
    dims: usize,
    /// Held across append and persist so saves never interleave.
    writer: Mutex<()>,
    /// Last durably saved state. Readers clone the `Arc` and never wait on a save.
    snapshot: RwLock<Arc<Snapshot>>,
}

impl SimilarityIndex {
    /// Loads the index at `path`. Anything short of two consistent artifacts starts empty.
    pub fn open(path: impl Into<PathBuf>, dims: usize) -> Self {
        let path = path.into();
        let labels_path = labels_path(&path);

        let snapshot = match load(&path, &labels_path, dims) {
            Ok(Some(snapshot)) => {
                info!(
                    "Loaded similarity index from {} ({} entries)",
                    path.display(),
                    snapshot.labels.len()
                );
                snapshot
            }
            Ok(None) => {
                info!("No similarity index at {} yet", path.display());
                Snapshot::default()
            }
            Err(e) => {
                warn!(
                    "Ignoring unreadable similarity index at {}: {}",
                    path.display(),
                    e
                );
                Snapshot::default()
            }
        };

        Self {
            path,
            labels_path,
            dims,
            writer: Mutex::new(()),
            snapshot: RwLock::new(Arc::new(snapshot)),
        }
    }

    pub fn len(&self) -> usize {
        self.current().labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Adds `vectors` with their `labels` and saves both artifacts before the new entries
    /// become visible to [`SimilarityIndex::nearest`]. Returns the new entry count.
    pub fn append(
        &self,
        vectors: &[Vec<f32>],
        labels: &[String],
    ) -> Result<usize, SimilarityError> {
        if vectors.len() != labels.len() {
            return Err(SimilarityError::LengthMismatch {
                vectors: vectors.len(),
                labels: labels.len(),
            });
        }

        let normalized = vectors
            .iter()
            .map(|v| {
                self.check_dims(v)?;
                unit(v)
            })
            .collect::<Result<Vec<_>, _>>()?;

        let _guard = self.writer.lock().unwrap_or_else(|p| p.into_inner());

        let current = self.current();
        let mut next = Snapshot {
            vectors: current.vectors.clone(),
            labels: current.labels.clone(),
        };
        next.vectors.extend(normalized);
        next.labels.extend(labels.iter().cloned());

        self.persist(&next)?;

        let total = next.labels.len();
        *self.snapshot.write().unwrap_or_else(|p| p.into_inner()) = Arc::new(next);
        Ok(total)
    }

    /// Up to `k` labels closest to `query`, best first, with their cosine scores.
    pub fn nearest(&self, query: &[f32], k: usize) -> Result<Vec<(String, f32)>, SimilarityError> {
        self.check_dims(query)?;
        let query = unit(query)?;
        let snapshot = self.current();

        let mut scored: Vec<(String, f32)> = snapshot
            .vectors
            .iter()
            .zip(&snapshot.labels)
            .map(|(v, label)| (label.clone(), dot(v, &query)))
            .collect();

        scored.sort_by(|a, b| b.1.total_cmp(&a.1));
        scored.truncate(k);
        Ok(scored)
    }

    fn current(&self) -> Arc<Snapshot> {
        self.snapshot
            .read()
            .unwrap_or_else(|p| p.into_inner())
            .clone()
    }

    fn check_dims(&self, v: &[f32]) -> Result<(), SimilarityError> {
        if v.len() != self.dims {
            return Err(SimilarityError::DimensionMismatch {
                expected: self.dims,
                actual: v.len(),
            });
        }
        Ok(())
    }

    fn persist(&self, snapshot: &Snapshot) -> Result<(), SimilarityError> {
        let blob: Vec<u8> = snapshot.vectors.iter().flat_map(|v| vec_to_blob(v)).collect();
        let labels = serde_json::to_vec(&snapshot.labels)?;

        write_atomic(&self.path, &blob)?;
        write_atomic(&self.labels_path, &labels)?;
        Ok(())
    }
}

fn labels_path(path: &Path) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(".labels");
    PathBuf::from(name)
}

/// Writes to a temp file in the target's directory, then renames it into place.
fn write_atomic(path: &Path, bytes: &[u8]) -> io::Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(bytes)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

fn load(path: &Path, labels_path: &Path, dims: usize) -> Result<Option<Snapshot>, String> {
    let (blob, raw_labels) = match (std::fs::read(path), std::fs::read(labels_path)) {
        (Ok(blob), Ok(labels)) => (blob, labels),
        (Err(a), Err(b))
            if a.kind() == io::ErrorKind::NotFound && b.kind() == io::ErrorKind::NotFound =>
        {
            return Ok(None)
        }
        (Err(e), _) => return Err(format!("{}: {e}", path.display())),
        (_, Err(e)) => return Err(format!("{}: {e}", labels_path.display())),
    };

    let labels: Vec<String> =
        serde_json::from_slice(&raw_labels).map_err(|e| format!("labels: {e}"))?;

    let stride = dims * 4;
    if stride == 0 || blob.len() % stride != 0 {
        return Err(format!(
            "vector file is {} bytes, not a multiple of {stride}",
            blob.len()
        ));
    }

    let vectors: Vec<Vec<f32>> = blob.chunks_exact(stride).map(blob_to_vec).collect();
    if vectors.len() != labels.len() {
        return Err(format!(
            "{} vectors but {} labels",
            vectors.len(),
            labels.len()
        ));
    }

    Ok(Some(Snapshot { vectors, labels }))
}

fn vec_to_blob(vec: &[f32]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(vec.len() * 4);
    for &v in vec {
        bytes.extend_from_slice(&v.to_le_bytes());
    }
    bytes
}

fn blob_to_vec(blob: &[u8]) -> Vec<f32> {
    blob.chunks_exact(4)
        .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_missing_files_start_empty() {
        let dir = tempfile::tempdir().unwrap();
        let index = SimilarityIndex::open(dir.path().join("index.bin"), 3);
        assert!(index.is_empty());
        assert!(index.nearest(&[1.0, 0.0, 0.0], 5).unwrap().is_empty());
    }

    #[test]
    fn test_append_then_nearest_orders_by_score() {
        let dir = tempfile::tempdir().unwrap();
        let index = SimilarityIndex::open(dir.path().join("index.bin"), 3);

        let total = index
            .append(
                &[vec![1.0, 0.0, 0.0], vec![0.0, 1.0, 0.0], vec![1.0, 1.0, 0.0]],
                &labels(&["python", "java", "both"]),
            )
            .unwrap();
        assert_eq!(total, 3);

        let hits = index.nearest(&[2.0, 0.1, 0.0], 2).unwrap();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].0, "python");
        assert_eq!(hits[1].0, "both");
        assert!(hits[0].1 >= hits[1].1);
    }

    #[test]
    fn test_reopen_restores_entries() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("index.bin");
        {
            let index = SimilarityIndex::open(&path, 2);
            index
                .append(&[vec![3.0, 4.0]], &labels(&["resume one"]))
                .unwrap();
        }

        assert!(dir.path().join("index.bin.labels").exists());
        let reopened = SimilarityIndex::open(&path, 2);
        assert_eq!(reopened.len(), 1);
        let hits = reopened.nearest(&[3.0, 4.0], 1).unwrap();
        assert_eq!(hits[0].0, "resume one");
        assert!((hits[0].1 - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_labels_without_vectors_start_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("index.bin");
        std::fs::write(dir.path().join("index.bin.labels"), b"[\"orphan\"]").unwrap();

        let index = SimilarityIndex::open(&path, 2);
        assert!(index.is_empty());
    }

    #[test]
    fn test_inconsistent_artifacts_start_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("index.bin");
        std::fs::write(&path, vec_to_blob(&[1.0, 0.0])).unwrap();
        std::fs::write(dir.path().join("index.bin.labels"), b"[\"a\", \"b\"]").unwrap();

        let index = SimilarityIndex::open(&path, 2);
        assert!(index.is_empty());
    }

    #[test]
    fn test_append_validates_input() {
        let dir = tempfile::tempdir().unwrap();
        let index = SimilarityIndex::open(dir.path().join("index.bin"), 2);

        let err = index.append(&[vec![1.0, 0.0]], &[]).unwrap_err();
        assert!(matches!(err, SimilarityError::LengthMismatch { .. }));

        let err = index
            .append(&[vec![1.0, 0.0, 0.0]], &labels(&["x"]))
            .unwrap_err();
        assert!(matches!(err, SimilarityError::DimensionMismatch { .. }));

        let err = index
            .append(&[vec![0.0, 0.0]], &labels(&["x"]))
            .unwrap_err();
        assert!(matches!(err, SimilarityError::DegenerateVector));

        assert!(index.is_empty());
        assert!(!dir.path().join("index.bin").exists());
    }

    #[test]
    fn test_concurrent_appends_are_serialized() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("index.bin");
        let index = Arc::new(SimilarityIndex::open(&path, 2));

        let handles: Vec<_> = (0..16)
            .map(|i| {
                let index = Arc::clone(&index);
                std::thread::spawn(move || {
                    index
                        .append(&[vec![1.0, i as f32]], &[format!("resume {i}")])
                        .unwrap()
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(index.len(), 16);
        let reopened = SimilarityIndex::open(&path, 2);
        assert_eq!(reopened.len(), 16);
        let hits = reopened.nearest(&[1.0, 0.0], 16).unwrap();
        assert_eq!(hits.len(), 16);
        assert_eq!(hits[0].0, "resume 0");
    }

    #[test]
    fn test_blob_codec() {
        let v = vec![1.0f32, -2.5, 3.125];
        let blob = vec_to_blob(&v);
        assert_eq!(blob.len(), 12);
        assert_eq!(blob_to_vec(&blob), v);
    }
}
