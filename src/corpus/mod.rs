//! Match corpus on disk: one JSON document per match, written by the
//! collector, read back for aggregation and graph construction.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use log::{info, warn};

use crate::domain::MatchDocument;

pub struct CorpusReader {
    data_dir: PathBuf,
}

/// Outcome of persisting an incoming match document.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SaveOutcome {
    Saved,
    Duplicate,
}

impl CorpusReader {
    pub fn new<P: AsRef<Path>>(data_dir: P) -> Result<Self> {
        let data_dir = data_dir.as_ref().to_path_buf();
        fs::create_dir_all(&data_dir).context("Failed to create match data directory")?;
        Ok(Self { data_dir })
    }

    /// One pass over the corpus. The directory listing is snapshotted up
    /// front so concurrent collector writes do not shift the pass underneath
    /// us; re-invoking restarts from a fresh snapshot.
    pub fn scan(&self) -> Result<MatchIter> {
        let files = self.snapshot_listing()?;
        info!("Scanning {} match documents in {}", files.len(), self.data_dir.display());
        Ok(MatchIter {
            files: files.into_iter(),
            skipped: 0,
        })
    }

    fn snapshot_listing(&self) -> Result<Vec<PathBuf>> {
        let entries = fs::read_dir(&self.data_dir)
            .with_context(|| format!("Failed to read match directory {}", self.data_dir.display()))?;

        let mut files: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| path.extension().is_some_and(|ext| ext == "json"))
            .collect();
        files.sort();
        Ok(files)
    }

    /// Persist one match document under `<matchId>.json`. Documents already
    /// on disk are left untouched so a re-delivered match never double-counts.
    pub fn save_match(&self, document: &MatchDocument) -> Result<SaveOutcome> {
        let file_path = self.data_dir.join(format!("{}.json", document.metadata.match_id));
        if file_path.exists() {
            return Ok(SaveOutcome::Duplicate);
        }

        let json = serde_json::to_string_pretty(document).context("Failed to serialize match")?;
        fs::write(&file_path, json)
            .with_context(|| format!("Failed to write match file {}", file_path.display()))?;
        Ok(SaveOutcome::Saved)
    }

    /// Remove a persisted match from the corpus. Used to roll a save back
    /// when the follow-up aggregation fails, so a re-delivery of the same
    /// match id is not mistaken for a duplicate.
    pub fn discard_match(&self, match_id: &str) -> Result<()> {
        let file_path = self.data_dir.join(format!("{match_id}.json"));
        if file_path.exists() {
            fs::remove_file(&file_path)
                .with_context(|| format!("Failed to remove match file {}", file_path.display()))?;
        }
        Ok(())
    }
}

/// Lazy sequence of validated match documents. Malformed files are logged,
/// counted and skipped without aborting the pass.
pub struct MatchIter {
    files: std::vec::IntoIter<PathBuf>,
    skipped: usize,
}

impl MatchIter {
    /// Documents skipped so far; the full count once the iterator is drained.
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    fn load(path: &Path) -> Result<MatchDocument> {
        let json = fs::read_to_string(path).context("Failed to read match file")?;
        let document: MatchDocument =
            serde_json::from_str(&json).context("Failed to parse match document")?;
        anyhow::ensure!(document.is_valid(), "match document fails structural checks");
        Ok(document)
    }
}

impl Iterator for MatchIter {
    type Item = MatchDocument;

    fn next(&mut self) -> Option<Self::Item> {
        for path in self.files.by_ref() {
            match Self::load(&path) {
                Ok(document) => return Some(document),
                Err(e) => {
                    warn!("Skipping {}: {e:#}", path.display());
                    self.skipped += 1;
                }
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{MatchInfo, MatchMetadata, ParticipantRecord};

    fn valid_match(id: &str) -> MatchDocument {
        let participants = (0..10)
            .map(|i| {
                serde_json::from_value::<ParticipantRecord>(
                    serde_json::json!({ "puuid": format!("{id}-p{i}") }),
                )
                .unwrap()
            })
            .collect();
        MatchDocument {
            metadata: MatchMetadata {
                match_id: id.to_string(),
            },
            info: MatchInfo {
                game_duration: 1800,
                participants,
            },
        }
    }

    #[test]
    fn scan_yields_saved_matches_and_counts_malformed_files() {
        let dir = tempfile::tempdir().unwrap();
        let reader = CorpusReader::new(dir.path()).unwrap();

        reader.save_match(&valid_match("EUN1_1")).unwrap();
        reader.save_match(&valid_match("EUN1_2")).unwrap();
        std::fs::write(dir.path().join("EUN1_3.json"), "{ not json").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let mut iter = reader.scan().unwrap();
        let matches: Vec<_> = iter.by_ref().collect();
        assert_eq!(matches.len(), 2);
        assert_eq!(iter.skipped(), 1);
    }

    #[test]
    fn save_match_is_idempotent_per_match_id() {
        let dir = tempfile::tempdir().unwrap();
        let reader = CorpusReader::new(dir.path()).unwrap();
        let doc = valid_match("EUN1_9");

        assert_eq!(reader.save_match(&doc).unwrap(), SaveOutcome::Saved);
        assert_eq!(reader.save_match(&doc).unwrap(), SaveOutcome::Duplicate);

        let mut iter = reader.scan().unwrap();
        assert_eq!(iter.by_ref().count(), 1);
        assert_eq!(iter.skipped(), 0);
    }

    #[test]
    fn discard_match_frees_the_id_for_a_retry() {
        let dir = tempfile::tempdir().unwrap();
        let reader = CorpusReader::new(dir.path()).unwrap();
        let doc = valid_match("EUN1_7");

        assert_eq!(reader.save_match(&doc).unwrap(), SaveOutcome::Saved);
        reader.discard_match("EUN1_7").unwrap();
        assert_eq!(reader.save_match(&doc).unwrap(), SaveOutcome::Saved);

        // Discarding an id that was never saved is a no-op.
        reader.discard_match("EUN1_8").unwrap();
    }

    #[test]
    fn structurally_invalid_documents_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let reader = CorpusReader::new(dir.path()).unwrap();

        let mut short_handed = valid_match("EUN1_4");
        short_handed.info.participants.truncate(7);
        let json = serde_json::to_string(&short_handed).unwrap();
        std::fs::write(dir.path().join("EUN1_4.json"), json).unwrap();

        let mut zero_duration = valid_match("EUN1_5");
        zero_duration.info.game_duration = 0;
        let json = serde_json::to_string(&zero_duration).unwrap();
        std::fs::write(dir.path().join("EUN1_5.json"), json).unwrap();

        let mut iter = reader.scan().unwrap();
        assert_eq!(iter.by_ref().count(), 0);
        assert_eq!(iter.skipped(), 2);
    }
}
