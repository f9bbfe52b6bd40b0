use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::error::{QuizError, Result};
use crate::store::schema::{CategoryFilter, WordEntry, WrongWordRecord};
use crate::store::vocab::{MalformedRows, read_entries};

/// The wrong-word book: every missed word across sessions, one row per
/// `(english, category)`.
#[derive(Clone, Debug)]
pub struct WrongWordLedger {
    path: PathBuf,
    records: Vec<WrongWordRecord>,
}

impl WrongWordLedger {
    /// A missing file is an empty ledger. Any row that does not parse is an
    /// error, since the file is rewritten on the next merge.
    pub fn load(path: &Path) -> Result<Self> {
        let records = dedup_keep_last(read_rows(path)?);
        Ok(Self {
            path: path.to_path_buf(),
            records,
        })
    }

    /// Ledger that has not been read from disk yet; the first
    /// `merge_and_save` still picks up whatever the file holds.
    pub fn empty(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
            records: Vec::new(),
        }
    }

    pub fn records(&self) -> &[WrongWordRecord] {
        &self.records
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn filter(&self, filter: &CategoryFilter) -> Vec<&WrongWordRecord> {
        self.records.iter().filter(|r| filter.matches(r)).collect()
    }

    /// Append this session's misses to the persisted rows, dedup, and
    /// overwrite the file. Nothing is written when there are no misses.
    pub fn merge_and_save(&mut self, session_misses: &[WordEntry]) -> Result<()> {
        if session_misses.is_empty() {
            return Ok(());
        }

        let mut rows = read_rows(&self.path)?;
        rows.extend(session_misses.iter().cloned());
        let merged = dedup_keep_last(rows);

        write_atomic(&self.path, &merged)?;
        info!(
            path = %self.path.display(),
            added = session_misses.len(),
            total = merged.len(),
            "saved wrong-word ledger"
        );
        self.records = merged;
        Ok(())
    }
}

fn read_rows(path: &Path) -> Result<Vec<WordEntry>> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let file = fs::File::open(path).map_err(|e| QuizError::io(path, e))?;
    read_entries(file, path, MalformedRows::Reject)
}

/// Keep the last occurrence of each `(english, category)`, at the position of
/// that last occurrence.
pub fn dedup_keep_last(rows: Vec<WordEntry>) -> Vec<WordEntry> {
    let last_index: HashMap<(&str, &str), usize> = rows
        .iter()
        .enumerate()
        .map(|(i, row)| (row.ledger_key(), i))
        .collect();
    let keep: Vec<bool> = rows
        .iter()
        .enumerate()
        .map(|(i, row)| last_index.get(&row.ledger_key()) == Some(&i))
        .collect();
    rows.into_iter()
        .zip(keep)
        .filter_map(|(row, kept)| kept.then_some(row))
        .collect()
}

fn write_atomic(path: &Path, rows: &[WordEntry]) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).map_err(|e| QuizError::io(parent, e))?;
    }

    let tmp_path = path.with_extension("csv.tmp");
    let write_tmp = || -> Result<()> {
        let mut writer = csv::WriterBuilder::new()
            .terminator(csv::Terminator::Any(b'\n'))
            .from_path(&tmp_path)
            .map_err(|e| QuizError::csv(&tmp_path, e))?;
        for row in rows {
            writer.serialize(row).map_err(|e| QuizError::csv(&tmp_path, e))?;
        }
        writer.flush().map_err(|e| QuizError::io(&tmp_path, e))?;
        let file = writer
            .into_inner()
            .map_err(|e| QuizError::io(&tmp_path, std::io::Error::other(e.to_string())))?;
        file.sync_all().map_err(|e| QuizError::io(&tmp_path, e))?;
        Ok(())
    };

    if let Err(e) = write_tmp() {
        let _ = fs::remove_file(&tmp_path);
        return Err(e);
    }

    fs::rename(&tmp_path, path).map_err(|e| QuizError::io(path, e))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    fn abandon() -> WordEntry {
        WordEntry::new("abandon", "放弃", "四级")
    }

    fn make_ledger() -> (TempDir, PathBuf) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("wrong_words.csv");
        (dir, path)
    }

    #[test]
    fn dedup_keeps_last_occurrence_in_place() {
        let rows = vec![
            WordEntry::new("abandon", "放弃", "四级"),
            WordEntry::new("ability", "能力", "四级"),
            WordEntry::new("abandon", "抛弃", "四级"),
            WordEntry::new("abandon", "放弃", "六级"),
        ];
        let deduped = dedup_keep_last(rows);
        assert_eq!(
            deduped,
            vec![
                WordEntry::new("ability", "能力", "四级"),
                WordEntry::new("abandon", "抛弃", "四级"),
                WordEntry::new("abandon", "放弃", "六级"),
            ]
        );
    }

    #[test]
    fn load_missing_file_is_empty() {
        let (_dir, path) = make_ledger();
        let ledger = WrongWordLedger::load(&path).unwrap();
        assert!(ledger.is_empty());
    }

    #[test]
    fn load_dedups_file_rows() {
        let (_dir, path) = make_ledger();
        fs::write(
            &path,
            "english,chinese,category\nabandon,放弃,四级\nabandon,放弃,四级\nably,能干地,雅思\n",
        )
        .unwrap();
        let ledger = WrongWordLedger::load(&path).unwrap();
        assert_eq!(ledger.records().len(), 2);
    }

    #[test]
    fn merge_without_misses_writes_nothing() {
        let (_dir, path) = make_ledger();
        let mut ledger = WrongWordLedger::load(&path).unwrap();
        ledger.merge_and_save(&[]).unwrap();
        assert!(!path.exists());
    }

    #[test]
    fn merge_writes_header_and_rows() {
        let (_dir, path) = make_ledger();
        let mut ledger = WrongWordLedger::load(&path).unwrap();
        ledger.merge_and_save(&[abandon()]).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content, "english,chinese,category\nabandon,放弃,四级\n");
        assert_eq!(ledger.records(), &[abandon()]);
    }

    #[test]
    fn merge_is_idempotent() {
        let (_dir, path) = make_ledger();
        let misses = vec![abandon(), WordEntry::new("ability", "能力", "四级")];

        let mut ledger = WrongWordLedger::load(&path).unwrap();
        ledger.merge_and_save(&misses).unwrap();
        let once = fs::read_to_string(&path).unwrap();

        ledger.merge_and_save(&misses).unwrap();
        let twice = fs::read_to_string(&path).unwrap();

        assert_eq!(once, twice);
    }

    #[test]
    fn two_sessions_missing_the_same_word_leave_one_row() {
        let (_dir, path) = make_ledger();

        let mut first = WrongWordLedger::load(&path).unwrap();
        first.merge_and_save(&[abandon()]).unwrap();

        let mut second = WrongWordLedger::load(&path).unwrap();
        second.merge_and_save(&[abandon()]).unwrap();

        let reloaded = WrongWordLedger::load(&path).unwrap();
        let rows: Vec<_> = reloaded
            .records()
            .iter()
            .filter(|r| r.ledger_key() == ("abandon", "四级"))
            .collect();
        assert_eq!(rows.len(), 1);
    }

    #[test]
    fn merge_rereads_file_written_by_someone_else() {
        let (_dir, path) = make_ledger();
        let mut stale = WrongWordLedger::empty(&path);
        fs::write(&path, "english,chinese,category\nably,能干地,雅思\n").unwrap();

        stale.merge_and_save(&[abandon()]).unwrap();
        assert_eq!(stale.records().len(), 2);
        assert_eq!(stale.records()[0].english, "ably");
    }

    #[test]
    fn merge_creates_parent_dirs_and_leaves_no_tmp_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("wrong_words.csv");
        let mut ledger = WrongWordLedger::load(&path).unwrap();
        ledger.merge_and_save(&[abandon()]).unwrap();

        assert!(path.exists());
        let tmp_files: Vec<_> = fs::read_dir(path.parent().unwrap())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.path().extension().and_then(|x| x.to_str()) == Some("tmp"))
            .collect();
        assert!(tmp_files.is_empty(), "no residual .tmp files");
    }

    #[test]
    fn filter_by_category() {
        let (_dir, path) = make_ledger();
        let mut ledger = WrongWordLedger::load(&path).unwrap();
        ledger
            .merge_and_save(&[abandon(), WordEntry::new("ably", "能干地", "雅思")])
            .unwrap();
        assert_eq!(ledger.filter(&CategoryFilter::All).len(), 2);
        let ielts = ledger.filter(&CategoryFilter::Only("雅思".to_string()));
        assert_eq!(ielts.len(), 1);
        assert_eq!(ielts[0].english, "ably");
    }

    #[test]
    fn malformed_row_fails_the_merge_and_stays_on_disk() {
        let (_dir, path) = make_ledger();
        let original = "english,chinese,category\nably,能干地,雅思,extra\nabout,关于,四级\n";
        fs::write(&path, original).unwrap();

        assert!(matches!(
            WrongWordLedger::load(&path),
            Err(QuizError::Csv { .. })
        ));

        let mut ledger = WrongWordLedger::empty(&path);
        let err = ledger.merge_and_save(&[abandon()]).unwrap_err();
        assert!(matches!(err, QuizError::Csv { .. }));
        assert_eq!(fs::read_to_string(&path).unwrap(), original);
        assert!(ledger.is_empty());
    }
}
