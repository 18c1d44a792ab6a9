//! File-backed store for JSON and CSV puzzle collections.
//!
//! The whole file is loaded on `open`. Updates are applied in memory and the
//! file is rewritten on `flush`: the new content goes to a sibling `.tmp`
//! file which is then renamed over the original, so a crash mid-write never
//! leaves a truncated store behind.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

use log::info;

use crate::domain::{PuzzleId, RatedEntity, RatingFilter, RatingUpdate, StoreFormat};
use crate::error::AppError;
use crate::io::csv_file::{CsvLayout, read_entities_csv, write_entities_csv};
use crate::io::json_file::{JsonLayout, read_entities_json, write_entities_json};
use crate::store::{Collection, EntityCursor, RatingStore};

#[derive(Debug, Clone)]
enum FileLayout {
    Json(JsonLayout),
    Csv(CsvLayout),
}

#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    layout: FileLayout,
    collection: Collection,
    dirty: bool,
}

impl FileStore {
    pub fn open(path: &Path, format: StoreFormat) -> Result<Self, AppError> {
        let format = resolve_format(path, format)?;
        let file = File::open(path).map_err(|e| {
            AppError::usage(format!("Failed to open puzzle store '{}': {e}", path.display()))
        })?;
        let reader = BufReader::new(file);

        let (layout, entities) = match format {
            StoreFormat::Csv => {
                let (layout, entities) = read_entities_csv(reader)?;
                (FileLayout::Csv(layout), entities)
            }
            _ => {
                let (layout, entities) = read_entities_json(reader)?;
                (FileLayout::Json(layout), entities)
            }
        };
        let collection = Collection::from_entities(entities)
            .map_err(|e| e.context(format!("Invalid puzzle store '{}'", path.display())))?;

        info!("loaded {} puzzles from {}", collection.len(), path.display());

        Ok(Self {
            path: path.to_path_buf(),
            layout,
            collection,
            dirty: false,
        })
    }

    pub fn entities(&self) -> &[RatedEntity] {
        self.collection.entities()
    }

    /// True when updates have been applied since the last flush.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

}

impl RatingStore for FileStore {
    fn find(&self, filter: &RatingFilter) -> Result<EntityCursor, AppError> {
        Ok(self.collection.find(filter))
    }

    fn update(&mut self, id: &PuzzleId, update: &RatingUpdate) -> Result<(), AppError> {
        self.collection.update(id, update)?;
        self.dirty = true;
        Ok(())
    }

    fn flush(&mut self) -> Result<(), AppError> {
        if !self.dirty {
            return Ok(());
        }

        let layout = &self.layout;
        let entities = self.collection.entities();
        replace_file(&self.path, |writer| match layout {
            FileLayout::Json(layout) => write_entities_json(writer, *layout, entities),
            FileLayout::Csv(layout) => write_entities_csv(writer, layout, entities),
        })?;

        self.dirty = false;
        info!("wrote {} puzzles to {}", self.collection.len(), self.path.display());
        Ok(())
    }

    fn len(&self) -> usize {
        self.collection.len()
    }

    fn ratings(&self) -> Vec<f64> {
        self.collection.ratings()
    }
}

/// Resolve `StoreFormat::Auto` from the file extension.
pub fn resolve_format(path: &Path, format: StoreFormat) -> Result<StoreFormat, AppError> {
    if format != StoreFormat::Auto {
        return Ok(format);
    }
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    match ext.as_deref() {
        Some("csv") => Ok(StoreFormat::Csv),
        Some("json") | Some("jsonl") | Some("ndjson") => Ok(StoreFormat::Json),
        _ => Err(AppError::usage(format!(
            "Cannot infer store format from '{}'; pass --format json or --format csv.",
            path.display()
        ))),
    }
}

/// Write the new content to `<path>.tmp`, then rename it over `path`.
/// On any failure the temp file is removed and `path` is left as it was.
fn replace_file<F>(path: &Path, write: F) -> Result<(), AppError>
where
    F: FnOnce(BufWriter<File>) -> Result<(), AppError>,
{
    let tmp = tmp_path(path);
    let file = File::create(&tmp).map_err(|e| {
        AppError::persistence(format!("Failed to create '{}': {e}", tmp.display()))
    })?;

    let result = write(BufWriter::new(file)).and_then(|()| {
        fs::rename(&tmp, path).map_err(|e| {
            AppError::persistence(format!(
                "Failed to replace '{}' with '{}': {e}",
                path.display(),
                tmp.display()
            ))
        })
    });
    if result.is_err() {
        fs::remove_file(&tmp).ok();
    }
    result
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::time::{SystemTime, UNIX_EPOCH};

    use serde_json::Value;

    use super::*;

    fn scratch_dir(tag: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos())
            .unwrap_or(0);
        let dir = std::env::temp_dir().join(format!("puzzle-reseed-{tag}-{}-{nanos}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn format_is_inferred_from_extension() {
        assert_eq!(resolve_format(Path::new("p.CSV"), StoreFormat::Auto).unwrap(), StoreFormat::Csv);
        assert_eq!(resolve_format(Path::new("p.jsonl"), StoreFormat::Auto).unwrap(), StoreFormat::Json);
        assert_eq!(resolve_format(Path::new("p.txt"), StoreFormat::Csv).unwrap(), StoreFormat::Csv);
        assert!(resolve_format(Path::new("p.txt"), StoreFormat::Auto).is_err());
    }

    #[test]
    fn json_update_is_persisted_on_flush() {
        let dir = scratch_dir("json");
        let path = dir.join("puzzles.json");
        fs::write(
            &path,
            r#"[{"_id":"a","glicko":{"r":1500,"d":500,"v":0.09},"themes":["fork"]},
                {"_id":"b","glicko":{"r":1900,"d":75,"v":0.06},"themes":["pin"]}]"#,
        )
        .unwrap();

        let mut store = FileStore::open(&path, StoreFormat::Auto).unwrap();
        store.update(&PuzzleId::new("a"), &RatingUpdate { r: 1234.5 }).unwrap();
        assert!(store.is_dirty());
        store.flush().unwrap();
        assert!(!store.is_dirty());
        assert!(!tmp_path(&path).exists());

        let reopened = FileStore::open(&path, StoreFormat::Json).unwrap();
        let a = &reopened.entities()[0];
        assert_eq!(a.rating(), 1234.5);
        assert_eq!(a.glicko.deviation(), Some(500.0));
        assert_eq!(a.glicko.volatility(), Some(0.09));
        assert_eq!(a.fields.get("themes"), Some(&serde_json::json!(["fork"])));
        assert_eq!(reopened.entities()[1].rating(), 1900.0);

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn csv_update_rewrites_only_the_rating() {
        let dir = scratch_dir("csv");
        let path = dir.join("puzzles.csv");
        fs::write(
            &path,
            "PuzzleId,FEN,Rating,RatingDeviation,Themes\n\
             a,8/8/8/8/8/8/8/8 w - - 0 1,1500,500,endgame\n\
             b,8/8/8/8/8/8/8/8 b - - 0 1,2010,80,mate\n",
        )
        .unwrap();

        let mut store = FileStore::open(&path, StoreFormat::Auto).unwrap();
        store.update(&PuzzleId::new("a"), &RatingUpdate { r: 1777.25 }).unwrap();
        store.flush().unwrap();

        let written = fs::read_to_string(&path).unwrap();
        assert_eq!(
            written,
            "PuzzleId,FEN,Rating,RatingDeviation,Themes\n\
             a,8/8/8/8/8/8/8/8 w - - 0 1,1777.25,500,endgame\n\
             b,8/8/8/8/8/8/8/8 b - - 0 1,2010,80,mate\n"
        );

        let reopened = FileStore::open(&path, StoreFormat::Csv).unwrap();
        assert_eq!(
            reopened.entities()[0].fields.get("RatingDeviation"),
            Some(&Value::from("500"))
        );

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn clean_store_does_not_touch_the_file() {
        let dir = scratch_dir("clean");
        let path = dir.join("puzzles.json");
        let original = "[ {\"_id\":\"a\",\"glicko\":{\"r\":1500}} ]";
        fs::write(&path, original).unwrap();

        let mut store = FileStore::open(&path, StoreFormat::Auto).unwrap();
        store.flush().unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), original);

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn failed_write_removes_temp_file() {
        let dir = scratch_dir("partial-write");
        let path = dir.join("puzzles.json");
        fs::write(&path, "[]").unwrap();

        let err = replace_file(&path, |mut writer| {
            writer.write_all(b"[{\"_id\":").unwrap();
            writer.flush().unwrap();
            Err(AppError::persistence("No space left on device"))
        })
        .unwrap_err();

        assert_eq!(err.kind(), crate::error::ErrorKind::Persistence);
        assert!(!tmp_path(&path).exists());
        assert_eq!(fs::read_to_string(&path).unwrap(), "[]");

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn failed_rename_removes_temp_file() {
        let dir = scratch_dir("rename");
        // Renaming a file over a non-empty directory fails.
        let path = dir.join("store");
        fs::create_dir_all(path.join("occupied")).unwrap();

        let err = replace_file(&path, |_| Ok(())).unwrap_err();

        assert_eq!(err.kind(), crate::error::ErrorKind::Persistence);
        assert!(!tmp_path(&path).exists());

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn missing_file_is_a_usage_error() {
        let err = FileStore::open(Path::new("/nonexistent/puzzles.json"), StoreFormat::Auto).unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::Usage);
    }
}
