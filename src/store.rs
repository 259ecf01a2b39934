// src/store.rs

use anyhow::{bail, Context, Result};
use serde::Serialize;
use std::{
    fs,
    io::{self, BufWriter, Write},
    path::{Path, PathBuf},
};

use crate::config::Dataset;
use crate::error::PipelineError;

fn storage(path: &Path) -> impl FnOnce(io::Error) -> PipelineError {
    let path = path.to_path_buf();
    move |source| PipelineError::Storage { path, source }
}

/// Writes dataset documents as pretty JSON into one directory.
#[derive(Debug, Clone)]
pub struct JsonStore {
    dir: PathBuf,
}

impl JsonStore {
    /// Open the store, creating `dir` if needed. Failing here is fatal for the run.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        if dir.exists() && !dir.is_dir() {
            bail!("path exists but is not a directory: {}", dir.display());
        }
        fs::create_dir_all(&dir).with_context(|| format!("creating data directory {:?}", &dir))?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, dataset: Dataset) -> PathBuf {
        self.dir.join(dataset.file_name())
    }

    /// Serialize with 2-space indentation and a trailing newline, to a hidden
    /// temp file first and then renamed over the target.
    pub fn write<T: Serialize>(&self, dataset: Dataset, doc: &T) -> Result<PathBuf, PipelineError> {
        let path = self.path_for(dataset);
        let tmp_path = self.dir.join(format!(".{}.tmp", dataset.file_name()));

        let written = (|| {
            let file = fs::File::create(&tmp_path).map_err(storage(&tmp_path))?;
            let mut out = BufWriter::new(file);
            serde_json::to_writer_pretty(&mut out, doc)
                .map_err(|source| PipelineError::Serialize { dataset, source })?;
            out.write_all(b"\n").map_err(storage(&tmp_path))?;
            out.flush().map_err(storage(&tmp_path))?;
            drop(out);
            fs::rename(&tmp_path, &path).map_err(storage(&path))
        })();

        if let Err(e) = written {
            // the target keeps its previous contents; only the temp file goes
            let _ = fs::remove_file(&tmp_path);
            return Err(e);
        }
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Co2Document, Co2Record, DatasetDocument};
    use anyhow::Result;
    use tempfile::tempdir;

    fn co2_doc() -> DatasetDocument {
        DatasetDocument::Co2(Co2Document {
            source: "NOAA Global Monitoring Laboratory".into(),
            location: "Mauna Loa Observatory, Hawaii".into(),
            unit: "ppm".into(),
            last_updated: "2024-01-01T00:00:00.000000Z".into(),
            data: vec![Co2Record {
                year: 2021,
                month: 1,
                average: 415.52,
            }],
        })
    }

    #[test]
    fn writes_pretty_json_and_reads_back() -> Result<()> {
        let dir = tempdir()?;
        let store = JsonStore::new(dir.path().join("nested/data"))?;
        let doc = co2_doc();
        let path = store.write(Dataset::Co2, &doc)?;

        assert_eq!(path.file_name().unwrap(), "co2_monthly.json");
        let text = fs::read_to_string(&path)?;
        assert!(text.starts_with("{\n  \"source\": "));
        assert!(text.ends_with("}\n"));
        assert_eq!(DatasetDocument::from_json(Dataset::Co2, &text)?, doc);

        // no temp file left behind
        assert_eq!(fs::read_dir(store.dir())?.count(), 1);
        Ok(())
    }

    #[test]
    fn keeps_non_ascii_literal() -> Result<()> {
        let dir = tempdir()?;
        let store = JsonStore::new(dir.path())?;
        let path = store.write(Dataset::Temperature, &serde_json::json!({"unit": "°C"}))?;
        let text = fs::read_to_string(path)?;
        assert!(text.contains("\"°C\""));
        Ok(())
    }

    #[test]
    fn overwrites_previous_file() -> Result<()> {
        let dir = tempdir()?;
        let store = JsonStore::new(dir.path())?;
        store.write(Dataset::SeaIce, &serde_json::json!({"v": 1}))?;
        let path = store.write(Dataset::SeaIce, &serde_json::json!({"v": 2}))?;
        let back: serde_json::Value = serde_json::from_str(&fs::read_to_string(path)?)?;
        assert_eq!(back["v"], 2);
        Ok(())
    }

    #[test]
    fn failed_rename_removes_temp_file() -> Result<()> {
        let dir = tempdir()?;
        let store = JsonStore::new(dir.path())?;
        fs::create_dir(store.path_for(Dataset::Co2))?;

        let err = store.write(Dataset::Co2, &co2_doc()).unwrap_err();
        assert_eq!(err.kind(), "storage");
        assert!(!dir.path().join(".co2_monthly.json.tmp").exists());
        assert!(store.path_for(Dataset::Co2).is_dir());
        Ok(())
    }

    #[test]
    fn failed_serialization_removes_temp_file() -> Result<()> {
        let dir = tempdir()?;
        let store = JsonStore::new(dir.path())?;
        // non-string map keys cannot become JSON object keys
        let doc = std::collections::BTreeMap::from([((1, 2), 3)]);

        let err = store.write(Dataset::SeaIce, &doc).unwrap_err();
        assert!(matches!(err, PipelineError::Serialize { .. }));
        assert_eq!(fs::read_dir(store.dir())?.count(), 0);
        Ok(())
    }

    #[test]
    fn refuses_a_file_as_directory() -> Result<()> {
        let dir = tempdir()?;
        let file = dir.path().join("occupied");
        fs::write(&file, "x")?;
        assert!(JsonStore::new(&file).is_err());
        Ok(())
    }
}
