use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::reconcile::Dataset;

/// Write the header and all rows as CSV to any writer.
pub fn write_csv<W: io::Write>(dataset: &Dataset, out: W) -> Result<()> {
    let mut writer = csv::Writer::from_writer(out);
    writer.write_record(dataset.columns())?;
    for row in &dataset.rows {
        writer.write_record(row.cells())?;
    }
    writer.flush()?;
    Ok(())
}

/// Write to `path` via a sibling temp file so a failed write leaves nothing behind.
pub fn save_csv(dataset: &Dataset, path: &Path) -> Result<()> {
    let tmp = temp_path(path);
    let result = fs::File::create(&tmp)
        .with_context(|| format!("Failed to create {:?}", tmp))
        .and_then(|file| write_csv(dataset, io::BufWriter::new(file)))
        .and_then(|()| {
            fs::rename(&tmp, path).with_context(|| format!("Failed to move output to {:?}", path))
        });
    if result.is_err() {
        let _ = fs::remove_file(&tmp);
    }
    result
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".part");
    path.with_file_name(name)
}
