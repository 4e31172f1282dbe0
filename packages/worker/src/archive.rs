//! Zip extraction and packaging. These functions block; call them from
//! `spawn_blocking`.

use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter};
use std::path::Path;

use tracing::{debug, warn};
use walkdir::WalkDir;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use crate::error::Result;

/// Entries added by macOS archivers that never belong to a scene.
fn is_os_metadata(name: &str) -> bool {
    let lower = name.to_ascii_lowercase();
    lower.starts_with("__macosx/")
        || lower.contains("/__macosx/")
        || lower == ".ds_store"
        || lower.ends_with("/.ds_store")
}

/// Extract `archive` into `dest`, which must already exist. Returns the
/// number of files written.
///
/// Entries whose path would escape `dest` are skipped.
pub fn extract(archive: &Path, dest: &Path) -> Result<usize> {
    let file = File::open(archive)?;
    let mut zip = ZipArchive::new(BufReader::new(file))?;
    let mut written = 0;

    for i in 0..zip.len() {
        let mut entry = zip.by_index(i)?;
        let name = entry.name().to_string();
        if is_os_metadata(&name) {
            continue;
        }
        let Some(relative) = entry.enclosed_name() else {
            warn!(entry = %name, "Skipping archive entry outside the extraction root");
            continue;
        };

        let target = dest.join(relative);
        if entry.is_dir() {
            fs::create_dir_all(&target)?;
            continue;
        }
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut out = BufWriter::new(File::create(&target)?);
        io::copy(&mut entry, &mut out)?;
        written += 1;
    }

    debug!(archive = %archive.display(), files = written, "Extracted archive");
    Ok(written)
}

/// Pack every file under `src` into a new zip at `dest`, named by its path
/// relative to `src`. The archive is written beside `dest` and renamed into
/// place, replacing any previous archive. Returns the number of files packed.
pub fn compress_dir(src: &Path, dest: &Path) -> Result<usize> {
    let partial = dest.with_extension("zip.part");
    let result = write_archive(src, &partial);
    match result {
        Ok(count) => {
            fs::rename(&partial, dest)?;
            debug!(archive = %dest.display(), files = count, "Packed directory");
            Ok(count)
        }
        Err(e) => {
            let _ = fs::remove_file(&partial);
            Err(e)
        }
    }
}

fn write_archive(src: &Path, dest: &Path) -> Result<usize> {
    let mut writer = ZipWriter::new(File::create(dest)?);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    let mut count = 0;

    for entry in WalkDir::new(src).sort_by_file_name() {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let Ok(relative) = entry.path().strip_prefix(src) else {
            continue;
        };
        let name = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");

        writer.start_file(name, options)?;
        let mut input = BufReader::new(File::open(entry.path())?);
        io::copy(&mut input, &mut writer)?;
        count += 1;
    }

    writer.finish()?;
    Ok(count)
}
