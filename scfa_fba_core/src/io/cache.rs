//! Decompress-on-first-use cache for gzipped network definitions
use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use flate2::read::GzDecoder;
use tracing::{debug, info};

use crate::io::ModelIoError;

/// Name of the cache directory, created next to the compressed file
pub const CACHE_DIR: &str = "cache";

/// Return a path to the uncompressed network
///
/// Paths without a `.gz` extension are returned unchanged. Otherwise the file is
/// decompressed into `cache/` next to it, unless a non-empty decompressed copy is
/// already there.
pub fn decompress_gz(path: &Path) -> Result<PathBuf, ModelIoError> {
    if !is_gzipped(path) {
        return Ok(path.to_path_buf());
    }
    let cache = cached_path(path);
    if let Some(dir) = cache.parent() {
        fs::create_dir_all(dir).map_err(|source| ModelIoError::UnableToWrite {
            path: dir.to_path_buf(),
            source,
        })?;
    }
    if fs::metadata(&cache).map(|m| m.len() > 0).unwrap_or(false) {
        debug!(path = %cache.display(), "Using cached decompressed model");
        return Ok(cache);
    }

    info!("Decompressing {}", path.display());
    let read_err = |source: std::io::Error| ModelIoError::UnableToRead {
        path: path.to_path_buf(),
        source,
    };
    let mut decoder = GzDecoder::new(BufReader::new(File::open(path).map_err(read_err)?));

    // Write next to the target first so an interrupted run never leaves a truncated cache
    let mut tmp_os: OsString = cache.as_os_str().to_os_string();
    tmp_os.push(".part");
    let tmp_path = PathBuf::from(tmp_os);
    let write_err = |source: std::io::Error| ModelIoError::UnableToWrite {
        path: tmp_path.clone(),
        source,
    };
    let mut writer = BufWriter::new(File::create(&tmp_path).map_err(write_err)?);
    if let Err(source) = std::io::copy(&mut decoder, &mut writer) {
        drop(writer);
        let _ = fs::remove_file(&tmp_path);
        return Err(read_err(source));
    }
    writer.flush().map_err(write_err)?;
    drop(writer);
    fs::rename(&tmp_path, &cache).map_err(|source| ModelIoError::UnableToWrite {
        path: cache.clone(),
        source,
    })?;
    Ok(cache)
}

/// Whether the file extension is `gz`, in any case
pub fn is_gzipped(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("gz"))
}

/// Where the decompressed copy of `path` lives
pub fn cached_path(path: &Path) -> PathBuf {
    let parent = path.parent().unwrap_or_else(|| Path::new(""));
    let name = if is_gzipped(path) {
        path.file_stem()
    } else {
        path.file_name()
    };
    parent.join(CACHE_DIR).join(name.unwrap_or_default())
}
