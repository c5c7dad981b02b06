// LogTriage - platform/fs.rs
//
// File reading helpers shared by the content source and rules loader.
// Invalid UTF-8 is always replaced lossily: a log with a stray byte is
// still worth triaging.

use crate::util::constants;
use std::io;
use std::path::Path;

/// Read the full content of a file as a string.
///
/// Files above `LARGE_FILE_THRESHOLD` are read through a read-only memory
/// map so the raw bytes are never copied into a second heap buffer before
/// conversion. For files with invalid UTF-8, uses lossy conversion.
pub fn read_file_lossy(path: &Path) -> io::Result<String> {
    read_file_lossy_above(path, constants::LARGE_FILE_THRESHOLD)
}

fn read_file_lossy_above(path: &Path, map_threshold: u64) -> io::Result<String> {
    let size = std::fs::metadata(path)?.len();
    if size > map_threshold {
        tracing::debug!(path = %path.display(), size, "Reading large file via memory map");
        return read_mapped_lossy(path);
    }
    let bytes = std::fs::read(path)?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Read using `memmap2` for large files.
fn read_mapped_lossy(path: &Path) -> io::Result<String> {
    let file = std::fs::File::open(path)?;
    // SAFETY: the map is read-only and dropped before returning. Another
    // process writing to the file while it is mapped makes the bytes read
    // unspecified, and truncating it raises SIGBUS on access instead of an
    // I/O error. Both are accepted for log files that are no longer being
    // written; live logs below the threshold never take this path.
    let mmap = unsafe { memmap2::Mmap::map(&file)? };
    Ok(String::from_utf8_lossy(&mmap).into_owned())
}

/// Returns true if `path` names an existing regular file.
pub fn is_existing_file(path: &Path) -> bool {
    path.is_file()
}
