use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use thiserror::Error;

use super::{WindowMode, TAIL_LINES};

/// Backwards scan granularity when locating the start of the tail.
const BLOCK_SIZE: u64 = 64 * 1024;

#[derive(Debug, Error)]
pub enum LogReadError {
    #[error("cannot open log file {}: {source}", .path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("cannot read log file {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Returns the raw text one refresh should scan.
///
/// Invalid UTF-8 is replaced rather than rejected; such lines simply fail
/// to parse later on.
pub fn read_window(path: &Path, mode: WindowMode) -> Result<String, LogReadError> {
    match mode {
        WindowMode::FullFile => read_full(path),
        WindowMode::Tail => read_tail(path, TAIL_LINES),
    }
}

pub fn read_full(path: &Path) -> Result<String, LogReadError> {
    let mut file = open(path)?;
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes).map_err(|source| read_error(path, source))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Reads at most the last `lines` lines of the file.
///
/// A newline terminating the final line does not count as an extra line,
/// which matches `tail -n`.
pub fn read_tail(path: &Path, lines: usize) -> Result<String, LogReadError> {
    let mut file = open(path)?;
    let len = file
        .metadata()
        .map_err(|source| read_error(path, source))?
        .len();

    let start = tail_start(&mut file, len, lines).map_err(|source| read_error(path, source))?;

    file.seek(SeekFrom::Start(start)).map_err(|source| read_error(path, source))?;
    let mut bytes = Vec::with_capacity(len.saturating_sub(start) as usize);
    file.read_to_end(&mut bytes).map_err(|source| read_error(path, source))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Byte offset where the last `lines` lines begin.
fn tail_start<R: Read + Seek>(reader: &mut R, len: u64, lines: usize) -> io::Result<u64> {
    if len == 0 || lines == 0 {
        return Ok(len);
    }

    let mut last = [0u8; 1];
    reader.seek(SeekFrom::Start(len - 1))?;
    reader.read_exact(&mut last)?;
    let mut end = if last[0] == b'\n' { len - 1 } else { len };

    let mut block = vec![0u8; BLOCK_SIZE as usize];
    let mut seen = 0usize;

    while end > 0 {
        let start = end.saturating_sub(BLOCK_SIZE);
        let chunk = &mut block[..(end - start) as usize];
        reader.seek(SeekFrom::Start(start))?;
        reader.read_exact(chunk)?;

        for (offset, byte) in chunk.iter().enumerate().rev() {
            if *byte == b'\n' {
                seen += 1;
                if seen == lines {
                    return Ok(start + offset as u64 + 1);
                }
            }
        }
        end = start;
    }

    Ok(0)
}

fn open(path: &Path) -> Result<File, LogReadError> {
    File::open(path).map_err(|source| LogReadError::Open {
        path: path.to_path_buf(),
        source,
    })
}

fn read_error(path: &Path, source: io::Error) -> LogReadError {
    LogReadError::Read {
        path: path.to_path_buf(),
        source,
    }
}
