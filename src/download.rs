use std::fs::{self, File};
use std::io::{self, Read, Write};
use std::path::Path;

use reqwest::blocking::Client;
use reqwest::Url;

use crate::error::{Error, Result};

const CHUNK_SIZE: usize = 8 * 1024;

/// Observer called synchronously after each written chunk with the byte count
/// so far and the total size when the server reported one.
pub type Progress<'a> = &'a mut dyn FnMut(u64, Option<u64>);

/// Streams `url` into `dest`, creating parent directories as needed.
///
/// A request or status failure before any bytes arrive is a fetch error; a
/// fault after streaming has started removes the partial file and is a
/// download error. No retries at this level.
pub fn fetch_to_path(client: &Client, url: &Url, dest: &Path, progress: Progress) -> Result<u64> {
    let response = client
        .get(url.clone())
        .send()
        .and_then(|r| r.error_for_status())
        .map_err(|e| Error::fetch(url, e))?;
    let total = response.content_length();
    stream_to_file(response, total, dest, progress)
}

/// Copies `reader` into a freshly created `dest`, reporting progress. On any
/// I/O fault the partially written file is removed before returning.
pub(crate) fn stream_to_file(
    reader: impl Read,
    total: Option<u64>,
    dest: &Path,
    progress: Progress,
) -> Result<u64> {
    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent).map_err(Error::Download)?;
    }
    match write_stream(reader, total, dest, progress) {
        Ok(written) => Ok(written),
        Err(err) => {
            let _ = fs::remove_file(dest);
            Err(Error::Download(err))
        }
    }
}

fn write_stream(
    reader: impl Read,
    total: Option<u64>,
    dest: &Path,
    progress: Progress,
) -> io::Result<u64> {
    let mut file = File::create(dest)?;
    let written = copy_with_progress(reader, &mut file, total, progress)?;
    file.flush()?;
    Ok(written)
}

fn copy_with_progress(
    mut reader: impl Read,
    writer: &mut impl Write,
    total: Option<u64>,
    progress: Progress,
) -> io::Result<u64> {
    let mut buf = [0u8; CHUNK_SIZE];
    let mut written = 0u64;
    loop {
        let read = reader.read(&mut buf)?;
        if read == 0 {
            return Ok(written);
        }
        writer.write_all(&buf[..read])?;
        written += read as u64;
        progress(written, total);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Yields its payload, then fails, like a connection dropped mid-stream.
    struct DroppingReader {
        payload: io::Cursor<Vec<u8>>,
    }

    impl Read for DroppingReader {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            match self.payload.read(buf)? {
                0 => Err(io::Error::new(
                    io::ErrorKind::ConnectionReset,
                    "connection reset",
                )),
                n => Ok(n),
            }
        }
    }

    #[test]
    fn copy_reports_monotonic_progress_with_total() {
        let data = vec![7u8; CHUNK_SIZE * 2 + 100];
        let mut sink = Vec::new();
        let mut seen = Vec::new();
        let written = copy_with_progress(
            data.as_slice(),
            &mut sink,
            Some(data.len() as u64),
            &mut |done, total| seen.push((done, total)),
        )
        .unwrap();

        assert_eq!(written, data.len() as u64);
        assert_eq!(sink, data);
        assert_eq!(seen.len(), 3);
        assert!(seen.windows(2).all(|w| w[0].0 < w[1].0));
        assert_eq!(seen.last().unwrap(), &(data.len() as u64, Some(data.len() as u64)));
    }

    #[test]
    fn stream_writes_file_and_creates_parents() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("album").join("song.mp3");
        let data = b"not really audio".to_vec();

        let written =
            stream_to_file(data.as_slice(), None, &dest, &mut |_, _| {}).unwrap();

        assert_eq!(written, data.len() as u64);
        assert_eq!(fs::read(&dest).unwrap(), data);
    }

    #[test]
    fn interrupted_stream_leaves_no_partial_file() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("song.mp3");
        let reader = DroppingReader {
            payload: io::Cursor::new(vec![1u8; CHUNK_SIZE]),
        };

        let result = stream_to_file(reader, Some(u64::MAX), &dest, &mut |_, _| {});

        assert!(matches!(result, Err(Error::Download(_))));
        assert!(!dest.exists());
    }
}
