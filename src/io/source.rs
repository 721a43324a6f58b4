// Released under MIT License.
// Copyright (c) 2024 Ladislav Bartos

//! Line-oriented reading of plain-text and gzip-compressed files.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use flate2::read::MultiGzDecoder;
use tracing::debug;

use crate::errors::ReadError;

/// Magic bytes at the start of every gzip file.
const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Source of lines read from a (possibly gzip-compressed) text file.
pub(crate) struct TextSource {
    reader: Box<dyn BufRead + Send>,
    path: Box<Path>,
    line_number: usize,
    buffer: String,
}

impl TextSource {
    /// Open a file for reading. Gzip-compressed files are detected from their content
    /// and decompressed on the fly.
    pub(crate) fn open(filename: impl AsRef<Path>) -> Result<TextSource, ReadError> {
        let path: Box<Path> = Box::from(filename.as_ref());
        let file = File::open(&path).map_err(|_| ReadError::FileNotFound(path.clone()))?;

        let mut buffered = BufReader::new(file);
        let compressed = buffered
            .fill_buf()
            .map_err(|_| ReadError::CouldNotRead(path.clone()))?
            .starts_with(&GZIP_MAGIC);

        debug!("Opened file '{}' (gzip: {}).", path.display(), compressed);

        let reader: Box<dyn BufRead + Send> = if compressed {
            Box::new(BufReader::new(MultiGzDecoder::new(buffered)))
        } else {
            Box::new(buffered)
        };

        Ok(TextSource {
            reader,
            path,
            line_number: 0,
            buffer: String::new(),
        })
    }

    /// Read the next line of the file without the line terminator.
    ///
    /// ## Returns
    /// - `Ok(Some(line))` if a line was read.
    /// - `Ok(None)` if the end of the file has been reached.
    /// - `Err(ReadError::CouldNotRead)` if the file could not be read.
    pub(crate) fn read_line(&mut self) -> Result<Option<String>, ReadError> {
        self.buffer.clear();
        match self.reader.read_line(&mut self.buffer) {
            Ok(0) => Ok(None),
            Ok(_) => {
                self.line_number += 1;
                let line = self.buffer.trim_end_matches(['\n', '\r']);
                Ok(Some(line.to_owned()))
            }
            Err(_) => Err(ReadError::CouldNotRead(self.path.clone())),
        }
    }

    /// Read the next line of the file. Reaching the end of the file is an error.
    pub(crate) fn expect_line(&mut self) -> Result<String, ReadError> {
        self.read_line()?
            .ok_or_else(|| ReadError::UnexpectedEof(self.path.clone()))
    }

    /// Skip `n` lines of the file. Reaching the end of the file is an error.
    pub(crate) fn skip_lines(&mut self, n: usize) -> Result<(), ReadError> {
        for _ in 0..n {
            self.buffer.clear();
            match self.reader.read_line(&mut self.buffer) {
                Ok(0) => return Err(ReadError::UnexpectedEof(self.path.clone())),
                Ok(_) => self.line_number += 1,
                Err(_) => return Err(ReadError::CouldNotRead(self.path.clone())),
            }
        }

        Ok(())
    }

    /// Get the path to the file.
    pub(crate) fn path(&self) -> &Path {
        &self.path
    }

    /// Get the number of lines read so far.
    pub(crate) fn line_number(&self) -> usize {
        self.line_number
    }

    /// Construct an `InvalidHeader` error for this file.
    pub(crate) fn invalid_header(&self, format: &str, line: &str) -> ReadError {
        ReadError::InvalidHeader(self.path.clone(), format.to_owned(), line.to_owned())
    }
}

/******************************/
/*         UNIT TESTS         */
/******************************/

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_plain() {
        let mut source = TextSource::open("test_files/rdf.time").unwrap();
        assert_eq!(
            source.read_line().unwrap().unwrap(),
            "# Time-averaged data for fix rdf"
        );
        assert_eq!(source.line_number(), 1);
        assert_eq!(
            source.expect_line().unwrap(),
            "# TimeStep Number-of-rows"
        );
        assert_eq!(source.line_number(), 2);
        assert_eq!(source.path(), Path::new("test_files/rdf.time"));
    }

    #[test]
    fn read_gzip() {
        let mut plain = TextSource::open("test_files/dump.lammpstrj").unwrap();
        let mut compressed = TextSource::open("test_files/dump.lammpstrj.gz").unwrap();

        loop {
            let line1 = plain.read_line().unwrap();
            let line2 = compressed.read_line().unwrap();
            assert_eq!(line1, line2);

            if line1.is_none() {
                break;
            }
        }

        assert_eq!(plain.line_number(), compressed.line_number());
    }

    #[test]
    fn skip_and_eof() {
        let mut source = TextSource::open("test_files/rdf.time").unwrap();
        source.skip_lines(3).unwrap();
        assert_eq!(source.line_number(), 3);

        let mut n_lines = 3;
        while source.read_line().unwrap().is_some() {
            n_lines += 1;
        }
        assert_eq!(source.line_number(), n_lines);

        assert_eq!(
            source.expect_line(),
            Err(ReadError::UnexpectedEof(Box::from(Path::new(
                "test_files/rdf.time"
            ))))
        );
        assert_eq!(
            source.skip_lines(1),
            Err(ReadError::UnexpectedEof(Box::from(Path::new(
                "test_files/rdf.time"
            ))))
        );
    }

    #[test]
    fn nonexistent() {
        match TextSource::open("test_files/nonexistent.time") {
            Err(ReadError::FileNotFound(path)) => {
                assert_eq!(path, Box::from(Path::new("test_files/nonexistent.time")))
            }
            _ => panic!("Nonexistent file was opened."),
        }
    }
}
