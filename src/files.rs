// Released under MIT License.
// Copyright (c) 2024 Ladislav Bartos

//! Enum capturing file types supported by `lammps_rs`.

use std::path::Path;

use regex::Regex;

use crate::errors::ReadError;
use crate::io::source::TextSource;

/// Types of LAMMPS files supported by `lammps_rs`.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum FileType {
    Unknown,
    Data,
    Log,
    Dump,
    DumpLocal,
    AveTime,
    AveCorrelate,
    AveChunk,
    AveHisto,
}

impl FileType {
    /// Identify file type from the name of the file (based on file extension).
    /// Trailing `.gz` extension is ignored.
    pub fn from_name(filename: impl AsRef<Path>) -> FileType {
        let mut path = filename.as_ref();
        if path.extension().and_then(|x| x.to_str()) == Some("gz") {
            path = match path.file_stem() {
                Some(stem) => Path::new(stem),
                None => return FileType::Unknown,
            };
        }

        let name = match path.file_name().and_then(|x| x.to_str()) {
            Some(x) => x,
            None => return FileType::Unknown,
        };

        if name == "log.lammps" || name.starts_with("log.") {
            return FileType::Log;
        }

        match path.extension().and_then(|x| x.to_str()) {
            Some("data") | Some("lmp") => FileType::Data,
            Some("log") => FileType::Log,
            Some("lammpstrj") | Some("dump") => FileType::Dump,
            Some("local") => FileType::DumpLocal,
            Some("time") => FileType::AveTime,
            Some("correlate") => FileType::AveCorrelate,
            Some("chunk") => FileType::AveChunk,
            Some("histo") => FileType::AveHisto,
            Some(_) | None => FileType::Unknown,
        }
    }

    /// Identify file type from the content of the file.
    ///
    /// ## Returns
    /// Detected `FileType` (possibly `FileType::Unknown`) or `ReadError` if the file could not be read.
    pub fn detect(filename: impl AsRef<Path>) -> Result<FileType, ReadError> {
        let mut source = TextSource::open(filename)?;

        let mut lines = Vec::with_capacity(10);
        while lines.len() < 10 {
            match source.read_line()? {
                Some(line) => lines.push(line),
                None => break,
            }
        }

        let first = match lines.first() {
            Some(x) => x.trim(),
            None => return Ok(FileType::Unknown),
        };

        if first == "ITEM: TIMESTEP" {
            return Ok(match lines.get(2).map(|x| x.trim()) {
                Some("ITEM: NUMBER OF ATOMS") => FileType::Dump,
                Some("ITEM: NUMBER OF ENTRIES") => FileType::DumpLocal,
                _ => FileType::Unknown,
            });
        }

        if first.starts_with("LAMMPS (") {
            return Ok(FileType::Log);
        }

        const AVE_HEADERS: [(&str, FileType); 4] = [
            ("# Time-averaged data for fix", FileType::AveTime),
            ("# Time-correlated data for fix", FileType::AveCorrelate),
            ("# Chunk-averaged data for fix", FileType::AveChunk),
            ("# Histogrammed data for fix", FileType::AveHisto),
        ];

        if let Some((_, filetype)) = AVE_HEADERS.iter().find(|(x, _)| first.starts_with(x)) {
            return Ok(*filetype);
        }

        let atoms = Regex::new(r"^\s*\d+\s+atoms\s*$")
            .expect("FATAL LAMMPS_RS ERROR | FileType::detect | Invalid regular expression.");
        if lines.iter().any(|x| atoms.is_match(x)) {
            return Ok(FileType::Data);
        }

        Ok(FileType::Unknown)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identify_data() {
        assert_eq!(FileType::from_name("system.data"), FileType::Data);
        assert_eq!(FileType::from_name("system.lmp"), FileType::Data);
    }

    #[test]
    fn identify_log() {
        assert_eq!(FileType::from_name("log.lammps"), FileType::Log);
        assert_eq!(FileType::from_name("log.equilibration"), FileType::Log);
        assert_eq!(FileType::from_name("run.log"), FileType::Log);
        assert_eq!(FileType::from_name("log.lammps.gz"), FileType::Log);
    }

    #[test]
    fn identify_dump() {
        assert_eq!(FileType::from_name("traj.lammpstrj"), FileType::Dump);
        assert_eq!(FileType::from_name("traj.dump"), FileType::Dump);
        assert_eq!(FileType::from_name("traj.lammpstrj.gz"), FileType::Dump);
        assert_eq!(FileType::from_name("bonds.local"), FileType::DumpLocal);
    }

    #[test]
    fn identify_ave() {
        assert_eq!(FileType::from_name("rdf.time"), FileType::AveTime);
        assert_eq!(FileType::from_name("vacf.correlate"), FileType::AveCorrelate);
        assert_eq!(FileType::from_name("profile.chunk"), FileType::AveChunk);
        assert_eq!(FileType::from_name("angles.histo"), FileType::AveHisto);
    }

    #[test]
    fn identify_unknown() {
        assert_eq!(FileType::from_name("file.txt"), FileType::Unknown);
        assert_eq!(FileType::from_name("file"), FileType::Unknown);
        assert_eq!(FileType::from_name("file.gz"), FileType::Unknown);
    }

    #[test]
    fn detect() {
        assert_eq!(
            FileType::detect("test_files/dump.lammpstrj").unwrap(),
            FileType::Dump
        );
        assert_eq!(
            FileType::detect("test_files/dump.lammpstrj.gz").unwrap(),
            FileType::Dump
        );
        assert_eq!(
            FileType::detect("test_files/dump.local").unwrap(),
            FileType::DumpLocal
        );
        assert_eq!(
            FileType::detect("test_files/log.lammps").unwrap(),
            FileType::Log
        );
        assert_eq!(
            FileType::detect("test_files/rdf.time").unwrap(),
            FileType::AveTime
        );
        assert_eq!(
            FileType::detect("test_files/vacf.correlate").unwrap(),
            FileType::AveCorrelate
        );
        assert_eq!(
            FileType::detect("test_files/profile.chunk").unwrap(),
            FileType::AveChunk
        );
        assert_eq!(
            FileType::detect("test_files/histo.dat").unwrap(),
            FileType::AveHisto
        );
        assert_eq!(
            FileType::detect("test_files/butane.data").unwrap(),
            FileType::Data
        );
        assert_eq!(
            FileType::detect("test_files/not_a_dump.lammpstrj").unwrap(),
            FileType::Unknown
        );
    }

    #[test]
    fn detect_nonexistent() {
        match FileType::detect("test_files/nonexistent.data") {
            Err(ReadError::FileNotFound(_)) => (),
            _ => panic!("Nonexistent file was read."),
        }
    }
}
