// Released under MIT License.
// Copyright (c) 2024 Ladislav Bartos

//! Implementation of a reader of `fix ave/correlate` and `fix ave/correlate/long` output files.

use std::path::Path;

use getset::{CopyGetters, Getters};

use crate::errors::ReadError;
use crate::io::ave::{
    blocks_to_table, expect_header, next_block_line, parse_token, read_description, read_fields,
    read_rows,
};
use crate::io::snapshot_io::{Snapshot, SnapshotRead};
use crate::io::source::TextSource;
use crate::structures::table::Table;

const FORMAT: &str = "ave/correlate";

/// Time-correlated data for a single timestep.
#[derive(Debug, Clone, PartialEq, Getters, CopyGetters)]
pub struct AveCorrelateBlock {
    timestep: u64,
    #[getset(get_copy = "pub")]
    n_windows: usize,
    #[getset(get = "pub")]
    values: Table,
}

impl Snapshot for AveCorrelateBlock {
    fn timestep(&self) -> u64 {
        self.timestep
    }
}

/// Reader of files written by `fix ave/correlate`.
pub struct AveCorrelateReader {
    source: TextSource,
    description: String,
    fields: Vec<String>,
}

impl AveCorrelateReader {
    pub fn open(filename: impl AsRef<Path>) -> Result<AveCorrelateReader, ReadError> {
        let mut source = TextSource::open(filename)?;
        let description = read_description(&mut source, "# Time-correlated data for fix", FORMAT)?;
        expect_header(&mut source, "# Timestep Number-of-time-windows", FORMAT)?;
        let fields = read_fields(&mut source, "# Index", FORMAT)?;

        Ok(AveCorrelateReader {
            source,
            description,
            fields,
        })
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    /// Read all blocks into a table indexed by `TimeStep` and `Index`.
    pub fn to_table(self) -> Result<Table, ReadError> {
        let fields = self.fields.clone();
        blocks_to_table(
            self.snapshots()
                .map(|block| block.map(|x| (x.timestep, x.values))),
            &fields,
        )
    }
}

impl SnapshotRead for AveCorrelateReader {
    type Snapshot = AveCorrelateBlock;

    fn read_snapshot(&mut self) -> Option<Result<Self::Snapshot, ReadError>> {
        let line = match next_block_line(&mut self.source) {
            Ok(Some(x)) => x,
            Ok(None) => return None,
            Err(e) => return Some(Err(e)),
        };

        Some(self.read_block(&line))
    }

    fn skip_snapshot(&mut self) -> Result<bool, ReadError> {
        match next_block_line(&mut self.source)? {
            None => Ok(false),
            Some(line) => {
                self.source.skip_lines(parse_token::<usize>(&line, 1)?)?;
                Ok(true)
            }
        }
    }
}

impl AveCorrelateReader {
    fn read_block(&mut self, line: &str) -> Result<AveCorrelateBlock, ReadError> {
        let timestep = parse_token::<u64>(line, 0)?;
        let n_windows = parse_token::<usize>(line, 1)?;

        Ok(AveCorrelateBlock {
            timestep,
            n_windows,
            values: read_rows(&mut self.source, n_windows, &self.fields)?,
        })
    }
}

/******************************/
/*         UNIT TESTS         */
/******************************/

#[cfg(test)]
mod tests {
    use super::*;
    use crate::structures::value::Value;

    #[test]
    fn read() {
        let reader = AveCorrelateReader::open("test_files/vacf.correlate").unwrap();
        assert_eq!(reader.description(), "Time-correlated data for fix vacf");
        assert_eq!(reader.fields(), &["Index", "TimeDelta", "Ncount", "c_vx*c_vx"]);

        let blocks: Vec<AveCorrelateBlock> = reader.snapshots().map(|x| x.unwrap()).collect();
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].timestep(), 100);
        assert_eq!(blocks[0].n_windows(), 3);
        assert_eq!(blocks[1].values().get(2, "Ncount"), Some(&Value::Int(19)));
        assert_eq!(blocks[1].values().get(2, "c_vx*c_vx"), Some(&Value::Float(0.45)));
    }

    #[test]
    fn skip() {
        let timesteps: Vec<u64> = AveCorrelateReader::open("test_files/vacf.correlate")
            .unwrap()
            .snapshots()
            .with_step(2)
            .unwrap()
            .map(|x| x.unwrap().timestep())
            .collect();

        assert_eq!(timesteps, vec![100]);
    }

    #[test]
    fn to_table() {
        let table = AveCorrelateReader::open("test_files/vacf.correlate")
            .unwrap()
            .to_table()
            .unwrap();

        assert_eq!(table.n_rows(), 6);
        assert_eq!(table.get_index_names(), &["TimeStep", "Index"]);
        assert_eq!(
            table.get_column_names(),
            vec!["TimeStep", "Index", "TimeDelta", "Ncount", "c_vx*c_vx"]
        );
        assert_eq!(table.get(3, "TimeStep"), Some(&Value::Int(200)));
        assert_eq!(table.get(3, "Ncount"), Some(&Value::Int(21)));
    }

    #[test]
    fn invalid() {
        match AveCorrelateReader::open("test_files/rdf.time") {
            Err(ReadError::InvalidHeader(_, format, _)) => assert_eq!(format, "ave/correlate"),
            _ => panic!("Invalid file was opened."),
        }
    }
}
