// Released under MIT License.
// Copyright (c) 2024 Ladislav Bartos

//! Implementation of a reader of `fix ave/histo` output files.

use std::path::Path;

use getset::{CopyGetters, Getters};
use tracing::warn;

use crate::errors::ReadError;
use crate::io::ave::{
    blocks_to_table, expect_header, next_block_line, parse_count, parse_token, read_description,
    read_rows,
};
use crate::io::snapshot_io::{Snapshot, SnapshotRead};
use crate::io::source::TextSource;
use crate::structures::histogram::trapezoid;
use crate::structures::table::Table;
use crate::structures::value::Value;

const FORMAT: &str = "ave/histo";

/// Histogrammed data for a single timestep.
#[derive(Debug, Clone, PartialEq, Getters, CopyGetters)]
pub struct AveHistoBlock {
    timestep: u64,
    #[getset(get_copy = "pub")]
    n_bins: usize,
    #[getset(get_copy = "pub")]
    total_counts: u64,
    /// Number of values that were outside the range of the histogram.
    #[getset(get_copy = "pub")]
    missing_counts: u64,
    #[getset(get_copy = "pub")]
    min_value: f64,
    #[getset(get_copy = "pub")]
    max_value: f64,
    /// Columns `Bin`, `Coord`, `Count`, and `Count/Total`.
    #[getset(get = "pub")]
    values: Table,
}

impl Snapshot for AveHistoBlock {
    fn timestep(&self) -> u64 {
        self.timestep
    }
}

impl AveHistoBlock {
    /// Calculate the probability density of the histogram, i.e. `Count`
    /// normalized so that its integral over `Coord` is 1.
    pub fn norm(&self) -> Result<Vec<f64>, ReadError> {
        let coords = self
            .values
            .column_as_array("Coord")
            .map_err(|_| ReadError::MissingField(String::from("Coord")))?;
        let counts = self
            .values
            .column_as_array("Count")
            .map_err(|_| ReadError::MissingField(String::from("Count")))?;

        let area = trapezoid(counts.as_slice().unwrap_or(&[]), coords.as_slice().unwrap_or(&[]));
        Ok(counts.iter().map(|c| c / area).collect())
    }
}

/// Reader of files written by `fix ave/histo`.
///
/// ## Notes
/// - A warning is logged for every block with non-zero missing counts.
pub struct AveHistoReader {
    source: TextSource,
    description: String,
    fields: Vec<String>,
}

impl AveHistoReader {
    /// Open a `fix ave/histo` file.
    pub fn open(filename: impl AsRef<Path>) -> Result<AveHistoReader, ReadError> {
        let mut source = TextSource::open(filename)?;
        let description = read_description(&mut source, "# Histogrammed data for fix", FORMAT)?;
        expect_header(
            &mut source,
            "# TimeStep Number-of-bins Total-counts Missing-counts Min-value Max-value",
            FORMAT,
        )?;
        expect_header(&mut source, "# Bin Coord Count Count/Total", FORMAT)?;

        Ok(AveHistoReader {
            source,
            description,
            fields: ["Bin", "Coord", "Count", "Count/Total"]
                .into_iter()
                .map(String::from)
                .collect(),
        })
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    /// Read all blocks into a table indexed by `TimeStep` and `Bin`.
    /// If `norm` is `true`, column `Norm` with the probability density of each block is added.
    pub fn to_table(self, norm: bool) -> Result<Table, ReadError> {
        let fields = self.fields.clone();
        blocks_to_table(
            self.snapshots()
                .map(|block| -> Result<(u64, Table), ReadError> {
                    let block = block?;
                    let density = if norm { Some(block.norm()?) } else { None };

                    let mut values = block.values;
                    if let Some(density) = density {
                        values
                            .add_column("Norm", density.into_iter().map(Value::Float).collect())
                            .map_err(|_| ReadError::MissingField(String::from("Norm")))?;
                    }

                    Ok((block.timestep, values))
                }),
            &fields,
        )
    }

    fn read_block(&mut self, line: &str) -> Result<AveHistoBlock, ReadError> {
        let timestep = parse_token::<u64>(line, 0)?;
        let n_bins = parse_token::<usize>(line, 1)?;
        let total_counts = parse_count(line, 2)?;
        let missing_counts = parse_count(line, 3)?;
        let min_value = parse_token::<f64>(line, 4)?;
        let max_value = parse_token::<f64>(line, 5)?;

        if missing_counts != 0 {
            warn!(
                "{}: {} values outside of the histogram range at timestep {}",
                self.source.path().display(),
                missing_counts,
                timestep
            );
        }

        Ok(AveHistoBlock {
            timestep,
            n_bins,
            total_counts,
            missing_counts,
            min_value,
            max_value,
            values: read_rows(&mut self.source, n_bins, &self.fields)?,
        })
    }
}

impl SnapshotRead for AveHistoReader {
    type Snapshot = AveHistoBlock;

    fn read_snapshot(&mut self) -> Option<Result<Self::Snapshot, ReadError>> {
        match next_block_line(&mut self.source) {
            Ok(Some(line)) => Some(self.read_block(&line)),
            Ok(None) => None,
            Err(e) => Some(Err(e)),
        }
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

/******************************/
/*         UNIT TESTS         */
/******************************/

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::assert_approx_eq;

    fn read_all() -> Vec<AveHistoBlock> {
        AveHistoReader::open("test_files/histo.dat")
            .unwrap()
            .snapshots()
            .map(|x| x.unwrap())
            .collect()
    }

    #[test]
    fn read() {
        let blocks = read_all();
        assert_eq!(blocks.len(), 2);

        let first = &blocks[0];
        assert_eq!(first.timestep(), 100);
        assert_eq!(first.n_bins(), 4);
        // written in scientific notation
        assert_eq!(first.total_counts(), 10);
        assert_eq!(first.missing_counts(), 0);
        assert_approx_eq!(f64, first.min_value(), 0.1);
        assert_approx_eq!(f64, first.max_value(), 3.9);
        assert_eq!(first.values().get(1, "Count"), Some(&Value::Int(4)));

        let second = &blocks[1];
        assert_eq!(second.missing_counts(), 2);
        assert_approx_eq!(f64, second.min_value(), -0.5);
        assert_eq!(second.values().get(3, "Count/Total"), Some(&Value::Float(0.25)));
    }

    #[test]
    fn norm() {
        let blocks = read_all();

        let norm = blocks[0].norm().unwrap();
        let expected = [1.0 / 8.5, 4.0 / 8.5, 3.0 / 8.5, 2.0 / 8.5];
        for (n, e) in norm.iter().zip(expected.iter()) {
            assert_approx_eq!(f64, *n, *e);
        }

        for n in blocks[1].norm().unwrap() {
            assert_approx_eq!(f64, n, 1.0 / 3.0);
        }
    }

    #[test]
    fn to_table() {
        let table = AveHistoReader::open("test_files/histo.dat")
            .unwrap()
            .to_table(true)
            .unwrap();

        assert_eq!(table.n_rows(), 8);
        assert_eq!(table.get_index_names(), &["TimeStep", "Bin"]);
        assert_eq!(
            table.get_column_names(),
            vec!["TimeStep", "Bin", "Coord", "Count", "Count/Total", "Norm"]
        );

        let norm = table.column_as_array("Norm").unwrap();
        assert_approx_eq!(f64, norm[1], 4.0 / 8.5);
        assert_approx_eq!(f64, norm[7], 1.0 / 3.0);
    }

    #[test]
    fn to_table_no_norm() {
        let table = AveHistoReader::open("test_files/histo.dat")
            .unwrap()
            .to_table(false)
            .unwrap();

        assert_eq!(
            table.get_column_names(),
            vec!["TimeStep", "Bin", "Coord", "Count", "Count/Total"]
        );
    }

    #[test]
    fn invalid() {
        match AveHistoReader::open("test_files/profile.chunk") {
            Err(ReadError::InvalidHeader(_, format, _)) => assert_eq!(format, "ave/histo"),
            _ => panic!("Invalid file was opened."),
        }
    }
}
