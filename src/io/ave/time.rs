// Released under MIT License.
// Copyright (c) 2024 Ladislav Bartos

//! Implementation of a reader of `fix ave/time` output files.

use std::path::Path;

use getset::{CopyGetters, Getters};

use crate::errors::ReadError;
use crate::io::ave::{
    blocks_to_table, next_block_line, parse_row, parse_token, read_description, read_fields,
    read_rows,
};
use crate::io::snapshot_io::{Snapshot, SnapshotRead};
use crate::io::source::TextSource;
use crate::structures::table::Table;
use crate::structures::value::Value;

const FORMAT: &str = "ave/time";
const DESCRIPTION: &str = "# Time-averaged data for fix";
const VECTOR_HEADER: &str = "# TimeStep Number-of-rows";
const SCALAR_PREFIX: &str = "# TimeStep";

/// Mode of the `fix ave/time` command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AveTimeMode {
    /// Each timestep is followed by several rows of values (`mode vector`).
    Vector,
    /// Each timestep is written as a single line (`mode scalar`).
    Scalar,
}

/// Time-averaged data for a single timestep.
#[derive(Debug, Clone, PartialEq, Getters, CopyGetters)]
pub struct AveTimeBlock {
    timestep: u64,
    /// Number of rows of the block. `None` in scalar mode.
    #[getset(get_copy = "pub")]
    n_rows: Option<usize>,
    #[getset(get = "pub")]
    values: Table,
}

impl Snapshot for AveTimeBlock {
    fn timestep(&self) -> u64 {
        self.timestep
    }
}

/// Reader of files written by `fix ave/time`.
pub struct AveTimeReader {
    source: TextSource,
    mode: AveTimeMode,
    description: String,
    fields: Vec<String>,
}

impl AveTimeReader {
    /// Open a `fix ave/time` file. The mode of the file is detected from its header.
    ///
    /// ## Example
    /// ```no_run
    /// use lammps_rs::prelude::*;
    ///
    /// let table = AveTimeReader::open("rdf.time").unwrap().to_table().unwrap();
    /// table.write_csv("rdf.csv").unwrap();
    /// ```
    pub fn open(filename: impl AsRef<Path>) -> Result<AveTimeReader, ReadError> {
        AveTimeReader::open_internal(filename, None)
    }

    /// Open a `fix ave/time` file written in the specified mode.
    /// Returns `ReadError::InvalidHeader` if the file was written in a different mode.
    pub fn open_with_mode(
        filename: impl AsRef<Path>,
        mode: AveTimeMode,
    ) -> Result<AveTimeReader, ReadError> {
        AveTimeReader::open_internal(filename, Some(mode))
    }

    fn open_internal(
        filename: impl AsRef<Path>,
        mode: Option<AveTimeMode>,
    ) -> Result<AveTimeReader, ReadError> {
        let mut source = TextSource::open(filename)?;
        let description = read_description(&mut source, DESCRIPTION, FORMAT)?;

        let line = source.read_line()?.unwrap_or_default();
        let detected = if line.trim() == VECTOR_HEADER {
            AveTimeMode::Vector
        } else if line.starts_with(SCALAR_PREFIX) {
            AveTimeMode::Scalar
        } else {
            return Err(source.invalid_header(FORMAT, &line));
        };

        if mode.is_some_and(|x| x != detected) {
            return Err(source.invalid_header(FORMAT, &line));
        }

        let fields = match detected {
            AveTimeMode::Vector => read_fields(&mut source, "# Row", FORMAT)?,
            AveTimeMode::Scalar => line[SCALAR_PREFIX.len()..]
                .split_whitespace()
                .map(String::from)
                .collect(),
        };

        Ok(AveTimeReader {
            source,
            mode: detected,
            description,
            fields,
        })
    }

    /// Get the mode of the file.
    pub fn mode(&self) -> AveTimeMode {
        self.mode
    }

    /// Get the description of the fix from the first line of the file.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Get the names of the quantities.
    /// In vector mode, the first field is the row index (`Row`).
    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    /// Read all blocks into a table.
    ///
    /// ## Notes
    /// - In vector mode, the table is indexed by `TimeStep` and the first field (`Row`).
    /// - In scalar mode, the table has columns `TimeStep` followed by the fields and no index.
    pub fn to_table(self) -> Result<Table, ReadError> {
        let fields = self.fields.clone();

        match self.mode {
            AveTimeMode::Vector => blocks_to_table(
                self.snapshots()
                    .map(|block| block.map(|x| (x.timestep, x.values))),
                &fields,
            ),
            AveTimeMode::Scalar => {
                let mut columns = vec![String::from("TimeStep")];
                columns.extend(fields);

                let mut table = Table::new(&columns);
                for block in self.snapshots() {
                    let block = block?;
                    let mut row = vec![Value::Int(block.timestep as i64)];
                    if let Some(values) = block.values.row(0) {
                        row.extend(values.into_iter().cloned());
                    }

                    table
                        .push_row(row)
                        .map_err(|_| ReadError::FieldsMismatch(columns.len(), 0))?;
                }

                Ok(table)
            }
        }
    }
}

impl SnapshotRead for AveTimeReader {
    type Snapshot = AveTimeBlock;

    fn read_snapshot(&mut self) -> Option<Result<Self::Snapshot, ReadError>> {
        let line = match next_block_line(&mut self.source) {
            Ok(Some(x)) => x,
            Ok(None) => return None,
            Err(e) => return Some(Err(e)),
        };

        Some(self.read_block(&line))
    }

    fn skip_snapshot(&mut self) -> Result<bool, ReadError> {
        let line = match next_block_line(&mut self.source)? {
            Some(x) => x,
            None => return Ok(false),
        };

        if self.mode == AveTimeMode::Vector {
            let n_rows = parse_token::<usize>(&line, 1)?;
            self.source.skip_lines(n_rows)?;
        }

        Ok(true)
    }
}

impl AveTimeReader {
    fn read_block(&mut self, line: &str) -> Result<AveTimeBlock, ReadError> {
        let timestep = parse_token::<u64>(line, 0)?;

        match self.mode {
            AveTimeMode::Vector => {
                let n_rows = parse_token::<usize>(line, 1)?;
                Ok(AveTimeBlock {
                    timestep,
                    n_rows: Some(n_rows),
                    values: read_rows(&mut self.source, n_rows, &self.fields)?,
                })
            }
            AveTimeMode::Scalar => {
                let rest = line
                    .split_whitespace()
                    .skip(1)
                    .collect::<Vec<&str>>()
                    .join(" ");

                let mut values = Table::new(&self.fields);
                values
                    .push_row(parse_row(&rest, self.fields.len())?)
                    .map_err(|_| ReadError::ParseLineErr(line.to_owned()))?;

                Ok(AveTimeBlock {
                    timestep,
                    n_rows: None,
                    values,
                })
            }
        }
    }
}

/******************************/
/*         UNIT TESTS         */
/******************************/
