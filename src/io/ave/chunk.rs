// Released under MIT License.
// Copyright (c) 2024 Ladislav Bartos

//! Implementation of a reader of `fix ave/chunk` output files.

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

const FORMAT: &str = "ave/chunk";

/// Chunk-averaged data for a single timestep.
#[derive(Debug, Clone, PartialEq, Getters, CopyGetters)]
pub struct AveChunkBlock {
    timestep: u64,
    #[getset(get_copy = "pub")]
    n_chunks: usize,
    /// Total number of atoms in all chunks.
    /// Written as a float since it may be averaged over several samples.
    #[getset(get_copy = "pub")]
    total_count: f64,
    #[getset(get = "pub")]
    values: Table,
}

impl Snapshot for AveChunkBlock {
    fn timestep(&self) -> u64 {
        self.timestep
    }
}

/// Reader of files written by `fix ave/chunk`.
///
/// ## Example
/// Density profile averaged over the whole simulation.
/// ```no_run
/// use lammps_rs::prelude::*;
///
/// let mut profile = vec![0.0; 100];
/// let mut n_blocks = 0;
/// for block in AveChunkReader::open("profile.chunk").unwrap().snapshots() {
///     let density = block.unwrap().values().column_as_array("density/mass").unwrap();
///     for (p, d) in profile.iter_mut().zip(density.iter()) {
///         *p += d;
///     }
///     n_blocks += 1;
/// }
///
/// profile.iter_mut().for_each(|x| *x /= n_blocks as f64);
/// ```
pub struct AveChunkReader {
    source: TextSource,
    description: String,
    fields: Vec<String>,
}

impl AveChunkReader {
    /// Open a `fix ave/chunk` file.
    pub fn open(filename: impl AsRef<Path>) -> Result<AveChunkReader, ReadError> {
        let mut source = TextSource::open(filename)?;
        let description = read_description(&mut source, "# Chunk-averaged data for fix", FORMAT)?;
        expect_header(&mut source, "# Timestep Number-of-chunks Total-count", FORMAT)?;
        let fields = read_fields(&mut source, "# Chunk", FORMAT)?;

        Ok(AveChunkReader {
            source,
            description,
            fields,
        })
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// Names of the quantities. The first field is always `Chunk`.
    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    /// Read all blocks into a table indexed by `TimeStep` and `Chunk`.
    pub fn to_table(self) -> Result<Table, ReadError> {
        let fields = self.fields.clone();
        blocks_to_table(
            self.snapshots()
                .map(|block| block.map(|x| (x.timestep, x.values))),
            &fields,
        )
    }

    fn read_block(&mut self, line: &str) -> Result<AveChunkBlock, ReadError> {
        let timestep = parse_token::<u64>(line, 0)?;
        let n_chunks = parse_token::<usize>(line, 1)?;
        let total_count = parse_token::<f64>(line, 2)?;

        Ok(AveChunkBlock {
            timestep,
            n_chunks,
            total_count,
            values: read_rows(&mut self.source, n_chunks, &self.fields)?,
        })
    }
}

impl SnapshotRead for AveChunkReader {
    type Snapshot = AveChunkBlock;

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
