// Released under MIT License.
// Copyright (c) 2024 Ladislav Bartos

//! Implementation of a reader of thermodynamic output from LAMMPS log files.

use std::path::Path;

use getset::{CopyGetters, Getters};
use indexmap::IndexMap;
use tracing::{error, warn};

use crate::errors::ReadError;
use crate::io::snapshot_io::{Snapshot, SnapshotRead};
use crate::io::source::TextSource;
use crate::structures::table::{Record, Table};
use crate::structures::value::Value;

/// Thermodynamic information printed by LAMMPS for a single timestep.
#[derive(Debug, Clone, PartialEq, Getters, CopyGetters)]
pub struct ThermoRecord {
    /// Index of the run this record belongs to (starting from 1).
    #[getset(get_copy = "pub")]
    run: usize,
    /// Thermodynamic quantities in the order in which they are printed.
    #[getset(get = "pub")]
    values: IndexMap<String, f64>,
}

impl ThermoRecord {
    /// Get the value of a thermodynamic quantity.
    pub fn get(&self, field: &str) -> Option<f64> {
        self.values.get(field).copied()
    }
}

impl Snapshot for ThermoRecord {
    /// Value of `Step` or 0 if `Step` is not printed.
    fn timestep(&self) -> u64 {
        self.get("Step").map(|x| x as u64).unwrap_or(0)
    }
}

/// Reader of one-line thermodynamic output from LAMMPS log files.
///
/// ## Notes
/// - Thermodynamic output is expected right after the line reporting memory usage
///   (`Per MPI rank memory allocation` or `Memory usage per processor`).
/// - Each thermodynamic block ends with a line starting with `Loop`.
/// - Lines starting with `WARNING` are reported and ignored.
/// - Line starting with `ERROR` is reported and ends the reading.
pub struct LogReader {
    source: TextSource,
    /// Target run. `None` if all runs should be read.
    run: Option<usize>,
    /// Index of the current run.
    current_run: usize,
    /// Names of the printed quantities. `None` if currently outside of a thermodynamic block.
    fields: Option<Vec<String>>,
    finished: bool,
}

impl LogReader {
    /// Open a LAMMPS log file.
    ///
    /// ## Parameters
    /// - `run`: index of the run to read (starting from 1). If `None`, all runs are read one after another.
    ///
    /// ## Returns
    /// - `LogReader` if the file has been successfully opened.
    /// - `ReadError::InvalidRun` if `run` is `Some(0)`.
    /// - `ReadError::RunNotFound` if the requested run does not exist.
    ///
    /// ## Example
    /// Read all thermodynamic records of the second run.
    /// ```no_run
    /// use lammps_rs::prelude::*;
    ///
    /// let reader = LogReader::open("log.lammps", Some(2)).unwrap();
    /// for record in reader.snapshots() {
    ///     let record = record.unwrap();
    ///     println!("{} {}", record.timestep(), record.get("Temp").unwrap());
    /// }
    /// ```
    pub fn open(filename: impl AsRef<Path>, run: Option<usize>) -> Result<LogReader, ReadError> {
        if run == Some(0) {
            return Err(ReadError::InvalidRun(0));
        }

        let mut reader = LogReader {
            source: TextSource::open(filename)?,
            run,
            current_run: 0,
            fields: None,
            finished: false,
        };

        if let Some(target) = run {
            while reader.current_run < target {
                if !reader.seek_block()? {
                    return Err(ReadError::RunNotFound(target));
                }
            }
        }

        Ok(reader)
    }

    /// Read the entire log file (or the target run) into a table.
    /// Quantities not printed in some runs are filled with `NaN`.
    pub fn to_table(self) -> Result<Table, ReadError> {
        let mut table = Table::default();
        for record in self.snapshots() {
            let record = record?;
            table.push_record(
                record
                    .values
                    .into_iter()
                    .map(|(k, v)| (k, Value::Float(v)))
                    .collect::<Record>(),
            );
        }

        Ok(table)
    }

    /// Move to the start of the next thermodynamic block.
    /// Returns `false` if there is no other block to read.
    fn seek_block(&mut self) -> Result<bool, ReadError> {
        while let Some(line) = self.source.read_line()? {
            let trimmed = line.trim_start();

            if trimmed.starts_with("Per MPI rank memory allocation")
                || trimmed.starts_with("Memory usage per processor")
            {
                let header = self.source.expect_line()?;
                self.fields = Some(header.split_whitespace().map(String::from).collect());
                self.current_run += 1;
                return Ok(true);
            }

            if !self.check_message(trimmed) {
                return Ok(false);
            }
        }

        Ok(false)
    }

    /// Report warnings and errors written in the log file.
    /// Returns `false` if an error has been encountered.
    fn check_message(&mut self, line: &str) -> bool {
        if line.starts_with("WARNING") {
            warn!("{}: {}", self.source.path().display(), line);
        } else if line.starts_with("ERROR") {
            error!("{}: {}", self.source.path().display(), line);
            self.finished = true;
            return false;
        }

        true
    }
}

impl SnapshotRead for LogReader {
    type Snapshot = ThermoRecord;

    fn read_snapshot(&mut self) -> Option<Result<Self::Snapshot, ReadError>> {
        loop {
            if self.finished {
                return None;
            }

            if self.fields.is_none() {
                match self.seek_block() {
                    Ok(true) => continue,
                    Ok(false) => {
                        self.finished = true;
                        return None;
                    }
                    Err(e) => {
                        self.finished = true;
                        return Some(Err(e));
                    }
                }
            }

            let line = match self.source.read_line() {
                Ok(Some(x)) => x,
                Ok(None) => {
                    self.finished = true;
                    return None;
                }
                Err(e) => {
                    self.finished = true;
                    return Some(Err(e));
                }
            };

            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }

            if trimmed.starts_with("Loop") {
                self.fields = None;
                if self.run.is_some() {
                    self.finished = true;
                }
                continue;
            }

            if !self.check_message(trimmed) || trimmed.starts_with("WARNING") {
                continue;
            }

            let parsed = trimmed
                .split_whitespace()
                .map(|x| x.parse::<f64>())
                .collect::<Result<Vec<f64>, _>>();

            let numbers = match parsed {
                Ok(x) => x,
                Err(_) => {
                    warn!(
                        "{}: skipping line '{}' inside thermodynamic output",
                        self.source.path().display(),
                        trimmed
                    );
                    continue;
                }
            };

            let fields = self.fields.as_ref()?;
            let values = fields.iter().cloned().zip(numbers).collect();

            return Some(Ok(ThermoRecord {
                run: self.current_run,
                values,
            }));
        }
    }
}

/******************************/
/*         UNIT TESTS         */
/******************************/
