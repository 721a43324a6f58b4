// Released under MIT License.
// Copyright (c) 2024 Ladislav Bartos

//! Traits and iterators for streaming reading of LAMMPS output files, one snapshot at a time.

use crate::errors::ReadError;
use crate::progress::{ProgressPrinter, ProgressStatus};

/**************************/
/*   Snapshot and reading */
/**************************/

/// Trait that must be implemented by structures storing data from a single snapshot
/// (a thermodynamic record, a dump snapshot, a block of `fix ave/*` output).
pub trait Snapshot {
    /// Simulation timestep of the snapshot.
    fn timestep(&self) -> u64;
}

/// Any structure implementing `SnapshotRead` can be used to read a LAMMPS output file snapshot by snapshot.
pub trait SnapshotRead {
    type Snapshot: Snapshot;

    /// Method specifying how the next snapshot of the file should be read.
    ///
    /// The function should return:
    /// - `Some(Ok(Snapshot))` if the snapshot has been successfully read,
    /// - `Some(Err(ReadError))` if the snapshot could not be read,
    /// - `None` if there is nothing more to read.
    fn read_snapshot(&mut self) -> Option<Result<Self::Snapshot, ReadError>>;

    /// Skip the next snapshot of the file.
    ///
    /// The function should return:
    /// - `Ok(true)` if a snapshot was skipped,
    /// - `Ok(false)` if there is nothing more to read,
    /// - `Err(ReadError)` if the snapshot could not be skipped.
    ///
    /// The default implementation reads the snapshot and throws it away.
    /// Readers should override it, if they can skip the snapshot more efficiently.
    fn skip_snapshot(&mut self) -> Result<bool, ReadError> {
        match self.read_snapshot() {
            None => Ok(false),
            Some(Ok(_)) => Ok(true),
            Some(Err(e)) => Err(e),
        }
    }

    /// Convert the reader into an iterator over the snapshots of the file.
    ///
    /// ## Example
    /// ```no_run
    /// use lammps_rs::prelude::*;
    ///
    /// for record in LogReader::open("log.lammps", None).unwrap().snapshots() {
    ///     let record = record.unwrap();
    ///     println!("{} {:?}", record.timestep(), record.get("Temp"));
    /// }
    /// ```
    fn snapshots(self) -> SnapshotReader<Self>
    where
        Self: Sized,
    {
        SnapshotReader::wrap(self)
    }
}

/*************************************/
/*   SnapshotReader (all snapshots)  */
/*************************************/

/// Wrapper for any structure implementing `SnapshotRead` so the `Iterator` trait can be implemented for it.
pub struct SnapshotReader<R: SnapshotRead> {
    pub reader: R,
    progress_printer: Option<ProgressPrinter>,
    snapshot_number: usize,
    last_timestep: u64,
    finished: bool,
}

impl<R: SnapshotRead> SnapshotReader<R> {
    /// Wrap reader implementing `SnapshotRead` into `SnapshotReader` structure.
    pub fn wrap(reader: R) -> SnapshotReader<R> {
        SnapshotReader {
            reader,
            progress_printer: None,
            snapshot_number: 0,
            last_timestep: 0,
            finished: false,
        }
    }

    /// Convert `SnapshotReader` into `SnapshotStepReader` structure which only reads every `step`th snapshot.
    /// Similar to `step_by` but skipped snapshots are not parsed, if the format allows it.
    ///
    /// ## Details
    /// - With `step` set to 1, all snapshots are read.
    /// - With `step` set to 2, every other snapshot is read (first, third, fifth...).
    /// - With `step` set to 3, every third snapshot is read, and so on.
    ///
    /// If the `step` is zero, returns `ReadError::InvalidStep`.
    pub fn with_step(self, step: usize) -> Result<SnapshotStepReader<R>, ReadError> {
        // step must be larger than 0
        if step == 0 {
            return Err(ReadError::InvalidStep);
        }

        Ok(SnapshotStepReader {
            reader: self.reader,
            skip: step - 1,
            progress_printer: self.progress_printer,
            snapshot_number: self.snapshot_number,
            last_timestep: self.last_timestep,
            finished: self.finished,
        })
    }
}

/// Iterate the `SnapshotReader`.
impl<R: SnapshotRead> Iterator for SnapshotReader<R> {
    type Item = Result<R::Snapshot, ReadError>;

    /// Read the next snapshot of the file.
    ///
    /// ## Returns
    /// - `Some(Ok(Snapshot))` if the snapshot has been successfully read.
    /// - `Some(Err(ReadError))` if the snapshot could not be read. Iteration then stops.
    /// - `None` if the end of the file has been reached.
    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        let result = self.reader.read_snapshot();
        self.finished = !matches!(result, Some(Ok(_)));
        if let Some(Ok(snapshot)) = &result {
            self.last_timestep = snapshot.timestep();
            self.snapshot_number += 1;
        }

        self.progress_set(result.as_ref().map(|x| x.is_ok()));
        self.progress_print(self.snapshot_number, self.last_timestep);

        result
    }
}

/******************************************/
/*   SnapshotStepReader (every nth one)   */
/******************************************/

/// Structure for reading of LAMMPS output files with steps between snapshots.
pub struct SnapshotStepReader<R: SnapshotRead> {
    pub reader: R,
    /// Corresponds to the number of snapshots that should be skipped after reading a snapshot.
    /// - `skip = 0` => all snapshots will be read
    /// - `skip = 1` => every other snapshot will be read
    pub skip: usize,
    progress_printer: Option<ProgressPrinter>,
    snapshot_number: usize,
    last_timestep: u64,
    finished: bool,
}

/// Iterate the `SnapshotStepReader`.
impl<R: SnapshotRead> Iterator for SnapshotStepReader<R> {
    type Item = Result<R::Snapshot, ReadError>;

    /// Read the next snapshot of the file. Then skip the specified number of snapshots.
    ///
    /// ## Returns
    /// - `Some(Ok(Snapshot))` if the snapshot has been successfully read.
    /// - `Some(Err(ReadError))` if the snapshot could not be read or skipped. Iteration then stops.
    /// - `None` if the end of the file has been reached.
    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        let mut result = self.reader.read_snapshot();

        if let Some(Ok(snapshot)) = &result {
            self.last_timestep = snapshot.timestep();
            self.snapshot_number += 1;

            // skip the next n snapshots
            for _ in 0..self.skip {
                match self.reader.skip_snapshot() {
                    Ok(true) => continue,
                    // EOF reached
                    Ok(false) => break,
                    Err(e) => {
                        result = Some(Err(e));
                        break;
                    }
                }
            }
        }

        self.finished = !matches!(result, Some(Ok(_)));

        self.progress_set(result.as_ref().map(|x| x.is_ok()));
        self.progress_print(self.snapshot_number, self.last_timestep);

        result
    }
}

/***************************************/
/*      SnapshotMasterRead trait       */
/***************************************/

/// This trait is implemented by all snapshot iterators so they can be used in generic functions.
pub trait SnapshotMasterRead<S: Snapshot>:
    Iterator<Item = Result<S, ReadError>> + ProgressPrintable
{
    /// Print progress of the reading. This can be applied to any snapshot iterator.
    ///
    /// ## Example
    /// ```no_run
    /// use lammps_rs::prelude::*;
    ///
    /// // information will be printed every 10 snapshots
    /// let printer = ProgressPrinter::new().with_print_freq(10);
    ///
    /// for snapshot in DumpReader::open("dump.lammpstrj")
    ///     .unwrap()
    ///     .snapshots()
    ///     .print_progress(printer)
    /// {
    ///     let snapshot = snapshot.unwrap();
    ///
    ///     // perform some analysis
    /// }
    /// ```
    fn print_progress(mut self, printer: ProgressPrinter) -> Self
    where
        Self: Sized,
    {
        self.set_progress_printer(printer);
        self
    }
}

impl<R: SnapshotRead> SnapshotMasterRead<R::Snapshot> for SnapshotReader<R> {}
impl<R: SnapshotRead> SnapshotMasterRead<R::Snapshot> for SnapshotStepReader<R> {}

/***************************************/
/*       ProgressPrintable trait       */
/***************************************/

/// This trait is implemented for all snapshot iterators and
/// allows for printing of the progress of the reading.
pub trait ProgressPrintable {
    /// Set the status of the progress printer according to the result of the reading.
    /// `None` means the end of the file, `Some(false)` means an error.
    fn progress_set(&mut self, result: Option<bool>) {
        if let Some(printer) = self.get_progress_printer_mut() {
            match result {
                None => printer.set_status(ProgressStatus::Completed),
                Some(false) => printer.set_status(ProgressStatus::Failed),
                Some(true) => (),
            }
        }
    }

    /// Print the current progress of the reading.
    fn progress_print(&mut self, snapshot_number: usize, timestep: u64) {
        if let Some(printer) = self.get_progress_printer_mut() {
            printer.print(snapshot_number, timestep)
        }
    }

    /// Return mutable reference to the progress printer associated with the iterator.
    fn get_progress_printer_mut(&mut self) -> Option<&mut ProgressPrinter>;

    /// Associate progress printer with the iterator.
    fn set_progress_printer(&mut self, printer: ProgressPrinter);
}

impl<R: SnapshotRead> ProgressPrintable for SnapshotReader<R> {
    fn get_progress_printer_mut(&mut self) -> Option<&mut ProgressPrinter> {
        self.progress_printer.as_mut()
    }

    fn set_progress_printer(&mut self, printer: ProgressPrinter) {
        self.progress_printer = Some(printer);
    }
}

impl<R: SnapshotRead> ProgressPrintable for SnapshotStepReader<R> {
    fn get_progress_printer_mut(&mut self) -> Option<&mut ProgressPrinter> {
        self.progress_printer.as_mut()
    }

    fn set_progress_printer(&mut self, printer: ProgressPrinter) {
        self.progress_printer = Some(printer);
    }
}

/******************************/
/*         UNIT TESTS         */
/******************************/
