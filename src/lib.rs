// Released under MIT License.
// Copyright (c) 2024 Ladislav Bartos

//! # lammps_rs: LAMMPS File Library for Rust
//!
//! Rust library for reading, analyzing and writing files used and produced by LAMMPS simulations.
//!
//! ## Usage
//!
//! Run
//!
//! ```bash
//! $ cargo add lammps_rs
//! ```
//!
//! Import the crate in your Rust code:
//! ```
//! use lammps_rs::prelude::*;
//! ```
//!
//! ## Examples
//!
//! #### Reading and modifying a data file
//!
//! Read a data file, merge identical atom and bonded types and write the result.
//!
//! ```no_run
//! use lammps_rs::prelude::*;
//! use std::error::Error;
//!
//! fn main() -> Result<(), Box<dyn Error>> {
//!     // read a data file; the atom style is taken from the `Atoms # style` line
//!     let mut data = Data::from_file("system.data")?;
//!
//!     // read bond coefficients from a separate file
//!     data.read_coeffs(TopologyKind::Bond, "system.bond_coeffs")?;
//!
//!     // merge atom types with identical masses and comments, then merge identical bonded types
//!     data.reset_atom_types()?;
//!     data.reset_all_types(true)?;
//!
//!     // assign molecule ids based on the bonds
//!     data.reset_molecule_ids();
//!
//!     // write the data file including all coefficients
//!     data.write_data("output.data", true)?;
//!
//!     Ok(())
//! }
//! ```
//!
//! #### Reading thermodynamic output
//!
//! Read all thermodynamic records from a log file and calculate the average temperature.
//!
//! ```no_run
//! use lammps_rs::prelude::*;
//! use std::error::Error;
//!
//! fn main() -> Result<(), Box<dyn Error>> {
//!     let table = LogReader::open("log.lammps", None)?.to_table()?;
//!
//!     let temperatures = table.column_as_array("Temp")?;
//!     println!("Average temperature: {:?}", temperatures.mean());
//!
//!     Ok(())
//! }
//! ```
//!
//! #### Iterating through a dump file
//!
//! Read a dump file snapshot by snapshot, printing the progress of the reading.
//!
//! ```no_run
//! use lammps_rs::prelude::*;
//! use std::error::Error;
//!
//! fn main() -> Result<(), Box<dyn Error>> {
//!     for snapshot in DumpReader::open("dump.lammpstrj")?
//!         .snapshots()
//!         .with_step(10)?
//!         .print_progress(ProgressPrinter::new())
//!     {
//!         let snapshot = snapshot?;
//!         println!("{} {}", snapshot.timestep(), snapshot.n_entries());
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! #### Histograms of local quantities
//!
//! Read a `dump local` file and calculate histograms of bond lengths,
//! separately for each bond type.
//!
//! ```no_run
//! use lammps_rs::prelude::*;
//! use std::error::Error;
//!
//! fn main() -> Result<(), Box<dyn Error>> {
//!     let params = HistogramParams::new("c_bond[2]")
//!         .with_bins(100)
//!         .with_group_by("c_bond[1]");
//!     let histograms = DumpLocalReader::open("bonds.dump")?.histograms(&params)?;
//!
//!     for group in histograms.groups() {
//!         println!("{} {:?}", group.group(), group.histogram().counts());
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Error handling
//! Proper error handling and propagation is at heart of the `lammps_rs` library.
//! The individual error types provided by the `lammps_rs` are however not exported into the `prelude` module.
//!
//! If you want to use specific error type from the `lammps_rs` library, you will have to include
//! it explicitly from the `errors` module. For instance, if you want to directly work with errors
//! that can occur when reading a data file, use:
//! ```
//! use lammps_rs::errors::ParseDataError;
//! ```
//!
//! Note that `lammps_rs` will still work correctly even if you do not explicitly include the error types.
//!
//! ## Features
//! - [x] reading and writing data files (`full`, `pqeq`, and `molecular` atom styles)
//! - [x] reading and writing coefficient files (`pair_coeff`, `bond_coeff`, ...)
//! - [x] merging of identical atom and bonded types
//! - [x] reading thermodynamic output from log files
//! - [x] reading and writing dump files
//! - [x] histograms from `dump local` files
//! - [x] reading `fix ave/time`, `fix ave/correlate`, `fix ave/chunk`, and `fix ave/histo` files
//! - [ ] reading binary dump files
//!
//! ## Parallel histograms
//! Enabling the `parallel` feature allows calculating histograms from `dump local` files
//! using multiple threads. See `DumpLocalReader::histograms_parallel`.
//!
//! ## License
//! This library is released under the MIT License.

/// Current version of the `lammps_rs` library.
pub const LAMMPS_RS_VERSION: &str = env!("CARGO_PKG_VERSION");

pub(crate) mod auxiliary;
pub mod data;
pub mod errors;
pub mod files;
pub mod io;
pub mod progress;
pub mod structures;

/// Reexported basic `lammps_rs` structures, traits and enums.
pub mod prelude {
    pub use crate::data::{
        Angle, Atom, AtomStyle, AtomType, Bond, Data, Dihedral, Improper, Interaction,
        InteractionType, PairType, TopologyKind,
    };
    pub use crate::files::FileType;
    pub use crate::io::ave::chunk::{AveChunkBlock, AveChunkReader};
    pub use crate::io::ave::correlate::{AveCorrelateBlock, AveCorrelateReader};
    pub use crate::io::ave::histo::{AveHistoBlock, AveHistoReader};
    pub use crate::io::ave::time::{AveTimeBlock, AveTimeMode, AveTimeReader};
    pub use crate::io::dump_io::{DumpEntries, DumpKind, DumpReader, DumpSnapshot, DumpWriter};
    pub use crate::io::dumplocal_io::{
        DumpLocalReader, GroupHistogram, HistogramParams, LocalHistograms,
    };
    pub use crate::io::log_io::{LogReader, ThermoRecord};
    pub use crate::io::snapshot_io::{
        ProgressPrintable, Snapshot, SnapshotMasterRead, SnapshotRead, SnapshotReader,
        SnapshotStepReader,
    };
    pub use crate::progress::{ProgressPrinter, ProgressStatus};
    pub use crate::structures::histogram::Histogram;
    pub use crate::structures::simbox::SimBox;
    pub use crate::structures::table::{Record, Table};
    pub use crate::structures::value::Value;
}
