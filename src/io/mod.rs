// Released under MIT License.
// Copyright (c) 2024 Ladislav Bartos

//! Implementation of functions for reading and writing LAMMPS input and output files.

pub mod ave;
pub mod coeffs_io;
pub mod data_io;
pub mod dump_io;
pub mod dumplocal_io;
pub mod log_io;
pub mod snapshot_io;
pub(crate) mod source;
