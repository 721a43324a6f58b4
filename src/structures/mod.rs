// Released under MIT License.
// Copyright (c) 2024 Ladislav Bartos

//! Implementation of various structures used in the `lammps_rs` library.

pub mod histogram;
pub mod simbox;
pub mod table;
pub mod value;
