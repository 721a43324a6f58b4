// Released under MIT License.
// Copyright (c) 2024 Ladislav Bartos

//! Implementation of errors returned by the functions of the `lammps_rs` library.

use colored::{ColoredString, Colorize};
use std::path::Path;
use thiserror::Error;

use crate::data::TopologyKind;

fn path_to_yellow(path: &Path) -> ColoredString {
    path.display().to_string().yellow()
}

/// Errors that can occur when reading LAMMPS output files
/// (log files, dumps, local dumps, and outputs of `fix ave/*` commands).
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ReadError {
    #[error("{} file {} was not found", "error:".red().bold(), path_to_yellow(.0))]
    FileNotFound(Box<Path>),
    #[error("{} could not read file {}", "error:".red().bold(), path_to_yellow(.0))]
    CouldNotRead(Box<Path>),
    #[error("{} file {} ended unexpectedly", "error:".red().bold(), path_to_yellow(.0))]
    UnexpectedEof(Box<Path>),
    #[error("{} file {} is not a valid {} file (unexpected line '{}')", "error:".red().bold(), path_to_yellow(.0), .1.yellow(), .2.yellow())]
    InvalidHeader(Box<Path>, String, String),
    #[error("{} could not parse line '{}'", "error:".red().bold(), .0.yellow())]
    ParseLineErr(String),
    #[error("{} field '{}' is not present", "error:".red().bold(), .0.yellow())]
    MissingField(String),
    #[error("{} expected {} values but found {}", "error:".red().bold(), .0.to_string().yellow(), .1.to_string().yellow())]
    FieldsMismatch(usize, usize),
    #[error("{} runs are numbered from 1, run '{}' is invalid", "error:".red().bold(), .0.to_string().yellow())]
    InvalidRun(usize),
    #[error("{} run '{}' does not exist in the log file", "error:".red().bold(), .0.to_string().yellow())]
    RunNotFound(usize),
    #[error("{} step must be larger than zero", "error:".red().bold())]
    InvalidStep,
}

/// Errors that can occur when reading and parsing a LAMMPS data file.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ParseDataError {
    #[error("{} file {} was not found", "error:".red().bold(), path_to_yellow(.0))]
    FileNotFound(Box<Path>),
    #[error("{} could not read file {}", "error:".red().bold(), path_to_yellow(.0))]
    CouldNotRead(Box<Path>),
    #[error("{} file {} is empty", "error:".red().bold(), path_to_yellow(.0))]
    EmptyFile(Box<Path>),
    #[error("{} could not parse line '{}'", "error:".red().bold(), .0.yellow())]
    ParseLineErr(String),
    #[error("{} atom style '{}' is not supported", "error:".red().bold(), .0.yellow())]
    UnsupportedAtomStyle(String),
    #[error("{} atom '{}' referenced in the data file does not exist", "error:".red().bold(), .0.to_string().yellow())]
    AtomNotFound(usize),
    #[error("{} header declares {} {} but {} were read", "error:".red().bold(), .1.to_string().yellow(), .0.yellow(), .2.to_string().yellow())]
    CountMismatch(String, usize, usize),
}

/// Errors that can occur when writing a LAMMPS data file.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum WriteDataError {
    #[error("{} file {} could not be created", "error:".red().bold(), path_to_yellow(.0))]
    CouldNotCreate(Box<Path>),
    #[error("{} could not write line into file", "error:".red().bold())]
    CouldNotWrite,
    #[error("{} atom type '{}' has no mass while other atom types do", "error:".red().bold(), .0.to_string().yellow())]
    MissingMass(usize),
}

/// Errors that can occur when reading a LAMMPS input file with force field coefficients.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ParseCoeffsError {
    #[error("{} file {} was not found", "error:".red().bold(), path_to_yellow(.0))]
    FileNotFound(Box<Path>),
    #[error("{} could not read file {}", "error:".red().bold(), path_to_yellow(.0))]
    CouldNotRead(Box<Path>),
    #[error("{} could not parse line '{}'", "error:".red().bold(), .0.yellow())]
    ParseLineErr(String),
    #[error("{} type range '{}' is invalid for {} types", "error:".red().bold(), .0.yellow(), .1.to_string().yellow())]
    InvalidRange(String, usize),
    #[error("{} {} '{}' is used by the system but is not defined in the file", "error:".red().bold(), .0, .1.to_string().yellow())]
    TypeNotFound(TopologyKind, usize),
}

/// Errors that can occur when writing a LAMMPS input file with force field coefficients.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum WriteCoeffsError {
    #[error("{} file {} could not be created", "error:".red().bold(), path_to_yellow(.0))]
    CouldNotCreate(Box<Path>),
    #[error("{} could not write line into file", "error:".red().bold())]
    CouldNotWrite,
}

/// Errors that can occur when manipulating the `Data` structure.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum DataError {
    #[error("{} atom '{}' does not exist", "error:".red().bold(), .0.to_string().yellow())]
    AtomNotFound(usize),
    #[error("{} atom type '{}' does not exist", "error:".red().bold(), .0.to_string().yellow())]
    AtomTypeNotFound(usize),
    #[error("{} {} '{}' does not exist", "error:".red().bold(), .0, .1.to_string().yellow())]
    TypeNotFound(TopologyKind, usize),
    #[error("{} atom type '{}' has no comment", "error:".red().bold(), .0.to_string().yellow())]
    MissingComment(usize),
    #[error("{} resetting improper types with style '{}' is not supported", "error:".red().bold(), .0.yellow())]
    UnsupportedImproperStyle(String),
}

/// Errors that can occur when working with tables.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum TableError {
    #[error("{} column '{}' does not exist", "error:".red().bold(), .0.yellow())]
    UnknownColumn(String),
    #[error("{} column '{}' already exists", "error:".red().bold(), .0.yellow())]
    DuplicateColumn(String),
    #[error("{} expected {} values but got {}", "error:".red().bold(), .0.to_string().yellow(), .1.to_string().yellow())]
    LengthMismatch(usize, usize),
    #[error("{} tables do not have the same columns", "error:".red().bold())]
    ColumnsMismatch,
    #[error("{} column '{}' contains non-numeric values", "error:".red().bold(), .0.yellow())]
    NotNumeric(String),
}

/// Errors that can occur when writing a table into a file.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum WriteTableError {
    #[error("{} file {} could not be created", "error:".red().bold(), path_to_yellow(.0))]
    CouldNotCreate(Box<Path>),
    #[error("{} could not write row into file", "error:".red().bold())]
    CouldNotWrite,
}

/// Errors that can occur when writing a dump file.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum WriteDumpError {
    #[error("{} file {} could not be created", "error:".red().bold(), path_to_yellow(.0))]
    CouldNotCreate(Box<Path>),
    #[error("{} could not write line into file", "error:".red().bold())]
    CouldNotWrite,
    #[error("{} could not parse entry of the snapshot", "error:".red().bold())]
    InvalidEntries,
}

/// Errors that can occur when constructing histograms.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum HistogramError {
    #[error("{} number of bins must be larger than zero", "error:".red().bold())]
    InvalidBins,
    #[error("{} histogram range '{}'-'{}' is invalid", "error:".red().bold(), .0.yellow(), .1.yellow())]
    InvalidRange(String, String),
    #[error("{} histograms with different bins can not be merged", "error:".red().bold())]
    IncompatibleHistograms,
    #[error("{} values of field '{}' are not numeric", "error:".red().bold(), .0.yellow())]
    NotNumeric(String),
    #[error("{} histogram range must be provided for parallel reduction", "error:".red().bold())]
    RangeRequired,
    #[error("{} number of threads must be larger than zero", "error:".red().bold())]
    InvalidThreads,
    #[error("{} file {} was not found", "error:".red().bold(), path_to_yellow(.0))]
    FileNotFound(Box<Path>),
    #[error("{} could not parse histogram parameters: {}", "error:".red().bold(), .0)]
    ParseParamsErr(String),
    #[error("{}", .0)]
    ReadError(#[from] ReadError),
}
