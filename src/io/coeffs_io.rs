// Released under MIT License.
// Copyright (c) 2024 Ladislav Bartos

//! Implementation of functions for reading and writing LAMMPS input files
//! with force field coefficients (`pair_coeff`, `bond_coeff`, ...).

use std::fs::File;
use std::io::{BufWriter, Write};
use std::ops::RangeInclusive;
use std::path::Path;

use indexmap::IndexMap;
use regex::Regex;
use tracing::info;

use crate::auxiliary::{comment_suffix, split_comment};
use crate::data::{Data, InteractionType, PairType, TopologyKind};
use crate::errors::{ParseCoeffsError, ReadError, WriteCoeffsError};
use crate::io::data_io::{distinct_styles, format_coeffs, parse_coeff_tokens, style_column};
use crate::io::source::TextSource;

/// Matches type ranges using wildcards: `*`, `n*`, `*m`, and `n*m`.
const WILDCARD: &str = r"^(\d*)\*(\d*)$";

fn source_error(error: ReadError) -> ParseCoeffsError {
    match error {
        ReadError::FileNotFound(path) => ParseCoeffsError::FileNotFound(path),
        ReadError::CouldNotRead(path) | ReadError::UnexpectedEof(path) => {
            ParseCoeffsError::CouldNotRead(path)
        }
        other => panic!(
            "FATAL LAMMPS_RS ERROR | coeffs_io::source_error | Unexpected error when reading a coefficient file: {:?}",
            other
        ),
    }
}

/// Expand a type id or a wildcard range into a range of type ids.
/// All ids must lie between 1 and `n_types`.
fn expand_ids(
    token: &str,
    n_types: usize,
    wildcard: &Regex,
) -> Result<RangeInclusive<usize>, ParseCoeffsError> {
    let invalid = || ParseCoeffsError::InvalidRange(token.to_owned(), n_types);

    let (lo, hi) = match wildcard.captures(token) {
        Some(captures) => {
            let bound = |index: usize, default: usize| -> Result<usize, ParseCoeffsError> {
                match captures.get(index).map(|x| x.as_str()) {
                    None | Some("") => Ok(default),
                    Some(x) => x.parse::<usize>().map_err(|_| invalid()),
                }
            };
            (bound(1, 1)?, bound(2, n_types)?)
        }
        None => {
            let id = token.parse::<usize>().map_err(|_| invalid())?;
            (id, id)
        }
    };

    if lo == 0 || lo > hi || hi > n_types {
        return Err(invalid());
    }

    Ok(lo..=hi)
}

/// Read the lines of a coefficient file starting with `command`.
/// Returns the tokens following the command and the comment of each line.
fn read_command_lines(
    filename: impl AsRef<Path>,
    command: &str,
) -> Result<Vec<(Vec<String>, Option<String>)>, ParseCoeffsError> {
    let mut source = TextSource::open(filename).map_err(source_error)?;
    let mut lines = Vec::new();

    while let Some(line) = source.read_line().map_err(source_error)? {
        let (content, comment) = split_comment(&line);
        let mut tokens = content.split_whitespace();
        if tokens.next() != Some(command) {
            continue;
        }

        lines.push((tokens.map(str::to_owned).collect(), comment));
    }

    Ok(lines)
}

/// ## Methods for reading and writing force field coefficients.
impl Data {
    /// Read pair coefficients from a LAMMPS input file (lines starting with `pair_coeff`).
    ///
    /// Atom types may be specified using wildcards (`*`, `n*`, `*m`, `n*m`).
    /// Later lines override earlier lines for the same pair of atom types.
    /// The pair types read replace all pair types of the system.
    ///
    /// ## Example
    /// ```no_run
    /// use lammps_rs::prelude::*;
    ///
    /// let mut data = Data::from_file("system.data").unwrap();
    /// data.read_pair_coeffs("forcefield.in").unwrap();
    /// data.write_data("system_with_coeffs.data", true).unwrap();
    /// ```
    pub fn read_pair_coeffs(&mut self, filename: impl AsRef<Path>) -> Result<(), ParseCoeffsError> {
        let wildcard = Regex::new(WILDCARD)
            .expect("FATAL LAMMPS_RS ERROR | Data::read_pair_coeffs | Invalid regular expression.");
        let n_types = self.atom_types().len();

        let mut pairs: IndexMap<(usize, usize), PairType> = IndexMap::new();
        for (tokens, comment) in read_command_lines(filename, "pair_coeff")? {
            if tokens.len() < 2 {
                return Err(ParseCoeffsError::ParseLineErr(format!(
                    "pair_coeff {}",
                    tokens.join(" ")
                )));
            }

            let range_i = expand_ids(&tokens[0], n_types, &wildcard)?;
            let range_j = expand_ids(&tokens[1], n_types, &wildcard)?;
            let rest: Vec<&str> = tokens[2..].iter().map(|x| x.as_str()).collect();
            let (coeffs, style) = parse_coeff_tokens(&rest, &None);

            for i in range_i {
                for j in range_j.clone() {
                    let pair = PairType::new((i, j), coeffs.clone(), style.clone(), comment.clone());
                    pairs.insert(pair.atom_types(), pair);
                }
            }
        }

        self.replace_pair_types(pairs.into_values().collect());
        Ok(())
    }

    /// Read coefficients of bonds, angles, dihedrals, or impropers from a LAMMPS input file
    /// (lines starting with `bond_coeff`, `angle_coeff`, `dihedral_coeff`, or `improper_coeff`).
    ///
    /// Type ids may be specified using wildcards. Later lines override earlier lines.
    /// The types read replace all types of the given kind.
    ///
    /// ## Returns
    /// `ParseCoeffsError::TypeNotFound` if any bond (angle, ...) of the system uses a type
    /// that is not defined in the file. In such case, the system is not modified.
    pub fn read_coeffs(
        &mut self,
        kind: TopologyKind,
        filename: impl AsRef<Path>,
    ) -> Result<(), ParseCoeffsError> {
        let wildcard = Regex::new(WILDCARD)
            .expect("FATAL LAMMPS_RS ERROR | Data::read_coeffs | Invalid regular expression.");
        let n_types = self.types(kind).len();

        let mut types: IndexMap<usize, InteractionType> = IndexMap::new();
        for (tokens, comment) in read_command_lines(filename, kind.command())? {
            let Some(ids) = tokens.first() else {
                return Err(ParseCoeffsError::ParseLineErr(kind.command().to_owned()));
            };

            let range = expand_ids(ids, n_types, &wildcard)?;
            let rest: Vec<&str> = tokens[1..].iter().map(|x| x.as_str()).collect();
            let (coeffs, style) = parse_coeff_tokens(&rest, &None);

            for id in range {
                types.insert(
                    id,
                    InteractionType::new(id, coeffs.clone(), style.clone(), comment.clone()),
                );
            }
        }

        if let Some(missing) = self
            .used_types(kind)
            .into_iter()
            .find(|id| !types.contains_key(id))
        {
            return Err(ParseCoeffsError::TypeNotFound(kind, missing));
        }

        self.replace_types(kind, types.into_values().collect());
        Ok(())
    }

    /// Write pair coefficients as `pair_coeff` commands.
    ///
    /// ## Notes
    /// - No file is created if the system has no pair types.
    /// - Unknown coefficients are written as `?`.
    pub fn write_pair_coeffs(&self, filename: impl AsRef<Path>) -> Result<(), WriteCoeffsError> {
        if self.pair_types().is_empty() {
            info!(
                "No pair types to write. File '{}' was not created.",
                filename.as_ref().display()
            );
            return Ok(());
        }

        let styles = distinct_styles(self.pair_types().iter().map(|x| x.style()));
        let lines = self.pair_types().iter().map(|pair| {
            let (i, j) = pair.atom_types();
            let mut line = format!("pair_coeff {:4} {:4}", i, j);
            if styles.len() > 1 {
                line.push_str(&style_column(pair.style()));
            }
            line.push_str(&format_coeffs(pair.coeffs(), " ?"));
            line.push_str(&comment_suffix(pair.comment()));
            line
        });

        write_lines(filename, lines)
    }

    /// Write coefficients of bonds, angles, dihedrals, or impropers
    /// as `bond_coeff` (`angle_coeff`, ...) commands.
    ///
    /// ## Notes
    /// - No file is created if the system has no types of the given kind.
    /// - Unknown coefficients are written as `?`.
    pub fn write_coeffs(
        &self,
        kind: TopologyKind,
        filename: impl AsRef<Path>,
    ) -> Result<(), WriteCoeffsError> {
        let types = self.types(kind);
        if types.is_empty() {
            info!(
                "No {}s to write. File '{}' was not created.",
                kind,
                filename.as_ref().display()
            );
            return Ok(());
        }

        let styles = distinct_styles(types.iter().map(|x| x.style()));
        let lines = types.iter().map(|t| {
            let mut line = format!("{} {:4}", kind.command(), t.id());
            if styles.len() > 1 {
                line.push_str(&style_column(t.style()));
            }
            line.push_str(&format_coeffs(t.coeffs(), " ?"));
            line.push_str(&comment_suffix(t.comment()));
            line
        });

        write_lines(filename, lines)
    }
}

fn write_lines(
    filename: impl AsRef<Path>,
    lines: impl Iterator<Item = String>,
) -> Result<(), WriteCoeffsError> {
    let output = File::create(filename.as_ref())
        .map_err(|_| WriteCoeffsError::CouldNotCreate(Box::from(filename.as_ref())))?;
    let mut writer = BufWriter::new(output);

    for line in lines {
        writeln!(writer, "{}", line).map_err(|_| WriteCoeffsError::CouldNotWrite)?;
    }

    writer.flush().map_err(|_| WriteCoeffsError::CouldNotWrite)
}

/******************************/
/*         UNIT TESTS         */
/******************************/
