// Released under MIT License.
// Copyright (c) 2024 Ladislav Bartos

//! Readers of files written by the LAMMPS `fix ave/*` commands.
//!
//! All these files start with three comment lines. The first line describes the fix,
//! the second line describes the block lines and the third line names the quantities.
//! The header is followed by blocks, each consisting of a block line
//! (timestep and metadata of the block) and the rows of the block.

pub mod chunk;
pub mod correlate;
pub mod histo;
pub mod time;

use std::str::FromStr;

use crate::errors::ReadError;
use crate::io::source::TextSource;
use crate::structures::table::Table;
use crate::structures::value::Value;

/// Read the first header line. Returns the description of the fix.
pub(crate) fn read_description(
    source: &mut TextSource,
    prefix: &str,
    format: &str,
) -> Result<String, ReadError> {
    let line = source.read_line()?.unwrap_or_default();
    if !line.starts_with(prefix) {
        return Err(source.invalid_header(format, &line));
    }

    Ok(line.trim_start_matches('#').trim().to_owned())
}

/// Read a header line which must match `expected` exactly (ignoring surrounding whitespace).
pub(crate) fn expect_header(
    source: &mut TextSource,
    expected: &str,
    format: &str,
) -> Result<(), ReadError> {
    let line = source.read_line()?.unwrap_or_default();
    if line.trim() != expected {
        return Err(source.invalid_header(format, &line));
    }

    Ok(())
}

/// Read the header line with the names of the quantities.
pub(crate) fn read_fields(
    source: &mut TextSource,
    prefix: &str,
    format: &str,
) -> Result<Vec<String>, ReadError> {
    let line = source.read_line()?.unwrap_or_default();
    if !line.starts_with(prefix) {
        return Err(source.invalid_header(format, &line));
    }

    Ok(line
        .trim_start_matches('#')
        .split_whitespace()
        .map(String::from)
        .collect())
}

/// Read the next block line. Blank lines are skipped.
/// Returns `None` at the end of the file.
pub(crate) fn next_block_line(source: &mut TextSource) -> Result<Option<String>, ReadError> {
    while let Some(line) = source.read_line()? {
        if !line.trim().is_empty() {
            return Ok(Some(line));
        }
    }

    Ok(None)
}

/// Parse the `index`-th token of a line.
pub(crate) fn parse_token<T: FromStr>(line: &str, index: usize) -> Result<T, ReadError> {
    line.split_whitespace()
        .nth(index)
        .and_then(|x| x.parse::<T>().ok())
        .ok_or_else(|| ReadError::ParseLineErr(line.to_owned()))
}

/// Parse a count which may be written as a float (e.g., `1e+01`).
pub(crate) fn parse_count(line: &str, index: usize) -> Result<u64, ReadError> {
    let value = parse_token::<f64>(line, index)?;
    if value < 0.0 || value.fract() != 0.0 {
        return Err(ReadError::ParseLineErr(line.to_owned()));
    }

    Ok(value as u64)
}

/// Parse the numeric values of a single row.
pub(crate) fn parse_row(line: &str, n_fields: usize) -> Result<Vec<Value>, ReadError> {
    let values = line
        .split_whitespace()
        .map(Value::parse_numeric)
        .collect::<Option<Vec<Value>>>()
        .ok_or_else(|| ReadError::ParseLineErr(line.to_owned()))?;

    if values.len() != n_fields {
        return Err(ReadError::FieldsMismatch(n_fields, values.len()));
    }

    Ok(values)
}

/// Read `n` rows of a block.
pub(crate) fn read_rows(
    source: &mut TextSource,
    n: usize,
    fields: &[String],
) -> Result<Table, ReadError> {
    let mut table = Table::new(fields);
    for _ in 0..n {
        let line = source.expect_line()?;
        table
            .push_row(parse_row(&line, fields.len())?)
            .map_err(|_| ReadError::ParseLineErr(line.clone()))?;
    }

    Ok(table)
}

/// Concatenate blocks into a single table indexed by `TimeStep` and the first field of the blocks.
pub(crate) fn blocks_to_table(
    blocks: impl Iterator<Item = Result<(u64, Table), ReadError>>,
    fields: &[String],
) -> Result<Table, ReadError> {
    let mut table = Table::default();

    for block in blocks {
        let (timestep, mut values) = block?;
        let n_rows = values.n_rows();
        values
            .add_column("TimeStep", vec![Value::Int(timestep as i64); n_rows])
            .map_err(|_| ReadError::MissingField(String::from("TimeStep")))?;

        let index = match fields.first() {
            Some(first) => vec!["TimeStep", first.as_str()],
            None => vec!["TimeStep"],
        };

        let values = values
            .with_index(&index)
            .map_err(|_| ReadError::MissingField(index.join(" ")))?;

        let n_columns = values.n_columns();
        table
            .append(values)
            .map_err(|_| ReadError::FieldsMismatch(table.n_columns(), n_columns))?;
    }

    if table.n_columns() == 0 {
        let mut columns = vec!["TimeStep"];
        columns.extend(fields.iter().map(|x| x.as_str()));
        return Ok(Table::new(&columns));
    }

    Ok(table)
}

/******************************/
/*         UNIT TESTS         */
/******************************/
