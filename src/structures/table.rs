// Released under MIT License.
// Copyright (c) 2024 Ladislav Bartos

//! Implementation of the `Table` structure, a column-oriented labeled table
//! into which all LAMMPS files can be converted for further analysis.

use std::path::Path;

use indexmap::IndexMap;
use ndarray::{Array1, Array2};

use crate::errors::{TableError, WriteTableError};
use crate::structures::value::Value;

/// Named values of a single row (snapshot, record) in the order of the fields.
pub type Record = IndexMap<String, Value>;

/// Column-oriented table with named columns and an optional (multi-level) index.
///
/// The index is formed by the first columns of the table. For instance, tables constructed
/// from `fix ave/time` outputs in vector mode are indexed by `TimeStep` and by the row number.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Table {
    /// Names of the columns forming the index of the table.
    index: Vec<String>,
    /// Columns of the table in order.
    columns: IndexMap<String, Vec<Value>>,
    /// Number of rows in the table.
    n_rows: usize,
}

impl Table {
    /// Create a new empty table with the specified columns.
    /// Duplicate column names are ignored.
    pub fn new<S: AsRef<str>>(columns: &[S]) -> Table {
        let mut map = IndexMap::new();
        for column in columns {
            map.insert(column.as_ref().to_owned(), Vec::new());
        }

        Table {
            index: Vec::new(),
            columns: map,
            n_rows: 0,
        }
    }

    /// Set the columns that form the index of the table.
    /// The index columns are moved to the front of the table.
    ///
    /// ## Returns
    /// Table with the specified index or `TableError::UnknownColumn` if any of the columns does not exist.
    pub fn with_index<S: AsRef<str>>(mut self, index: &[S]) -> Result<Table, TableError> {
        for (position, name) in index.iter().enumerate() {
            let current = self
                .columns
                .get_index_of(name.as_ref())
                .ok_or_else(|| TableError::UnknownColumn(name.as_ref().to_owned()))?;
            self.columns.move_index(current, position);
        }

        self.index = index.iter().map(|x| x.as_ref().to_owned()).collect();
        Ok(self)
    }

    /// Get the number of rows of the table.
    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    /// Get the number of columns of the table (including index columns).
    pub fn n_columns(&self) -> usize {
        self.columns.len()
    }

    /// Returns `true` if the table contains no rows.
    pub fn is_empty(&self) -> bool {
        self.n_rows == 0
    }

    /// Get the names of all columns in order.
    pub fn get_column_names(&self) -> Vec<&str> {
        self.columns.keys().map(|x| x.as_str()).collect()
    }

    /// Get the names of the index columns.
    pub fn get_index_names(&self) -> &[String] {
        &self.index
    }

    /// Returns `true` if the column exists.
    pub fn has_column(&self, name: &str) -> bool {
        self.columns.contains_key(name)
    }

    /// Get values of a column.
    pub fn column(&self, name: &str) -> Result<&[Value], TableError> {
        self.columns
            .get(name)
            .map(|x| x.as_slice())
            .ok_or_else(|| TableError::UnknownColumn(name.to_owned()))
    }

    /// Get a value in the target row of the target column.
    /// Returns `None` if the row or the column does not exist.
    pub fn get(&self, row: usize, column: &str) -> Option<&Value> {
        self.columns.get(column).and_then(|x| x.get(row))
    }

    /// Get values of the target row in the order of the columns.
    /// Returns `None` if the row does not exist.
    pub fn row(&self, row: usize) -> Option<Vec<&Value>> {
        if row >= self.n_rows {
            return None;
        }

        Some(self.columns.values().map(|x| &x[row]).collect())
    }

    /// Iterate over the rows of the table.
    pub fn rows_iter(&self) -> impl Iterator<Item = Vec<&Value>> + '_ {
        (0..self.n_rows).filter_map(|i| self.row(i))
    }

    /// Add a row to the table. The values must be provided in the order of the columns.
    ///
    /// ## Returns
    /// `Ok` if the row has been added. `TableError::LengthMismatch` if the number of values
    /// does not match the number of columns.
    pub fn push_row(&mut self, values: Vec<Value>) -> Result<(), TableError> {
        if values.len() != self.columns.len() {
            return Err(TableError::LengthMismatch(
                self.columns.len(),
                values.len(),
            ));
        }

        for (column, value) in self.columns.values_mut().zip(values) {
            column.push(value);
        }

        self.n_rows += 1;
        Ok(())
    }

    /// Add a named record to the table.
    ///
    /// ## Notes
    /// - Columns that are not present in the record are filled with `NaN`.
    /// - Fields of the record that are not present in the table are added as new columns
    ///   and all the previous rows are filled with `NaN`.
    pub fn push_record(&mut self, mut record: Record) {
        for key in record.keys() {
            if !self.columns.contains_key(key) {
                self.columns
                    .insert(key.clone(), vec![Value::Float(f64::NAN); self.n_rows]);
            }
        }

        for (name, column) in self.columns.iter_mut() {
            column.push(
                record
                    .swap_remove(name)
                    .unwrap_or(Value::Float(f64::NAN)),
            );
        }

        self.n_rows += 1;
    }

    /// Append all rows of another table to this table.
    /// If this table has no columns, it takes the columns and the index of the other table.
    ///
    /// ## Returns
    /// `Ok` if successful. `TableError::ColumnsMismatch` if the tables do not have the same columns.
    pub fn append(&mut self, other: Table) -> Result<(), TableError> {
        if self.columns.is_empty() && self.n_rows == 0 {
            *self = other;
            return Ok(());
        }

        if self.columns.len() != other.columns.len()
            || self.columns.keys().zip(other.columns.keys()).any(|(a, b)| a != b)
        {
            return Err(TableError::ColumnsMismatch);
        }

        for (column, values) in self.columns.values_mut().zip(other.columns.into_values()) {
            column.extend(values);
        }

        self.n_rows += other.n_rows;
        Ok(())
    }

    /// Add a new column to the end of the table.
    ///
    /// ## Returns
    /// `Ok` if successful. `TableError::DuplicateColumn` if the column already exists.
    /// `TableError::LengthMismatch` if the number of values does not match the number of rows.
    pub fn add_column(&mut self, name: &str, values: Vec<Value>) -> Result<(), TableError> {
        if self.columns.contains_key(name) {
            return Err(TableError::DuplicateColumn(name.to_owned()));
        }

        if self.columns.is_empty() {
            self.n_rows = values.len();
        } else if values.len() != self.n_rows {
            return Err(TableError::LengthMismatch(self.n_rows, values.len()));
        }

        self.columns.insert(name.to_owned(), values);
        Ok(())
    }

    /// Stable sort of the rows of the table based on the values in the target column.
    pub fn sort_by(&mut self, column: &str) -> Result<(), TableError> {
        let order = {
            let key = self.column(column)?;
            let mut order: Vec<usize> = (0..self.n_rows).collect();
            order.sort_by(|&a, &b| key[a].total_cmp(&key[b]));
            order
        };

        for values in self.columns.values_mut() {
            let mut sorted = Vec::with_capacity(values.len());
            for &i in order.iter() {
                sorted.push(std::mem::replace(&mut values[i], Value::Int(0)));
            }
            *values = sorted;
        }

        Ok(())
    }

    /// Get the values of a numeric column as a one-dimensional array.
    ///
    /// ## Returns
    /// `Array1<f64>` or `TableError` if the column does not exist or contains non-numeric values.
    pub fn column_as_array(&self, name: &str) -> Result<Array1<f64>, TableError> {
        self.column(name)?
            .iter()
            .map(|x| x.as_f64().ok_or_else(|| TableError::NotNumeric(name.to_owned())))
            .collect::<Result<Vec<f64>, TableError>>()
            .map(Array1::from)
    }

    /// Convert the target numeric columns into a two-dimensional array (rows x columns).
    /// If `columns` is empty, all columns of the table are converted.
    ///
    /// ## Example
    /// ```
    /// # use lammps_rs::prelude::*;
    /// #
    /// let mut table = Table::new(&["a", "b"]);
    /// table.push_row(vec![Value::Int(1), Value::Float(2.5)]).unwrap();
    /// table.push_row(vec![Value::Int(3), Value::Float(4.5)]).unwrap();
    ///
    /// let array = table.to_array(&["b", "a"]).unwrap();
    /// assert_eq!(array.shape(), &[2, 2]);
    /// assert_eq!(array[[1, 0]], 4.5);
    /// ```
    pub fn to_array<S: AsRef<str>>(&self, columns: &[S]) -> Result<Array2<f64>, TableError> {
        let names: Vec<&str> = if columns.is_empty() {
            self.get_column_names()
        } else {
            columns.iter().map(|x| x.as_ref()).collect()
        };

        let mut array = Array2::zeros((self.n_rows, names.len()));
        for (c, name) in names.iter().enumerate() {
            for (r, value) in self.column(name)?.iter().enumerate() {
                array[[r, c]] = value
                    .as_f64()
                    .ok_or_else(|| TableError::NotNumeric((*name).to_owned()))?;
            }
        }

        Ok(array)
    }

    /// Write the table into a csv file. The first line of the file contains the names of the columns.
    pub fn write_csv(&self, filename: impl AsRef<Path>) -> Result<(), WriteTableError> {
        let mut writer = csv::Writer::from_path(&filename)
            .map_err(|_| WriteTableError::CouldNotCreate(Box::from(filename.as_ref())))?;

        writer
            .write_record(self.columns.keys())
            .map_err(|_| WriteTableError::CouldNotWrite)?;

        for row in self.rows_iter() {
            writer
                .write_record(row.iter().map(|x| x.to_string()))
                .map_err(|_| WriteTableError::CouldNotWrite)?;
        }

        writer.flush().map_err(|_| WriteTableError::CouldNotWrite)?;
        Ok(())
    }
}

/******************************/
/*         UNIT TESTS         */
/******************************/
