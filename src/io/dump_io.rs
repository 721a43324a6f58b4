// Released under MIT License.
// Copyright (c) 2024 Ladislav Bartos

//! Implementation of functions for reading and writing LAMMPS dump files.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use getset::{CopyGetters, Getters};

use crate::auxiliary::format_sci;
use crate::errors::{ReadError, TableError, WriteDumpError};
use crate::io::snapshot_io::{Snapshot, SnapshotRead};
use crate::io::source::TextSource;
use crate::structures::simbox::SimBox;
use crate::structures::table::{Record, Table};
use crate::structures::value::Value;

/******************************/
/*      DUMP SNAPSHOTS        */
/******************************/

/// Type of dump file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DumpKind {
    /// Per-atom dump (`dump atom`, `dump custom`).
    Atoms,
    /// Dump of local quantities, e.g., bonds or pairwise interactions (`dump local`).
    Local,
}

impl DumpKind {
    fn count_header(&self) -> &'static str {
        match self {
            DumpKind::Atoms => "ITEM: NUMBER OF ATOMS",
            DumpKind::Local => "ITEM: NUMBER OF ENTRIES",
        }
    }

    fn entries_keyword(&self) -> &'static str {
        match self {
            DumpKind::Atoms => "ATOMS",
            DumpKind::Local => "ENTRIES",
        }
    }

    fn format_name(&self) -> &'static str {
        match self {
            DumpKind::Atoms => "dump",
            DumpKind::Local => "dump local",
        }
    }
}

/// Entries (atoms or local quantities) of a dump snapshot.
#[derive(Debug, Clone, PartialEq)]
pub enum DumpEntries {
    /// Lines of the snapshot that have not been parsed yet.
    Raw(Vec<String>),
    /// Parsed entries.
    Parsed(Table),
}

/// Single snapshot of a dump file.
#[derive(Debug, Clone, PartialEq, Getters, CopyGetters)]
pub struct DumpSnapshot {
    #[getset(get_copy = "pub")]
    kind: DumpKind,
    timestep: u64,
    /// Number of atoms or entries in the snapshot.
    #[getset(get_copy = "pub")]
    n_entries: usize,
    /// Boundary conditions of the box (e.g., `pp pp pp`).
    #[getset(get = "pub")]
    boundaries: Vec<String>,
    /// `[lo, hi]` bounds along each dimension as written in the dump.
    /// For triclinic boxes, these are the bounds of the bounding box.
    #[getset(get_copy = "pub")]
    bounds: [[f64; 2]; 3],
    /// Tilt factors `[xy, xz, yz]` of a triclinic box.
    #[getset(get_copy = "pub")]
    tilt: Option<[f64; 3]>,
    /// Names of the dumped quantities.
    #[getset(get = "pub")]
    fields: Vec<String>,
    #[getset(get = "pub")]
    entries: DumpEntries,
}

impl Snapshot for DumpSnapshot {
    fn timestep(&self) -> u64 {
        self.timestep
    }
}

impl DumpSnapshot {
    /// Create a new dump snapshot from a table of per-atom quantities.
    pub fn new(
        kind: DumpKind,
        timestep: u64,
        simbox: &SimBox,
        boundaries: Vec<String>,
        table: Table,
    ) -> DumpSnapshot {
        DumpSnapshot {
            kind,
            timestep,
            n_entries: table.n_rows(),
            boundaries,
            bounds: simbox.to_dump_bounds(),
            tilt: if simbox.is_triclinic() {
                Some(simbox.tilt)
            } else {
                None
            },
            fields: table
                .get_column_names()
                .into_iter()
                .map(String::from)
                .collect(),
            entries: DumpEntries::Parsed(table),
        }
    }

    /// Returns `true` if the simulation box is triclinic.
    pub fn is_triclinic(&self) -> bool {
        self.tilt.is_some()
    }

    /// Returns `true` if the entries of the snapshot have not been parsed yet.
    pub fn is_raw(&self) -> bool {
        matches!(self.entries, DumpEntries::Raw(_))
    }

    /// Get the simulation box of the snapshot.
    /// Bounding box of a triclinic box is converted into the actual simulation box.
    pub fn simbox(&self) -> SimBox {
        SimBox::from_dump_bounds(self.bounds, self.tilt)
    }

    /// Parse the entries of the snapshot, if they are not parsed yet.
    /// If `sort` is `true`, entries are sorted by the `id` field.
    ///
    /// ## Returns
    /// - `Ok` if successful.
    /// - `ReadError::ParseLineErr` if any of the lines could not be parsed.
    /// - `ReadError::MissingField` if `sort` is requested but the snapshot does not contain `id`.
    pub fn parse(&mut self, sort: bool) -> Result<(), ReadError> {
        if let DumpEntries::Raw(lines) = &self.entries {
            self.entries = DumpEntries::Parsed(parse_entries(lines, &self.fields)?);
        }

        if sort {
            if let DumpEntries::Parsed(table) = &mut self.entries {
                table.sort_by("id").map_err(|e| match e {
                    TableError::UnknownColumn(x) => ReadError::MissingField(x),
                    _ => ReadError::MissingField(String::from("id")),
                })?;
            }
        }

        Ok(())
    }

    /// Get the parsed entries. Returns `None` if the snapshot has not been parsed.
    pub fn get_table(&self) -> Option<&Table> {
        match &self.entries {
            DumpEntries::Parsed(table) => Some(table),
            DumpEntries::Raw(_) => None,
        }
    }

    /// Convert the snapshot into a table of entries, parsing the entries if needed.
    pub fn into_table(mut self) -> Result<Table, ReadError> {
        self.parse(false)?;
        match self.entries {
            DumpEntries::Parsed(table) => Ok(table),
            DumpEntries::Raw(_) => panic!(
                "FATAL LAMMPS_RS ERROR | DumpSnapshot::into_table | Entries were not parsed."
            ),
        }
    }

    /// Get the entries of the snapshot as named records.
    pub fn records(&self) -> Result<Vec<Record>, ReadError> {
        let parsed;
        let table = match &self.entries {
            DumpEntries::Parsed(table) => table,
            DumpEntries::Raw(lines) => {
                parsed = parse_entries(lines, &self.fields)?;
                &parsed
            }
        };

        Ok(table
            .rows_iter()
            .map(|row| {
                self.fields
                    .iter()
                    .cloned()
                    .zip(row.into_iter().cloned())
                    .collect::<Record>()
            })
            .collect())
    }

    /// Get values of a single field of all entries.
    /// For raw snapshots, only the requested field is parsed.
    pub fn column(&self, field: &str) -> Result<Vec<Value>, ReadError> {
        match &self.entries {
            DumpEntries::Parsed(table) => table
                .column(field)
                .map(|x| x.to_vec())
                .map_err(|_| ReadError::MissingField(field.to_owned())),
            DumpEntries::Raw(lines) => {
                let index = self
                    .fields
                    .iter()
                    .position(|x| x == field)
                    .ok_or_else(|| ReadError::MissingField(field.to_owned()))?;

                lines
                    .iter()
                    .map(|line| {
                        let mut tokens = line.split_whitespace();
                        let n_tokens = tokens.clone().count();
                        if n_tokens < self.fields.len() {
                            return Err(ReadError::ParseLineErr(line.clone()));
                        }
                        tokens
                            .nth(index)
                            .map(Value::parse)
                            .ok_or_else(|| ReadError::ParseLineErr(line.clone()))
                    })
                    .collect()
            }
        }
    }

    /// Get Cartesian positions of all entries.
    ///
    /// ## Notes
    /// - Positions are taken from the fields `x y z`, or from unwrapped `xu yu zu`,
    ///   or from scaled `xs ys zs` (`xsu ysu zsu`) converted using the simulation box.
    /// - Returns `ReadError::MissingField` if the snapshot contains no positions.
    pub fn positions(&self) -> Result<Vec<[f64; 3]>, ReadError> {
        const CARTESIAN: [[&str; 3]; 2] = [["x", "y", "z"], ["xu", "yu", "zu"]];
        const SCALED: [[&str; 3]; 2] = [["xs", "ys", "zs"], ["xsu", "ysu", "zsu"]];

        let has = |names: &[&str; 3]| names.iter().all(|name| self.fields.iter().any(|f| f == name));

        if let Some(names) = CARTESIAN.iter().find(|x| has(x)) {
            return self.coordinates(names);
        }

        if let Some(names) = SCALED.iter().find(|x| has(x)) {
            let simbox = self.simbox();
            return Ok(self
                .coordinates(names)?
                .into_iter()
                .map(|s| simbox.unscale(s))
                .collect());
        }

        Err(ReadError::MissingField(String::from("x")))
    }

    /// Get three numeric fields of all entries.
    fn coordinates(&self, names: &[&str; 3]) -> Result<Vec<[f64; 3]>, ReadError> {
        let mut columns = Vec::with_capacity(3);
        for name in names {
            let column = self
                .column(name)?
                .iter()
                .map(|x| x.as_f64().ok_or_else(|| ReadError::ParseLineErr(x.to_string())))
                .collect::<Result<Vec<f64>, ReadError>>()?;
            columns.push(column);
        }

        Ok((0..columns[0].len())
            .map(|i| [columns[0][i], columns[1][i], columns[2][i]])
            .collect())
    }
}

/// Parse raw lines of a dump snapshot into a table.
fn parse_entries(lines: &[String], fields: &[String]) -> Result<Table, ReadError> {
    let mut table = Table::new(fields);
    for line in lines {
        let mut values: Vec<Value> = line.split_whitespace().map(Value::parse).collect();
        if values.len() < fields.len() {
            return Err(ReadError::ParseLineErr(line.clone()));
        }
        // trailing values without a field are ignored
        values.truncate(fields.len());

        table
            .push_row(values)
            .map_err(|_| ReadError::ParseLineErr(line.clone()))?;
    }

    Ok(table)
}

/******************************/
/*   READING DUMP SNAPSHOTS   */
/******************************/

/// Information from the header of a dump snapshot.
struct DumpHeader {
    timestep: u64,
    n_entries: usize,
    boundaries: Vec<String>,
    bounds: [[f64; 2]; 3],
    tilt: Option<[f64; 3]>,
    fields: Vec<String>,
}

/// Check that the first line of the file has the form expected for dump files.
pub(crate) fn check_dump_file(filename: &Path, kind: DumpKind) -> Result<(), ReadError> {
    let mut source = TextSource::open(filename)?;
    let line = source.read_line()?.unwrap_or_default();
    if line.trim() != "ITEM: TIMESTEP" {
        return Err(source.invalid_header(kind.format_name(), &line));
    }

    Ok(())
}

/// Read the header of the next snapshot. Returns `None` if there are no more snapshots.
fn read_header(source: &mut TextSource, kind: DumpKind) -> Result<Option<DumpHeader>, ReadError> {
    // blank lines between snapshots are ignored
    let line = loop {
        match source.read_line()? {
            None => return Ok(None),
            Some(x) if x.trim().is_empty() => continue,
            Some(x) => break x,
        }
    };

    if line.trim() != "ITEM: TIMESTEP" {
        return Err(source.invalid_header(kind.format_name(), &line));
    }

    let line = source.expect_line()?;
    let timestep = line
        .trim()
        .parse::<u64>()
        .map_err(|_| ReadError::ParseLineErr(line.clone()))?;

    let line = source.expect_line()?;
    if line.trim() != kind.count_header() {
        return Err(source.invalid_header(kind.format_name(), &line));
    }

    let line = source.expect_line()?;
    let n_entries = line
        .trim()
        .parse::<usize>()
        .map_err(|_| ReadError::ParseLineErr(line.clone()))?;

    let line = source.expect_line()?;
    if !line.trim_start().starts_with("ITEM: BOX BOUNDS") {
        return Err(source.invalid_header(kind.format_name(), &line));
    }

    let box_tokens: Vec<&str> = line.split_whitespace().skip(3).collect();
    let triclinic = box_tokens.contains(&"xy");
    let boundaries = box_tokens
        .into_iter()
        .filter(|x| !matches!(*x, "xy" | "xz" | "yz"))
        .map(String::from)
        .collect();

    let mut bounds = [[0.0; 2]; 3];
    let mut tilt = [0.0; 3];
    for dim in 0..3 {
        let line = source.expect_line()?;
        let numbers = line
            .split_whitespace()
            .map(|x| x.parse::<f64>())
            .collect::<Result<Vec<f64>, _>>()
            .map_err(|_| ReadError::ParseLineErr(line.clone()))?;

        if numbers.len() < 2 || (triclinic && numbers.len() < 3) {
            return Err(ReadError::ParseLineErr(line));
        }

        bounds[dim] = [numbers[0], numbers[1]];
        if triclinic {
            tilt[dim] = numbers[2];
        }
    }

    let line = source.expect_line()?;
    let mut tokens = line.split_whitespace();
    if tokens.next() != Some("ITEM:") || tokens.next() != Some(kind.entries_keyword()) {
        return Err(source.invalid_header(kind.format_name(), &line));
    }
    let fields = tokens.map(String::from).collect();

    Ok(Some(DumpHeader {
        timestep,
        n_entries,
        boundaries,
        bounds,
        tilt: if triclinic { Some(tilt) } else { None },
        fields,
    }))
}

/// Read the next snapshot from a dump file.
/// If `raw` is `true`, the entries are not parsed.
pub(crate) fn read_dump_snapshot(
    source: &mut TextSource,
    kind: DumpKind,
    raw: bool,
    sort: bool,
) -> Result<Option<DumpSnapshot>, ReadError> {
    let header = match read_header(source, kind)? {
        Some(x) => x,
        None => return Ok(None),
    };

    let mut lines = Vec::with_capacity(header.n_entries);
    for _ in 0..header.n_entries {
        lines.push(source.expect_line()?);
    }

    let mut snapshot = DumpSnapshot {
        kind,
        timestep: header.timestep,
        n_entries: header.n_entries,
        boundaries: header.boundaries,
        bounds: header.bounds,
        tilt: header.tilt,
        fields: header.fields,
        entries: DumpEntries::Raw(lines),
    };

    if !raw {
        snapshot.parse(sort)?;
    }

    Ok(Some(snapshot))
}

/// Skip the next snapshot of a dump file without parsing its entries.
pub(crate) fn skip_dump_snapshot(source: &mut TextSource, kind: DumpKind) -> Result<bool, ReadError> {
    match read_header(source, kind)? {
        None => Ok(false),
        Some(header) => {
            source.skip_lines(header.n_entries)?;
            Ok(true)
        }
    }
}

/******************************/
/*         DumpReader         */
/******************************/

/// Reader of LAMMPS per-atom dump files (`dump atom`, `dump custom`).
///
/// ## Notes
/// - By default, entries of each snapshot are parsed and sorted by atom `id`.
/// - Values are parsed as integers, then as floats, and are kept as strings if neither is possible.
pub struct DumpReader {
    source: TextSource,
    raw: bool,
    sort: bool,
}

impl DumpReader {
    /// Open a LAMMPS dump file.
    ///
    /// ## Returns
    /// `DumpReader` if the file exists and starts with `ITEM: TIMESTEP`. Otherwise `ReadError`.
    ///
    /// ## Example
    /// ```no_run
    /// use lammps_rs::prelude::*;
    ///
    /// for snapshot in DumpReader::open("dump.lammpstrj").unwrap().snapshots() {
    ///     let snapshot = snapshot.unwrap();
    ///     let positions = snapshot.positions().unwrap();
    ///     println!("{} {:?}", snapshot.timestep(), positions[0]);
    /// }
    /// ```
    pub fn open(filename: impl AsRef<Path>) -> Result<DumpReader, ReadError> {
        check_dump_file(filename.as_ref(), DumpKind::Atoms)?;

        Ok(DumpReader {
            source: TextSource::open(filename)?,
            raw: false,
            sort: true,
        })
    }

    /// Keep the entries of the snapshots unparsed. They can be parsed later using `DumpSnapshot::parse`.
    /// Default: `false`.
    pub fn with_raw(mut self, raw: bool) -> Self {
        self.raw = raw;
        self
    }

    /// Sort the entries of the snapshots by atom `id`. Default: `true`.
    pub fn with_sort(mut self, sort: bool) -> Self {
        self.sort = sort;
        self
    }

    /// Read all snapshots of the dump into a single table indexed by `timestep`.
    pub fn to_table(self) -> Result<Table, ReadError> {
        let sort = self.sort;
        snapshots_to_table(self.snapshots(), sort)
    }
}

/// Concatenate snapshots into a single table with a leading `timestep` column.
pub(crate) fn snapshots_to_table(
    snapshots: impl Iterator<Item = Result<DumpSnapshot, ReadError>>,
    sort: bool,
) -> Result<Table, ReadError> {
    let mut table = Table::default();

    for snapshot in snapshots {
        let mut snapshot = snapshot?;
        snapshot.parse(sort)?;
        let timestep = snapshot.timestep();

        let mut entries = snapshot.into_table()?;
        let n_rows = entries.n_rows();
        entries
            .add_column("timestep", vec![Value::Int(timestep as i64); n_rows])
            .map_err(|_| ReadError::MissingField(String::from("timestep")))?;
        let entries = entries
            .with_index(&["timestep"])
            .map_err(|_| ReadError::MissingField(String::from("timestep")))?;

        let n_columns = entries.n_columns();
        table
            .append(entries)
            .map_err(|_| ReadError::FieldsMismatch(table.n_columns(), n_columns))?;
    }

    Ok(table)
}

impl SnapshotRead for DumpReader {
    type Snapshot = DumpSnapshot;

    fn read_snapshot(&mut self) -> Option<Result<Self::Snapshot, ReadError>> {
        read_dump_snapshot(&mut self.source, DumpKind::Atoms, self.raw, self.sort).transpose()
    }

    fn skip_snapshot(&mut self) -> Result<bool, ReadError> {
        skip_dump_snapshot(&mut self.source, DumpKind::Atoms)
    }
}

/******************************/
/*         DumpWriter         */
/******************************/

/// Writer of LAMMPS dump files.
pub struct DumpWriter {
    writer: BufWriter<File>,
}

impl DumpWriter {
    /// Create a new dump file.
    pub fn create(filename: impl AsRef<Path>) -> Result<DumpWriter, WriteDumpError> {
        let output = File::create(&filename)
            .map_err(|_| WriteDumpError::CouldNotCreate(Box::from(filename.as_ref())))?;

        Ok(DumpWriter {
            writer: BufWriter::new(output),
        })
    }

    /// Write a snapshot into the dump file.
    /// Raw snapshots are written without parsing.
    pub fn write_snapshot(&mut self, snapshot: &DumpSnapshot) -> Result<(), WriteDumpError> {
        let kind = snapshot.kind;

        writeln!(self.writer, "ITEM: TIMESTEP\n{}", snapshot.timestep)
            .map_err(|_| WriteDumpError::CouldNotWrite)?;
        writeln!(self.writer, "{}\n{}", kind.count_header(), snapshot.n_entries)
            .map_err(|_| WriteDumpError::CouldNotWrite)?;

        let mut box_header = String::from("ITEM: BOX BOUNDS");
        if snapshot.is_triclinic() {
            box_header.push_str(" xy xz yz");
        }
        for boundary in snapshot.boundaries.iter() {
            box_header.push(' ');
            box_header.push_str(boundary);
        }
        writeln!(self.writer, "{}", box_header).map_err(|_| WriteDumpError::CouldNotWrite)?;

        for dim in 0..3 {
            let [lo, hi] = snapshot.bounds[dim];
            write!(self.writer, "{} {}", format_sci(lo, 16, 0), format_sci(hi, 16, 0))
                .map_err(|_| WriteDumpError::CouldNotWrite)?;
            if let Some(tilt) = snapshot.tilt {
                write!(self.writer, " {}", format_sci(tilt[dim], 16, 0))
                    .map_err(|_| WriteDumpError::CouldNotWrite)?;
            }
            writeln!(self.writer).map_err(|_| WriteDumpError::CouldNotWrite)?;
        }

        writeln!(
            self.writer,
            "ITEM: {} {}",
            kind.entries_keyword(),
            snapshot.fields.join(" ")
        )
        .map_err(|_| WriteDumpError::CouldNotWrite)?;

        match &snapshot.entries {
            DumpEntries::Raw(lines) => {
                for line in lines {
                    writeln!(self.writer, "{}", line).map_err(|_| WriteDumpError::CouldNotWrite)?;
                }
            }
            DumpEntries::Parsed(table) => {
                if table.n_columns() != snapshot.fields.len() {
                    return Err(WriteDumpError::InvalidEntries);
                }

                for row in table.rows_iter() {
                    let line = row
                        .iter()
                        .map(|x| x.to_string())
                        .collect::<Vec<String>>()
                        .join(" ");
                    writeln!(self.writer, "{}", line).map_err(|_| WriteDumpError::CouldNotWrite)?;
                }
            }
        }

        self.writer
            .flush()
            .map_err(|_| WriteDumpError::CouldNotWrite)?;
        Ok(())
    }
}

/******************************/
/*         UNIT TESTS         */
/******************************/

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::assert_approx_eq;
    use tempfile::NamedTempFile;

    fn read_all(reader: DumpReader) -> Vec<DumpSnapshot> {
        reader.snapshots().map(|x| x.unwrap()).collect()
    }

    #[test]
    fn read_sorted() {
        let snapshots = read_all(DumpReader::open("test_files/dump.lammpstrj").unwrap());
        assert_eq!(snapshots.len(), 3);

        let timesteps: Vec<u64> = snapshots.iter().map(|x| x.timestep()).collect();
        assert_eq!(timesteps, vec![0, 100, 200]);

        for snapshot in snapshots.iter() {
            assert_eq!(snapshot.kind(), DumpKind::Atoms);
            assert_eq!(snapshot.n_entries(), 5);
            assert_eq!(snapshot.boundaries(), &["pp", "pp", "pp"]);
            assert_eq!(
                snapshot.bounds(),
                [[0.0, 30.0], [0.0, 30.0], [-5.0, 25.0]]
            );
            assert!(!snapshot.is_triclinic());
            assert!(!snapshot.is_raw());
            assert_eq!(snapshot.fields(), &["id", "type", "x", "y", "z", "q"]);

            let table = snapshot.get_table().unwrap();
            assert_eq!(
                table.column("id").unwrap(),
                &[
                    Value::Int(1),
                    Value::Int(2),
                    Value::Int(3),
                    Value::Int(4),
                    Value::Int(5)
                ]
            );
        }

        let table = snapshots[0].get_table().unwrap();
        assert_eq!(table.get(2, "x"), Some(&Value::Float(1.2345)));
        assert_eq!(table.get(2, "type"), Some(&Value::Int(2)));
        assert_eq!(table.get(1, "q"), Some(&Value::Float(0.0)));

        let table = snapshots[2].get_table().unwrap();
        assert_eq!(table.get(0, "x"), Some(&Value::Float(11.0)));
    }

    #[test]
    fn read_unsorted() {
        let snapshots =
            read_all(DumpReader::open("test_files/dump.lammpstrj").unwrap().with_sort(false));

        let ids = snapshots[0].column("id").unwrap();
        assert_eq!(
            ids,
            vec![
                Value::Int(3),
                Value::Int(1),
                Value::Int(5),
                Value::Int(2),
                Value::Int(4)
            ]
        );
    }

    #[test]
    fn read_raw() {
        let mut snapshots =
            read_all(DumpReader::open("test_files/dump.lammpstrj").unwrap().with_raw(true));

        let snapshot = &mut snapshots[0];
        assert!(snapshot.is_raw());
        assert!(snapshot.get_table().is_none());
        match snapshot.entries() {
            DumpEntries::Raw(lines) => assert_eq!(lines[0], "3 2 1.2345 2.5 3.75 -0.12"),
            DumpEntries::Parsed(_) => panic!("Snapshot should not be parsed."),
        }

        // reading a column from raw snapshot
        assert_eq!(
            snapshot.column("type").unwrap(),
            vec![
                Value::Int(2),
                Value::Int(1),
                Value::Int(2),
                Value::Int(1),
                Value::Int(3)
            ]
        );

        snapshot.parse(true).unwrap();
        assert!(!snapshot.is_raw());
        assert_eq!(snapshot.get_table().unwrap().get(0, "id"), Some(&Value::Int(1)));
    }

    #[test]
    fn records() {
        let snapshots =
            read_all(DumpReader::open("test_files/dump.lammpstrj").unwrap().with_raw(true));

        let records = snapshots[1].records().unwrap();
        assert_eq!(records.len(), 5);
        assert_eq!(records[2].get("id"), Some(&Value::Int(3)));
        assert_eq!(records[2].get("y"), Some(&Value::Float(2.625)));
        assert_eq!(
            records[2].keys().collect::<Vec<_>>(),
            vec!["id", "type", "x", "y", "z", "q"]
        );
    }

    #[test]
    fn read_gzip() {
        let plain = read_all(DumpReader::open("test_files/dump.lammpstrj").unwrap());
        let compressed = read_all(DumpReader::open("test_files/dump.lammpstrj.gz").unwrap());
        assert_eq!(plain, compressed);
    }

    #[test]
    fn read_step() {
        let timesteps: Vec<u64> = DumpReader::open("test_files/dump.lammpstrj")
            .unwrap()
            .snapshots()
            .with_step(2)
            .unwrap()
            .map(|x| x.unwrap().timestep())
            .collect();

        assert_eq!(timesteps, vec![0, 200]);
    }

    #[test]
    fn read_triclinic() {
        let snapshots = read_all(DumpReader::open("test_files/dump_triclinic.lammpstrj").unwrap());
        assert_eq!(snapshots.len(), 1);

        let snapshot = &snapshots[0];
        assert_eq!(snapshot.timestep(), 1000);
        assert!(snapshot.is_triclinic());
        assert_eq!(snapshot.tilt(), Some([2.0, -1.0, 0.5]));
        assert_eq!(snapshot.boundaries(), &["pp", "pp", "ff"]);

        let simbox = snapshot.simbox();
        assert_eq!(simbox.bounds, [[0.0, 10.0], [-1.0, 7.0], [2.0, 8.0]]);
        assert_approx_eq!(f64, simbox.volume(), 480.0);

        let positions = snapshot.positions().unwrap();
        let expected = [[0.0, -1.0, 2.0], [5.5, 3.25, 5.0], [10.5, 1.0, 2.0]];
        for (position, exp) in positions.iter().zip(expected.iter()) {
            for dim in 0..3 {
                assert_approx_eq!(f64, position[dim], exp[dim]);
            }
        }
    }

    #[test]
    fn positions_cartesian() {
        let snapshots = read_all(DumpReader::open("test_files/dump.lammpstrj").unwrap());
        let positions = snapshots[1].positions().unwrap();
        assert_eq!(positions.len(), 5);
        assert_eq!(positions[0], [10.75, 11.5, 12.25]);
        assert_eq!(positions[4], [4.25, 5.75, -1.25]);
    }

    #[test]
    fn missing_id() {
        let mut iterator = DumpReader::open("test_files/dump_missing_id.lammpstrj")
            .unwrap()
            .snapshots();

        assert_eq!(
            iterator.next().unwrap(),
            Err(ReadError::MissingField(String::from("id")))
        );
        assert!(iterator.next().is_none());

        // without sorting, the file can be read
        let snapshots = read_all(
            DumpReader::open("test_files/dump_missing_id.lammpstrj")
                .unwrap()
                .with_sort(false),
        );
        assert_eq!(snapshots.len(), 1);
        assert_eq!(
            snapshots[0].positions().unwrap(),
            vec![[0.5, 0.5, 0.5], [1.5, 1.5, 1.5]]
        );
    }

    #[test]
    fn truncated() {
        let mut iterator = DumpReader::open("test_files/dump_truncated.lammpstrj")
            .unwrap()
            .snapshots();

        assert_eq!(iterator.next().unwrap().unwrap().timestep(), 0);
        assert_eq!(
            iterator.next().unwrap(),
            Err(ReadError::UnexpectedEof(Box::from(Path::new(
                "test_files/dump_truncated.lammpstrj"
            ))))
        );
        assert!(iterator.next().is_none());
    }

    #[test]
    fn short_row() {
        let mut iterator = DumpReader::open("test_files/dump_short_row.lammpstrj")
            .unwrap()
            .snapshots();

        assert_eq!(
            iterator.next().unwrap(),
            Err(ReadError::ParseLineErr(String::from("2 1 1.5 1.5")))
        );
    }

    #[test]
    fn extra_values() {
        let snapshots = read_all(DumpReader::open("test_files/dump_extra_values.lammpstrj").unwrap());
        assert_eq!(snapshots.len(), 1);
        let table = snapshots[0].get_table().unwrap();
        assert_eq!(table.n_columns(), 6);
        assert_eq!(table.get(2, "x"), Some(&Value::Float(1.2345)));
        assert_eq!(table.get(2, "q"), Some(&Value::Float(-0.12)));

        let mut snapshots = read_all(
            DumpReader::open("test_files/dump_extra_values.lammpstrj")
                .unwrap()
                .with_raw(true),
        );
        assert_eq!(
            snapshots[0].column("q").unwrap()[0],
            Value::Float(-0.12)
        );
        snapshots[0].parse(false).unwrap();
        assert_eq!(
            snapshots[0].get_table().unwrap().get(0, "id"),
            Some(&Value::Int(3))
        );
    }

    #[test]
    fn not_a_dump() {
        match DumpReader::open("test_files/not_a_dump.lammpstrj") {
            Err(ReadError::InvalidHeader(_, format, line)) => {
                assert_eq!(format, "dump");
                assert_eq!(line, "This is not a dump file.");
            }
            _ => panic!("Invalid file was opened."),
        }
    }

    #[test]
    fn nonexistent() {
        match DumpReader::open("test_files/nonexistent.lammpstrj") {
            Err(ReadError::FileNotFound(_)) => (),
            _ => panic!("Nonexistent file was opened."),
        }
    }

    #[test]
    fn to_table() {
        let table = DumpReader::open("test_files/dump.lammpstrj")
            .unwrap()
            .to_table()
            .unwrap();

        assert_eq!(table.n_rows(), 15);
        assert_eq!(
            table.get_column_names(),
            vec!["timestep", "id", "type", "x", "y", "z", "q"]
        );
        assert_eq!(table.get_index_names(), &["timestep"]);
        assert_eq!(table.get(0, "timestep"), Some(&Value::Int(0)));
        assert_eq!(table.get(7, "timestep"), Some(&Value::Int(100)));
        assert_eq!(table.get(14, "id"), Some(&Value::Int(5)));
        assert_eq!(table.get(14, "x"), Some(&Value::Float(4.5)));
    }

    #[test]
    fn write_dump() {
        let output = NamedTempFile::new().unwrap();
        let path_to_output = output.path();

        let mut writer = DumpWriter::create(path_to_output).unwrap();
        for snapshot in DumpReader::open("test_files/dump.lammpstrj").unwrap().snapshots() {
            writer.write_snapshot(&snapshot.unwrap()).unwrap();
        }

        let mut result = File::open(path_to_output).unwrap();
        let mut expected = File::open("test_files/dump_sorted.lammpstrj").unwrap();
        assert!(file_diff::diff_files(&mut result, &mut expected));
    }

    #[test]
    fn write_dump_raw() {
        let output = NamedTempFile::new().unwrap();
        let path_to_output = output.path();

        let mut writer = DumpWriter::create(path_to_output).unwrap();
        for snapshot in DumpReader::open("test_files/dump.lammpstrj")
            .unwrap()
            .with_raw(true)
            .snapshots()
        {
            writer.write_snapshot(&snapshot.unwrap()).unwrap();
        }

        let mut result = File::open(path_to_output).unwrap();
        let mut expected = File::open("test_files/dump.lammpstrj").unwrap();
        assert!(file_diff::diff_files(&mut result, &mut expected));
    }

    #[test]
    fn write_triclinic() {
        let output = NamedTempFile::new().unwrap();
        let path_to_output = output.path();

        let mut writer = DumpWriter::create(path_to_output).unwrap();
        for snapshot in DumpReader::open("test_files/dump_triclinic.lammpstrj")
            .unwrap()
            .snapshots()
        {
            writer.write_snapshot(&snapshot.unwrap()).unwrap();
        }

        let original = read_all(DumpReader::open("test_files/dump_triclinic.lammpstrj").unwrap());
        let written = read_all(DumpReader::open(path_to_output).unwrap());
        assert_eq!(original, written);
    }

    #[test]
    fn new_snapshot() {
        let mut table = Table::new(&["id", "type", "x", "y", "z"]);
        table
            .push_row(vec![
                Value::Int(1),
                Value::Int(1),
                Value::Float(1.0),
                Value::Float(2.0),
                Value::Float(3.0),
            ])
            .unwrap();

        let simbox = SimBox::new([[0.0, 10.0], [-1.0, 7.0], [2.0, 8.0]]).with_tilt([2.0, -1.0, 0.5]);
        let snapshot = DumpSnapshot::new(
            DumpKind::Atoms,
            50,
            &simbox,
            vec!["pp".into(), "pp".into(), "pp".into()],
            table,
        );

        assert_eq!(snapshot.timestep(), 50);
        assert_eq!(snapshot.n_entries(), 1);
        assert_eq!(snapshot.bounds(), [[-1.0, 12.0], [-1.0, 7.5], [2.0, 8.0]]);
        assert_eq!(snapshot.simbox(), simbox);
        assert_eq!(snapshot.fields(), &["id", "type", "x", "y", "z"]);
    }
}
