// Released under MIT License.
// Copyright (c) 2024 Ladislav Bartos

//! Implementation of a reader of LAMMPS local dump files and of grouped histograms
//! of local quantities.

use std::path::Path;

use getset::{CopyGetters, Getters};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::errors::{HistogramError, ReadError};
use crate::io::dump_io::{
    check_dump_file, read_dump_snapshot, skip_dump_snapshot, snapshots_to_table, DumpKind,
    DumpSnapshot,
};
use crate::io::snapshot_io::{Snapshot, SnapshotRead};
use crate::io::source::TextSource;
use crate::structures::histogram::{trapezoid, Histogram};
use crate::structures::table::Table;
use crate::structures::value::Value;

/// Reader of LAMMPS local dump files (`dump local`).
///
/// ## Notes
/// - Entries of local dumps are never sorted.
pub struct DumpLocalReader {
    source: TextSource,
    raw: bool,
}

impl DumpLocalReader {
    /// Open a LAMMPS local dump file.
    ///
    /// ## Returns
    /// `DumpLocalReader` if the file exists and starts with `ITEM: TIMESTEP`. Otherwise `ReadError`.
    pub fn open(filename: impl AsRef<Path>) -> Result<DumpLocalReader, ReadError> {
        check_dump_file(filename.as_ref(), DumpKind::Local)?;

        Ok(DumpLocalReader {
            source: TextSource::open(filename)?,
            raw: false,
        })
    }

    /// Keep the entries of the snapshots unparsed. Default: `false`.
    pub fn with_raw(mut self, raw: bool) -> Self {
        self.raw = raw;
        self
    }

    /// Read all snapshots into a single table indexed by `timestep`.
    pub fn to_table(self) -> Result<Table, ReadError> {
        snapshots_to_table(self.snapshots(), false)
    }

    /// Calculate histograms of a local quantity, grouped by another quantity
    /// and summed over all snapshots.
    ///
    /// ## Example
    /// Distribution of bond lengths for individual bond types.
    /// ```no_run
    /// use lammps_rs::prelude::*;
    ///
    /// let params = HistogramParams::new("c_dist")
    ///     .with_group_by("c_btype")
    ///     .with_bins(50)
    ///     .with_range(0.8, 1.8);
    ///
    /// let histograms = DumpLocalReader::open("bonds.local")
    ///     .unwrap()
    ///     .histograms(&params)
    ///     .unwrap();
    ///
    /// for (group, table) in histograms.to_tables() {
    ///     table.write_csv(format!("bonds_{}.csv", group)).unwrap();
    /// }
    /// ```
    ///
    /// ## Notes
    /// - If no range is provided, the range of each group is set from the values
    ///   of the group in the first snapshot in which the group appears.
    pub fn histograms(
        mut self,
        params: &HistogramParams,
    ) -> Result<LocalHistograms, HistogramError> {
        let mut histograms = LocalHistograms::new(params.norm);

        self.raw = true;
        while let Some(snapshot) = self.read_snapshot() {
            histograms.add_snapshot(&snapshot?, params)?;
        }

        Ok(histograms)
    }

    /// Calculate histograms of a local quantity in parallel using `n_threads` threads.
    ///
    /// Threads take raw snapshots from the shared reader one at a time,
    /// parse and bin them independently and their histograms are merged at the end.
    ///
    /// ## Returns
    /// - `HistogramError::RangeRequired` if the range of the histograms is not provided.
    /// - `HistogramError::InvalidThreads` if `n_threads` is zero.
    ///
    /// ## Notes
    /// - The result is identical to the result of `DumpLocalReader::histograms`.
    #[cfg(feature = "parallel")]
    pub fn histograms_parallel(
        mut self,
        params: &HistogramParams,
        n_threads: usize,
    ) -> Result<LocalHistograms, HistogramError> {
        if n_threads == 0 {
            return Err(HistogramError::InvalidThreads);
        }

        if params.range.is_none() {
            return Err(HistogramError::RangeRequired);
        }

        self.raw = true;
        let reader = parking_lot::Mutex::new(self);

        std::thread::scope(|s| -> Result<LocalHistograms, HistogramError> {
            let mut handles = Vec::new();

            for _ in 0..n_threads {
                let reader = &reader;
                let handle = s.spawn(move || -> Result<LocalHistograms, HistogramError> {
                    let mut histograms = LocalHistograms::new(params.norm);

                    loop {
                        // the lock is released before the snapshot is processed
                        let snapshot = reader.lock().read_snapshot();
                        match snapshot {
                            None => break,
                            Some(snapshot) => histograms.add_snapshot(&snapshot?, params)?,
                        }
                    }

                    Ok(histograms)
                });

                handles.push(handle);
            }

            let mut result = LocalHistograms::new(params.norm);
            for handle in handles {
                let partial = handle.join().expect(
                    "FATAL LAMMPS_RS ERROR | DumpLocalReader::histograms_parallel | A thread panicked!",
                )?;
                result.merge(partial)?;
            }

            Ok(result)
        })
    }
}

impl SnapshotRead for DumpLocalReader {
    type Snapshot = DumpSnapshot;

    fn read_snapshot(&mut self) -> Option<Result<Self::Snapshot, ReadError>> {
        read_dump_snapshot(&mut self.source, DumpKind::Local, self.raw, false).transpose()
    }

    fn skip_snapshot(&mut self) -> Result<bool, ReadError> {
        skip_dump_snapshot(&mut self.source, DumpKind::Local)
    }
}

/******************************/
/*    HISTOGRAM PARAMETERS    */
/******************************/

fn default_bins() -> usize {
    10
}

fn default_norm() -> bool {
    true
}

/// Parameters of grouped histograms of local quantities.
///
/// Can be constructed using the builder methods or loaded from a YAML file:
/// ```yaml
/// group_by: c_btype
/// field: c_dist
/// bins: 50
/// range: [0.8, 1.8]
/// norm: true
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HistogramParams {
    /// Field used to group the entries. If `None`, all entries form a single group.
    #[serde(default)]
    pub group_by: Option<String>,
    /// Field to calculate the histograms of.
    pub field: String,
    /// Number of bins. Default: 10.
    #[serde(default = "default_bins")]
    pub bins: usize,
    /// Range of the histograms.
    #[serde(default)]
    pub range: Option<(f64, f64)>,
    /// Add normalized probability density to the output tables. Default: `true`.
    #[serde(default = "default_norm")]
    pub norm: bool,
}

impl HistogramParams {
    /// Create new parameters for histograms of `field` with default settings.
    pub fn new(field: &str) -> Self {
        HistogramParams {
            group_by: None,
            field: field.to_owned(),
            bins: default_bins(),
            range: None,
            norm: default_norm(),
        }
    }

    /// Group the entries by the values of the field `group_by`.
    pub fn with_group_by(mut self, group_by: &str) -> Self {
        self.group_by = Some(group_by.to_owned());
        self
    }

    /// Set the number of bins of the histograms.
    pub fn with_bins(mut self, bins: usize) -> Self {
        self.bins = bins;
        self
    }

    /// Set the range of the histograms.
    /// Required when calculating the histograms in parallel.
    pub fn with_range(mut self, lo: f64, hi: f64) -> Self {
        self.range = Some((lo, hi));
        self
    }

    /// Add (or do not add) the column `Norm` to the output tables.
    pub fn with_norm(mut self, norm: bool) -> Self {
        self.norm = norm;
        self
    }

    /// Parse the parameters from a YAML string.
    pub fn from_yaml(string: &str) -> Result<Self, HistogramError> {
        serde_yaml::from_str(string).map_err(|e| HistogramError::ParseParamsErr(e.to_string()))
    }

    /// Read the parameters from a YAML file.
    pub fn from_file(filename: impl AsRef<Path>) -> Result<Self, HistogramError> {
        let string = std::fs::read_to_string(&filename)
            .map_err(|_| HistogramError::FileNotFound(Box::from(filename.as_ref())))?;
        HistogramParams::from_yaml(&string)
    }
}

/******************************/
/*      LOCAL HISTOGRAMS      */
/******************************/

/// Histogram of a single group of entries.
#[derive(Debug, Clone, PartialEq, Getters, CopyGetters)]
pub struct GroupHistogram {
    /// Value of the grouping field (or `all`).
    #[getset(get = "pub")]
    group: Value,
    /// Last timestep that contributed to the histogram.
    #[getset(get_copy = "pub")]
    timestep: u64,
    #[getset(get = "pub")]
    histogram: Histogram,
}

/// Histograms of local quantities summed over snapshots.
#[derive(Debug, Clone, PartialEq)]
pub struct LocalHistograms {
    /// Histograms sorted by group.
    groups: Vec<GroupHistogram>,
    norm: bool,
}

impl LocalHistograms {
    fn new(norm: bool) -> Self {
        LocalHistograms {
            groups: Vec::new(),
            norm,
        }
    }

    /// Get the histograms of all groups.
    pub fn groups(&self) -> &[GroupHistogram] {
        &self.groups
    }

    /// Get the histogram of the target group.
    pub fn get(&self, group: &Value) -> Option<&GroupHistogram> {
        self.find(group).ok().map(|i| &self.groups[i])
    }

    fn find(&self, group: &Value) -> Result<usize, usize> {
        self.groups
            .binary_search_by(|x| x.group.total_cmp(group))
    }

    /// Bin the entries of a snapshot.
    fn add_snapshot(
        &mut self,
        snapshot: &DumpSnapshot,
        params: &HistogramParams,
    ) -> Result<(), HistogramError> {
        let values = snapshot
            .column(&params.field)?
            .iter()
            .map(|x| x.as_f64())
            .collect::<Option<Vec<f64>>>()
            .ok_or_else(|| HistogramError::NotNumeric(params.field.clone()))?;

        let keys = match &params.group_by {
            Some(field) => snapshot.column(field)?,
            None => vec![Value::from("all"); values.len()],
        };

        let mut grouped: Vec<(Value, Vec<f64>)> = Vec::new();
        for (key, value) in keys.into_iter().zip(values) {
            match grouped.binary_search_by(|(x, _)| x.total_cmp(&key)) {
                Ok(i) => grouped[i].1.push(value),
                Err(i) => grouped.insert(i, (key, vec![value])),
            }
        }

        let timestep = snapshot.timestep();
        for (key, values) in grouped {
            let index = match self.find(&key) {
                Ok(i) => i,
                Err(i) => {
                    let range = match params.range {
                        Some(x) => x,
                        None => (
                            values.iter().cloned().fold(f64::INFINITY, f64::min),
                            values.iter().cloned().fold(f64::NEG_INFINITY, f64::max),
                        ),
                    };

                    debug!(
                        "Group '{}' first found at timestep {}, histogram range: {:?}",
                        key, timestep, range
                    );

                    self.groups.insert(
                        i,
                        GroupHistogram {
                            group: key,
                            timestep,
                            histogram: Histogram::new(params.bins, range)?,
                        },
                    );
                    i
                }
            };

            let group = &mut self.groups[index];
            group.histogram.extend(values);
            group.timestep = group.timestep.max(timestep);
        }

        Ok(())
    }

    /// Merge histograms of another set into this set.
    fn merge(&mut self, other: LocalHistograms) -> Result<(), HistogramError> {
        for group in other.groups {
            match self.find(&group.group) {
                Ok(i) => {
                    self.groups[i].histogram.merge(&group.histogram)?;
                    self.groups[i].timestep = self.groups[i].timestep.max(group.timestep);
                }
                Err(i) => self.groups.insert(i, group),
            }
        }

        Ok(())
    }

    /// Convert the histograms into tables, one table per group.
    ///
    /// Each table is indexed by `TimeStep` (last contributing timestep) and `Bin`
    /// (starting from 1) and contains columns `Coord` (centers of the bins), `Count`,
    /// `Count/Total` and, if requested, `Norm` (probability density).
    pub fn to_tables(&self) -> Vec<(Value, Table)> {
        self.groups
            .iter()
            .map(|group| (group.group.clone(), self.group_to_table(group)))
            .collect()
    }

    fn group_to_table(&self, group: &GroupHistogram) -> Table {
        let histogram = &group.histogram;
        let coords = histogram.centers();
        let total = histogram.total() as f64;
        let fractions: Vec<f64> = histogram
            .counts()
            .iter()
            .map(|&c| c as f64 / total)
            .collect();

        let mut columns = vec!["TimeStep", "Bin", "Coord", "Count", "Count/Total"];
        if self.norm {
            columns.push("Norm");
        }
        let mut table = Table::new(&columns);

        let area = trapezoid(&fractions, &coords);
        for (i, &count) in histogram.counts().iter().enumerate() {
            let mut row = vec![
                Value::Int(group.timestep as i64),
                Value::Int(i as i64 + 1),
                Value::Float(coords[i]),
                Value::Int(count as i64),
                Value::Float(fractions[i]),
            ];

            if self.norm {
                row.push(Value::Float(fractions[i] / area));
            }

            if table.push_row(row).is_err() {
                panic!("FATAL LAMMPS_RS ERROR | LocalHistograms::group_to_table | Number of values does not match the number of columns.");
            }
        }

        match table.with_index(&["TimeStep", "Bin"]) {
            Ok(x) => x,
            Err(_) => panic!(
                "FATAL LAMMPS_RS ERROR | LocalHistograms::group_to_table | Index columns do not exist."
            ),
        }
    }
}

/******************************/
/*         UNIT TESTS         */
/******************************/

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::assert_approx_eq;

    fn params() -> HistogramParams {
        HistogramParams::new("c_dist")
            .with_group_by("c_btype")
            .with_bins(2)
    }

    #[test]
    fn read_local() {
        let snapshots: Vec<DumpSnapshot> = DumpLocalReader::open("test_files/dump.local")
            .unwrap()
            .snapshots()
            .map(|x| x.unwrap())
            .collect();

        assert_eq!(snapshots.len(), 2);
        assert_eq!(snapshots[0].kind(), DumpKind::Local);
        assert_eq!(snapshots[1].timestep(), 10);
        assert_eq!(snapshots[1].n_entries(), 4);
        assert_eq!(snapshots[0].fields(), &["index", "c_btype", "c_dist"]);

        let table = snapshots[1].get_table().unwrap();
        assert_eq!(table.get(3, "c_dist"), Some(&Value::Float(1.25)));
        assert_eq!(table.get(3, "index"), Some(&Value::Int(4)));
    }

    #[test]
    fn read_local_raw() {
        let snapshot = DumpLocalReader::open("test_files/dump.local")
            .unwrap()
            .with_raw(true)
            .snapshots()
            .next()
            .unwrap()
            .unwrap();

        assert!(snapshot.is_raw());
        assert_eq!(
            snapshot.column("c_btype").unwrap(),
            vec![Value::Int(1), Value::Int(2), Value::Int(1), Value::Int(2)]
        );
    }

    #[test]
    fn read_atom_dump_as_local() {
        let mut iterator = DumpLocalReader::open("test_files/dump.lammpstrj")
            .unwrap()
            .snapshots();

        match iterator.next().unwrap() {
            Err(ReadError::InvalidHeader(_, format, line)) => {
                assert_eq!(format, "dump local");
                assert_eq!(line, "ITEM: NUMBER OF ATOMS");
            }
            _ => panic!("Atom dump should not be read as a local dump."),
        }
    }

    #[test]
    fn to_table() {
        let table = DumpLocalReader::open("test_files/dump.local")
            .unwrap()
            .to_table()
            .unwrap();

        assert_eq!(table.n_rows(), 8);
        assert_eq!(
            table.get_column_names(),
            vec!["timestep", "index", "c_btype", "c_dist"]
        );
        assert_eq!(table.get(5, "timestep"), Some(&Value::Int(10)));
    }

    #[test]
    fn histograms_grouped() {
        let histograms = DumpLocalReader::open("test_files/dump.local")
            .unwrap()
            .histograms(&params())
            .unwrap();

        assert_eq!(histograms.groups().len(), 2);

        let group1 = histograms.get(&Value::Int(1)).unwrap();
        assert_eq!(group1.timestep(), 10);
        assert_eq!(group1.histogram().counts(), &[2, 2]);
        assert_eq!(group1.histogram().range(), (1.0, 1.2));

        // degenerate range is widened
        let group2 = histograms.get(&Value::Int(2)).unwrap();
        assert_eq!(group2.histogram().counts(), &[0, 3]);
        assert_eq!(group2.histogram().range(), (1.0, 2.0));

        assert!(histograms.get(&Value::Int(3)).is_none());
    }

    #[test]
    fn histograms_ungrouped() {
        let histograms = DumpLocalReader::open("test_files/dump.local")
            .unwrap()
            .histograms(&HistogramParams::new("c_dist").with_bins(2))
            .unwrap();

        assert_eq!(histograms.groups().len(), 1);
        let all = histograms.get(&Value::from("all")).unwrap();
        assert_eq!(all.histogram().range(), (1.0, 1.5));
        assert_eq!(all.histogram().counts(), &[4, 3]);
    }

    #[test]
    fn histograms_range() {
        let histograms = DumpLocalReader::open("test_files/dump.local")
            .unwrap()
            .histograms(&params().with_range(1.0, 2.0))
            .unwrap();

        assert_eq!(
            histograms.get(&Value::Int(1)).unwrap().histogram().counts(),
            &[5, 0]
        );
        assert_eq!(
            histograms.get(&Value::Int(2)).unwrap().histogram().counts(),
            &[0, 3]
        );
    }

    #[test]
    fn histograms_tables() {
        let tables = DumpLocalReader::open("test_files/dump.local")
            .unwrap()
            .histograms(&params())
            .unwrap()
            .to_tables();

        assert_eq!(tables.len(), 2);
        let (group, table) = &tables[0];
        assert_eq!(group, &Value::Int(1));
        assert_eq!(
            table.get_column_names(),
            vec!["TimeStep", "Bin", "Coord", "Count", "Count/Total", "Norm"]
        );
        assert_eq!(table.get_index_names(), &["TimeStep", "Bin"]);
        assert_eq!(table.get(0, "TimeStep"), Some(&Value::Int(10)));
        assert_eq!(table.get(1, "Bin"), Some(&Value::Int(2)));

        let coords = table.column_as_array("Coord").unwrap();
        assert_approx_eq!(f64, coords[0], 1.05, epsilon = 1e-12);
        assert_approx_eq!(f64, coords[1], 1.15, epsilon = 1e-12);

        let norm = table.column_as_array("Norm").unwrap();
        assert_approx_eq!(f64, norm[0], 10.0, epsilon = 1e-9);
        assert_approx_eq!(f64, norm[1], 10.0, epsilon = 1e-9);

        let (_, table) = &tables[1];
        let fractions = table.column_as_array("Count/Total").unwrap();
        assert_approx_eq!(f64, fractions[0], 0.0);
        assert_approx_eq!(f64, fractions[1], 1.0);
        assert_eq!(table.get(1, "Count"), Some(&Value::Int(3)));
        let norm = table.column_as_array("Norm").unwrap();
        assert_approx_eq!(f64, norm[1], 4.0, epsilon = 1e-9);
    }

    #[test]
    fn histograms_tables_no_norm() {
        let tables = DumpLocalReader::open("test_files/dump.local")
            .unwrap()
            .histograms(&params().with_norm(false))
            .unwrap()
            .to_tables();

        assert_eq!(
            tables[0].1.get_column_names(),
            vec!["TimeStep", "Bin", "Coord", "Count", "Count/Total"]
        );
    }

    #[test]
    fn histograms_errors() {
        match DumpLocalReader::open("test_files/dump.local")
            .unwrap()
            .histograms(&HistogramParams::new("c_angle"))
        {
            Err(HistogramError::ReadError(ReadError::MissingField(x))) => {
                assert_eq!(x, "c_angle")
            }
            _ => panic!("Histogram of a nonexistent field was calculated."),
        }

        match DumpLocalReader::open("test_files/dump.local")
            .unwrap()
            .histograms(&params().with_bins(0))
        {
            Err(HistogramError::InvalidBins) => (),
            _ => panic!("Histogram with zero bins was calculated."),
        }
    }

    #[test]
    fn params_from_file() {
        let loaded = HistogramParams::from_file("test_files/histogram_params.yaml").unwrap();
        assert_eq!(loaded, params());
    }

    #[test]
    fn params_from_yaml() {
        let params =
            HistogramParams::from_yaml("field: c_dist\nrange: [0.5, 1.5]\nnorm: false").unwrap();
        assert_eq!(params.group_by, None);
        assert_eq!(params.bins, 10);
        assert_eq!(params.range, Some((0.5, 1.5)));
        assert!(!params.norm);
    }

    #[test]
    fn params_to_yaml() {
        let params = params().with_range(0.8, 1.8);
        let string = serde_yaml::to_string(&params).unwrap();
        assert!(string.contains("group_by: c_btype"));
        assert!(string.contains("field: c_dist"));

        let read = HistogramParams::from_yaml(&string).unwrap();
        assert_eq!(read, params);
    }

    #[test]
    fn params_invalid() {
        match HistogramParams::from_file("test_files/histogram_params_invalid.yaml") {
            Err(HistogramError::ParseParamsErr(_)) => (),
            _ => panic!("Invalid parameters were parsed."),
        }

        match HistogramParams::from_yaml("field: c_dist\nunknown: 1") {
            Err(HistogramError::ParseParamsErr(_)) => (),
            _ => panic!("Unknown field was accepted."),
        }

        match HistogramParams::from_file("test_files/nonexistent.yaml") {
            Err(HistogramError::FileNotFound(_)) => (),
            _ => panic!("Nonexistent file was read."),
        }
    }

    #[cfg(feature = "parallel")]
    #[test]
    fn histograms_parallel() {
        let params = params().with_range(1.0, 2.0);
        let serial = DumpLocalReader::open("test_files/dump.local")
            .unwrap()
            .histograms(&params)
            .unwrap();

        for n_threads in [1, 2, 3, 8] {
            let parallel = DumpLocalReader::open("test_files/dump.local")
                .unwrap()
                .histograms_parallel(&params, n_threads)
                .unwrap();

            assert_eq!(serial, parallel);
        }
    }

    #[cfg(feature = "parallel")]
    #[test]
    fn histograms_parallel_errors() {
        match DumpLocalReader::open("test_files/dump.local")
            .unwrap()
            .histograms_parallel(&params(), 2)
        {
            Err(HistogramError::RangeRequired) => (),
            _ => panic!("Parallel histograms without range were calculated."),
        }

        match DumpLocalReader::open("test_files/dump.local")
            .unwrap()
            .histograms_parallel(&params().with_range(1.0, 2.0), 0)
        {
            Err(HistogramError::InvalidThreads) => (),
            _ => panic!("Parallel histograms with zero threads were calculated."),
        }
    }
}
