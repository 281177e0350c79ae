//! Snapshot-indexed tables.
//!
//! Every time-varying quantity of a solved network (generator dispatch, bus
//! balances, branch flows) is a table with one row per [`Snapshot`] and one
//! column per element. [`SnapshotFrame`] stores such a table row-major with
//! optional cells, so partially populated exports survive the round trip
//! from disk without inventing zeros.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::error::{CopperError, CopperResult};

const SNAPSHOT_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];

/// A discrete timestamp at which the network state was solved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Snapshot(NaiveDateTime);

impl Snapshot {
    #[inline]
    pub fn new(timestamp: NaiveDateTime) -> Self {
        Snapshot(timestamp)
    }

    #[inline]
    pub fn timestamp(&self) -> NaiveDateTime {
        self.0
    }

    /// Time-of-day label used for slider marks, e.g. `06:00:00`.
    pub fn time_label(&self) -> String {
        self.0.format("%H:%M:%S").to_string()
    }
}

impl fmt::Display for Snapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d %H:%M:%S"))
    }
}

impl FromStr for Snapshot {
    type Err = CopperError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        for format in SNAPSHOT_FORMATS {
            if let Ok(ts) = NaiveDateTime::parse_from_str(trimmed, format) {
                return Ok(Snapshot(ts));
            }
        }
        // Daily resolutions are exported without a time component
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
            if let Some(ts) = date.and_hms_opt(0, 0, 0) {
                return Ok(Snapshot(ts));
            }
        }
        Err(CopperError::Parse(format!(
            "unrecognized snapshot timestamp '{trimmed}'"
        )))
    }
}

/// A snapshots × columns table of optional values.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SnapshotFrame {
    snapshots: Vec<Snapshot>,
    columns: Vec<String>,
    data: Vec<Option<f64>>,
    column_lookup: HashMap<String, usize>,
    snapshot_lookup: HashMap<Snapshot, usize>,
}

impl SnapshotFrame {
    /// Creates a table with every cell missing.
    pub fn new(snapshots: Vec<Snapshot>, columns: Vec<String>) -> Self {
        let data = vec![None; snapshots.len() * columns.len()];
        let column_lookup = lookup(&columns);
        let snapshot_lookup = snapshot_lookup(&snapshots);
        Self {
            snapshots,
            columns,
            data,
            column_lookup,
            snapshot_lookup,
        }
    }

    /// Builds a table from one vector per snapshot.
    pub fn from_rows(
        snapshots: Vec<Snapshot>,
        columns: Vec<String>,
        rows: Vec<Vec<Option<f64>>>,
    ) -> CopperResult<Self> {
        if rows.len() != snapshots.len() {
            return Err(CopperError::Validation(format!(
                "{} rows supplied for {} snapshots",
                rows.len(),
                snapshots.len()
            )));
        }
        let width = columns.len();
        let mut data = Vec::with_capacity(rows.len() * width);
        for (i, row) in rows.into_iter().enumerate() {
            if row.len() != width {
                return Err(CopperError::Validation(format!(
                    "row {} has {} values, expected {}",
                    i,
                    row.len(),
                    width
                )));
            }
            data.extend(row);
        }
        let column_lookup = lookup(&columns);
        if column_lookup.len() != columns.len() {
            return Err(CopperError::Validation(
                "duplicate column names in snapshot table".to_string(),
            ));
        }
        let snapshot_lookup = snapshot_lookup(&snapshots);
        Ok(Self {
            snapshots,
            columns,
            data,
            column_lookup,
            snapshot_lookup,
        })
    }

    /// Builds a table from named columns of equal length.
    pub fn from_columns(
        snapshots: Vec<Snapshot>,
        columns: Vec<(String, Vec<Option<f64>>)>,
    ) -> CopperResult<Self> {
        let names: Vec<String> = columns.iter().map(|(name, _)| name.clone()).collect();
        let mut frame = Self::new(snapshots, names);
        if frame.column_lookup.len() != frame.columns.len() {
            return Err(CopperError::Validation(
                "duplicate column names in snapshot table".to_string(),
            ));
        }
        for (col, (name, values)) in columns.into_iter().enumerate() {
            if values.len() != frame.height() {
                return Err(CopperError::Validation(format!(
                    "column '{}' has {} values, expected {}",
                    name,
                    values.len(),
                    frame.height()
                )));
            }
            for (row, value) in values.into_iter().enumerate() {
                frame.set(row, col, value);
            }
        }
        Ok(frame)
    }

    pub fn snapshots(&self) -> &[Snapshot] {
        &self.snapshots
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn height(&self) -> usize {
        self.snapshots.len()
    }

    pub fn width(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.height() == 0 || self.width() == 0
    }

    pub fn column_position(&self, name: &str) -> Option<usize> {
        self.column_lookup.get(name).copied()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_lookup.contains_key(name)
    }

    pub fn snapshot_position(&self, snapshot: &Snapshot) -> Option<usize> {
        self.snapshot_lookup.get(snapshot).copied()
    }

    #[inline]
    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        if row >= self.height() || col >= self.width() {
            return None;
        }
        self.data[row * self.width() + col]
    }

    /// Writes one cell; out-of-range positions are ignored.
    #[inline]
    pub fn set(&mut self, row: usize, col: usize, value: Option<f64>) {
        if row < self.height() && col < self.width() {
            let width = self.width();
            self.data[row * width + col] = value;
        }
    }

    pub fn value(&self, snapshot: &Snapshot, column: &str) -> Option<f64> {
        let row = self.snapshot_position(snapshot)?;
        let col = self.column_position(column)?;
        self.get(row, col)
    }

    /// Value at a row position by column name.
    pub fn value_at(&self, row: usize, column: &str) -> Option<f64> {
        self.column_position(column)
            .and_then(|col| self.get(row, col))
    }

    pub fn row_values(&self, row: usize) -> &[Option<f64>] {
        if row >= self.height() {
            return &[];
        }
        let width = self.width();
        &self.data[row * width..(row + 1) * width]
    }

    pub fn row(&self, row: usize) -> impl Iterator<Item = (&str, Option<f64>)> + '_ {
        self.columns
            .iter()
            .map(String::as_str)
            .zip(self.row_values(row).iter().copied())
    }

    pub fn column(&self, name: &str) -> Option<Vec<Option<f64>>> {
        let col = self.column_position(name)?;
        Some((0..self.height()).map(|row| self.get(row, col)).collect())
    }

    /// Every present cell, row by row.
    pub fn present_values(&self) -> impl Iterator<Item = f64> + '_ {
        self.data.iter().filter_map(|v| *v)
    }

    /// Keeps the columns whose name satisfies `keep`, in order.
    pub fn select_columns(&self, keep: impl Fn(&str) -> bool) -> Self {
        let columns: Vec<String> = self
            .columns
            .iter()
            .filter(|name| keep(name))
            .cloned()
            .collect();
        self.reindex_columns(&columns)
    }

    /// Reorders/extends columns to `columns`; unknown names become missing columns.
    pub fn reindex_columns(&self, columns: &[String]) -> Self {
        let mut out = Self::new(self.snapshots.clone(), columns.to_vec());
        for (new_col, name) in columns.iter().enumerate() {
            if let Some(old_col) = self.column_position(name) {
                for row in 0..self.height() {
                    out.set(row, new_col, self.get(row, old_col));
                }
            }
        }
        out
    }

    /// Applies `f` to every present cell.
    pub fn map(&self, f: impl Fn(f64) -> f64) -> Self {
        let mut out = self.clone();
        for cell in out.data.iter_mut() {
            *cell = cell.map(&f);
        }
        out
    }

    /// Applies `f` to every present cell; `None` results clear the cell.
    pub fn filter_map(&self, f: impl Fn(f64) -> Option<f64>) -> Self {
        let mut out = self.clone();
        for cell in out.data.iter_mut() {
            *cell = cell.and_then(&f);
        }
        out
    }

    /// Clears every present cell for which `keep` is false.
    pub fn mask(&self, keep: impl Fn(f64) -> bool) -> Self {
        self.filter_map(|v| if keep(v) { Some(v) } else { None })
    }

    /// Combines two tables cell by cell, aligned on this table's snapshots
    /// and columns. Cells missing on either side stay missing.
    pub fn zip_with(&self, other: &SnapshotFrame, f: impl Fn(f64, f64) -> Option<f64>) -> Self {
        let mut out = Self::new(self.snapshots.clone(), self.columns.clone());
        let rows: Vec<Option<usize>> = self
            .snapshots
            .iter()
            .map(|s| other.snapshot_position(s))
            .collect();
        let cols: Vec<Option<usize>> = self
            .columns
            .iter()
            .map(|c| other.column_position(c))
            .collect();
        for (row, other_row) in rows.iter().enumerate() {
            let Some(other_row) = other_row else { continue };
            for (col, other_col) in cols.iter().enumerate() {
                let Some(other_col) = other_col else { continue };
                if let (Some(a), Some(b)) = (self.get(row, col), other.get(*other_row, *other_col))
                {
                    out.set(row, col, f(a, b));
                }
            }
        }
        out
    }

    /// Groups columns by `key` and sums each group per snapshot.
    ///
    /// Missing cells are skipped; a group with no present cell in a row sums
    /// to `0.0`. Columns for which `key` returns `None` are dropped. Result
    /// columns are sorted by group name.
    pub fn group_columns_sum(&self, key: impl Fn(&str) -> Option<String>) -> Self {
        let mut groups: BTreeMap<String, Vec<usize>> = BTreeMap::new();
        for (col, name) in self.columns.iter().enumerate() {
            if let Some(group) = key(name) {
                groups.entry(group).or_default().push(col);
            }
        }
        let columns: Vec<String> = groups.keys().cloned().collect();
        let mut out = Self::new(self.snapshots.clone(), columns);
        for (group_col, members) in groups.values().enumerate() {
            for row in 0..self.height() {
                let sum: f64 = members.iter().filter_map(|&col| self.get(row, col)).sum();
                out.set(row, group_col, Some(sum));
            }
        }
        out
    }
}

fn lookup(columns: &[String]) -> HashMap<String, usize> {
    columns
        .iter()
        .enumerate()
        .map(|(i, name)| (name.clone(), i))
        .collect()
}

/// Position of each snapshot; a repeated snapshot resolves to its first row.
pub(crate) fn snapshot_lookup(snapshots: &[Snapshot]) -> HashMap<Snapshot, usize> {
    let mut positions = HashMap::with_capacity(snapshots.len());
    for (i, snapshot) in snapshots.iter().enumerate() {
        positions.entry(*snapshot).or_insert(i);
    }
    positions
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snaps(n: usize) -> Vec<Snapshot> {
        (0..n)
            .map(|h| format!("2013-01-01 {:02}:00:00", h * 2).parse().unwrap())
            .collect()
    }

    fn names(cols: &[&str]) -> Vec<String> {
        cols.iter().map(|c| c.to_string()).collect()
    }

    #[test]
    fn parses_common_snapshot_formats() {
        let a: Snapshot = "2013-01-01 06:00:00".parse().unwrap();
        let b: Snapshot = "2013-01-01T06:00:00".parse().unwrap();
        let c: Snapshot = "2013-01-01 06:00".parse().unwrap();
        assert_eq!(a, b);
        assert_eq!(a, c);
        assert_eq!(a.time_label(), "06:00:00");
        assert_eq!(a.to_string(), "2013-01-01 06:00:00");

        let day: Snapshot = "2013-01-02".parse().unwrap();
        assert_eq!(day.time_label(), "00:00:00");
        assert!("yesterday".parse::<Snapshot>().is_err());
    }

    #[test]
    fn from_rows_rejects_ragged_input() {
        let err = SnapshotFrame::from_rows(
            snaps(2),
            names(&["a", "b"]),
            vec![vec![Some(1.0), Some(2.0)], vec![Some(3.0)]],
        );
        assert!(matches!(err, Err(CopperError::Validation(_))));

        let err = SnapshotFrame::from_rows(snaps(1), names(&["a", "a"]), vec![vec![None, None]]);
        assert!(err.is_err());
    }

    #[test]
    fn lookups_by_snapshot_and_column() {
        let s = snaps(2);
        let frame = SnapshotFrame::from_rows(
            s.clone(),
            names(&["a", "b"]),
            vec![vec![Some(1.0), None], vec![Some(3.0), Some(4.0)]],
        )
        .unwrap();
        assert_eq!(frame.value(&s[1], "b"), Some(4.0));
        assert_eq!(frame.value(&s[0], "b"), None);
        assert_eq!(frame.value(&s[0], "zz"), None);
        assert_eq!(frame.column("a"), Some(vec![Some(1.0), Some(3.0)]));
        let row: Vec<_> = frame.row(1).collect();
        assert_eq!(row, vec![("a", Some(3.0)), ("b", Some(4.0))]);
        assert_eq!(frame.present_values().count(), 3);
    }

    #[test]
    fn snapshot_positions_survive_derived_tables() {
        let mut s = snaps(4);
        s.push(s[1]);
        let frame = SnapshotFrame::new(s.clone(), names(&["a"]));
        assert_eq!(frame.snapshot_position(&s[3]), Some(3));
        // a repeated snapshot resolves to its first row
        assert_eq!(frame.snapshot_position(&s[4]), Some(1));

        let wider = frame.reindex_columns(&names(&["b", "a"]));
        assert_eq!(wider.snapshot_position(&s[2]), Some(2));
        let later: Snapshot = "2013-02-01 00:00:00".parse().unwrap();
        assert_eq!(wider.snapshot_position(&later), None);
    }

    #[test]
    fn group_sum_skips_missing_and_sorts_groups() {
        let frame = SnapshotFrame::from_rows(
            snaps(2),
            names(&["g2 solar", "g1 wind", "g1 solar", "orphan"]),
            vec![
                vec![Some(1.0), Some(2.0), None, Some(9.0)],
                vec![None, Some(5.0), Some(6.0), Some(9.0)],
            ],
        )
        .unwrap();
        let grouped = frame.group_columns_sum(|name| {
            if name == "orphan" {
                None
            } else {
                name.split_whitespace().next().map(str::to_string)
            }
        });
        assert_eq!(grouped.columns(), &names(&["g1", "g2"])[..]);
        assert_eq!(grouped.get(0, 0), Some(2.0));
        assert_eq!(grouped.get(1, 0), Some(11.0));
        // All members missing in a row sum to zero
        assert_eq!(grouped.get(1, 1), Some(0.0));
    }

    #[test]
    fn zip_aligns_on_names() {
        let s = snaps(1);
        let left = SnapshotFrame::from_rows(
            s.clone(),
            names(&["a", "b", "c"]),
            vec![vec![Some(10.0), Some(20.0), Some(30.0)]],
        )
        .unwrap();
        let right = SnapshotFrame::from_rows(
            s,
            names(&["b", "a"]),
            vec![vec![Some(2.0), Some(0.0)]],
        )
        .unwrap();
        let ratio = left.zip_with(&right, |a, b| if b == 0.0 { None } else { Some(a / b) });
        assert_eq!(ratio.get(0, 0), None);
        assert_eq!(ratio.get(0, 1), Some(10.0));
        assert_eq!(ratio.get(0, 2), None);
    }

    #[test]
    fn mask_and_select() {
        let frame = SnapshotFrame::from_rows(
            snaps(1),
            names(&["1004 solar", "1005 onwind", "1005 offwind-ac"]),
            vec![vec![Some(1.0), Some(50.0), Some(3.0)]],
        )
        .unwrap();
        let wind = frame.select_columns(|name| name.contains("wind"));
        assert_eq!(wind.width(), 2);
        let masked = frame.mask(|v| v < 10.0);
        assert_eq!(masked.get(0, 1), None);
        assert_eq!(masked.get(0, 2), Some(3.0));

        let reindexed = frame.reindex_columns(&names(&["1005 onwind", "missing"]));
        assert_eq!(reindexed.get(0, 0), Some(50.0));
        assert_eq!(reindexed.get(0, 1), None);
    }
}
