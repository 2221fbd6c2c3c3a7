use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::{RelationKind, RowKind, TimeRange};
use crate::error::{TimelineError, TimelineResult};
use crate::extensions::RowMarker;

/// Outgoing dependency stored on its source row or period.
///
/// `to` is a row id, or a period id when the source is a resource period.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConnectorSpec {
    pub to: String,
    #[serde(default)]
    pub kind: RelationKind,
}

impl ConnectorSpec {
    #[must_use]
    pub fn new(to: impl Into<String>, kind: RelationKind) -> Self {
        Self {
            to: to.into(),
            kind,
        }
    }
}

/// One bar on a resource row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Period {
    pub id: String,
    pub range: TimeRange,
    #[serde(default)]
    pub connectors: Vec<ConnectorSpec>,
}

impl Period {
    #[must_use]
    pub fn new(id: impl Into<String>, range: TimeRange) -> Self {
        Self {
            id: id.into(),
            range,
            connectors: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_connector(mut self, to: impl Into<String>, kind: RelationKind) -> Self {
        self.connectors.push(ConnectorSpec::new(to, kind));
        self
    }
}

/// Row record as seen by the timeline. Tree structure and expansion state
/// belong to the host; the timeline receives rows already flattened in
/// display order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RowItem {
    pub id: String,
    #[serde(default)]
    pub name: String,
    pub kind: RowKind,
    #[serde(default)]
    pub actual: Option<TimeRange>,
    #[serde(default)]
    pub baseline: Option<TimeRange>,
    #[serde(default)]
    pub progress: Option<f64>,
    #[serde(default)]
    pub periods: Vec<Period>,
    #[serde(default)]
    pub connectors: Vec<ConnectorSpec>,
    #[serde(default)]
    pub row_height: Option<f64>,
    #[serde(default)]
    pub markers: Vec<RowMarker>,
}

impl RowItem {
    fn with_kind(id: impl Into<String>, name: impl Into<String>, kind: RowKind) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            kind,
            actual: None,
            baseline: None,
            progress: None,
            periods: Vec::new(),
            connectors: Vec::new(),
            row_height: None,
            markers: Vec::new(),
        }
    }

    #[must_use]
    pub fn task(id: impl Into<String>, name: impl Into<String>, range: TimeRange) -> Self {
        let mut row = Self::with_kind(id, name, RowKind::Task);
        row.actual = Some(range);
        row
    }

    #[must_use]
    pub fn summary(id: impl Into<String>, name: impl Into<String>, range: TimeRange) -> Self {
        let mut row = Self::with_kind(id, name, RowKind::Summary);
        row.actual = Some(range);
        row
    }

    #[must_use]
    pub fn milestone(id: impl Into<String>, name: impl Into<String>, at: f64) -> Self {
        let mut row = Self::with_kind(id, name, RowKind::Milestone);
        row.actual = Some(TimeRange::instant(at));
        row
    }

    #[must_use]
    pub fn resource(id: impl Into<String>, name: impl Into<String>, periods: Vec<Period>) -> Self {
        let mut row = Self::with_kind(id, name, RowKind::ResourcePeriod);
        row.periods = periods;
        row
    }

    #[must_use]
    pub fn with_baseline(mut self, range: TimeRange) -> Self {
        self.baseline = Some(range);
        self
    }

    #[must_use]
    pub fn with_progress(mut self, progress: f64) -> Self {
        self.progress = Some(progress);
        self
    }

    #[must_use]
    pub fn with_connector(mut self, to: impl Into<String>, kind: RelationKind) -> Self {
        self.connectors.push(ConnectorSpec::new(to, kind));
        self
    }

    #[must_use]
    pub fn with_marker(mut self, marker: RowMarker) -> Self {
        self.markers.push(marker);
        self
    }

    #[must_use]
    pub fn with_row_height(mut self, row_height: f64) -> Self {
        self.row_height = Some(row_height);
        self
    }

    /// A row whose actual range is an instant draws as a milestone whatever
    /// its declared kind.
    #[must_use]
    pub fn effective_kind(&self) -> RowKind {
        match (self.kind, self.actual) {
            (RowKind::Task, Some(range)) if range.is_instant() => RowKind::Milestone,
            (kind, _) => kind,
        }
    }

    pub fn validate(&self) -> TimelineResult<()> {
        if self.id.is_empty() {
            return Err(TimelineError::InvalidData(
                "row id must not be empty".to_owned(),
            ));
        }
        if self.kind == RowKind::Baseline {
            return Err(TimelineError::InvalidData(format!(
                "row `{}`: baselines are drawn from the `baseline` field, not as a row kind",
                self.id
            )));
        }
        for range in self
            .actual
            .iter()
            .chain(self.baseline.iter())
            .chain(self.periods.iter().map(|period| &period.range))
        {
            TimeRange::new(range.start, range.end).map_err(|err| {
                TimelineError::InvalidData(format!("row `{}`: {err}", self.id))
            })?;
        }
        if let Some(progress) = self.progress
            && (!progress.is_finite() || !(0.0..=1.0).contains(&progress))
        {
            return Err(TimelineError::InvalidData(format!(
                "row `{}`: progress must be finite and in [0, 1]",
                self.id
            )));
        }
        for marker in &self.markers {
            marker
                .validate()
                .map_err(|err| TimelineError::InvalidData(format!("row `{}`: {err}", self.id)))?;
        }
        if let Some(height) = self.row_height
            && (!height.is_finite() || height <= 0.0)
        {
            return Err(TimelineError::InvalidData(format!(
                "row `{}`: row height must be finite and > 0",
                self.id
            )));
        }
        Ok(())
    }
}

/// Storage collaborator the timeline reads rows from and writes edits to.
///
/// Multi-field edits are wrapped in `suspend_notifications` /
/// `resume_notifications` so observers see one change per gesture.
pub trait TimelineDataStore {
    fn row_count(&self) -> usize;

    fn row(&self, index: usize) -> Option<&RowItem>;

    fn find_row(&self, id: &str) -> Option<usize>;

    /// Row index and period index of the period with `period_id`.
    fn find_period(&self, period_id: &str) -> Option<(usize, usize)> {
        (0..self.row_count()).find_map(|row_index| {
            self.row(row_index).and_then(|row| {
                row.periods
                    .iter()
                    .position(|period| period.id == period_id)
                    .map(|period_index| (row_index, period_index))
            })
        })
    }

    fn set_actual_range(&mut self, row_id: &str, range: TimeRange) -> TimelineResult<()>;

    fn set_baseline_range(&mut self, row_id: &str, range: TimeRange) -> TimelineResult<()>;

    fn set_period_range(
        &mut self,
        row_id: &str,
        period_index: usize,
        range: TimeRange,
    ) -> TimelineResult<()>;

    fn set_progress(&mut self, row_id: &str, progress: f64) -> TimelineResult<()>;

    fn add_connector(
        &mut self,
        row_id: &str,
        period_index: Option<usize>,
        spec: ConnectorSpec,
    ) -> TimelineResult<()>;

    /// Removes every connector on the source matching `to` and `kind`.
    /// Returns how many were removed.
    fn remove_connector(
        &mut self,
        row_id: &str,
        period_index: Option<usize>,
        to: &str,
        kind: RelationKind,
    ) -> TimelineResult<usize>;

    fn suspend_notifications(&mut self);

    fn resume_notifications(&mut self, dispatch: bool);

    /// Monotonic counter bumped once per dispatched change batch.
    fn revision(&self) -> u64;

    /// Smallest range covering every actual, baseline and period range.
    fn data_extent(&self) -> Option<TimeRange> {
        let mut extent: Option<TimeRange> = None;
        for index in 0..self.row_count() {
            let Some(row) = self.row(index) else {
                continue;
            };
            for range in row
                .actual
                .iter()
                .chain(row.baseline.iter())
                .chain(row.periods.iter().map(|period| &period.range))
            {
                extent = Some(match extent {
                    Some(current) => current.union(*range),
                    None => *range,
                });
            }
        }
        extent
    }
}

/// `IndexMap`-backed store keeping rows in insertion (display) order.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    rows: IndexMap<String, RowItem>,
    suspend_depth: u32,
    pending: bool,
    revision: u64,
}

impl InMemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_rows(rows: impl IntoIterator<Item = RowItem>) -> TimelineResult<Self> {
        let mut store = Self::new();
        for row in rows {
            store.push_row(row)?;
        }
        Ok(store)
    }

    /// Appends a row at the end of the display order.
    pub fn push_row(&mut self, row: RowItem) -> TimelineResult<()> {
        row.validate()?;
        if self.rows.contains_key(&row.id) {
            return Err(TimelineError::InvalidData(format!(
                "duplicate row id `{}`",
                row.id
            )));
        }
        self.rows.insert(row.id.clone(), row);
        self.mark_changed();
        Ok(())
    }

    pub fn remove_row(&mut self, row_id: &str) -> Option<RowItem> {
        let removed = self.rows.shift_remove(row_id);
        if removed.is_some() {
            self.mark_changed();
        }
        removed
    }

    pub fn rows(&self) -> impl Iterator<Item = &RowItem> {
        self.rows.values()
    }

    #[must_use]
    pub fn row_by_id(&self, row_id: &str) -> Option<&RowItem> {
        self.rows.get(row_id)
    }

    #[must_use]
    pub fn is_suspended(&self) -> bool {
        self.suspend_depth > 0
    }

    fn row_mut(&mut self, row_id: &str) -> TimelineResult<&mut RowItem> {
        self.rows
            .get_mut(row_id)
            .ok_or_else(|| TimelineError::UnknownRow(row_id.to_owned()))
    }

    fn connectors_mut(
        &mut self,
        row_id: &str,
        period_index: Option<usize>,
    ) -> TimelineResult<&mut Vec<ConnectorSpec>> {
        let row = self.row_mut(row_id)?;
        match period_index {
            None => Ok(&mut row.connectors),
            Some(period_index) => row
                .periods
                .get_mut(period_index)
                .map(|period| &mut period.connectors)
                .ok_or_else(|| TimelineError::UnknownPeriod {
                    row_id: row_id.to_owned(),
                    period_index,
                }),
        }
    }

    fn mark_changed(&mut self) {
        if self.suspend_depth > 0 {
            self.pending = true;
        } else {
            self.revision += 1;
        }
    }
}

impl TimelineDataStore for InMemoryStore {
    fn row_count(&self) -> usize {
        self.rows.len()
    }

    fn row(&self, index: usize) -> Option<&RowItem> {
        self.rows.get_index(index).map(|(_, row)| row)
    }

    fn find_row(&self, id: &str) -> Option<usize> {
        self.rows.get_index_of(id)
    }

    fn set_actual_range(&mut self, row_id: &str, range: TimeRange) -> TimelineResult<()> {
        let range = TimeRange::new(range.start, range.end)?;
        self.row_mut(row_id)?.actual = Some(range);
        self.mark_changed();
        Ok(())
    }

    fn set_baseline_range(&mut self, row_id: &str, range: TimeRange) -> TimelineResult<()> {
        let range = TimeRange::new(range.start, range.end)?;
        self.row_mut(row_id)?.baseline = Some(range);
        self.mark_changed();
        Ok(())
    }

    fn set_period_range(
        &mut self,
        row_id: &str,
        period_index: usize,
        range: TimeRange,
    ) -> TimelineResult<()> {
        let range = TimeRange::new(range.start, range.end)?;
        let row = self.row_mut(row_id)?;
        let period = row
            .periods
            .get_mut(period_index)
            .ok_or_else(|| TimelineError::UnknownPeriod {
                row_id: row_id.to_owned(),
                period_index,
            })?;
        period.range = range;
        self.mark_changed();
        Ok(())
    }

    fn set_progress(&mut self, row_id: &str, progress: f64) -> TimelineResult<()> {
        if !progress.is_finite() || !(0.0..=1.0).contains(&progress) {
            return Err(TimelineError::InvalidData(
                "progress must be finite and in [0, 1]".to_owned(),
            ));
        }
        self.row_mut(row_id)?.progress = Some(progress);
        self.mark_changed();
        Ok(())
    }

    fn add_connector(
        &mut self,
        row_id: &str,
        period_index: Option<usize>,
        spec: ConnectorSpec,
    ) -> TimelineResult<()> {
        let connectors = self.connectors_mut(row_id, period_index)?;
        if connectors.contains(&spec) {
            debug!(row_id, to = %spec.to, "connector already present");
            return Ok(());
        }
        connectors.push(spec);
        self.mark_changed();
        Ok(())
    }

    fn remove_connector(
        &mut self,
        row_id: &str,
        period_index: Option<usize>,
        to: &str,
        kind: RelationKind,
    ) -> TimelineResult<usize> {
        let connectors = self.connectors_mut(row_id, period_index)?;
        let before = connectors.len();
        connectors.retain(|spec| !(spec.to == to && spec.kind == kind));
        let removed = before - connectors.len();
        if removed > 0 {
            self.mark_changed();
        }
        Ok(removed)
    }

    fn suspend_notifications(&mut self) {
        self.suspend_depth += 1;
    }

    fn resume_notifications(&mut self, dispatch: bool) {
        self.suspend_depth = self.suspend_depth.saturating_sub(1);
        if self.suspend_depth == 0 && self.pending {
            self.pending = false;
            if dispatch {
                self.revision += 1;
            }
        }
    }

    fn revision(&self) -> u64 {
        self.revision
    }
}
