//! Time alignment: pick a run's x-axis field and extract (x, y) pairs.
//!
//! The x-axis is chosen per run with the priority `_step`, then
//! `_timestamp`, then the row's ordinal position. Runs are never realigned
//! against each other; each one keeps its own x values.

use runplot_run_model::history::{RawSeries, STEP_COLUMN, TIMESTAMP_COLUMN};
use runplot_run_model::plot::AlignedPoint;

/// The field a run uses as its x-axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum XAxisField {
    /// Logical step counter (`_step`).
    Step,
    /// Wall-clock timestamp (`_timestamp`).
    Timestamp,
    /// Row position within the history.
    Index,
}

impl XAxisField {
    /// Choose the x-axis field for a run from its column set.
    pub fn resolve(series: &RawSeries) -> Self {
        if series.has_column(STEP_COLUMN) {
            XAxisField::Step
        } else if series.has_column(TIMESTAMP_COLUMN) {
            XAxisField::Timestamp
        } else {
            XAxisField::Index
        }
    }

    /// Axis label shown for this field.
    pub fn label(&self) -> &'static str {
        match self {
            XAxisField::Step => "Step",
            XAxisField::Timestamp => "Timestamp",
            XAxisField::Index => "Index",
        }
    }

    /// Backing column, if the field is a named column.
    pub fn column(&self) -> Option<&'static str> {
        match self {
            XAxisField::Step => Some(STEP_COLUMN),
            XAxisField::Timestamp => Some(TIMESTAMP_COLUMN),
            XAxisField::Index => None,
        }
    }

    pub fn is_named(&self) -> bool {
        self.column().is_some()
    }
}

/// A run's metric projected onto its x-axis.
#[derive(Debug, Clone, PartialEq)]
pub struct AlignedSeries {
    pub x_field: XAxisField,
    pub points: Vec<AlignedPoint>,
}

/// Stateless aligner for run histories.
pub struct TimeAligner;

impl TimeAligner {
    /// Align `metric` of one run.
    ///
    /// Returns `None` when the run does not log the metric at all. Rows whose
    /// metric value is null, non-numeric, or non-finite are dropped, as are
    /// rows lacking a usable value for a named x field. The result may be
    /// empty.
    pub fn align(series: &RawSeries, metric: &str) -> Option<AlignedSeries> {
        if !series.has_column(metric) {
            return None;
        }

        let x_field = XAxisField::resolve(series);
        let mut dropped_x = 0usize;

        let points: Vec<AlignedPoint> = series
            .rows
            .iter()
            .enumerate()
            .filter_map(|(idx, row)| {
                let y = row.get(metric).and_then(|v| v.as_f64())?;
                let x = match x_field.column() {
                    Some(column) => match row.get(column).and_then(|v| v.as_f64()) {
                        Some(x) => x,
                        None => {
                            dropped_x += 1;
                            return None;
                        }
                    },
                    None => idx as f64,
                };
                Some(AlignedPoint::new(x, y))
            })
            .collect();

        if dropped_x > 0 {
            tracing::debug!(
                run = %series.label,
                metric,
                dropped = dropped_x,
                "Dropped rows without a {} value",
                x_field.label()
            );
        }

        tracing::debug!(
            run = %series.label,
            metric,
            x_axis = x_field.label(),
            points = points.len(),
            "Aligned run"
        );

        Some(AlignedSeries { x_field, points })
    }
}
