//! Plot-ready data derived from trajectories.
//!
//! Everything here is a pure function of already computed trajectories; no
//! view triggers another integration.

use std::collections::HashSet;
use ds_model::ParameterName;

use crate::trajectory::Trajectory;

/// Axis interval `[min, max]`.
pub type Range = (f64, f64);

fn bounds(values: impl Iterator<Item = f64>) -> Option<Range> {
    values.fold(None, |acc, v| match acc {
        None => Some((v, v)),
        Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
    })
}

fn union(a: Option<Range>, b: Option<Range>) -> Option<Range> {
    match (a, b) {
        (Some(a), Some(b)) => Some((a.0.min(b.0), a.1.max(b.1))),
        (a, None) => a,
        (None, b) => b,
    }
}

/// `s(t)` and `r(t)` sharing one time axis.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeSeriesView {
    pub s: Vec<(f64, f64)>,
    pub r: Vec<(f64, f64)>,
}

impl TimeSeriesView {
    pub fn time_range(&self) -> Option<Range> {
        bounds(self.s.iter().map(|p| p.0))
    }

    /// Range of both cell counts.
    pub fn count_range(&self) -> Option<Range> {
        bounds(self.s.iter().chain(&self.r).map(|p| p.1))
    }
}

impl From<&Trajectory> for TimeSeriesView {
    fn from(traj: &Trajectory) -> Self {
        Self {
            s: traj.iter().map(|x| (x.t, x.s)).collect(),
            r: traj.iter().map(|x| (x.t, x.r)).collect(),
        }
    }
}

/// Two consecutive points of a phase-plane path, pointing forward in time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DirectionMarker {
    pub from: (f64, f64),
    pub to: (f64, f64),
}

/// The curve `(s(t), r(t))` with its starting point and direction markers.
#[derive(Debug, Clone, PartialEq)]
pub struct PhasePlaneView {
    pub path: Vec<(f64, f64)>,
    pub start: (f64, f64),
    pub markers: Vec<DirectionMarker>,
}

/// Relative positions along the path where direction markers are placed.
pub const MARKER_FRACTIONS: [f64; 3] = [0.25, 0.5, 0.75];

impl PhasePlaneView {
    pub fn new(traj: &Trajectory, fractions: &[f64]) -> Self {
        let path: Vec<(f64, f64)> = traj.iter().map(|x| (x.s, x.r)).collect();
        let start = path.first().copied().unwrap_or_default();
        let last = path.len().saturating_sub(1);
        let mut markers = Vec::new();
        for &frac in fractions.iter().filter(|_| last > 0) {
            let i = ((frac.clamp(0.0, 1.0) * last as f64) as usize).min(last - 1);
            let (from, to) = (path[i], path[i + 1]);
            // no direction at rest points
            if from != to {
                markers.push(DirectionMarker { from, to });
            }
        }
        Self { path, start, markers }
    }

    pub fn s_range(&self) -> Option<Range> {
        bounds(self.path.iter().map(|p| p.0))
    }

    pub fn r_range(&self) -> Option<Range> {
        bounds(self.path.iter().map(|p| p.1))
    }
}

impl From<&Trajectory> for PhasePlaneView {
    fn from(traj: &Trajectory) -> Self {
        Self::new(traj, &MARKER_FRACTIONS)
    }
}

/// How overlaid trajectories are told apart in a legend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelBy {
    /// `S0=1.0k, R0=5.0k`
    InitialCondition,
    /// `C = 0.9`
    Parameter(ParameterName),
}

impl LabelBy {
    pub fn label(&self, traj: &Trajectory) -> String {
        let scenario = traj.scenario();
        match self {
            LabelBy::InitialCondition => scenario.initial.to_string(),
            LabelBy::Parameter(name) => format!("{} = {}", name, scenario.parameters.get(*name)),
        }
    }

    /// Like [`LabelBy::label`], but with cell counts at full precision.
    pub fn exact_label(&self, traj: &Trajectory) -> String {
        let initial = traj.scenario().initial;
        match self {
            LabelBy::InitialCondition => format!("S0={}, R0={}", initial.s, initial.r),
            LabelBy::Parameter(_) => self.label(traj),
        }
    }
}

/// One trajectory prepared for an overlay plot.
#[derive(Debug, Clone)]
pub struct OverlayEntry<'a> {
    /// Position in the overlay, also used to pick a colour.
    pub index: usize,
    pub label: String,
    pub trajectory: &'a Trajectory,
    pub time_series: TimeSeriesView,
    pub phase_plane: PhasePlaneView,
}

/// Several trajectories drawn into the same figure.
#[derive(Debug, Clone)]
pub struct Overlay<'a> {
    pub entries: Vec<OverlayEntry<'a>>,
}

impl<'a> Overlay<'a> {
    pub fn new<I>(trajectories: I, label_by: LabelBy) -> Self
    where
        I: IntoIterator<Item = &'a Trajectory>,
    {
        let trajectories: Vec<&'a Trajectory> = trajectories.into_iter().collect();
        let mut labels: Vec<String> = trajectories.iter().map(|t| label_by.label(t)).collect();
        // short labels may collide, e.g. 1000 and 1040 are both 1.0k
        let collide = {
            let mut seen = HashSet::new();
            !labels.iter().all(|l| seen.insert(l.as_str()))
        };
        if collide {
            labels = trajectories.iter().map(|t| label_by.exact_label(t)).collect();
        }

        let entries = trajectories.into_iter().zip(labels).enumerate()
            .map(|(index, (trajectory, label))| OverlayEntry {
                index,
                label,
                trajectory,
                time_series: TimeSeriesView::from(trajectory),
                phase_plane: PhasePlaneView::from(trajectory),
            })
            .collect();
        Self { entries }
    }

    pub fn single(trajectory: &'a Trajectory) -> Self {
        Self::new(std::iter::once(trajectory), LabelBy::InitialCondition)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &OverlayEntry<'a>> {
        self.entries.iter()
    }

    pub fn time_range(&self) -> Option<Range> {
        self.entries.iter().map(|e| e.time_series.time_range()).fold(None, union)
    }

    pub fn count_range(&self) -> Option<Range> {
        self.entries.iter().map(|e| e.time_series.count_range()).fold(None, union)
    }

    pub fn s_range(&self) -> Option<Range> {
        self.entries.iter().map(|e| e.phase_plane.s_range()).fold(None, union)
    }

    pub fn r_range(&self) -> Option<Range> {
        self.entries.iter().map(|e| e.phase_plane.r_range()).fold(None, union)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ds_model::{Parameters, State};
    use crate::simulation::simulate;

    fn example(s0: f64, r0: f64) -> Trajectory {
        let p = Parameters::new(0.5, 1.0, 100.0, 0.1, 0.05, 1.0).unwrap();
        simulate(State::new(s0, r0), &p, (0.0, 50.0), 101).unwrap()
    }

    #[test]
    fn test_time_series_view() {
        let traj = example(50.0, 10.0);
        let view = TimeSeriesView::from(&traj);
        assert_eq!(view.s.len(), 101);
        assert_eq!(view.r.len(), 101);
        assert_eq!(view.s[0], (0.0, 50.0));
        assert_eq!(view.r[0], (0.0, 10.0));
        assert_eq!(view.time_range(), Some((0.0, 50.0)));
        let (lo, hi) = view.count_range().unwrap();
        assert!(lo >= 0.0 && hi <= 100.0 + 1e-3);
        // same t axis for both curves
        assert!(view.s.iter().zip(&view.r).all(|(a, b)| a.0 == b.0));
    }

    #[test]
    fn test_phase_plane_view() {
        let traj = example(50.0, 10.0);
        let view = PhasePlaneView::from(&traj);
        assert_eq!(view.path.len(), 101);
        assert_eq!(view.start, (50.0, 10.0));
        assert_eq!(view.markers.len(), 3);
        for m in &view.markers {
            let i = view.path.iter().position(|p| *p == m.from).unwrap();
            assert_eq!(view.path[i + 1], m.to);
        }
        // r grows towards K, so markers point upwards
        assert!(view.markers.iter().all(|m| m.to.1 > m.from.1));
    }

    #[test]
    fn test_no_markers_at_rest() {
        let traj = example(0.0, 0.0);
        let view = PhasePlaneView::from(&traj);
        assert!(view.markers.is_empty());
        assert_eq!(view.start, (0.0, 0.0));
    }

    #[test]
    fn test_overlay_labels() {
        let a = example(50.0, 10.0);
        let b = example(20.0, 5000.0);
        let trajectories = vec![a, b];
        let overlay = Overlay::new(&trajectories, LabelBy::InitialCondition);
        assert_eq!(overlay.len(), 2);
        assert_eq!(overlay.entries[0].label, "S0=50, R0=10");
        assert_eq!(overlay.entries[1].label, "S0=20, R0=5.0k");
        assert_eq!(overlay.entries[1].index, 1);
        assert!(std::ptr::eq(overlay.entries[1].trajectory, &trajectories[1]));

        let by_c = Overlay::new(&trajectories, LabelBy::Parameter(ParameterName::C));
        assert_eq!(by_c.entries[0].label, "C = 1");
    }

    #[test]
    fn test_overlay_ranges() {
        let trajectories = vec![example(50.0, 10.0), example(5.0, 60.0)];
        let overlay = Overlay::new(&trajectories, LabelBy::InitialCondition);
        let (s_lo, s_hi) = overlay.s_range().unwrap();
        assert!(s_lo >= 0.0 && s_hi >= 50.0);
        let (r_lo, _) = overlay.r_range().unwrap();
        assert!(r_lo <= 10.0);
        assert_eq!(overlay.time_range(), Some((0.0, 50.0)));
        assert_eq!(Overlay::new(&Vec::new(), LabelBy::InitialCondition).count_range(), None);
    }

    #[test]
    fn test_colliding_labels_use_full_precision() {
        let trajectories = vec![example(1000.0, 10.0), example(1040.0, 10.0)];
        let overlay = Overlay::new(&trajectories, LabelBy::InitialCondition);
        assert_eq!(overlay.entries[0].label, "S0=1000, R0=10");
        assert_eq!(overlay.entries[1].label, "S0=1040, R0=10");

        let trajectories = vec![example(1000.0, 10.0), example(2000.0, 10.0)];
        let overlay = Overlay::new(&trajectories, LabelBy::InitialCondition);
        assert_eq!(overlay.entries[0].label, "S0=1.0k, R0=10");
    }
}
