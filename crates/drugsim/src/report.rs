use ds_model::Equilibrium;
use ds_model::format_count;
use ds_dynamics::Trajectory;
use ds_dynamics::views::LabelBy;

/// Share of resistant cells in a population, `None` if it is empty.
pub fn resistant_fraction(s: f64, r: f64) -> Option<f64> {
    let total = s + r;
    (total > 0.0).then(|| r / total)
}

/// One line describing where a trajectory ends up.
pub fn final_state_summary(traj: &Trajectory) -> String {
    let last = traj.last();
    let fraction = resistant_fraction(last.s, last.r)
        .map(|f| format!("{:.1}%", 100.0 * f))
        .unwrap_or_else(|| "-".to_string());
    format!("t = {}: S = {}, R = {}, total = {}, resistant = {}",
        last.t, format_count(last.s), format_count(last.r), format_count(last.total()), fraction)
}

/// Table with one row per trajectory: label, final counts and resistant share.
pub fn overlay_table(trajectories: &[Trajectory], label_by: LabelBy) -> String {
    let labels: Vec<String> = trajectories.iter().map(|t| label_by.label(t)).collect();
    let width = labels.iter().map(|l| l.len()).max().unwrap_or(0).max(5);

    let mut out = format!("{:<width$} {:>12} {:>12} {:>12} {:>10}\n",
        "label", "S(end)", "R(end)", "total", "R share");
    for (label, traj) in labels.iter().zip(trajectories) {
        let last = traj.last();
        let fraction = resistant_fraction(last.s, last.r)
            .map(|f| format!("{:.1}%", 100.0 * f))
            .unwrap_or_else(|| "-".to_string());
        out.push_str(&format!("{:<width$} {:>12} {:>12} {:>12} {:>10}\n",
            label, format_count(last.s), format_count(last.r), format_count(last.total()), fraction));
    }
    out
}

pub fn equilibria_summary(points: &[Equilibrium]) -> String {
    points.iter()
        .map(|e| format!(" - {:<14} {}", format!("{:?}", e.kind), e))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use ds_model::{equilibria, Parameters, State, ParameterName};
    use ds_dynamics::simulate;

    #[test]
    fn test_resistant_fraction() {
        assert_eq!(resistant_fraction(3.0, 1.0), Some(0.25));
        assert_eq!(resistant_fraction(0.0, 0.0), None);
    }

    #[test]
    fn test_final_state_summary() {
        let p = Parameters::new(0.5, 1.0, 100.0, 0.1, 0.05, 1.0).unwrap();
        let traj = simulate(State::new(0.0, 0.0), &p, (0.0, 10.0), 3).unwrap();
        assert_eq!(final_state_summary(&traj), "t = 10: S = 0, R = 0, total = 0, resistant = -");
    }

    #[test]
    fn test_overlay_table() {
        let p = Parameters::new(0.5, 1.0, 100.0, 0.1, 0.05, 1.0).unwrap();
        let trajectories = vec![
            simulate(State::new(50.0, 10.0), &p, (0.0, 10.0), 3).unwrap(),
            simulate(State::new(50.0, 10.0), &p.with(ParameterName::C, 2.0).unwrap(), (0.0, 10.0), 3).unwrap(),
        ];
        let table = overlay_table(&trajectories, LabelBy::Parameter(ParameterName::C));
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[1].starts_with("C = 1"));
        assert!(lines[2].starts_with("C = 2"));
    }

    #[test]
    fn test_equilibria_summary() {
        let text = equilibria_summary(&equilibria(&Parameters::default()));
        assert!(text.lines().next().unwrap().contains("Extinction"));
        assert!(text.contains("(0,160.0k)"));
    }
}
