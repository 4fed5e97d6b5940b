use rapidkeys::time_series::WpmSnapshot;

/// Chart points as `(seconds, wpm)`
pub fn chart_points(snapshots: &[WpmSnapshot]) -> Vec<(f64, f64)> {
    snapshots.iter().copied().map(Into::into).collect()
}

/// Compute X (seconds) and Y (WPM) bounds for the results chart
pub fn compute_chart_params(points: &[(f64, f64)], duration_secs: u32) -> (f64, f64) {
    let highest_wpm = points.iter().map(|&(_, wpm)| wpm).fold(0.0, f64::max);

    let overall_duration = points
        .last()
        .map_or(duration_secs as f64, |&(t, _)| t.max(duration_secs as f64))
        .max(1.0);

    // leave headroom so the line does not hug the top border
    let y_max = if highest_wpm > 0.0 {
        (highest_wpm + highest_wpm / 10.0).ceil()
    } else {
        10.0
    };

    (overall_duration, y_max)
}

/// Format a simple numeric label consistently
pub fn format_label(val: f64) -> String {
    if (val - val.round()).abs() < f64::EPSILON {
        format!("{}", val.round())
    } else {
        format!("{val:.2}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compute_chart_params_empty() {
        let (x, y) = compute_chart_params(&[], 30);
        assert_eq!(x, 30.0);
        assert_eq!(y, 10.0);
    }

    #[test]
    fn test_compute_chart_params_zero_duration() {
        let (x, _) = compute_chart_params(&[], 0);
        assert_eq!(x, 1.0);
    }

    #[test]
    fn test_compute_chart_params_with_points() {
        let points = chart_points(&[WpmSnapshot::new(2, 50), WpmSnapshot::new(4, 100)]);
        assert_eq!(points, vec![(2.0, 50.0), (4.0, 100.0)]);

        let (x, y) = compute_chart_params(&points, 3);
        assert_eq!(x, 4.0);
        assert_eq!(y, 110.0);
    }

    #[test]
    fn test_format_label() {
        assert_eq!(format_label(1.0), "1");
        assert_eq!(format_label(1.2345), "1.23");
    }
}
