//! Grade averaging and attendance percentage.

/// A grade value with its optional weight.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GradeSample {
    pub grade: Option<f64>,
    pub weight: Option<f64>,
}

impl GradeSample {
    pub fn new(grade: f64, weight: f64) -> Self {
        Self {
            grade: Some(grade),
            weight: Some(weight),
        }
    }
}

/// Weighted average of a list of grades.
///
/// Grades that are missing or not finite are skipped. If any remaining
/// sample has a positive weight, the result is Σ(grade×weight)/Σ(weight)
/// over the positively weighted samples; otherwise it is the plain mean.
/// Returns `None` when no numeric grade remains.
pub fn weighted_average<I>(samples: I) -> Option<f64>
where
    I: IntoIterator<Item = GradeSample>,
{
    let mut count: usize = 0;
    let mut sum: f64 = 0.0;
    let mut weighted_sum: f64 = 0.0;
    let mut weight_total: f64 = 0.0;

    for sample in samples {
        let grade = match sample.grade {
            Some(g) if g.is_finite() => g,
            _ => continue,
        };
        count += 1;
        sum += grade;

        if let Some(w) = sample.weight.filter(|w| w.is_finite() && *w > 0.0) {
            weighted_sum += grade * w;
            weight_total += w;
        }
    }

    if count == 0 {
        return None;
    }
    if weight_total > 0.0 {
        Some(weighted_sum / weight_total)
    } else {
        Some(sum / count as f64)
    }
}

/// Percentage of attended records: `presentes / total × 100`.
///
/// Returns `None` when there are no records.
pub fn attendance_percentage(presentes: u32, total: u32) -> Option<f64> {
    if total == 0 {
        None
    } else {
        Some(f64::from(presentes) / f64::from(total) * 100.0)
    }
}

/// Rounds to two decimals for presentation.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
