//! Reshapes attendance and grade rows into dashboard view models.

use std::collections::BTreeMap;

use crate::models::attendance::{AttendanceRecord, AttendanceStatus};
use crate::models::course::Course;
use crate::models::grade::Grade;
use crate::models::profile::Profile;
use crate::models::summary::{AttendanceSummary, StudentOverview, SubjectSummary};
use crate::services::grading::{attendance_percentage, round2, weighted_average, GradeSample};

/// Tallies attendance records by status.
pub fn summarize_attendance<'a, I>(records: I) -> AttendanceSummary
where
    I: IntoIterator<Item = &'a AttendanceRecord>,
{
    let mut summary = AttendanceSummary::default();
    for record in records {
        summary.total += 1;
        match record.estado {
            AttendanceStatus::Presente => summary.presentes += 1,
            AttendanceStatus::LlegadaTarde => summary.llegadas_tarde += 1,
            AttendanceStatus::Ausente => summary.ausentes += 1,
            AttendanceStatus::FaltaJustificada => summary.faltas_justificadas += 1,
        }
    }
    summary.porcentaje = attendance_percentage(summary.presentes, summary.total).map(round2);
    summary
}

/// Groups grades by subject name, newest grade first within a group.
///
/// Names are compared after trimming and lowercasing, and groups are sorted
/// by that key. The first spelling seen is kept for display.
pub fn group_grades_by_subject(grades: Vec<Grade>) -> Vec<SubjectSummary> {
    let mut groups: BTreeMap<String, (String, Vec<Grade>)> = BTreeMap::new();
    for grade in grades {
        let key = grade.materia.trim().to_lowercase();
        let entry = groups
            .entry(key)
            .or_insert_with(|| (grade.materia.trim().to_string(), Vec::new()));
        entry.1.push(grade);
    }

    groups
        .into_values()
        .map(|(materia, mut calificaciones)| {
            calificaciones.sort_by(|a, b| b.fecha.cmp(&a.fecha));
            let promedio = weighted_average(calificaciones.iter().map(|g| GradeSample {
                grade: g.nota,
                weight: g.peso,
            }))
            .map(round2);
            SubjectSummary {
                materia,
                promedio,
                calificaciones,
            }
        })
        .collect()
}

/// Mean of the subject averages that exist.
pub fn overall_average(subjects: &[SubjectSummary]) -> Option<f64> {
    let averages: Vec<f64> = subjects.iter().filter_map(|s| s.promedio).collect();
    if averages.is_empty() {
        None
    } else {
        Some(round2(averages.iter().sum::<f64>() / averages.len() as f64))
    }
}

/// Builds the overview for one student from already-fetched rows.
///
/// `attendance` and `grades` may contain rows of other students; only the
/// rows belonging to `student` are used.
pub fn build_student_overview(
    student: Profile,
    course: Option<Course>,
    attendance: &[AttendanceRecord],
    grades: &[Grade],
) -> StudentOverview {
    let asistencia = summarize_attendance(
        attendance
            .iter()
            .filter(|r| r.estudiante_id == student.id),
    );
    let own_grades: Vec<Grade> = grades
        .iter()
        .filter(|g| g.estudiante_id == student.id)
        .cloned()
        .collect();
    let materias = group_grades_by_subject(own_grades);
    let promedio_general = overall_average(&materias);

    StudentOverview {
        estudiante: student,
        curso: course,
        asistencia,
        materias,
        promedio_general,
    }
}
