//! Attendance repository.

use chrono::NaiveDate;
use domain::models::AttendanceRecord;
use uuid::Uuid;

use crate::client::PostgrestClient;
use crate::error::UpstreamError;
use crate::query::Query;

const TABLE: &str = "asistencias";
const COLUMNS: &str = "id,curso_id,estudiante_id,fecha,estado";
/// One attendance row per student, course and day.
pub const ATTENDANCE_CONFLICT_TARGET: &str = "curso_id,estudiante_id,fecha";

/// Filters for listing attendance.
#[derive(Debug, Clone, Default)]
pub struct AttendanceFilter {
    pub curso_id: Option<Uuid>,
    pub estudiante_ids: Option<Vec<Uuid>>,
    pub fecha: Option<NaiveDate>,
    pub desde: Option<NaiveDate>,
    pub hasta: Option<NaiveDate>,
}

#[derive(Clone)]
pub struct AttendanceRepository {
    client: PostgrestClient,
}

impl AttendanceRepository {
    pub fn new(client: PostgrestClient) -> Self {
        Self { client }
    }

    pub async fn list(&self, filter: &AttendanceFilter) -> Result<Vec<AttendanceRecord>, UpstreamError> {
        let mut query = Query::new()
            .select(COLUMNS)
            .eq_opt("curso_id", filter.curso_id)
            .eq_opt("fecha", filter.fecha);
        if let Some(ids) = &filter.estudiante_ids {
            if ids.is_empty() {
                return Ok(Vec::new());
            }
            query = query.in_list("estudiante_id", ids);
        }
        if let Some(desde) = filter.desde {
            query = query.gte("fecha", desde);
        }
        if let Some(hasta) = filter.hasta {
            query = query.lte("fecha", hasta);
        }
        let query = query.order("fecha", false).order("estudiante_id", true);
        self.client.select(TABLE, &query).await
    }

    /// All attendance rows of the given students.
    pub async fn for_students(&self, ids: &[Uuid]) -> Result<Vec<AttendanceRecord>, UpstreamError> {
        self.list(&AttendanceFilter {
            estudiante_ids: Some(ids.to_vec()),
            ..Default::default()
        })
        .await
    }

    /// Inserts or overwrites one day of attendance.
    pub async fn upsert(&self, records: &[AttendanceRecord]) -> Result<Vec<AttendanceRecord>, UpstreamError> {
        if records.is_empty() {
            return Ok(Vec::new());
        }
        self.client
            .upsert(TABLE, records, ATTENDANCE_CONFLICT_TARGET)
            .await
    }
}
