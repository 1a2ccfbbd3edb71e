//! Subject repository.
//!
//! A subject row has three association tables (courses, teachers and
//! responsible staff). PostgREST gives no multi-table transaction, so
//! creating writes the row and then the association rows, removing the row
//! if a link write fails; updating with an association list replaces the
//! stored list and puts the old one back on failure.

use domain::models::subject::{CreateSubjectRequest, UpdateSubjectRequest};
use domain::models::Subject;
use tracing::warn;
use uuid::Uuid;

use crate::client::PostgrestClient;
use crate::entities::{
    SubjectCourseEntity, SubjectEntity, SubjectResponsibleEntity, SubjectRowEntity,
    SubjectRowPatch, SubjectTeacherEntity, SUBJECT_COLUMNS,
};
use crate::error::UpstreamError;
use crate::query::Query;

const TABLE: &str = "materias";
const COURSES_TABLE: &str = "materias_cursos";
const TEACHERS_TABLE: &str = "materias_docentes";
const RESPONSIBLES_TABLE: &str = "materias_responsables";

/// Filters for listing subjects.
#[derive(Debug, Clone, Default)]
pub struct SubjectFilter<'a> {
    pub curso_id: Option<Uuid>,
    pub docente_id: Option<Uuid>,
    pub q: Option<&'a str>,
}

fn dedup(ids: &[Uuid]) -> Vec<Uuid> {
    let mut out: Vec<Uuid> = Vec::with_capacity(ids.len());
    for id in ids {
        if !out.contains(id) {
            out.push(*id);
        }
    }
    out
}

/// The three association tables of a subject.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Link {
    Courses,
    Teachers,
    Responsibles,
}

impl Link {
    fn table(self) -> &'static str {
        match self {
            Link::Courses => COURSES_TABLE,
            Link::Teachers => TEACHERS_TABLE,
            Link::Responsibles => RESPONSIBLES_TABLE,
        }
    }

    fn current(self, subject: &Subject) -> &[Uuid] {
        match self {
            Link::Courses => &subject.curso_ids,
            Link::Teachers => &subject.docente_ids,
            Link::Responsibles => &subject.responsable_ids,
        }
    }
}

#[derive(Clone)]
pub struct SubjectRepository {
    client: PostgrestClient,
}

impl SubjectRepository {
    pub fn new(client: PostgrestClient) -> Self {
        Self { client }
    }

    async fn ids_linked(
        &self,
        table: &str,
        column: &str,
        value: Uuid,
    ) -> Result<Vec<Uuid>, UpstreamError> {
        #[derive(serde::Deserialize)]
        struct Row {
            materia_id: Uuid,
        }
        let query = Query::new().select("materia_id").eq(column, value);
        let rows: Vec<Row> = self.client.select(table, &query).await?;
        Ok(dedup(&rows.into_iter().map(|r| r.materia_id).collect::<Vec<_>>()))
    }

    pub async fn list(&self, filter: &SubjectFilter<'_>) -> Result<Vec<Subject>, UpstreamError> {
        let mut restrict: Option<Vec<Uuid>> = None;
        if let Some(curso_id) = filter.curso_id {
            restrict = Some(self.ids_linked(COURSES_TABLE, "curso_id", curso_id).await?);
        }
        if let Some(docente_id) = filter.docente_id {
            let ids = self.ids_linked(TEACHERS_TABLE, "docente_id", docente_id).await?;
            restrict = Some(match restrict {
                Some(prev) => prev.into_iter().filter(|id| ids.contains(id)).collect(),
                None => ids,
            });
        }

        let mut query = Query::new()
            .select(SUBJECT_COLUMNS)
            .search(&["nombre", "descripcion"], filter.q);
        if let Some(ids) = restrict {
            if ids.is_empty() {
                return Ok(Vec::new());
            }
            query = query.in_list("id", ids);
        }
        let rows: Vec<SubjectEntity> = self.client.select(TABLE, &query.order("nombre", true)).await?;
        Ok(rows.into_iter().map(Subject::from).collect())
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Subject>, UpstreamError> {
        let query = Query::new().select(SUBJECT_COLUMNS).eq("id", id);
        let row: Option<SubjectEntity> = self.client.select_one(TABLE, &query).await?;
        Ok(row.map(Subject::from))
    }

    /// Writes the row, then its links. A failed link write removes the
    /// row again so no half-linked subject is left behind.
    pub async fn create(&self, request: &CreateSubjectRequest) -> Result<Subject, UpstreamError> {
        let row = SubjectRowPatch {
            nombre: Some(request.nombre.trim().to_string()),
            descripcion: request.descripcion.clone(),
        };
        let created: SubjectRowEntity = self.client.insert_one(TABLE, &row).await?;

        for (link, ids) in [
            (Link::Courses, &request.curso_ids),
            (Link::Teachers, &request.docente_ids),
            (Link::Responsibles, &request.responsable_ids),
        ] {
            if let Err(e) = self.write_links(link, created.id, ids).await {
                warn!(
                    materia_id = %created.id,
                    table = link.table(),
                    error = %e,
                    "Writing subject links failed, removing subject"
                );
                self.discard(created.id).await;
                return Err(e);
            }
        }

        Ok(Subject {
            id: created.id,
            nombre: created.nombre,
            descripcion: created.descripcion,
            curso_ids: dedup(&request.curso_ids),
            docente_ids: dedup(&request.docente_ids),
            responsable_ids: dedup(&request.responsable_ids),
        })
    }

    /// Returns `None` when the subject does not exist. Each given list
    /// replaces the stored one; if a replacement fails, the lists already
    /// replaced by this call are put back.
    pub async fn update(
        &self,
        id: Uuid,
        request: &UpdateSubjectRequest,
    ) -> Result<Option<Subject>, UpstreamError> {
        if request.touches_row() {
            let patch = SubjectRowPatch {
                nombre: request.nombre.as_ref().map(|n| n.trim().to_string()),
                descripcion: request.descripcion.clone(),
            };
            let query = Query::new().eq("id", id).select("id,nombre,descripcion");
            let rows: Vec<SubjectRowEntity> = self.client.update(TABLE, &query, &patch).await?;
            if rows.is_empty() {
                return Ok(None);
            }
        }

        let changes: Vec<(Link, &Vec<Uuid>)> = [
            (Link::Courses, request.curso_ids.as_ref()),
            (Link::Teachers, request.docente_ids.as_ref()),
            (Link::Responsibles, request.responsable_ids.as_ref()),
        ]
        .into_iter()
        .filter_map(|(link, ids)| ids.map(|ids| (link, ids)))
        .collect();

        let Some(existing) = self.find_by_id(id).await? else {
            return Ok(None);
        };
        if changes.is_empty() {
            return Ok(Some(existing));
        }

        let mut replaced: Vec<Link> = Vec::new();
        for (link, ids) in changes {
            if let Err(e) = self.replace_links(link, id, link.current(&existing), ids).await {
                for done in replaced {
                    self.restore_links(done, id, done.current(&existing)).await;
                }
                return Err(e);
            }
            replaced.push(link);
        }

        self.find_by_id(id).await
    }

    pub async fn delete(&self, id: Uuid) -> Result<bool, UpstreamError> {
        let query = Query::new().eq("id", id).select("id");
        let rows: Vec<serde_json::Value> = self.client.delete(TABLE, &query).await?;
        Ok(!rows.is_empty())
    }

    pub async fn count(&self) -> Result<u64, UpstreamError> {
        self.client.count(TABLE, &Query::new().select("id")).await
    }

    async fn clear_links(&self, table: &str, materia_id: Uuid) -> Result<(), UpstreamError> {
        let query = Query::new().eq("materia_id", materia_id).select("materia_id");
        let _: Vec<serde_json::Value> = self.client.delete(table, &query).await?;
        Ok(())
    }

    async fn write_links(&self, link: Link, materia_id: Uuid, ids: &[Uuid]) -> Result<(), UpstreamError> {
        match link {
            Link::Courses => self.write_courses(materia_id, ids).await,
            Link::Teachers => self.write_teachers(materia_id, ids).await,
            Link::Responsibles => self.write_responsibles(materia_id, ids).await,
        }
    }

    /// Clears and rewrites one list. The insert is a single statement, so
    /// on failure nothing new was stored and `previous` is written back.
    async fn replace_links(
        &self,
        link: Link,
        materia_id: Uuid,
        previous: &[Uuid],
        ids: &[Uuid],
    ) -> Result<(), UpstreamError> {
        self.clear_links(link.table(), materia_id).await?;
        if let Err(e) = self.write_links(link, materia_id, ids).await {
            warn!(
                materia_id = %materia_id,
                table = link.table(),
                error = %e,
                "Replacing subject links failed, restoring previous list"
            );
            self.restore_links(link, materia_id, previous).await;
            return Err(e);
        }
        Ok(())
    }

    async fn restore_links(&self, link: Link, materia_id: Uuid, previous: &[Uuid]) {
        let restored = match self.clear_links(link.table(), materia_id).await {
            Ok(()) => self.write_links(link, materia_id, previous).await,
            Err(e) => Err(e),
        };
        if let Err(e) = restored {
            warn!(
                materia_id = %materia_id,
                table = link.table(),
                error = %e,
                "Restoring subject links failed"
            );
        }
    }

    /// Best-effort removal of a subject created by a failed `create`.
    async fn discard(&self, materia_id: Uuid) {
        for link in [Link::Courses, Link::Teachers, Link::Responsibles] {
            if let Err(e) = self.clear_links(link.table(), materia_id).await {
                warn!(materia_id = %materia_id, table = link.table(), error = %e, "Removing subject links failed");
            }
        }
        if let Err(e) = self.delete(materia_id).await {
            warn!(materia_id = %materia_id, error = %e, "Removing subject failed");
        }
    }

    async fn write_courses(&self, materia_id: Uuid, ids: &[Uuid]) -> Result<(), UpstreamError> {
        let rows: Vec<SubjectCourseEntity> = dedup(ids)
            .into_iter()
            .map(|curso_id| SubjectCourseEntity {
                materia_id,
                curso_id,
            })
            .collect();
        if rows.is_empty() {
            return Ok(());
        }
        self.client.insert_minimal(COURSES_TABLE, &rows).await
    }

    async fn write_teachers(&self, materia_id: Uuid, ids: &[Uuid]) -> Result<(), UpstreamError> {
        let rows: Vec<SubjectTeacherEntity> = dedup(ids)
            .into_iter()
            .map(|docente_id| SubjectTeacherEntity {
                materia_id,
                docente_id,
            })
            .collect();
        if rows.is_empty() {
            return Ok(());
        }
        self.client.insert_minimal(TEACHERS_TABLE, &rows).await
    }

    async fn write_responsibles(&self, materia_id: Uuid, ids: &[Uuid]) -> Result<(), UpstreamError> {
        let rows: Vec<SubjectResponsibleEntity> = dedup(ids)
            .into_iter()
            .map(|responsable_id| SubjectResponsibleEntity {
                materia_id,
                responsable_id,
            })
            .collect();
        if rows.is_empty() {
            return Ok(());
        }
        self.client.insert_minimal(RESPONSIBLES_TABLE, &rows).await
    }
}
