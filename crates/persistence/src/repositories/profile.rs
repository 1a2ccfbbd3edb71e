//! Profile repository.

use domain::models::{Profile, Role};
use serde::Serialize;
use shared::pagination::PageRequest;
use tracing::warn;
use uuid::Uuid;

use crate::client::{ApiKey, PostgrestClient};
use crate::entities::{NewProfileEntity, ProfileEntity, ProfilePatch, PROFILE_COLUMNS};
use crate::error::UpstreamError;
use crate::query::Query;

const TABLE: &str = "perfiles";
const CREDENTIALS_RPC: &str = "validar_credenciales_perfil";
const SEARCH_COLUMNS: &[&str] = &["nombre_completo", "correo", "dni"];

/// Filters for listing profiles.
#[derive(Debug, Clone, Default)]
pub struct ProfileFilter<'a> {
    pub rol: Option<Role>,
    pub q: Option<&'a str>,
}

#[derive(Serialize)]
struct CredentialsArgs<'a> {
    p_identificador: &'a str,
    p_password: &'a str,
}

fn into_profiles(rows: Vec<ProfileEntity>) -> Vec<Profile> {
    rows.into_iter()
        .filter_map(|row| {
            let id = row.id;
            match Profile::try_from(row) {
                Ok(p) => Some(p),
                Err(e) => {
                    warn!(profile_id = %id, error = %e, "Skipping profile with unknown role");
                    None
                }
            }
        })
        .collect()
}

fn into_profile(row: ProfileEntity) -> Result<Profile, UpstreamError> {
    Profile::try_from(row).map_err(UpstreamError::Decode)
}

/// Repository for the perfiles table.
#[derive(Clone)]
pub struct ProfileRepository {
    client: PostgrestClient,
}

impl ProfileRepository {
    pub fn new(client: PostgrestClient) -> Self {
        Self { client }
    }

    /// Checks an email-or-DNI and password pair through the database
    /// function, with the public key.
    pub async fn verify_credentials(
        &self,
        identificador: &str,
        password: &str,
    ) -> Result<Option<Profile>, UpstreamError> {
        let args = CredentialsArgs {
            p_identificador: identificador,
            p_password: password,
        };
        let rows: Vec<ProfileEntity> = self
            .client
            .rpc(CREDENTIALS_RPC, &args, ApiKey::Anon)
            .await?;
        rows.into_iter().next().map(into_profile).transpose()
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Profile>, UpstreamError> {
        let query = Query::new().select(PROFILE_COLUMNS).eq("id", id);
        let row: Option<ProfileEntity> = self.client.select_one(TABLE, &query).await?;
        row.map(into_profile).transpose()
    }

    /// Profiles with the given ids, sorted by name. Unknown ids are ignored.
    pub async fn find_many(&self, ids: &[Uuid]) -> Result<Vec<Profile>, UpstreamError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let query = Query::new()
            .select(PROFILE_COLUMNS)
            .in_list("id", ids)
            .order("nombre_completo", true);
        let rows: Vec<ProfileEntity> = self.client.select(TABLE, &query).await?;
        Ok(into_profiles(rows))
    }

    /// Lists profiles with the total count for pagination.
    pub async fn list(
        &self,
        filter: &ProfileFilter<'_>,
        page: &PageRequest,
    ) -> Result<(Vec<Profile>, Option<u64>), UpstreamError> {
        let query = Query::new()
            .select(PROFILE_COLUMNS)
            .eq_opt("rol", filter.rol)
            .search(SEARCH_COLUMNS, filter.q)
            .order("nombre_completo", true)
            .page(page);
        let (rows, total): (Vec<ProfileEntity>, _) =
            self.client.select_with_count(TABLE, &query).await?;
        Ok((into_profiles(rows), total))
    }

    pub async fn create(&self, profile: &NewProfileEntity) -> Result<Profile, UpstreamError> {
        let row: ProfileEntity = self.client.insert_one(TABLE, profile).await?;
        into_profile(row)
    }

    /// Applies a partial update. Returns `None` when no row matched.
    pub async fn update(
        &self,
        id: Uuid,
        patch: &ProfilePatch,
    ) -> Result<Option<Profile>, UpstreamError> {
        let query = Query::new().eq("id", id).select(PROFILE_COLUMNS);
        let rows: Vec<ProfileEntity> = self.client.update(TABLE, &query, patch).await?;
        rows.into_iter().next().map(into_profile).transpose()
    }

    /// Deletes a profile. Returns false when no row matched.
    pub async fn delete(&self, id: Uuid) -> Result<bool, UpstreamError> {
        let query = Query::new().eq("id", id).select("id");
        let rows: Vec<serde_json::Value> = self.client.delete(TABLE, &query).await?;
        Ok(!rows.is_empty())
    }

    pub async fn count_by_role(&self, rol: Role) -> Result<u64, UpstreamError> {
        let query = Query::new().select("id").eq("rol", rol);
        self.client.count(TABLE, &query).await
    }
}
