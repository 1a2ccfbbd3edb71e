//! Profile entity (database row mapping).

use domain::models::{Profile, Role};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

/// Public columns of `perfiles`. The password column is never selected.
pub const PROFILE_COLUMNS: &str = "id,nombre_completo,correo,dni,telefono,rol";

/// Row mapping for the perfiles table.
#[derive(Debug, Clone, Deserialize)]
pub struct ProfileEntity {
    pub id: Uuid,
    pub nombre_completo: String,
    pub correo: String,
    pub dni: String,
    pub telefono: Option<String>,
    pub rol: String,
}

impl TryFrom<ProfileEntity> for Profile {
    type Error = String;

    fn try_from(entity: ProfileEntity) -> Result<Self, Self::Error> {
        let rol = Role::from_str(&entity.rol)?;
        Ok(Self {
            id: entity.id,
            nombre_completo: entity.nombre_completo,
            correo: entity.correo,
            dni: entity.dni,
            telefono: entity.telefono,
            rol,
        })
    }
}

/// Insert payload for the perfiles table.
#[derive(Debug, Clone, Serialize)]
pub struct NewProfileEntity {
    pub nombre_completo: String,
    pub correo: String,
    pub dni: String,
    pub telefono: Option<String>,
    pub password: String,
    pub rol: Role,
}

/// Partial update for the perfiles table. Absent fields are not sent.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ProfilePatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nombre_completo: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correo: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dni: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub telefono: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rol: Option<Role>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_role_is_rejected() {
        let entity = ProfileEntity {
            id: Uuid::new_v4(),
            nombre_completo: "X".to_string(),
            correo: "x@y.z".to_string(),
            dni: "30111222".to_string(),
            telefono: None,
            rol: "conserje".to_string(),
        };
        assert!(Profile::try_from(entity).is_err());
    }

    #[test]
    fn test_patch_skips_absent_fields() {
        let patch = ProfilePatch {
            rol: Some(Role::Docente),
            ..Default::default()
        };
        assert_eq!(
            serde_json::to_value(&patch).unwrap(),
            serde_json::json!({"rol": "docente"})
        );
    }
}
