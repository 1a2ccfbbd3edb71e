//! Profile (account) domain models.

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::role::Role;

/// Public view of a profile. The stored password is never exposed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub id: Uuid,
    pub nombre_completo: String,
    pub correo: String,
    pub dni: String,
    pub telefono: Option<String>,
    pub rol: Role,
}

/// Request payload for the login endpoint.
///
/// `identificador` may be the profile email or DNI.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1, max = 120, message = "Ingresá tu correo o DNI"))]
    pub identificador: String,

    #[validate(length(min = 1, max = 128, message = "Ingresá tu contraseña"))]
    pub password: String,
}

/// Request payload for creating an account.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateProfileRequest {
    #[validate(length(
        min = 1,
        max = 120,
        message = "El nombre debe tener entre 1 y 120 caracteres"
    ))]
    pub nombre_completo: String,

    #[validate(email(message = "Correo electrónico inválido"))]
    pub correo: String,

    #[validate(custom(function = "shared::validation::validate_dni"))]
    pub dni: String,

    #[validate(custom(function = "shared::validation::validate_phone"))]
    pub telefono: Option<String>,

    #[validate(length(
        min = 6,
        max = 128,
        message = "La contraseña debe tener al menos 6 caracteres"
    ))]
    pub password: String,

    pub rol: Role,
}

/// Request payload for updating an account. Absent fields are left as-is.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateProfileRequest {
    #[validate(length(
        min = 1,
        max = 120,
        message = "El nombre debe tener entre 1 y 120 caracteres"
    ))]
    pub nombre_completo: Option<String>,

    #[validate(email(message = "Correo electrónico inválido"))]
    pub correo: Option<String>,

    #[validate(custom(function = "shared::validation::validate_dni"))]
    pub dni: Option<String>,

    #[validate(custom(function = "shared::validation::validate_phone"))]
    pub telefono: Option<String>,

    #[validate(length(
        min = 6,
        max = 128,
        message = "La contraseña debe tener al menos 6 caracteres"
    ))]
    pub password: Option<String>,

    pub rol: Option<Role>,
}

impl UpdateProfileRequest {
    pub fn is_empty(&self) -> bool {
        self.nombre_completo.is_none()
            && self.correo.is_none()
            && self.dni.is_none()
            && self.telefono.is_none()
            && self.password.is_none()
            && self.rol.is_none()
    }
}

/// Query parameters for listing accounts.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListProfilesQuery {
    pub rol: Option<Role>,
    /// Free-text search over name, email and DNI.
    pub q: Option<String>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}
