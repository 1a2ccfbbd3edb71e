//! Enrollment application (inscripción) domain models.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;
use validator::Validate;

/// Workflow status of an application.
///
/// Staff may move an application between any two statuses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnrollmentStatus {
    #[default]
    SinRevisar,
    Pendiente,
    Completada,
    Rechazada,
}

impl EnrollmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            EnrollmentStatus::SinRevisar => "sin_revisar",
            EnrollmentStatus::Pendiente => "pendiente",
            EnrollmentStatus::Completada => "completada",
            EnrollmentStatus::Rechazada => "rechazada",
        }
    }
}

impl FromStr for EnrollmentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sin_revisar" => Ok(EnrollmentStatus::SinRevisar),
            "pendiente" => Ok(EnrollmentStatus::Pendiente),
            "completada" => Ok(EnrollmentStatus::Completada),
            "rechazada" => Ok(EnrollmentStatus::Rechazada),
            _ => Err(format!("Invalid enrollment status: {}", s)),
        }
    }
}

impl fmt::Display for EnrollmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Kind of document attached to an application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentTag {
    DniEstudiante,
    DniTutor,
    PartidaNacimiento,
    CertificadoEstudios,
    ConstanciaVacunas,
    Foto,
    Otro,
}

impl DocumentTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentTag::DniEstudiante => "dni_estudiante",
            DocumentTag::DniTutor => "dni_tutor",
            DocumentTag::PartidaNacimiento => "partida_nacimiento",
            DocumentTag::CertificadoEstudios => "certificado_estudios",
            DocumentTag::ConstanciaVacunas => "constancia_vacunas",
            DocumentTag::Foto => "foto",
            DocumentTag::Otro => "otro",
        }
    }

    /// Recovers the tag from a stored object name `<id>_<tag>_<timestamp>.<ext>`.
    pub fn from_object_name(name: &str) -> Option<Self> {
        let stem = name.rsplit_once('.').map(|(s, _)| s).unwrap_or(name);
        let (_, rest) = stem.split_once('_')?;
        let (tag, _) = rest.rsplit_once('_')?;
        DocumentTag::from_str(tag).ok()
    }
}

impl FromStr for DocumentTag {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "dni_estudiante" => Ok(DocumentTag::DniEstudiante),
            "dni_tutor" => Ok(DocumentTag::DniTutor),
            "partida_nacimiento" => Ok(DocumentTag::PartidaNacimiento),
            "certificado_estudios" => Ok(DocumentTag::CertificadoEstudios),
            "constancia_vacunas" => Ok(DocumentTag::ConstanciaVacunas),
            "foto" => Ok(DocumentTag::Foto),
            "otro" => Ok(DocumentTag::Otro),
            _ => Err(format!("Invalid document tag: {}", s)),
        }
    }
}

impl fmt::Display for DocumentTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A stored enrollment application.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrollmentApplication {
    pub id: Uuid,
    pub estudiante_nombre: String,
    pub estudiante_apellido: String,
    pub estudiante_dni: String,
    pub estudiante_fecha_nacimiento: Option<NaiveDate>,
    pub estudiante_domicilio: Option<String>,
    pub curso_solicitado: String,
    pub escuela_anterior: Option<String>,
    pub tutor_nombre: String,
    pub tutor_apellido: String,
    pub tutor_dni: String,
    pub tutor_telefono: String,
    pub tutor_correo: String,
    pub tutor_parentesco: Option<String>,
    pub estado: EnrollmentStatus,
    pub observaciones: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

/// Fields of a new application, as submitted by a prospective family.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct NewEnrollmentApplication {
    #[validate(length(min = 1, max = 80, message = "Ingresá el nombre del estudiante"))]
    pub estudiante_nombre: String,

    #[validate(length(min = 1, max = 80, message = "Ingresá el apellido del estudiante"))]
    pub estudiante_apellido: String,

    #[validate(custom(function = "shared::validation::validate_dni"))]
    pub estudiante_dni: String,

    pub estudiante_fecha_nacimiento: Option<NaiveDate>,

    #[validate(length(max = 200, message = "Domicilio demasiado largo"))]
    pub estudiante_domicilio: Option<String>,

    #[validate(length(min = 1, max = 40, message = "Indicá el curso solicitado"))]
    pub curso_solicitado: String,

    #[validate(length(max = 120, message = "Nombre de escuela demasiado largo"))]
    pub escuela_anterior: Option<String>,

    #[validate(length(min = 1, max = 80, message = "Ingresá el nombre del tutor"))]
    pub tutor_nombre: String,

    #[validate(length(min = 1, max = 80, message = "Ingresá el apellido del tutor"))]
    pub tutor_apellido: String,

    #[validate(custom(function = "shared::validation::validate_dni"))]
    pub tutor_dni: String,

    #[validate(custom(function = "shared::validation::validate_phone"))]
    pub tutor_telefono: String,

    #[validate(email(message = "Correo del tutor inválido"))]
    pub tutor_correo: String,

    #[validate(length(max = 40, message = "Parentesco demasiado largo"))]
    pub tutor_parentesco: Option<String>,
}

impl NewEnrollmentApplication {
    /// Assigns a text form field by name. Returns false for unknown fields.
    pub fn set_field(&mut self, name: &str, value: String) -> Result<bool, String> {
        let value = value.trim().to_string();
        let optional = if value.is_empty() {
            None
        } else {
            Some(value.clone())
        };
        match name {
            "estudiante_nombre" => self.estudiante_nombre = value,
            "estudiante_apellido" => self.estudiante_apellido = value,
            "estudiante_dni" => self.estudiante_dni = shared::validation::normalize_dni(&value),
            "estudiante_fecha_nacimiento" => {
                self.estudiante_fecha_nacimiento = match optional {
                    Some(v) => Some(
                        NaiveDate::parse_from_str(&v, "%Y-%m-%d")
                            .map_err(|_| "Fecha de nacimiento inválida".to_string())?,
                    ),
                    None => None,
                }
            }
            "estudiante_domicilio" => self.estudiante_domicilio = optional,
            "curso_solicitado" => self.curso_solicitado = value,
            "escuela_anterior" => self.escuela_anterior = optional,
            "tutor_nombre" => self.tutor_nombre = value,
            "tutor_apellido" => self.tutor_apellido = value,
            "tutor_dni" => self.tutor_dni = shared::validation::normalize_dni(&value),
            "tutor_telefono" => self.tutor_telefono = value,
            "tutor_correo" => self.tutor_correo = value.to_lowercase(),
            "tutor_parentesco" => self.tutor_parentesco = optional,
            _ => return Ok(false),
        }
        Ok(true)
    }
}

/// A document stored for an application.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrollmentDocument {
    pub nombre: String,
    pub ruta: String,
    pub tag: Option<DocumentTag>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// An application together with its documents.
#[derive(Debug, Clone, Serialize)]
pub struct EnrollmentDetail {
    #[serde(flatten)]
    pub application: EnrollmentApplication,
    pub documentos: Vec<EnrollmentDocument>,
}

/// Staff update of an application.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateEnrollmentRequest {
    pub estado: Option<EnrollmentStatus>,

    #[validate(length(max = 1000, message = "Las observaciones admiten hasta 1000 caracteres"))]
    pub observaciones: Option<String>,
}

/// Query parameters for listing applications.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EnrollmentQuery {
    pub estado: Option<EnrollmentStatus>,
    /// Free-text search over applicant and tutor names and DNIs.
    pub q: Option<String>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}
