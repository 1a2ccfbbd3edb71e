//! Multipart form reading and enrollment document listings.

use axum::extract::multipart::{Field, Multipart};
use domain::models::enrollment::{EnrollmentDocument, NewEnrollmentApplication};
use domain::models::DocumentTag;
use persistence::StorageObject;

use crate::error::ApiError;

/// Content types accepted for enrollment documents.
const DOCUMENT_CONTENT_TYPES: &[&str] = &["application/pdf", "image/jpeg", "image/png", "image/webp"];

const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// A file part read into memory.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub filename: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// Parsed enrollment submission.
#[derive(Debug, Default)]
pub struct EnrollmentForm {
    pub application: NewEnrollmentApplication,
    pub documents: Vec<(DocumentTag, UploadedFile)>,
}

/// Parsed material upload.
#[derive(Debug)]
pub struct MaterialForm {
    pub carpeta: String,
    pub file: UploadedFile,
}

/// Tag for a file field: `<tag>`, `documento_<tag>` or the generic
/// `documentos`.
pub fn document_tag_for_field(name: &str) -> Option<DocumentTag> {
    if name == "documentos" {
        return Some(DocumentTag::Otro);
    }
    let tag = name.strip_prefix("documento_").unwrap_or(name);
    tag.parse().ok()
}

/// Reads a file part, failing as soon as it exceeds `max_bytes`.
async fn read_file(mut field: Field<'_>, max_bytes: usize) -> Result<UploadedFile, ApiError> {
    let filename = field.file_name().unwrap_or("archivo").to_string();
    let content_type = field
        .content_type()
        .unwrap_or(DEFAULT_CONTENT_TYPE)
        .to_string();

    let mut bytes: Vec<u8> = Vec::new();
    while let Some(chunk) = field.chunk().await? {
        if bytes.len() + chunk.len() > max_bytes {
            return Err(ApiError::Validation(format!(
                "El archivo {} supera el tamaño máximo de {} MB",
                filename,
                max_bytes / (1024 * 1024)
            )));
        }
        bytes.extend_from_slice(&chunk);
    }
    if bytes.is_empty() {
        return Err(ApiError::Validation(format!("El archivo {} está vacío", filename)));
    }

    Ok(UploadedFile {
        filename,
        content_type,
        bytes,
    })
}

/// Reads applicant and tutor fields plus document files.
pub async fn read_enrollment_form(
    multipart: &mut Multipart,
    max_file_bytes: usize,
    max_documents: usize,
) -> Result<EnrollmentForm, ApiError> {
    let mut form = EnrollmentForm::default();

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();

        if field.file_name().is_some() {
            let tag = document_tag_for_field(&name).ok_or_else(|| {
                ApiError::Validation(format!("Tipo de documento desconocido: {}", name))
            })?;
            if form.documents.len() >= max_documents {
                return Err(ApiError::Validation(format!(
                    "Se admiten hasta {} documentos",
                    max_documents
                )));
            }
            let file = read_file(field, max_file_bytes).await?;
            if !DOCUMENT_CONTENT_TYPES.contains(&file.content_type.as_str()) {
                return Err(ApiError::Validation(format!(
                    "Formato no admitido para {}: se aceptan PDF o imágenes",
                    file.filename
                )));
            }
            form.documents.push((tag, file));
            continue;
        }

        let value = field.text().await?;
        match form.application.set_field(&name, value) {
            Ok(true) => {}
            Ok(false) => tracing::debug!(field = %name, "Ignoring unknown enrollment field"),
            Err(message) => return Err(ApiError::Validation(message)),
        }
    }

    Ok(form)
}

/// Reads the single file and `carpeta` field of a material upload.
pub async fn read_material_form(
    multipart: &mut Multipart,
    max_file_bytes: usize,
) -> Result<MaterialForm, ApiError> {
    let mut carpeta: Option<String> = None;
    let mut file: Option<UploadedFile> = None;

    while let Some(field) = multipart.next_field().await? {
        if field.file_name().is_some() {
            if file.is_some() {
                return Err(ApiError::Validation("Se admite un solo archivo".into()));
            }
            file = Some(read_file(field, max_file_bytes).await?);
            continue;
        }
        if field.name() == Some("carpeta") {
            carpeta = Some(field.text().await?.trim().to_string());
        }
    }

    let carpeta = carpeta
        .filter(|c| !c.is_empty())
        .ok_or_else(|| ApiError::Validation("Indicá la carpeta de destino".into()))?;
    shared::validation::validate_folder(&carpeta)
        .map_err(|_| ApiError::Validation("Nombre de carpeta inválido".into()))?;
    let file = file.ok_or_else(|| ApiError::Validation("Adjuntá un archivo".into()))?;

    Ok(MaterialForm { carpeta, file })
}

/// Documents of one application among the objects in the applicant's
/// folder. Objects are named `<application id>_<tag>_<timestamp>.<ext>`.
pub fn documents_for_application(
    objects: Vec<StorageObject>,
    folder: &str,
    application_id: &str,
) -> Vec<EnrollmentDocument> {
    let prefix = format!("{}_", application_id);
    objects
        .into_iter()
        .filter(|o| o.is_file() && o.name.starts_with(&prefix))
        .map(|o| EnrollmentDocument {
            tag: DocumentTag::from_object_name(&o.name),
            ruta: format!("{}/{}", folder, o.name),
            nombre: o.name,
            url: None,
        })
        .collect()
}
