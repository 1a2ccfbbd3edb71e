//! Object names for files kept in Storage buckets.

use uuid::Uuid;

use crate::models::enrollment::DocumentTag;

const MAX_EXTENSION_LEN: usize = 8;

/// Lowercased extension of an uploaded filename, or `bin` when it has none.
pub fn file_extension(filename: &str) -> String {
    filename
        .rsplit_once('.')
        .map(|(_, ext)| ext.trim().to_lowercase())
        .filter(|ext| {
            !ext.is_empty()
                && ext.len() <= MAX_EXTENSION_LEN
                && ext.chars().all(|c| c.is_ascii_alphanumeric())
        })
        .unwrap_or_else(|| "bin".to_string())
}

/// Folder holding the documents of one applicant.
pub fn document_folder(dni: &str) -> String {
    dni.to_string()
}

/// `<dni>/<application id>_<tag>_<millis>.<ext>`
pub fn document_path(
    dni: &str,
    application_id: Uuid,
    tag: DocumentTag,
    timestamp_millis: i64,
    filename: &str,
) -> String {
    format!(
        "{}/{}_{}_{}.{}",
        document_folder(dni),
        application_id,
        tag.as_str(),
        timestamp_millis,
        file_extension(filename)
    )
}

/// `<folder>/<uuid>.<ext>` for a material upload.
pub fn material_path(folder: &str, object_id: Uuid, filename: &str) -> String {
    format!(
        "{}/{}.{}",
        folder.trim_matches('/'),
        object_id,
        file_extension(filename)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_extension() {
        assert_eq!(file_extension("partida.PDF"), "pdf");
        assert_eq!(file_extension("foto.carnet.jpeg"), "jpeg");
        assert_eq!(file_extension("sin_extension"), "bin");
        assert_eq!(file_extension("raro.p d f"), "bin");
        assert_eq!(file_extension("archivo."), "bin");
    }

    #[test]
    fn test_document_path_layout() {
        let id = Uuid::nil();
        let path = document_path(
            "50111222",
            id,
            DocumentTag::DniTutor,
            1_714_000_000_000,
            "dni frente.png",
        );
        assert_eq!(
            path,
            "50111222/00000000-0000-0000-0000-000000000000_dni_tutor_1714000000000.png"
        );

        let name = path.rsplit_once('/').unwrap().1;
        assert_eq!(DocumentTag::from_object_name(name), Some(DocumentTag::DniTutor));
    }

    #[test]
    fn test_material_path_layout() {
        let id = Uuid::nil();
        assert_eq!(
            material_path("/guias/", id, "unidad1.docx"),
            "guias/00000000-0000-0000-0000-000000000000.docx"
        );
    }
}
