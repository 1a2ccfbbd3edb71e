//! Common validation utilities.

use chrono::{Datelike, NaiveDate, Utc};
use validator::ValidationError;

/// Earliest academic year the school keeps records for.
const MIN_ACADEMIC_YEAR: i32 = 2000;

/// How many years ahead a course can be planned.
const MAX_YEARS_AHEAD: i32 = 2;

lazy_static::lazy_static! {
    /// Argentine DNI: 7 or 8 digits, dots optional (e.g. 40.123.456).
    static ref DNI_REGEX: regex::Regex =
        regex::Regex::new(r"^\d{1,2}\.?\d{3}\.?\d{3}$").unwrap();

    /// Phone numbers: digits with optional leading +, spaces and dashes.
    static ref PHONE_REGEX: regex::Regex =
        regex::Regex::new(r"^\+?[0-9][0-9 \-]{5,18}[0-9]$").unwrap();

    /// Storage folder names: lowercase segments separated by slashes.
    static ref FOLDER_REGEX: regex::Regex =
        regex::Regex::new(r"^[a-z0-9_\-]+(/[a-z0-9_\-]+)*$").unwrap();
}

/// Strips the dots a DNI is commonly written with.
pub fn normalize_dni(dni: &str) -> String {
    dni.trim().chars().filter(|c| *c != '.').collect()
}

/// Validates a DNI (7 or 8 digits once normalized).
pub fn validate_dni(dni: &str) -> Result<(), ValidationError> {
    let trimmed = dni.trim();
    let digits = normalize_dni(trimmed);
    if DNI_REGEX.is_match(trimmed) && (7..=8).contains(&digits.len()) {
        Ok(())
    } else {
        let mut err = ValidationError::new("dni_format");
        err.message = Some("El DNI debe tener 7 u 8 dígitos".into());
        Err(err)
    }
}

/// Validates a phone number.
pub fn validate_phone(phone: &str) -> Result<(), ValidationError> {
    if PHONE_REGEX.is_match(phone.trim()) {
        Ok(())
    } else {
        let mut err = ValidationError::new("phone_format");
        err.message = Some("El teléfono no tiene un formato válido".into());
        Err(err)
    }
}

/// Validates that an academic year is within the range the school handles.
pub fn validate_academic_year(year: i32) -> Result<(), ValidationError> {
    let max = Utc::now().year() + MAX_YEARS_AHEAD;
    if (MIN_ACADEMIC_YEAR..=max).contains(&year) {
        Ok(())
    } else {
        let mut err = ValidationError::new("academic_year_range");
        err.message = Some(format!("El año lectivo debe estar entre {} y {}", MIN_ACADEMIC_YEAR, max).into());
        Err(err)
    }
}

/// Validates a storage folder name used for uploaded materials.
pub fn validate_folder(folder: &str) -> Result<(), ValidationError> {
    if folder.len() <= 100 && FOLDER_REGEX.is_match(folder) {
        Ok(())
    } else {
        let mut err = ValidationError::new("folder_format");
        err.message = Some("Nombre de carpeta inválido".into());
        Err(err)
    }
}

/// Validates that a date is not in the future.
pub fn validate_not_future(date: &NaiveDate) -> Result<(), ValidationError> {
    if *date <= Utc::now().date_naive() {
        Ok(())
    } else {
        let mut err = ValidationError::new("date_future");
        err.message = Some("La fecha no puede ser futura".into());
        Err(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_dni() {
        assert!(validate_dni("40123456").is_ok());
        assert!(validate_dni("40.123.456").is_ok());
        assert!(validate_dni("5123456").is_ok());
        assert!(validate_dni(" 40123456 ").is_ok());
    }

    #[test]
    fn test_validate_dni_invalid() {
        assert!(validate_dni("").is_err());
        assert!(validate_dni("123").is_err());
        assert!(validate_dni("401234567").is_err());
        assert!(validate_dni("40a23456").is_err());
    }

    #[test]
    fn test_normalize_dni() {
        assert_eq!(normalize_dni("40.123.456"), "40123456");
        assert_eq!(normalize_dni(" 5123456 "), "5123456");
    }

    #[test]
    fn test_validate_phone() {
        assert!(validate_phone("+54 11 5555-1234").is_ok());
        assert!(validate_phone("1155551234").is_ok());
        assert!(validate_phone("abc").is_err());
        assert!(validate_phone("12").is_err());
    }

    #[test]
    fn test_validate_academic_year() {
        assert!(validate_academic_year(2024).is_ok());
        assert!(validate_academic_year(1999).is_err());
        assert!(validate_academic_year(Utc::now().year() + 10).is_err());
    }

    #[test]
    fn test_validate_folder() {
        assert!(validate_folder("matematica").is_ok());
        assert!(validate_folder("3ro-a/practicos").is_ok());
        assert!(validate_folder("../etc").is_err());
        assert!(validate_folder("/absoluta").is_err());
        assert!(validate_folder("Mayusculas").is_err());
        assert!(validate_folder("").is_err());
    }

    #[test]
    fn test_validate_not_future() {
        let today = Utc::now().date_naive();
        assert!(validate_not_future(&today).is_ok());
        assert!(validate_not_future(&(today + chrono::Duration::days(2))).is_err());
    }

    #[test]
    fn test_error_messages() {
        let err = validate_dni("x").unwrap_err();
        assert_eq!(err.code, "dni_format");
        assert!(err.message.is_some());
    }
}
