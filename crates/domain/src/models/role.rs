//! Profile roles.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Role of a profile in the school.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Estudiante,
    Docente,
    Preceptor,
    Tutor,
    Directivo,
    Administrador,
}

impl Role {
    pub const ALL: [Role; 6] = [
        Role::Estudiante,
        Role::Docente,
        Role::Preceptor,
        Role::Tutor,
        Role::Directivo,
        Role::Administrador,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Estudiante => "estudiante",
            Role::Docente => "docente",
            Role::Preceptor => "preceptor",
            Role::Tutor => "tutor",
            Role::Directivo => "directivo",
            Role::Administrador => "administrador",
        }
    }

    /// Returns true for school staff (preceptor, directivo, administrador).
    pub fn is_staff(&self) -> bool {
        matches!(
            self,
            Role::Preceptor | Role::Directivo | Role::Administrador
        )
    }

    /// Returns true if this role sees every news item regardless of targeting.
    pub fn sees_all_news(&self) -> bool {
        self.is_staff() || matches!(self, Role::Docente)
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "estudiante" => Ok(Role::Estudiante),
            "docente" => Ok(Role::Docente),
            "preceptor" => Ok(Role::Preceptor),
            "tutor" => Ok(Role::Tutor),
            "directivo" => Ok(Role::Directivo),
            "administrador" => Ok(Role::Administrador),
            _ => Err(format!("Invalid role: {}", s)),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
