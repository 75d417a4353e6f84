//! Section update payloads and their closed enumerations.
//!
//! Every field is optional: a missing or empty value leaves the stored
//! attribute untouched (partial-update semantics).

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Health insurance options for the general section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Insurance {
    FonasaA,
    FonasaB,
    FonasaC,
    FonasaD,
    Isapre,
    FuerzasArmadas,
    Otro,
}

impl Insurance {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FonasaA => "FONASA_A",
            Self::FonasaB => "FONASA_B",
            Self::FonasaC => "FONASA_C",
            Self::FonasaD => "FONASA_D",
            Self::Isapre => "ISAPRE",
            Self::FuerzasArmadas => "FUERZAS_ARMADAS",
            Self::Otro => "OTRO",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "FONASA_A" => Some(Self::FonasaA),
            "FONASA_B" => Some(Self::FonasaB),
            "FONASA_C" => Some(Self::FonasaC),
            "FONASA_D" => Some(Self::FonasaD),
            "ISAPRE" => Some(Self::Isapre),
            "FUERZAS_ARMADAS" => Some(Self::FuerzasArmadas),
            "OTRO" => Some(Self::Otro),
            _ => None,
        }
    }
}

/// Blood groups for the medical section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum BloodGroup {
    #[serde(rename = "A+")]
    APos,
    #[serde(rename = "A-")]
    ANeg,
    #[serde(rename = "B+")]
    BPos,
    #[serde(rename = "B-")]
    BNeg,
    #[serde(rename = "AB+")]
    AbPos,
    #[serde(rename = "AB-")]
    AbNeg,
    #[serde(rename = "O+")]
    OPos,
    #[serde(rename = "O-")]
    ONeg,
}

impl BloodGroup {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::APos => "A+",
            Self::ANeg => "A-",
            Self::BPos => "B+",
            Self::BNeg => "B-",
            Self::AbPos => "AB+",
            Self::AbNeg => "AB-",
            Self::OPos => "O+",
            Self::ONeg => "O-",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "A+" => Some(Self::APos),
            "A-" => Some(Self::ANeg),
            "B+" => Some(Self::BPos),
            "B-" => Some(Self::BNeg),
            "AB+" => Some(Self::AbPos),
            "AB-" => Some(Self::AbNeg),
            "O+" => Some(Self::OPos),
            "O-" => Some(Self::ONeg),
            _ => None,
        }
    }
}

/// Vaccines tracked by the vaccination section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VaccineType {
    Covid19,
    HepatitisB,
    Varicela,
    Influenza,
}

impl VaccineType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Covid19 => "COVID_19",
            Self::HepatitisB => "HEPATITIS_B",
            Self::Varicela => "VARICELA",
            Self::Influenza => "INFLUENZA",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "COVID_19" => Some(Self::Covid19),
            "HEPATITIS_B" => Some(Self::HepatitisB),
            "VARICELA" => Some(Self::Varicela),
            "INFLUENZA" => Some(Self::Influenza),
            _ => None,
        }
    }
}

/// Serology outcomes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SerologyResultType {
    Positiva,
    Negativa,
    Indeterminada,
}

impl SerologyResultType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Positiva => "POSITIVA",
            Self::Negativa => "NEGATIVA",
            Self::Indeterminada => "INDETERMINADA",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "POSITIVA" => Some(Self::Positiva),
            "NEGATIVA" => Some(Self::Negativa),
            "INDETERMINADA" => Some(Self::Indeterminada),
            _ => None,
        }
    }
}

/// Partial update for the general (personal) section.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct GeneralUpdate {
    pub nombre_legal: Option<String>,
    pub rut: Option<String>,
    pub genero: Option<String>,
    pub fecha_nacimiento: Option<NaiveDate>,
    pub telefono_celular: Option<String>,
    pub direccion_actual: Option<String>,
    pub direccion_origen: Option<String>,
    pub contacto_emergencia_nombre: Option<String>,
    pub contacto_emergencia_parentesco: Option<String>,
    pub contacto_emergencia_telefono: Option<String>,
    pub centro_salud: Option<String>,
    /// Insurance code; validated against [`Insurance`].
    pub seguro: Option<String>,
    pub seguro_detalle: Option<String>,
    pub correo_institucional: Option<String>,
}

/// Partial update for the academic section.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct AcademicUpdate {
    pub nombre_social: Option<String>,
    pub carrera: Option<String>,
    pub anio_cursa: Option<i16>,
    pub estado: Option<String>,
    pub asignatura: Option<String>,
    pub correo_institucional: Option<String>,
    pub correo_personal: Option<String>,
}

/// Partial update for the medical background section.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct MedicalUpdate {
    pub alergias_detalle: Option<String>,
    /// Blood group code; validated against [`BloodGroup`].
    pub grupo_sanguineo: Option<String>,
    pub cronicas_detalle: Option<String>,
    pub medicamentos_detalle: Option<String>,
    pub otros_antecedentes: Option<String>,
}

/// Partial update for the declaration section.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct DeclarationUpdate {
    pub nombre_estudiante: Option<String>,
    pub rut: Option<String>,
    pub firma: Option<String>,
    pub fecha: Option<NaiveDate>,
}

/// One serology entry in a vaccines submission.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct SerologyEntry {
    /// Result code; validated against [`SerologyResultType`].
    pub resultado: String,
    pub fecha: Option<NaiveDate>,
}

/// Full vaccines/serology submission. Unlike the other sections this is a
/// whole-section replace: stored doses and serologies are dropped and
/// re-inserted from this payload.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct VaccinesUpdate {
    #[serde(default)]
    pub covid_fechas: Vec<NaiveDate>,
    #[serde(default)]
    pub hepb_fechas: Vec<NaiveDate>,
    #[serde(default)]
    pub varicela_fechas: Vec<NaiveDate>,
    pub varicela_serologia: Option<SerologyEntry>,
    pub influenza_fecha: Option<NaiveDate>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insurance_round_trip() {
        for i in [
            Insurance::FonasaA,
            Insurance::Isapre,
            Insurance::FuerzasArmadas,
            Insurance::Otro,
        ] {
            assert_eq!(Insurance::parse(i.as_str()), Some(i));
        }
        assert_eq!(Insurance::parse("FONASA_E"), None);
    }

    #[test]
    fn test_blood_group_round_trip() {
        for g in [
            BloodGroup::APos,
            BloodGroup::AbNeg,
            BloodGroup::OPos,
            BloodGroup::ONeg,
        ] {
            assert_eq!(BloodGroup::parse(g.as_str()), Some(g));
        }
        assert_eq!(BloodGroup::parse("C+"), None);
    }

    #[test]
    fn test_serology_result_parse() {
        assert_eq!(
            SerologyResultType::parse("POSITIVA"),
            Some(SerologyResultType::Positiva)
        );
        assert_eq!(SerologyResultType::parse("positiva"), None);
    }
}
