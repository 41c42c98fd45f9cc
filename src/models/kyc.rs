use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{Result, TraidError};

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub enum DocumentoPersona {
    #[serde(rename = "DNI")]
    Dni,
    #[serde(rename = "PASAPORTE")]
    Pasaporte,
    #[serde(rename = "NIE")]
    Nie,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub enum DocumentoEmpresa {
    #[serde(rename = "CIF")]
    Cif,
    #[serde(rename = "NIF")]
    Nif,
}

/// Persona Física
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct DatosPersonaFisica {
    pub nombre_apellidos: String,
    pub tipo_documento: DocumentoPersona,
    pub numero_documento: String,
    pub fecha_nacimiento: Option<NaiveDate>,
    #[serde(default)]
    pub nacionalidad: String,
    #[serde(default)]
    pub pais_residencia: String,
    #[serde(default)]
    pub direccion: String,
    #[serde(default)]
    pub telefono: String,
    pub email: String,
    #[serde(default)]
    pub situacion_laboral: String,
    #[serde(default)]
    pub actividad_empresarial: String,
    #[serde(default)]
    pub patrimonio_aportado: String,
}

/// Persona Jurídica
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct DatosPersonaJuridica {
    pub razon_social: String,
    pub tipo_documento: DocumentoEmpresa,
    pub numero_documento: String,
    pub fecha_constitucion: Option<NaiveDate>,
    #[serde(default)]
    pub pais_constitucion: String,
    #[serde(default)]
    pub objeto_social: String,
    #[serde(default)]
    pub actividad_real: String,
    #[serde(default)]
    pub direccion_fiscal: String,
    #[serde(default)]
    pub telefono: String,
    pub email: String,
    #[serde(default)]
    pub ingresos_anuales_estimados: String,
}

/// Formulario KYC según el tipo de cliente
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(tag = "tipo_cliente", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FormularioKyc {
    PersonaFisica(DatosPersonaFisica),
    PersonaJuridica(DatosPersonaJuridica),
}

impl FormularioKyc {
    pub fn tipo_cliente(&self) -> &'static str {
        match self {
            FormularioKyc::PersonaFisica(_) => "PERSONA_FISICA",
            FormularioKyc::PersonaJuridica(_) => "PERSONA_JURIDICA",
        }
    }

    /// Nombre y apellidos o razón social
    pub fn nombre(&self) -> &str {
        match self {
            FormularioKyc::PersonaFisica(d) => &d.nombre_apellidos,
            FormularioKyc::PersonaJuridica(d) => &d.razon_social,
        }
    }

    pub fn tipo_documento(&self) -> &'static str {
        match self {
            FormularioKyc::PersonaFisica(d) => match d.tipo_documento {
                DocumentoPersona::Dni => "DNI",
                DocumentoPersona::Pasaporte => "PASAPORTE",
                DocumentoPersona::Nie => "NIE",
            },
            FormularioKyc::PersonaJuridica(d) => match d.tipo_documento {
                DocumentoEmpresa::Cif => "CIF",
                DocumentoEmpresa::Nif => "NIF",
            },
        }
    }

    pub fn numero_documento(&self) -> &str {
        match self {
            FormularioKyc::PersonaFisica(d) => &d.numero_documento,
            FormularioKyc::PersonaJuridica(d) => &d.numero_documento,
        }
    }

    pub fn email(&self) -> &str {
        match self {
            FormularioKyc::PersonaFisica(d) => &d.email,
            FormularioKyc::PersonaJuridica(d) => &d.email,
        }
    }

    fn fecha(&self) -> Option<NaiveDate> {
        match self {
            FormularioKyc::PersonaFisica(d) => d.fecha_nacimiento,
            FormularioKyc::PersonaJuridica(d) => d.fecha_constitucion,
        }
    }

    /// Valida los campos obligatorios. `hoy` se inyecta para poder probar fechas.
    pub fn validar(&self, hoy: NaiveDate) -> Result<()> {
        if self.nombre().trim().is_empty() {
            let campo = match self {
                FormularioKyc::PersonaFisica(_) => "nombre y apellidos",
                FormularioKyc::PersonaJuridica(_) => "razón social",
            };
            return Err(TraidError::FormularioIncompleto(format!(
                "falta el campo {}",
                campo
            )));
        }
        if self.numero_documento().trim().is_empty() {
            return Err(TraidError::FormularioIncompleto(
                "falta el número de documento".to_string(),
            ));
        }
        let email = self.email().trim();
        if email.is_empty() || !email.contains('@') {
            return Err(TraidError::FormularioIncompleto(
                "el email no es válido".to_string(),
            ));
        }
        if let Some(fecha) = self.fecha() {
            if fecha > hoy {
                return Err(TraidError::FormularioIncompleto(format!(
                    "la fecha {} no puede ser futura",
                    fecha
                )));
            }
        }
        Ok(())
    }
}

/// Registro KYC guardado
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct RegistroKyc {
    pub id: i64,
    pub usuario_id: i64,
    pub formulario: FormularioKyc,
    pub created_at: String,
}
