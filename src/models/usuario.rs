use serde::{Deserialize, Serialize};

use crate::perfil::PerfilRiesgo;

/// Info de usuario para enviar a la interfaz (sin hash de contraseña)
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct UsuarioInfo {
    pub id: i64,
    pub nombre: String,
    /// DNI / CIF con el que inicia sesión
    pub usuario: String,
    pub email: String,
    pub kyc_completed: bool,
    pub risk_completed: bool,
    pub perfil_riesgo: Option<PerfilRiesgo>,
    pub puntaje_riesgo: Option<i64>,
}

/// Sesión activa (almacenada en RAM)
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct SesionActiva {
    pub usuario_id: i64,
    pub nombre: String,
    pub email: String,
}

impl From<&UsuarioInfo> for SesionActiva {
    fn from(u: &UsuarioInfo) -> Self {
        SesionActiva {
            usuario_id: u.id,
            nombre: u.nombre.clone(),
            email: u.email.clone(),
        }
    }
}

/// Datos del formulario Sign Up
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct NuevoUsuario {
    /// DNI / CIF
    pub usuario: String,
    /// Nombre a mostrar; si falta se usa el DNI / CIF
    pub nombre: Option<String>,
    pub email: String,
    pub contrasena: String,
    pub confirmar_contrasena: String,
    pub acepta_politica: bool,
}
