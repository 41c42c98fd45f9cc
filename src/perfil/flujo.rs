use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{Result, TraidError};
use crate::models::SesionActiva;

/// Pantalla en la que se encuentra una sesión de alta.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Pantalla {
    /// Sin autenticar: elegir Log In o Sign Up
    #[default]
    Inicio,
    Kyc,
    PerfilRiesgo,
    Dashboard,
}

/// Acciones explícitas del usuario que mueven la sesión.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Evento {
    RegistroExitoso,
    LoginExitoso {
        kyc_completado: bool,
        riesgo_completado: bool,
    },
    KycFinalizado,
    CuestionarioEnviado,
    CerrarSesion,
}

/// Política de acceso al dashboard tras el login.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PoliticaAcceso {
    /// El dashboard exige KYC y perfil de riesgo completados
    #[default]
    RequierePerfil,
    /// El login lleva siempre al dashboard (comportamiento de los prototipos)
    Libre,
}

impl PoliticaAcceso {
    pub fn permite_dashboard(&self, kyc_completado: bool, riesgo_completado: bool) -> bool {
        match self {
            PoliticaAcceso::RequierePerfil => kyc_completado && riesgo_completado,
            PoliticaAcceso::Libre => true,
        }
    }
}

/// Tabla de transiciones. Cualquier par (pantalla, evento) no listado se rechaza.
pub fn transicion(desde: Pantalla, evento: Evento, politica: PoliticaAcceso) -> Result<Pantalla> {
    use Pantalla::*;

    let destino = match (desde, evento) {
        (_, Evento::CerrarSesion) => Inicio,
        (Inicio, Evento::RegistroExitoso) => Kyc,
        (
            Inicio,
            Evento::LoginExitoso {
                kyc_completado,
                riesgo_completado,
            },
        ) => {
            if politica.permite_dashboard(kyc_completado, riesgo_completado) {
                Dashboard
            } else if !kyc_completado {
                Kyc
            } else {
                PerfilRiesgo
            }
        }
        (Kyc, Evento::KycFinalizado) => PerfilRiesgo,
        (PerfilRiesgo, Evento::CuestionarioEnviado) => Dashboard,
        (desde, evento) => return Err(TraidError::TransicionInvalida { desde, evento }),
    };

    Ok(destino)
}

/// Estado efímero de una sesión. Vive en memoria y se descarta al cerrar sesión.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Sesion {
    pantalla: Pantalla,
    usuario: Option<SesionActiva>,
    politica: PoliticaAcceso,
}

impl Sesion {
    pub fn nueva(politica: PoliticaAcceso) -> Self {
        Sesion {
            pantalla: Pantalla::Inicio,
            usuario: None,
            politica,
        }
    }

    pub fn pantalla(&self) -> Pantalla {
        self.pantalla
    }

    pub fn usuario(&self) -> Option<&SesionActiva> {
        self.usuario.as_ref()
    }

    pub fn politica(&self) -> PoliticaAcceso {
        self.politica
    }

    /// Usuario autenticado o error si la sesión es anónima.
    pub fn exigir_usuario(&self) -> Result<&SesionActiva> {
        self.usuario.as_ref().ok_or(TraidError::SinSesion)
    }

    /// Comprueba la transición sin aplicarla.
    pub fn validar(&self, evento: Evento) -> Result<Pantalla> {
        transicion(self.pantalla, evento, self.politica)
    }

    /// Aplica un evento. Si la transición no existe la sesión no cambia.
    pub fn aplicar(&mut self, evento: Evento) -> Result<Pantalla> {
        let destino = match self.validar(evento) {
            Ok(destino) => destino,
            Err(e) => {
                warn!(pantalla = ?self.pantalla, ?evento, "transición rechazada");
                return Err(e);
            }
        };

        info!(desde = ?self.pantalla, hacia = ?destino, ?evento, "transición de pantalla");
        self.pantalla = destino;
        if destino == Pantalla::Inicio {
            self.usuario = None;
        }
        Ok(destino)
    }

    /// Asocia el usuario autenticado. Solo lo llaman login y registro.
    pub(crate) fn autenticar(&mut self, usuario: SesionActiva) {
        self.usuario = Some(usuario);
    }

    /// Cierra la sesión desde cualquier pantalla.
    pub fn cerrar(&mut self) {
        debug!(desde = ?self.pantalla, "vuelta a inicio");
        self.pantalla = Pantalla::Inicio;
        self.usuario = None;
    }
}
