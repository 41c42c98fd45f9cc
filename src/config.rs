use std::collections::HashMap;
use std::path::PathBuf;

use tracing::warn;

use crate::perfil::cuestionario::ESCALA_POR_DEFECTO;
use crate::perfil::PoliticaAcceso;

/// Variable de entorno con la ruta del archivo SQLite
pub const ENV_DB_PATH: &str = "TRAID_DB_PATH";
/// Variable de entorno con el filtro de logs (sintaxis de `EnvFilter`)
pub const ENV_LOG: &str = "TRAID_LOG";

const NOMBRE_DB: &str = "usuarios.db";

/// Configuración de arranque: solo la ubicación de la base de datos.
#[derive(Debug, Clone)]
pub struct Config {
    pub db_path: PathBuf,
}

impl Config {
    pub fn desde_entorno() -> Self {
        let db_path = std::env::var_os(ENV_DB_PATH)
            .map(PathBuf::from)
            .unwrap_or_else(ruta_db_por_defecto);
        Config { db_path }
    }
}

fn ruta_db_por_defecto() -> PathBuf {
    match dirs_next() {
        Some(dir) => dir.join(NOMBRE_DB),
        None => PathBuf::from(NOMBRE_DB),
    }
}

/// Retorna el directorio de datos de la aplicación
fn dirs_next() -> Option<PathBuf> {
    #[cfg(target_os = "windows")]
    {
        std::env::var("LOCALAPPDATA")
            .ok()
            .map(|p| PathBuf::from(p).join("Traid"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .ok()
            .map(|p| PathBuf::from(p).join(".traid"))
    }
}

/// Ajustes de ejecución guardados en la tabla `config`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ajustes {
    pub politica: PoliticaAcceso,
    pub escala_puntaje: f64,
}

impl Default for Ajustes {
    fn default() -> Self {
        Ajustes {
            politica: PoliticaAcceso::RequierePerfil,
            escala_puntaje: ESCALA_POR_DEFECTO,
        }
    }
}

impl Ajustes {
    /// Interpreta los pares clave/valor. Valores no reconocidos usan el defecto.
    pub fn desde_mapa(config: &HashMap<String, String>) -> Self {
        let mut ajustes = Ajustes::default();

        if let Some(valor) = config.get("dashboard_requiere_perfil") {
            match valor.trim() {
                "1" => ajustes.politica = PoliticaAcceso::RequierePerfil,
                "0" => ajustes.politica = PoliticaAcceso::Libre,
                otro => warn!(valor = otro, "dashboard_requiere_perfil no reconocido"),
            }
        }

        if let Some(valor) = config.get("escala_puntaje") {
            match valor.trim().parse::<f64>() {
                Ok(escala) if escala.is_finite() && escala > 0.0 => ajustes.escala_puntaje = escala,
                _ => warn!(valor = valor.as_str(), "escala_puntaje no reconocida"),
            }
        }

        ajustes
    }
}
