use serde::Serialize;
use tracing::warn;

use crate::db::Database;
use crate::error::{Result, TraidError};
use crate::mercado::{self, Fondo, MetricasCartera, Noticia, ProveedorMercado};
use crate::models::UsuarioInfo;
use crate::perfil::{Pantalla, Sesion};

const FONDOS_DESTACADOS: usize = 6;
const NOTICIAS_DASHBOARD: usize = 5;

/// Contenido del panel de inversión
#[derive(Debug, Clone, Serialize)]
pub struct ResumenDashboard {
    pub usuario: UsuarioInfo,
    pub categoria_destacada: Option<String>,
    pub metricas: MetricasCartera,
    pub fondos: Vec<Fondo>,
    pub noticias: Vec<Noticia>,
}

/// Comprueba pantalla y flags. Los flags se releen de la base, no de la sesión.
fn exigir_acceso(db: &Database, sesion: &Sesion) -> Result<UsuarioInfo> {
    if sesion.pantalla() != Pantalla::Dashboard {
        return Err(TraidError::AccesoDenegado(format!(
            "la sesión está en {:?}",
            sesion.pantalla()
        )));
    }

    let activa = sesion.exigir_usuario()?;
    let usuario = db
        .obtener_usuario(activa.usuario_id)?
        .ok_or(TraidError::UsuarioNoEncontrado)?;

    if !sesion
        .politica()
        .permite_dashboard(usuario.kyc_completed, usuario.risk_completed)
    {
        warn!(usuario_id = usuario.id, "dashboard sin KYC o perfil de riesgo");
        return Err(TraidError::AccesoDenegado(
            "completa el KYC y el perfil de riesgo".to_string(),
        ));
    }

    Ok(usuario)
}

pub fn abrir_dashboard(
    db: &Database,
    sesion: &Sesion,
    proveedor: &dyn ProveedorMercado,
) -> Result<ResumenDashboard> {
    let usuario = exigir_acceso(db, sesion)?;
    let categoria = usuario.perfil_riesgo.map(mercado::categoria_sugerida);

    Ok(ResumenDashboard {
        categoria_destacada: categoria.map(str::to_string),
        metricas: proveedor.metricas_cartera(),
        fondos: proveedor.fondos(categoria, FONDOS_DESTACADOS),
        noticias: proveedor.noticias(NOTICIAS_DASHBOARD),
        usuario,
    })
}

/// Buscador de fondos del dashboard
pub fn buscar_fondos(
    db: &Database,
    sesion: &Sesion,
    proveedor: &dyn ProveedorMercado,
    categoria: Option<&str>,
    consulta: &str,
    limite: usize,
) -> Result<Vec<Fondo>> {
    exigir_acceso(db, sesion)?;
    let fondos = proveedor.fondos(categoria, limite);
    Ok(mercado::buscar_fondos(fondos, consulta))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::pruebas::{formulario_kyc, nuevo_usuario};
    use crate::commands::{kyc, riesgo, usuarios};
    use crate::mercado::MercadoSimulado;
    use crate::perfil::{Cuestionario, PoliticaAcceso};
    use chrono::NaiveDate;

    fn mercado() -> MercadoSimulado {
        MercadoSimulado::con_fecha(7, NaiveDate::from_ymd_opt(2026, 10, 19).unwrap())
    }

    #[test]
    fn test_dashboard_tras_alta_completa() {
        let db = Database::en_memoria().unwrap();
        let mut sesion = Sesion::default();
        usuarios::registrar(&db, &mut sesion, nuevo_usuario()).unwrap();
        kyc::finalizar_kyc(&db, &mut sesion, formulario_kyc()).unwrap();
        riesgo::enviar_cuestionario(&db, &mut sesion, &Cuestionario::por_defecto(), &[1; 7])
            .unwrap();

        let resumen = abrir_dashboard(&db, &sesion, &mercado()).unwrap();
        assert_eq!(resumen.categoria_destacada.as_deref(), Some("Renta Fija"));
        assert!(resumen.fondos.iter().all(|f| f.categoria == "Renta Fija"));
        assert_eq!(resumen.noticias.len(), NOTICIAS_DASHBOARD);

        let fondos = buscar_fondos(&db, &sesion, &mercado(), None, "deuda", 50).unwrap();
        assert!(fondos.iter().all(|f| f.subcategoria.to_lowercase().contains("deuda")
            || f.nombre.to_lowercase().contains("deuda")));
    }

    #[test]
    fn test_dashboard_fuera_de_pantalla() {
        let db = Database::en_memoria().unwrap();
        let mut sesion = Sesion::default();
        usuarios::registrar(&db, &mut sesion, nuevo_usuario()).unwrap();

        assert!(matches!(
            abrir_dashboard(&db, &sesion, &mercado()),
            Err(TraidError::AccesoDenegado(_))
        ));
    }

    #[test]
    fn test_politica_libre_sin_flags() {
        let db = Database::en_memoria().unwrap();
        usuarios::registrar(&db, &mut Sesion::default(), nuevo_usuario()).unwrap();

        let mut sesion = Sesion::nueva(PoliticaAcceso::Libre);
        usuarios::iniciar_sesion(&db, &mut sesion, "A123456", "pw1").unwrap();
        let resumen = abrir_dashboard(&db, &sesion, &mercado()).unwrap();
        assert!(resumen.categoria_destacada.is_none());
        assert!(!resumen.usuario.kyc_completed);
    }
}
