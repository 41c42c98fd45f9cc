use tracing::warn;

use super::config::obtener_ajustes;
use crate::db::Database;
use crate::error::Result;
use crate::perfil::{Cuestionario, Evento, ResultadoRiesgo, Sesion};

/// Cuestionario estándar con la escala configurada
pub fn obtener_cuestionario(db: &Database) -> Result<Cuestionario> {
    let ajustes = obtener_ajustes(db)?;
    Cuestionario::por_defecto().con_escala(ajustes.escala_puntaje)
}

/// Botón "Enviar Cuestionario".
///
/// Solo si el cuestionario está completo y el puntaje cae en una banda se
/// guarda el perfil, se marca `risk_completed` y se pasa al dashboard. En
/// cualquier otro caso la sesión sigue en el cuestionario.
pub fn enviar_cuestionario(
    db: &Database,
    sesion: &mut Sesion,
    cuestionario: &Cuestionario,
    respuestas: &[u8],
) -> Result<ResultadoRiesgo> {
    sesion.validar(Evento::CuestionarioEnviado)?;
    let email = sesion.exigir_usuario()?.email.clone();

    let resultado = cuestionario.evaluar(respuestas).inspect_err(|e| {
        warn!(error = %e, "cuestionario rechazado");
    })?;

    db.registrar_resultado_riesgo(&email, &resultado)?;
    sesion.aplicar(Evento::CuestionarioEnviado)?;
    Ok(resultado)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::kyc::finalizar_kyc;
    use crate::commands::pruebas::{formulario_kyc, nuevo_usuario};
    use crate::commands::usuarios::registrar;
    use crate::error::TraidError;
    use crate::perfil::{Pantalla, PerfilRiesgo, Pregunta};

    fn sesion_en_cuestionario(db: &Database) -> Sesion {
        let mut sesion = Sesion::default();
        registrar(db, &mut sesion, nuevo_usuario()).unwrap();
        finalizar_kyc(db, &mut sesion, formulario_kyc()).unwrap();
        sesion
    }

    #[test]
    fn test_enviar_cuestionario_completo() {
        let db = Database::en_memoria().unwrap();
        let mut sesion = sesion_en_cuestionario(&db);
        let cuestionario = obtener_cuestionario(&db).unwrap();

        let resultado =
            enviar_cuestionario(&db, &mut sesion, &cuestionario, &[4, 4, 3, 4, 4, 3, 4]).unwrap();
        assert_eq!(resultado.puntaje, 38);
        assert_eq!(resultado.perfil, PerfilRiesgo::MuyAgresivo);
        assert_eq!(sesion.pantalla(), Pantalla::Dashboard);

        let usuario = db.obtener_usuario_por_email("a@x.com").unwrap().unwrap();
        assert!(usuario.risk_completed);
        assert_eq!(usuario.perfil_riesgo, Some(PerfilRiesgo::MuyAgresivo));
    }

    #[test]
    fn test_cuestionario_incompleto_no_avanza() {
        let db = Database::en_memoria().unwrap();
        let mut sesion = sesion_en_cuestionario(&db);
        let cuestionario = obtener_cuestionario(&db).unwrap();

        assert!(matches!(
            enviar_cuestionario(&db, &mut sesion, &cuestionario, &[2, 3]),
            Err(TraidError::CuestionarioIncompleto { .. })
        ));
        assert_eq!(sesion.pantalla(), Pantalla::PerfilRiesgo);
        assert!(!db.obtener_usuario_por_email("a@x.com").unwrap().unwrap().risk_completed);
    }

    #[test]
    fn test_puntaje_fuera_de_banda_no_marca_flag() {
        let db = Database::en_memoria().unwrap();
        let mut sesion = sesion_en_cuestionario(&db);
        let cuestionario = Cuestionario::new(
            vec![
                Pregunta::new("Uno", ["a", "b", "c", "d"], 1.0).unwrap(),
                Pregunta::new("Dos", ["a", "b", "c", "d"], 1.0).unwrap(),
            ],
            10.0,
        )
        .unwrap();

        assert!(matches!(
            enviar_cuestionario(&db, &mut sesion, &cuestionario, &[4, 4]),
            Err(TraidError::PuntajeFueraDeRango(80))
        ));
        assert_eq!(sesion.pantalla(), Pantalla::PerfilRiesgo);
        let usuario = db.obtener_usuario_por_email("a@x.com").unwrap().unwrap();
        assert!(!usuario.risk_completed);
        assert!(usuario.perfil_riesgo.is_none());
    }

    #[test]
    fn test_escala_configurada() {
        let db = Database::en_memoria().unwrap();
        crate::commands::config::guardar_config(
            &db,
            [("escala_puntaje".to_string(), "5".to_string())].into(),
        )
        .unwrap();
        assert_eq!(obtener_cuestionario(&db).unwrap().escala(), 5.0);
    }

    #[test]
    fn test_cuestionario_antes_de_kyc() {
        let db = Database::en_memoria().unwrap();
        let mut sesion = Sesion::default();
        registrar(&db, &mut sesion, nuevo_usuario()).unwrap();
        let cuestionario = obtener_cuestionario(&db).unwrap();

        assert!(matches!(
            enviar_cuestionario(&db, &mut sesion, &cuestionario, &[1; 7]),
            Err(TraidError::TransicionInvalida { .. })
        ));
        assert_eq!(sesion.pantalla(), Pantalla::Kyc);
    }
}
