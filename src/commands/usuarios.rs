use tracing::{info, warn};

use crate::db::Database;
use crate::error::{Result, TraidError};
use crate::models::{NuevoUsuario, SesionActiva, UsuarioInfo};
use crate::perfil::{Evento, Sesion};

/// Valida el formulario Sign Up
fn validar_registro(nuevo: &NuevoUsuario) -> Result<()> {
    if nuevo.usuario.trim().is_empty() {
        return Err(TraidError::FormularioIncompleto(
            "el DNI / CIF es obligatorio".to_string(),
        ));
    }
    if nuevo.usuario.contains('@') {
        return Err(TraidError::FormularioIncompleto(
            "el DNI / CIF no puede contener '@'".to_string(),
        ));
    }
    let email = nuevo.email.trim();
    if email.is_empty() || !email.contains('@') {
        return Err(TraidError::FormularioIncompleto(
            "el email no es válido".to_string(),
        ));
    }
    if nuevo.contrasena.is_empty() {
        return Err(TraidError::FormularioIncompleto(
            "la contraseña es obligatoria".to_string(),
        ));
    }
    if nuevo.contrasena != nuevo.confirmar_contrasena {
        return Err(TraidError::FormularioIncompleto(
            "las contraseñas no coinciden".to_string(),
        ));
    }
    if !nuevo.acepta_politica {
        return Err(TraidError::FormularioIncompleto(
            "debes aceptar la política de privacidad".to_string(),
        ));
    }
    Ok(())
}

/// Crea la cuenta, abre la sesión y pasa al formulario KYC.
pub fn registrar(db: &Database, sesion: &mut Sesion, nuevo: NuevoUsuario) -> Result<UsuarioInfo> {
    sesion.validar(Evento::RegistroExitoso)?;
    validar_registro(&nuevo)?;

    let nombre = nuevo
        .nombre
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .unwrap_or(nuevo.usuario.trim());

    let id = db.crear_usuario(&nuevo.usuario, nombre, &nuevo.email, &nuevo.contrasena)?;
    let usuario = db.obtener_usuario(id)?.ok_or(TraidError::UsuarioNoEncontrado)?;

    sesion.aplicar(Evento::RegistroExitoso)?;
    sesion.autenticar(SesionActiva::from(&usuario));
    Ok(usuario)
}

/// Verifica credenciales (DNI/CIF o email) y lleva al primer paso pendiente.
pub fn iniciar_sesion(
    db: &Database,
    sesion: &mut Sesion,
    usuario_o_email: &str,
    contrasena: &str,
) -> Result<SesionActiva> {
    if usuario_o_email.trim().is_empty() || contrasena.is_empty() {
        return Err(TraidError::FormularioIncompleto(
            "usuario y contraseña son obligatorios".to_string(),
        ));
    }

    let usuario = match db.verificar_credenciales(usuario_o_email, contrasena)? {
        Some(u) => u,
        None => {
            warn!("inicio de sesión fallido");
            return Err(TraidError::CredencialesInvalidas);
        }
    };

    let pantalla = sesion.aplicar(Evento::LoginExitoso {
        kyc_completado: usuario.kyc_completed,
        riesgo_completado: usuario.risk_completed,
    })?;

    let activa = SesionActiva::from(&usuario);
    sesion.autenticar(activa.clone());
    info!(usuario_id = activa.usuario_id, ?pantalla, "sesión iniciada");
    Ok(activa)
}

/// Cierra la sesión activa
pub fn cerrar_sesion(sesion: &mut Sesion) {
    if let Some(u) = sesion.usuario() {
        info!(usuario_id = u.usuario_id, "sesión cerrada");
    }
    sesion.cerrar();
}

/// Retorna la sesión activa (o None si no hay)
pub fn obtener_sesion_actual(sesion: &Sesion) -> Option<SesionActiva> {
    sesion.usuario().cloned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::pruebas::nuevo_usuario;
    use crate::perfil::{Pantalla, PoliticaAcceso};

    #[test]
    fn test_registro_lleva_a_kyc() {
        let db = Database::en_memoria().unwrap();
        let mut sesion = Sesion::default();

        let usuario = registrar(&db, &mut sesion, nuevo_usuario()).unwrap();
        assert_eq!(usuario.usuario, "A123456");
        assert_eq!(usuario.nombre, "A123456");
        assert_eq!(sesion.pantalla(), Pantalla::Kyc);
        assert_eq!(obtener_sesion_actual(&sesion).unwrap().email, "a@x.com");
    }

    #[test]
    fn test_registro_con_nombre() {
        let db = Database::en_memoria().unwrap();
        let mut sesion = Sesion::default();
        let mut nuevo = nuevo_usuario();
        nuevo.nombre = Some(" Ana Pérez ".to_string());
        assert_eq!(registrar(&db, &mut sesion, nuevo).unwrap().nombre, "Ana Pérez");
    }

    #[test]
    fn test_registro_invalido_no_cambia_estado() {
        let db = Database::en_memoria().unwrap();
        let mut sesion = Sesion::default();

        let mut distinta = nuevo_usuario();
        distinta.confirmar_contrasena = "otra".to_string();
        let mut sin_politica = nuevo_usuario();
        sin_politica.acepta_politica = false;
        let mut sin_email = nuevo_usuario();
        sin_email.email = "sin-arroba".to_string();
        let mut documento_con_arroba = nuevo_usuario();
        documento_con_arroba.usuario = "1@2".to_string();

        for nuevo in [distinta, sin_politica, sin_email, documento_con_arroba] {
            assert!(matches!(
                registrar(&db, &mut sesion, nuevo),
                Err(TraidError::FormularioIncompleto(_))
            ));
            assert_eq!(sesion.pantalla(), Pantalla::Inicio);
        }
        assert_eq!(db.contar_usuarios().unwrap(), 0);
    }

    #[test]
    fn test_registro_duplicado() {
        let db = Database::en_memoria().unwrap();
        registrar(&db, &mut Sesion::default(), nuevo_usuario()).unwrap();

        let mut sesion = Sesion::default();
        let mut otro = nuevo_usuario();
        otro.usuario = "B7654321".to_string();
        assert!(matches!(
            registrar(&db, &mut sesion, otro),
            Err(TraidError::ClaveDuplicada)
        ));
        assert_eq!(sesion.pantalla(), Pantalla::Inicio);
        assert!(sesion.usuario().is_none());
    }

    #[test]
    fn test_login_credenciales_invalidas() {
        let db = Database::en_memoria().unwrap();
        registrar(&db, &mut Sesion::default(), nuevo_usuario()).unwrap();

        let mut sesion = Sesion::default();
        assert!(matches!(
            iniciar_sesion(&db, &mut sesion, "A123456", "mala"),
            Err(TraidError::CredencialesInvalidas)
        ));
        assert_eq!(sesion.pantalla(), Pantalla::Inicio);
        assert!(matches!(
            iniciar_sesion(&db, &mut sesion, "", "pw1"),
            Err(TraidError::FormularioIncompleto(_))
        ));
    }

    #[test]
    fn test_login_con_kyc_pendiente_va_a_kyc() {
        let db = Database::en_memoria().unwrap();
        registrar(&db, &mut Sesion::default(), nuevo_usuario()).unwrap();

        let mut sesion = Sesion::default();
        let activa = iniciar_sesion(&db, &mut sesion, "a@x.com", "pw1").unwrap();
        assert_eq!(activa.email, "a@x.com");
        assert_eq!(sesion.pantalla(), Pantalla::Kyc);
    }

    #[test]
    fn test_login_flags_completos_va_a_dashboard() {
        let db = Database::en_memoria().unwrap();
        registrar(&db, &mut Sesion::default(), nuevo_usuario()).unwrap();
        db.marcar_kyc_completado("a@x.com").unwrap();
        db.marcar_riesgo_completado("a@x.com").unwrap();

        let mut sesion = Sesion::default();
        iniciar_sesion(&db, &mut sesion, "A123456", "pw1").unwrap();
        assert_eq!(sesion.pantalla(), Pantalla::Dashboard);
    }

    #[test]
    fn test_login_politica_libre() {
        let db = Database::en_memoria().unwrap();
        registrar(&db, &mut Sesion::default(), nuevo_usuario()).unwrap();

        let mut sesion = Sesion::nueva(PoliticaAcceso::Libre);
        iniciar_sesion(&db, &mut sesion, "A123456", "pw1").unwrap();
        assert_eq!(sesion.pantalla(), Pantalla::Dashboard);
    }

    #[test]
    fn test_cerrar_sesion() {
        let db = Database::en_memoria().unwrap();
        let mut sesion = Sesion::default();
        registrar(&db, &mut sesion, nuevo_usuario()).unwrap();

        cerrar_sesion(&mut sesion);
        assert_eq!(sesion.pantalla(), Pantalla::Inicio);
        assert!(obtener_sesion_actual(&sesion).is_none());
    }
}
