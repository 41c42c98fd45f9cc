//! Operaciones del almacén de credenciales (tabla `usuarios`).

use rusqlite::{Connection, OptionalExtension, Row};
use tracing::{debug, info, warn};

use super::Database;
use crate::error::{Result, TraidError};
use crate::models::UsuarioInfo;
use crate::perfil::{PerfilRiesgo, ResultadoRiesgo};
use crate::utils;

const SELECT_USUARIO: &str = "SELECT id, COALESCE(nombre, usuario), usuario, email, \
     kyc_completed, risk_completed, perfil_riesgo, puntaje_riesgo FROM usuarios";

fn fila_a_usuario(row: &Row) -> rusqlite::Result<UsuarioInfo> {
    let perfil: Option<String> = row.get(6)?;
    Ok(UsuarioInfo {
        id: row.get(0)?,
        nombre: row.get(1)?,
        usuario: row.get(2)?,
        email: row.get(3)?,
        kyc_completed: row.get::<_, i64>(4).map(|v| v == 1)?,
        risk_completed: row.get::<_, i64>(5).map(|v| v == 1)?,
        perfil_riesgo: perfil.as_deref().and_then(PerfilRiesgo::desde_etiqueta),
        puntaje_riesgo: row.get(7)?,
    })
}

fn es_clave_duplicada(e: &rusqlite::Error) -> bool {
    matches!(
        e,
        rusqlite::Error::SqliteFailure(err, _) if err.code == rusqlite::ErrorCode::ConstraintViolation
    )
}

/// Pone a 1 un flag de completado. Nunca lo vuelve a 0.
fn marcar_completado(conn: &Connection, columna: Flag, email: &str) -> Result<()> {
    let sql = match columna {
        Flag::Kyc => "UPDATE usuarios SET kyc_completed = 1 WHERE email = ?1",
        Flag::Riesgo => "UPDATE usuarios SET risk_completed = 1 WHERE email = ?1",
    };
    let filas = conn.execute(sql, rusqlite::params![email])?;
    if filas == 0 {
        return Err(TraidError::UsuarioNoEncontrado);
    }
    Ok(())
}

#[derive(Debug, Clone, Copy)]
enum Flag {
    Kyc,
    Riesgo,
}

pub(crate) fn buscar_por_email(conn: &Connection, email: &str) -> Result<Option<UsuarioInfo>> {
    let sql = format!("{} WHERE email = ?1", SELECT_USUARIO);
    let usuario = conn
        .query_row(&sql, rusqlite::params![email], fila_a_usuario)
        .optional()?;
    Ok(usuario)
}

impl Database {
    /// Crea un usuario. Comprobación de duplicados e inserción van en la
    /// misma transacción.
    pub fn crear_usuario(
        &self,
        usuario: &str,
        nombre: &str,
        email: &str,
        contrasena: &str,
    ) -> Result<i64> {
        let usuario = utils::normalizar_documento(usuario);
        let email = utils::normalizar_email(email);

        let mut conn = self.conexion()?;
        let tx = conn.transaction()?;

        let existe: bool = tx
            .query_row(
                "SELECT COUNT(*) FROM usuarios WHERE usuario = ?1 OR email = ?2",
                rusqlite::params![usuario, email],
                |row| row.get::<_, i64>(0),
            )
            .map(|c| c > 0)?;

        if existe {
            warn!(usuario = %usuario, "registro rechazado: usuario o email duplicado");
            return Err(TraidError::ClaveDuplicada);
        }

        tx.execute(
            "INSERT INTO usuarios (usuario, nombre, email, contrasena, kyc_completed, risk_completed, created_at)
             VALUES (?1, ?2, ?3, ?4, 0, 0, datetime('now', 'localtime'))",
            rusqlite::params![usuario, nombre.trim(), email, utils::hash_contrasena(contrasena)],
        )
        .map_err(|e| {
            if es_clave_duplicada(&e) {
                TraidError::ClaveDuplicada
            } else {
                TraidError::BaseDatos(e)
            }
        })?;

        let id = tx.last_insert_rowid();
        tx.commit()?;

        info!(id, usuario = %usuario, "usuario creado");
        Ok(id)
    }

    /// Compara el hash de la contraseña. Acepta DNI/CIF o email.
    pub fn verificar_credenciales(
        &self,
        usuario_o_email: &str,
        contrasena: &str,
    ) -> Result<Option<UsuarioInfo>> {
        let conn = self.conexion()?;
        let sql = format!(
            "{} WHERE (usuario = ?1 OR email = ?2) AND contrasena = ?3
             ORDER BY (email = ?2) DESC, id LIMIT 1",
            SELECT_USUARIO
        );

        let usuario = conn
            .query_row(
                &sql,
                rusqlite::params![
                    utils::normalizar_documento(usuario_o_email),
                    utils::normalizar_email(usuario_o_email),
                    utils::hash_contrasena(contrasena),
                ],
                fila_a_usuario,
            )
            .optional()?;

        debug!(encontrado = usuario.is_some(), "verificación de credenciales");
        Ok(usuario)
    }

    pub fn obtener_usuario_por_email(&self, email: &str) -> Result<Option<UsuarioInfo>> {
        let conn = self.conexion()?;
        buscar_por_email(&conn, &utils::normalizar_email(email))
    }

    pub fn obtener_usuario(&self, id: i64) -> Result<Option<UsuarioInfo>> {
        let conn = self.conexion()?;
        let sql = format!("{} WHERE id = ?1", SELECT_USUARIO);
        let usuario = conn
            .query_row(&sql, rusqlite::params![id], fila_a_usuario)
            .optional()?;
        Ok(usuario)
    }

    pub fn contar_usuarios(&self) -> Result<i64> {
        let conn = self.conexion()?;
        let total = conn.query_row("SELECT COUNT(*) FROM usuarios", [], |row| row.get(0))?;
        Ok(total)
    }

    pub fn marcar_kyc_completado(&self, email: &str) -> Result<()> {
        let conn = self.conexion()?;
        marcar_completado(&conn, Flag::Kyc, &utils::normalizar_email(email))?;
        info!(email, "KYC completado");
        Ok(())
    }

    pub fn marcar_riesgo_completado(&self, email: &str) -> Result<()> {
        let conn = self.conexion()?;
        marcar_completado(&conn, Flag::Riesgo, &utils::normalizar_email(email))?;
        info!(email, "perfil de riesgo completado");
        Ok(())
    }

    /// Guarda perfil y puntaje y marca `risk_completed` en una transacción.
    pub fn registrar_resultado_riesgo(&self, email: &str, resultado: &ResultadoRiesgo) -> Result<()> {
        let email = utils::normalizar_email(email);
        let mut conn = self.conexion()?;
        let tx = conn.transaction()?;

        let filas = tx.execute(
            "UPDATE usuarios SET perfil_riesgo = ?1, puntaje_riesgo = ?2 WHERE email = ?3",
            rusqlite::params![resultado.perfil.etiqueta(), resultado.puntaje, email],
        )?;
        if filas == 0 {
            return Err(TraidError::UsuarioNoEncontrado);
        }
        marcar_completado(&tx, Flag::Riesgo, &email)?;
        tx.commit()?;

        info!(
            email = %email,
            perfil = resultado.perfil.etiqueta(),
            puntaje = resultado.puntaje,
            "resultado de riesgo guardado"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn db_con_usuario() -> Database {
        let db = Database::en_memoria().unwrap();
        db.crear_usuario("A123456", "Ana", "a@x.com", "pw1").unwrap();
        db
    }

    #[test]
    fn test_crear_y_verificar() {
        let db = db_con_usuario();
        let por_dni = db.verificar_credenciales("A123456", "pw1").unwrap().unwrap();
        assert_eq!(por_dni.email, "a@x.com");
        assert_eq!(por_dni.nombre, "Ana");
        assert!(!por_dni.kyc_completed);
        assert!(!por_dni.risk_completed);
        assert!(por_dni.perfil_riesgo.is_none());

        let por_email = db.verificar_credenciales("A@X.com", "pw1").unwrap().unwrap();
        assert_eq!(por_email.id, por_dni.id);
    }

    #[test]
    fn test_contrasena_incorrecta() {
        let db = db_con_usuario();
        assert!(db.verificar_credenciales("A123456", "otra").unwrap().is_none());
        assert!(db.verificar_credenciales("nadie", "pw1").unwrap().is_none());
    }

    #[test]
    fn test_email_duplicado_no_altera_fila() {
        let db = db_con_usuario();
        let err = db.crear_usuario("B999999", "Otro", "a@x.com", "pw2").unwrap_err();
        assert!(matches!(err, TraidError::ClaveDuplicada));
        assert_eq!(db.contar_usuarios().unwrap(), 1);

        // La fila original conserva su contraseña
        assert!(db.verificar_credenciales("a@x.com", "pw1").unwrap().is_some());
        assert!(db.verificar_credenciales("a@x.com", "pw2").unwrap().is_none());
    }

    #[test]
    fn test_documento_duplicado() {
        let db = db_con_usuario();
        let err = db.crear_usuario("a-123456", "Otro", "b@x.com", "pw2").unwrap_err();
        assert!(matches!(err, TraidError::ClaveDuplicada));
        assert_eq!(db.contar_usuarios().unwrap(), 1);
    }

    #[test]
    fn test_flags_monotonicos() {
        let db = db_con_usuario();
        db.marcar_kyc_completado("a@x.com").unwrap();
        db.marcar_kyc_completado("a@x.com").unwrap();
        let u = db.obtener_usuario_por_email("a@x.com").unwrap().unwrap();
        assert!(u.kyc_completed);
        assert!(!u.risk_completed);

        db.marcar_riesgo_completado("a@x.com").unwrap();
        let u = db.obtener_usuario(u.id).unwrap().unwrap();
        assert!(u.kyc_completed && u.risk_completed);
    }

    #[test]
    fn test_marcar_email_desconocido() {
        let db = db_con_usuario();
        assert!(matches!(
            db.marcar_kyc_completado("z@x.com"),
            Err(TraidError::UsuarioNoEncontrado)
        ));
    }

    #[test]
    fn test_registrar_resultado_riesgo() {
        let db = db_con_usuario();
        let resultado = ResultadoRiesgo {
            puntaje_bruto: 2.4,
            puntaje: 24,
            perfil: PerfilRiesgo::Moderado,
        };
        db.registrar_resultado_riesgo("a@x.com", &resultado).unwrap();
        let u = db.obtener_usuario_por_email("a@x.com").unwrap().unwrap();
        assert!(u.risk_completed);
        assert_eq!(u.perfil_riesgo, Some(PerfilRiesgo::Moderado));
        assert_eq!(u.puntaje_riesgo, Some(24));

        assert!(matches!(
            db.registrar_resultado_riesgo("z@x.com", &resultado),
            Err(TraidError::UsuarioNoEncontrado)
        ));
    }

    #[test]
    fn test_login_prefiere_coincidencia_por_email() {
        let db = Database::en_memoria().unwrap();
        let por_documento = db.crear_usuario("1@2", "Uno", "uno@x.com", "pw").unwrap();
        let por_email = db.crear_usuario("B999999", "Dos", "1@2", "pw").unwrap();
        assert_ne!(por_documento, por_email);

        let usuario = db.verificar_credenciales("1@2", "pw").unwrap().unwrap();
        assert_eq!(usuario.id, por_email);
        assert_eq!(
            db.verificar_credenciales("uno@x.com", "pw").unwrap().unwrap().id,
            por_documento
        );
    }

    #[test]
    fn test_persistencia_en_archivo() {
        let dir = tempfile::tempdir().unwrap();
        let ruta = dir.path().join("usuarios.db");
        {
            let db = Database::abrir(&ruta).unwrap();
            db.crear_usuario("A123456", "Ana", "a@x.com", "pw1").unwrap();
        }
        let db = Database::abrir(&ruta).unwrap();
        assert!(db.verificar_credenciales("A123456", "pw1").unwrap().is_some());
    }
}
