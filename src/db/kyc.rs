use rusqlite::OptionalExtension;
use tracing::info;

use super::usuarios::buscar_por_email;
use super::Database;
use crate::error::{Result, TraidError};
use crate::models::{FormularioKyc, RegistroKyc};
use crate::utils;

impl Database {
    /// Guarda el formulario KYC y marca `kyc_completed` en una transacción.
    /// Si el usuario ya tenía formulario se reemplaza.
    pub fn registrar_kyc(&self, email: &str, formulario: &FormularioKyc) -> Result<i64> {
        let email = utils::normalizar_email(email);
        let datos = serde_json::to_string(formulario)?;

        let mut conn = self.conexion()?;
        let tx = conn.transaction()?;

        let usuario = buscar_por_email(&tx, &email)?.ok_or(TraidError::UsuarioNoEncontrado)?;

        tx.execute(
            "INSERT INTO kyc_clientes (usuario_id, tipo_cliente, nombre, tipo_documento, numero_documento, datos)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)
             ON CONFLICT(usuario_id) DO UPDATE SET
                tipo_cliente = excluded.tipo_cliente,
                nombre = excluded.nombre,
                tipo_documento = excluded.tipo_documento,
                numero_documento = excluded.numero_documento,
                datos = excluded.datos,
                created_at = datetime('now', 'localtime')",
            rusqlite::params![
                usuario.id,
                formulario.tipo_cliente(),
                formulario.nombre().trim(),
                formulario.tipo_documento(),
                utils::normalizar_documento(formulario.numero_documento()),
                datos,
            ],
        )?;

        let kyc_id: i64 = tx.query_row(
            "SELECT id FROM kyc_clientes WHERE usuario_id = ?1",
            rusqlite::params![usuario.id],
            |row| row.get(0),
        )?;

        tx.execute(
            "UPDATE usuarios SET kyc_completed = 1 WHERE id = ?1",
            rusqlite::params![usuario.id],
        )?;
        tx.commit()?;

        info!(
            usuario_id = usuario.id,
            tipo = formulario.tipo_cliente(),
            "formulario KYC registrado"
        );
        Ok(kyc_id)
    }

    pub fn obtener_kyc(&self, usuario_id: i64) -> Result<Option<RegistroKyc>> {
        let conn = self.conexion()?;

        let fila: Option<(i64, String, String)> = conn
            .query_row(
                "SELECT id, datos, created_at FROM kyc_clientes WHERE usuario_id = ?1",
                rusqlite::params![usuario_id],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
            )
            .optional()?;

        match fila {
            Some((id, datos, created_at)) => Ok(Some(RegistroKyc {
                id,
                usuario_id,
                formulario: serde_json::from_str(&datos)?,
                created_at,
            })),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DatosPersonaJuridica, DocumentoEmpresa};

    fn empresa(razon_social: &str) -> FormularioKyc {
        FormularioKyc::PersonaJuridica(DatosPersonaJuridica {
            razon_social: razon_social.to_string(),
            tipo_documento: DocumentoEmpresa::Cif,
            numero_documento: "B-12345678".to_string(),
            fecha_constitucion: None,
            pais_constitucion: "España".to_string(),
            objeto_social: "Consultoría".to_string(),
            actividad_real: "Consultoría".to_string(),
            direccion_fiscal: "Gran Vía 2".to_string(),
            telefono: "910000000".to_string(),
            email: "info@empresa.es".to_string(),
            ingresos_anuales_estimados: "250000".to_string(),
        })
    }

    #[test]
    fn test_registrar_y_obtener() {
        let db = Database::en_memoria().unwrap();
        let id = db.crear_usuario("B12345678", "Empresa", "e@x.com", "pw").unwrap();

        db.registrar_kyc("e@x.com", &empresa("Empresa SL")).unwrap();
        let registro = db.obtener_kyc(id).unwrap().unwrap();
        assert_eq!(registro.formulario, empresa("Empresa SL"));
        assert!(db.obtener_usuario(id).unwrap().unwrap().kyc_completed);
    }

    #[test]
    fn test_reenvio_reemplaza() {
        let db = Database::en_memoria().unwrap();
        let id = db.crear_usuario("B12345678", "Empresa", "e@x.com", "pw").unwrap();

        let primero = db.registrar_kyc("e@x.com", &empresa("Empresa SL")).unwrap();
        let segundo = db.registrar_kyc("e@x.com", &empresa("Empresa Nueva SL")).unwrap();
        assert_eq!(primero, segundo);
        assert_eq!(
            db.obtener_kyc(id).unwrap().unwrap().formulario.nombre(),
            "Empresa Nueva SL"
        );
    }

    #[test]
    fn test_usuario_desconocido() {
        let db = Database::en_memoria().unwrap();
        assert!(matches!(
            db.registrar_kyc("z@x.com", &empresa("X")),
            Err(TraidError::UsuarioNoEncontrado)
        ));
        assert!(db.obtener_kyc(99).unwrap().is_none());
    }
}
