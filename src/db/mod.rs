pub mod kyc;
pub mod schema;
pub mod usuarios;

use rusqlite::Connection;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, info};

use crate::config::Config;
use crate::error::Result;

/// Almacén de credenciales y estado del alta.
///
/// Una sola conexión protegida por `Mutex`: cada operación toma el guard
/// durante su ejecución y lo libera al terminar.
pub struct Database {
    pub conn: Mutex<Connection>,
}

impl Database {
    /// Abre la base en la ruta configurada por entorno
    pub fn new() -> Result<Self> {
        let config = Config::desde_entorno();
        Self::abrir(&config.db_path)
    }

    pub fn abrir(db_path: &Path) -> Result<Self> {
        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(db_path)?;

        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous = NORMAL;
             PRAGMA foreign_keys = ON;
             PRAGMA busy_timeout = 5000;",
        )?;

        info!(ruta = %db_path.display(), "base de datos abierta");
        Self::con_conexion(conn)
    }

    /// Base en memoria (pruebas y demos)
    pub fn en_memoria() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        Self::con_conexion(conn)
    }

    fn con_conexion(conn: Connection) -> Result<Self> {
        let db = Database {
            conn: Mutex::new(conn),
        };
        db.run_migrations()?;
        Ok(db)
    }

    fn run_migrations(&self) -> Result<()> {
        let conn = self.conexion()?;
        schema::create_tables(&conn)?;
        debug!("esquema verificado");
        Ok(())
    }

    /// Toma la conexión para una operación
    pub(crate) fn conexion(&self) -> Result<MutexGuard<'_, Connection>> {
        Ok(self.conn.lock()?)
    }
}
