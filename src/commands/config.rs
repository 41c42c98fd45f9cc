use std::collections::HashMap;

use tracing::info;

use crate::config::Ajustes;
use crate::db::Database;
use crate::error::Result;

pub fn obtener_config(db: &Database) -> Result<HashMap<String, String>> {
    let conn = db.conexion()?;

    let mut stmt = conn.prepare("SELECT key, value FROM config")?;

    let config = stmt
        .query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?
        .collect::<rusqlite::Result<HashMap<_, _>>>()?;

    Ok(config)
}

pub fn guardar_config(db: &Database, configs: HashMap<String, String>) -> Result<()> {
    let mut conn = db.conexion()?;
    let tx = conn.transaction()?;

    for (key, value) in &configs {
        tx.execute(
            "INSERT OR REPLACE INTO config (key, value) VALUES (?1, ?2)",
            rusqlite::params![key, value],
        )?;
    }
    tx.commit()?;

    info!(claves = ?configs.keys().collect::<Vec<_>>(), "configuración guardada");
    Ok(())
}

/// Ajustes de ejecución interpretados desde la tabla `config`
pub fn obtener_ajustes(db: &Database) -> Result<Ajustes> {
    Ok(Ajustes::desde_mapa(&obtener_config(db)?))
}
