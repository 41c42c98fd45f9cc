use rusqlite::Connection;

pub fn create_tables(conn: &Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(
        "
        -- Configuración de la aplicación
        CREATE TABLE IF NOT EXISTS config (
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL
        );

        -- Usuarios (credenciales y estado del alta)
        CREATE TABLE IF NOT EXISTS usuarios (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            usuario TEXT UNIQUE,
            email TEXT UNIQUE,
            contrasena TEXT,
            kyc_completed INTEGER DEFAULT 0,
            risk_completed INTEGER DEFAULT 0
        );

        -- Formularios KYC (uno por usuario)
        CREATE TABLE IF NOT EXISTS kyc_clientes (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            usuario_id INTEGER NOT NULL UNIQUE,
            tipo_cliente TEXT NOT NULL,
            nombre TEXT NOT NULL,
            tipo_documento TEXT NOT NULL,
            numero_documento TEXT NOT NULL,
            datos TEXT NOT NULL,
            created_at TEXT NOT NULL DEFAULT (datetime('now', 'localtime')),
            FOREIGN KEY (usuario_id) REFERENCES usuarios(id) ON DELETE CASCADE
        );

        CREATE INDEX IF NOT EXISTS idx_kyc_documento ON kyc_clientes(numero_documento);
        ",
    )?;

    // --- Migraciones incrementales ---
    // Nombre visible (las primeras bases solo tenían usuario/email)
    let _ = conn.execute("ALTER TABLE usuarios ADD COLUMN nombre TEXT", []);
    // Resultado del cuestionario de riesgo
    let _ = conn.execute("ALTER TABLE usuarios ADD COLUMN perfil_riesgo TEXT", []);
    let _ = conn.execute("ALTER TABLE usuarios ADD COLUMN puntaje_riesgo INTEGER", []);
    // SQLite no admite DEFAULT no constante en ALTER TABLE
    let _ = conn.execute("ALTER TABLE usuarios ADD COLUMN created_at TEXT", []);

    // Config por defecto
    conn.execute(
        "INSERT OR IGNORE INTO config (key, value) VALUES ('dashboard_requiere_perfil', '1')",
        [],
    )?;
    conn.execute(
        "INSERT OR IGNORE INTO config (key, value) VALUES ('escala_puntaje', '10')",
        [],
    )?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_tables_idempotente() {
        let conn = Connection::open_in_memory().unwrap();
        create_tables(&conn).unwrap();
        create_tables(&conn).unwrap();

        let columnas: Vec<String> = conn
            .prepare("SELECT name FROM pragma_table_info('usuarios')")
            .unwrap()
            .query_map([], |row| row.get(0))
            .unwrap()
            .collect::<Result<_, _>>()
            .unwrap();
        for col in [
            "id",
            "usuario",
            "email",
            "contrasena",
            "kyc_completed",
            "risk_completed",
            "nombre",
            "perfil_riesgo",
            "puntaje_riesgo",
            "created_at",
        ] {
            assert!(columnas.iter().any(|c| c == col), "falta columna {}", col);
        }
    }

    #[test]
    fn test_migra_tabla_del_primer_prototipo() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(
            "CREATE TABLE usuarios (
                 id INTEGER PRIMARY KEY AUTOINCREMENT,
                 usuario TEXT UNIQUE,
                 email TEXT UNIQUE,
                 contrasena TEXT,
                 kyc_completed INTEGER DEFAULT 0,
                 risk_completed INTEGER DEFAULT 0);
             INSERT INTO usuarios (usuario, email, contrasena) VALUES ('X1', 'x@x.com', 'h');",
        )
        .unwrap();

        create_tables(&conn).unwrap();

        let perfil: Option<String> = conn
            .query_row("SELECT perfil_riesgo FROM usuarios WHERE usuario = 'X1'", [], |row| {
                row.get(0)
            })
            .unwrap();
        assert!(perfil.is_none());
    }
}
