use sha2::{Digest, Sha256};

/// Hash SHA-256 de la contraseña, sin salt.
/// Retorna el hash en formato hexadecimal
pub fn hash_contrasena(contrasena: &str) -> String {
    let hash = Sha256::digest(contrasena.as_bytes());
    format!("{:x}", hash)
}

/// Normaliza un email para comparar y guardar
pub fn normalizar_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Normaliza un DNI/CIF: sin espacios ni guiones, en mayúsculas
pub fn normalizar_documento(documento: &str) -> String {
    documento
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '-')
        .collect::<String>()
        .to_uppercase()
}
