use thiserror::Error;

use crate::perfil::flujo::{Evento, Pantalla};

/// Errores del alta de clientes.
///
/// Todos son recuperables: la pantalla actual se vuelve a mostrar con el
/// mensaje y la sesión queda como estaba.
#[derive(Debug, Error)]
pub enum TraidError {
    #[error("El usuario o email ya están registrados")]
    ClaveDuplicada,

    #[error("Credenciales incorrectas")]
    CredencialesInvalidas,

    #[error("Formulario incompleto: {0}")]
    FormularioIncompleto(String),

    #[error("Cuestionario incompleto: {respondidas} de {total} preguntas respondidas")]
    CuestionarioIncompleto { respondidas: usize, total: usize },

    #[error("Error en la clasificación: puntaje {0} fuera de los rangos definidos")]
    PuntajeFueraDeRango(i64),

    #[error("Pregunta inválida: {0}")]
    PreguntaInvalida(String),

    #[error("Transición no permitida: {evento:?} desde {desde:?}")]
    TransicionInvalida { desde: Pantalla, evento: Evento },

    #[error("Debe iniciar sesión")]
    SinSesion,

    #[error("Acceso denegado: {0}")]
    AccesoDenegado(String),

    #[error("Usuario no encontrado")]
    UsuarioNoEncontrado,

    #[error("Error de base de datos: {0}")]
    BaseDatos(#[from] rusqlite::Error),

    #[error("Error de serialización: {0}")]
    Serializacion(#[from] serde_json::Error),

    #[error("Error de E/S: {0}")]
    Io(#[from] std::io::Error),

    #[error("Bloqueo envenenado: {0}")]
    Bloqueo(String),
}

pub type Result<T> = std::result::Result<T, TraidError>;

impl<T> From<std::sync::PoisonError<T>> for TraidError {
    fn from(e: std::sync::PoisonError<T>) -> Self {
        TraidError::Bloqueo(e.to_string())
    }
}
