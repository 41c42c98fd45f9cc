//! Núcleo del alta: cuestionario de riesgo y máquina de pantallas.

pub mod cuestionario;
pub mod flujo;

pub use cuestionario::{clasificar_perfil, Cuestionario, PerfilRiesgo, Pregunta, ResultadoRiesgo};
pub use flujo::{transicion, Evento, Pantalla, PoliticaAcceso, Sesion};
