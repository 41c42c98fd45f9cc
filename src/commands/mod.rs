//! Operaciones disparadas por la interfaz. Cada una recibe la base y la
//! sesión explícitamente.

pub mod config;
pub mod dashboard;
pub mod kyc;
pub mod riesgo;
pub mod usuarios;
