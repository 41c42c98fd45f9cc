//! TRAID: alta de clientes con KYC, perfil de riesgo y dashboard de inversión.

pub mod commands;
pub mod config;
pub mod db;
pub mod error;
pub mod mercado;
pub mod models;
pub mod perfil;
pub mod utils;

pub use db::Database;
pub use error::{Result, TraidError};
pub use perfil::{Pantalla, Sesion};
