//! Datos de mercado para el dashboard.
//!
//! El dashboard solo conoce el trait [`ProveedorMercado`]; la implementación
//! incluida ([`MercadoSimulado`]) genera datos sintéticos reproducibles.

pub mod sentimiento;
pub mod simulado;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::perfil::PerfilRiesgo;

pub use sentimiento::{analizar_sentimiento, extraer_tickers, Sentimiento};
pub use simulado::MercadoSimulado;

/// Categorías de fondos disponibles
pub const CATEGORIAS: &[&str] = &[
    "Tecnología",
    "Global",
    "ESG",
    "Renta Fija",
    "Sectorial",
    "Alternativos",
];

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PuntoCartera {
    pub fecha: NaiveDate,
    pub valor: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricasCartera {
    pub valor_actual: i64,
    /// Variación en el periodo, en %
    pub crecimiento_pct: f64,
    /// Volatilidad anualizada, en %
    pub volatilidad_pct: f64,
    pub serie: Vec<PuntoCartera>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fondo {
    pub nombre: String,
    pub ticker: String,
    pub categoria: String,
    pub subcategoria: String,
    pub rentabilidad_1a: f64,
    pub rentabilidad_3a: f64,
    pub rentabilidad_5a: f64,
    pub rentabilidad_ytd: f64,
    pub ratio_sharpe: f64,
    pub volatilidad: f64,
    pub gastos_corrientes: f64,
    /// Patrimonio gestionado, en millones
    pub patrimonio_mm: f64,
    pub inversion_minima: u32,
    /// 1 (bajo) a 5 (alto)
    pub nivel_riesgo: u8,
    pub fecha_inicio: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Noticia {
    pub titulo: String,
    pub resumen: String,
    pub fuente: String,
    pub fecha: NaiveDate,
    pub url: String,
    pub sentimiento: f64,
}

/// Fuente de datos de solo lectura para el dashboard.
pub trait ProveedorMercado {
    fn metricas_cartera(&self) -> MetricasCartera;

    /// Fondos ordenados por rentabilidad a 1 año, de mayor a menor.
    /// `categoria` se compara sin distinguir mayúsculas.
    fn fondos(&self, categoria: Option<&str>, limite: usize) -> Vec<Fondo>;

    fn noticias(&self, limite: usize) -> Vec<Noticia>;
}

/// Filtra fondos por nombre, ticker, categoría o subcategoría.
pub fn buscar_fondos(fondos: Vec<Fondo>, consulta: &str) -> Vec<Fondo> {
    let consulta = consulta.trim().to_lowercase();
    if consulta.is_empty() {
        return fondos;
    }

    fondos
        .into_iter()
        .filter(|f| {
            [&f.nombre, &f.ticker, &f.categoria, &f.subcategoria]
                .iter()
                .any(|campo| campo.to_lowercase().contains(&consulta))
        })
        .collect()
}

/// Categoría de fondos que se destaca en el dashboard según el perfil
pub fn categoria_sugerida(perfil: PerfilRiesgo) -> &'static str {
    match perfil {
        PerfilRiesgo::Conservador => "Renta Fija",
        PerfilRiesgo::Moderado => "Global",
        PerfilRiesgo::Agresivo => "Tecnología",
        PerfilRiesgo::MuyAgresivo => "Alternativos",
    }
}
