use chrono::{Duration, Local, NaiveDate};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use tracing::debug;

use super::sentimiento::analizar_sentimiento;
use super::{Fondo, MetricasCartera, Noticia, ProveedorMercado, PuntoCartera};

const VALOR_INICIAL: f64 = 1_000_000.0;
const CRECIMIENTO_ANUAL: f64 = 0.085;
const DIAS_SERIE: i64 = 365;

const SUBCATEGORIAS: &[(&str, &[&str])] = &[
    ("Tecnología", &["Grandes Tecnológicas", "Tecnología Emergente", "Biotecnología", "Fintech", "IA y Robótica"]),
    ("Global", &["Mercados Desarrollados", "Mercados Emergentes", "Global Diversificado", "Pequeñas Compañías"]),
    ("ESG", &["Energía Limpia", "Inversión Sostenible", "Impacto Social", "Bonos Verdes"]),
    ("Renta Fija", &["Deuda Pública", "Deuda Corporativa", "High Yield", "Bonos Municipales"]),
    ("Sectorial", &["Salud", "Inmobiliario", "Energía", "Materiales", "Consumo"]),
    ("Alternativos", &["Materias Primas", "Estrategias Hedge", "Capital Privado", "Infraestructuras"]),
];

const PREFIJOS: &[&str] = &["Global", "Strategic", "Dynamic", "Prime", "Select", "Value"];
const NUCLEOS: &[&str] = &["Growth", "Income", "Balanced", "Opportunity", "Leaders", "Alpha"];
const SUFIJOS: &[&str] = &["Fund", "ETF", "Portfolio", "Trust", "Strategy"];
const MINIMOS: &[u32] = &[0, 1000, 2500, 5000, 10000, 25000, 50000];

const FUENTES: &[&str] = &[
    "Expansión",
    "Cinco Días",
    "Bloomberg",
    "Reuters",
    "Financial Times",
    "El Economista",
];
const TEMAS: &[&str] = &[
    "Tipos de interés",
    "Inflación",
    "Bolsa española",
    "Bitcoin",
    "Petróleo",
    "Oro",
    "Mercado de bonos",
    "Banca",
    "Vivienda",
    "IA en finanzas",
];
const TENDENCIAS: &[&str] = &[
    "crecimiento",
    "caída",
    "recuperación",
    "volatilidad",
    "estabilidad",
];

/// Proveedor de datos sintéticos. Misma semilla y fecha, mismos datos.
#[derive(Debug, Clone)]
pub struct MercadoSimulado {
    semilla: u64,
    hoy: NaiveDate,
}

impl MercadoSimulado {
    pub fn new(semilla: u64) -> Self {
        Self::con_fecha(semilla, Local::now().date_naive())
    }

    pub fn con_fecha(semilla: u64, hoy: NaiveDate) -> Self {
        MercadoSimulado { semilla, hoy }
    }

    fn rng(&self, canal: u64) -> StdRng {
        StdRng::seed_from_u64(self.semilla.wrapping_mul(31).wrapping_add(canal))
    }

    fn catalogo(&self) -> Vec<Fondo> {
        let mut rng = self.rng(1);
        let mut fondos = Vec::new();

        for (categoria, subcategorias) in SUBCATEGORIAS {
            for subcategoria in subcategorias.iter() {
                for _ in 0..rng.gen_range(1..=3) {
                    let nombre = format!(
                        "{} {} {} {}",
                        elegir(&mut rng, PREFIJOS),
                        subcategoria,
                        elegir(&mut rng, NUCLEOS),
                        elegir(&mut rng, SUFIJOS),
                    );
                    let ticker: String = (0..rng.gen_range(3..=5))
                        .map(|_| char::from(b'A' + rng.gen_range(0..26u8)))
                        .collect();
                    let antiguedad = rng.gen_range(365..=7300);

                    fondos.push(Fondo {
                        nombre,
                        ticker,
                        categoria: categoria.to_string(),
                        subcategoria: subcategoria.to_string(),
                        rentabilidad_1a: redondear(rng.gen_range(-10.0..30.0)),
                        rentabilidad_3a: redondear(rng.gen_range(-5.0..25.0)),
                        rentabilidad_5a: redondear(rng.gen_range(0.0..20.0)),
                        rentabilidad_ytd: redondear(rng.gen_range(-15.0..25.0)),
                        ratio_sharpe: redondear(rng.gen_range(0.5..2.5)),
                        volatilidad: redondear(rng.gen_range(5.0..25.0)),
                        gastos_corrientes: redondear(rng.gen_range(0.05..1.5)),
                        patrimonio_mm: redondear(rng.gen_range(10.0..10000.0)),
                        inversion_minima: MINIMOS.choose(&mut rng).copied().unwrap_or(0),
                        nivel_riesgo: rng.gen_range(1..=5),
                        fecha_inicio: self.hoy - Duration::days(antiguedad),
                    });
                }
            }
        }

        fondos
    }
}

impl ProveedorMercado for MercadoSimulado {
    fn metricas_cartera(&self) -> MetricasCartera {
        let mut rng = self.rng(0);
        let dias = DIAS_SERIE as usize;
        let inicio = self.hoy - Duration::days(DIAS_SERIE - 1);

        let mut paseo = 0.0;
        let serie: Vec<PuntoCartera> = (0..dias)
            .map(|i| {
                let t = i as f64 / (dias - 1) as f64;
                paseo += rng.gen_range(-0.01..0.01);
                let estacionalidad = (t * 12.0).sin() * 0.03;
                PuntoCartera {
                    fecha: inicio + Duration::days(i as i64),
                    valor: VALOR_INICIAL * (1.0 + CRECIMIENTO_ANUAL * t + paseo + estacionalidad),
                }
            })
            .collect();

        let primero = serie.first().map_or(VALOR_INICIAL, |p| p.valor);
        let ultimo = serie.last().map_or(VALOR_INICIAL, |p| p.valor);

        let retornos: Vec<f64> = serie
            .windows(2)
            .map(|par| par[1].valor / par[0].valor - 1.0)
            .collect();
        let media = retornos.iter().sum::<f64>() / retornos.len().max(1) as f64;
        let varianza = retornos.iter().map(|r| (r - media).powi(2)).sum::<f64>()
            / retornos.len().saturating_sub(1).max(1) as f64;

        MetricasCartera {
            valor_actual: ultimo as i64,
            crecimiento_pct: (((ultimo / primero) - 1.0) * 1000.0).round() / 10.0,
            volatilidad_pct: redondear(varianza.sqrt() * 252f64.sqrt() * 100.0),
            serie,
        }
    }

    fn fondos(&self, categoria: Option<&str>, limite: usize) -> Vec<Fondo> {
        let mut fondos: Vec<Fondo> = self
            .catalogo()
            .into_iter()
            .filter(|f| categoria.map_or(true, |c| f.categoria.to_lowercase() == c.trim().to_lowercase()))
            .collect();

        fondos.sort_by(|a, b| b.rentabilidad_1a.total_cmp(&a.rentabilidad_1a));
        fondos.truncate(limite);
        debug!(?categoria, total = fondos.len(), "fondos simulados");
        fondos
    }

    fn noticias(&self, limite: usize) -> Vec<Noticia> {
        let mut rng = self.rng(2);

        (0..limite)
            .map(|i| {
                let tema = elegir(&mut rng, TEMAS);
                let tendencia = elegir(&mut rng, TENDENCIAS);
                let titulo = match rng.gen_range(0..4) {
                    0 => format!("{}: señales de {}", tema, tendencia),
                    1 => format!("Los expertos prevén {} en {} para los próximos meses", tendencia, tema.to_lowercase()),
                    2 => format!("{}: lo que el inversor necesita saber", tema),
                    _ => format!("Nuevo informe revela {} en {}", tendencia, tema.to_lowercase()),
                };
                let resumen = format!(
                    "Análisis de la situación actual de {} y su posible impacto en los mercados, con {} como tendencia dominante.",
                    tema.to_lowercase(),
                    tendencia
                );
                let sentimiento = analizar_sentimiento(&format!("{} {}", titulo, resumen)).general;

                Noticia {
                    fecha: self.hoy - Duration::days(rng.gen_range(0..7)),
                    fuente: elegir(&mut rng, FUENTES).to_string(),
                    url: format!("https://example.com/noticias-financieras/{}", i),
                    titulo,
                    resumen,
                    sentimiento,
                }
            })
            .collect()
    }
}

fn elegir<'a>(rng: &mut StdRng, opciones: &[&'a str]) -> &'a str {
    opciones.choose(rng).copied().unwrap_or_default()
}

fn redondear(valor: f64) -> f64 {
    (valor * 100.0).round() / 100.0
}
