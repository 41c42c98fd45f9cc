//! Análisis de sentimiento por léxico y extracción de tickers.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::LazyLock;

static TICKER_DOLAR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$([A-Z]{1,5})\b").expect("regex de ticker válida"));
static TICKER_PALABRA: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b([A-Z]{2,5})\b").expect("regex de palabra válida"));

/// Palabras en mayúsculas que no son tickers
const PALABRAS_COMUNES: &[&str] = &[
    "THE", "AND", "FOR", "ARE", "BUT", "NOT", "YOU", "ALL", "ANY", "CAN", "HAD", "HAS", "HER",
    "HIS", "ONE", "OUR", "OUT", "WHO", "IPO", "GDP", "AI", "CEO", "USA", "EU", "ESG", "ETF",
];

const POSITIVAS: &[&str] = &[
    "growth", "recovery", "stability", "gain", "gains", "rise", "rises", "rally", "strong",
    "promising", "opportunity", "record", "beat", "beats", "bullish", "up", "highest", "stable",
    "crecimiento", "recuperación", "estabilidad", "ganancia", "ganancias", "sube", "subida",
    "fuerte", "oportunidad", "récord", "alcista", "positivo", "mejora",
];

const NEGATIVAS: &[&str] = &[
    "decline", "volatility", "volatile", "loss", "losses", "fall", "falls", "drop", "crash",
    "weak", "uncertainty", "risk", "bearish", "down", "lowest", "fear", "recession",
    "caída", "cae", "pérdida", "pérdidas", "volatilidad", "débil", "incertidumbre", "riesgo",
    "bajista", "negativo", "recesión", "crisis",
];

/// Umbral a partir del cual el sentimiento deja de ser neutral
pub const UMBRAL_SENTIMIENTO: f64 = 0.3;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sentimiento {
    /// Polaridad en [-1, 1]
    pub general: f64,
    pub por_ticker: BTreeMap<String, f64>,
}

impl Sentimiento {
    pub fn etiqueta(&self) -> &'static str {
        if self.general > UMBRAL_SENTIMIENTO {
            "Positivo"
        } else if self.general < -UMBRAL_SENTIMIENTO {
            "Negativo"
        } else {
            "Neutral"
        }
    }
}

/// Analiza el sentimiento de un texto. Sin palabras de léxico la polaridad es 0.
pub fn analizar_sentimiento(texto: &str) -> Sentimiento {
    let mut positivas = 0u32;
    let mut negativas = 0u32;

    for palabra in texto
        .split(|c: char| !c.is_alphanumeric())
        .filter(|p| !p.is_empty())
    {
        let palabra = palabra.to_lowercase();
        if POSITIVAS.contains(&palabra.as_str()) {
            positivas += 1;
        } else if NEGATIVAS.contains(&palabra.as_str()) {
            negativas += 1;
        }
    }

    let total = positivas + negativas;
    let general = if total == 0 {
        0.0
    } else {
        redondear((f64::from(positivas) - f64::from(negativas)) / f64::from(total))
    };

    let por_ticker = extraer_tickers(texto)
        .into_iter()
        .map(|ticker| {
            let valor = sentimiento_ticker(&ticker, general);
            (ticker, valor)
        })
        .collect();

    Sentimiento { general, por_ticker }
}

/// Tickers del texto: `$AAPL` o palabras de 2 a 5 mayúsculas. Sin duplicados.
pub fn extraer_tickers(texto: &str) -> Vec<String> {
    let mut tickers = BTreeSet::new();

    for cap in TICKER_DOLAR.captures_iter(texto) {
        tickers.insert(cap[1].to_string());
    }
    for cap in TICKER_PALABRA.captures_iter(texto) {
        let candidato = &cap[1];
        if !PALABRAS_COMUNES.contains(&candidato) {
            tickers.insert(candidato.to_string());
        }
    }

    tickers.into_iter().collect()
}

/// Desplaza la polaridad base con un factor fijo por ticker, en [-0.2, 0.2].
fn sentimiento_ticker(ticker: &str, base: f64) -> f64 {
    let hash = ticker.chars().map(|c| c as u32).sum::<u32>() % 100;
    let factor = (f64::from(hash) / 100.0 - 0.5) * 0.4;
    redondear((base + factor).clamp(-1.0, 1.0))
}

fn redondear(valor: f64) -> f64 {
    (valor * 100.0).round() / 100.0
}
