use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{Result, TraidError};

/// Cada pregunta tiene exactamente 4 opciones, ordinales 1 a 4
pub const NUM_OPCIONES: usize = 4;

/// Multiplicador que lleva el puntaje ponderado (1.0 - 4.0) al rango 10 - 40
pub const ESCALA_POR_DEFECTO: f64 = 10.0;

/// Decimales que se conservan antes de redondear el puntaje
const PRECISION: f64 = 1e9;

/// Elimina el ruido de coma flotante: 2.5499999999999994 pasa a 2.55
fn ajustar_precision(valor: f64) -> f64 {
    (valor * PRECISION).round() / PRECISION
}

/// Pregunta del cuestionario de perfil de riesgo.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pregunta {
    enunciado: String,
    opciones: [String; NUM_OPCIONES],
    peso: f64,
}

impl Pregunta {
    /// Crea una pregunta validando enunciado y peso en (0, 1].
    pub fn new(enunciado: &str, opciones: [&str; NUM_OPCIONES], peso: f64) -> Result<Self> {
        let enunciado = enunciado.trim();
        if enunciado.is_empty() {
            return Err(TraidError::PreguntaInvalida(
                "el enunciado no puede estar vacío".to_string(),
            ));
        }
        if !(peso > 0.0 && peso <= 1.0) {
            return Err(TraidError::PreguntaInvalida(format!(
                "'{}': el peso debe estar en (0, 1], recibido {}",
                enunciado, peso
            )));
        }
        if opciones.iter().any(|o| o.trim().is_empty()) {
            return Err(TraidError::PreguntaInvalida(format!(
                "'{}': ninguna opción puede estar vacía",
                enunciado
            )));
        }

        Ok(Pregunta {
            enunciado: enunciado.to_string(),
            opciones: opciones.map(|o| o.trim().to_string()),
            peso,
        })
    }

    pub fn enunciado(&self) -> &str {
        &self.enunciado
    }

    pub fn opciones(&self) -> &[String; NUM_OPCIONES] {
        &self.opciones
    }

    pub fn peso(&self) -> f64 {
        self.peso
    }

    /// Aporte de la respuesta: ordinal x peso
    fn aporte(&self, ordinal: u8) -> f64 {
        f64::from(ordinal) * self.peso
    }
}

/// Perfil de riesgo resultante del cuestionario.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PerfilRiesgo {
    Conservador,
    Moderado,
    Agresivo,
    MuyAgresivo,
}

impl PerfilRiesgo {
    pub fn etiqueta(&self) -> &'static str {
        match self {
            PerfilRiesgo::Conservador => "Conservador",
            PerfilRiesgo::Moderado => "Moderado",
            PerfilRiesgo::Agresivo => "Agresivo",
            PerfilRiesgo::MuyAgresivo => "Muy Agresivo",
        }
    }

    pub fn desde_etiqueta(etiqueta: &str) -> Option<Self> {
        match etiqueta {
            "Conservador" => Some(PerfilRiesgo::Conservador),
            "Moderado" => Some(PerfilRiesgo::Moderado),
            "Agresivo" => Some(PerfilRiesgo::Agresivo),
            "Muy Agresivo" => Some(PerfilRiesgo::MuyAgresivo),
            _ => None,
        }
    }
}

impl fmt::Display for PerfilRiesgo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.etiqueta())
    }
}

/// Clasifica un puntaje escalado en su banda (intervalos cerrados).
///
/// Un puntaje fuera de 10 - 40 es un error explícito: nunca se ajusta al
/// perfil más cercano.
pub fn clasificar_perfil(puntaje: i64) -> Result<PerfilRiesgo> {
    match puntaje {
        10..=17 => Ok(PerfilRiesgo::Conservador),
        18..=25 => Ok(PerfilRiesgo::Moderado),
        26..=33 => Ok(PerfilRiesgo::Agresivo),
        34..=40 => Ok(PerfilRiesgo::MuyAgresivo),
        _ => Err(TraidError::PuntajeFueraDeRango(puntaje)),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResultadoRiesgo {
    /// Suma ponderada antes de escalar
    pub puntaje_bruto: f64,
    /// Puntaje escalado y redondeado
    pub puntaje: i64,
    pub perfil: PerfilRiesgo,
}

/// Conjunto fijo de preguntas ponderadas. Se define al arrancar y no cambia.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cuestionario {
    preguntas: Vec<Pregunta>,
    escala: f64,
}

impl Cuestionario {
    pub fn new(preguntas: Vec<Pregunta>, escala: f64) -> Result<Self> {
        if preguntas.is_empty() {
            return Err(TraidError::PreguntaInvalida(
                "el cuestionario necesita al menos una pregunta".to_string(),
            ));
        }
        if !(escala.is_finite() && escala > 0.0) {
            return Err(TraidError::PreguntaInvalida(format!(
                "la escala debe ser positiva, recibido {}",
                escala
            )));
        }
        Ok(Cuestionario { preguntas, escala })
    }

    /// Cuestionario estándar de 7 preguntas; los pesos suman 1.0.
    pub fn por_defecto() -> Self {
        let pregunta = |enunciado: &str, opciones: [&str; NUM_OPCIONES], peso: f64| Pregunta {
            enunciado: enunciado.to_string(),
            opciones: opciones.map(str::to_string),
            peso,
        };

        Cuestionario {
            preguntas: vec![
                pregunta(
                    "Objetivos de inversión",
                    [
                        "Preservar capital",
                        "Crecimiento medio",
                        "Oportunidades con riesgo",
                        "Crecimiento fuerte y volátil",
                    ],
                    0.25,
                ),
                pregunta("Pérdidas aceptables", ["5%", "15%", "35%", "55%"], 0.25),
                pregunta(
                    "Reacción ante pérdidas",
                    ["Vender todo", "Vender parte", "Mantener", "Comprar más"],
                    0.15,
                ),
                pregunta(
                    "Expectativas de rendimiento",
                    ["<3%", "3%-6%", "6%-10%", ">10%"],
                    0.15,
                ),
                pregunta("Volatilidad aceptada", ["Nada", "Poca", "Normal", "Mucha"], 0.10),
                pregunta(
                    "Horizonte temporal",
                    ["Menos de 1 año", "1 a 3 años", "3 a 7 años", "Más de 7 años"],
                    0.05,
                ),
                pregunta(
                    "Experiencia inversora",
                    ["Ninguna", "Depósitos y fondos", "Acciones", "Derivados"],
                    0.05,
                ),
            ],
            escala: ESCALA_POR_DEFECTO,
        }
    }

    pub fn con_escala(self, escala: f64) -> Result<Self> {
        Cuestionario::new(self.preguntas, escala)
    }

    pub fn preguntas(&self) -> &[Pregunta] {
        &self.preguntas
    }

    pub fn escala(&self) -> f64 {
        self.escala
    }

    /// Suma ponderada de las respuestas (ordinales 1 a 4, una por pregunta).
    pub fn puntaje_bruto(&self, respuestas: &[u8]) -> Result<f64> {
        let total = self.preguntas.len();
        if respuestas.len() < total {
            return Err(TraidError::CuestionarioIncompleto {
                respondidas: respuestas.len(),
                total,
            });
        }
        if respuestas.len() > total {
            return Err(TraidError::FormularioIncompleto(format!(
                "se recibieron {} respuestas para {} preguntas",
                respuestas.len(),
                total
            )));
        }

        let mut suma = 0.0;
        for (pregunta, &ordinal) in self.preguntas.iter().zip(respuestas) {
            if !(1..=NUM_OPCIONES as u8).contains(&ordinal) {
                return Err(TraidError::FormularioIncompleto(format!(
                    "'{}': opción {} fuera de rango (1-{})",
                    pregunta.enunciado, ordinal, NUM_OPCIONES
                )));
            }
            suma += pregunta.aporte(ordinal);
        }

        Ok(ajustar_precision(suma))
    }

    /// Calcula puntaje y perfil. Función pura: mismas respuestas, mismo resultado.
    pub fn evaluar(&self, respuestas: &[u8]) -> Result<ResultadoRiesgo> {
        let puntaje_bruto = self.puntaje_bruto(respuestas)?;
        // Medio punto se redondea alejándose de cero: 25.5 -> 26
        let puntaje = ajustar_precision(puntaje_bruto * self.escala).round() as i64;
        let perfil = clasificar_perfil(puntaje)?;

        Ok(ResultadoRiesgo {
            puntaje_bruto,
            puntaje,
            perfil,
        })
    }
}

impl Default for Cuestionario {
    fn default() -> Self {
        Cuestionario::por_defecto()
    }
}
