use std::io::{self, BufRead, Write};

use chrono::NaiveDate;
use tracing::error;
use tracing_subscriber::EnvFilter;

use traid::commands::{config, dashboard, kyc, riesgo, usuarios};
use traid::config::ENV_LOG;
use traid::mercado::{MercadoSimulado, ProveedorMercado, CATEGORIAS};
use traid::models::{
    DatosPersonaFisica, DatosPersonaJuridica, DocumentoEmpresa, DocumentoPersona, FormularioKyc,
    NuevoUsuario,
};
use traid::perfil::Cuestionario;
use traid::{Database, Pantalla, Sesion};

const SEMILLA_MERCADO: u64 = 42;

fn init_logs() {
    let filtro = EnvFilter::try_from_env(ENV_LOG).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filtro)
        .with_writer(io::stderr)
        .init();
}

/// Entrada de consola. `None` cuando se cierra stdin.
struct Consola {
    lineas: io::Lines<io::StdinLock<'static>>,
}

impl Consola {
    fn preguntar(&mut self, etiqueta: &str) -> io::Result<Option<String>> {
        print!("{}: ", etiqueta);
        io::stdout().flush()?;
        match self.lineas.next() {
            Some(linea) => Ok(Some(linea?.trim().to_string())),
            None => Ok(None),
        }
    }
}

fn main() {
    init_logs();
    if let Err(e) = run() {
        error!(error = %e, "error fatal");
        std::process::exit(1);
    }
}

fn run() -> traid::Result<()> {
    let db = Database::new()?;
    let ajustes = config::obtener_ajustes(&db)?;
    let cuestionario = riesgo::obtener_cuestionario(&db)?;
    let mercado = MercadoSimulado::new(SEMILLA_MERCADO);
    let mut sesion = Sesion::nueva(ajustes.politica);
    let mut consola = Consola {
        lineas: io::stdin().lock().lines(),
    };

    println!("\n  TRAID\n  Enjoy the best investment experience.\n");

    loop {
        let seguir = match sesion.pantalla() {
            Pantalla::Inicio => pantalla_inicio(&db, &mut sesion, &mut consola)?,
            Pantalla::Kyc => pantalla_kyc(&db, &mut sesion, &mut consola)?,
            Pantalla::PerfilRiesgo => {
                pantalla_riesgo(&db, &mut sesion, &cuestionario, &mut consola)?
            }
            Pantalla::Dashboard => pantalla_dashboard(&db, &mut sesion, &mercado, &mut consola)?,
        };
        if !seguir {
            break;
        }
    }

    Ok(())
}

fn pantalla_inicio(db: &Database, sesion: &mut Sesion, consola: &mut Consola) -> traid::Result<bool> {
    println!("\n[1] Log In   [2] Sign Up   [3] Salir");
    let Some(opcion) = consola.preguntar("Opción")? else {
        return Ok(false);
    };

    match opcion.as_str() {
        "1" => {
            let (Some(usuario), Some(contrasena)) =
                (consola.preguntar("DNI / CIF o email")?, consola.preguntar("Contraseña")?)
            else {
                return Ok(false);
            };
            match usuarios::iniciar_sesion(db, sesion, &usuario, &contrasena) {
                Ok(activa) => println!("Bienvenido, {}", activa.nombre),
                Err(e) => println!("! {}", e),
            }
        }
        "2" => {
            let mut nuevo = NuevoUsuario::default();
            let campos = [
                consola.preguntar("DNI / CIF")?,
                consola.preguntar("Nombre (opcional)")?,
                consola.preguntar("Email")?,
                consola.preguntar("Contraseña")?,
                consola.preguntar("Confirmar contraseña")?,
                consola.preguntar("Acepto la política de privacidad y cookies (s/n)")?,
            ];
            let [Some(usuario), Some(nombre), Some(email), Some(pwd1), Some(pwd2), Some(acepta)] = campos
            else {
                return Ok(false);
            };
            nuevo.usuario = usuario;
            nuevo.nombre = Some(nombre).filter(|n| !n.is_empty());
            nuevo.email = email;
            nuevo.contrasena = pwd1;
            nuevo.confirmar_contrasena = pwd2;
            nuevo.acepta_politica = acepta.eq_ignore_ascii_case("s");

            match usuarios::registrar(db, sesion, nuevo) {
                Ok(u) => println!("Cuenta creada para {}", u.email),
                Err(e) => println!("! {}", e),
            }
        }
        "3" => return Ok(false),
        _ => println!("! Opción no válida"),
    }
    Ok(true)
}

fn campo(consola: &mut Consola, etiqueta: &str) -> io::Result<String> {
    Ok(consola.preguntar(etiqueta)?.unwrap_or_default())
}

fn leer_fecha(consola: &mut Consola, etiqueta: &str) -> io::Result<Option<NaiveDate>> {
    Ok(consola
        .preguntar(etiqueta)?
        .and_then(|s| NaiveDate::parse_from_str(&s, "%Y-%m-%d").ok()))
}

fn pantalla_kyc(db: &Database, sesion: &mut Sesion, consola: &mut Consola) -> traid::Result<bool> {
    println!("\nFormulario KYC   [1] Persona Física   [2] Persona Jurídica   [0] Cerrar sesión");
    let Some(tipo) = consola.preguntar("Tipo de cliente")? else {
        return Ok(false);
    };

    let formulario = match tipo.as_str() {
        "0" => {
            usuarios::cerrar_sesion(sesion);
            return Ok(true);
        }
        "1" => {
            let nombre_apellidos = campo(consola, "Nombre y Apellidos")?;
            let tipo_documento = match campo(consola, "Tipo de Documento (DNI/Pasaporte/NIE)")?
                .to_uppercase()
                .as_str()
            {
                "PASAPORTE" => DocumentoPersona::Pasaporte,
                "NIE" => DocumentoPersona::Nie,
                _ => DocumentoPersona::Dni,
            };
            let numero_documento = campo(consola, "Número de Documento")?;
            let fecha_nacimiento = leer_fecha(consola, "Fecha de Nacimiento (AAAA-MM-DD)")?;
            FormularioKyc::PersonaFisica(DatosPersonaFisica {
                nombre_apellidos,
                tipo_documento,
                numero_documento,
                fecha_nacimiento,
                nacionalidad: campo(consola, "Nacionalidad")?,
                pais_residencia: campo(consola, "País de Residencia")?,
                direccion: campo(consola, "Dirección")?,
                telefono: campo(consola, "Teléfono")?,
                email: campo(consola, "Email")?,
                situacion_laboral: campo(consola, "Situación Laboral")?,
                actividad_empresarial: campo(consola, "Actividad Empresarial")?,
                patrimonio_aportado: campo(consola, "Patrimonio Aportado")?,
            })
        }
        "2" => {
            let razon_social = campo(consola, "Razón Social")?;
            let tipo_documento = match campo(consola, "Tipo de Documento (CIF/NIF)")?.to_uppercase().as_str() {
                "NIF" => DocumentoEmpresa::Nif,
                _ => DocumentoEmpresa::Cif,
            };
            let numero_documento = campo(consola, "Número de Documento")?;
            let fecha_constitucion = leer_fecha(consola, "Fecha de Constitución (AAAA-MM-DD)")?;
            FormularioKyc::PersonaJuridica(DatosPersonaJuridica {
                razon_social,
                tipo_documento,
                numero_documento,
                fecha_constitucion,
                pais_constitucion: campo(consola, "País de Constitución")?,
                objeto_social: campo(consola, "Objeto Social")?,
                actividad_real: campo(consola, "Actividad Real")?,
                direccion_fiscal: campo(consola, "Dirección Fiscal")?,
                telefono: campo(consola, "Teléfono")?,
                email: campo(consola, "Email")?,
                ingresos_anuales_estimados: campo(consola, "Ingresos Anuales Estimados")?,
            })
        }
        _ => {
            println!("! Opción no válida");
            return Ok(true);
        }
    };

    if let Err(e) = kyc::finalizar_kyc(db, sesion, formulario) {
        println!("! {}", e);
    }
    Ok(true)
}

fn pantalla_riesgo(
    db: &Database,
    sesion: &mut Sesion,
    cuestionario: &Cuestionario,
    consola: &mut Consola,
) -> traid::Result<bool> {
    println!("\nCuestionario de Perfil de Riesgo (0 para cerrar sesión)");

    let mut respuestas = Vec::with_capacity(cuestionario.preguntas().len());
    for pregunta in cuestionario.preguntas() {
        println!("\n{}", pregunta.enunciado());
        for (i, opcion) in pregunta.opciones().iter().enumerate() {
            println!("  [{}] {}", i + 1, opcion);
        }
        let Some(respuesta) = consola.preguntar("Respuesta")? else {
            return Ok(false);
        };
        if respuesta == "0" {
            usuarios::cerrar_sesion(sesion);
            return Ok(true);
        }
        // Una respuesta ilegible se envía como 0 y el cuestionario la rechaza
        respuestas.push(respuesta.parse::<u8>().unwrap_or(0));
    }

    match riesgo::enviar_cuestionario(db, sesion, cuestionario, &respuestas) {
        Ok(resultado) => println!(
            "Tu perfil es: {} (puntaje {})",
            resultado.perfil, resultado.puntaje
        ),
        Err(e) => println!("! {}", e),
    }
    Ok(true)
}

fn pantalla_dashboard(
    db: &Database,
    sesion: &mut Sesion,
    mercado: &dyn ProveedorMercado,
    consola: &mut Consola,
) -> traid::Result<bool> {
    match dashboard::abrir_dashboard(db, sesion, mercado) {
        Ok(resumen) => {
            println!("\nBienvenido a TRAID, {}", resumen.usuario.nombre);
            if let Some(perfil) = resumen.usuario.perfil_riesgo {
                println!("Perfil de riesgo: {}", perfil);
            }
            println!(
                "Cartera: {} EUR ({:+.1}% en el año, volatilidad {:.2}%)",
                resumen.metricas.valor_actual,
                resumen.metricas.crecimiento_pct,
                resumen.metricas.volatilidad_pct
            );
            if let Some(categoria) = &resumen.categoria_destacada {
                println!("\nFondos destacados ({})", categoria);
            } else {
                println!("\nFondos más rentables");
            }
            for f in &resumen.fondos {
                println!("  {:<6} {:<55} {:+.2}%", f.ticker, f.nombre, f.rentabilidad_1a);
            }
            println!("\nNoticias");
            for n in &resumen.noticias {
                println!("  {} | {} ({})", n.fecha, n.titulo, n.fuente);
            }
        }
        Err(e) => println!("! {}", e),
    }

    println!("\n[1] Buscar fondos   [2] Cerrar sesión   [3] Salir");
    let Some(opcion) = consola.preguntar("Opción")? else {
        return Ok(false);
    };
    match opcion.as_str() {
        "1" => {
            println!("Categorías: {}", CATEGORIAS.join(", "));
            let Some(categoria) = consola.preguntar("Categoría (vacío para todas)")? else {
                return Ok(false);
            };
            let Some(consulta) = consola.preguntar("Buscar")? else {
                return Ok(false);
            };
            let categoria = Some(categoria.as_str()).filter(|c| !c.is_empty());
            match dashboard::buscar_fondos(db, sesion, mercado, categoria, &consulta, 10) {
                Ok(fondos) if fondos.is_empty() => println!("Sin resultados"),
                Ok(fondos) => {
                    for f in fondos {
                        println!("  {:<6} {} [{} / {}]", f.ticker, f.nombre, f.categoria, f.subcategoria);
                    }
                }
                Err(e) => println!("! {}", e),
            }
            Ok(true)
        }
        "2" => {
            usuarios::cerrar_sesion(sesion);
            Ok(true)
        }
        _ => Ok(false),
    }
}
