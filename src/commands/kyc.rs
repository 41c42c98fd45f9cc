use chrono::Local;

use crate::db::Database;
use crate::error::Result;
use crate::models::{FormularioKyc, RegistroKyc};
use crate::perfil::{Evento, Pantalla, Sesion};

/// Botón "Finalizar KYC": valida, guarda el formulario y pasa al cuestionario.
pub fn finalizar_kyc(db: &Database, sesion: &mut Sesion, formulario: FormularioKyc) -> Result<Pantalla> {
    sesion.validar(Evento::KycFinalizado)?;
    let email = sesion.exigir_usuario()?.email.clone();

    formulario.validar(Local::now().date_naive())?;
    db.registrar_kyc(&email, &formulario)?;

    sesion.aplicar(Evento::KycFinalizado)
}

/// Formulario KYC guardado del usuario de la sesión
pub fn obtener_kyc_actual(db: &Database, sesion: &Sesion) -> Result<Option<RegistroKyc>> {
    let usuario = sesion.exigir_usuario()?;
    db.obtener_kyc(usuario.usuario_id)
}
