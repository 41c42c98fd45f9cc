pub mod kyc;
pub mod usuario;

pub use kyc::*;
pub use usuario::*;
