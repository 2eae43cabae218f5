pub mod clients;
pub mod settings;

pub use clients::*;
pub use settings::*;
