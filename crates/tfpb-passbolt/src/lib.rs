pub mod passbolt;

pub use passbolt::*;
