mod system;

pub use system::{SystemController, SystemControllerApi};
