pub mod logger;
pub mod screenshot;
