pub mod pipeline;
pub mod source;
pub mod state;
