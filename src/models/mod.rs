pub mod events;
pub mod landmarks;
pub mod settings;

#[cfg(test)]
pub(crate) mod fixtures;
