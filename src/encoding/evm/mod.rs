pub mod client;
pub mod client_builder;
pub mod relay;
