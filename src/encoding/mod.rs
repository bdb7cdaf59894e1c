pub mod batch;
pub mod constants;
pub mod contract_factory;
pub mod decoder;
pub mod errors;
pub mod evm;
pub mod instruction_encoders;
pub mod models;
pub mod serde_primitives;
pub mod utils;
