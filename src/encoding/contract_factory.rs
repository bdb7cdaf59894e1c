use alloy_primitives::Address;

use crate::encoding::errors::EncodingError;

/// Deploys a contract and returns its address.
///
/// The client consumes two factories, once each and in order: the Hyper contract first, the
/// forwarder second. Signing, broadcasting and waiting for the receipt are the implementor's
/// concern.
pub trait ContractFactory: Send + Sync {
    fn deploy(&self, constructor_args: &[u8]) -> Result<Address, EncodingError>;
}
