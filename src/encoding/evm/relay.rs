use alloy_sol_types::{sol, SolCall};
use num_bigint::BigUint;

use crate::encoding::models::{Deployment, Payload, Transaction};

sol! {
    /// Entry point of the forwarder: passes `payload` on to the `target` contract.
    function relay(address target, bytes payload);
}

/// Wraps a payload into the forwarder's `relay(address,bytes)` call targeting the deployed Hyper
/// contract. The transaction is returned unsent.
pub fn encode_relay_transaction(deployment: &Deployment, payload: Payload) -> Transaction {
    let call = relayCall { target: deployment.target, payload: payload.into_bytes() };
    Transaction { to: deployment.forwarder, value: BigUint::ZERO, data: call.abi_encode() }
}

#[cfg(test)]
mod tests {
    use alloy_primitives::{address, Bytes};

    use super::*;
    use crate::encoding::models::EncodedInstruction;

    #[test]
    fn test_encode_relay_transaction() {
        let deployment = Deployment {
            target: address!("3Ede3eCa2a72B3aeCC820E955B36f38437D01395"),
            forwarder: address!("cd09f75E2BF2A4d11F3AB23f1389FcC1621c0cc2"),
        };
        let payload = Payload::from(EncodedInstruction::from(vec![0xaa, 0x01, 0x00, 0x01, 0x05]));

        let transaction = encode_relay_transaction(&deployment, payload);

        assert_eq!(transaction.to, deployment.forwarder);
        assert_eq!(transaction.value, BigUint::ZERO);
        assert_eq!(&transaction.data[..4], relayCall::SELECTOR.as_slice());
        let decoded = relayCall::abi_decode(&transaction.data, true).unwrap();
        assert_eq!(decoded.target, deployment.target);
        assert_eq!(decoded.payload, Bytes::from(vec![0xaa, 0x01, 0x00, 0x01, 0x05]));
        assert_eq!(
            hex::encode(&transaction.data[4..]),
            String::from(concat!(
                // target
                "0000000000000000000000003ede3eca2a72b3aecc820e955b36f38437d01395",
                // payload offset
                "0000000000000000000000000000000000000000000000000000000000000040",
                // payload length
                "0000000000000000000000000000000000000000000000000000000000000005",
                // payload
                "aa01000105000000000000000000000000000000000000000000000000000000",
            ))
        );
    }
}
