use std::str::FromStr;

use alloy_primitives::Address;
use hyper_execution::encoding::{
    contract_factory::ContractFactory,
    errors::EncodingError,
    evm::client_builder::HyperClientBuilder,
    models::{CurveId, CurveParameters, PairId, PoolId, TickRange},
    utils::scale_amount,
};
use num_bigint::BigUint;

/// Stands in for a real deployer: returns a fixed address instead of sending a transaction.
struct PredeployedContract(Address);

impl ContractFactory for PredeployedContract {
    fn deploy(&self, _constructor_args: &[u8]) -> Result<Address, EncodingError> {
        Ok(self.0)
    }
}

fn main() {
    // Setup variables
    let hyper = Address::from_str("0x3Ede3eCa2a72B3aeCC820E955B36f38437D01395")
        .expect("Failed to create hyper address");
    let forwarder = Address::from_str("0xcd09f75E2BF2A4d11F3AB23f1389FcC1621c0cc2")
        .expect("Failed to create forwarder address");
    let weth = Address::from_str("0xc02aaa39b223fe8d0a0e5c4f27ead9083c756cc2")
        .expect("Failed to create WETH address");
    let usdc = Address::from_str("0xa0b86991c6218b36c1d19d4a2e9eb0ce3606eb48")
        .expect("Failed to create USDC address");

    // Initialize and deploy the client
    let client = HyperClientBuilder::new()
        .hyper_factory(Box::new(PredeployedContract(hyper)))
        .forwarder_factory(Box::new(PredeployedContract(forwarder)))
        .build()
        .expect("Failed to build client");

    // Every operation fails until the contracts are deployed
    assert!(!client.is_deployed());
    client
        .deploy(&[])
        .expect("Failed to deploy");

    // ------------------- Create a pair, a curve and a pool at once -------------------
    let curve = CurveParameters::new(
        BigUint::from_str("2000_000000").expect("Failed to create strike"),
        10_000,        // 100% implied volatility, in basis points
        2_000_000_000, // maturity, unix seconds
        30,            // 0.30% fee, in basis points
    );
    let tx = client
        .create_pool(
            weth,
            usdc,
            curve,
            BigUint::from_str("1900_000000").expect("Failed to create price"),
        )
        .expect("Failed to encode pool creation");
    println!(" ====== Create WETH/USDC pool ======");
    println!(
        "Send to {:?} with value {:?} and data: 0x{}",
        tx.to,
        tx.value,
        hex::encode(&tx.data)
    );

    // ------------------- Provide liquidity and swap -------------------
    // The pool created above is assumed to have received pair id 1 and curve id 1 on chain.
    let pool = PoolId::from_parts(
        PairId::new(1).expect("Failed to create pair id"),
        CurveId::new(1).expect("Failed to create curve id"),
    );
    let ticks = TickRange::new(-1_000, 1_000).expect("Failed to create tick range");

    let tx = client
        .add_liquidity(pool, ticks, scale_amount(1, 18))
        .expect("Failed to encode liquidity");
    println!(" ====== Add liquidity ======");
    println!("Send to {:?} with data: 0x{}", tx.to, hex::encode(&tx.data));

    // Sell the whole WETH balance; no limit is needed when swapping the full balance
    let tx = client
        .swap_asset_to_quote(true, pool, BigUint::ZERO, BigUint::ZERO)
        .expect("Failed to encode swap");
    println!(" ====== Swap all WETH for USDC ======");
    println!("Send to {:?} with data: 0x{}", tx.to, hex::encode(&tx.data));
}
