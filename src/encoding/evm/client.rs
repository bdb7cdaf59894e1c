use alloy_primitives::Address;
use num_bigint::BigUint;
use once_cell::sync::OnceCell;
use tracing::{debug, info};

use crate::encoding::{
    batch::{validate_references, BatchLimits, InstructionBatch},
    contract_factory::ContractFactory,
    errors::EncodingError,
    evm::relay::encode_relay_transaction,
    instruction_encoders::{
        encode_add_liquidity, encode_instruction, encode_remove_liquidity,
        encode_swap_exact_tokens,
    },
    models::{
        AmountDirective, CreatePair, CreatePool, CurveParameters, Deployment, EncodedInstruction,
        EncodingContext, Instruction, LiquidityChange, Payload, PoolId, Reference, SwapDirection,
        SwapExactTokens, TickRange, Transaction,
    },
};

/// Client side entry point to a Hyper deployment.
///
/// The client starts undeployed: every operation other than `deploy` fails with `NotDeployed`.
/// A successful `deploy` records the Hyper and forwarder addresses exactly once; the client stays
/// deployed for the rest of its lifetime. Each operation encodes its instructions and returns the
/// forwarder's `relay(target, payload)` call as an unsent `Transaction`.
///
/// # Fields
/// * `hyper_factory`: Deploys the Hyper contract
/// * `forwarder_factory`: Deploys the forwarder contract
/// * `batch_limits`: Limits applied to jump payloads
/// * `deployment`: Write-once addresses of both contracts
pub struct HyperClient {
    hyper_factory: Box<dyn ContractFactory>,
    forwarder_factory: Box<dyn ContractFactory>,
    batch_limits: BatchLimits,
    deployment: OnceCell<Deployment>,
}

impl HyperClient {
    pub fn new(
        hyper_factory: Box<dyn ContractFactory>,
        forwarder_factory: Box<dyn ContractFactory>,
        batch_limits: BatchLimits,
    ) -> Self {
        HyperClient { hyper_factory, forwarder_factory, batch_limits, deployment: OnceCell::new() }
    }

    /// Deploys the Hyper contract with `constructor_args`, then the forwarder.
    ///
    /// Fails with `AlreadyDeployed` if the client has been deployed before. If a factory fails the
    /// client stays undeployed and the call may be repeated.
    pub fn deploy(&self, constructor_args: &[u8]) -> Result<Deployment, EncodingError> {
        if self.deployment.get().is_some() {
            return Err(EncodingError::AlreadyDeployed);
        }
        let mut deployed_here = false;
        let deployment = self.deployment.get_or_try_init(|| {
            let target = self.hyper_factory.deploy(constructor_args)?;
            let forwarder = self.forwarder_factory.deploy(&[])?;
            deployed_here = true;
            Ok::<_, EncodingError>(Deployment { target, forwarder })
        })?;
        if !deployed_here {
            return Err(EncodingError::AlreadyDeployed);
        }
        info!("Deployed Hyper at {} with forwarder {}", deployment.target, deployment.forwarder);
        Ok(*deployment)
    }

    pub fn deployment(&self) -> Option<&Deployment> {
        self.deployment.get()
    }

    pub fn is_deployed(&self) -> bool {
        self.deployment.get().is_some()
    }

    pub fn batch_limits(&self) -> &BatchLimits {
        &self.batch_limits
    }

    /// Creates a pair, a curve and a pool on top of both in one atomic jump payload.
    pub fn create_pool(
        &self,
        asset: Address,
        quote: Address,
        curve: CurveParameters,
        price: BigUint,
    ) -> Result<Transaction, EncodingError> {
        let batch = InstructionBatch::new()
            .push(Instruction::CreatePair(CreatePair { asset, quote }))
            .push(Instruction::CreateCurve(curve))
            .push(Instruction::CreatePool(CreatePool {
                pair: Reference::InBatch,
                curve: Reference::InBatch,
                price,
            }));
        self.execute(&batch)
    }

    /// Adds an exact amount of liquidity to a tick range of an existing pool.
    pub fn add_liquidity(
        &self,
        pool: PoolId,
        ticks: TickRange,
        amount: BigUint,
    ) -> Result<Transaction, EncodingError> {
        let deployment = self.require_deployment()?;
        let change = LiquidityChange {
            pool: Reference::OnChain(pool),
            ticks,
            amount: AmountDirective::Exact(amount),
        };
        self.forward(deployment, encode_add_liquidity(&change)?)
    }

    pub fn remove_liquidity(
        &self,
        use_max: bool,
        pool: PoolId,
        ticks: TickRange,
        amount: BigUint,
    ) -> Result<Transaction, EncodingError> {
        let deployment = self.require_deployment()?;
        let change = LiquidityChange {
            pool: Reference::OnChain(pool),
            ticks,
            amount: AmountDirective::new(use_max, amount),
        };
        self.forward(deployment, encode_remove_liquidity(&change)?)
    }

    /// Sells the pool's asset for its quote token.
    pub fn swap_asset_to_quote(
        &self,
        use_max: bool,
        pool: PoolId,
        amount: BigUint,
        limit: BigUint,
    ) -> Result<Transaction, EncodingError> {
        self.swap(use_max, pool, amount, limit, SwapDirection::AssetToQuote)
    }

    /// Sells the pool's quote token for its asset.
    pub fn swap_quote_to_asset(
        &self,
        use_max: bool,
        pool: PoolId,
        amount: BigUint,
        limit: BigUint,
    ) -> Result<Transaction, EncodingError> {
        self.swap(use_max, pool, amount, limit, SwapDirection::QuoteToAsset)
    }

    /// Encodes an arbitrary batch into one jump payload and relays it.
    pub fn execute(&self, batch: &InstructionBatch) -> Result<Transaction, EncodingError> {
        let deployment = self.require_deployment()?;
        let encoded = batch.encode(&EncodingContext::current(), &self.batch_limits)?;
        self.forward(deployment, encoded)
    }

    /// Relays a single instruction without a jump wrapper. Batch-local references cannot resolve
    /// here.
    pub fn execute_instruction(
        &self,
        instruction: &Instruction,
    ) -> Result<Transaction, EncodingError> {
        let deployment = self.require_deployment()?;
        validate_references(std::slice::from_ref(instruction))?;
        let encoded = encode_instruction(instruction, &EncodingContext::current())?;
        self.forward(deployment, encoded)
    }

    fn swap(
        &self,
        use_max: bool,
        pool: PoolId,
        amount: BigUint,
        limit: BigUint,
        direction: SwapDirection,
    ) -> Result<Transaction, EncodingError> {
        let deployment = self.require_deployment()?;
        let swap = SwapExactTokens {
            pool: Reference::OnChain(pool),
            amount: AmountDirective::new(use_max, amount),
            limit,
            direction,
        };
        self.forward(deployment, encode_swap_exact_tokens(&swap)?)
    }

    fn require_deployment(&self) -> Result<&Deployment, EncodingError> {
        self.deployment
            .get()
            .ok_or(EncodingError::NotDeployed)
    }

    fn forward(
        &self,
        deployment: &Deployment,
        encoded: EncodedInstruction,
    ) -> Result<Transaction, EncodingError> {
        debug!("Relaying {} through forwarder {}", encoded.hex, deployment.forwarder);
        Ok(encode_relay_transaction(deployment, Payload::from(encoded)))
    }
}
