use alloy_primitives::{Address, Bytes};
use chrono::Utc;
use num_bigint::BigUint;
use num_traits::Zero;
use serde::{Deserialize, Serialize};

use crate::encoding::{
    constants::{
        ADD_LIQUIDITY, CREATE_CURVE, CREATE_PAIR, CREATE_POOL, MAX_FEE, MAX_POOL_ID, MAX_SIGMA,
        MAX_TICK, MIN_FEE, MIN_SIGMA, MIN_TICK, REMOVE_LIQUIDITY, SWAP,
    },
    errors::EncodingError,
    serde_primitives::biguint_string,
};

/// Identifier of a token pair registered on the Hyper contract.
///
/// Id 0 is reserved on the wire for "the pair created earlier in this batch", so it is never a
/// valid on-chain id.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u16", into = "u16")]
pub struct PairId(u16);

impl PairId {
    pub fn new(id: u16) -> Result<Self, EncodingError> {
        if id == 0 {
            return Err(EncodingError::UnknownReference(
                "pair id 0 is reserved for pairs created in the same batch".to_string(),
            ));
        }
        Ok(Self(id))
    }

    pub fn get(&self) -> u16 {
        self.0
    }
}

impl TryFrom<u16> for PairId {
    type Error = EncodingError;

    fn try_from(id: u16) -> Result<Self, Self::Error> {
        Self::new(id)
    }
}

impl From<PairId> for u16 {
    fn from(id: PairId) -> Self {
        id.0
    }
}

impl From<PairId> for u64 {
    fn from(id: PairId) -> Self {
        id.0 as u64
    }
}

/// Identifier of a curve registered on the Hyper contract. Id 0 is reserved like for `PairId`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct CurveId(u32);

impl CurveId {
    pub fn new(id: u32) -> Result<Self, EncodingError> {
        if id == 0 {
            return Err(EncodingError::UnknownReference(
                "curve id 0 is reserved for curves created in the same batch".to_string(),
            ));
        }
        Ok(Self(id))
    }

    pub fn get(&self) -> u32 {
        self.0
    }
}

impl TryFrom<u32> for CurveId {
    type Error = EncodingError;

    fn try_from(id: u32) -> Result<Self, Self::Error> {
        Self::new(id)
    }
}

impl From<CurveId> for u32 {
    fn from(id: CurveId) -> Self {
        id.0
    }
}

impl From<CurveId> for u64 {
    fn from(id: CurveId) -> Self {
        id.0 as u64
    }
}

/// Identifier of a pool: the pair id in the upper 16 bits and the curve id in the lower 32 bits
/// of a 48 bit word.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u64", into = "u64")]
pub struct PoolId(u64);

impl PoolId {
    pub fn new(id: u64) -> Result<Self, EncodingError> {
        if id > MAX_POOL_ID {
            return Err(EncodingError::OperandOutOfRange { field: "pool_id", bits: 48 });
        }
        if id == 0 {
            return Err(EncodingError::UnknownReference(
                "pool id 0 is reserved for pools created in the same batch".to_string(),
            ));
        }
        Ok(Self(id))
    }

    pub fn from_parts(pair: PairId, curve: CurveId) -> Self {
        Self(((pair.get() as u64) << 32) | curve.get() as u64)
    }

    pub fn get(&self) -> u64 {
        self.0
    }

    pub fn pair_id(&self) -> u16 {
        (self.0 >> 32) as u16
    }

    pub fn curve_id(&self) -> u32 {
        self.0 as u32
    }
}

impl TryFrom<u64> for PoolId {
    type Error = EncodingError;

    fn try_from(id: u64) -> Result<Self, Self::Error> {
        Self::new(id)
    }
}

impl From<PoolId> for u64 {
    fn from(id: PoolId) -> Self {
        id.0
    }
}

/// Points either at an entity that already exists on chain or at the most recent entity of the
/// same kind created earlier in the same batch.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Reference<T> {
    InBatch,
    OnChain(T),
}

impl<T: Copy + Into<u64>> Reference<T> {
    /// The value written on the wire: 0 for a batch-local reference, the id otherwise.
    pub fn raw(&self) -> u64 {
        match self {
            Reference::InBatch => 0,
            Reference::OnChain(id) => (*id).into(),
        }
    }
}

impl<T> Reference<T> {
    pub fn is_in_batch(&self) -> bool {
        matches!(self, Reference::InBatch)
    }
}

impl From<PairId> for Reference<PairId> {
    fn from(id: PairId) -> Self {
        Reference::OnChain(id)
    }
}

impl From<CurveId> for Reference<CurveId> {
    fn from(id: CurveId) -> Self {
        Reference::OnChain(id)
    }
}

impl From<PoolId> for Reference<PoolId> {
    fn from(id: PoolId) -> Self {
        Reference::OnChain(id)
    }
}

/// A liquidity position's price interval. Only constructible with `lo < hi`, both within
/// `[MIN_TICK, MAX_TICK]`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawTickRange")]
pub struct TickRange {
    lo: i32,
    hi: i32,
}

#[derive(Deserialize)]
struct RawTickRange {
    lo: i32,
    hi: i32,
}

impl TryFrom<RawTickRange> for TickRange {
    type Error = EncodingError;

    fn try_from(raw: RawTickRange) -> Result<Self, Self::Error> {
        Self::new(raw.lo, raw.hi)
    }
}

impl TickRange {
    pub fn new(lo: i32, hi: i32) -> Result<Self, EncodingError> {
        if lo >= hi || lo < MIN_TICK || hi > MAX_TICK {
            return Err(EncodingError::InvalidTickRange { lo, hi });
        }
        Ok(Self { lo, hi })
    }

    pub fn lo(&self) -> i32 {
        self.lo
    }

    pub fn hi(&self) -> i32 {
        self.hi
    }
}

/// How much of a token an instruction should move.
///
/// `Max` asks the interpreter to use the caller's full available balance; the amount field is
/// then written as zeros.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawAmountDirective", into = "RawAmountDirective")]
pub enum AmountDirective {
    Exact(BigUint),
    Max,
}

#[derive(Serialize, Deserialize)]
struct RawAmountDirective {
    #[serde(default)]
    use_max: bool,
    #[serde(default, with = "biguint_string")]
    amount: BigUint,
}

impl From<RawAmountDirective> for AmountDirective {
    fn from(raw: RawAmountDirective) -> Self {
        AmountDirective::new(raw.use_max, raw.amount)
    }
}

impl From<AmountDirective> for RawAmountDirective {
    fn from(directive: AmountDirective) -> Self {
        match directive {
            AmountDirective::Exact(amount) => RawAmountDirective { use_max: false, amount },
            AmountDirective::Max => RawAmountDirective { use_max: true, amount: BigUint::zero() },
        }
    }
}

impl AmountDirective {
    /// Builds a directive from the loose `(use_max, amount)` pair. The amount is dropped when
    /// `use_max` is set.
    pub fn new(use_max: bool, amount: BigUint) -> Self {
        if use_max {
            AmountDirective::Max
        } else {
            AmountDirective::Exact(amount)
        }
    }

    pub fn use_max(&self) -> bool {
        matches!(self, AmountDirective::Max)
    }

    pub fn amount(&self) -> Option<&BigUint> {
        match self {
            AmountDirective::Exact(amount) => Some(amount),
            AmountDirective::Max => None,
        }
    }
}

/// Which asset of the pool is sold.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
#[repr(u8)]
pub enum SwapDirection {
    AssetToQuote = 0,
    QuoteToAsset = 1,
}

impl TryFrom<u8> for SwapDirection {
    type Error = EncodingError;

    fn try_from(direction: u8) -> Result<Self, Self::Error> {
        match direction {
            0 => Ok(SwapDirection::AssetToQuote),
            1 => Ok(SwapDirection::QuoteToAsset),
            other => Err(EncodingError::InvalidDirection(other)),
        }
    }
}

impl From<SwapDirection> for u8 {
    fn from(direction: SwapDirection) -> Self {
        direction as u8
    }
}

/// Parameters of a Hyper curve.
///
/// # Fields
/// * `strike` - Strike price, a 128 bit fixed point value.
/// * `sigma` - Implied volatility in basis points, 24 bits.
/// * `maturity` - Unix timestamp (seconds) at which the curve expires.
/// * `fee` - Swap fee in basis points.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurveParameters {
    #[serde(with = "biguint_string")]
    pub strike: BigUint,
    pub sigma: u32,
    pub maturity: u32,
    pub fee: u16,
}

impl CurveParameters {
    pub fn new(strike: BigUint, sigma: u32, maturity: u32, fee: u16) -> Self {
        Self { strike, sigma, maturity, fee }
    }

    /// Raises an `InvalidCurveParameters` error unless all of the following hold:
    /// * The strike is positive.
    /// * `MIN_SIGMA <= sigma <= MAX_SIGMA`.
    /// * The maturity is strictly after `now`.
    /// * `MIN_FEE <= fee <= MAX_FEE`.
    pub fn validate(&self, now: u64) -> Result<(), EncodingError> {
        if self.strike.is_zero() {
            return Err(EncodingError::InvalidCurveParameters(
                "strike must be positive".to_string(),
            ));
        }
        if !(MIN_SIGMA..=MAX_SIGMA).contains(&self.sigma) {
            return Err(EncodingError::InvalidCurveParameters(format!(
                "sigma {} outside [{}, {}]",
                self.sigma, MIN_SIGMA, MAX_SIGMA
            )));
        }
        if (self.maturity as u64) <= now {
            return Err(EncodingError::InvalidCurveParameters(format!(
                "maturity {} has already elapsed at {}",
                self.maturity, now
            )));
        }
        if !(MIN_FEE..=MAX_FEE).contains(&self.fee) {
            return Err(EncodingError::InvalidCurveParameters(format!(
                "fee {} outside [{}, {}]",
                self.fee, MIN_FEE, MAX_FEE
            )));
        }
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatePair {
    pub asset: Address,
    pub quote: Address,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatePool {
    pub pair: Reference<PairId>,
    pub curve: Reference<CurveId>,
    /// Initial price of the pool, 128 bits.
    #[serde(with = "biguint_string")]
    pub price: BigUint,
}

/// Adds liquidity to, or removes it from, a tick range of a pool.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LiquidityChange {
    pub pool: Reference<PoolId>,
    pub ticks: TickRange,
    pub amount: AmountDirective,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwapExactTokens {
    pub pool: Reference<PoolId>,
    pub amount: AmountDirective,
    /// Slippage limit. Must be positive unless the full balance is swapped.
    #[serde(with = "biguint_string")]
    pub limit: BigUint,
    pub direction: SwapDirection,
}

/// A single operation understood by the Hyper interpreter. The byte layout of each variant is
/// fixed by its opcode.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Instruction {
    CreatePair(CreatePair),
    CreateCurve(CurveParameters),
    CreatePool(CreatePool),
    AddLiquidity(LiquidityChange),
    RemoveLiquidity(LiquidityChange),
    Swap(SwapExactTokens),
}

impl Instruction {
    pub fn opcode(&self) -> u8 {
        match self {
            Instruction::CreatePair(_) => CREATE_PAIR,
            Instruction::CreateCurve(_) => CREATE_CURVE,
            Instruction::CreatePool(_) => CREATE_POOL,
            Instruction::AddLiquidity(_) => ADD_LIQUIDITY,
            Instruction::RemoveLiquidity(_) => REMOVE_LIQUIDITY,
            Instruction::Swap(_) => SWAP,
        }
    }
}

/// An encoded instruction (or jump payload) together with its `0x` prefixed hex form.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EncodedInstruction {
    pub bytes: Vec<u8>,
    pub hex: String,
}

impl From<Vec<u8>> for EncodedInstruction {
    fn from(bytes: Vec<u8>) -> Self {
        let hex = format!("0x{}", hex::encode(&bytes));
        Self { bytes, hex }
    }
}

/// The final byte string handed to the relay call. Immutable once built.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Payload(Bytes);

impl Payload {
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(&self.0))
    }

    pub fn into_bytes(self) -> Bytes {
        self.0
    }
}

impl From<EncodedInstruction> for Payload {
    fn from(encoded: EncodedInstruction) -> Self {
        Self(Bytes::from(encoded.bytes))
    }
}

/// Addresses of the deployed Hyper contract (the relay target) and of the forwarder.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deployment {
    pub target: Address,
    pub forwarder: Address,
}

/// Values that instruction encoding depends on besides the instruction itself.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EncodingContext {
    /// Unix timestamp (seconds) curve maturities are checked against.
    pub now: u64,
}

impl EncodingContext {
    pub fn at(now: u64) -> Self {
        Self { now }
    }

    pub fn current() -> Self {
        Self { now: Utc::now().timestamp().max(0) as u64 }
    }
}

#[derive(Clone, Debug)]
pub struct Transaction {
    // Address of the contract to call with the calldata
    pub to: Address,
    // ETH value to be sent with the transaction.
    pub value: BigUint,
    // Encoded calldata for the transaction.
    pub data: Vec<u8>,
}
