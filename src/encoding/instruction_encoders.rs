use alloy_primitives::FixedBytes;
use alloy_sol_types::SolValue;
use num_traits::Zero;
use tracing::debug;

use crate::encoding::{
    constants::{
        ADD_LIQUIDITY, CREATE_CURVE, CREATE_PAIR, CREATE_POOL, CURVE_ID_WIDTH, PAIR_ID_WIDTH,
        POOL_ID_WIDTH, REMOVE_LIQUIDITY, SIGMA_WIDTH, SWAP, USE_MAX_FLAG,
    },
    errors::EncodingError,
    models::{
        AmountDirective, CreatePair, CreatePool, CurveParameters, EncodedInstruction,
        EncodingContext, Instruction, LiquidityChange, SwapExactTokens,
    },
    utils::{biguint_to_u128, tick_to_fixed, uint_to_fixed},
};

/// Packs the flag nibble and the opcode into the leading byte of an instruction.
fn header(opcode: u8, use_max: bool) -> FixedBytes<1> {
    let flag = if use_max { USE_MAX_FLAG } else { 0 };
    FixedBytes::from([(flag << 4) | opcode])
}

/// Returns the amount field of a directive. `Max` is written as zero; an exact amount must be
/// positive.
fn directive_amount(amount: &AmountDirective) -> Result<u128, EncodingError> {
    match amount {
        AmountDirective::Max => Ok(0),
        AmountDirective::Exact(value) if value.is_zero() => Err(EncodingError::InvalidInput(
            "exact amount must be positive, use the maximum amount directive instead".to_string(),
        )),
        AmountDirective::Exact(value) => biguint_to_u128(value, "amount"),
    }
}

/// Encodes the creation of a token pair.
///
/// Layout: `header(1) | asset(20) | quote(20)`
pub fn encode_create_pair(pair: &CreatePair) -> Result<EncodedInstruction, EncodingError> {
    if pair.asset.is_zero() || pair.quote.is_zero() {
        return Err(EncodingError::InvalidAddress(
            "pair tokens cannot be the zero address".to_string(),
        ));
    }
    if pair.asset == pair.quote {
        return Err(EncodingError::InvalidAddress(format!(
            "asset and quote must differ, both are {}",
            pair.asset
        )));
    }

    let args = (header(CREATE_PAIR, false), pair.asset, pair.quote);
    let encoded: EncodedInstruction = args.abi_encode_packed().into();
    debug!("Encoded create pair {} / {}: {}", pair.asset, pair.quote, encoded.hex);
    Ok(encoded)
}

/// Encodes the creation of a curve. The maturity is checked against `context.now`.
///
/// Layout: `header(1) | strike(16) | sigma(3) | maturity(4) | fee(2)`
pub fn encode_create_curve(
    curve: &CurveParameters,
    context: &EncodingContext,
) -> Result<EncodedInstruction, EncodingError> {
    curve.validate(context.now)?;

    let args = (
        header(CREATE_CURVE, false),
        biguint_to_u128(&curve.strike, "strike")?,
        uint_to_fixed::<SIGMA_WIDTH>(curve.sigma as u64, "sigma")?,
        curve.maturity,
        curve.fee,
    );
    let encoded: EncodedInstruction = args.abi_encode_packed().into();
    debug!("Encoded create curve {:?}: {}", curve, encoded.hex);
    Ok(encoded)
}

/// Encodes the creation of a pool for a pair and a curve. References are only checked for local
/// well-formedness here; batch-local references are resolved by the batch.
///
/// Layout: `header(1) | pair(2) | curve(4) | price(16)`
pub fn encode_create_pool(pool: &CreatePool) -> Result<EncodedInstruction, EncodingError> {
    if pool.price.is_zero() {
        return Err(EncodingError::InvalidInput("initial pool price must be positive".to_string()));
    }

    let args = (
        header(CREATE_POOL, false),
        uint_to_fixed::<PAIR_ID_WIDTH>(pool.pair.raw(), "pair_id")?,
        uint_to_fixed::<CURVE_ID_WIDTH>(pool.curve.raw(), "curve_id")?,
        biguint_to_u128(&pool.price, "price")?,
    );
    let encoded: EncodedInstruction = args.abi_encode_packed().into();
    debug!("Encoded create pool {:?}: {}", pool, encoded.hex);
    Ok(encoded)
}

/// Layout: `header(1) | pool(6) | lo(3) | hi(3) | amount(16)`
fn encode_liquidity(
    opcode: u8,
    change: &LiquidityChange,
) -> Result<EncodedInstruction, EncodingError> {
    let args = (
        header(opcode, change.amount.use_max()),
        uint_to_fixed::<POOL_ID_WIDTH>(change.pool.raw(), "pool_id")?,
        tick_to_fixed(change.ticks.lo()),
        tick_to_fixed(change.ticks.hi()),
        directive_amount(&change.amount)?,
    );
    Ok(args.abi_encode_packed().into())
}

pub fn encode_add_liquidity(change: &LiquidityChange) -> Result<EncodedInstruction, EncodingError> {
    let encoded = encode_liquidity(ADD_LIQUIDITY, change)?;
    debug!("Encoded add liquidity {:?}: {}", change, encoded.hex);
    Ok(encoded)
}

pub fn encode_remove_liquidity(
    change: &LiquidityChange,
) -> Result<EncodedInstruction, EncodingError> {
    let encoded = encode_liquidity(REMOVE_LIQUIDITY, change)?;
    debug!("Encoded remove liquidity {:?}: {}", change, encoded.hex);
    Ok(encoded)
}

/// Encodes an exact input swap.
///
/// Layout: `header(1) | pool(6) | amount(16) | limit(16) | direction(1)`
pub fn encode_swap_exact_tokens(
    swap: &SwapExactTokens,
) -> Result<EncodedInstruction, EncodingError> {
    if swap.limit.is_zero() && !swap.amount.use_max() {
        return Err(EncodingError::InvalidLimit);
    }

    let args = (
        header(SWAP, swap.amount.use_max()),
        uint_to_fixed::<POOL_ID_WIDTH>(swap.pool.raw(), "pool_id")?,
        directive_amount(&swap.amount)?,
        biguint_to_u128(&swap.limit, "limit")?,
        FixedBytes::<1>::from([u8::from(swap.direction)]),
    );
    let encoded: EncodedInstruction = args.abi_encode_packed().into();
    debug!("Encoded swap {:?}: {}", swap, encoded.hex);
    Ok(encoded)
}

/// Encodes any instruction with the encoder matching its opcode.
pub fn encode_instruction(
    instruction: &Instruction,
    context: &EncodingContext,
) -> Result<EncodedInstruction, EncodingError> {
    match instruction {
        Instruction::CreatePair(pair) => encode_create_pair(pair),
        Instruction::CreateCurve(curve) => encode_create_curve(curve, context),
        Instruction::CreatePool(pool) => encode_create_pool(pool),
        Instruction::AddLiquidity(change) => encode_add_liquidity(change),
        Instruction::RemoveLiquidity(change) => encode_remove_liquidity(change),
        Instruction::Swap(swap) => encode_swap_exact_tokens(swap),
    }
}

#[cfg(test)]
mod tests {
    use alloy_primitives::Address;
    use num_bigint::BigUint;
    use rstest::rstest;

    use super::*;
    use crate::encoding::{
        constants::{
            CREATE_CURVE_LENGTH, CREATE_PAIR_LENGTH, CREATE_POOL_LENGTH, LIQUIDITY_LENGTH,
            MAX_FEE, SWAP_LENGTH,
        },
        models::{CurveId, PairId, PoolId, Reference, SwapDirection, TickRange},
        utils::{parse_address, scale_amount},
    };

    fn weth() -> Address {
        parse_address("0xc02aaa39b223fe8d0a0e5c4f27ead9083c756cc2").unwrap()
    }

    fn dai() -> Address {
        parse_address("0x6b175474e89094c44da98b954eedeac495271d0f").unwrap()
    }

    fn context() -> EncodingContext {
        EncodingContext::at(1_700_000_000)
    }

    fn pool_id() -> PoolId {
        PoolId::from_parts(PairId::new(1).unwrap(), CurveId::new(2).unwrap())
    }

    fn swap(amount: AmountDirective, limit: u64, direction: SwapDirection) -> SwapExactTokens {
        SwapExactTokens {
            pool: Reference::OnChain(pool_id()),
            amount,
            limit: BigUint::from(limit),
            direction,
        }
    }

    #[test]
    fn test_encode_create_pair() {
        let encoded = encode_create_pair(&CreatePair { asset: weth(), quote: dai() }).unwrap();
        assert_eq!(encoded.bytes.len(), CREATE_PAIR_LENGTH);
        assert_eq!(
            encoded.hex,
            String::from(concat!(
                "0x",
                // opcode
                "0c",
                // asset
                "c02aaa39b223fe8d0a0e5c4f27ead9083c756cc2",
                // quote
                "6b175474e89094c44da98b954eedeac495271d0f",
            ))
        );
    }

    #[rstest]
    #[case::same_token(weth(), weth())]
    #[case::zero_asset(Address::ZERO, dai())]
    #[case::zero_quote(weth(), Address::ZERO)]
    fn test_encode_create_pair_invalid(#[case] asset: Address, #[case] quote: Address) {
        let result = encode_create_pair(&CreatePair { asset, quote });
        assert!(matches!(result, Err(EncodingError::InvalidAddress(_))));
    }

    #[test]
    fn test_encode_create_curve() {
        let curve = CurveParameters::new(scale_amount(1, 18), 10_000, 1_800_000_000, 30);
        let encoded = encode_create_curve(&curve, &context()).unwrap();
        assert_eq!(encoded.bytes.len(), CREATE_CURVE_LENGTH);
        assert_eq!(
            hex::encode(&encoded.bytes),
            String::from(concat!(
                // opcode
                "0d",
                // strike, 1e18
                "00000000000000000de0b6b3a7640000",
                // sigma
                "002710",
                // maturity
                "6b49d200",
                // fee
                "001e",
            ))
        );
    }

    #[test]
    fn test_encode_create_curve_invalid() {
        let elapsed = CurveParameters::new(scale_amount(1, 18), 10_000, 1_600_000_000, 30);
        assert!(matches!(
            encode_create_curve(&elapsed, &context()),
            Err(EncodingError::InvalidCurveParameters(_))
        ));
        let expensive =
            CurveParameters::new(scale_amount(1, 18), 10_000, 1_800_000_000, MAX_FEE + 1);
        assert!(matches!(
            encode_create_curve(&expensive, &context()),
            Err(EncodingError::InvalidCurveParameters(_))
        ));
        let huge_strike =
            CurveParameters::new(BigUint::from(u128::MAX) + 1u32, 10_000, 1_800_000_000, 30);
        assert_eq!(
            encode_create_curve(&huge_strike, &context()),
            Err(EncodingError::OperandOutOfRange { field: "strike", bits: 128 })
        );
    }

    #[test]
    fn test_encode_create_pool() {
        let pool = CreatePool {
            pair: Reference::InBatch,
            curve: Reference::OnChain(CurveId::new(0x0102_0304).unwrap()),
            price: BigUint::from(1_000u32),
        };
        let encoded = encode_create_pool(&pool).unwrap();
        assert_eq!(encoded.bytes.len(), CREATE_POOL_LENGTH);
        assert_eq!(
            hex::encode(&encoded.bytes),
            String::from(concat!(
                // opcode
                "0b",
                // pair, batch-local
                "0000",
                // curve
                "01020304",
                // price
                "000000000000000000000000000003e8",
            ))
        );
    }

    #[test]
    fn test_encode_create_pool_zero_price() {
        let pool = CreatePool {
            pair: Reference::InBatch,
            curve: Reference::InBatch,
            price: BigUint::zero(),
        };
        assert!(matches!(encode_create_pool(&pool), Err(EncodingError::InvalidInput(_))));
    }

    #[test]
    fn test_encode_add_liquidity() {
        let change = LiquidityChange {
            pool: Reference::OnChain(pool_id()),
            ticks: TickRange::new(-100, 100).unwrap(),
            amount: AmountDirective::Exact(BigUint::from(255u32)),
        };
        let encoded = encode_add_liquidity(&change).unwrap();
        assert_eq!(encoded.bytes.len(), LIQUIDITY_LENGTH);
        assert_eq!(
            hex::encode(&encoded.bytes),
            String::from(concat!(
                // opcode
                "01",
                // pool
                "000100000002",
                // lo tick
                "ffff9c",
                // hi tick
                "000064",
                // amount
                "000000000000000000000000000000ff",
            ))
        );
    }

    #[test]
    fn test_encode_remove_liquidity_use_max() {
        let change = LiquidityChange {
            pool: Reference::OnChain(pool_id()),
            ticks: TickRange::new(100, 101).unwrap(),
            amount: AmountDirective::Max,
        };
        let encoded = encode_remove_liquidity(&change).unwrap();
        assert_eq!(encoded.bytes[0], 0x13);
        assert!(encoded.bytes[13..].iter().all(|b| *b == 0));
    }

    #[test]
    fn test_use_max_ignores_amount() {
        let with_amount = swap(
            AmountDirective::new(true, BigUint::from(12345u32)),
            0,
            SwapDirection::AssetToQuote,
        );
        let without_amount =
            swap(AmountDirective::new(true, BigUint::zero()), 0, SwapDirection::AssetToQuote);
        assert_eq!(
            encode_swap_exact_tokens(&with_amount).unwrap(),
            encode_swap_exact_tokens(&without_amount).unwrap()
        );
    }

    #[test]
    fn test_encode_swap_exact_tokens() {
        let encoded = encode_swap_exact_tokens(&swap(
            AmountDirective::Exact(BigUint::from(16u32)),
            1,
            SwapDirection::QuoteToAsset,
        ))
        .unwrap();
        assert_eq!(encoded.bytes.len(), SWAP_LENGTH);
        assert_eq!(
            hex::encode(&encoded.bytes),
            String::from(concat!(
                // opcode
                "05",
                // pool
                "000100000002",
                // amount
                "00000000000000000000000000000010",
                // limit
                "00000000000000000000000000000001",
                // direction
                "01",
            ))
        );
    }

    #[test]
    fn test_swap_directions_differ_only_in_direction_byte() {
        let amount = AmountDirective::Exact(BigUint::from(1_000u32));
        let zero = encode_swap_exact_tokens(&swap(amount.clone(), 5, SwapDirection::AssetToQuote))
            .unwrap()
            .bytes;
        let one = encode_swap_exact_tokens(&swap(amount, 5, SwapDirection::QuoteToAsset))
            .unwrap()
            .bytes;
        let differing: Vec<usize> = (0..zero.len())
            .filter(|i| zero[*i] != one[*i])
            .collect();
        assert_eq!(differing, vec![SWAP_LENGTH - 1]);
        assert_eq!(zero[SWAP_LENGTH - 1] ^ one[SWAP_LENGTH - 1], 0x01);
    }

    #[test]
    fn test_swap_direction_two_is_rejected() {
        assert_eq!(SwapDirection::try_from(2u8), Err(EncodingError::InvalidDirection(2)));
    }

    #[rstest]
    #[case::zero_limit_exact(
        AmountDirective::Exact(BigUint::from(10u32)),
        0,
        Err(EncodingError::InvalidLimit)
    )]
    #[case::zero_limit_max(AmountDirective::Max, 0, Ok(()))]
    #[case::positive_limit(AmountDirective::Exact(BigUint::from(10u32)), 1, Ok(()))]
    fn test_swap_limit(
        #[case] amount: AmountDirective,
        #[case] limit: u64,
        #[case] expected: Result<(), EncodingError>,
    ) {
        let result = encode_swap_exact_tokens(&swap(amount, limit, SwapDirection::AssetToQuote))
            .map(|_| ());
        assert_eq!(result, expected);
    }

    #[test]
    fn test_amount_out_of_range() {
        let too_wide = AmountDirective::Exact(BigUint::from(u128::MAX) + 1u32);
        assert_eq!(
            encode_swap_exact_tokens(&swap(too_wide, 1, SwapDirection::AssetToQuote)),
            Err(EncodingError::OperandOutOfRange { field: "amount", bits: 128 })
        );
    }

    #[test]
    fn test_zero_exact_amount_rejected() {
        let change = LiquidityChange {
            pool: Reference::OnChain(pool_id()),
            ticks: TickRange::new(0, 10).unwrap(),
            amount: AmountDirective::Exact(BigUint::zero()),
        };
        assert!(matches!(encode_add_liquidity(&change), Err(EncodingError::InvalidInput(_))));
    }

    #[test]
    fn test_encoding_is_deterministic() {
        let instruction = Instruction::CreateCurve(CurveParameters::new(
            BigUint::from(5u32),
            100,
            1_800_000_000,
            5,
        ));
        assert_eq!(
            encode_instruction(&instruction, &context()).unwrap(),
            encode_instruction(&instruction, &context()).unwrap()
        );
    }

    #[test]
    fn test_header_byte() {
        assert_eq!(header(SWAP, false).0, [0x05]);
        assert_eq!(header(REMOVE_LIQUIDITY, true).0, [0x13]);
    }

    #[test]
    fn test_every_encoder_leads_with_its_opcode() {
        let pool = Reference::OnChain(pool_id());
        let ticks = TickRange::new(-1, 1).unwrap();
        let instructions = vec![
            Instruction::CreatePair(CreatePair { asset: weth(), quote: dai() }),
            Instruction::CreateCurve(CurveParameters::new(
                scale_amount(1, 18),
                1,
                1_800_000_000,
                1,
            )),
            Instruction::CreatePool(CreatePool {
                pair: Reference::InBatch,
                curve: Reference::InBatch,
                price: BigUint::from(1u32),
            }),
            Instruction::AddLiquidity(LiquidityChange {
                pool,
                ticks,
                amount: AmountDirective::Exact(BigUint::from(1u32)),
            }),
            Instruction::RemoveLiquidity(LiquidityChange {
                pool,
                ticks,
                amount: AmountDirective::Exact(BigUint::from(1u32)),
            }),
            Instruction::Swap(swap(
                AmountDirective::Exact(BigUint::from(1u32)),
                1,
                SwapDirection::AssetToQuote,
            )),
        ];
        let lengths = [
            CREATE_PAIR_LENGTH,
            CREATE_CURVE_LENGTH,
            CREATE_POOL_LENGTH,
            LIQUIDITY_LENGTH,
            LIQUIDITY_LENGTH,
            SWAP_LENGTH,
        ];
        for (instruction, length) in instructions.iter().zip(lengths) {
            let encoded = encode_instruction(instruction, &context()).unwrap();
            assert_eq!(encoded.bytes[0], instruction.opcode());
            assert_eq!(encoded.bytes.len(), length);
        }
    }
}
