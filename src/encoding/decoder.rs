//! Reference decoder for the instruction wire format. It mirrors the interpreter's parsing and is
//! the inverse of the instruction encoders.

use num_bigint::BigUint;
use num_traits::Zero;

use crate::encoding::{
    constants::{
        ADDRESS_WIDTH, ADD_LIQUIDITY, AMOUNT_WIDTH, CREATE_CURVE, CREATE_CURVE_LENGTH,
        CREATE_PAIR, CREATE_PAIR_LENGTH, CREATE_POOL, CREATE_POOL_LENGTH, CURVE_ID_WIDTH,
        FEE_WIDTH, JUMP, JUMP_LENGTH_WIDTH, LIQUIDITY_LENGTH, MATURITY_WIDTH, PAIR_ID_WIDTH,
        POOL_ID_WIDTH, REMOVE_LIQUIDITY, SIGMA_WIDTH, SWAP, SWAP_LENGTH, TICK_WIDTH, USE_MAX_FLAG,
    },
    errors::EncodingError,
    models::{
        AmountDirective, CreatePair, CreatePool, CurveId, CurveParameters, Instruction,
        LiquidityChange, PairId, PoolId, Reference, SwapDirection, SwapExactTokens, TickRange,
    },
    utils::{bytes_to_address, fixed_to_tick, fixed_to_uint},
};

/// Sequential reader over the operands of one instruction.
struct OperandReader<'a> {
    data: &'a [u8],
    position: usize,
}

impl<'a> OperandReader<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self { data, position: 0 }
    }

    fn take(&mut self, width: usize) -> Result<&'a [u8], EncodingError> {
        let end = self.position + width;
        let slice = self.data.get(self.position..end).ok_or_else(|| {
            EncodingError::MalformedPayload(format!(
                "expected {} bytes at offset {}, only {} left",
                width,
                self.position,
                self.data.len().saturating_sub(self.position)
            ))
        })?;
        self.position = end;
        Ok(slice)
    }

    fn read_u8(&mut self) -> Result<u8, EncodingError> {
        Ok(self.take(1)?[0])
    }

    fn read_uint(&mut self, width: usize) -> Result<u64, EncodingError> {
        Ok(fixed_to_uint(self.take(width)?))
    }

    fn read_biguint(&mut self, width: usize) -> Result<BigUint, EncodingError> {
        Ok(BigUint::from_bytes_be(self.take(width)?))
    }

    fn read_tick(&mut self) -> Result<i32, EncodingError> {
        let bytes = self.take(TICK_WIDTH)?;
        Ok(fixed_to_tick([bytes[0], bytes[1], bytes[2]]))
    }

    fn read_address(&mut self) -> Result<alloy_primitives::Address, EncodingError> {
        bytes_to_address(self.take(ADDRESS_WIDTH)?)
    }

    fn remaining(&self) -> usize {
        self.data.len() - self.position
    }
}

fn pair_reference(raw: u64) -> Result<Reference<PairId>, EncodingError> {
    if raw == 0 {
        return Ok(Reference::InBatch);
    }
    Ok(Reference::OnChain(PairId::new(raw as u16)?))
}

fn curve_reference(raw: u64) -> Result<Reference<CurveId>, EncodingError> {
    if raw == 0 {
        return Ok(Reference::InBatch);
    }
    Ok(Reference::OnChain(CurveId::new(raw as u32)?))
}

fn pool_reference(raw: u64) -> Result<Reference<PoolId>, EncodingError> {
    if raw == 0 {
        return Ok(Reference::InBatch);
    }
    Ok(Reference::OnChain(PoolId::new(raw)?))
}

fn read_amount(
    reader: &mut OperandReader,
    use_max: bool,
) -> Result<AmountDirective, EncodingError> {
    let amount = reader.read_biguint(AMOUNT_WIDTH)?;
    match (use_max, amount.is_zero()) {
        (true, true) => Ok(AmountDirective::Max),
        (true, false) => Err(EncodingError::MalformedPayload(
            "amount field must be zero when the use max flag is set".to_string(),
        )),
        (false, _) => Ok(AmountDirective::Exact(amount)),
    }
}

/// Decodes one instruction produced by the instruction encoders.
///
/// Fails with `MalformedPayload` on unknown opcodes, length mismatches or illegal flags, and with
/// the matching validation error when an operand is out of its domain.
pub fn decode_instruction(data: &[u8]) -> Result<Instruction, EncodingError> {
    let header = *data
        .first()
        .ok_or_else(|| EncodingError::MalformedPayload("empty instruction".to_string()))?;
    if header == JUMP {
        return Err(EncodingError::MalformedPayload(
            "jump payloads must be decoded with decode_jump_instruction".to_string(),
        ));
    }

    let flag = header >> 4;
    let opcode = header & 0x0F;
    let (expected_length, accepts_flag) = match opcode {
        CREATE_PAIR => (CREATE_PAIR_LENGTH, false),
        CREATE_CURVE => (CREATE_CURVE_LENGTH, false),
        CREATE_POOL => (CREATE_POOL_LENGTH, false),
        ADD_LIQUIDITY | REMOVE_LIQUIDITY => (LIQUIDITY_LENGTH, true),
        SWAP => (SWAP_LENGTH, true),
        other => {
            return Err(EncodingError::MalformedPayload(format!("unknown opcode 0x{:02x}", other)))
        }
    };
    if data.len() != expected_length {
        return Err(EncodingError::MalformedPayload(format!(
            "opcode 0x{:02x} expects {} bytes, got {}",
            opcode,
            expected_length,
            data.len()
        )));
    }
    if flag > USE_MAX_FLAG || (flag != 0 && !accepts_flag) {
        return Err(EncodingError::MalformedPayload(format!(
            "illegal flag 0x{:x} for opcode 0x{:02x}",
            flag, opcode
        )));
    }
    let use_max = flag == USE_MAX_FLAG;

    let mut reader = OperandReader::new(&data[1..]);
    let instruction = match opcode {
        CREATE_PAIR => Instruction::CreatePair(CreatePair {
            asset: reader.read_address()?,
            quote: reader.read_address()?,
        }),
        CREATE_CURVE => Instruction::CreateCurve(CurveParameters {
            strike: reader.read_biguint(AMOUNT_WIDTH)?,
            sigma: reader.read_uint(SIGMA_WIDTH)? as u32,
            maturity: reader.read_uint(MATURITY_WIDTH)? as u32,
            fee: reader.read_uint(FEE_WIDTH)? as u16,
        }),
        CREATE_POOL => Instruction::CreatePool(CreatePool {
            pair: pair_reference(reader.read_uint(PAIR_ID_WIDTH)?)?,
            curve: curve_reference(reader.read_uint(CURVE_ID_WIDTH)?)?,
            price: reader.read_biguint(AMOUNT_WIDTH)?,
        }),
        ADD_LIQUIDITY | REMOVE_LIQUIDITY => {
            let pool = pool_reference(reader.read_uint(POOL_ID_WIDTH)?)?;
            let ticks = TickRange::new(reader.read_tick()?, reader.read_tick()?)?;
            let amount = read_amount(&mut reader, use_max)?;
            let change = LiquidityChange { pool, ticks, amount };
            if opcode == ADD_LIQUIDITY {
                Instruction::AddLiquidity(change)
            } else {
                Instruction::RemoveLiquidity(change)
            }
        }
        _ => Instruction::Swap(SwapExactTokens {
            pool: pool_reference(reader.read_uint(POOL_ID_WIDTH)?)?,
            amount: read_amount(&mut reader, use_max)?,
            limit: reader.read_biguint(AMOUNT_WIDTH)?,
            direction: SwapDirection::try_from(reader.read_u8()?)?,
        }),
    };
    debug_assert_eq!(reader.remaining(), 0);
    Ok(instruction)
}

/// Splits a jump payload into its raw instruction segments, in payload order.
///
/// Layout: `0xAA | count(1) | { length(2) | segment }*`
pub fn split_jump_instruction(data: &[u8]) -> Result<Vec<&[u8]>, EncodingError> {
    let mut reader = OperandReader::new(data);
    if reader.read_u8()? != JUMP {
        return Err(EncodingError::MalformedPayload(
            "payload is not a jump instruction".to_string(),
        ));
    }
    let count = reader.read_u8()? as usize;
    if count == 0 {
        return Err(EncodingError::MalformedPayload("jump declares no instructions".to_string()));
    }

    let mut segments = Vec::with_capacity(count);
    for _ in 0..count {
        let length = reader.read_uint(JUMP_LENGTH_WIDTH)? as usize;
        segments.push(reader.take(length)?);
    }
    if reader.remaining() != 0 {
        return Err(EncodingError::MalformedPayload(format!(
            "{} trailing bytes after the last instruction",
            reader.remaining()
        )));
    }
    Ok(segments)
}

/// Decodes every instruction of a jump payload, preserving order.
pub fn decode_jump_instruction(data: &[u8]) -> Result<Vec<Instruction>, EncodingError> {
    split_jump_instruction(data)?
        .into_iter()
        .map(decode_instruction)
        .collect()
}

/// Decodes either a single instruction or a jump payload.
pub fn decode_payload(data: &[u8]) -> Result<Vec<Instruction>, EncodingError> {
    match data.first() {
        Some(&JUMP) => decode_jump_instruction(data),
        _ => Ok(vec![decode_instruction(data)?]),
    }
}
