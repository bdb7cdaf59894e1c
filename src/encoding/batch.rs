use std::fs;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::encoding::{
    constants::{DEFAULT_BATCH_LIMITS_JSON, JUMP, JUMP_LENGTH_WIDTH, MAX_JUMP_INSTRUCTIONS},
    errors::EncodingError,
    instruction_encoders::encode_instruction,
    models::{EncodedInstruction, EncodingContext, Instruction, LiquidityChange, SwapExactTokens},
};

/// Upper bounds the interpreter imposes on a jump payload.
///
/// # Fields
/// * `max_instructions` - Maximum number of instructions in one jump, at most 255.
/// * `max_payload_bytes` - Maximum length of the whole jump payload, header included.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawBatchLimits")]
pub struct BatchLimits {
    max_instructions: usize,
    max_payload_bytes: usize,
}

#[derive(Deserialize)]
struct RawBatchLimits {
    max_instructions: usize,
    max_payload_bytes: usize,
}

impl TryFrom<RawBatchLimits> for BatchLimits {
    type Error = EncodingError;

    fn try_from(raw: RawBatchLimits) -> Result<Self, Self::Error> {
        Self::new(raw.max_instructions, raw.max_payload_bytes)
    }
}

impl BatchLimits {
    pub fn new(max_instructions: usize, max_payload_bytes: usize) -> Result<Self, EncodingError> {
        if max_instructions == 0 || max_instructions > MAX_JUMP_INSTRUCTIONS {
            return Err(EncodingError::FatalError(format!(
                "max_instructions must be within [1, {}], got {}",
                MAX_JUMP_INSTRUCTIONS, max_instructions
            )));
        }
        if max_payload_bytes == 0 {
            return Err(EncodingError::FatalError(
                "max_payload_bytes must be positive".to_string(),
            ));
        }
        Ok(Self { max_instructions, max_payload_bytes })
    }

    pub fn max_instructions(&self) -> usize {
        self.max_instructions
    }

    pub fn max_payload_bytes(&self) -> usize {
        self.max_payload_bytes
    }

    /// Loads the limits from the JSON file at the given path, or from the bundled
    /// `config/batch_limits.json` if no path is given.
    pub fn from_file(limits_file_path: Option<String>) -> Result<Self, EncodingError> {
        let config_str = if let Some(ref path) = limits_file_path {
            fs::read_to_string(path).map_err(|e| {
                EncodingError::FatalError(format!(
                    "Error reading batch limits file from {:?}: {}",
                    limits_file_path, e
                ))
            })?
        } else {
            DEFAULT_BATCH_LIMITS_JSON.to_string()
        };
        Ok(serde_json::from_str(&config_str)?)
    }
}

/// Combines already encoded instructions into a single jump payload.
///
/// Segments are written in the given order, each prefixed with its length as a big-endian u16,
/// after the jump opcode and the segment count. Nothing is reordered, deduplicated or merged:
/// later instructions may rely on entities created by earlier ones.
pub fn encode_jump_instruction<S: AsRef<[u8]>>(
    segments: &[S],
    limits: &BatchLimits,
) -> Result<EncodedInstruction, EncodingError> {
    if segments.is_empty() {
        return Err(EncodingError::EmptyBatch);
    }
    let max_instructions = limits
        .max_instructions
        .min(MAX_JUMP_INSTRUCTIONS);
    let count = u8::try_from(segments.len())
        .ok()
        .filter(|count| *count as usize <= max_instructions)
        .ok_or_else(|| {
            EncodingError::BatchTooLarge(format!(
                "{} instructions exceed the limit of {}",
                segments.len(),
                max_instructions
            ))
        })?;

    let mut total_length = 2;
    for (i, segment) in segments.iter().enumerate() {
        let segment = segment.as_ref();
        match segment.first() {
            None => {
                return Err(EncodingError::InvalidInput(format!("segment {} is empty", i)));
            }
            Some(&JUMP) => {
                return Err(EncodingError::InvalidInput(format!(
                    "segment {} is a jump instruction, jumps cannot be nested",
                    i
                )));
            }
            Some(_) => {}
        }
        if segment.len() > u16::MAX as usize {
            return Err(EncodingError::BatchTooLarge(format!(
                "segment {} is {} bytes long, more than a u16 length prefix can describe",
                i,
                segment.len()
            )));
        }
        total_length += JUMP_LENGTH_WIDTH + segment.len();
    }
    if total_length > limits.max_payload_bytes {
        return Err(EncodingError::BatchTooLarge(format!(
            "payload of {} bytes exceeds the limit of {}",
            total_length, limits.max_payload_bytes
        )));
    }

    let mut payload = Vec::with_capacity(total_length);
    payload.push(JUMP);
    payload.push(count);
    for segment in segments {
        let segment = segment.as_ref();
        payload.extend_from_slice(&(segment.len() as u16).to_be_bytes());
        payload.extend_from_slice(segment);
    }
    debug!("Encoded jump of {} instructions, {} bytes", segments.len(), payload.len());
    Ok(payload.into())
}

/// Checks that every batch-local reference points at an entity created by an earlier
/// instruction of the same batch.
///
/// A reference that resolves here is still provisional; the interpreter has the final word.
pub fn validate_references(instructions: &[Instruction]) -> Result<(), EncodingError> {
    let mut pair_created = false;
    let mut curve_created = false;
    let mut pool_created = false;
    for (i, instruction) in instructions.iter().enumerate() {
        match instruction {
            Instruction::CreatePair(_) => pair_created = true,
            Instruction::CreateCurve(_) => curve_created = true,
            Instruction::CreatePool(pool) => {
                if pool.pair.is_in_batch() && !pair_created {
                    return Err(missing_producer(i, "pair"));
                }
                if pool.curve.is_in_batch() && !curve_created {
                    return Err(missing_producer(i, "curve"));
                }
                pool_created = true;
            }
            Instruction::AddLiquidity(LiquidityChange { pool, .. }) |
            Instruction::RemoveLiquidity(LiquidityChange { pool, .. }) |
            Instruction::Swap(SwapExactTokens { pool, .. }) => {
                if pool.is_in_batch() && !pool_created {
                    return Err(missing_producer(i, "pool"));
                }
            }
        }
    }
    Ok(())
}

fn missing_producer(index: usize, entity: &str) -> EncodingError {
    EncodingError::UnknownReference(format!(
        "instruction {} uses the {} created in this batch, but no {} is created before it",
        index, entity, entity
    ))
}

/// An ordered list of instructions executed atomically through one jump payload.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct InstructionBatch {
    instructions: Vec<Instruction>,
}

impl InstructionBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(mut self, instruction: Instruction) -> Self {
        self.instructions.push(instruction);
        self
    }

    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    /// Resolves batch-local references, encodes every instruction and joins them into a jump
    /// payload.
    pub fn encode(
        &self,
        context: &EncodingContext,
        limits: &BatchLimits,
    ) -> Result<EncodedInstruction, EncodingError> {
        if self.instructions.is_empty() {
            return Err(EncodingError::EmptyBatch);
        }
        validate_references(&self.instructions)?;
        let segments = self
            .instructions
            .iter()
            .map(|instruction| encode_instruction(instruction, context).map(|e| e.bytes))
            .collect::<Result<Vec<_>, _>>()?;
        encode_jump_instruction(&segments, limits)
    }
}

impl From<Vec<Instruction>> for InstructionBatch {
    fn from(instructions: Vec<Instruction>) -> Self {
        Self { instructions }
    }
}

impl FromIterator<Instruction> for InstructionBatch {
    fn from_iter<I: IntoIterator<Item = Instruction>>(iter: I) -> Self {
        Self { instructions: iter.into_iter().collect() }
    }
}
