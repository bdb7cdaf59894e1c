//! Wire format constants shared by the instruction encoders, the decoder and the batcher.
//!
//! Every integer is written big-endian. The first byte of each instruction packs a flag nibble
//! (high) and the opcode (low); only the jump opcode uses the full byte.

pub const DEFAULT_BATCH_LIMITS_JSON: &str = include_str!("../../config/batch_limits.json");

pub const ADD_LIQUIDITY: u8 = 0x01;
pub const REMOVE_LIQUIDITY: u8 = 0x03;
pub const SWAP: u8 = 0x05;
pub const CREATE_POOL: u8 = 0x0B;
pub const CREATE_PAIR: u8 = 0x0C;
pub const CREATE_CURVE: u8 = 0x0D;
pub const JUMP: u8 = 0xAA;

/// Flag nibble set in the header byte when the caller asks for its full available balance.
pub const USE_MAX_FLAG: u8 = 0x01;

// Field widths, in bytes.
pub const ADDRESS_WIDTH: usize = 20;
pub const AMOUNT_WIDTH: usize = 16;
pub const PAIR_ID_WIDTH: usize = 2;
pub const CURVE_ID_WIDTH: usize = 4;
pub const POOL_ID_WIDTH: usize = 6;
pub const TICK_WIDTH: usize = 3;
pub const SIGMA_WIDTH: usize = 3;
pub const MATURITY_WIDTH: usize = 4;
pub const FEE_WIDTH: usize = 2;
pub const JUMP_LENGTH_WIDTH: usize = 2;

pub const CREATE_PAIR_LENGTH: usize = 1 + 2 * ADDRESS_WIDTH;
pub const CREATE_CURVE_LENGTH: usize =
    1 + AMOUNT_WIDTH + SIGMA_WIDTH + MATURITY_WIDTH + FEE_WIDTH;
pub const CREATE_POOL_LENGTH: usize = 1 + PAIR_ID_WIDTH + CURVE_ID_WIDTH + AMOUNT_WIDTH;
pub const LIQUIDITY_LENGTH: usize = 1 + POOL_ID_WIDTH + 2 * TICK_WIDTH + AMOUNT_WIDTH;
pub const SWAP_LENGTH: usize = 1 + POOL_ID_WIDTH + 2 * AMOUNT_WIDTH + 1;

/// Protocol bounds on curve parameters. Fees are in basis points, sigma in basis points of
/// implied volatility.
pub const MIN_FEE: u16 = 1;
pub const MAX_FEE: u16 = 1_000;
pub const MIN_SIGMA: u32 = 1;
pub const MAX_SIGMA: u32 = (1 << 24) - 1;

pub const MIN_TICK: i32 = -887_272;
pub const MAX_TICK: i32 = 887_272;

pub const MAX_POOL_ID: u64 = (1 << 48) - 1;

/// The instruction count of a jump payload is a single byte.
pub const MAX_JUMP_INSTRUCTIONS: usize = u8::MAX as usize;
