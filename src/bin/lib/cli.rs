pub use clap::Parser;

#[derive(Parser)]
/// Encode Hyper instructions into a payload and, optionally, a forwarder relay call
///
/// Reads a JSON object from stdin with the following structure:
/// ```json
/// {
///     "instructions": [
///         {"type": "create_pair", "asset": "0x...", "quote": "0x..."},
///         {"type": "create_curve", "strike": "123...", "sigma": 10000,
///          "maturity": 1800000000, "fee": 30},
///         {"type": "create_pool", "pair": "in_batch", "curve": "in_batch", "price": "123..."},
///         {"type": "add_liquidity", "pool": {"on_chain": 4294967297},
///          "ticks": {"lo": -100, "hi": 100}, "amount": {"use_max": false, "amount": "123..."}},
///         {"type": "swap", "pool": {"on_chain": 4294967297},
///          "amount": {"use_max": true}, "limit": "0", "direction": 0}
///     ]
/// }
/// ```
/// A single instruction is encoded on its own, several are combined into one jump payload.
/// The relay call is printed when both the target and the forwarder are known, either from the
/// flags below or from HYPER_TARGET_ADDRESS and HYPER_FORWARDER_ADDRESS.
pub struct Cli {
    /// Address of the deployed Hyper contract the forwarder relays to
    #[arg(short, long)]
    pub target: Option<String>,

    /// Address of the forwarder contract
    #[arg(short, long)]
    pub forwarder: Option<String>,

    /// Path to a JSON file overriding the bundled batch limits
    #[arg(long)]
    pub batch_limits: Option<String>,

    /// Unix timestamp curve maturities are checked against (defaults to now)
    #[arg(long)]
    pub timestamp: Option<u64>,

    /// Read a hex payload from stdin and print its instructions instead of encoding
    #[arg(long)]
    pub decode: bool,
}
