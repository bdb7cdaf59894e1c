use std::io::{self, Read};

use clap::Parser;
use dotenv::dotenv;
use hyper_execution::encoding::{
    batch::{validate_references, BatchLimits, InstructionBatch},
    decoder::decode_payload,
    evm::relay::encode_relay_transaction,
    instruction_encoders::encode_instruction,
    models::{Deployment, EncodedInstruction, EncodingContext, Instruction, Payload},
    utils::parse_address,
};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

mod lib {
    pub mod cli;
}

use lib::cli::Cli;

const TARGET_ADDRESS_ENV: &str = "HYPER_TARGET_ADDRESS";
const FORWARDER_ADDRESS_ENV: &str = "HYPER_FORWARDER_ADDRESS";

#[derive(Deserialize)]
struct EncodeRequest {
    instructions: Vec<Instruction>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into());
    let fmt_layer = fmt::Layer::default()
        .with_writer(io::stderr)
        .with_filter(env_filter);
    tracing_subscriber::registry()
        .with(fmt_layer)
        .init();

    let cli = Cli::parse();

    // Read from stdin until EOF
    let mut buffer = String::new();
    io::stdin()
        .read_to_string(&mut buffer)
        .map_err(|e| format!("Failed to read from stdin: {}", e))?;

    if buffer.trim().is_empty() {
        return Err("No input provided".into());
    }

    if cli.decode {
        let instructions = decode_hex_payload(&buffer)?;
        let output = serde_json::json!({ "instructions": instructions });
        println!("{}", serde_json::to_string(&output)?);
        return Ok(());
    }

    let target = cli
        .target
        .or_else(|| std::env::var(TARGET_ADDRESS_ENV).ok());
    let forwarder = cli
        .forwarder
        .or_else(|| std::env::var(FORWARDER_ADDRESS_ENV).ok());
    let deployment = match (target, forwarder) {
        (Some(target), Some(forwarder)) => Some(Deployment {
            target: parse_address(&target)?,
            forwarder: parse_address(&forwarder)?,
        }),
        (None, None) => None,
        _ => {
            return Err(
                "Both the target and the forwarder address are needed for a relay call".into()
            )
        }
    };

    let context = match cli.timestamp {
        Some(now) => EncodingContext::at(now),
        None => EncodingContext::current(),
    };
    let limits = BatchLimits::from_file(cli.batch_limits)?;

    let encoded = encode_request(&buffer, &context, &limits)?;
    let output = render_output(encoded, deployment.as_ref());

    println!(
        "{}",
        serde_json::to_string(&output).map_err(|e| format!("Failed to serialize output: {}", e))?
    );

    Ok(())
}

fn encode_request(
    input: &str,
    context: &EncodingContext,
    limits: &BatchLimits,
) -> Result<EncodedInstruction, Box<dyn std::error::Error>> {
    let request: EncodeRequest = serde_json::from_str(input)?;
    info!("Encoding {} instruction(s)", request.instructions.len());
    let encoded = match request.instructions.as_slice() {
        [single] => {
            validate_references(std::slice::from_ref(single))?;
            encode_instruction(single, context)?
        }
        _ => InstructionBatch::from(request.instructions).encode(context, limits)?,
    };
    debug!("Encoded payload {}", encoded.hex);
    Ok(encoded)
}

fn decode_hex_payload(input: &str) -> Result<Vec<Instruction>, Box<dyn std::error::Error>> {
    let trimmed = input.trim();
    let bytes = hex::decode(trimmed.strip_prefix("0x").unwrap_or(trimmed))
        .map_err(|e| format!("Invalid hex payload: {}", e))?;
    Ok(decode_payload(&bytes)?)
}

fn render_output(encoded: EncodedInstruction, deployment: Option<&Deployment>) -> Value {
    let payload = Payload::from(encoded);
    match deployment {
        Some(deployment) => {
            let payload_hex = payload.to_hex();
            let transaction = encode_relay_transaction(deployment, payload);
            serde_json::json!({
                "payload": payload_hex,
                "to": format!("0x{}", hex::encode(transaction.to)),
                "value": format!("0x{}", hex::encode(transaction.value.to_bytes_be())),
                "data": format!("0x{}", hex::encode(&transaction.data)),
            })
        }
        None => serde_json::json!({ "payload": payload.to_hex() }),
    }
}
