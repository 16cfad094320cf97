use std::io::{self, Write};
use std::process;

use anyhow::{ensure, Context};
use clap::Parser;
use rand::rngs::StdRng;
use rand::SeedableRng;

use textbook_rsa::rsa::{
    decrypt_str, encrypt_str, generate_keypair_with_progress, KeyGenConfig, KeyGenStage, RsaKeyPair,
};

/// RSA self-test: a quick seeded round trip, then a full-size one.
#[derive(Parser, Debug)]
#[command(name = "textbook_rsa", about = "Generate RSA keys and run encrypt/decrypt self-tests")]
struct Args {
    /// Modulus size for the quick, deterministic demo.
    #[arg(long = "quick-bits", default_value_t = 64)]
    quick_bits: u64,

    /// Seed for the quick demo.
    #[arg(long = "seed", default_value_t = 42)]
    seed: u64,

    /// Modulus size for the full key pair.
    #[arg(short = 'b', long = "bits", default_value_t = 512)]
    bits: u64,

    /// Miller-Rabin rounds per candidate.
    #[arg(long = "rounds", default_value_t = 20)]
    rounds: usize,

    /// Message used for the full-size round trip.
    #[arg(short = 'm', long = "message", default_value = "Hello, RSA!")]
    message: String,
}

fn main() {
    let args = Args::parse();
    if let Err(e) = run(&args) {
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }
}

fn run(args: &Args) -> anyhow::Result<()> {
    let config = KeyGenConfig::default().with_rounds(args.rounds);

    // Quick demo with very small keys for instant feedback
    println!(" Running quick {}-bit demo…", args.quick_bits);
    let keypair = generate(args.quick_bits, StdRng::seed_from_u64(args.seed), &config)?;
    let msg = "Hi";
    let recovered = round_trip(&keypair, msg)?;
    println!(" • msg={:?}, recovered={:?}", msg, recovered);
    println!(" {}-bit self-test OK\n", args.quick_bits);

    // Full-size generation
    println!("🔑 Generating real {}-bit keypair…", args.bits);
    let keypair = generate(args.bits, StdRng::from_entropy(), &config)?;
    println!("Original message: {:?}", args.message);

    let cipher = encrypt_str(&args.message, keypair.public_key())
        .context("message does not fit below the modulus; use a larger key")?;
    let cipher_hex = hex::encode(cipher.to_bytes_be());
    let shown: String = cipher_hex.chars().take(60).collect();
    println!("Encrypted (hex, first 60 chars): {}…", shown);

    let plaintext = decrypt_str(&cipher, keypair.private_key()).context("decryption failed")?;
    println!("Decrypted message: {:?}", plaintext);
    ensure!(
        plaintext == args.message,
        "round trip mismatch: sent {:?}, recovered {:?}",
        args.message,
        plaintext
    );
    println!(" RSA self-test passed!");

    Ok(())
}

fn generate(bits: u64, mut rng: StdRng, config: &KeyGenConfig) -> anyhow::Result<RsaKeyPair> {
    print!(" Generating {}-bit key…", bits);
    flush();

    let keypair = generate_keypair_with_progress(bits, &mut rng, config, |stage| {
        match stage {
            KeyGenStage::PublicExponent => print!(" ✓e"),
            KeyGenStage::FirstPrime => print!(" ✓p"),
            KeyGenStage::SecondPrime => println!(" ✓q"),
            KeyGenStage::Complete => {}
        }
        flush();
    })
    .with_context(|| format!("failed to generate a {}-bit key", bits))?;

    Ok(keypair)
}

fn round_trip(keypair: &RsaKeyPair, msg: &str) -> anyhow::Result<String> {
    let cipher = encrypt_str(msg, keypair.public_key()).context("encryption failed")?;
    let recovered = decrypt_str(&cipher, keypair.private_key()).context("decryption failed")?;
    ensure!(recovered == msg, "round trip mismatch: sent {:?}, recovered {:?}", msg, recovered);
    Ok(recovered)
}

fn flush() {
    // Progress output only; a failed flush is not worth aborting over
    let _ = io::stdout().flush();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_defaults() {
        let args = Args::parse_from(["textbook_rsa"]);
        assert_eq!(args.quick_bits, 64);
        assert_eq!(args.seed, 42);
        assert_eq!(args.bits, 512);
        assert_eq!(args.rounds, 20);
        assert_eq!(args.message, "Hello, RSA!");
    }

    #[test]
    fn test_args_overrides() {
        let args = Args::parse_from(["textbook_rsa", "--bits", "256", "--seed", "7", "-m", "hey"]);
        assert_eq!(args.bits, 256);
        assert_eq!(args.seed, 7);
        assert_eq!(args.message, "hey");
    }

    #[test]
    fn test_round_trip_quick() {
        let keypair = generate(64, StdRng::seed_from_u64(42), &KeyGenConfig::default()).unwrap();
        assert_eq!(round_trip(&keypair, "Hi").unwrap(), "Hi");
    }

    #[test]
    fn test_round_trip_message_too_long() {
        let keypair = generate(16, StdRng::seed_from_u64(42), &KeyGenConfig::default()).unwrap();
        assert!(round_trip(&keypair, "far too long for sixteen bits").is_err());
    }
}
