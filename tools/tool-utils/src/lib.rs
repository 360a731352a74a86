use alloy::primitives::{hex, Signature};
use eyre::{eyre, Result};
use std::io::{self, BufRead, Write};
use std::process::{Command, Stdio};

/// The length in bytes of a `r || s || v` signature
const SIGNATURE_LEN: usize = 65;

/// Execute a command, capturing its stdout
///
/// Stderr is streamed to the terminal so that failures remain visible
pub fn run_command_output(mut cmd: Command) -> Result<String> {
    cmd.stdout(Stdio::piped()).stderr(Stdio::inherit());
    let output = cmd.output()?;

    if !output.status.success() {
        return Err(eyre!("Command failed with status: {}", output.status));
    }

    let stdout = String::from_utf8(output.stdout)?;
    Ok(stdout.trim_end().to_string())
}

/// General function to prompt for input with a specific message
///
/// Fails once the input is exhausted
pub fn prompt_for_input<R: BufRead>(prompt: &str, input: &mut R) -> Result<String> {
    print!("{}: ", prompt);
    io::stdout().flush()?;

    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Err(eyre!("input closed while waiting for `{prompt}`"));
    }

    Ok(line.trim().to_string())
}

/// Function to prompt user for a 65-byte hex signature, re-prompting on
/// malformed input
pub fn prompt_for_signature<R: BufRead>(prompt: &str, input: &mut R) -> Result<Signature> {
    loop {
        let line = prompt_for_input(prompt, input)?;
        match parse_signature(&line) {
            Ok(signature) => return Ok(signature),
            Err(e) => {
                println!("Invalid signature ({e}). Please enter 65 bytes of hex (r || s || v).");
            }
        }
    }
}

/// Parse a hex encoded `r || s || v` signature, with or without the `0x` prefix
pub fn parse_signature(input: &str) -> Result<Signature> {
    let bytes = hex::decode(input.trim())?;
    if bytes.len() != SIGNATURE_LEN {
        return Err(eyre!(
            "expected {SIGNATURE_LEN} bytes, got {}",
            bytes.len()
        ));
    }

    Signature::from_raw(&bytes).map_err(|e| eyre!(e.to_string()))
}
