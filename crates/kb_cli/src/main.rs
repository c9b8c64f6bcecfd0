//! kb CLI - standalone binary
//!
//! Thin wrapper around [`kb_cli::run_cli`], handling error display and
//! exit codes. All command logic lives in the library crate for
//! testability.
//!
//! # Exit Codes
//!
//! - `0` - Success
//! - `1` - Error (message printed to stderr)

fn main() {
    if let Err(e) = kb_cli::run_cli() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
