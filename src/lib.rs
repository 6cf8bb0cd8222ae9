//! Inscription reveal transaction builder
//!
//! Builds and signs Bitcoin transactions that reveal Ordinals inscriptions
//! through a Taproot script-path spend. Inputs may also be native segwit,
//! legacy P2PKH or P2SH-wrapped segwit outputs.
//!
//! ```no_run
//! use inscribe::{brc20, BuilderConfig, Input, Output, TransactionBuilder};
//!
//! # fn run() -> inscribe::Result<()> {
//! let inscription = brc20::inscription(
//!     brc20::Brc20Operation::Transfer,
//!     "ordi",
//!     &brc20::Brc20Params { amount: Some("1".into()), ..Default::default() },
//! )?;
//!
//! let mut builder = TransactionBuilder::new(BuilderConfig::default());
//! builder
//!     .add_input(Input::new("ab…", 1, "<hex key>", "tb1p…", "1600").with_inscription(inscription))
//!     .add_output(Output::new("tb1p…", "546"));
//! let raw_hex = builder.build()?;
//! # Ok(())
//! # }
//! ```

pub mod address;
pub mod brc20;
pub mod builder;
pub mod config;
pub mod envelope;
pub mod error;
pub mod keys;
pub mod network;
pub mod sighash;
pub mod signer;
pub mod taproot;

pub use address::{classify, SpendKind};
pub use builder::{BuilderConfig, Input, Output, TransactionBuilder};
pub use config::BuildRequest;
pub use envelope::Inscription;
pub use error::{InscribeError, Result};
pub use keys::{PrivateKey, PublicKey, Signature};
pub use network::NetworkParams;
pub use taproot::{commit_address, ScriptCommitment};
