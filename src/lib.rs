//! Deltarle: a reversible byte codec built from delta and run-length encoding.
//!
//! The crate provides:
//! - The in-memory codec and its three methods (`codec`)
//! - Whole-file helpers and report formatting (`io`)
//! - The interactive menu shell (`shell`)
//! - An optional CLI (`cli` feature)
//!
//! # Quick Start
//!
//! ```
//! use deltarle::codec::{self, Method};
//!
//! let data = [10u8, 10, 10, 12, 12];
//! let packed = codec::compress(&data, Method::DeltaRle);
//! assert_eq!(packed, [10, 1, 0, 2, 2, 1, 0, 1]);
//! assert_eq!(codec::decompress(&packed, Method::DeltaRle).unwrap(), data);
//! ```

pub mod codec;
pub mod io;
pub mod shell;

#[cfg(feature = "cli")]
pub mod cli;

pub use codec::{CodecError, Method, compress, decompress};
