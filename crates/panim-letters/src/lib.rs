//! Letter engine for Hebrew text.
//!
//! Final-form normalization, standard gematria, the classical pair-swap
//! ciphers, and a few text transforms. Pure synchronous; no I/O.
//!
//! # Quick start
//!
//! ```
//! use panim_letters::{CipherScheme, cipher, gematria};
//!
//! assert_eq!(gematria::score("אבג"), 6);
//! assert_eq!(cipher::apply(CipherScheme::Atbash, "אב"), "תש");
//! ```

pub mod alphabet;
pub mod cipher;
pub mod error;
pub mod gematria;
pub mod text;

pub use alphabet::canonicalize;
pub use cipher::{CipherScheme, CipherTable};
pub use error::{Error, Result};
pub use text::TextStats;
