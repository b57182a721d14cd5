//! # DTSS Core
//!
//! Dynamic-threshold secret sharing over a prime field.
//!
//! A secret is split among n participants with a symmetric bivariate
//! polynomial. The threshold can be raised or lowered and shares can be
//! proactively refreshed at runtime, without reconstructing the secret.
//!
//! ## Protocol Overview
//!
//! - Initialization: `f(x, y)` with `f(0, 0) = s`; master shares
//!   `S_i(y) = f(ID_i, y)`, working shares `T_i = S_i(0)`
//! - Threshold increase: expand `f`, recompute all shares
//! - Threshold decrease: resharing of Lagrange components, masked with
//!   pairing keys `K(a, b) = f(a, b)`
//! - Refresh: add a zero-constant update polynomial keyed by a public
//!   seed chain
//! - Recovery: participants publish pairing-key-masked Lagrange
//!   components whose sum is the secret
//!
//! ## Example
//!
//! ```rust
//! use dtss_core::{Engine, EngineConfig, ShareKind};
//! use num_bigint::BigUint;
//!
//! let config = EngineConfig::new(5, 3, BigUint::from(7919u32))?;
//! let mut engine = Engine::with_os_rng(config)?;
//! engine.initialize(&BigUint::from(1234u32))?;
//!
//! engine.decrease(2)?;
//! assert_eq!(engine.recover(&[1, 4], ShareKind::Working)?, BigUint::from(1234u32));
//! # Ok::<(), dtss_core::Error>(())
//! ```

pub mod engine;
pub mod error;
pub mod field;
pub mod lagrange;
pub mod poly;
pub mod seed;
pub mod types;

pub use engine::{Engine, RecoveryTranscript};
pub use error::{Error, Result};
pub use field::PrimeField;
pub use types::{EngineConfig, FieldElement, ParticipantIndex, ShareKind};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
