//! A cost model for low-degree tests compiled into succinct arguments.
//!
//! Interactive oracle proofs (IOPs) like [FRI](low_degree_test::fri) and
//! [STIR](low_degree_test::stir) become succinct, non-interactive arguments
//! once every oracle is replaced by a Merkle-tree commitment and every query by
//! an authentication path. This crate estimates what such an argument costs:
//! its size in bits, the length of the underlying proof in field elements, and
//! the number of queries the verifier makes. No field arithmetic and no hashing
//! is performed; the costs follow from the shape of the protocol alone.
//!
//! A simulation starts from [`LdtParameters`](parameters::LdtParameters),
//! which describe the targeted security, the field, the random oracle, and the
//! initial polynomial. A [low-degree test](low_degree_test::LowDegreeTest)
//! then generates [round](round::Round) after round until the polynomial is
//! small enough to be sent in the clear. The resulting
//! [protocol](protocol::Protocol) holds every message ever sent, and with it,
//! all costs.
//!
//! # Example
//!
//! Compare FRI and STIR for a polynomial of degree 2^18 at rate 1/4, targeting
//! 128 bits of security, 22 of which come from proof-of-work.
//!
//! ```
//! # use ldt_cost::prelude::*;
//! let params = LdtParameters::default();
//!
//! let fri = Fri::new(vec![8], 1 << 6).unwrap();
//! let stir = Stir::new(vec![16], vec![2.0], 1 << 6).unwrap();
//!
//! let fri_protocol = fri.simulate(params).unwrap();
//! let stir_protocol = stir.simulate(params).unwrap();
//! assert!(stir_protocol.argument_size() < fri_protocol.argument_size());
//! ```
//!
//! Polynomial IOPs like Aurora first commit to several polynomials and then
//! prove the low-degreeness of all of them at once. Use
//! [`aurora::simulate`](low_degree_test::aurora::simulate) to model that.

pub mod error;
pub mod iop;
pub mod low_degree_test;
pub mod message;
pub mod parameters;
pub mod prelude;
pub mod protocol;
pub mod report;
pub mod rom;
pub mod round;
pub mod soundness;
pub mod utils;
