//! Re-exports the most commonly-needed APIs of this crate.
//!
//! This module is intended to be wildcard-imported, _i.e._,
//! `use ldt_cost::prelude::*;`.

pub use crate::error::LdtParameterError;
pub use crate::error::ProtocolError;
pub use crate::error::SoundnessError;
pub use crate::low_degree_test::LowDegreeTest;
pub use crate::low_degree_test::aurora;
pub use crate::low_degree_test::aurora::AuroraLayout;
pub use crate::low_degree_test::fri::Fri;
pub use crate::low_degree_test::stir::Stir;
pub use crate::parameters::LdtParameters;
pub use crate::parameters::SoundnessRegime;
pub use crate::protocol::Protocol;
pub use crate::report::ProtocolReport;
pub use crate::rom::RomParameters;
pub use crate::utils::format_size;
