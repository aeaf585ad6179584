//! # ASM2d Biokinetic Model
//!
//! Activated Sludge Model No. 2d (Henze et al., IWA Scientific and Technical Report No. 9, 2000):
//! 18 state variables, 21 processes covering hydrolysis, heterotrophic growth and
//! denitrification, fermentation, biological phosphorus removal by PAO (including the
//! denitrifying PAO), nitrification and chemical P precipitation.
//!
//! ## Mathematical Model
//!
//! For a completely mixed volume the reaction term of component i is
//!
//! ```text
//! r_i = Σ_j ν_ij · ρ_j(x)
//! ρ_j = k_j · Π switching terms · catalyst concentration
//! ```
//!
//! where ν is the Petersen (stoichiometric) matrix, 21 × 18. Only the physically meaningful
//! coefficients of every process are declared; O2 (or NO3/N2), NH4, PO4 and alkalinity follow
//! from continuity of COD, nitrogen, phosphorus and charge.
//!
//! ## Modules
//!
//! | Module | Content |
//! |--------|---------|
//! | `state_vector` | components, `StateVector`, conventional indices |
//! | `parameters` | kinetic, stoichiometric and temperature parameter sets |
//! | `temperature_correction` | θ-correction of rate constants, DO saturation |
//! | `stoichiometry` | composition matrix, continuity closure |
//! | `process_rates` | process table, switching functions, zone gating, `ProcessModel` |
//!
//! ## Zone gating
//!
//! Aerobic processes run only in aerobic zones, anoxic processes in anoxic and aerobic zones,
//! anaerobic and unrestricted processes everywhere. Within a permitted zone the Monod and
//! inhibition terms do the rest.
pub mod parameters;
pub mod process_rates;
pub mod state_vector;
pub mod stoichiometry;
pub mod temperature_correction;
mod asm2d_tests;
