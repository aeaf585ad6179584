//! # Activated Sludge Reactors
//!
//! Multi-zone activated sludge plant: a chain of completely mixed zones (anaerobic, anoxic,
//! aerobic) followed by an ideal secondary clarifier, with return sludge, internal recycle and
//! sludge wastage, simulated with the ASM2d model.
//!
//! ## Mass balance of zone k
//!
//! ```text
//! V_k dx_k/dt = F_k (x_in,k − x_k) + V_k Σ_j ν_j ρ_j(x_k)
//! ```
//!
//! F_k is the zone throughput (influent share + upstream flow + return sludge + internal
//! recycle), x_in,k the flow-weighted mixture of the streams entering zone k.
//!
//! ## Workflow
//!
//! ```text
//! PlantTask (JSON) ─> SimulationDriver::new ─> run ─> SimulationResult ─> PlantReport
//!                     validation, temperature    RK4, zone by zone
//!                     correction, flow sheet
//! ```
//!
//! ## Modules
//!
//! - `errors`: `SimulationError`
//! - `influent`: influent descriptor, COD fractionation, influent patterns
//! - `reactor_topology`: zones, recycles, wastage, clarifier
//! - `integrator`: fixed-step RK4 with clamp counting
//! - `simulation`: run configuration, driver, result
//! - `report`: effluent quality, PAO metrics, P balance, operation
//! - `task_parser`: JSON task files
pub mod errors;
pub mod influent;
pub mod integrator;
pub mod reactor_topology;
pub mod report;
pub mod simulation;
mod simulation_tests;
pub mod task_parser;
mod task_parser_tests;
