#[allow(non_snake_case)]
pub mod ASM2d;
#[allow(non_snake_case)]
pub mod Examples;
#[allow(non_snake_case)]
pub mod SludgeReactors;
#[allow(non_snake_case)]
pub mod Utils;
pub mod cli;
