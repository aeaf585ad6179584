pub mod asm2d_examples;
