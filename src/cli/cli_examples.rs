use super::cli_main::get_user_input;
use crate::Examples::asm2d_examples::asm2d_examples;
use std::io::{self, Write};

pub fn examples_menu() {
    loop {
        println!("\n=== Examples ===");
        println!("\x1b[33m1. A2O plant at steady state\x1b[0m");
        println!("\x1b[33m2. Influent with and without VFA\x1b[0m");
        println!("\x1b[33m3. Diurnal load, dynamic run\x1b[0m");
        println!("\x1b[33m4. Temperature sweep\x1b[0m");
        println!("\x1b[33m5. Chemical P precipitation\x1b[0m");
        println!("\x1b[33m6. MLE and step feed plants\x1b[0m");
        println!("\x1b[33m0. Back to main menu\x1b[0m");
        print!("\x1b[36mEnter your choice: \x1b[0m");
        let _ = io::stdout().flush();

        let choice = get_user_input();
        match choice.trim().parse::<usize>() {
            Ok(0) => break,
            Ok(n) if n <= 6 => asm2d_examples(n - 1),
            _ => println!("Invalid choice. Please try again."),
        }
    }
}
