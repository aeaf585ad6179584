use super::cli_examples::examples_menu;
use super::cli_plant::plant_menu;
use std::io::{self, Write};

pub fn run_interactive_menu() {
    loop {
        show_main_menu();
        let choice = get_user_input();

        match choice.trim() {
            "1" => plant_menu(),
            "2" => examples_menu(),
            "0" => {
                println!("Goodbye!");
                break;
            }
            _ => println!("Invalid choice. Please try again."),
        }
    }
}
// ANSI: 34 header, 33 menu items, 36 prompt, 0 reset
fn show_main_menu() {
    println!(
        "\x1b[34m\n Welcome to KiSludge: activated sludge simulator built on ASM2d\n
    biological nitrogen and phosphorus removal in multi-zone plants \n \x1b[0m"
    );
    println!("\x1b[33m1. Plant simulation\x1b[0m");
    println!("\x1b[33m2. Examples\x1b[0m");
    println!("\x1b[33m0. Exit\x1b[0m");
    print!("\x1b[36mEnter your choice: \x1b[0m");
    let _ = io::stdout().flush();
}

/// Reads one line from stdin; an unreadable stdin gives an empty line
pub fn get_user_input() -> String {
    let mut input = String::new();
    if io::stdin().read_line(&mut input).is_err() {
        input.clear();
    }
    input
}
