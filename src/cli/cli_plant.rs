use super::cli_main::get_user_input;
use crate::SludgeReactors::task_parser::PlantTask;
use crate::Utils::load_from_file::find_json_files;
use crate::cli::plant_help::PLANT_HELP;
use log::error;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

const TEMPLATE_FILE: &str = "plant_template.json";

pub fn plant_menu() {
    loop {
        println!("\n=== Activated Sludge Plant ===");
        println!("\x1b[33m1. Solve from file\x1b[0m");
        println!("\x1b[33m2. Auto-discover plant files\x1b[0m");
        println!("\x1b[33m3. Generate template\x1b[0m");
        println!("\x1b[33m4. Read help\x1b[0m");
        println!("\x1b[33m0. Back to main menu\x1b[0m");
        print!("\x1b[36mEnter your choice: \x1b[0m");
        let _ = io::stdout().flush();

        let choice = get_user_input();
        match choice.trim() {
            "1" => solve_from_file(),
            "2" => auto_solve_problems(),
            "3" => match PlantTask::write_template(TEMPLATE_FILE) {
                Ok(()) => println!("Template written to {}", TEMPLATE_FILE),
                Err(e) => error!("{}", e),
            },
            "4" => show_help(),
            "0" => break,
            _ => println!("Invalid choice. Please try again."),
        }
    }
}

fn solve_from_file() {
    print!("\x1b[36mEnter file path: \x1b[0m");
    let _ = io::stdout().flush();
    let file_path = get_user_input();
    let path = PathBuf::from(file_path.trim());

    if path.exists() {
        solve_from_file_dialog(&path);
    } else {
        println!("File not found: {}", file_path.trim());
    }
}

fn auto_solve_problems() {
    let found = match find_json_files(".", "plant") {
        Ok(found) => found,
        Err(e) => {
            error!("cannot read the working directory: {}", e);
            return;
        }
    };
    if found.is_empty() {
        println!("No files 'plant*.json' found in current directory.");
    }
    for file in found {
        println!("Found plant file: {}", file);
        solve_from_file_dialog(Path::new(&file));
    }
}

/// Output file next to the task: `<stem>_results.json`
fn results_path(task_path: &Path) -> PathBuf {
    let stem = task_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "plant".to_string());
    task_path.with_file_name(format!("{}_results.json", stem))
}

pub fn solve_from_file_dialog(path: &Path) {
    let file_name = path.to_string_lossy();
    let task = match PlantTask::load(&file_name) {
        Ok(task) => task,
        Err(e) => {
            println!("Error loading plant task: {}", e);
            return;
        }
    };
    task.print_summary();

    print!("\x1b[36mStart calculation? (y/n): \x1b[0m");
    let _ = io::stdout().flush();
    let choice = get_user_input().trim().to_lowercase();
    if choice != "y" && choice != "yes" {
        println!("Calculation cancelled. Returning to menu.");
        return;
    }
    match task.solve() {
        Ok(result) => {
            result.report.print_report();
            let out = results_path(path);
            match task.save_results(&result, &out.to_string_lossy()) {
                Ok(()) => println!("Results written to {}", out.display()),
                Err(e) => error!("{}", e),
            }
        }
        Err(e) => {
            println!("\x1b[31mSimulation failed: {}\x1b[0m", e);
            if e.is_configuration_error() {
                println!("Check the task against the help (menu item 4) and solve again.");
            }
        }
    }
}

fn show_help() {
    println!("\n=== Plant Task Help ===");
    println!("{}", PLANT_HELP);
    println!("\nPress Enter to return to menu...");
    let _ = get_user_input();
}
