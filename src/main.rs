use std::process;

fn main() {
    if let Err(e) = rrun::cli::run() {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}
