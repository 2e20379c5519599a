use std::process;

fn main() {
    if let Err(err) = yaml_for_humans::cli::run() {
        eprintln!("Error: {:#}", err);
        process::exit(1);
    }
}
