use pocket_budget::cli;

fn main() {
    if let Err(err) = cli::run_cli() {
        eprintln!("fatal: {}", err);
        std::process::exit(1);
    }
}
