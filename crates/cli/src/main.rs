//! `tswire` binary.

fn main() {
    tswire_cli::init_tracing();
    let args: Vec<String> = std::env::args().collect();
    std::process::exit(tswire_cli::run_cli(args));
}
