fn main() {
    if let Err(err) = medgraph::run() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}
