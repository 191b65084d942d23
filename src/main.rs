fn main() {
    if let Err(err) = catalog_migrate::run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
