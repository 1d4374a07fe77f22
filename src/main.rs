fn main() {
    if let Err(err) = focustime_lib::run() {
        eprintln!("focustime: {err:#}");
        std::process::exit(1);
    }
}
