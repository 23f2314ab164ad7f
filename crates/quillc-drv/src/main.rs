fn main() {
    if let Err(err) = quillc_drv::run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
