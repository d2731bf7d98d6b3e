fn main() {
    if let Err(err) = redshift_ddl::run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
