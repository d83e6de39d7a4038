fn main() {
    #[cfg(feature = "cli")]
    deltarle::cli::run();

    #[cfg(not(feature = "cli"))]
    {
        eprintln!("deltarle: CLI not enabled. Rebuild with `--features cli`.");
        std::process::exit(1);
    }
}
