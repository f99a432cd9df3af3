fn main() {
    use clap::Parser;
    use std::error::Error;
    let args = novelspider::cli::Args::parse();
    let log_options = novelspider::logging::LogOptions {
        verbose: args.verbose,
        quiet: args.quiet,
        use_color: !args.no_color,
    };
    if let Err(e) = novelspider::logging::init(log_options) {
        eprintln!("warning: {}", e);
    }
    if let Err(e) = novelspider::cli::run(&args) {
        eprintln!("{}", e);
        if args.verbose {
            let mut source = e.source();
            while let Some(s) = source {
                eprintln!("  cause: {}", s);
                source = s.source();
            }
        }
        std::process::exit(e.exit_code());
    }
}
