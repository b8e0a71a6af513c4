fn main() {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let options = match autocomplete_core::cli::parse_cli_args(&args) {
        Ok(options) => options,
        Err(error) => {
            eprintln!("[autocomplete-core] {error}");
            std::process::exit(2);
        }
    };

    match autocomplete_core::cli::run(options) {
        Ok(lines) => {
            for line in lines {
                println!("{line}");
            }
        }
        Err(error) => {
            autocomplete_core::logging::error(&format!("probe failed: {error}"));
            eprintln!("[autocomplete-core] probe failed: {error}");
            std::process::exit(1);
        }
    }
}
