use relnotes::{cli, logger, ui};

#[tokio::main]
async fn main() {
    // A missing .env file is not an error
    let _ = dotenvy::dotenv();

    if let Err(e) = logger::init() {
        eprintln!("Failed to initialize logging: {e}");
    }

    if let Err(e) = cli::main().await {
        ui::print_error(&format!("Error: {e:#}"));
        std::process::exit(1);
    }
}
