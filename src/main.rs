#[tokio::main]
async fn main() {
    if let Err(e) = popsentry_lib::run().await {
        eprintln!("popsentry: {e}");
        std::process::exit(1);
    }
}
