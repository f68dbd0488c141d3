#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if let Err(e) = quizpoint::run().await {
        eprintln!("quizpoint fatal: {e:#}");
        std::process::exit(1);
    }
    Ok(())
}
