#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if let Err(e) = quizpoint::run_admin().await {
        eprintln!("quizpoint-admin fatal: {e:#}");
        std::process::exit(1);
    }
    Ok(())
}
