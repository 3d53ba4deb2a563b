use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    replayscope_cli::cli::app::run().await
}
