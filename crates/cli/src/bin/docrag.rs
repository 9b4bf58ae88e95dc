use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    docrag_cli::main_entry().await
}
