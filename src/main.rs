#[tokio::main]
async fn main() -> anyhow::Result<()> {
    immo_annonces_lib::cli::run().await
}
