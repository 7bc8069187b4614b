//! `forumd` binary: parses the command line and hands off to the library.

#[tokio::main]
async fn main() -> anyhow::Result<()> { forumd::server::run().await }
