//! Sparql command - run a local Oxigraph server as the store

use anyhow::{Context, Result};
use colored::Colorize;
use tokio::process::Command;

use crate::constants::OXIGRAPH_BINARY;

/// Arguments passed to `oxigraph`.
fn serve_args(host: &str, port: u16, data_dir: &str) -> Vec<String> {
    vec![
        "serve".to_string(),
        "--location".to_string(),
        data_dir.to_string(),
        "--bind".to_string(),
        format!("{}:{}", host, port),
        "--cors".to_string(),
    ]
}

/// Run the sparql command. Blocks until the server exits.
pub async fn run(host: &str, port: u16, data_dir: &str) -> Result<()> {
    println!("{}", "Starting Oxigraph SPARQL server...".green().bold());
    println!("  {}: {}", "Data directory".cyan(), data_dir);
    println!(
        "  {}: http://{}:{}/query",
        "SPARQL endpoint".cyan(),
        host,
        port
    );

    let status = Command::new(OXIGRAPH_BINARY)
        .args(serve_args(host, port, data_dir))
        .status()
        .await
        .with_context(|| format!("Failed to start '{}' (is it installed?)", OXIGRAPH_BINARY))?;

    if !status.success() {
        anyhow::bail!("oxigraph server exited with status: {}", status);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serve_args() {
        assert_eq!(
            serve_args("127.0.0.1", 7878, "./data/oxigraph"),
            vec![
                "serve",
                "--location",
                "./data/oxigraph",
                "--bind",
                "127.0.0.1:7878",
                "--cors"
            ]
        );
    }
}
