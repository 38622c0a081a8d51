//! Server command implementation

use anyhow::Result;
use nota_core::ConsoleConfig;

pub async fn cmd_serve(
    console: &ConsoleConfig,
    host: &str,
    port: u16,
    allowed_origins: Vec<String>,
) -> Result<()> {
    println!("🚀 Starting Nota console API...");
    println!("   Config: {}", console.source);
    println!("   Backend: {}", console.backend.base_url);
    println!("   Listening: http://{}:{}", host, port);
    if allowed_origins.is_empty() {
        println!("   CORS: same-origin only");
    } else {
        println!("   CORS: {}", allowed_origins.join(", "));
    }
    if !console.features.beta_users.is_empty() {
        println!(
            "   Beta users: {} configured",
            console.features.beta_users.len()
        );
    }
    println!();
    println!("   Press Ctrl+C to stop");

    let config = nota_server::ServerConfig { allowed_origins };
    nota_server::serve(console, host, port, config).await?;

    Ok(())
}
