//! Web server command.

use console::style;

use crate::config::Config;

/// Port used when the bind address names only a host.
const DEFAULT_PORT: u16 = 3000;

/// Start the web server.
pub async fn cmd_serve(config: &Config, bind: &str) -> anyhow::Result<()> {
    let (host, port) = parse_bind_address(bind);

    println!(
        "{} Storage backend: {} (bucket {})",
        style("→").cyan(),
        config.storage.backend.as_str(),
        config.storage.bucket
    );
    println!(
        "{} Model: {} in {}",
        style("→").cyan(),
        config.model.name,
        config.google.location
    );
    println!(
        "{} Starting startup analyst API at http://{}:{}",
        style("→").cyan(),
        host,
        port
    );
    println!("  Press Ctrl+C to stop");

    crate::server::serve(config, &host, port).await
}

/// Parse a bind address that can be:
/// - Just a port: "3000" -> 127.0.0.1:3000
/// - Just a host: "0.0.0.0" -> 0.0.0.0:3000
/// - Host and port: "0.0.0.0:3000" -> 0.0.0.0:3000
fn parse_bind_address(bind: &str) -> (String, u16) {
    if let Ok(port) = bind.parse::<u16>() {
        return ("127.0.0.1".to_string(), port);
    }

    if let Some((host, port_str)) = bind.rsplit_once(':') {
        if let Ok(port) = port_str.parse::<u16>() {
            return (host.to_string(), port);
        }
    }

    (bind.to_string(), DEFAULT_PORT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bind_address() {
        assert_eq!(parse_bind_address("8080"), ("127.0.0.1".to_string(), 8080));
        assert_eq!(parse_bind_address("0.0.0.0"), ("0.0.0.0".to_string(), 3000));
        assert_eq!(
            parse_bind_address("0.0.0.0:9000"),
            ("0.0.0.0".to_string(), 9000)
        );
    }
}
