use raylink_api_types::DEFAULT_PORT;
use raylink_server::ServerConfig;
use std::path::PathBuf;

#[derive(clap::Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct CliArgs {
    #[arg(long, default_value = "0.0.0.0")]
    pub address: String,
    #[arg(long, default_value_t = DEFAULT_PORT)]
    pub port: u16,
    /// Serve a single client at a time; others are disconnected on arrival.
    #[arg(long, default_value_t = false)]
    pub single_connection: bool,
    /// Send the handshake acknowledgement byte to every new client.
    #[arg(long, default_value_t = false)]
    pub ack: bool,
    /// JSON scene description. The builtin scene is served when omitted.
    #[arg(long)]
    pub scene: Option<PathBuf>,
}

impl CliArgs {
    pub fn server_config(&self) -> ServerConfig {
        ServerConfig {
            address: self.address.clone(),
            port: self.port,
            allow_multiple_connections: !self.single_connection,
            send_ack: self.ack,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use pretty_assertions::assert_eq;

    #[test]
    fn defaults_match_the_default_config() {
        let args = CliArgs::parse_from(["raylink-server"]);
        assert_eq!(args.server_config(), ServerConfig::default());
        assert!(args.scene.is_none());
    }

    #[test]
    fn single_connection_flag_disables_multiple_connections() {
        let args = CliArgs::parse_from([
            "raylink-server",
            "--port",
            "4000",
            "--single-connection",
            "--ack",
            "--scene",
            "hangar.json",
        ]);
        let config = args.server_config();

        assert_eq!(config.port, 4000);
        assert!(!config.allow_multiple_connections);
        assert!(config.send_ack);
        assert_eq!(args.scene, Some(PathBuf::from("hangar.json")));
    }
}
