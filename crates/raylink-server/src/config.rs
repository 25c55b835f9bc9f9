use raylink_api_types::DEFAULT_PORT;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ServerConfig {
    pub address: String,
    pub port: u16,
    /// When `false`, connections arriving while a client is being served are
    /// closed right after being accepted.
    pub allow_multiple_connections: bool,
    /// Write the handshake acknowledgement byte after accepting a client.
    pub send_ack: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            address: "0.0.0.0".to_string(),
            port: DEFAULT_PORT,
            allow_multiple_connections: true,
            send_ack: false,
        }
    }
}

impl ServerConfig {
    /// Loopback server on an OS-assigned port.
    pub fn ephemeral() -> Self {
        Self {
            address: "127.0.0.1".to_string(),
            port: 0,
            ..Self::default()
        }
    }

    pub fn bind_address(&self) -> String {
        if self.address.contains(':') {
            format!("[{}]:{}", self.address, self.port)
        } else {
            format!("{}:{}", self.address, self.port)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn bind_address_brackets_ipv6_hosts() {
        let v4 = ServerConfig::default();
        let v6 = ServerConfig {
            address: "::1".to_string(),
            ..ServerConfig::default()
        };

        assert_eq!(v4.bind_address(), "0.0.0.0:2655");
        assert_eq!(v6.bind_address(), "[::1]:2655");
    }
}
