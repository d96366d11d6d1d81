use crate::config::Config;
use crate::core_ftpcommand::error::CommandError;
use crate::core_ftpcommand::utils::ensure_logged_in;
use crate::core_network::data_conn::spawn_passive;
use crate::helpers::{send_reply, ControlWriter};
use crate::session::Session;
use crate::status_codes::{
    CANT_OPEN_DATA_CONN, ENTERING_EXTENDED_PASSIVE_MODE, ENTERING_PASSIVE_MODE,
    EXT_PORT_UNKNOWN_PROTOCOL,
};
use log::{debug, error, warn};
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use tokio::net::{lookup_host, TcpListener};
use tokio::sync::Mutex;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressFamily {
    Any,
    V4,
    V6,
}

impl AddressFamily {
    fn matches(&self, ip: &IpAddr) -> bool {
        match self {
            AddressFamily::Any => true,
            AddressFamily::V4 => ip.is_ipv4(),
            AddressFamily::V6 => ip.is_ipv6(),
        }
    }
}

/// Parses the EPSV argument: empty for any family, `1` for IPv4, `2` for IPv6.
pub fn parse_epsv_family(arg: &str) -> Option<AddressFamily> {
    match arg.trim() {
        "" => Some(AddressFamily::Any),
        "1" => Some(AddressFamily::V4),
        "2" => Some(AddressFamily::V6),
        _ => None,
    }
}

/// Picks the address a passive listener binds to.
///
/// Candidates are the resolved addresses of the configured host, with
/// wildcards replaced by the address the client reached the control
/// connection on. Without a family constraint that control address comes
/// first, so EPSV clients reconnect to the host they already use.
pub async fn passive_address(
    config: &Config,
    control_local: SocketAddr,
    family: AddressFamily,
) -> Option<IpAddr> {
    let resolved: Vec<IpAddr> = match lookup_host((config.server.server_name.as_str(), 0)).await {
        Ok(addrs) => addrs.map(|addr| addr.ip()).collect(),
        Err(e) => {
            warn!("Cannot resolve {}: {}", config.server.server_name, e);
            Vec::new()
        }
    };

    let local = std::iter::once(control_local.ip());
    let candidates: Vec<IpAddr> = if family == AddressFamily::Any {
        local.chain(resolved).collect()
    } else {
        resolved.into_iter().chain(local).collect()
    };

    candidates
        .into_iter()
        .map(|ip| if ip.is_unspecified() { control_local.ip() } else { ip })
        .find(|ip| family.matches(ip) && !ip.is_unspecified())
}

/// Sets up a passive mode listener and its coordinator.
/// Returns the bound address.
async fn open_passive(
    writer: &ControlWriter,
    config: &Config,
    session: &Arc<Mutex<Session>>,
    family: AddressFamily,
) -> Result<Option<SocketAddr>, CommandError> {
    let control_local = {
        let session = session.lock().await;
        if !ensure_logged_in(writer, &session).await? {
            return Ok(None);
        }
        session.local_addr
    };

    let Some(ip) = passive_address(config, control_local, family).await else {
        warn!("No {:?} address available for passive mode", family);
        send_reply(writer, CANT_OPEN_DATA_CONN, "").await?;
        return Ok(None);
    };

    let listener = match TcpListener::bind((ip, 0)).await {
        Ok(listener) => listener,
        Err(e) => {
            error!("Failed to open passive listener on {}: {}", ip, e);
            send_reply(writer, CANT_OPEN_DATA_CONN, "").await?;
            return Ok(None);
        }
    };
    let addr = listener.local_addr()?;
    debug!("Passive listener set up on {}", addr);

    let channel = spawn_passive(listener, config.data_timeout());
    session.lock().await.set_data_channel(channel, true);
    Ok(Some(addr))
}

pub fn format_pasv_reply(addr: SocketAddr) -> Option<String> {
    match addr.ip() {
        IpAddr::V4(ip) => {
            let [h1, h2, h3, h4] = ip.octets();
            Some(format!(
                "Entering Passive Mode ({},{},{},{},{},{}).",
                h1,
                h2,
                h3,
                h4,
                addr.port() >> 8,
                addr.port() & 0xff
            ))
        }
        IpAddr::V6(_) => None,
    }
}

/// Handles the PASV FTP command (IPv4 only).
pub async fn handle_pasv_command(
    writer: ControlWriter,
    config: Arc<Config>,
    session: Arc<Mutex<Session>>,
    _arg: String,
) -> Result<(), CommandError> {
    let Some(addr) = open_passive(&writer, &config, &session, AddressFamily::V4).await? else {
        return Ok(());
    };
    match format_pasv_reply(addr) {
        Some(message) => send_reply(&writer, ENTERING_PASSIVE_MODE, &message).await,
        None => send_reply(&writer, CANT_OPEN_DATA_CONN, "").await,
    }
}

/// Handles the EPSV FTP command.
pub async fn handle_epsv_command(
    writer: ControlWriter,
    config: Arc<Config>,
    session: Arc<Mutex<Session>>,
    arg: String,
) -> Result<(), CommandError> {
    let Some(family) = parse_epsv_family(&arg) else {
        {
            let session = session.lock().await;
            if !ensure_logged_in(&writer, &session).await? {
                return Ok(());
            }
        }
        return send_reply(&writer, EXT_PORT_UNKNOWN_PROTOCOL, "").await;
    };

    let Some(addr) = open_passive(&writer, &config, &session, family).await? else {
        return Ok(());
    };
    let message = format!("Entering Extended Passive Mode (|||{}|)", addr.port());
    send_reply(&writer, ENTERING_EXTENDED_PASSIVE_MODE, &message).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pasv_reply_encodes_port() {
        let addr: SocketAddr = "192.168.1.20:50021".parse().unwrap();
        assert_eq!(
            format_pasv_reply(addr).unwrap(),
            "Entering Passive Mode (192,168,1,20,195,101)."
        );
        assert!(format_pasv_reply("[::1]:2000".parse().unwrap()).is_none());
    }

    #[test]
    fn test_epsv_family() {
        assert_eq!(parse_epsv_family(""), Some(AddressFamily::Any));
        assert_eq!(parse_epsv_family("1"), Some(AddressFamily::V4));
        assert_eq!(parse_epsv_family("2"), Some(AddressFamily::V6));
        assert_eq!(parse_epsv_family("ALL"), None);
    }

    fn config_for(host: &str) -> Config {
        Config {
            server: crate::config::ServerConfig {
                server_name: host.to_string(),
                ..Default::default()
            },
            users: Default::default(),
        }
    }

    #[tokio::test]
    async fn test_epsv_prefers_control_address() {
        let config = config_for("127.0.0.1");
        let control: SocketAddr = "127.0.0.2:21".parse().unwrap();

        let any = passive_address(&config, control, AddressFamily::Any).await;
        assert_eq!(any, Some(control.ip()));
        let v4 = passive_address(&config, control, AddressFamily::V4).await;
        assert_eq!(v4, Some("127.0.0.1".parse().unwrap()));
    }

    #[tokio::test]
    async fn test_wildcard_host_uses_control_address() {
        let config = config_for("0.0.0.0");
        let control: SocketAddr = "127.0.0.1:21".parse().unwrap();
        let v4 = passive_address(&config, control, AddressFamily::V4).await;
        assert_eq!(v4, Some(control.ip()));
    }
}
