use crate::config::Config;
use crate::core_ftpcommand::error::CommandError;
use crate::core_ftpcommand::utils::ensure_logged_in;
use crate::core_network::data_conn::spawn_active;
use crate::helpers::{send_reply, ControlWriter};
use crate::session::Session;
use crate::status_codes::{EXT_PORT_UNKNOWN_PROTOCOL, OK, SYNTAX_ERROR};
use log::{info, warn};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::Arc;
use tokio::sync::Mutex;

#[derive(Debug, PartialEq, Eq)]
pub enum ActiveAddrError {
    /// Malformed argument, answered with 501.
    Syntax,
    /// Unknown or mismatched network protocol, answered with 522.
    Protocol,
}

/// Parses a PORT argument `h1,h2,h3,h4,p1,p2`.
pub fn parse_port_arg(arg: &str) -> Result<SocketAddr, ActiveAddrError> {
    let parts: Result<Vec<u8>, _> = arg
        .trim()
        .split(',')
        .map(|part| part.trim().parse::<u8>())
        .collect();
    let parts = parts.map_err(|_| ActiveAddrError::Syntax)?;
    let [h1, h2, h3, h4, p1, p2] = parts[..] else {
        return Err(ActiveAddrError::Syntax);
    };

    let port = (p1 as u16) << 8 | p2 as u16;
    if port == 0 {
        return Err(ActiveAddrError::Syntax);
    }
    Ok(SocketAddr::new(IpAddr::V4(Ipv4Addr::new(h1, h2, h3, h4)), port))
}

/// Parses an EPRT argument `<d>proto<d>address<d>port<d>`, where the
/// delimiter is the first character.
pub fn parse_eprt_arg(arg: &str) -> Result<SocketAddr, ActiveAddrError> {
    let arg = arg.trim();
    let delimiter = arg.chars().next().ok_or(ActiveAddrError::Syntax)?;
    let fields: Vec<&str> = arg.split(delimiter).collect();
    // Leading and trailing delimiters give empty first and last fields
    let [first, proto, address, port, last] = fields[..] else {
        return Err(ActiveAddrError::Syntax);
    };
    if !first.is_empty() || !last.is_empty() {
        return Err(ActiveAddrError::Syntax);
    }

    let port: u16 = port.parse().map_err(|_| ActiveAddrError::Syntax)?;
    if port == 0 {
        return Err(ActiveAddrError::Syntax);
    }

    let ip = match proto {
        "1" => address
            .parse::<Ipv4Addr>()
            .map(IpAddr::V4)
            .map_err(|_| ActiveAddrError::Syntax)?,
        "2" => address
            .parse::<std::net::Ipv6Addr>()
            .map(IpAddr::V6)
            .map_err(|_| ActiveAddrError::Syntax)?,
        _ => return Err(ActiveAddrError::Protocol),
    };
    Ok(SocketAddr::new(ip, port))
}

async fn open_active(
    writer: &ControlWriter,
    config: &Config,
    session: &Arc<Mutex<Session>>,
    parsed: Result<SocketAddr, ActiveAddrError>,
) -> Result<(), CommandError> {
    let mut session = session.lock().await;
    if !ensure_logged_in(writer, &session).await? {
        return Ok(());
    }

    let addr = match parsed {
        Ok(addr) => addr,
        Err(ActiveAddrError::Syntax) => {
            warn!("Malformed active mode address from {}", session.peer);
            return send_reply(writer, SYNTAX_ERROR, "").await;
        }
        Err(ActiveAddrError::Protocol) => {
            return send_reply(writer, EXT_PORT_UNKNOWN_PROTOCOL, "").await;
        }
    };

    info!("Session {}: active data connection to {}", session.id, addr);
    let channel = spawn_active(addr, config.data_timeout());
    session.set_data_channel(channel, false);
    send_reply(writer, OK, "").await
}

/// Handles the PORT (Active Mode) FTP command.
///
/// The connection to the client is dialed by a coordinator task; a failure
/// surfaces as 425 on the next transfer command.
pub async fn handle_port_command(
    writer: ControlWriter,
    config: Arc<Config>,
    session: Arc<Mutex<Session>>,
    arg: String,
) -> Result<(), CommandError> {
    open_active(&writer, &config, &session, parse_port_arg(&arg)).await
}

/// Handles the EPRT (Extended Active Mode) FTP command.
pub async fn handle_eprt_command(
    writer: ControlWriter,
    config: Arc<Config>,
    session: Arc<Mutex<Session>>,
    arg: String,
) -> Result<(), CommandError> {
    open_active(&writer, &config, &session, parse_eprt_arg(&arg)).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_port_arg() {
        assert_eq!(
            parse_port_arg("127,0,0,1,195,101").unwrap(),
            "127.0.0.1:50021".parse().unwrap()
        );
        assert_eq!(parse_port_arg("127,0,0,1,195"), Err(ActiveAddrError::Syntax));
        assert_eq!(parse_port_arg("127,0,0,256,1,1"), Err(ActiveAddrError::Syntax));
        assert_eq!(parse_port_arg("a,b,c,d,e,f"), Err(ActiveAddrError::Syntax));
        assert_eq!(parse_port_arg("127,0,0,1,0,0"), Err(ActiveAddrError::Syntax));
        assert_eq!(parse_port_arg(""), Err(ActiveAddrError::Syntax));
    }

    #[test]
    fn test_parse_eprt_arg() {
        assert_eq!(
            parse_eprt_arg("|1|132.235.1.2|6275|").unwrap(),
            "132.235.1.2:6275".parse().unwrap()
        );
        assert_eq!(
            parse_eprt_arg("|2|1080::8:800:200C:417A|5282|").unwrap(),
            "[1080::8:800:200C:417A]:5282".parse().unwrap()
        );
        assert_eq!(
            parse_eprt_arg("!1!10.0.0.1!21!").unwrap(),
            "10.0.0.1:21".parse().unwrap()
        );
    }

    #[test]
    fn test_parse_eprt_errors() {
        assert_eq!(parse_eprt_arg("|3|10.0.0.1|21|"), Err(ActiveAddrError::Protocol));
        assert_eq!(parse_eprt_arg("|1|::1|21|"), Err(ActiveAddrError::Syntax));
        assert_eq!(parse_eprt_arg("|1|10.0.0.1|21"), Err(ActiveAddrError::Syntax));
        assert_eq!(parse_eprt_arg("|1|10.0.0.1|port|"), Err(ActiveAddrError::Syntax));
        assert_eq!(parse_eprt_arg(""), Err(ActiveAddrError::Syntax));
    }
}
