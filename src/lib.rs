//! A jailed FTP server: per-connection sessions, passive and active data
//! connections, and a server lifecycle with graceful shutdown and reload.

pub mod config;
pub mod constants;
pub mod core_auth;
pub mod core_cli;
pub mod core_ftpcommand;
pub mod core_log;
pub mod core_network;
pub mod helpers;
pub mod server;
pub mod session;
pub mod status_codes;
pub mod users;
