// src/constants.rs

pub const USERNAME_REGEX: &str = r"^[a-zA-Z0-9_.-]{1,32}$";
pub const SERVER_NAME_MAX_LENGTH: usize = 128;

/// Longest command line accepted on the control connection, terminator included.
pub const MAX_COMMAND_LENGTH: usize = 512;

pub const DEFAULT_DATA_TIMEOUT_SECS: u64 = 30;

/// How long a reply may wait on a client that is not reading its control socket.
pub const CONTROL_WRITE_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_CONFIG_PATH: &str = "/etc/jailftpd.toml";

/// Size reported for directories in LIST output.
pub const DIRECTORY_LIST_SIZE: u64 = 4096;
pub const LIST_TIME_FORMAT: &str = "%b %d %H:%M";

pub const SYSTEM_TYPE: &str = "UNIX Type: L8";
