//! Reply codes and their canonical text.
//!
//! Every reply the server writes on the control connection carries one of
//! these codes. A reply sent without a custom message falls back to the
//! text returned by [`status_text`].

pub const RESTART_MARKER: u16 = 110;
pub const SERVICE_READY_IN_MINUTES: u16 = 120;
pub const DATA_CONN_ALREADY_OPEN: u16 = 125;
pub const FILE_STATUS_OK: u16 = 150;

pub const OK: u16 = 200;
pub const NOT_IMPLEMENTED_SUPERFLUOUS: u16 = 202;
pub const SYSTEM_STATUS: u16 = 211;
pub const DIRECTORY_STATUS: u16 = 212;
pub const FILE_STATUS: u16 = 213;
pub const HELP_MESSAGE: u16 = 214;
pub const NAME_SYSTEM: u16 = 215;
pub const SERVICE_READY: u16 = 220;
pub const CLOSING_CONTROL_CONN: u16 = 221;
pub const DATA_CONN_OPEN: u16 = 225;
pub const CLOSING_DATA_CONN: u16 = 226;
pub const ENTERING_PASSIVE_MODE: u16 = 227;
pub const ENTERING_LONG_PASSIVE_MODE: u16 = 228;
pub const ENTERING_EXTENDED_PASSIVE_MODE: u16 = 229;
pub const USER_LOGGED_IN: u16 = 230;
pub const USER_LOGGED_OUT: u16 = 231;
pub const LOGOUT_NOTED: u16 = 232;
pub const AUTH_ACCEPTED: u16 = 234;
pub const FILE_ACTION_OK: u16 = 250;
pub const PATH_CREATED: u16 = 257;

pub const USERNAME_OK: u16 = 331;
pub const NEED_ACCOUNT: u16 = 332;
pub const FILE_ACTION_PENDING: u16 = 350;

pub const CMD_NOT_ACCEPTED: u16 = 400;
pub const SERVICE_NOT_AVAILABLE: u16 = 421;
pub const CANT_OPEN_DATA_CONN: u16 = 425;
pub const CONN_CLOSED_TRANSFER_ABORTED: u16 = 426;
pub const INVALID_CREDENTIALS: u16 = 430;
pub const HOST_UNAVAILABLE: u16 = 434;
pub const FILE_ACTION_NOT_TAKEN: u16 = 450;
pub const LOCAL_ERROR: u16 = 451;
pub const INSUFFICIENT_STORAGE: u16 = 452;

pub const UNKNOWN_ERROR: u16 = 500;
pub const SYNTAX_ERROR: u16 = 501;
pub const CMD_NOT_IMPLEMENTED: u16 = 502;
pub const BAD_SEQUENCE: u16 = 503;
pub const CMD_NOT_IMPLEMENTED_FOR_PARAM: u16 = 504;
pub const EXT_PORT_UNKNOWN_PROTOCOL: u16 = 522;
pub const NOT_LOGGED_IN: u16 = 530;
pub const NEED_ACCOUNT_FOR_STORING: u16 = 532;
pub const POLICY_REQUIRES_SSL: u16 = 534;
pub const FILE_NOT_FOUND: u16 = 550;
pub const PAGE_TYPE_UNKNOWN: u16 = 551;
pub const EXCEEDED_STORAGE: u16 = 552;
pub const FILE_NAME_NOT_ALLOWED: u16 = 553;

pub const INTEGRITY_PROTECTED: u16 = 631;
pub const CONF_AND_INTEGRITY_PROTECTED: u16 = 632;
pub const CONF_PROTECTED: u16 = 633;

/// Returns the canonical text for a reply code, or an empty string when the
/// code is not part of the table.
pub fn status_text(code: u16) -> &'static str {
    match code {
        RESTART_MARKER => "Restart marker replay.",
        SERVICE_READY_IN_MINUTES => "Service ready in a few minutes.",
        DATA_CONN_ALREADY_OPEN => "Data connection already open.",
        FILE_STATUS_OK => "File status okay, about to open data connection.",

        OK => "Command Ok.",
        NOT_IMPLEMENTED_SUPERFLUOUS => "Command not implemented.",
        SYSTEM_STATUS => "System status.",
        DIRECTORY_STATUS => "Directory Status.",
        FILE_STATUS => "File Status.",
        HELP_MESSAGE => "Help message.",
        NAME_SYSTEM => "NAME system type.",
        SERVICE_READY => "Service Ready.",
        CLOSING_CONTROL_CONN => "Closing control connection.",
        DATA_CONN_OPEN => "Data connection open, no transfer in progress.",
        CLOSING_DATA_CONN => "Closing data connection. File action ok.",
        ENTERING_PASSIVE_MODE => "Entering passive mode.",
        ENTERING_LONG_PASSIVE_MODE => "Entering long passive mode.",
        ENTERING_EXTENDED_PASSIVE_MODE => "Entering extended passive mode.",
        USER_LOGGED_IN => "User logged in, proceed. Logged out if appropriate.",
        USER_LOGGED_OUT => "User logged out, service terminated.",
        LOGOUT_NOTED => "Logout command noted.",
        AUTH_ACCEPTED => "Authentication mechanism accepted.",
        FILE_ACTION_OK => "Requested file action ok, completed.",
        PATH_CREATED => "Path created.",

        USERNAME_OK => "Username okay, need password.",
        NEED_ACCOUNT => "Need account for login.",
        FILE_ACTION_PENDING => "Requested file action pending more information.",

        CMD_NOT_ACCEPTED => "Command not accepted, please try again.",
        SERVICE_NOT_AVAILABLE => "Service not available, closing control connection.",
        CANT_OPEN_DATA_CONN => "Can't open data connection.",
        CONN_CLOSED_TRANSFER_ABORTED => "Connection closed, transfer aborted.",
        INVALID_CREDENTIALS => "Invalid username or password.",
        HOST_UNAVAILABLE => "Requested host unavailable.",
        FILE_ACTION_NOT_TAKEN => "Requested file action not taken.",
        LOCAL_ERROR => "Requested action aborted. Local error in processing.",
        INSUFFICIENT_STORAGE => {
            "Requested action not taken. Insufficient storage space in system. File unavailable."
        }

        UNKNOWN_ERROR => "Unknown error.",
        SYNTAX_ERROR => "Syntax error in parameters or arguments.",
        CMD_NOT_IMPLEMENTED => "Command not implemented.",
        BAD_SEQUENCE => "Bad sequence of commands.",
        CMD_NOT_IMPLEMENTED_FOR_PARAM => "Command not implemented for that parameter.",
        EXT_PORT_UNKNOWN_PROTOCOL => "Extended Port Failure - unknown network protocol",
        NOT_LOGGED_IN => "Not logged in.",
        NEED_ACCOUNT_FOR_STORING => "Need account for storing files.",
        POLICY_REQUIRES_SSL => "Could Not Connect to Server - Policy Requires SSL.",
        FILE_NOT_FOUND => "File not found, error encountered.",
        PAGE_TYPE_UNKNOWN => "Requested action aborted. Page type unknown.",
        EXCEEDED_STORAGE => "Requested file action aborted. Exceeded storage allocation.",
        FILE_NAME_NOT_ALLOWED => "Requested action not taken. File name not allowed.",

        INTEGRITY_PROTECTED => "Integrity protected reply.",
        CONF_AND_INTEGRITY_PROTECTED => "Confidentiality and integrity protected reply.",
        CONF_PROTECTED => "Confidentiality protected reply.",
        _ => "",
    }
}

/// Formats a single-line reply. An empty `message` is replaced by the
/// canonical text of `code`.
pub fn format_reply(code: u16, message: &str) -> String {
    let text = if message.is_empty() {
        status_text(code)
    } else {
        message
    };
    format!("{} {}\r\n", code, text)
}

/// Formats a multi-line reply: `NNN-header`, one indented line per entry,
/// then the closing `NNN footer`.
pub fn format_multiline_reply(code: u16, header: &str, lines: &[String], footer: &str) -> String {
    let mut reply = format!("{}-{}\r\n", code, header);
    for line in lines {
        reply.push(' ');
        reply.push_str(line);
        reply.push_str("\r\n");
    }
    reply.push_str(&format_reply(code, footer));
    reply
}
