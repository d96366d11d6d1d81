// Here's the list of the FTP commands implemented
pub mod abor;
pub mod acct;
pub mod allo;
pub mod cdup;
pub mod cwd;
pub mod dele;
pub mod help;
pub mod list;
pub mod mkd;
pub mod mode;
pub mod noop;
pub mod pass;
pub mod pwd;
pub mod quit;
pub mod rein;
pub mod retr;
pub mod rmd;
pub mod rnfr;
pub mod rnto;
pub mod site;
pub mod stat;
pub mod stor;
pub mod stru;
pub mod syst;
pub mod type_;
pub mod user;

// Dispatch table, command parsing and errors
pub mod error;
pub mod ftpcommand;
pub mod handlers;

// The utils and common functions are here
pub mod utils;
