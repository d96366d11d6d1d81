use crate::constants::DEFAULT_CONFIG_PATH;
use clap::Parser;
use std::path::PathBuf;

/// Command-line arguments
#[derive(Parser, Debug)]
#[command(name = "jailftpd", about = "A jailed FTP server written in Rust.")]
pub struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    pub config: PathBuf,

    /// Validate the configuration file and exit
    #[arg(short, long)]
    pub test_config: bool,

    /// Print a bcrypt hash of the given password, for use in the configuration
    #[arg(long, value_name = "PASSWORD")]
    pub hash_password: Option<String>,

    /// Enable verbose mode
    #[arg(short, long)]
    pub verbose: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cli = Cli::parse_from(["jailftpd"]);
        assert_eq!(cli.config, PathBuf::from(DEFAULT_CONFIG_PATH));
        assert!(!cli.test_config);
        assert!(!cli.verbose);
        assert!(cli.hash_password.is_none());
    }

    #[test]
    fn test_short_flags() {
        let cli = Cli::parse_from(["jailftpd", "-c", "ftp.toml", "-t", "-v"]);
        assert_eq!(cli.config, PathBuf::from("ftp.toml"));
        assert!(cli.test_config);
        assert!(cli.verbose);
    }
}
