#[derive(Eq, Hash, PartialEq, Debug, Clone, Copy)]
pub enum FtpCommand {
    ABOR,
    ACCT,
    ALLO,
    APPE,
    CDUP,
    CWD,
    DELE,
    EPRT,
    EPSV,
    HELP,
    LIST,
    MKD,
    MODE,
    NLST,
    NOOP,
    PASS,
    PASV,
    PORT,
    PWD,
    QUIT,
    REIN,
    RETR,
    RMD,
    RNFR,
    RNTO,
    SITE,
    STAT,
    STOR,
    STOU,
    STRU,
    SYST,
    TYPE,
    USER,
    XCUP,
    XMKD,
    XPWD,
    XRMD,
    // Recognized, no handler: answered with 502
    ADAT,
    AUTH,
    AVBL,
    CCC,
    CONF,
    CSID,
    DSIZ,
    ENC,
    FEAT,
    HOST,
    LANG,
    LPRT,
    LPSV,
    MDTM,
    MFCT,
    MFF,
    MFMT,
    MIC,
    MLSD,
    MLST,
    OPTS,
    PBSZ,
    PROT,
    REST,
    RMDA,
    SIZE,
    SMNT,
    SPSV,
    THMB,
    XSEM,
    XSEN,
}

impl FtpCommand {
    pub fn from_str(cmd: &str) -> Option<FtpCommand> {
        match cmd.to_ascii_uppercase().as_str() {
            "ABOR" => Some(FtpCommand::ABOR),
            "ACCT" => Some(FtpCommand::ACCT),
            "ALLO" => Some(FtpCommand::ALLO),
            "APPE" => Some(FtpCommand::APPE),
            "CDUP" => Some(FtpCommand::CDUP),
            "CWD" => Some(FtpCommand::CWD),
            "DELE" => Some(FtpCommand::DELE),
            "EPRT" => Some(FtpCommand::EPRT),
            "EPSV" => Some(FtpCommand::EPSV),
            "HELP" => Some(FtpCommand::HELP),
            "LIST" => Some(FtpCommand::LIST),
            "MKD" => Some(FtpCommand::MKD),
            "MODE" => Some(FtpCommand::MODE),
            "NLST" => Some(FtpCommand::NLST),
            "NOOP" => Some(FtpCommand::NOOP),
            "PASS" => Some(FtpCommand::PASS),
            "PASV" => Some(FtpCommand::PASV),
            "PORT" => Some(FtpCommand::PORT),
            "PWD" => Some(FtpCommand::PWD),
            "QUIT" => Some(FtpCommand::QUIT),
            "REIN" => Some(FtpCommand::REIN),
            "RETR" => Some(FtpCommand::RETR),
            "RMD" => Some(FtpCommand::RMD),
            "RNFR" => Some(FtpCommand::RNFR),
            "RNTO" => Some(FtpCommand::RNTO),
            "SITE" => Some(FtpCommand::SITE),
            "STAT" => Some(FtpCommand::STAT),
            "STOR" => Some(FtpCommand::STOR),
            "STOU" => Some(FtpCommand::STOU),
            "STRU" => Some(FtpCommand::STRU),
            "SYST" => Some(FtpCommand::SYST),
            "TYPE" => Some(FtpCommand::TYPE),
            "USER" => Some(FtpCommand::USER),
            "XCUP" => Some(FtpCommand::XCUP),
            "XMKD" => Some(FtpCommand::XMKD),
            "XPWD" => Some(FtpCommand::XPWD),
            "XRMD" => Some(FtpCommand::XRMD),
            "ADAT" => Some(FtpCommand::ADAT),
            "AUTH" => Some(FtpCommand::AUTH),
            "AVBL" => Some(FtpCommand::AVBL),
            "CCC" => Some(FtpCommand::CCC),
            "CONF" => Some(FtpCommand::CONF),
            "CSID" => Some(FtpCommand::CSID),
            "DSIZ" => Some(FtpCommand::DSIZ),
            "ENC" => Some(FtpCommand::ENC),
            "FEAT" => Some(FtpCommand::FEAT),
            "HOST" => Some(FtpCommand::HOST),
            "LANG" => Some(FtpCommand::LANG),
            "LPRT" => Some(FtpCommand::LPRT),
            "LPSV" => Some(FtpCommand::LPSV),
            "MDTM" => Some(FtpCommand::MDTM),
            "MFCT" => Some(FtpCommand::MFCT),
            "MFF" => Some(FtpCommand::MFF),
            "MFMT" => Some(FtpCommand::MFMT),
            "MIC" => Some(FtpCommand::MIC),
            "MLSD" => Some(FtpCommand::MLSD),
            "MLST" => Some(FtpCommand::MLST),
            "OPTS" => Some(FtpCommand::OPTS),
            "PBSZ" => Some(FtpCommand::PBSZ),
            "PROT" => Some(FtpCommand::PROT),
            "REST" => Some(FtpCommand::REST),
            "RMDA" => Some(FtpCommand::RMDA),
            "SIZE" => Some(FtpCommand::SIZE),
            "SMNT" => Some(FtpCommand::SMNT),
            "SPSV" => Some(FtpCommand::SPSV),
            "THMB" => Some(FtpCommand::THMB),
            "XSEM" => Some(FtpCommand::XSEM),
            "XSEN" => Some(FtpCommand::XSEN),
            _ => None,
        }
    }
}

/// A command line split into its verb and the remaining argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandLine {
    pub verb: String,
    pub arg: String,
}

impl CommandLine {
    /// Strips trailing CR/LF/NUL and splits on the first space only.
    pub fn parse(raw: &[u8]) -> Self {
        let line = String::from_utf8_lossy(raw);
        let line = line.trim_end_matches(&['\r', '\n', '\0'][..]);
        match line.split_once(' ') {
            Some((verb, arg)) => CommandLine {
                verb: verb.to_ascii_uppercase(),
                arg: arg.to_string(),
            },
            None => CommandLine {
                verb: line.to_ascii_uppercase(),
                arg: String::new(),
            },
        }
    }

    pub fn command(&self) -> Option<FtpCommand> {
        FtpCommand::from_str(&self.verb)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_on_first_space_only() {
        let line = CommandLine::parse(b"STOR my file name.txt\r\n");
        assert_eq!(line.verb, "STOR");
        assert_eq!(line.arg, "my file name.txt");
    }

    #[test]
    fn test_verb_without_argument() {
        let line = CommandLine::parse(b"pwd\n");
        assert_eq!(line.verb, "PWD");
        assert_eq!(line.arg, "");
        assert_eq!(line.command(), Some(FtpCommand::PWD));
    }

    #[test]
    fn test_trailing_nul_and_crlf() {
        let line = CommandLine::parse(b"USER alice\r\n\0\0");
        assert_eq!(line.arg, "alice");
    }

    #[test]
    fn test_unknown_and_unimplemented_verbs() {
        assert_eq!(CommandLine::parse(b"XYZZY").command(), None);
        assert_eq!(FtpCommand::from_str("mlsd"), Some(FtpCommand::MLSD));
    }
}
