use crate::config::Config;
use crate::core_ftpcommand::error::CommandError;
use crate::core_ftpcommand::ftpcommand::{CommandLine, FtpCommand};
use crate::core_ftpcommand::{
    abor, acct, allo, cdup, cwd, dele, help, list, mkd, mode, noop, pass, pwd, quit, rein, retr,
    rmd, rnfr, rnto, site, stat, stor, stru, syst, type_, user,
};
use crate::helpers::{send_reply, ControlWriter};
use crate::session::Session;
use crate::status_codes::{CMD_NOT_IMPLEMENTED, UNKNOWN_ERROR};
use log::{debug, error};
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use tokio::sync::Mutex as TokioMutex;

// Data connection setup lives in core_network
use crate::core_network::pasv;
use crate::core_network::port;

pub type CommandHandler = Box<
    dyn Fn(
            ControlWriter,
            Arc<Config>,
            Arc<TokioMutex<Session>>,
            String, // Argument, everything after the first space
        ) -> Pin<Box<dyn Future<Output = Result<(), CommandError>> + Send>>
        + Send
        + Sync,
>;

pub type CommandHandlers = HashMap<FtpCommand, CommandHandler>;

fn register<F, Fut>(handlers: &mut CommandHandlers, command: FtpCommand, handler: F)
where
    F: Fn(ControlWriter, Arc<Config>, Arc<TokioMutex<Session>>, String) -> Fut
        + Send
        + Sync
        + 'static,
    Fut: Future<Output = Result<(), CommandError>> + Send + 'static,
{
    handlers.insert(
        command,
        Box::new(move |writer, config, session, arg| {
            Box::pin(handler(writer, config, session, arg))
        }),
    );
}

pub fn initialize_command_handlers() -> CommandHandlers {
    let mut handlers: CommandHandlers = HashMap::new();

    // Authentication and session control
    register(&mut handlers, FtpCommand::USER, user::handle_user_command);
    register(&mut handlers, FtpCommand::PASS, pass::handle_pass_command);
    register(&mut handlers, FtpCommand::ACCT, acct::handle_acct_command);
    register(&mut handlers, FtpCommand::REIN, rein::handle_rein_command);
    register(&mut handlers, FtpCommand::QUIT, quit::handle_quit_command);

    // Informational and parameter commands
    register(&mut handlers, FtpCommand::NOOP, noop::handle_noop_command);
    register(&mut handlers, FtpCommand::ALLO, allo::handle_allo_command);
    register(&mut handlers, FtpCommand::HELP, help::handle_help_command);
    register(&mut handlers, FtpCommand::SYST, syst::handle_syst_command);
    register(&mut handlers, FtpCommand::SITE, site::handle_site_command);
    register(&mut handlers, FtpCommand::STAT, stat::handle_stat_command);
    register(&mut handlers, FtpCommand::TYPE, type_::handle_type_command);
    register(&mut handlers, FtpCommand::MODE, mode::handle_mode_command);
    register(&mut handlers, FtpCommand::STRU, stru::handle_stru_command);

    // Navigation and filesystem
    register(&mut handlers, FtpCommand::PWD, pwd::handle_pwd_command);
    register(&mut handlers, FtpCommand::XPWD, pwd::handle_pwd_command);
    register(&mut handlers, FtpCommand::CWD, cwd::handle_cwd_command);
    register(&mut handlers, FtpCommand::CDUP, cdup::handle_cdup_command);
    register(&mut handlers, FtpCommand::XCUP, cdup::handle_cdup_command);
    register(&mut handlers, FtpCommand::MKD, mkd::handle_mkd_command);
    register(&mut handlers, FtpCommand::XMKD, mkd::handle_mkd_command);
    register(&mut handlers, FtpCommand::RMD, rmd::handle_rmd_command);
    register(&mut handlers, FtpCommand::XRMD, rmd::handle_rmd_command);
    register(&mut handlers, FtpCommand::DELE, dele::handle_dele_command);
    register(&mut handlers, FtpCommand::RNFR, rnfr::handle_rnfr_command);
    register(&mut handlers, FtpCommand::RNTO, rnto::handle_rnto_command);

    // Data connection setup
    register(&mut handlers, FtpCommand::PASV, pasv::handle_pasv_command);
    register(&mut handlers, FtpCommand::EPSV, pasv::handle_epsv_command);
    register(&mut handlers, FtpCommand::PORT, port::handle_port_command);
    register(&mut handlers, FtpCommand::EPRT, port::handle_eprt_command);

    // Transfers
    register(&mut handlers, FtpCommand::LIST, list::handle_list_command);
    register(&mut handlers, FtpCommand::NLST, list::handle_nlst_command);
    register(&mut handlers, FtpCommand::RETR, retr::handle_retr_command);
    register(&mut handlers, FtpCommand::STOR, stor::handle_stor_command);
    register(&mut handlers, FtpCommand::APPE, stor::handle_appe_command);
    register(&mut handlers, FtpCommand::STOU, stor::handle_stou_command);
    register(&mut handlers, FtpCommand::ABOR, abor::handle_abor_command);

    handlers
}

/// Runs one command line through the handler table.
///
/// Unknown verbs, and recognized verbs without a handler, are answered with
/// 502. A handler error is logged and answered with 500, except a failed
/// write to the control connection, which is returned so the session ends.
pub async fn dispatch(
    handlers: &CommandHandlers,
    line: &CommandLine,
    writer: ControlWriter,
    config: Arc<Config>,
    session: Arc<TokioMutex<Session>>,
) -> Result<(), CommandError> {
    let Some(handler) = line.command().and_then(|command| handlers.get(&command)) else {
        debug!("Command not implemented: {:?}", line.verb);
        return send_reply(&writer, CMD_NOT_IMPLEMENTED, "").await;
    };

    match handler(Arc::clone(&writer), config, session, line.arg.clone()).await {
        Ok(()) => Ok(()),
        Err(e) if e.is_fatal() => Err(e),
        Err(e) => {
            error!("Error handling command {}: {}", line.verb, e);
            send_reply(&writer, UNKNOWN_ERROR, "").await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_implemented_command_is_registered() {
        let handlers = initialize_command_handlers();
        for verb in [
            "USER", "PASS", "ACCT", "REIN", "QUIT", "NOOP", "ALLO", "HELP", "SYST", "SITE",
            "STAT", "TYPE", "MODE", "STRU", "PWD", "XPWD", "CWD", "CDUP", "XCUP", "MKD", "XMKD",
            "RMD", "XRMD", "DELE", "RNFR", "RNTO", "PASV", "EPSV", "PORT", "EPRT", "LIST",
            "NLST", "RETR", "STOR", "APPE", "STOU", "ABOR",
        ] {
            let command = FtpCommand::from_str(verb).unwrap();
            assert!(handlers.contains_key(&command), "{} has no handler", verb);
        }
    }

    #[test]
    fn test_recognized_verbs_without_handler() {
        let handlers = initialize_command_handlers();
        for verb in ["FEAT", "SIZE", "MDTM", "REST", "AUTH", "MLSD"] {
            let command = FtpCommand::from_str(verb).unwrap();
            assert!(!handlers.contains_key(&command));
        }
    }
}
