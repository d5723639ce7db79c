//! Interactive shell
//!
//! One [`SessionContext`] lives for as long as the user keeps it active.
//! When it idles past its TTL the next input is answered from a fresh
//! session instead.

pub mod commands;
pub mod display;
pub mod input;

use anyhow::Result;
use std::path::PathBuf;
use tracing::info;

use crate::config::Config;
use crate::document::DischargeParser;
use crate::errors::CareError;
use crate::repl::commands::{is_command, parse, CommandHandler};
pub use crate::repl::display::DisplayManager;
use crate::repl::input::InputHandler;
use crate::session::SessionContext;

pub struct ReplSession {
    input_handler: InputHandler,
    command_handler: CommandHandler,
    display_manager: DisplayManager,
    session: SessionContext,
}

impl ReplSession {
    pub fn new(config: Config, display: DisplayManager) -> Result<Self> {
        Self::build(InputHandler::new()?, config, display)
    }

    /// REPL session with persistent line history
    pub fn with_history(
        history_path: PathBuf,
        config: Config,
        display: DisplayManager,
    ) -> Result<Self> {
        Self::build(InputHandler::with_history(history_path)?, config, display)
    }

    fn build(input_handler: InputHandler, config: Config, display: DisplayManager) -> Result<Self> {
        let command_handler = CommandHandler::new(config);
        let session = command_handler.new_session();
        Ok(ReplSession {
            input_handler,
            command_handler,
            display_manager: display,
            session,
        })
    }

    /// Swap in a parser with a PDF backend
    pub fn with_parser(mut self, parser: DischargeParser) -> Self {
        self.command_handler = self.command_handler.with_parser(parser);
        self
    }

    pub fn show_welcome(&self, version: &str) {
        self.display_manager.show_banner(version, &self.session.patient.name);
    }

    pub fn read_input(&mut self) -> Result<Option<String>> {
        self.input_handler.read_line()
    }

    /// Handle one line of input
    ///
    /// Returns true if session should continue, false to exit
    pub fn handle_input(&mut self, input: &str) -> Result<bool> {
        if input.trim().is_empty() {
            return Ok(true);
        }

        self.renew_if_expired();

        if is_command(input) {
            let command = parse(input);
            return self.command_handler.execute(
                command,
                &mut self.session,
                &self.display_manager,
            );
        }

        self.display_manager
            .show_info("Commands start with '/'. Type /help to list them.");
        Ok(true)
    }

    fn renew_if_expired(&mut self) {
        if let Err(CareError::SessionExpired { id, idle_minutes }) = self.session.ensure_active() {
            info!(session = %id, idle_minutes, "session expired, starting a new one");
            self.display_manager.show_warning(&format!(
                "Session expired after {} idle minutes; starting a new session",
                idle_minutes
            ));
            self.session = self.command_handler.new_session();
        }
    }

    /// Read-eval-print until `/exit` or end of input
    pub fn run(&mut self) -> Result<()> {
        while let Some(line) = self.read_input()? {
            if !self.handle_input(&line)? {
                break;
            }
        }
        self.save()
    }

    pub fn session(&self) -> &SessionContext {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut SessionContext {
        &mut self.session
    }

    pub fn save(&mut self) -> Result<()> {
        self.input_handler.save_history()
    }
}
