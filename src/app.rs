//! Interactive chat loop.

use std::io::{self, BufRead, Write};
use std::ops::Range;

use anyhow::Result;
use tutor_chat_config::Config;

use crate::client::{AgentClient, ClientError};
use crate::conversation::Conversation;
use crate::render;

/// Typing this on its own line leaves the chat.
pub const QUIT_COMMAND: &str = "/quit";

/// Main application state
pub struct App {
    config: Config,
    client: AgentClient,
    conversation: Conversation,
    session_id: Option<String>,
}

impl App {
    pub fn new(config: Config) -> Self {
        let client = AgentClient::new(&config);
        Self {
            config,
            client,
            conversation: Conversation::new(),
            session_id: None,
        }
    }

    /// Run the chat until `/quit` or end of input.
    pub fn run(mut self) -> Result<()> {
        let stdin = io::stdin();
        let mut stdout = io::stdout();

        self.print_banner(&mut stdout)?;
        self.start_session(&mut stdout)?;

        let mut lines = stdin.lock().lines();
        loop {
            write!(stdout, "> ")?;
            stdout.flush()?;

            let Some(line) = lines.next() else {
                break;
            };
            let line = line?;
            if line.trim() == QUIT_COMMAND {
                break;
            }
            self.handle_input(&line, &mut stdout)?;
        }

        log::info!("Chat loop exited");
        Ok(())
    }

    fn print_banner(&self, out: &mut impl Write) -> io::Result<()> {
        writeln!(out, "tutor-chat {} ({})", crate::VERSION, self.config.api_url)?;
        if !self.config.has_auth_token() {
            writeln!(
                out,
                "Warning: No auth token configured. Set auth_token in {} or TUTOR_CHAT_AUTH_TOKEN.",
                Config::config_path().display()
            )?;
        }
        writeln!(out, "Type {QUIT_COMMAND} to exit.")?;
        writeln!(out)
    }

    fn start_session(&mut self, out: &mut impl Write) -> io::Result<()> {
        match self.client.create_session() {
            Ok(id) => self.session_id = Some(id),
            Err(ClientError::Unauthorized) => {
                let appended = self.conversation.session_rejected();
                self.show(appended, out)?;
            }
            Err(e) => log::warn!("Session setup failed: {e}"),
        }
        Ok(())
    }

    fn handle_input(&mut self, input: &str, out: &mut impl Write) -> io::Result<()> {
        let Some(text) = self.conversation.submit(input) else {
            return Ok(());
        };

        if self.session_id.is_none() {
            self.start_session(out)?;
        }
        let Some(session_id) = self.session_id.clone() else {
            return Ok(());
        };

        writeln!(out, "...")?;
        let result = self.client.run(&session_id, &text);
        let appended = self.conversation.apply_run_result(result);
        self.show(appended, out)
    }

    /// Render and optionally export the messages at `indices`.
    fn show(&mut self, indices: Range<usize>, out: &mut impl Write) -> io::Result<()> {
        for index in indices {
            let Some(prepared) = self.conversation.prepare(index, |id| {
                log::info!("Message {id} carries a visualization")
            }) else {
                continue;
            };
            let message = &self.conversation.messages()[index];
            writeln!(out, "{}", render::render_message(message, &prepared))?;

            if let Some(dir) = &self.config.export_dir {
                match render::export(dir, &message.id, &prepared) {
                    Ok(paths) => {
                        for path in paths {
                            writeln!(out, "  saved {}", path.display())?;
                        }
                    }
                    Err(e) => log::warn!("Export to {:?} failed: {e}", dir),
                }
            }
        }
        Ok(())
    }
}
