use anyhow::Result;
use tutor_chat::app::App;
use tutor_chat::cli;

fn main() -> Result<()> {
    // Process CLI arguments first (before logging init for cleaner output)
    let runtime_options = match cli::process_cli() {
        cli::CliResult::Exit(code) => {
            if code == 0 {
                return Ok(());
            }
            std::process::exit(code);
        }
        cli::CliResult::Continue(options) => options,
    };
    // Routes all log::info!() etc. to <temp>/tutor_chat_debug.log.
    // CLI --log-level flag takes highest precedence, then RUST_LOG, then config (applied below).
    tutor_chat::debug::init_log_bridge(runtime_options.log_level);

    log::info!("Starting tutor-chat {}", tutor_chat::VERSION);

    let config = match runtime_options.resolve_config() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("tutor-chat: error: {e:#}");
            std::process::exit(1);
        }
    };
    tutor_chat::debug::apply_config_level(config.log_level);

    let result = App::new(config).run();
    if let Err(ref e) = result {
        eprintln!("tutor-chat: error: {e:#}");
    }
    result
}
