use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, BufReader};

use voice_ask::answer::HttpAnswerService;
use voice_ask::capture::CommandCapture;
use voice_ask::playback::CommandPlayback;
use voice_ask::search::SystemNavigator;
use voice_ask::ui::console::{parse_input, ConsolePresenter, Input, HELP};
use voice_ask::{Command, Config, Coordinator, CoordinatorHandle, Services};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    env_logger::init();
    log::info!("Voice Ask starting");

    let config = Config::load();
    log::info!("Answer endpoint: {}", config.endpoint);
    if config.capture_command.is_empty() {
        log::warn!(
            "No capture_command in {}, /listen will fail",
            Config::path().display()
        );
    }

    let services = Services {
        answers: Arc::new(HttpAnswerService::new(config.endpoint.clone())),
        capture: Box::new(CommandCapture::new(config.capture_command.clone())),
        playback: Box::new(CommandPlayback::new(config.playback_command.clone())),
        navigator: Box::new(SystemNavigator),
        presenter: Box::new(ConsolePresenter::new()),
    };
    let coordinator = Coordinator::new(config.clone(), services);

    println!("{HELP}");
    tokio::spawn(read_input(coordinator.handle(), config));

    coordinator.run().await;
}

/// Forward console lines to the coordinator until EOF or `/quit`.
async fn read_input(handle: CoordinatorHandle, mut config: Config) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => {
                log::error!("Failed to read stdin: {e}");
                break;
            }
        };
        match parse_input(&line) {
            Input::Command(Command::SetLanguage(mode)) => {
                config.language = mode.clone();
                if let Err(e) = config.save() {
                    log::warn!("Failed to save config: {e}");
                }
                handle.send(Command::SetLanguage(mode));
            }
            Input::Command(Command::Shutdown) => break,
            Input::Command(command) => {
                handle.send(command);
            }
            Input::Help => println!("{HELP}"),
            Input::Unknown(line) => println!("Unknown command: {line}\n{HELP}"),
            Input::Empty => {}
        }
    }
    handle.shutdown();
}
