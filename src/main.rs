use std::path::PathBuf;

use macroquad::prelude::*;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use tiled_explorer::animation::DirectionFrames;
use tiled_explorer::config::{GameConfig, DEFAULT_CONFIG_PATH};
use tiled_explorer::game::{FileMapLoader, Game};
use tiled_explorer::input::{Command, InputState};

fn config_path() -> PathBuf {
    std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}

fn load_config() -> GameConfig {
    match GameConfig::load_or_default(&config_path()) {
        Ok(cfg) => cfg,
        Err(err) => {
            eprintln!("{err:#}; falling back to defaults");
            GameConfig::default()
        }
    }
}

fn window_conf() -> Conf {
    let cfg = load_config();
    Conf {
        window_title: cfg.window_title,
        window_width: cfg.window_width,
        window_height: cfg.window_height,
        ..Default::default()
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}

#[macroquad::main(window_conf)]
async fn main() {
    init_tracing();

    let cfg = load_config();
    let loader = FileMapLoader::from_config(&cfg);
    let mut game = match Game::new(loader, &cfg.start_map, &cfg) {
        Ok(game) => game,
        Err(err) => {
            error!("{err:#}");
            return;
        }
    };
    let frames = DirectionFrames::load(&cfg.sprites);
    let mut input = InputState::new(cfg.deadzone);

    loop {
        let commands = input.poll_commands();
        if commands.contains(&Command::Quit) {
            info!("quit requested");
            break;
        }
        for command in commands {
            game.apply(command);
        }

        let now = get_time();
        if let Err(err) = game.update(input.direction(), now) {
            error!("{err:#}");
            break;
        }

        clear_background(BLACK);
        game.draw(&frames, now);

        next_frame().await;
    }
}
