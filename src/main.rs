use clap::Parser;
use std::error::Error;

use chip8vm::cli::Cli;
use chip8vm::config::DEFAULT_LOG_FILTER;
use chip8vm::display::{MonoTermDisplay, SCREEN_HEIGHT, SCREEN_WIDTH};
use chip8vm::environment::Environment;
use chip8vm::input::StdinInput;
use chip8vm::interpreter::Chip8Interpreter;
use chip8vm::sound::{Mute, SimpleBeep, Sound};

fn main() -> Result<(), Box<dyn Error>> {
    // RUST_LOG=warn 2>chip8.log to see engine faults
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(DEFAULT_LOG_FILTER))
        .init();
    let cli = Cli::parse();

    // load the program before touching the terminal, so errors stay readable
    let mut interpreter = match cli.seed {
        Some(seed) => Chip8Interpreter::with_seed(cli.quirks(), seed),
        None => Chip8Interpreter::with_quirks(cli.quirks()),
    };
    interpreter.load_rom(&cli.rom)?;

    // initialise
    let mut input = StdinInput::new()?;
    let mut display = MonoTermDisplay::new(SCREEN_WIDTH, SCREEN_HEIGHT)?;
    let mut sound: Box<dyn Sound> = if cli.mute {
        Box::new(Mute::new())
    } else {
        Box::new(SimpleBeep::new())
    };

    let mut env = Environment::new(
        interpreter,
        &mut display,
        &mut input,
        sound.as_mut(),
        cli.run_config(),
    )?;
    env.main_loop()?;

    // shove some junk on stdout to stop the cli messing up the last frame
    for _ in 0..(SCREEN_HEIGHT / 2) {
        println!();
    }
    Ok(())
}
