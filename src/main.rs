use std::io;
use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, ValueEnum};
use crossterm::event::{Event, KeyCode, KeyModifiers};
use tracing::Level;

use term_popup::constants::RESIZE_MIN_EXTENT;
use term_popup::drivers::OutputDriver;
use term_popup::drivers::console::{ConsoleInputDriver, ConsoleOutputDriver};
use term_popup::event_loop::{ControlFlow, EventLoop};
use term_popup::layout::GeometryMode;
use term_popup::loader::{FileLoader, LoadRequest};
use term_popup::window::messages::MessageSpec;
use term_popup::{ActionHandler, WindowManager, WindowOptions, tracing_sub};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ModeArg {
    Window,
    Popup,
}

impl From<ModeArg> for GeometryMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Window => GeometryMode::Window,
            ModeArg::Popup => GeometryMode::Popup,
        }
    }
}

#[derive(Parser, Debug)]
#[command(
    name = "term-popup",
    version = env!("CARGO_PKG_VERSION"),
    about = "Interactive demo of movable, resizable terminal popups"
)]
struct DemoCli {
    /// Title of the first window.
    #[arg(long, default_value = "term-popup")]
    title: String,

    /// Message shown centered in the first window.
    #[arg(
        long,
        default_value = "Drag the title bar, resize from the corner, Esc closes."
    )]
    text: String,

    #[arg(long, default_value_t = 56)]
    width: u16,

    #[arg(long, default_value_t = 14)]
    height: u16,

    /// Ignore clicks outside the window instead of closing it.
    #[arg(long)]
    modal: bool,

    /// Length of open, close and resize transitions.
    #[arg(long, value_name = "SECONDS", default_value_t = 0.0)]
    speed: f64,

    #[arg(long, value_enum, default_value_t = ModeArg::Window)]
    mode: ModeArg,

    /// Build the first window from a template document (`path#selector`).
    #[arg(long, value_name = "URL")]
    template: Option<String>,

    /// Write debug logs here; the terminal belongs to the UI.
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,
}

impl DemoCli {
    fn validate(&self) -> Result<(), String> {
        if !(0.0..=10.0).contains(&self.speed) {
            return Err("speed must be between 0 and 10 seconds".to_string());
        }
        if self.width < RESIZE_MIN_EXTENT || self.height < RESIZE_MIN_EXTENT {
            return Err(format!(
                "width and height must be at least {RESIZE_MIN_EXTENT}"
            ));
        }
        Ok(())
    }

    fn options(&self) -> WindowOptions {
        WindowOptions::new()
            .name("demo")
            .title(self.title.clone())
            .text(self.text.clone())
            .size(self.width, self.height)
            .modal(self.modal)
            .show_max(true)
            .resizable(true)
            .speed(Duration::from_secs_f64(self.speed))
            .mode(self.mode.into())
            .action(
                "Ok",
                ActionHandler::described("Ok", Some("primary"), |wm, event| {
                    wm.close(&event.window, false)
                }),
            )
            .action(
                "Nested",
                ActionHandler::direct(|wm, _| {
                    wm.open(nested_options());
                }),
            )
            .action(
                "Busy",
                ActionHandler::direct(|wm, event| {
                    wm.lock(&event.window, Some("Working"), true);
                    wm.unlock(&event.window, Duration::from_millis(1500));
                }),
            )
            .action(
                "Info",
                ActionHandler::direct(|wm, event| {
                    let showing = wm
                        .window(&event.window)
                        .is_some_and(|window| !window.messages().is_empty());
                    if showing {
                        wm.clear_messages(&event.window);
                    } else {
                        wm.add_message(
                            &event.window,
                            MessageSpec::new(-3, 5, "Esc is ignored while this is shown"),
                        );
                    }
                }),
            )
    }
}

fn nested_options() -> WindowOptions {
    WindowOptions::new()
        .title("Nested")
        .text("A second window. Closing it keeps the first one locked.")
        .size(40, 9)
        .modal(true)
        .action(
            "Close",
            ActionHandler::direct(|wm, event| wm.close(&event.window, false)),
        )
}

fn main() -> io::Result<()> {
    let cli = DemoCli::parse();
    cli.validate().map_err(io::Error::other)?;
    tracing_sub::init(cli.log_file.as_deref(), Level::DEBUG)?;

    let mut output = ConsoleOutputDriver::new()?;
    output.enter()?;
    let mut windows = WindowManager::with_terminal(output.viewport()?);
    match &cli.template {
        Some(url) => {
            let request = LoadRequest::new(url.clone()).options(cli.options());
            windows
                .load(&FileLoader::new(), request)
                .map_err(io::Error::other)?;
        }
        None => {
            windows.open(cli.options());
        }
    }

    let mut event_loop = EventLoop::new(ConsoleInputDriver::new(), Duration::from_millis(16));
    let result = event_loop.run(&mut windows, |windows, event| {
        if let Some((Event::Key(key), _)) = event
            && key.code == KeyCode::Char('q')
            && key.modifiers.contains(KeyModifiers::CONTROL)
        {
            return Ok(ControlFlow::Quit);
        }
        if windows.live_count() == 0 {
            return Ok(ControlFlow::Quit);
        }
        if event.is_none() {
            output.draw(|mut frame| windows.render(&mut frame))?;
        }
        Ok(ControlFlow::Continue)
    });
    output.exit()?;
    result
}
