use std::io;
use std::time::{Duration, Instant};

use crossterm::event::Event;

use crate::drivers::InputDriver;
use crate::window::WindowManager;

pub enum ControlFlow {
    Continue,
    Quit,
}

/// Message pump feeding terminal input into a [`WindowManager`].
///
/// The loop is the only caller of `driver.poll()`/`driver.read()`. Between
/// input events it fires due transition completions, and it shortens its
/// poll timeout so an animated close or resize settles on time instead of
/// waiting for the next key press.
pub struct EventLoop<D> {
    driver: D,
    poll_interval: Duration,
}

impl<D: InputDriver> EventLoop<D> {
    pub fn new(driver: D, poll_interval: Duration) -> Self {
        Self {
            driver,
            poll_interval,
        }
    }

    pub fn driver(&mut self) -> &mut D {
        &mut self.driver
    }

    /// Poll timeout honouring the next pending completion, if any.
    pub fn timeout_until(&self, deadline: Option<Instant>, now: Instant) -> Duration {
        match deadline {
            Some(deadline) => deadline
                .saturating_duration_since(now)
                .min(self.poll_interval),
            None => self.poll_interval,
        }
    }

    /// Runs until `handler` asks to quit.
    ///
    /// The handler sees `Some(event)` for each input event, after the window
    /// manager had its chance at it, together with whether the manager
    /// consumed it. It sees `None` once per iteration for drawing.
    pub fn run<F>(&mut self, windows: &mut WindowManager, mut handler: F) -> io::Result<()>
    where
        F: FnMut(&mut WindowManager, Option<(&Event, bool)>) -> io::Result<ControlFlow>,
    {
        loop {
            windows.tick(Instant::now());
            if let ControlFlow::Quit = handler(windows, None)? {
                return Ok(());
            }

            let timeout = self.timeout_until(windows.next_deadline(), Instant::now());
            if !self.driver.poll(timeout)? {
                continue;
            }
            // drain bursts (mouse drags) before redrawing
            loop {
                let event = self.driver.read()?;
                let consumed = windows.handle_event(&event);
                if let ControlFlow::Quit = handler(windows, Some((&event, consumed)))? {
                    return Ok(());
                }
                if !self.driver.poll(Duration::ZERO)? {
                    break;
                }
            }
        }
    }
}
