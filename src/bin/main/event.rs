//! The terminal events handler.
//!
//! A background thread turns the terminal input and the passing time into a single stream of [`Event`]s.

use color_eyre::Result;
use crossterm::event::{self, Event as CrosstermEvent, KeyEvent, KeyEventKind};
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

#[derive(Clone, Copy, Debug)]
pub enum Event {
    /// Emitted once per tick rate.
    Tick,
    Key(KeyEvent),
    /// The terminal got resized to the given width and height.
    Resize(u16, u16),
}

#[derive(Debug)]
pub struct EventHandler {
    receiver: mpsc::Receiver<Event>,
}

impl EventHandler {
    /// Spawns the thread producing the events. `tick_rate` is in milliseconds.
    pub fn new(tick_rate: u64) -> Self {
        let tick_rate = Duration::from_millis(tick_rate);
        let (sender, receiver) = mpsc::channel();

        thread::spawn(move || {
            let mut last_tick = Instant::now();

            loop {
                let timeout = tick_rate.saturating_sub(last_tick.elapsed());

                match event::poll(timeout) {
                    Ok(true) => {
                        let event = match event::read() {
                            Ok(CrosstermEvent::Key(key)) if key.kind == KeyEventKind::Press => Some(Event::Key(key)),
                            Ok(CrosstermEvent::Resize(width, height)) => Some(Event::Resize(width, height)),
                            Ok(_) => None,
                            Err(error) => {
                                log::error!("Couldn't read a terminal event: {}", error);
                                break;
                            }
                        };

                        // the receiver is gone, nobody's listening anymore
                        if event.is_some_and(|event| sender.send(event).is_err()) {
                            break;
                        }
                    }
                    Ok(false) => {}
                    Err(error) => {
                        log::error!("Couldn't poll the terminal: {}", error);
                        break;
                    }
                }

                if last_tick.elapsed() >= tick_rate {
                    if sender.send(Event::Tick).is_err() {
                        break;
                    }

                    last_tick = Instant::now();
                }
            }
        });

        EventHandler { receiver }
    }

    /// Blocks until the next event arrives.
    pub fn next(&self) -> Result<Event> {
        Ok(self.receiver.recv()?)
    }
}
