//! Interactive player loop
//!
//! One task owns the manager. Input lines and poll ticks are handled one at a time
//! inside a single `select!`, so every intent completes before the next begins.

use crate::command::{Command, CommandError};
use crate::view;
use reel_playback::{PlaylistEvent, PlaylistManager};
use std::io::ErrorKind;
use std::time::Duration;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::time::MissedTickBehavior;

/// Result of handling one command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Keep going, printing the text
    Continue(String),
    Quit,
}

pub struct App {
    manager: PlaylistManager,
}

impl App {
    pub fn new(manager: PlaylistManager) -> Self {
        Self { manager }
    }

    pub fn manager(&self) -> &PlaylistManager {
        &self.manager
    }

    /// Run on stdin until quit, end of input or Ctrl-C
    pub async fn run(mut self, poll_interval: Duration) -> std::io::Result<()> {
        self.run_with(BufReader::new(tokio::io::stdin()), poll_interval)
            .await
    }

    /// Run on `input` until quit, end of input or Ctrl-C
    ///
    /// Lines that are not valid UTF-8 are reported and skipped. Any other read
    /// error ends the loop and is returned after playback stops.
    pub async fn run_with<R>(&mut self, input: R, poll_interval: Duration) -> std::io::Result<()>
    where
        R: AsyncBufRead + Unpin,
    {
        let mut lines = input.lines();

        let mut ticker = tokio::time::interval(poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        let ctrl_c = tokio::signal::ctrl_c();
        tokio::pin!(ctrl_c);

        println!("{}", view::render_playlist(&self.manager));
        println!("Type 'help' for commands.");

        let result = loop {
            tokio::select! {
                line = lines.next_line() => {
                    let line = match line {
                        Ok(Some(line)) => line,
                        Ok(None) => {
                            tracing::debug!("End of input");
                            break Ok(());
                        }
                        Err(e) if e.kind() == ErrorKind::InvalidData => {
                            tracing::warn!("Skipping unreadable input line: {}", e);
                            println!("Input line is not valid UTF-8, ignored");
                            continue;
                        }
                        Err(e) => break Err(e),
                    };
                    match self.handle_line(&line) {
                        Outcome::Continue(text) if text.is_empty() => {}
                        Outcome::Continue(text) => println!("{}", text),
                        Outcome::Quit => break Ok(()),
                    }
                }
                _ = ticker.tick() => {
                    if let Some(text) = self.poll() {
                        println!("{}", text);
                    }
                }
                _ = &mut ctrl_c => {
                    tracing::debug!("Interrupted");
                    break Ok(());
                }
            }
        };

        self.manager.stop();
        tracing::info!("Goodbye");
        result
    }

    /// Parse and execute one input line
    pub fn handle_line(&mut self, line: &str) -> Outcome {
        match Command::parse(line) {
            Ok(command) => self.execute(command),
            Err(CommandError::Empty) => Outcome::Continue(String::new()),
            Err(e) => Outcome::Continue(e.to_string()),
        }
    }

    /// Apply a command to the manager
    pub fn execute(&mut self, command: Command) -> Outcome {
        let text = match command {
            Command::List => view::render_playlist(&self.manager),
            Command::Add(paths) => {
                let requested = paths.len();
                let added = self
                    .manager
                    .add_tracks(paths.iter().map(|path| path.as_path()));
                let mut text = format!("Added {} of {} files", added, requested);
                if added > 0 {
                    text.push('\n');
                    text.push_str(&view::render_playlist(&self.manager));
                }
                text
            }
            Command::Folder(path) => match self.manager.load_folder(&path) {
                Ok(loaded) => format!(
                    "Loaded {} tracks from {}\n{}",
                    loaded,
                    path.display(),
                    view::render_playlist(&self.manager)
                ),
                Err(e) => e.to_string(),
            },
            Command::Remove(index) => match self.manager.remove_track(index) {
                Ok(removed) => format!(
                    "Removed {}\n{}",
                    removed.display_name(),
                    view::render_playlist(&self.manager)
                ),
                Err(e) => e.to_string(),
            },
            Command::Up(index) => {
                if index == 0 {
                    String::new()
                } else {
                    self.move_and_render(index, index - 1)
                }
            }
            Command::Down(index) => {
                if index + 1 >= self.manager.len() && index < self.manager.len() {
                    String::new()
                } else {
                    self.move_and_render(index, index + 1)
                }
            }
            Command::Move { from, to } => self.move_and_render(from, to),
            Command::Shuffle => {
                self.manager.shuffle();
                view::render_playlist(&self.manager)
            }
            Command::Play(selection) => {
                let selection = selection.or(self.manager.current_index());
                match self.manager.toggle_play(selection) {
                    Ok(()) => view::render_status(&self.manager),
                    Err(e) => e.to_string(),
                }
            }
            Command::Stop => {
                self.manager.stop();
                view::render_status(&self.manager)
            }
            Command::Repeat => {
                let enabled = self.manager.toggle_repeat();
                format!("Repeat {}", if enabled { "on" } else { "off" })
            }
            Command::Volume(percent) => {
                self.manager.set_volume(f32::from(percent) / 100.0);
                format!("Volume {}%", percent)
            }
            Command::Help => view::HELP.to_string(),
            Command::Quit => return Outcome::Quit,
        };

        // Command output already reflects the new state
        self.manager.drain_events();
        Outcome::Continue(text)
    }

    /// Handle a poll tick, returning text when something changed
    pub fn poll(&mut self) -> Option<String> {
        let result = self.manager.tick();

        let mut changed = false;
        let mut messages = Vec::new();
        for event in self.manager.drain_events() {
            match event {
                PlaylistEvent::CurrentChanged { .. } | PlaylistEvent::StateChanged { .. } => {
                    changed = true;
                }
                PlaylistEvent::Error { message } => messages.push(message),
                _ => {}
            }
        }

        if let Err(e) = result {
            tracing::warn!("Advancing playlist failed: {}", e);
        }

        if changed {
            messages.push(view::render_status(&self.manager));
        }

        if messages.is_empty() {
            None
        } else {
            Some(messages.join("\n"))
        }
    }

    fn move_and_render(&mut self, from: usize, to: usize) -> String {
        match self.manager.move_track(from, to) {
            Ok(()) => view::render_playlist(&self.manager),
            Err(e) => e.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reel_playback::{
        ManagerConfig, MemoryStore, PersistedPlaylist, PlaybackEngine, PlaybackError, TrackRef,
    };
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    /// Engine whose track ends when the test says so
    #[derive(Clone, Default)]
    struct TestEngine {
        active: Arc<AtomicBool>,
    }

    impl PlaybackEngine for TestEngine {
        fn load_and_play(&mut self, _track: &TrackRef) -> Result<(), PlaybackError> {
            self.active.store(true, Ordering::SeqCst);
            Ok(())
        }

        fn stop(&mut self) {
            self.active.store(false, Ordering::SeqCst);
        }

        fn is_active(&self) -> bool {
            self.active.load(Ordering::SeqCst)
        }

        fn set_volume(&mut self, _level: f32) {}
    }

    fn app_with(names: &[&str]) -> (App, TestEngine) {
        let engine = TestEngine::default();
        let store = MemoryStore::with_record(PersistedPlaylist {
            music_files: names.iter().map(|n| TrackRef::new(*n)).collect(),
            last_folder: None,
        });
        let manager = PlaylistManager::new(engine.clone(), store, ManagerConfig::default());
        (App::new(manager), engine)
    }

    fn text(outcome: Outcome) -> String {
        match outcome {
            Outcome::Continue(text) => text,
            Outcome::Quit => panic!("unexpected quit"),
        }
    }

    #[test]
    fn list_marks_current_track() {
        let (mut app, _) = app_with(&["/m/a.mp3", "/m/b.mp3"]);

        let out = text(app.handle_line("list"));

        assert!(out.contains(">   1. a.mp3"));
        assert!(out.contains("    2. b.mp3"));
        assert!(out.contains("No track playing"));
    }

    #[test]
    fn play_without_index_uses_pointer() {
        let (mut app, engine) = app_with(&["/m/a.mp3", "/m/b.mp3"]);

        let out = text(app.handle_line("play"));

        assert!(out.starts_with("Playing: a.mp3"));
        assert!(engine.is_active());

        text(app.handle_line("play"));
        assert!(!app.manager().is_playing());
    }

    #[test]
    fn play_on_empty_playlist_reports_no_selection() {
        let (mut app, _) = app_with(&[]);
        assert_eq!(text(app.handle_line("p")), "No track selected");
    }

    #[test]
    fn up_and_down_are_noops_at_edges() {
        let (mut app, _) = app_with(&["a.mp3", "b.mp3"]);

        assert_eq!(text(app.handle_line("up 1")), "");
        assert_eq!(text(app.handle_line("down 2")), "");

        text(app.handle_line("down 1"));
        let names: Vec<&str> = app.manager().tracks().iter().map(TrackRef::as_str).collect();
        assert_eq!(names, vec!["b.mp3", "a.mp3"]);
    }

    #[test]
    fn out_of_range_remove_is_reported() {
        let (mut app, _) = app_with(&["a.mp3"]);
        let out = text(app.handle_line("rm 5"));
        assert!(out.contains("Index out of bounds"));
        assert_eq!(app.manager().len(), 1);
    }

    #[test]
    fn volume_and_repeat_commands() {
        let (mut app, _) = app_with(&[]);

        assert_eq!(text(app.handle_line("vol 80")), "Volume 80%");
        assert!((app.manager().volume() - 0.8).abs() < 1e-6);
        assert_eq!(text(app.handle_line("repeat")), "Repeat on");
        assert_eq!(text(app.handle_line("repeat")), "Repeat off");
    }

    #[test]
    fn poll_reports_auto_advance() {
        let (mut app, mut engine) = app_with(&["a.mp3", "b.mp3"]);
        text(app.handle_line("play 1"));

        assert_eq!(app.poll(), None);

        engine.stop();
        let out = app.poll().unwrap();

        assert!(out.contains("Playing: b.mp3"));
        assert_eq!(app.manager().current_index(), Some(1));
    }

    #[tokio::test]
    async fn invalid_utf8_line_is_skipped() {
        let (mut app, engine) = app_with(&["a.mp3", "b.mp3"]);
        let input: &[u8] = b"add /m/caf\xe9.mp3\nrepeat\nplay 2\n";

        app.run_with(input, Duration::from_millis(10)).await.unwrap();

        // Lines after the bad one still ran, then shutdown stopped playback
        assert!(app.manager().repeat());
        assert_eq!(app.manager().current_index(), Some(1));
        assert_eq!(app.manager().len(), 2);
        assert!(!app.manager().is_playing());
        assert!(!engine.is_active());
    }

    #[tokio::test]
    async fn quit_line_ends_run_and_stops() {
        let (mut app, engine) = app_with(&["a.mp3"]);
        let input: &[u8] = b"play\nquit\nrepeat\n";

        app.run_with(input, Duration::from_millis(10)).await.unwrap();

        assert!(!app.manager().repeat());
        assert!(!engine.is_active());
    }

    #[test]
    fn quit_and_unknown() {
        let (mut app, _) = app_with(&[]);
        assert_eq!(app.handle_line("quit"), Outcome::Quit);
        assert!(text(app.handle_line("bogus")).contains("Unknown command"));
        assert_eq!(text(app.handle_line("")), "");
    }
}
