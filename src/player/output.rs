use std::path::{Path, PathBuf};
use std::time::Duration;

use rodio::{OutputStream, OutputStreamBuilder, Sink};
use tracing::{debug, error};

use crate::error::PlayerError;

use super::Player;
use super::sink::create_sink_at;

/// `Player` backed by the default audio output device.
///
/// When no device can be opened the player still exists, but every
/// `prepare` fails with `PlayerError::Output`.
pub struct RodioPlayer {
    stream: Result<OutputStream, String>,
    source: Option<PathBuf>,
    sink: Option<Sink>,
    duration: Option<Duration>,
    /// Position the current sink was built at. `Sink::get_pos` counts from there.
    offset: Duration,
    playing: bool,
}

impl RodioPlayer {
    pub fn open_default() -> Self {
        let stream = match OutputStreamBuilder::open_default_stream() {
            Ok(mut stream) => {
                // rodio prints to stderr on drop, which garbles the terminal UI.
                stream.log_on_drop(false);
                Ok(stream)
            }
            Err(e) => {
                error!(error = %e, "no audio output device; playback is unavailable");
                Err(e.to_string())
            }
        };
        Self {
            stream,
            source: None,
            sink: None,
            duration: None,
            offset: Duration::ZERO,
            playing: false,
        }
    }

    fn output(&self) -> Result<&OutputStream, PlayerError> {
        self.stream
            .as_ref()
            .map_err(|reason| PlayerError::Output(reason.clone()))
    }

    /// Rebuild the sink at `at` for decoders that cannot seek in place.
    fn rebuild_at(&mut self, at: Duration) -> Result<(), PlayerError> {
        let path = self.source.clone().ok_or(PlayerError::NoSource)?;
        let (sink, _) = create_sink_at(self.output()?, &path, at)?;
        if let Some(old) = self.sink.take() {
            old.stop();
        }
        if self.playing {
            sink.play();
        }
        self.sink = Some(sink);
        self.offset = at;
        Ok(())
    }
}

impl Player for RodioPlayer {
    fn reset(&mut self) {
        if let Some(sink) = self.sink.take() {
            sink.stop();
        }
        self.source = None;
        self.duration = None;
        self.offset = Duration::ZERO;
        self.playing = false;
    }

    fn set_source(&mut self, path: &Path) {
        self.source = Some(path.to_path_buf());
    }

    fn prepare(&mut self) -> Result<(), PlayerError> {
        let path = self.source.clone().ok_or(PlayerError::NoSource)?;
        let (sink, duration) = create_sink_at(self.output()?, &path, Duration::ZERO)?;
        if let Some(old) = self.sink.replace(sink) {
            old.stop();
        }
        self.duration = duration;
        self.offset = Duration::ZERO;
        self.playing = false;
        debug!(path = %path.display(), ?duration, "source prepared");
        Ok(())
    }

    fn start(&mut self) {
        if let Some(sink) = &self.sink {
            sink.play();
            self.playing = true;
        }
    }

    fn pause(&mut self) {
        if let Some(sink) = &self.sink {
            sink.pause();
        }
        self.playing = false;
    }

    fn stop(&mut self) {
        if let Some(sink) = &self.sink {
            sink.stop();
        }
        self.playing = false;
    }

    fn seek_to(&mut self, position_ms: u64) -> Result<(), PlayerError> {
        let target = Duration::from_millis(position_ms);
        let Some(sink) = &self.sink else {
            return Err(PlayerError::NoSource);
        };
        match sink.try_seek(target) {
            Ok(()) => {
                self.offset = Duration::ZERO;
                Ok(())
            }
            Err(e) => {
                debug!(error = %e, "in-place seek failed; reopening source");
                self.rebuild_at(target)
            }
        }
    }

    fn position_ms(&self) -> u64 {
        let pos = self
            .sink
            .as_ref()
            .map_or(Duration::ZERO, |s| self.offset + s.get_pos());
        pos.as_millis() as u64
    }

    fn duration_ms(&self) -> u64 {
        self.duration.map_or(0, |d| d.as_millis() as u64)
    }

    fn is_playing(&self) -> bool {
        self.playing && self.sink.as_ref().is_some_and(|s| !s.empty())
    }

    fn take_finished(&mut self) -> bool {
        let drained = self.sink.as_ref().is_some_and(Sink::empty);
        if self.playing && drained {
            self.playing = false;
            return true;
        }
        false
    }

    fn release(&mut self) {
        self.reset();
        self.stream = Err("output released".into());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn without_output() -> RodioPlayer {
        RodioPlayer {
            stream: Err("test has no device".into()),
            source: None,
            sink: None,
            duration: None,
            offset: Duration::ZERO,
            playing: false,
        }
    }

    #[test]
    fn prepare_without_source_fails() {
        let mut player = without_output();
        assert!(matches!(player.prepare(), Err(PlayerError::NoSource)));
    }

    #[test]
    fn prepare_without_device_reports_output_error() {
        let mut player = without_output();
        player.set_source(Path::new("/music/anything.mp3"));
        assert!(matches!(player.prepare(), Err(PlayerError::Output(_))));
        assert_eq!(player.duration_ms(), 0);
    }

    #[test]
    fn idle_player_is_quiet() {
        let mut player = without_output();
        player.start();
        assert!(!player.is_playing());
        assert!(!player.take_finished());
        assert_eq!(player.position_ms(), 0);
        assert!(matches!(player.seek_to(1_000), Err(PlayerError::NoSource)));
    }

    #[test]
    fn reset_forgets_the_source() {
        let mut player = without_output();
        player.set_source(Path::new("/music/anything.mp3"));
        player.reset();
        assert!(matches!(player.prepare(), Err(PlayerError::NoSource)));
    }
}
