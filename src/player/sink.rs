//! Opening a file and wiring it into a paused `rodio` sink.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::time::Duration;

use lofty::prelude::AudioFile;
use rodio::{Decoder, OutputStream, Sink, Source};

use crate::error::PlayerError;

/// A paused sink for `path` starting `start_at` into the file, plus the
/// file's total length when the decoder or the tags know it.
pub(super) fn create_sink_at(
    stream: &OutputStream,
    path: &Path,
    start_at: Duration,
) -> Result<(Sink, Option<Duration>), PlayerError> {
    let file = File::open(path).map_err(|source| PlayerError::Open {
        path: path.to_path_buf(),
        source,
    })?;

    let decoder = Decoder::new(BufReader::new(file)).map_err(|source| PlayerError::Decode {
        path: path.to_path_buf(),
        source,
    })?;
    let total = decoder.total_duration().or_else(|| probe_duration(path));

    let sink = Sink::connect_new(stream.mixer());
    sink.append(decoder.skip_duration(start_at));
    sink.pause();
    Ok((sink, total))
}

fn probe_duration(path: &Path) -> Option<Duration> {
    lofty::read_from_path(path)
        .ok()
        .map(|tagged| tagged.properties().duration())
        .filter(|d| !d.is_zero())
}
