//! rodio-backed output running on its own thread
//!
//! The thread owns the `OutputStream` and the current `Sink`. Commands arrive
//! over a std channel and are handled strictly in order. Audio bytes are
//! fetched on the tokio runtime and posted back to the same channel, so a
//! fetch that finishes after a newer load is recognised by its generation and
//! dropped.

use std::io::Cursor;
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::thread;
use std::time::Duration;

use rodio::{Decoder, OutputStream, OutputStreamBuilder, Sink, Source};
use tokio::runtime::Handle;
use tokio::sync::mpsc::UnboundedSender;

use super::{AudioOutput, OutputEvent, OutputEventKind};
use crate::model::ApiClient;

const TICK: Duration = Duration::from_millis(200);

#[derive(Debug)]
enum AudioCmd {
    Load { source: String, generation: u64 },
    Fetched { generation: u64, result: Result<Vec<u8>, String> },
    Play,
    Pause,
    Seek(Duration),
    Volume(f32),
    Stop,
    Quit,
}

pub struct RodioOutput {
    tx: Sender<AudioCmd>,
}

impl RodioOutput {
    /// Spawns the audio thread. A missing output device is not fatal: every
    /// load then reports an error event instead.
    pub fn spawn(
        api: ApiClient,
        runtime: Handle,
        events: UnboundedSender<OutputEvent>,
        volume: f32,
    ) -> anyhow::Result<Self> {
        let (tx, rx) = mpsc::channel::<AudioCmd>();
        let fetch_tx = tx.clone();

        thread::Builder::new()
            .name("audio".to_string())
            .spawn(move || {
                let stream = match OutputStreamBuilder::open_default_stream() {
                    Ok(mut stream) => {
                        // rodio logs to stderr on drop, which would scribble over the TUI
                        stream.log_on_drop(false);
                        Some(stream)
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "No audio output device");
                        None
                    }
                };
                let mut worker = Worker {
                    stream,
                    sink: None,
                    bytes: None,
                    generation: 0,
                    want_playing: false,
                    started: false,
                    volume,
                    api,
                    runtime,
                    fetch_tx,
                    events,
                };
                loop {
                    match rx.recv_timeout(TICK) {
                        Ok(AudioCmd::Quit) => break,
                        Ok(cmd) => worker.handle(cmd),
                        Err(RecvTimeoutError::Timeout) => worker.tick(),
                        Err(RecvTimeoutError::Disconnected) => break,
                    }
                }
                if let Some(sink) = worker.sink.take() {
                    sink.stop();
                }
                tracing::debug!("Audio thread exiting");
            })?;

        Ok(Self { tx })
    }

    fn send(&self, cmd: AudioCmd) {
        if let Err(e) = self.tx.send(cmd) {
            tracing::warn!(error = %e, "Audio thread is gone");
        }
    }

    pub fn shutdown(&self) {
        self.send(AudioCmd::Quit);
    }
}

impl AudioOutput for RodioOutput {
    fn load(&self, source: &str, generation: u64) {
        self.send(AudioCmd::Load {
            source: source.to_string(),
            generation,
        });
    }

    fn play(&self) {
        self.send(AudioCmd::Play);
    }

    fn pause(&self) {
        self.send(AudioCmd::Pause);
    }

    fn seek(&self, position: Duration) {
        self.send(AudioCmd::Seek(position));
    }

    fn set_volume(&self, volume: f32) {
        self.send(AudioCmd::Volume(volume));
    }

    fn stop(&self) {
        self.send(AudioCmd::Stop);
    }
}

struct Worker {
    stream: Option<OutputStream>,
    sink: Option<Sink>,
    /// Encoded audio of the current load, kept to rebuild the sink after it drains
    bytes: Option<Vec<u8>>,
    generation: u64,
    want_playing: bool,
    started: bool,
    volume: f32,
    api: ApiClient,
    runtime: Handle,
    fetch_tx: Sender<AudioCmd>,
    events: UnboundedSender<OutputEvent>,
}

impl Worker {
    fn emit(&self, kind: OutputEventKind) {
        let _ = self.events.send(OutputEvent::new(self.generation, kind));
    }

    fn handle(&mut self, cmd: AudioCmd) {
        match cmd {
            AudioCmd::Load { source, generation } => self.load(source, generation),
            AudioCmd::Fetched { generation, result } => {
                if generation != self.generation {
                    tracing::debug!(generation, current = self.generation, "Dropping stale audio fetch");
                    return;
                }
                match result {
                    Ok(bytes) => self.install(bytes, Duration::ZERO),
                    Err(e) => self.emit(OutputEventKind::Error(e)),
                }
            }
            AudioCmd::Play => {
                self.want_playing = true;
                if let Some(sink) = &self.sink {
                    if sink.empty() {
                        self.rebuild(Duration::ZERO);
                    }
                    if let Some(sink) = &self.sink {
                        sink.play();
                    }
                    self.mark_started();
                }
            }
            AudioCmd::Pause => {
                self.want_playing = false;
                if let Some(sink) = &self.sink {
                    sink.pause();
                }
            }
            AudioCmd::Seek(position) => self.seek(position),
            AudioCmd::Volume(volume) => {
                self.volume = volume;
                if let Some(sink) = &self.sink {
                    sink.set_volume(volume);
                }
            }
            AudioCmd::Stop => {
                if let Some(sink) = self.sink.take() {
                    sink.stop();
                }
                self.bytes = None;
                self.want_playing = false;
                self.started = false;
            }
            AudioCmd::Quit => {}
        }
    }

    fn load(&mut self, source: String, generation: u64) {
        if let Some(sink) = self.sink.take() {
            sink.stop();
        }
        self.bytes = None;
        self.generation = generation;
        self.want_playing = false;
        self.started = false;

        if source.trim().is_empty() {
            self.emit(OutputEventKind::Error("Track has no audio source".to_string()));
            return;
        }
        if self.stream.is_none() {
            self.emit(OutputEventKind::Error("No audio output device".to_string()));
            return;
        }

        tracing::debug!(generation, source = %source, "Fetching audio");
        let api = self.api.clone();
        let tx = self.fetch_tx.clone();
        self.runtime.spawn(async move {
            let result = api.fetch_bytes(&source).await.map_err(|e| e.to_string());
            let _ = tx.send(AudioCmd::Fetched { generation, result });
        });
    }

    /// Decodes `bytes` into a fresh sink positioned at `start_at`
    fn install(&mut self, bytes: Vec<u8>, start_at: Duration) {
        let Some(stream) = &self.stream else {
            return;
        };
        let decoder = match Decoder::new(Cursor::new(bytes.clone())) {
            Ok(decoder) => decoder,
            Err(e) => {
                self.emit(OutputEventKind::Error(format!("Unsupported audio: {}", e)));
                return;
            }
        };
        if let Some(total) = decoder.total_duration() {
            self.emit(OutputEventKind::DurationChange(total));
        }

        let sink = Sink::connect_new(stream.mixer());
        sink.set_volume(self.volume);
        sink.append(decoder);
        if !start_at.is_zero()
            && let Err(e) = sink.try_seek(start_at)
        {
            tracing::warn!(error = %e, "Seek failed");
        }
        if self.want_playing {
            sink.play();
        } else {
            sink.pause();
        }
        self.sink = Some(sink);
        self.bytes = Some(bytes);
        if self.want_playing {
            self.mark_started();
        }
    }

    fn rebuild(&mut self, start_at: Duration) {
        if let Some(bytes) = self.bytes.take() {
            if let Some(sink) = self.sink.take() {
                sink.stop();
            }
            self.install(bytes, start_at);
        }
    }

    fn seek(&mut self, position: Duration) {
        let Some(sink) = &self.sink else {
            return;
        };
        if sink.empty() {
            self.rebuild(position);
            return;
        }
        if let Err(e) = sink.try_seek(position) {
            tracing::warn!(error = %e, "Seek failed");
        }
    }

    fn mark_started(&mut self) {
        if !self.started {
            self.started = true;
            self.emit(OutputEventKind::Started);
        }
    }

    fn tick(&mut self) {
        if !self.want_playing {
            return;
        }
        let Some(sink) = &self.sink else {
            return;
        };
        if sink.empty() {
            self.want_playing = false;
            self.emit(OutputEventKind::Ended);
        } else {
            self.emit(OutputEventKind::TimeUpdate(sink.get_pos()));
        }
    }
}
