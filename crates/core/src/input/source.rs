//! Raw button samples.
//!
//! A [`RawInput`] yields full button masks, never edges; the hub diffs them.

use std::{
    fs::File,
    io::Read,
    mem,
    path::{Path, PathBuf},
    thread::{self, JoinHandle},
};

use crossbeam_channel::{Receiver, Sender, TryRecvError};

use super::Buttons;

const EV_KEY: u16 = 0x01;

const KEY_UP: u16 = 103;
const KEY_LEFT: u16 = 105;
const KEY_RIGHT: u16 = 106;
const KEY_DOWN: u16 = 108;
const KEY_POWER: u16 = 116;
const BTN_SOUTH: u16 = 304;
const BTN_EAST: u16 = 305;

/// `struct input_event`: a `timeval` (two native longs) then type, code, value.
const EVENT_SIZE: usize = 2 * mem::size_of::<usize>() + 8;

/// Non-blocking producer of full button masks.
pub trait RawInput: Send {
    /// The next pending sample, or `None` when nothing new has arrived.
    fn next_sample(&mut self) -> Option<Buttons>;
}

/// Maps a Linux key code to a device button. The board reports its A button
/// as `BTN_EAST` and B as `BTN_SOUTH`.
pub fn key_to_button(code: u16) -> Option<Buttons> {
    match code {
        KEY_UP => Some(Buttons::UP),
        KEY_DOWN => Some(Buttons::DOWN),
        KEY_LEFT => Some(Buttons::LEFT),
        KEY_RIGHT => Some(Buttons::RIGHT),
        BTN_EAST => Some(Buttons::A),
        BTN_SOUTH => Some(Buttons::B),
        KEY_POWER => Some(Buttons::POWER),
        _ => None,
    }
}

/// Splits a raw `input_event` into `(type, code, value)`.
fn decode_event(raw: &[u8]) -> Option<(u16, u16, i32)> {
    let body = raw.get(EVENT_SIZE - 8..EVENT_SIZE)?;
    let kind = u16::from_ne_bytes([body[0], body[1]]);
    let code = u16::from_ne_bytes([body[2], body[3]]);
    let value = i32::from_ne_bytes([body[4], body[5], body[6], body[7]]);
    Some((kind, code, value))
}

/// Folds one raw event into `mask`. Returns `true` if the mask changed
/// meaning (a press or release of a known button); autorepeat is ignored.
fn apply_event(mask: &mut Buttons, kind: u16, code: u16, value: i32) -> bool {
    if kind != EV_KEY {
        return false;
    }
    let Some(button) = key_to_button(code) else {
        return false;
    };
    match value {
        1 => mask.insert(button),
        0 => mask.remove(button),
        _ => return false,
    }
    true
}

/// Button source backed by a Linux evdev node.
///
/// A reader thread blocks on the device and forwards the full mask after
/// every key event; the hub drains those samples without blocking.
///
/// Dropping the source disconnects the reader. A read already blocked on the
/// device cannot be interrupted, so the thread exits and closes the node when
/// the next event arrives; a reader that has already stopped is joined.
#[derive(Debug)]
pub struct EvdevInput {
    path: PathBuf,
    samples: Receiver<Buttons>,
    reader: Option<JoinHandle<()>>,
}

impl EvdevInput {
    pub fn open(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = File::open(&path)?;
        Self::spawn(path, file)
    }

    /// Starts the reader thread over any stream of raw `input_event`s.
    fn spawn(path: PathBuf, device: impl Read + Send + 'static) -> std::io::Result<Self> {
        let (tx, rx) = crossbeam_channel::unbounded();
        let reader_path = path.clone();
        let reader = thread::Builder::new()
            .name("pager-input".into())
            .spawn(move || read_events(device, tx, &reader_path))?;
        Ok(Self {
            path,
            samples: rx,
            reader: Some(reader),
        })
    }

    /// Opens the first device in `candidates` that can be read.
    pub fn open_first(candidates: &[PathBuf]) -> Option<Self> {
        for path in candidates {
            match Self::open(path) {
                Ok(input) => {
                    tracing::info!(?path, "input device opened");
                    return Some(input);
                }
                Err(err) => tracing::debug!(?path, %err, "input device not usable"),
            }
        }
        tracing::warn!(?candidates, "no input device available, buttons disabled");
        None
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl RawInput for EvdevInput {
    fn next_sample(&mut self) -> Option<Buttons> {
        self.samples.try_recv().ok()
    }
}

impl Drop for EvdevInput {
    fn drop(&mut self) {
        // the reader notices the closed channel on its next send
        drop(mem::replace(&mut self.samples, crossbeam_channel::never()));
        let Some(reader) = self.reader.take() else {
            return;
        };
        if reader.is_finished() {
            if reader.join().is_err() {
                tracing::warn!(path = ?self.path, "input reader panicked");
            }
        } else {
            tracing::debug!(path = ?self.path, "input reader detached until the next event");
        }
    }
}

fn read_events(mut device: impl Read, tx: Sender<Buttons>, path: &Path) {
    let mut raw = [0u8; EVENT_SIZE];
    let mut mask = Buttons::empty();
    loop {
        if let Err(err) = device.read_exact(&mut raw) {
            tracing::warn!(?path, %err, "input device read failed, reader stopping");
            return;
        }
        let Some((kind, code, value)) = decode_event(&raw) else {
            continue;
        };
        if apply_event(&mut mask, kind, code, value) && tx.send(mask).is_err() {
            return;
        }
    }
}

/// Source fed from a channel; used for scripted input and by hosts that
/// read buttons some other way.
#[derive(Debug)]
pub struct ChannelInput {
    samples: Receiver<Buttons>,
}

impl ChannelInput {
    /// Creates the source and the sender that feeds it full masks.
    pub fn new() -> (Sender<Buttons>, Self) {
        let (tx, rx) = crossbeam_channel::unbounded();
        (tx, Self { samples: rx })
    }
}

impl RawInput for ChannelInput {
    fn next_sample(&mut self) -> Option<Buttons> {
        match self.samples.try_recv() {
            Ok(mask) => Some(mask),
            Err(TryRecvError::Empty | TryRecvError::Disconnected) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{io::Write, time::Duration};

    use super::*;

    fn raw_event(kind: u16, code: u16, value: i32) -> Vec<u8> {
        let mut raw = vec![0u8; EVENT_SIZE - 8];
        raw.extend_from_slice(&kind.to_ne_bytes());
        raw.extend_from_slice(&code.to_ne_bytes());
        raw.extend_from_slice(&value.to_ne_bytes());
        raw
    }

    #[test]
    fn decodes_key_events() {
        let raw = raw_event(EV_KEY, KEY_UP, 1);
        assert_eq!(decode_event(&raw), Some((EV_KEY, KEY_UP, 1)));
        assert_eq!(decode_event(&raw[..4]), None);
    }

    #[test]
    fn folds_events_into_a_mask() {
        let mut mask = Buttons::empty();
        assert!(apply_event(&mut mask, EV_KEY, BTN_EAST, 1));
        assert!(apply_event(&mut mask, EV_KEY, KEY_LEFT, 1));
        assert_eq!(mask, Buttons::A | Buttons::LEFT);

        // autorepeat, unknown keys and non-key events are ignored
        assert!(!apply_event(&mut mask, EV_KEY, BTN_EAST, 2));
        assert!(!apply_event(&mut mask, EV_KEY, 30, 1));
        assert!(!apply_event(&mut mask, 0x03, KEY_UP, 1));

        assert!(apply_event(&mut mask, EV_KEY, BTN_EAST, 0));
        assert_eq!(mask, Buttons::LEFT);
    }

    #[test]
    fn face_buttons_use_kernel_codes() {
        assert_eq!(BTN_SOUTH, 0x130);
        assert_eq!(BTN_EAST, 0x131);
        assert_eq!(key_to_button(0x131), Some(Buttons::A));
        assert_eq!(key_to_button(0x130), Some(Buttons::B));
        assert_eq!(key_to_button(KEY_POWER), Some(Buttons::POWER));
    }

    /// Event stream that blocks until the test hands it bytes and reports
    /// when the reader releases it.
    struct BlockingDevice {
        chunks: Receiver<Vec<u8>>,
        pending: Vec<u8>,
        released: Sender<()>,
    }

    impl Read for BlockingDevice {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            if self.pending.is_empty() {
                match self.chunks.recv() {
                    Ok(chunk) => self.pending = chunk,
                    Err(_) => return Ok(0),
                }
            }
            let n = buf.len().min(self.pending.len());
            buf[..n].copy_from_slice(&self.pending[..n]);
            self.pending.drain(..n);
            Ok(n)
        }
    }

    impl Drop for BlockingDevice {
        fn drop(&mut self) {
            let _ = self.released.send(());
        }
    }

    #[test]
    fn dropped_source_releases_the_device_on_the_next_event() {
        let (chunks_tx, chunks) = crossbeam_channel::unbounded();
        let (released_tx, released) = crossbeam_channel::unbounded();
        let device = BlockingDevice {
            chunks,
            pending: Vec::new(),
            released: released_tx,
        };
        let input = EvdevInput::spawn(PathBuf::from("scripted"), device).unwrap();

        chunks_tx.send(raw_event(EV_KEY, KEY_UP, 1)).unwrap();
        assert_eq!(
            input.samples.recv_timeout(Duration::from_secs(2)).unwrap(),
            Buttons::UP
        );
        drop(input);
        assert!(released.try_recv().is_err());

        chunks_tx.send(raw_event(EV_KEY, KEY_UP, 0)).unwrap();
        assert!(released.recv_timeout(Duration::from_secs(2)).is_ok());
    }

    #[test]
    fn reader_stops_at_end_of_stream() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let mut input = EvdevInput::open(file.path()).unwrap();
        // an empty file ends the reader immediately
        let reader = input.reader.take().unwrap();
        reader.join().unwrap();
        assert_eq!(input.next_sample(), None);
    }

    #[test]
    fn reads_an_event_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(&raw_event(EV_KEY, KEY_POWER, 1)).unwrap();
        file.write_all(&raw_event(0x00, 0, 0)).unwrap();
        file.write_all(&raw_event(EV_KEY, KEY_POWER, 0)).unwrap();
        file.flush().unwrap();

        let input = EvdevInput::open(file.path()).unwrap();
        let first = input.samples.recv_timeout(Duration::from_secs(2)).unwrap();
        let second = input.samples.recv_timeout(Duration::from_secs(2)).unwrap();
        assert_eq!(first, Buttons::POWER);
        assert_eq!(second, Buttons::empty());
    }

    #[test]
    fn open_first_skips_missing_nodes() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let candidates = vec![PathBuf::from("/nonexistent/event9"), file.path().to_path_buf()];
        let input = EvdevInput::open_first(&candidates).unwrap();
        assert_eq!(input.path(), file.path());
        assert!(EvdevInput::open_first(&candidates[..1]).is_none());
    }

    #[test]
    fn channel_source_is_non_blocking() {
        let (tx, mut input) = ChannelInput::new();
        assert_eq!(input.next_sample(), None);
        tx.send(Buttons::B).unwrap();
        assert_eq!(input.next_sample(), Some(Buttons::B));
        drop(tx);
        assert_eq!(input.next_sample(), None);
    }
}
