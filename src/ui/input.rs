use console::{Key, Term};
use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use tokio::sync::mpsc;
use tracing::{debug, warn};
use crate::core::{Direction, FallSpeed};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputCommand {
    Move(Direction),
    Speed(FallSpeed),
    Quit,
}

pub fn command_for(key: &Key) -> Option<InputCommand> {
    match key {
        Key::ArrowLeft | Key::Char('a') => Some(InputCommand::Move(Direction::Left)),
        Key::ArrowRight | Key::Char('d') => Some(InputCommand::Move(Direction::Right)),
        Key::Char('1') => Some(InputCommand::Speed(FallSpeed::Slow)),
        Key::Char('2') => Some(InputCommand::Speed(FallSpeed::Medium)),
        Key::Char('3') => Some(InputCommand::Speed(FallSpeed::Fast)),
        Key::Char('q') | Key::Char('Q') | Key::Escape => Some(InputCommand::Quit),
        _ => None,
    }
}

/// Reads key presses on a dedicated thread and hands them to async code.
///
/// `Term::read_key` blocks, so the thread can only notice the stop flag
/// after the next key press. [`KeyReader::finish`] consumes that key so
/// later prompts get the terminal to themselves.
pub struct KeyReader {
    receiver: mpsc::UnboundedReceiver<Key>,
    stop: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl KeyReader {
    pub fn spawn(term: Term) -> Self {
        Self::from_source(move || term.read_key())
    }

    /// Read keys from any blocking source, e.g. a scripted one.
    pub fn from_source<F>(mut read_key: F) -> Self
    where
        F: FnMut() -> io::Result<Key> + Send + 'static,
    {
        let (sender, receiver) = mpsc::unbounded_channel();
        let stop = Arc::new(AtomicBool::new(false));
        let stop_flag = Arc::clone(&stop);

        let handle = thread::spawn(move || {
            while !stop_flag.load(Ordering::Relaxed) {
                match read_key() {
                    Ok(key) => {
                        if sender.send(key).is_err() {
                            break;
                        }
                    }
                    Err(e) => {
                        warn!("Key reader stopped: {}", e);
                        break;
                    }
                }
            }
            debug!("Key reader thread exiting");
        });

        Self {
            receiver,
            stop,
            handle: Some(handle),
        }
    }

    /// `None` once the reader thread has stopped.
    pub async fn next_key(&mut self) -> Option<Key> {
        self.receiver.recv().await
    }

    /// Drops buffered keys, waits for one more press and joins the thread.
    pub async fn finish(mut self) -> Option<Key> {
        self.stop.store(true, Ordering::Relaxed);
        while self.receiver.try_recv().is_ok() {}

        let key = self.receiver.recv().await;

        if let Some(handle) = self.handle.take() {
            if let Ok(Err(_)) = tokio::task::spawn_blocking(move || handle.join()).await {
                warn!("Key reader thread panicked");
            }
        }
        key
    }
}

impl Drop for KeyReader {
    /// The thread exits after its next key instead of feeding a dead channel.
    fn drop(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use std::time::Duration;

    fn scripted_keys(reads: Arc<AtomicUsize>) -> impl FnMut() -> io::Result<Key> + Send + 'static {
        move || {
            std::thread::sleep(Duration::from_millis(5));
            reads.fetch_add(1, Ordering::SeqCst);
            Ok(Key::Char('d'))
        }
    }

    #[tokio::test]
    async fn test_reader_forwards_keys() {
        let reads = Arc::new(AtomicUsize::new(0));
        let mut reader = KeyReader::from_source(scripted_keys(Arc::clone(&reads)));

        assert_eq!(reader.next_key().await, Some(Key::Char('d')));
        assert_eq!(reader.finish().await, Some(Key::Char('d')));
    }

    #[tokio::test]
    async fn test_dropped_reader_stops_thread() {
        let reads = Arc::new(AtomicUsize::new(0));
        let source_reads = Arc::clone(&reads);
        let mut reader = KeyReader::from_source(scripted_keys(Arc::clone(&reads)));
        assert!(reader.next_key().await.is_some());

        drop(reader);

        // The thread owns the only other handle; it goes away when the thread exits.
        for _ in 0..200 {
            if Arc::strong_count(&source_reads) == 2 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        assert_eq!(Arc::strong_count(&source_reads), 2);

        let settled = reads.load(Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(reads.load(Ordering::SeqCst), settled);
    }

    #[tokio::test]
    async fn test_reader_ends_on_source_error() {
        let mut reader = KeyReader::from_source(|| Err(io::Error::new(io::ErrorKind::Other, "not a terminal")));

        assert_eq!(reader.next_key().await, None);
        assert_eq!(reader.finish().await, None);
    }

    #[test]
    fn test_movement_keys() {
        assert_eq!(command_for(&Key::ArrowLeft), Some(InputCommand::Move(Direction::Left)));
        assert_eq!(command_for(&Key::ArrowRight), Some(InputCommand::Move(Direction::Right)));
        assert_eq!(command_for(&Key::Char('a')), Some(InputCommand::Move(Direction::Left)));
    }

    #[test]
    fn test_speed_keys() {
        assert_eq!(command_for(&Key::Char('1')), Some(InputCommand::Speed(FallSpeed::Slow)));
        assert_eq!(command_for(&Key::Char('2')), Some(InputCommand::Speed(FallSpeed::Medium)));
        assert_eq!(command_for(&Key::Char('3')), Some(InputCommand::Speed(FallSpeed::Fast)));
    }

    #[test]
    fn test_quit_and_unknown_keys() {
        assert_eq!(command_for(&Key::Escape), Some(InputCommand::Quit));
        assert_eq!(command_for(&Key::Char('q')), Some(InputCommand::Quit));
        assert_eq!(command_for(&Key::Enter), None);
        assert_eq!(command_for(&Key::Char('4')), None);
    }
}
