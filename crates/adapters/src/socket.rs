//! Socket transport for the Event Dispatcher (§4.6, §6): one connection per
//! event, to an `AF_UNIX SOCK_STREAM` socket at `KGSM_ROOT/<event_socket_filename>`.

use crate::error::AdapterError;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tokio::net::UnixStream;

#[async_trait]
pub trait SocketTransport: Clone + Send + Sync + 'static {
    /// Write one newline-delimited JSON line and close. "Absent socket is
    /// not an error" (§8 boundary behaviors) — a missing socket file is a
    /// silent success, not an `Err`.
    async fn send_line(&self, socket_path: &Path, line: &str) -> Result<(), AdapterError>;
}

#[derive(Debug, Clone, Default)]
pub struct RealSocketTransport;

#[async_trait]
impl SocketTransport for RealSocketTransport {
    async fn send_line(&self, socket_path: &Path, line: &str) -> Result<(), AdapterError> {
        if !socket_path.exists() {
            return Ok(());
        }

        let mut stream = match UnixStream::connect(socket_path).await {
            Ok(stream) => stream,
            // A stale socket path (no listener) is also a silent success:
            // the dispatcher never blocks orchestration on a dead reader.
            Err(_) => return Ok(()),
        };

        stream.write_all(line.as_bytes()).await?;
        stream.shutdown().await?;
        Ok(())
    }
}

#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeSocketTransport, SocketCall};

#[cfg(any(test, feature = "test-support"))]
mod fake {
    use super::*;
    use parking_lot::Mutex;
    use std::sync::Arc;

    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct SocketCall {
        pub socket_path: PathBuf,
        pub line: String,
    }

    #[derive(Clone, Default)]
    pub struct FakeSocketTransport {
        pub sent: Arc<Mutex<Vec<SocketCall>>>,
    }

    #[async_trait]
    impl SocketTransport for FakeSocketTransport {
        async fn send_line(&self, socket_path: &Path, line: &str) -> Result<(), AdapterError> {
            self.sent.lock().push(SocketCall {
                socket_path: socket_path.to_path_buf(),
                line: line.to_string(),
            });
            Ok(())
        }
    }
}

#[cfg(test)]
#[path = "socket_tests.rs"]
mod tests;
