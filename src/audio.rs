//! Audio output capability
//!
//! The playback store only sees [`AudioBackend`] and [`AudioHandle`]. The
//! rodio implementation streams a remote source into a sink on the default
//! output device; without the `audio` feature a backend that refuses every
//! load is used so the catalog can still be browsed.

use anyhow::Result;
use futures::future::BoxFuture;

pub const DEVICE_NAME: &str = "saavn-rs";

/// One loaded audio source, exclusively owned by the playback store.
pub trait AudioHandle: Send + Sync {
    fn pause(&self) -> Result<()>;
    fn resume(&self) -> Result<()>;
    /// True once the source has played to the end
    fn is_finished(&self) -> bool;
    /// Stop output and free the source
    fn release(self: Box<Self>);
}

pub trait AudioBackend: Send + Sync {
    /// Load the source at `url` and start playing it.
    fn create_and_play<'a>(&'a self, url: &'a str) -> BoxFuture<'a, Result<Box<dyn AudioHandle>>>;
}

#[cfg(feature = "audio")]
pub use self::rodio_backend::RodioBackend;

#[cfg(feature = "audio")]
mod rodio_backend {
    use std::io::Cursor;
    use std::time::Duration;

    use anyhow::{Context, Result};
    use futures::future::BoxFuture;
    use futures::FutureExt;
    use rodio::{Decoder, OutputStreamHandle, Sink};

    use super::{AudioBackend, AudioHandle};

    /// Plays remote sources through rodio on an already opened output stream.
    ///
    /// The `OutputStream` itself is not `Send`, so `main` keeps it alive and
    /// only the handle is shared here.
    pub struct RodioBackend {
        stream: OutputStreamHandle,
        http: reqwest::Client,
        volume: f32,
        download_timeout: Duration,
    }

    impl RodioBackend {
        pub fn new(
            stream: OutputStreamHandle,
            http: reqwest::Client,
            volume: f32,
            download_timeout: Duration,
        ) -> Self {
            Self { stream, http, volume, download_timeout }
        }

        async fn load(&self, url: &str) -> Result<Box<dyn AudioHandle>> {
            let bytes = download_source(&self.http, url, self.download_timeout).await?;

            let stream = self.stream.clone();
            let volume = self.volume;
            let sink = tokio::task::spawn_blocking(move || -> Result<Sink> {
                let source = Decoder::new(Cursor::new(bytes))
                    .context("Unsupported audio format")?;
                let sink = Sink::try_new(&stream).context("Audio output unavailable")?;
                sink.set_volume(volume);
                sink.append(source);
                sink.play();
                Ok(sink)
            })
            .await
            .context("Audio decoder task failed")??;

            Ok(Box::new(RodioHandle { sink }))
        }
    }

    /// Fetch a whole source. The timeout covers the body, so a stalled
    /// server fails the load instead of holding the player forever.
    async fn download_source(http: &reqwest::Client, url: &str, timeout: Duration) -> Result<Vec<u8>> {
        tracing::debug!(url, ?timeout, "Fetching audio source");
        let bytes = http
            .get(url)
            .timeout(timeout)
            .send()
            .await
            .context("Audio source request failed")?
            .error_for_status()
            .context("Audio source unavailable")?
            .bytes()
            .await
            .context("Audio source download interrupted")?;
        tracing::debug!(url, size = bytes.len(), "Audio source downloaded");
        Ok(bytes.to_vec())
    }

    impl AudioBackend for RodioBackend {
        fn create_and_play<'a>(&'a self, url: &'a str) -> BoxFuture<'a, Result<Box<dyn AudioHandle>>> {
            self.load(url).boxed()
        }
    }

    struct RodioHandle {
        sink: Sink,
    }

    impl AudioHandle for RodioHandle {
        fn pause(&self) -> Result<()> {
            self.sink.pause();
            Ok(())
        }

        fn resume(&self) -> Result<()> {
            self.sink.play();
            Ok(())
        }

        fn is_finished(&self) -> bool {
            self.sink.empty()
        }

        fn release(self: Box<Self>) {
            self.sink.stop();
        }
    }

    #[cfg(test)]
    mod tests {
        use std::time::Instant;

        use tokio::io::{AsyncReadExt, AsyncWriteExt};
        use tokio::net::TcpListener;

        use super::*;

        /// Serve one response that announces a body and then stops sending.
        async fn stalling_server() -> String {
            let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
            let addr = listener.local_addr().unwrap();
            tokio::spawn(async move {
                let (mut socket, _) = listener.accept().await.unwrap();
                let mut buf = [0u8; 1024];
                let _ = socket.read(&mut buf).await;
                socket
                    .write_all(b"HTTP/1.1 200 OK\r\nContent-Length: 100000\r\n\r\npartial")
                    .await
                    .unwrap();
                tokio::time::sleep(Duration::from_secs(30)).await;
                drop(socket);
            });
            format!("http://{addr}/song.mp4")
        }

        #[tokio::test]
        async fn stalled_download_times_out() {
            let url = stalling_server().await;
            let started = Instant::now();
            let result = download_source(&reqwest::Client::new(), &url, Duration::from_millis(300)).await;
            assert!(result.is_err());
            assert!(started.elapsed() < Duration::from_secs(10));
        }
    }
}

/// Backend used when no output device is available.
pub struct UnavailableBackend {
    reason: String,
}

impl UnavailableBackend {
    pub fn new(reason: impl Into<String>) -> Self {
        Self { reason: reason.into() }
    }
}

impl AudioBackend for UnavailableBackend {
    fn create_and_play<'a>(&'a self, _url: &'a str) -> BoxFuture<'a, Result<Box<dyn AudioHandle>>> {
        let reason = self.reason.clone();
        Box::pin(async move { Err(anyhow::anyhow!("Audio output unavailable: {}", reason)) })
    }
}

#[cfg(test)]
pub(crate) mod fake {
    //! In-memory backend that tracks how many handles are alive at once.

    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    use anyhow::Result;
    use futures::future::BoxFuture;

    use super::{AudioBackend, AudioHandle};

    #[derive(Default)]
    pub struct Meter {
        pub live: AtomicUsize,
        pub max_live: AtomicUsize,
        pub created: AtomicUsize,
        pub fail_next_create: AtomicBool,
        pub fail_control: AtomicBool,
        pub loaded_urls: Mutex<Vec<String>>,
        /// Paused flag of the most recent handle
        pub paused: AtomicBool,
        pub finished: AtomicBool,
    }

    #[derive(Clone, Default)]
    pub struct FakeBackend {
        pub meter: Arc<Meter>,
    }

    impl AudioBackend for FakeBackend {
        fn create_and_play<'a>(&'a self, url: &'a str) -> BoxFuture<'a, Result<Box<dyn AudioHandle>>> {
            let meter = self.meter.clone();
            let url = url.to_string();
            Box::pin(async move {
                tokio::task::yield_now().await;
                if meter.fail_next_create.swap(false, Ordering::SeqCst) {
                    anyhow::bail!("decoder rejected {url}");
                }
                let live = meter.live.fetch_add(1, Ordering::SeqCst) + 1;
                meter.max_live.fetch_max(live, Ordering::SeqCst);
                meter.created.fetch_add(1, Ordering::SeqCst);
                meter.paused.store(false, Ordering::SeqCst);
                meter.finished.store(false, Ordering::SeqCst);
                meter.loaded_urls.lock().unwrap().push(url);
                Ok(Box::new(FakeHandle { meter }) as Box<dyn AudioHandle>)
            })
        }
    }

    struct FakeHandle {
        meter: Arc<Meter>,
    }

    impl AudioHandle for FakeHandle {
        fn pause(&self) -> Result<()> {
            if self.meter.fail_control.load(Ordering::SeqCst) {
                anyhow::bail!("pause failed");
            }
            self.meter.paused.store(true, Ordering::SeqCst);
            Ok(())
        }

        fn resume(&self) -> Result<()> {
            if self.meter.fail_control.load(Ordering::SeqCst) {
                anyhow::bail!("resume failed");
            }
            self.meter.paused.store(false, Ordering::SeqCst);
            Ok(())
        }

        fn is_finished(&self) -> bool {
            self.meter.finished.load(Ordering::SeqCst)
        }

        fn release(self: Box<Self>) {
            self.meter.live.fetch_sub(1, Ordering::SeqCst);
        }
    }
}
