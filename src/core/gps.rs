//! GPS byte-stream sources
//!
//! Production nodes read the receiver over a serial port; bench rigs and
//! tests feed recorded sentences over TCP. Either way the source is a plain
//! byte stream framed by [`SentenceCodec`] into lines.

use crate::config::GpsSettings;
use crate::core::reader::SentenceCodec;
use std::time::Duration;
use thiserror::Error;
use tokio::io::AsyncRead;
use tokio::net::TcpStream;
use tokio_serial::SerialPortBuilderExt;
use tokio_util::codec::FramedRead;

/// GPS source error types
#[derive(Error, Debug)]
pub enum GpsError {
    /// Serial port could not be opened
    #[error("failed to open serial port {port}: {message}")]
    OpenFailed {
        /// Port name
        port: String,
        /// Underlying error text
        message: String,
    },

    /// TCP feed connection failed
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// TCP feed connection timed out
    #[error("connection timeout after {0} seconds")]
    Timeout(u64),
}

/// A framed stream of sentences from the receiver
pub type SentenceStream = FramedRead<Box<dyn AsyncRead + Send + Unpin>, SentenceCodec>;

/// Frame an arbitrary byte reader into a sentence stream
pub fn sentence_stream<R>(reader: R) -> SentenceStream
where
    R: AsyncRead + Send + Unpin + 'static,
{
    FramedRead::new(Box::new(reader), SentenceCodec::new())
}

/// Open the configured byte-stream source
pub async fn open(settings: &GpsSettings) -> Result<SentenceStream, GpsError> {
    match settings {
        GpsSettings::Serial(cfg) => {
            let stream = tokio_serial::new(cfg.port.as_str(), cfg.baud_rate)
                .open_native_async()
                .map_err(|e| GpsError::OpenFailed {
                    port: cfg.port.clone(),
                    message: e.to_string(),
                })?;
            Ok(sentence_stream(stream))
        }
        GpsSettings::Tcp(cfg) => {
            let addr = format!("{}:{}", cfg.host, cfg.port);
            let stream = tokio::time::timeout(
                Duration::from_secs(cfg.timeout_secs),
                TcpStream::connect(&addr),
            )
            .await
            .map_err(|_| GpsError::Timeout(cfg.timeout_secs))?
            .map_err(|e| GpsError::ConnectionFailed(e.to_string()))?;
            Ok(sentence_stream(stream))
        }
    }
}
