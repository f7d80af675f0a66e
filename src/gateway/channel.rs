//! The single serial channel handle.

use std::sync::Arc;

use tracing::warn;

use crate::error::LinkError;
use crate::hardware::{LinkOpener, SerialLink};

/// Owns at most one open [`SerialLink`].
///
/// The link is opened lazily and dropped whenever a command cycle fails, so
/// the next command always starts from a fresh open.
pub struct ChannelHandle {
    port: String,
    opener: Arc<dyn LinkOpener>,
    link: Option<Box<dyn SerialLink>>,
    opens: u64,
}

impl ChannelHandle {
    pub fn new(port: impl Into<String>, opener: Arc<dyn LinkOpener>) -> Self {
        Self {
            port: port.into(),
            opener,
            link: None,
            opens: 0,
        }
    }

    /// Device path this handle opens.
    pub fn port(&self) -> &str {
        &self.port
    }

    pub fn is_open(&self) -> bool {
        self.link.as_ref().is_some_and(|link| link.is_open())
    }

    /// Successful opens since construction.
    pub fn open_count(&self) -> u64 {
        self.opens
    }

    /// Return the live link, opening one if there is none.
    ///
    /// A link whose port closed underneath it is replaced, never reused.
    pub async fn ensure_open(&mut self) -> Result<&mut Box<dyn SerialLink>, LinkError> {
        if self.link.as_ref().is_some_and(|link| !link.is_open()) {
            warn!(port = %self.port, "Serial link went away, reopening");
            self.link = None;
        }

        if self.link.is_none() {
            let link = self.opener.open(&self.port).await?;
            self.opens += 1;
            crate::log_component!(
                info,
                "serial",
                "Serial channel open",
                port = self.port.as_str(),
                opens = self.opens
            );
            self.link = Some(link);
        }

        self.link.as_mut().ok_or(LinkError::Closed)
    }

    /// Drop the current link so the next command reopens.
    pub fn invalidate(&mut self) {
        if self.link.take().is_some() {
            crate::log_component!(warn, "serial", "Serial channel invalidated", port = self.port.as_str());
        }
    }

    /// Close and forget the current link.
    pub async fn close(&mut self) -> Result<(), LinkError> {
        match self.link.take() {
            Some(mut link) => link.close().await,
            None => Ok(()),
        }
    }
}

impl std::fmt::Debug for ChannelHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChannelHandle")
            .field("port", &self.port)
            .field("open", &self.is_open())
            .field("opens", &self.opens)
            .finish()
    }
}
