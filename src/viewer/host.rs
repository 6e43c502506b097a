//! Host-delegated capabilities: download, print, clipboard

/// Errors from host-delegated actions
#[derive(Debug, thiserror::Error)]
pub enum HostError {
    #[error("clipboard unavailable: {0}")]
    Clipboard(String),

    #[error("could not hand off to system handler: {0}")]
    Launch(String),
}

/// Capabilities the session delegates to its host.
///
/// The session never fetches bytes, prints, or touches the clipboard
/// itself; it routes those requests here with the current document URL
/// or extracted text.
pub trait ViewerHost {
    /// Fetch/save the raw document bytes
    fn download(&mut self, url: &str) -> Result<(), HostError>;

    /// Print the document
    fn print(&mut self, url: &str) -> Result<(), HostError>;

    /// Put text on the clipboard
    fn copy_text(&mut self, text: &str) -> Result<(), HostError>;
}

/// Desktop host: hands documents to the system handler and uses the
/// system clipboard.
///
/// The clipboard connection is opened on first use; some environments
/// (headless sessions) have none.
#[derive(Default)]
pub struct DesktopHost {
    clipboard: Option<arboard::Clipboard>,
}

impl DesktopHost {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl ViewerHost for DesktopHost {
    fn download(&mut self, url: &str) -> Result<(), HostError> {
        log::debug!("handing document to system handler: {url}");
        open::that(url).map_err(|e| HostError::Launch(e.to_string()))
    }

    fn print(&mut self, url: &str) -> Result<(), HostError> {
        // No portable print API; the system viewer owns the print dialog
        log::debug!("opening document for printing: {url}");
        open::that(url).map_err(|e| HostError::Launch(e.to_string()))
    }

    fn copy_text(&mut self, text: &str) -> Result<(), HostError> {
        if self.clipboard.is_none() {
            self.clipboard = Some(
                arboard::Clipboard::new().map_err(|e| HostError::Clipboard(e.to_string()))?,
            );
        }

        match self.clipboard.as_mut() {
            Some(clipboard) => clipboard
                .set_text(text)
                .map_err(|e| HostError::Clipboard(e.to_string())),
            None => Err(HostError::Clipboard("no clipboard connection".to_string())),
        }
    }
}

/// Host that ignores every request
#[derive(Clone, Copy, Debug, Default)]
pub struct NullHost;

impl ViewerHost for NullHost {
    fn download(&mut self, _url: &str) -> Result<(), HostError> {
        Ok(())
    }

    fn print(&mut self, _url: &str) -> Result<(), HostError> {
        Ok(())
    }

    fn copy_text(&mut self, _text: &str) -> Result<(), HostError> {
        Ok(())
    }
}
