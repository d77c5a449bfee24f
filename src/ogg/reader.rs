// Page-by-page scan loop over a source

use log::{debug, warn};

use crate::config::{ChecksumPolicy, ScanConfig};
use crate::error::{DecodeError, PageSection, ScanError};
use crate::loader::Loader;
use crate::ogg::decoder::decode;
use crate::ogg::page::{ChecksumStatus, Page};
use crate::ogg::source::PageSource;

/// Repeatedly decodes pages from one source.
///
/// In skip mode the reader moves the source past each payload itself, so
/// stream sources stay aligned to page boundaries. After the end of the
/// stream or any error the reader yields nothing more.
pub struct PageReader<S> {
    source: S,
    config: ScanConfig,
    loader: Option<Box<dyn Loader>>,
    pages_read: u64,
    bytes_read: u64,
    finished: bool,
}

impl<S: PageSource> PageReader<S> {
    pub fn new(source: S, config: ScanConfig) -> Self {
        PageReader {
            source,
            config,
            loader: None,
            pages_read: 0,
            bytes_read: 0,
            finished: false,
        }
    }

    /// Report progress every `progress_interval` pages
    pub fn with_loader(mut self, loader: Box<dyn Loader>) -> Self {
        self.loader = Some(loader);
        self
    }

    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    pub fn pages_read(&self) -> u64 {
        self.pages_read
    }

    /// Wire bytes of every page returned so far
    pub fn bytes_read(&self) -> u64 {
        self.bytes_read
    }

    /// Cursor position of the underlying source
    pub fn position(&mut self) -> std::io::Result<u64> {
        self.source.position()
    }

    pub fn into_inner(self) -> S {
        self.source
    }

    /// Next page, or `None` once the source is cleanly exhausted
    pub fn next_page(&mut self) -> Result<Option<Page>, ScanError> {
        if self.finished {
            return Ok(None);
        }
        match self.read_one() {
            Ok(page) => Ok(Some(page)),
            Err(ScanError::Decode(DecodeError::StreamExhausted)) => {
                self.finished = true;
                debug!("end of stream after {} pages", self.pages_read);
                self.report(&format!("Read {} pages", self.pages_read));
                Ok(None)
            }
            Err(e) => {
                self.finished = true;
                Err(e)
            }
        }
    }

    fn read_one(&mut self) -> Result<Page, ScanError> {
        let page = decode(&mut self.source, self.config.skip_payload)?;

        if self.config.skip_payload {
            let expected = page.total_length() as u64;
            let skipped = self.source.skip(expected)?;
            if skipped < expected {
                return Err(DecodeError::Truncated {
                    section: PageSection::Payload,
                    expected: expected as usize,
                    available: skipped as usize,
                }
                .into());
            }
        }

        self.check(&page)?;

        self.pages_read += 1;
        self.bytes_read += page.wire_length();
        let interval = self.config.progress_interval;
        if interval > 0 && self.pages_read % interval == 0 {
            self.report(&format!("Read {} pages", self.pages_read));
        }
        Ok(page)
    }

    fn check(&self, page: &Page) -> Result<(), ScanError> {
        if self.config.checksum_policy == ChecksumPolicy::Ignore {
            return Ok(());
        }
        match page.verify_checksum() {
            ChecksumStatus::Valid | ChecksumStatus::Unavailable => Ok(()),
            ChecksumStatus::Mismatch { stored, computed } => {
                if self.config.checksum_policy == ChecksumPolicy::Reject {
                    return Err(ScanError::ChecksumMismatch {
                        sequence: page.sequence_number(),
                        stored,
                        computed,
                    });
                }
                warn!(
                    "checksum mismatch on page {} of stream {:08x}: stored {:08x}, computed {:08x}",
                    page.sequence_number(),
                    page.stream_serial(),
                    stored,
                    computed
                );
                Ok(())
            }
        }
    }

    fn report(&mut self, message: &str) {
        if let Some(loader) = self.loader.as_mut() {
            loader.set_message(message);
        }
    }
}

impl<S: PageSource> Iterator for PageReader<S> {
    type Item = Result<Page, ScanError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_page().transpose()
    }
}

impl<S: PageSource> std::iter::FusedIterator for PageReader<S> {}
