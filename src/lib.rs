//! oggpage - strict Ogg page decoding
//!
//! Decodes one Ogg page at a time from a file, a stream or a byte buffer,
//! telling apart a clean end of stream, a truncated page, a misaligned or
//! foreign source, and plain I/O failure.
//!
//! ```
//! use oggpage::ogg::{decode, PageBuilder, SliceSource};
//!
//! let bytes = PageBuilder::new(1, 0).packet(b"hello").unwrap().build().unwrap();
//! let mut source = SliceSource::new(&bytes);
//! let page = decode(&mut source, false).unwrap();
//! assert_eq!(page.payload(), Some(&b"hello"[..]));
//! assert!(decode(&mut source, false).unwrap_err().is_end_of_stream());
//! ```

pub mod config;
pub mod error;
pub mod loader;
pub mod ogg;
mod utils;

pub use config::{ChecksumPolicy, ScanConfig};
pub use error::{DecodeError, EncodeError, PageSection, ScanError};
pub use loader::{LogLoader, Loader, NoopLoader};
pub use ogg::{decode, Page, PageIndex, PageReader};
