// Seek-table construction
//
// Scans a source with payloads skipped and records where every page sits,
// which logical stream it belongs to and how far into that stream it is.

use std::collections::BTreeMap;

use log::debug;
use serde::Serialize;

use crate::config::ScanConfig;
use crate::error::ScanError;
use crate::loader::Loader;
use crate::ogg::page::{HeaderFlags, Page};
use crate::ogg::reader::PageReader;
use crate::ogg::source::PageSource;

/// Location and identity of one page
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IndexEntry {
    pub offset: u64,
    pub stream_serial: u32,
    pub sequence_number: u32,
    pub granule_position: i64,
    pub wire_length: u64,
    pub flags: HeaderFlags,
}

impl IndexEntry {
    fn from_page(offset: u64, page: &Page) -> Self {
        IndexEntry {
            offset,
            stream_serial: page.stream_serial(),
            sequence_number: page.sequence_number(),
            granule_position: page.granule_position(),
            wire_length: page.wire_length(),
            flags: page.flags(),
        }
    }
}

/// Per-stream totals gathered from the index
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StreamSummary {
    pub stream_serial: u32,
    pub pages: u64,
    pub bytes: u64,
    pub first_granule: Option<i64>,
    pub last_granule: Option<i64>,
    pub has_bos: bool,
    pub has_eos: bool,
}

/// A jump in a stream's page sequence numbers, i.e. lost pages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SequenceGap {
    pub stream_serial: u32,
    pub expected: u32,
    pub found: u32,
    pub offset: u64,
}

/// Every page of a physical stream, in file order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PageIndex {
    entries: Vec<IndexEntry>,
}

impl PageIndex {
    /// Scan `source` to its end. Payloads are never read, whatever
    /// `config.skip_payload` says.
    pub fn build<S: PageSource>(
        source: S,
        config: &ScanConfig,
        loader: Option<Box<dyn Loader>>,
    ) -> Result<Self, ScanError> {
        let config = config.clone().skip_payload(true);
        let mut reader = PageReader::new(source, config);
        if let Some(loader) = loader {
            reader = reader.with_loader(loader);
        }

        let mut index = PageIndex::default();
        let mut offset = reader.position()?;
        while let Some(page) = reader.next_page()? {
            index.entries.push(IndexEntry::from_page(offset, &page));
            offset += page.wire_length();
        }

        debug!(
            "indexed {} pages across {} streams",
            index.entries.len(),
            index.serials().len()
        );
        Ok(index)
    }

    pub fn entries(&self) -> &[IndexEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sum of all page wire lengths
    pub fn total_bytes(&self) -> u64 {
        self.entries.iter().map(|e| e.wire_length).sum()
    }

    /// Distinct stream serial numbers in order of first appearance
    pub fn serials(&self) -> Vec<u32> {
        let mut serials = Vec::new();
        for entry in &self.entries {
            if !serials.contains(&entry.stream_serial) {
                serials.push(entry.stream_serial);
            }
        }
        serials
    }

    /// Pages belonging to one logical stream
    pub fn stream(&self, serial: u32) -> impl Iterator<Item = &IndexEntry> + '_ {
        self.entries.iter().filter(move |e| e.stream_serial == serial)
    }

    /// Totals for every logical stream, ordered by serial number
    pub fn streams(&self) -> Vec<StreamSummary> {
        let mut summaries: BTreeMap<u32, StreamSummary> = BTreeMap::new();
        for entry in &self.entries {
            let summary = summaries
                .entry(entry.stream_serial)
                .or_insert_with(|| StreamSummary {
                    stream_serial: entry.stream_serial,
                    pages: 0,
                    bytes: 0,
                    first_granule: None,
                    last_granule: None,
                    has_bos: false,
                    has_eos: false,
                });
            summary.pages += 1;
            summary.bytes += entry.wire_length;
            summary.has_bos |= entry.flags.is_bos();
            summary.has_eos |= entry.flags.is_eos();
            if entry.granule_position != -1 {
                summary.first_granule.get_or_insert(entry.granule_position);
                summary.last_granule = Some(entry.granule_position);
            }
        }
        summaries.into_values().collect()
    }

    /// Places where a stream's sequence number does not follow on from the
    /// previous page of the same stream
    pub fn sequence_gaps(&self) -> Vec<SequenceGap> {
        let mut last: BTreeMap<u32, u32> = BTreeMap::new();
        let mut gaps = Vec::new();
        for entry in &self.entries {
            if let Some(previous) = last.insert(entry.stream_serial, entry.sequence_number) {
                let expected = previous.wrapping_add(1);
                if entry.sequence_number != expected {
                    gaps.push(SequenceGap {
                        stream_serial: entry.stream_serial,
                        expected,
                        found: entry.sequence_number,
                        offset: entry.offset,
                    });
                }
            }
        }
        gaps
    }

    /// Last page of `serial` whose granule position is at or before `granule`
    pub fn page_before(&self, serial: u32, granule: i64) -> Option<&IndexEntry> {
        self.stream(serial)
            .filter(|e| e.granule_position != -1 && e.granule_position <= granule)
            .last()
    }
}
