// CLI command implementations
use anyhow::{bail, Context, Result};
use base64::Engine;
use chrono::{DateTime, Utc};
use serde_json::{json, Value};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use oggpage::ogg::{ChecksumStatus, FileSource, PageIndex, PageReader, PageSource, StreamSource};
use oggpage::{LogLoader, Page, ScanConfig};

use crate::cli::output::OutputFormatter;

/// Open the output target, stdout when no path is given
fn open_writer(output: Option<&str>) -> Result<Box<dyn Write>> {
    match output {
        Some(path) => {
            let file = File::create(path).with_context(|| format!("cannot create {}", path))?;
            Ok(Box::new(BufWriter::new(file)))
        }
        None => Ok(Box::new(io::stdout())),
    }
}

/// Run `f` against a source for `path`; "-" means standard input
fn with_source<T>(path: &str, f: impl FnOnce(&mut dyn PageSource) -> Result<T>) -> Result<T> {
    if path == "-" {
        let stdin = io::stdin();
        let mut source = StreamSource::new(stdin.lock());
        f(&mut source)
    } else {
        let mut source = FileSource::open(path).with_context(|| format!("cannot open {}", path))?;
        f(&mut source)
    }
}

fn page_json(page: &Page, offset: u64, include_payload: bool) -> Result<Value> {
    let mut value = serde_json::to_value(page)?;
    if let Value::Object(map) = &mut value {
        map.insert("offset".to_string(), json!(offset));
        map.insert("wire_length".to_string(), json!(page.wire_length()));
        map.insert("continued".to_string(), json!(page.is_continued()));
        map.insert("bos".to_string(), json!(page.is_bos()));
        map.insert("eos".to_string(), json!(page.is_eos()));
        map.insert("packets".to_string(), json!(page.packet_count()));
        if include_payload {
            let encoded = page
                .payload()
                .map(|p| base64::engine::general_purpose::STANDARD.encode(p));
            map.insert("payload".to_string(), json!(encoded));
        }
    }
    Ok(value)
}

/// List every page of each file
pub fn command_pages(
    files: &[String],
    include_payload: bool,
    output: Option<&str>,
    config: &ScanConfig,
    formatter: &OutputFormatter,
) -> Result<()> {
    let mut writer = open_writer(output)?;
    let config = if include_payload {
        config.clone().skip_payload(false)
    } else {
        config.clone()
    };

    for file_path in files {
        let result = with_source(file_path, |source| {
            let mut reader = PageReader::new(source, config.clone());
            let mut pages = Vec::new();
            let mut offset = reader.position()?;
            while let Some(page) = reader.next_page()? {
                pages.push(page_json(&page, offset, include_payload)?);
                offset += page.wire_length();
            }
            Ok(pages)
        });

        match result {
            Ok(pages) => {
                formatter.output_value(&Value::Array(pages), &mut *writer)?;
            }
            Err(e) => formatter.print_error(&format!("{}: {:#}", file_path, e)),
        }
    }

    writer.flush()?;
    Ok(())
}

fn index_json(file_path: &str, index: &PageIndex) -> Value {
    json!({
        "file": file_path,
        "scanned_at": Utc::now().to_rfc3339(),
        "pages": index.len(),
        "total_bytes": index.total_bytes(),
        "streams": index.streams(),
        "sequence_gaps": index.sequence_gaps(),
        "entries": index.entries(),
    })
}

fn build_index(file_path: &str, config: &ScanConfig, formatter: &OutputFormatter) -> Result<PageIndex> {
    with_source(file_path, |source| {
        let loader: Option<Box<dyn oggpage::Loader>> = if formatter.quiet {
            None
        } else {
            Some(Box::new(LogLoader))
        };
        Ok(PageIndex::build(source, config, loader)?)
    })
}

/// Build and print a seek index for each file
pub fn command_index(
    files: &[String],
    output: Option<&str>,
    config: &ScanConfig,
    formatter: &OutputFormatter,
) -> Result<()> {
    let mut writer = open_writer(output)?;

    for file_path in files {
        match build_index(file_path, config, formatter) {
            Ok(index) => {
                formatter.output_value(&index_json(file_path, &index), &mut *writer)?;
            }
            Err(e) => formatter.print_error(&format!("{}: {:#}", file_path, e)),
        }
    }

    writer.flush()?;
    Ok(())
}

/// Verify page checksums; fails if any page does not match
pub fn command_verify(files: &[String], config: &ScanConfig, formatter: &OutputFormatter) -> Result<()> {
    // Payloads are needed to hash the pages
    let config = config.clone().skip_payload(false);
    let mut failures = 0usize;

    for file_path in files {
        let result = with_source(file_path, |source| {
            let mut bad = Vec::new();
            let mut count = 0u64;
            for page in PageReader::new(source, config.clone()) {
                let page = page?;
                count += 1;
                if let ChecksumStatus::Mismatch { stored, computed } = page.verify_checksum() {
                    bad.push(format!(
                        "page {} of stream {:08x}: stored {:08x}, computed {:08x}",
                        page.sequence_number(),
                        page.stream_serial(),
                        stored,
                        computed
                    ));
                }
            }
            Ok((count, bad))
        });

        match result {
            Ok((count, bad)) if bad.is_empty() => {
                formatter.print_success(&format!("{}: {} pages OK", file_path, count));
            }
            Ok((count, bad)) => {
                failures += bad.len();
                formatter.print_error(&format!("{}: {} of {} pages failed", file_path, bad.len(), count));
                for line in bad {
                    formatter.print_error(&format!("  {}", line));
                }
            }
            Err(e) => {
                failures += 1;
                formatter.print_error(&format!("{}: {:#}", file_path, e));
            }
        }
    }

    if failures > 0 {
        bail!("{} checksum or decode failures", failures);
    }
    Ok(())
}

fn modified_time(path: &Path) -> Option<String> {
    let modified = std::fs::metadata(path).ok()?.modified().ok()?;
    let datetime: DateTime<Utc> = modified.into();
    Some(datetime.format("%Y-%m-%d %H:%M:%S UTC").to_string())
}

/// Batch process directory
pub fn command_batch(
    directory: &str,
    pattern: &str,
    config: &ScanConfig,
    formatter: &OutputFormatter,
) -> Result<()> {
    use glob::glob;

    // Build glob pattern
    let glob_pattern = if pattern.contains('*') || pattern.contains('?') {
        format!("{}/{}", directory, pattern)
    } else {
        format!("{}/**/{}", directory, pattern)
    };

    // Find matching files
    let mut files: Vec<String> = Vec::new();
    for entry in glob(&glob_pattern).with_context(|| format!("invalid glob pattern {}", glob_pattern))? {
        match entry {
            Ok(path) => {
                if path.is_file() {
                    if let Some(path_str) = path.to_str() {
                        files.push(path_str.to_string());
                    }
                }
            }
            Err(e) => {
                formatter.print_error(&format!("Error reading path: {}", e));
            }
        }
    }

    let total = files.len();
    if total == 0 {
        formatter.print_info("No files found matching pattern");
        return Ok(());
    }
    formatter.print_info(&format!("Processing {} files...", total));

    let mut summaries = Vec::new();
    let mut error_count = 0;
    for (index, file_path) in files.iter().enumerate() {
        log::debug!("[{}/{}] {}", index + 1, total, file_path);
        match build_index(file_path, config, formatter) {
            Ok(page_index) => {
                summaries.push(json!({
                    "file": file_path,
                    "modified": modified_time(Path::new(file_path)),
                    "pages": page_index.len(),
                    "streams": page_index.serials().len(),
                    "gaps": page_index.sequence_gaps().len(),
                    "bytes": page_index.total_bytes(),
                }));
            }
            Err(e) => {
                error_count += 1;
                formatter.print_error(&format!("{}: {:#}", file_path, e));
            }
        }
    }

    let mut stdout = io::stdout();
    formatter.output_value(&Value::Array(summaries), &mut stdout)?;
    formatter.print_info(&format!("Completed: {} successful, {} errors", total - error_count, error_count));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::config::OutputFormat;
    use oggpage::ogg::{HeaderFlags, PageBuilder};

    fn write_ogg(dir: &Path, name: &str, corrupt: bool) -> String {
        let mut bytes = PageBuilder::new(5, 0)
            .flags(HeaderFlags::default().with_bos(true))
            .packet(b"header packet")
            .unwrap()
            .build()
            .unwrap();
        bytes.extend(PageBuilder::new(5, 1).granule_position(480).packet(&[1u8; 400]).unwrap().build().unwrap());
        if corrupt {
            let last = bytes.len() - 1;
            bytes[last] ^= 1;
        }
        let path = dir.join(name);
        File::create(&path).unwrap().write_all(&bytes).unwrap();
        path.to_str().unwrap().to_string()
    }

    #[test]
    fn test_pages_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_ogg(dir.path(), "a.ogg", false);
        let output = dir.path().join("pages.json");
        let formatter = OutputFormatter::new(OutputFormat::Json, true);

        command_pages(&[input], true, output.to_str(), &ScanConfig::default(), &formatter).unwrap();

        let text = std::fs::read_to_string(&output).unwrap();
        let pages: Value = serde_json::from_str(text.trim()).unwrap();
        let pages = pages.as_array().unwrap();
        assert_eq!(pages.len(), 2);
        assert_eq!(pages[0]["bos"], json!(true));
        assert_eq!(pages[0]["offset"], json!(0));
        assert_eq!(pages[1]["offset"], pages[0]["wire_length"]);
        assert_eq!(pages[1]["granule_position"], json!(480));
        assert_eq!(pages[0]["payload"], json!("aGVhZGVyIHBhY2tldA=="));
    }

    #[test]
    fn test_index_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_ogg(dir.path(), "a.ogg", false);
        let output = dir.path().join("index.json");
        let formatter = OutputFormatter::new(OutputFormat::Pretty, true);

        command_index(&[input], output.to_str(), &ScanConfig::default(), &formatter).unwrap();

        let index: Value = serde_json::from_str(&std::fs::read_to_string(&output).unwrap()).unwrap();
        assert_eq!(index["pages"], json!(2));
        assert_eq!(index["streams"][0]["stream_serial"], json!(5));
        assert_eq!(index["sequence_gaps"], json!([]));
    }

    #[test]
    fn test_verify_reports_mismatch() {
        let dir = tempfile::tempdir().unwrap();
        let good = write_ogg(dir.path(), "good.ogg", false);
        let bad = write_ogg(dir.path(), "bad.ogg", true);
        let formatter = OutputFormatter::new(OutputFormat::Pretty, true);

        assert!(command_verify(&[good.clone()], &ScanConfig::default(), &formatter).is_ok());
        assert!(command_verify(&[good, bad], &ScanConfig::default(), &formatter).is_err());
    }

    #[test]
    fn test_missing_file_is_reported_not_fatal() {
        let formatter = OutputFormatter::new(OutputFormat::Json, true);
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("out.json");
        let missing = dir.path().join("missing.ogg").to_str().unwrap().to_string();
        assert!(command_index(&[missing], output.to_str(), &ScanConfig::default(), &formatter).is_ok());
    }
}
