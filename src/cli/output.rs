// Output formatting for CLI

use crate::cli::config::OutputFormat;
use std::io::{self, Write};

/// Format and output data
pub struct OutputFormatter {
    format: OutputFormat,
    pub quiet: bool,
}

impl OutputFormatter {
    pub fn new(format: OutputFormat, quiet: bool) -> Self {
        Self { format, quiet }
    }

    /// Output a single JSON document
    pub fn output_value(&self, value: &serde_json::Value, writer: &mut dyn Write) -> io::Result<()> {
        match self.format {
            OutputFormat::Pretty => {
                writeln!(writer, "{}", serde_json::to_string_pretty(value)?)?;
            }
            OutputFormat::Json => {
                writeln!(writer, "{}", serde_json::to_string(value)?)?;
            }
            OutputFormat::KeyValue => {
                self.output_key_value(value, "", writer)?;
            }
            OutputFormat::Table => match value.as_array() {
                Some(rows) => self.output_rows(rows, writer)?,
                None => self.output_table(value, writer)?,
            },
        }
        Ok(())
    }

    /// Output as key-value pairs, flattening nested objects with dotted keys
    fn output_key_value(&self, value: &serde_json::Value, prefix: &str, writer: &mut dyn Write) -> io::Result<()> {
        match value {
            serde_json::Value::Object(obj) => {
                let mut items: Vec<_> = obj.iter().collect();
                items.sort_by(|a, b| a.0.cmp(b.0));
                for (key, value) in items {
                    self.output_key_value(value, &join_key(prefix, key), writer)?;
                }
            }
            serde_json::Value::Array(arr) if arr.iter().any(|v| v.is_object()) => {
                for (index, value) in arr.iter().enumerate() {
                    self.output_key_value(value, &join_key(prefix, &index.to_string()), writer)?;
                }
            }
            other => writeln!(writer, "{}: {}", prefix, self.format_value(other))?,
        }
        Ok(())
    }

    /// Output as table
    fn output_table(&self, value: &serde_json::Value, writer: &mut dyn Write) -> io::Result<()> {
        if let Some(obj) = value.as_object() {
            let max_key_len = obj.keys().map(|k| k.len()).max().unwrap_or(0);

            writeln!(writer, "{}", "=".repeat(max_key_len + 30))?;

            for (key, value) in obj {
                writeln!(writer, "{:<width$} {}", format!("{}:", key), self.format_value(value), width = max_key_len + 2)?;
            }

            writeln!(writer, "{}", "=".repeat(max_key_len + 30))?;
        }
        Ok(())
    }

    /// Output a list of objects as aligned columns
    fn output_rows(&self, rows: &[serde_json::Value], writer: &mut dyn Write) -> io::Result<()> {
        let columns: Vec<String> = match rows.first().and_then(|r| r.as_object()) {
            Some(obj) => obj.keys().cloned().collect(),
            None => return Ok(()),
        };

        let cells: Vec<Vec<String>> = rows
            .iter()
            .map(|row| {
                columns
                    .iter()
                    .map(|c| self.format_value(row.get(c).unwrap_or(&serde_json::Value::Null)))
                    .collect()
            })
            .collect();

        let widths: Vec<usize> = columns
            .iter()
            .enumerate()
            .map(|(i, c)| cells.iter().map(|r| r[i].len()).max().unwrap_or(0).max(c.len()))
            .collect();

        let header: Vec<String> = columns.iter().zip(&widths).map(|(c, w)| format!("{:<w$}", c, w = *w)).collect();
        writeln!(writer, "{}", header.join("  ").trim_end())?;
        writeln!(writer, "{}", "-".repeat(widths.iter().sum::<usize>() + 2 * widths.len().saturating_sub(1)))?;
        for row in cells {
            let line: Vec<String> = row.iter().zip(&widths).map(|(v, w)| format!("{:<w$}", v, w = *w)).collect();
            writeln!(writer, "{}", line.join("  ").trim_end())?;
        }
        Ok(())
    }

    /// Format a JSON value for display
    fn format_value(&self, value: &serde_json::Value) -> String {
        match value {
            serde_json::Value::String(s) => s.clone(),
            serde_json::Value::Null => "(null)".to_string(),
            serde_json::Value::Bool(b) => b.to_string(),
            serde_json::Value::Number(n) => n.to_string(),
            serde_json::Value::Array(arr) => {
                if arr.len() <= 8 && arr.iter().all(|v| v.is_number()) {
                    let items: Vec<String> = arr.iter().map(|v| v.to_string()).collect();
                    format!("[{}]", items.join(","))
                } else if arr.is_empty() {
                    "[]".to_string()
                } else {
                    format!("[{} items]", arr.len())
                }
            }
            serde_json::Value::Object(obj) => {
                if obj.is_empty() {
                    "{}".to_string()
                } else {
                    format!("{{{} items}}", obj.len())
                }
            }
        }
    }

    /// Print success message
    pub fn print_success(&self, message: &str) {
        if !self.quiet {
            println!("✓ {}", message);
        }
    }

    /// Print error message
    pub fn print_error(&self, message: &str) {
        eprintln!("✗ {}", message);
    }

    /// Print info message
    pub fn print_info(&self, message: &str) {
        if !self.quiet {
            println!("  {}", message);
        }
    }
}

fn join_key(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_string()
    } else {
        format!("{}.{}", prefix, key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn render(format: OutputFormat, value: &serde_json::Value) -> String {
        let mut out = Vec::new();
        OutputFormatter::new(format, true).output_value(value, &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_key_value_flattens() {
        let value = json!({"file": "a.ogg", "streams": [{"serial": 1}], "size": 10});
        assert_eq!(
            render(OutputFormat::KeyValue, &value),
            "file: a.ogg\nsize: 10\nstreams.0.serial: 1\n"
        );
    }

    #[test]
    fn test_rows_table() {
        let value = json!([
            {"seq": 0, "serial": "0000abcd"},
            {"seq": 10, "serial": "0000abcd"},
        ]);
        let text = render(OutputFormat::Table, &value);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "seq  serial");
        assert_eq!(lines[1], "-------------");
        assert_eq!(lines[2], "0    0000abcd");
        assert_eq!(lines[3], "10   0000abcd");
    }

    #[test]
    fn test_compact_json() {
        assert_eq!(render(OutputFormat::Json, &json!({"a": [1, 2]})), "{\"a\":[1,2]}\n");
    }
}
