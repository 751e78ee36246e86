//! INI rendering shared by the AWS, OpenStack, vSphere and GCP cloud configs.
//!
//! The cloud providers read these files with gcfg, which expects string values
//! in double quotes with `\` and `"` escaped. Booleans and numbers are written
//! bare.

use crate::error::Result;
use std::fmt::{Display, Write};

/// Quote and escape a string value for gcfg
pub fn escape(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len() + 2);
    escaped.push('"');
    for c in value.chars() {
        match c {
            '\\' => escaped.push_str(r"\\"),
            '"' => escaped.push_str("\\\""),
            '\n' => escaped.push_str(r"\n"),
            '\t' => escaped.push_str(r"\t"),
            c => escaped.push(c),
        }
    }
    escaped.push('"');
    escaped
}

/// Incremental INI document writer
#[derive(Debug)]
pub struct IniWriter {
    out: String,
    separator: &'static str,
}

impl IniWriter {
    /// Writer producing `key=value` lines
    pub fn compact() -> Self {
        Self {
            out: String::new(),
            separator: "=",
        }
    }

    /// Writer producing `key = value` lines
    pub fn spaced() -> Self {
        Self {
            out: String::new(),
            separator: " = ",
        }
    }

    /// Start a `[name]` section
    pub fn section(&mut self, name: &str) -> Result<()> {
        self.blank_line_between_sections();
        writeln!(self.out, "[{}]", name)?;
        Ok(())
    }

    /// Start a `[kind "name"]` subsection
    pub fn subsection(&mut self, kind: &str, name: &str) -> Result<()> {
        self.blank_line_between_sections();
        writeln!(self.out, "[{} {}]", kind, escape(name))?;
        Ok(())
    }

    /// Write a quoted string value
    pub fn string(&mut self, key: &str, value: &str) -> Result<()> {
        writeln!(self.out, "{}{}{}", key, self.separator, escape(value))?;
        Ok(())
    }

    /// Write an unquoted value (booleans, numbers)
    pub fn bare(&mut self, key: &str, value: impl Display) -> Result<()> {
        writeln!(self.out, "{}{}{}", key, self.separator, value)?;
        Ok(())
    }

    /// Finish the document
    pub fn finish(self) -> String {
        self.out
    }

    fn blank_line_between_sections(&mut self) {
        if !self.out.is_empty() {
            self.out.push('\n');
        }
    }
}
