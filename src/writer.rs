//! Renders a [`Document`] back to INI text.
//!
//! Parts are written in document order. Each part first emits the blank lines recorded in
//! front of it, then its comment lines, then its own line:
//!
//! ```text
//! ; lone comment
//!
//! ; section comment
//! [Section] ; inline comment
//! ; setting comment
//! key=value
//! ```
//!
//! A lone comment must be followed by a blank line to be read back as a lone comment, so
//! the writer guarantees one after it, including at the end of the document.

use crate::document::Document;
use crate::options::IniOptions;
use crate::part::Part;
use std::fmt;

pub(crate) struct Writer<W> {
    out: W,
    options: IniOptions,
    after_lone_comment: bool,
}

impl<W: fmt::Write> Writer<W> {
    pub(crate) fn new(out: W, options: IniOptions) -> Self {
        Writer {
            out,
            options,
            after_lone_comment: false,
        }
    }

    pub(crate) fn write_document(&mut self, document: &Document) -> fmt::Result {
        for part in document.parts() {
            self.write_part(part)?;
        }
        if self.after_lone_comment {
            self.line("")?;
        }
        Ok(())
    }

    fn write_part(&mut self, part: Part<'_>) -> fmt::Result {
        self.blank_lines(part.blank_lines())?;
        match part {
            Part::Comment(comment) => {
                self.comment_lines(comment.text())?;
                self.after_lone_comment = true;
            }
            Part::Setting(setting) => {
                let comment = setting.comment();
                if !comment.is_empty() {
                    self.comment_lines(comment.strip_suffix('\n').unwrap_or(comment))?;
                }
                self.out.write_str(setting.key())?;
                self.out.write_str(self.options.assignment())?;
                self.line(setting.value())?;
            }
            Part::Section(section) => {
                let comment = section.comment();
                let inline = match comment.rfind('\n') {
                    Some(newline) => {
                        self.comment_lines(&comment[..newline])?;
                        &comment[newline + 1..]
                    }
                    None => comment,
                };
                write!(self.out, "[{}]", section.name())?;
                if inline.is_empty() {
                    self.line("")?;
                } else {
                    self.out.write_str(" ; ")?;
                    self.line(inline)?;
                }
                for part in section.parts() {
                    self.write_part(part)?;
                }
            }
        }
        Ok(())
    }

    fn blank_lines(&mut self, count: usize) -> fmt::Result {
        let count = if self.after_lone_comment {
            count.max(1)
        } else {
            count
        };
        self.after_lone_comment = false;
        for _ in 0..count {
            self.line("")?;
        }
        Ok(())
    }

    fn comment_lines(&mut self, text: &str) -> fmt::Result {
        for line in text.split('\n') {
            self.out.write_str("; ")?;
            self.line(line)?;
        }
        Ok(())
    }

    fn line(&mut self, text: &str) -> fmt::Result {
        self.out.write_str(text)?;
        self.out.write_str(self.options.line_ending.as_str())
    }
}
