//! Indentation-tracking text writer for generated source
//!
//! ```
//! use wirebind_codegen::code_writer::CodeWriter;
//!
//! let mut w = CodeWriter::new();
//! w.block("fn main()", |w| w.line("println!(\"hi\");")).unwrap();
//! assert_eq!(w.finish(), "fn main() {\n    println!(\"hi\");\n}\n");
//! ```

use std::fmt::{self, Write as _};

/// Writes lines into a `String`, indenting by four spaces per level
#[derive(Debug, Default)]
pub struct CodeWriter {
    out: String,
    level: usize,
    indent: &'static str,
}

impl CodeWriter {
    pub fn new() -> Self {
        Self::with_indent("    ")
    }

    pub fn with_indent(indent: &'static str) -> Self {
        Self {
            out: String::new(),
            level: 0,
            indent,
        }
    }

    /// Write one indented line
    pub fn line(&mut self, text: &str) -> fmt::Result {
        if !text.is_empty() {
            for _ in 0..self.level {
                self.out.write_str(self.indent)?;
            }
            self.out.write_str(text)?;
        }
        self.out.write_char('\n')
    }

    /// Write one indented line from format arguments
    pub fn line_fmt(&mut self, args: fmt::Arguments<'_>) -> fmt::Result {
        self.line(&args.to_string())
    }

    pub fn blank_line(&mut self) -> fmt::Result {
        self.out.write_char('\n')
    }

    /// Write `header {`, the indented body, then `}`
    pub fn block<F>(&mut self, header: &str, body: F) -> fmt::Result
    where
        F: FnOnce(&mut Self) -> fmt::Result,
    {
        self.block_with(header, "}", body)
    }

    /// Like [`block`](Self::block) with a custom closing line, such as `};`
    pub fn block_with<F>(&mut self, header: &str, close: &str, body: F) -> fmt::Result
    where
        F: FnOnce(&mut Self) -> fmt::Result,
    {
        self.line(&format!("{header} {{"))?;
        self.level += 1;
        let result = body(self);
        self.level -= 1;
        result?;
        self.line(close)
    }

    /// Run `body` one level deeper without writing braces
    pub fn indented<F>(&mut self, body: F) -> fmt::Result
    where
        F: FnOnce(&mut Self) -> fmt::Result,
    {
        self.level += 1;
        let result = body(self);
        self.level -= 1;
        result
    }

    pub fn finish(self) -> String {
        self.out
    }
}

/// `writeln!`-style helper for [`CodeWriter::line_fmt`]
#[macro_export]
macro_rules! cw_line {
    ($w:expr, $($arg:tt)*) => {
        $w.line_fmt(format_args!($($arg)*))
    };
}
