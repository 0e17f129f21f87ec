//! Call-site annotations appended to (or prefixed to) each log line.

use std::path::Path;

/// Where a record was emitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallSite<'a> {
    /// Source file as captured by the macro
    pub file: &'a str,
    /// Source line
    pub line: u32,
    /// Qualified function, e.g. `app::db::connect` or `pkg.Type.Method`
    pub function: &'a str,
}

impl<'a> CallSite<'a> {
    pub fn new(file: &'a str, line: u32, function: &'a str) -> Self {
        Self {
            file,
            line,
            function,
        }
    }

    /// Last segment of the qualified function name.
    pub fn bare_function(&self) -> &'a str {
        self.function
            .rsplit(['.', ':'])
            .next()
            .unwrap_or(self.function)
    }

    /// File name without its directories.
    pub fn base_file(&self) -> &'a str {
        Path::new(self.file)
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or(self.file)
    }
}

/// Render a call-site annotation.
///
/// `full_path` keeps the site as captured: ` (src/db.rs:42 app::db::connect)`.
/// Otherwise the file is cut to its base name and the function to its last
/// segment: ` (db.rs:42 connect) -> `.
pub fn render_caller(site: &CallSite<'_>, full_path: bool) -> String {
    if full_path {
        format!(" ({}:{} {})", site.file, site.line, site.function)
    } else {
        format!(
            " ({}:{} {}) -> ",
            site.base_file(),
            site.line,
            site.bare_function()
        )
    }
}
