// src/report.rs
// =============================================================================
// Reporting.
//
// The walker emits one PageReport per displayed page and never writes to
// stdout itself; how a report is rendered (verbosity columns, indentation,
// relative paths, JSON) is entirely this module's concern. That keeps the
// traversal logic testable with a collecting reporter instead of captured
// output text.
// =============================================================================

use std::path::PathBuf;

use anyhow::Result;
use serde::Serialize;

use crate::cli::CrawlConfig;

/// Everything known about one displayed page.
#[derive(Debug, Clone, Serialize)]
pub struct PageReport {
    pub url: String,
    pub size: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    pub depth: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
    pub is_html: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub replicate_path: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub copy_path: Option<PathBuf>,
    /// Raw response headers; only rendered at -vvv, never serialized.
    #[serde(skip)]
    pub headers: Vec<(String, String)>,
}

/// Rendering seam between the walker and the terminal.
pub trait Reporter {
    fn page(&mut self, report: &PageReport);

    /// Called once after the walk completes.
    fn finish(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Renders one line per page to stdout, or a JSON array at the end of the
/// run in --json mode.
pub struct ConsoleReporter {
    verbose: u8,
    indent: bool,
    spaces_per_indent: usize,
    relurl: bool,
    json: bool,
    collected: Vec<PageReport>,
}

impl ConsoleReporter {
    pub fn new(config: &CrawlConfig) -> Self {
        ConsoleReporter {
            verbose: config.verbose,
            indent: config.indent,
            spaces_per_indent: config.spaces_per_indent,
            relurl: config.relurl,
            json: config.json,
            collected: Vec::new(),
        }
    }

    fn render_line(&self, report: &PageReport) -> String {
        let mut line = String::new();

        if self.verbose > 0 {
            line.push_str(&format!("{:>10}  ", report.size));
        }
        if self.verbose > 1 {
            let ctype = report.content_type.as_deref().unwrap_or("Unknown");
            let ctype = &ctype[..ctype.len().min(32)];
            line.push_str(&format!("{:<32}  ", ctype));
        }

        if self.indent && report.depth > 0 {
            line.push_str(&" ".repeat(report.depth * self.spaces_per_indent));
        }

        if self.relurl {
            line.push_str(&relative_display(report));
        } else {
            line.push_str(&report.url);
        }

        if let Some(path) = &report.replicate_path {
            line.push_str(&format!(" --> {}", path.display()));
        }
        if let Some(path) = &report.copy_path {
            line.push_str(&format!(" ==> {}", path.display()));
        }

        line
    }
}

impl Reporter for ConsoleReporter {
    fn page(&mut self, report: &PageReport) {
        if self.json {
            self.collected.push(report.clone());
            return;
        }

        println!("{}", self.render_line(report));

        if self.verbose >= 3 {
            for (name, value) in &report.headers {
                println!("    {}: {}", name, value);
            }
        }
    }

    fn finish(&mut self) -> Result<()> {
        if self.json {
            println!("{}", serde_json::to_string_pretty(&self.collected)?);
        }
        Ok(())
    }
}

/// Best-effort relative rendering of a URL against its parent page: a child
/// becomes the path suffix, an ancestor becomes `../` backreferences, and
/// anything else stays a full URL. HTML pages get a trailing '/' so they
/// read as directories.
fn relative_display(report: &PageReport) -> String {
    let url = &report.url;
    match report.parent.as_deref() {
        Some(parent) if url.starts_with(parent) => {
            let mut relative = url[parent.len()..].to_string();
            if relative.starts_with('/') {
                relative.remove(0);
            }
            if report.is_html && !relative.ends_with('/') {
                relative.push('/');
            }
            relative
        }
        Some(parent) if parent.starts_with(url.as_str()) => {
            let levels = parent[url.len()..].matches('/').count();
            let mut relative = "../".repeat(levels);
            if report.is_html && !relative.ends_with('/') {
                relative.push('/');
            }
            relative
        }
        _ => url.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(url: &str, parent: Option<&str>, is_html: bool) -> PageReport {
        PageReport {
            url: url.to_string(),
            size: 1234,
            content_type: Some("text/html".to_string()),
            depth: 2,
            parent: parent.map(str::to_string),
            is_html,
            replicate_path: None,
            copy_path: None,
            headers: Vec::new(),
        }
    }

    fn console(verbose: u8, indent: bool, relurl: bool) -> ConsoleReporter {
        ConsoleReporter {
            verbose,
            indent,
            spaces_per_indent: 3,
            relurl,
            json: false,
            collected: Vec::new(),
        }
    }

    #[test]
    fn test_plain_line_is_just_the_url() {
        let reporter = console(0, false, false);
        let line = reporter.render_line(&report("http://a.com/x", None, true));
        assert_eq!(line, "http://a.com/x");
    }

    #[test]
    fn test_verbose_adds_size_then_type() {
        let reporter = console(2, false, false);
        let line = reporter.render_line(&report("http://a.com/x", None, true));
        assert_eq!(
            line,
            format!("{:>10}  {:<32}  http://a.com/x", 1234, "text/html")
        );
    }

    #[test]
    fn test_indent_scales_with_depth() {
        let reporter = console(0, true, false);
        let line = reporter.render_line(&report("http://a.com/x", None, false));
        assert_eq!(line, "      http://a.com/x");
    }

    #[test]
    fn test_mirror_targets_are_appended() {
        let reporter = console(0, false, false);
        let mut rep = report("http://a.com/x", None, false);
        rep.replicate_path = Some(PathBuf::from("/tmp/mirror/x"));
        assert_eq!(
            reporter.render_line(&rep),
            "http://a.com/x --> /tmp/mirror/x"
        );
    }

    #[test]
    fn test_relative_display_for_a_child() {
        let rep = report("http://a.com/docs/page", Some("http://a.com/docs"), false);
        assert_eq!(relative_display(&rep), "page");
    }

    #[test]
    fn test_relative_display_child_html_gets_trailing_slash() {
        let rep = report("http://a.com/docs/page", Some("http://a.com/docs"), true);
        assert_eq!(relative_display(&rep), "page/");
    }

    #[test]
    fn test_relative_display_for_an_ancestor() {
        let rep = report("http://a.com/docs", Some("http://a.com/docs/sub/page"), false);
        assert_eq!(relative_display(&rep), "../../");
    }

    #[test]
    fn test_relative_display_unrelated_stays_absolute() {
        let rep = report("http://other.com/p", Some("http://a.com/docs"), false);
        assert_eq!(relative_display(&rep), "http://other.com/p");
    }
}
