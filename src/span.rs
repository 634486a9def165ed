use std::sync::Arc;

use swc_core::common::{SourceMapper, Span};

/// Normalize bundler/debugger style filenames.
pub fn normalize_filename(filename: &str) -> String {
    let mut s = filename.replace('\\', "/");
    s = s.replace("%5Bproject%5D", "[project]");
    s = s.replace("%5bproject%5d", "[project]");
    if let Some(rest) = s.strip_prefix("file:///") {
        s = rest.to_string();
    } else if let Some(rest) = s.strip_prefix("file://") {
        s = rest.to_string();
    }
    for prefix in &["turbopack/[project]/", "/turbopack/[project]/", "[project]/"] {
        if let Some(rest) = s.strip_prefix(prefix) {
            return rest.to_string();
        }
    }
    s
}

/// Renders swc spans as `"<file>:<line>"` for the module being analyzed.
#[derive(Clone)]
pub struct SpanFormatter {
    file: String,
    source_map: Option<Arc<dyn SourceMapper>>,
}

impl SpanFormatter {
    pub fn new(file: &str, source_map: Option<Arc<dyn SourceMapper>>) -> Self {
        let file = normalize_filename(file);
        let file = if file.is_empty() { "unknown".to_string() } else { file };
        Self { file, source_map }
    }

    pub fn file(&self) -> &str {
        &self.file
    }

    /// 1-indexed line of `span.lo`, or 0 when the location is unknown.
    pub fn line(&self, span: Span) -> usize {
        if span.is_dummy() {
            return 0;
        }
        match &self.source_map {
            Some(cm) => cm.lookup_char_pos(span.lo()).line,
            None => 0,
        }
    }

    pub fn format(&self, span: Span) -> String {
        format!("{}:{}", self.file, self.line(span))
    }
}

impl std::fmt::Debug for SpanFormatter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpanFormatter")
            .field("file", &self.file)
            .field("has_source_map", &self.source_map.is_some())
            .finish()
    }
}
