use std::fmt;
use std::rc::Rc;

use itertools::join;

/// A byte address inside one of the buffers registered with a
/// `SourceManager`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SourceLoc(u32);

impl SourceLoc {
    /// A location that refers to no buffer.
    pub const INVALID: SourceLoc = SourceLoc(u32::MAX);

    pub(crate) fn new(offset: u32) -> SourceLoc {
        SourceLoc(offset)
    }

    pub fn is_valid(self) -> bool {
        self != SourceLoc::INVALID
    }

    pub fn offset(self) -> u32 {
        self.0
    }
}

/// A byte range; `end` is one past the last byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SourceRange {
    pub start: SourceLoc,
    pub end: SourceLoc,
}

impl SourceRange {
    pub const INVALID: SourceRange = SourceRange {
        start: SourceLoc::INVALID,
        end: SourceLoc::INVALID,
    };

    pub fn new(start: SourceLoc, end: SourceLoc) -> SourceRange {
        SourceRange { start, end }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BufferId(u32);

/// A named source buffer. The stored bytes always end with a `\0` sentinel
/// so the lexer can scan without bounds checks; `end()` is the sentinel's
/// address.
pub struct SourceBuffer {
    name: String,
    start: u32,
    data: Vec<u8>,
}

impl SourceBuffer {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The buffer contents, including the trailing sentinel.
    pub fn bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn start(&self) -> SourceLoc {
        SourceLoc(self.start)
    }

    /// The address of the sentinel byte, one past the last content byte.
    pub fn end(&self) -> SourceLoc {
        SourceLoc(self.start + self.data.len() as u32 - 1)
    }

    pub fn contains(&self, loc: SourceLoc) -> bool {
        loc.is_valid() && self.start().0 <= loc.0 && loc.0 <= self.end().0
    }
}

/// 1-based position of a location within its buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceCoords {
    pub buffer: BufferId,
    pub line: u32,
    pub column: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Severity {
    Error,
    Warning,
    Note,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Note => "note",
        })
    }
}

/// Categories of warnings the compiler may emit. The reader itself produces
/// only errors; later phases file their warnings under these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Warning {
    NoWarning,
    UndefinedVariable,
    DirectEval,
    Misc,
}

#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub severity: Severity,
    pub loc: SourceLoc,
    pub range: Option<SourceRange>,
    pub message: String,
}

pub type DiagHandler = Box<dyn FnMut(&Diagnostic)>;

pub const DEFAULT_ERROR_LIMIT: usize = 20;

/// Owns the registered source buffers and collects diagnostics against them.
/// Once `error_limit` errors have been recorded, every further diagnostic is
/// suppressed and callers are expected to wind down.
pub struct SourceManager {
    buffers: Vec<Rc<SourceBuffer>>,
    next_offset: u32,
    diagnostics: Vec<Diagnostic>,
    handler: Option<DiagHandler>,
    error_count: usize,
    warning_count: usize,
    error_limit: usize,
}

impl SourceManager {
    pub fn new() -> SourceManager {
        SourceManager {
            buffers: Vec::new(),
            next_offset: 0,
            diagnostics: Vec::new(),
            handler: None,
            error_count: 0,
            warning_count: 0,
            error_limit: DEFAULT_ERROR_LIMIT,
        }
    }

    /// Register a new buffer. A `\0` sentinel is appended to the stored copy.
    pub fn add_source_buffer(
        &mut self,
        name: impl Into<String>,
        text: impl AsRef<[u8]>,
    ) -> BufferId {
        let mut data = text.as_ref().to_vec();
        data.push(0);
        let id = BufferId(self.buffers.len() as u32);
        let start = self.next_offset;
        self.next_offset += data.len() as u32;
        self.buffers.push(Rc::new(SourceBuffer {
            name: name.into(),
            start,
            data,
        }));
        id
    }

    pub fn buffer(&self, id: BufferId) -> &Rc<SourceBuffer> {
        &self.buffers[id.0 as usize]
    }

    pub fn find_buffer_for_loc(&self, loc: SourceLoc) -> Option<&Rc<SourceBuffer>> {
        self.buffers.iter().find(|buffer| buffer.contains(loc))
    }

    /// Resolve a location to 1-based line and column coordinates.
    pub fn source_coords(&self, loc: SourceLoc) -> Option<SourceCoords> {
        let (index, buffer) = self
            .buffers
            .iter()
            .enumerate()
            .find(|(_, buffer)| buffer.contains(loc))?;
        let offset = (loc.0 - buffer.start) as usize;
        let mut line = 1;
        let mut column = 1;
        for &byte in &buffer.data[..offset] {
            if byte == b'\n' {
                line += 1;
                column = 1;
            } else {
                column += 1;
            }
        }
        Some(SourceCoords {
            buffer: BufferId(index as u32),
            line,
            column,
        })
    }

    /// Install a callback invoked for every diagnostic as it is recorded.
    pub fn set_diag_handler(&mut self, handler: impl FnMut(&Diagnostic) + 'static) {
        self.handler = Some(Box::new(handler));
    }

    pub fn error(&mut self, range: SourceRange, message: impl ToString) {
        if self.is_error_limit_reached() {
            return;
        }
        self.error_count += 1;
        self.emit(Diagnostic {
            severity: Severity::Error,
            loc: range.start,
            range: Some(range),
            message: message.to_string(),
        });
    }

    pub fn error_at(&mut self, loc: SourceLoc, message: impl ToString) {
        self.error(SourceRange::new(loc, loc), message);
    }

    pub fn warning(&mut self, range: SourceRange, message: impl ToString) {
        if self.is_error_limit_reached() {
            return;
        }
        self.warning_count += 1;
        self.emit(Diagnostic {
            severity: Severity::Warning,
            loc: range.start,
            range: Some(range),
            message: message.to_string(),
        });
    }

    pub fn note(&mut self, loc: SourceLoc, message: impl ToString) {
        if self.is_error_limit_reached() {
            return;
        }
        self.emit(Diagnostic {
            severity: Severity::Note,
            loc,
            range: None,
            message: message.to_string(),
        });
    }

    fn emit(&mut self, diagnostic: Diagnostic) {
        if let Some(handler) = self.handler.as_mut() {
            handler(&diagnostic);
        }
        self.diagnostics.push(diagnostic);
    }

    /// Everything recorded so far, in emission order.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn error_count(&self) -> usize {
        self.error_count
    }

    pub fn warning_count(&self) -> usize {
        self.warning_count
    }

    pub fn set_error_limit(&mut self, limit: usize) {
        self.error_limit = limit;
    }

    pub fn is_error_limit_reached(&self) -> bool {
        self.error_count >= self.error_limit
    }

    /// Render one diagnostic as `name:line:column: severity: message`.
    pub fn format_diagnostic(&self, diagnostic: &Diagnostic) -> String {
        match self.source_coords(diagnostic.loc) {
            Some(coords) => format!(
                "{}:{}:{}: {}: {}",
                self.buffer(coords.buffer).name(),
                coords.line,
                coords.column,
                diagnostic.severity,
                diagnostic.message
            ),
            None => format!("{}: {}", diagnostic.severity, diagnostic.message),
        }
    }

    /// Render all collected diagnostics, one per line.
    pub fn format_diagnostics(&self) -> String {
        join(
            self.diagnostics.iter().map(|d| self.format_diagnostic(d)),
            "\n",
        )
    }
}

impl Default for SourceManager {
    fn default() -> SourceManager {
        SourceManager::new()
    }
}
