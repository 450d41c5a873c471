use std::{rc::Rc, sync::{atomic::{AtomicUsize, Ordering}, Arc, RwLock}};

use termcolor::Buffer;

use super::diagnostic::{Diagnostic, Label, Level, Location, SourceFile};
use super::src_span::SrcSpan;

pub trait WarningEmitterIO {
    fn emit_warning(&self, warning: Warning);
}

#[derive(Debug, Clone, Copy)]
pub struct NullWarningEmitterIO;

impl WarningEmitterIO for NullWarningEmitterIO {
    fn emit_warning(&self, _warning: Warning) {}
}

#[derive(Debug, Default, Clone)]
pub struct VectorWarningEmitterIO {
    pub warnings: Arc<RwLock<Vec<Warning>>>
}

impl VectorWarningEmitterIO {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn take(&self) -> Vec<Warning> {
        let mut warnings = self.write_lock();
        std::mem::take(&mut *warnings)
    }

    fn write_lock(&self) -> std::sync::RwLockWriteGuard<'_, Vec<Warning>> {
        self.warnings.write().expect("Vector lock poisoned")
    }
}

impl WarningEmitterIO for VectorWarningEmitterIO {
    fn emit_warning(&self, warning: Warning) {
        let mut warnings = self.write_lock();

        warnings.push(warning);
    }
}

#[derive(Clone)]
pub struct WarningEmitter {
    count: Arc<AtomicUsize>,
    emitter: Rc<dyn WarningEmitterIO>
}

impl std::fmt::Debug for WarningEmitter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WarningEmitter")
            .field("count", &self.count())
            .finish_non_exhaustive()
    }
}

impl WarningEmitter {
    pub fn new(emitter: Rc<dyn WarningEmitterIO>) -> Self {
        Self {
            count: Arc::new(AtomicUsize::new(0)),
            emitter,
        }
    }

    pub fn null() -> Self {
        Self::new(Rc::new(NullWarningEmitterIO))
    }

    pub fn count(&self) -> usize {
        self.count.load(Ordering::Relaxed)
    }

    pub fn emit(&self, warning: Warning) {
        _ = self.count.fetch_add(1, Ordering::Relaxed);
        self.emitter.emit_warning(warning);
    }
}

impl Default for WarningEmitter {
    fn default() -> Self {
        Self::null()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Warning {
    /// A `def` replaced an earlier user function with the same name and arity.
    FunctionRedefined {
        name: String,
        arity: usize,
        location: SrcSpan,
    },
    /// A `def` hides a builtin with the same name and arity.
    BuiltinShadowed {
        name: String,
        arity: usize,
        location: SrcSpan,
    },
}

impl Warning {
    pub fn location(&self) -> SrcSpan {
        match self {
            Warning::FunctionRedefined { location, .. }
            | Warning::BuiltinShadowed { location, .. } => *location
        }
    }

    pub fn pretty_string(&self, file: Option<SourceFile>) -> String {
        let mut nocolor = Buffer::no_color();
        self.pretty(&mut nocolor, file);
        String::from_utf8(nocolor.into_inner()).expect("Error printing produced invalid utf8")
    }

    pub fn pretty(&self, buf: &mut Buffer, file: Option<SourceFile>) {
        self.to_diagnostic(file).write(buf);
    }

    pub fn to_diagnostic<'a>(&self, file: Option<SourceFile<'a>>) -> Diagnostic<'a> {
        let (title, text) = match self {
            Warning::FunctionRedefined { name, arity, .. } => (
                "Function redefined",
                format!("`{name}` taking {arity} argument(s) replaces the previous definition."),
            ),
            Warning::BuiltinShadowed { name, arity, .. } => (
                "Builtin shadowed",
                format!("`{name}` taking {arity} argument(s) now hides the builtin of the same name."),
            ),
        };

        let location = file.map(|file| Location {
            file,
            label: Label {
                text: None,
                span: self.location(),
            },
        });

        Diagnostic {
            title: title.into(),
            text,
            level: Level::Warning,
            span: Some(self.location()),
            location,
        }
    }
}
