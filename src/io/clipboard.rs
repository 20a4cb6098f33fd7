use std::cell::RefCell;
use std::io::Write;
use std::process::{Command, Stdio};
use std::rc::Rc;

#[derive(Debug, thiserror::Error)]
pub enum ClipboardError {
    #[error("no clipboard tool available on this platform")]
    Unsupported,
    #[error("could not run {tool}: {source}")]
    Spawn {
        tool: &'static str,
        source: std::io::Error,
    },
    #[error("{tool} exited with {status}")]
    Failed {
        tool: &'static str,
        status: std::process::ExitStatus,
    },
    #[error("clipboard contents are not valid UTF-8")]
    NotUtf8,
}

/// Text clipboard the session copies titles to and pastes them from.
pub trait Clipboard {
    fn write_text(&mut self, text: &str) -> Result<(), ClipboardError>;
    fn read_text(&mut self) -> Result<String, ClipboardError>;
}

// ---------------------------------------------------------------------------
// System clipboard
// ---------------------------------------------------------------------------

/// External copy/paste commands for one platform
#[derive(Debug, Clone, Copy)]
struct Tools {
    copy: (&'static str, &'static [&'static str]),
    paste: (&'static str, &'static [&'static str]),
}

/// Clipboard backed by the platform's command line tools
/// (`pbcopy`/`pbpaste`, `wl-copy`/`wl-paste`, or `xclip`).
#[derive(Debug, Clone, Default)]
pub struct SystemClipboard;

impl SystemClipboard {
    pub fn new() -> Self {
        SystemClipboard
    }

    #[cfg(target_os = "macos")]
    fn tools() -> Option<Tools> {
        Some(Tools {
            copy: ("pbcopy", &[]),
            paste: ("pbpaste", &[]),
        })
    }

    #[cfg(target_os = "linux")]
    fn tools() -> Option<Tools> {
        if std::env::var_os("WAYLAND_DISPLAY").is_some() {
            Some(Tools {
                copy: ("wl-copy", &[]),
                paste: ("wl-paste", &["--no-newline"]),
            })
        } else {
            Some(Tools {
                copy: ("xclip", &["-selection", "clipboard"]),
                paste: ("xclip", &["-selection", "clipboard", "-o"]),
            })
        }
    }

    #[cfg(not(any(target_os = "macos", target_os = "linux")))]
    fn tools() -> Option<Tools> {
        None
    }
}

impl Clipboard for SystemClipboard {
    fn write_text(&mut self, text: &str) -> Result<(), ClipboardError> {
        let (tool, args) = Self::tools().ok_or(ClipboardError::Unsupported)?.copy;
        let status = Command::new(tool)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .and_then(|mut child| {
                if let Some(mut stdin) = child.stdin.take() {
                    stdin.write_all(text.as_bytes())?;
                }
                child.wait()
            })
            .map_err(|source| ClipboardError::Spawn { tool, source })?;
        if status.success() {
            Ok(())
        } else {
            Err(ClipboardError::Failed { tool, status })
        }
    }

    fn read_text(&mut self) -> Result<String, ClipboardError> {
        let (tool, args) = Self::tools().ok_or(ClipboardError::Unsupported)?.paste;
        let output = Command::new(tool)
            .args(args)
            .stderr(Stdio::null())
            .output()
            .map_err(|source| ClipboardError::Spawn { tool, source })?;
        if !output.status.success() {
            return Err(ClipboardError::Failed {
                tool,
                status: output.status,
            });
        }
        String::from_utf8(output.stdout).map_err(|_| ClipboardError::NotUtf8)
    }
}

// ---------------------------------------------------------------------------
// In-memory clipboard
// ---------------------------------------------------------------------------

/// Process-local clipboard
#[derive(Debug, Clone, Default)]
pub struct MemoryClipboard {
    pub contents: String,
}

impl MemoryClipboard {
    pub fn with_text(text: impl Into<String>) -> Self {
        MemoryClipboard {
            contents: text.into(),
        }
    }
}

impl Clipboard for MemoryClipboard {
    fn write_text(&mut self, text: &str) -> Result<(), ClipboardError> {
        self.contents = text.to_string();
        Ok(())
    }

    fn read_text(&mut self) -> Result<String, ClipboardError> {
        Ok(self.contents.clone())
    }
}

impl<C: Clipboard> Clipboard for Rc<RefCell<C>> {
    fn write_text(&mut self, text: &str) -> Result<(), ClipboardError> {
        self.borrow_mut().write_text(text)
    }

    fn read_text(&mut self) -> Result<String, ClipboardError> {
        self.borrow_mut().read_text()
    }
}
