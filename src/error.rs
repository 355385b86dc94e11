use thiserror::Error;

use crate::Engine;

/// A result code reported by an engine.
///
/// Zero means success. Negative values are engine specific and are only
/// meaningful together with the engine that produced them, see
/// [`error_message`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
#[error("engine error {}", hex(.0))]
pub struct Code(pub i32);

impl Code {
    /// The raw integer value.
    #[inline(always)]
    pub fn value(&self) -> i32 {
        self.0
    }
}

impl From<Code> for i32 {
    fn from(code: Code) -> Self {
        code.0
    }
}

/// A result code together with the engine's description of it.
///
/// Use this where a code leaves the session as a general error, e.g. through
/// `Box<dyn Error>`, so the engine's text is not lost.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message} ({})", hex(&.code.value()))]
pub struct EngineError {
    pub code: Code,
    pub message: String,
}

impl EngineError {
    /// Describe `code` using engine `E`.
    pub fn new<E: Engine>(code: Code) -> Self {
        EngineError {
            code,
            message: E::error_message(code),
        }
    }
}

impl From<EngineError> for Code {
    fn from(e: EngineError) -> Self {
        e.code
    }
}

fn hex(value: &i32) -> String {
    if *value < 0 {
        format!("-0x{:04x}", value.unsigned_abs())
    } else {
        format!("0x{:04x}", value)
    }
}

/// Describe `code` using the engine's own table.
pub fn error_message<E: Engine>(code: Code) -> String {
    E::error_message(code)
}

/// Write the description of `code` into `dest` as a NUL-terminated string.
///
/// The text is truncated to fit, never splitting a UTF-8 sequence. Returns the
/// number of bytes written before the terminator. A zero-length `dest` is left
/// untouched.
pub fn write_error_message<E: Engine>(code: Code, dest: &mut [u8]) -> usize {
    copy_terminated(&E::error_message(code), dest)
}

fn copy_terminated(message: &str, dest: &mut [u8]) -> usize {
    let Some(room) = dest.len().checked_sub(1) else {
        return 0;
    };

    let mut end = message.len().min(room);
    while !message.is_char_boundary(end) {
        end -= 1;
    }

    dest[..end].copy_from_slice(&message.as_bytes()[..end]);
    dest[end] = 0;

    end
}
