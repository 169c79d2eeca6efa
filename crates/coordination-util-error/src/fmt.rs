use std::error::Error;
use std::fmt;

/// Wraps an error so its `Display` prints the whole `source()` chain on one
/// line (`outer: middle: inner`), instead of only the outermost message.
///
/// Handy in `tracing` fields (`err = %err.fmt_compact()`) where a multi-line
/// `{:?}` would break log parsing.
pub struct CompactError<'e>(&'e (dyn Error + 'static));

impl fmt::Display for CompactError<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)?;
        let mut cur = self.0.source();
        while let Some(src) = cur {
            write!(f, ": {src}")?;
            cur = src.source();
        }
        Ok(())
    }
}

pub trait FmtCompact {
    fn fmt_compact(&self) -> CompactError<'_>;
}

impl<E> FmtCompact for E
where
    E: Error + 'static,
{
    fn fmt_compact(&self) -> CompactError<'_> {
        CompactError(self)
    }
}
