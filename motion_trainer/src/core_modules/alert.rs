use std::io::{self, Write};

/// Fired once for every completed repetition. Failures are reported to the
/// caller, which is expected to log and move on.
pub trait RepAlert {
    fn fire(&mut self) -> io::Result<()>;
}

/// Rings the terminal bell.
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalBell;

impl RepAlert for TerminalBell {
    fn fire(&mut self) -> io::Result<()> {
        let mut out = io::stdout().lock();
        out.write_all(b"\x07")?;
        out.flush()
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SilentAlert;

impl RepAlert for SilentAlert {
    fn fire(&mut self) -> io::Result<()> {
        Ok(())
    }
}
