use std::{
    io::{IsTerminal, Write},
    time::Duration,
};
use expr_core::utils::prelude::{Error, SourceFile};
use termcolor::{Buffer, BufferWriter, Color, ColorChoice, ColorSpec, WriteColor};

pub(crate) fn print_running(text: &str) {
    print_status("Running", Color::Magenta, text)
}

pub(crate) fn print_finished(duration: Duration) {
    print_status("Finished", Color::Green, &format!("in {:.2}s", duration.as_secs_f32()))
}

pub(crate) fn print_aborted(text: &str) {
    print_status("Aborted", Color::Red, text)
}

/// Right aligned coloured verb followed by plain text, on stderr.
fn print_status(verb: &str, color: Color, text: &str) {
    print_buffer(|buffer| {
        buffer.set_color(ColorSpec::new().set_intense(true).set_bold(true).set_fg(Some(color)))?;
        write!(buffer, "{verb: >11}")?;
        buffer.reset()?;
        writeln!(buffer, " {text}")
    })
}

/// Renders an error to stderr, with a source snippet when one is available.
pub fn print_error(error: &Error, file: Option<SourceFile>) {
    print_buffer(|buffer| {
        error.pretty(buffer, file);
        Ok(())
    })
}

fn print_buffer(fill: impl FnOnce(&mut Buffer) -> std::io::Result<()>) {
    let buffer_writer = stderr_buffer_writer();
    let mut buffer = buffer_writer.buffer();

    fill(&mut buffer)
        .and_then(|()| buffer_writer.print(&buffer))
        .expect("Writing to stderr");
}

/// `FORCE_COLOR` set to anything non-empty turns colour on even when
/// stderr is not a terminal.
pub fn stderr_buffer_writer() -> BufferWriter {
    let forced = std::env::var("FORCE_COLOR").is_ok_and(|force| !force.is_empty());

    let choice = match (forced, std::io::stderr().is_terminal()) {
        (true, _) => ColorChoice::Always,
        (false, true) => ColorChoice::Auto,
        (false, false) => ColorChoice::Never,
    };

    BufferWriter::stderr(choice)
}
