//! Frame playback.


use crate::sink::Sink;
use crate::target::{RenderTarget, RenderedFrame};
use crate::Result;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Playback {
    Idle,
    /// A frame is on screen and stays there for `delay`
    Playing { delay: u64 },
}

/// Plays `target` on `sink`.
///
/// Every frame after the first overwrites the previous one: the cursor is
/// moved back up and the previous frame's delay is waited out before
/// drawing. A loop count of 0 shows the first frame once. The sink is
/// closed at the end.
///
/// # Errors
/// Stops at the first sink error.
pub fn render<S: Sink + ?Sized>(target: &RenderTarget, sink: &mut S) -> Result<()> {
    let frames = target.frames();
    let (passes, frames) = match target.loop_count() {
        0 => (1, &frames[..frames.len().min(1)]),
        n => (n, frames),
    };

    let mut state = Playback::Idle;
    let mut line = String::new();
    for pass in 0..passes {
        log::trace!("pass {} of {}", pass + 1, passes);
        for frame in frames {
            if let Playback::Playing { delay } = state {
                sink.cursor_up(target.height())?;
                sink.sleep(delay)?;
            }
            draw_frame(frame, &mut line, sink)?;
            state = Playback::Playing { delay: frame.delay };
        }
    }

    sink.close()
}

fn draw_frame<S: Sink + ?Sized>(frame: &RenderedFrame, line: &mut String, sink: &mut S) -> Result<()> {
    for row in frame.grid.rows() {
        line.clear();
        for index in row {
            line.push_str("\x1b[48;5;");
            line.push_str(&index.to_string());
            line.push_str("m \x1b[0m");
        }
        line.push('\n');
        sink.write(line)?;
    }
    Ok(())
}
