//! Interactive prompts with a plain stdin fallback

use super::context::UiContext;
use std::io::{self, BufRead, Write};

/// Ask for a single line of input
///
/// Uses a cliclack widget on a terminal; otherwise prints the prompt to
/// stderr and reads one line from stdin. Runs on the blocking pool.
pub async fn input(ctx: &UiContext, message: &str, placeholder: &str) -> io::Result<String> {
    let message = message.to_string();
    let placeholder = placeholder.to_string();
    let interactive = ctx.is_interactive();

    tokio::task::spawn_blocking(move || {
        if interactive {
            cliclack::input(&message)
                .placeholder(&placeholder)
                .interact::<String>()
        } else {
            let stdin = io::stdin();
            read_line_with_prompt(&mut stdin.lock(), &mut io::stderr(), &message)
        }
    })
    .await
    .map_err(|e| io::Error::other(format!("prompt task failed: {}", e)))?
}

fn read_line_with_prompt<R: BufRead, W: Write>(
    reader: &mut R,
    writer: &mut W,
    message: &str,
) -> io::Result<String> {
    write!(writer, "{}: ", message)?;
    writer.flush()?;

    let mut line = String::new();
    if reader.read_line(&mut line)? == 0 {
        return Err(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            "stdin closed before a value was entered",
        ));
    }
    Ok(line.trim().to_string())
}
