use crate::errors::*;
use crate::MonitorMode;
use log::{debug, warn};
use snafu::ResultExt;
use std::io::{self, BufRead, Write};

const PROMPT: &str = "Would you like to monitor RabbitMQ queues? (y/n): ";

/// Decides whether to open the management console, asking on `output`/`input` if `mode` is
/// [`MonitorMode::Prompt`].
pub fn should_open<R: BufRead, W: Write>(
    mode: MonitorMode,
    input: &mut R,
    output: &mut W,
) -> Result<bool> {
    match mode {
        MonitorMode::Never => Ok(false),
        MonitorMode::Always => Ok(true),
        MonitorMode::Prompt => {
            write!(output, "{}", PROMPT).context(PromptSnafu)?;
            output.flush().context(PromptSnafu)?;
            let mut answer = String::new();
            input.read_line(&mut answer).context(PromptSnafu)?;
            writeln!(output).context(PromptSnafu)?;
            Ok(answer.trim().eq_ignore_ascii_case("y"))
        }
    }
}

/// Offers (or skips, or forces) opening the broker's management console in a browser, using
/// the process's stdin/stdout for the prompt. A browser that fails to start is only a warning.
pub fn offer_admin_console(mode: MonitorMode, admin_url: &str) -> Result<()> {
    let stdin = io::stdin();
    let stdout = io::stdout();
    if !should_open(mode, &mut stdin.lock(), &mut stdout.lock())? {
        return Ok(());
    }

    debug!("opening {}", admin_url);
    if let Err(err) = webbrowser::open(admin_url) {
        warn!("could not open browser at {}: {}", admin_url, err);
    }
    println!();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ask(mode: MonitorMode, answer: &str) -> (bool, String) {
        let mut input = answer.as_bytes();
        let mut output = Vec::new();
        let open = should_open(mode, &mut input, &mut output).unwrap();
        (open, String::from_utf8(output).unwrap())
    }

    #[test]
    fn never_and_always_do_not_prompt() {
        assert_eq!(ask(MonitorMode::Never, "y\n"), (false, String::new()));
        assert_eq!(ask(MonitorMode::Always, "n\n"), (true, String::new()));
    }

    #[test]
    fn prompt_accepts_y_only() {
        let (open, shown) = ask(MonitorMode::Prompt, "y\n");
        assert!(open);
        assert!(shown.starts_with(PROMPT));

        assert!(ask(MonitorMode::Prompt, "Y\n").0);
        assert!(ask(MonitorMode::Prompt, "  y  \n").0);
        assert!(!ask(MonitorMode::Prompt, "yes\n").0);
        assert!(!ask(MonitorMode::Prompt, "n\n").0);
        assert!(!ask(MonitorMode::Prompt, "").0);
    }
}
