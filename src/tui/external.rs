use anyhow::{anyhow, Context, Result};
use crossterm::cursor::{Hide, Show};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use shell_words::split as shell_split;
use std::fs;
use std::io::{self, Write};
use std::process::Command;

pub(super) type Term = ratatui::Terminal<CrosstermBackend<io::Stdout>>;

/// Open `initial` in `$VISUAL`/`$EDITOR` and return the saved text.
pub(super) fn edit_text(initial: &str) -> Result<String> {
    let mut file = tempfile::Builder::new()
        .prefix("outreach-")
        .suffix(".txt")
        .tempfile()
        .context("create edit buffer")?;
    file.write_all(initial.as_bytes())
        .context("write edit buffer")?;
    file.flush().context("flush edit buffer")?;

    let mut cmd = resolve_command(&["VISUAL", "EDITOR"], "vi");
    let program = cmd.remove(0);
    let status = Command::new(&program)
        .args(cmd)
        .arg(file.path())
        .status()
        .with_context(|| format!("run editor {program}"))?;
    if !status.success() {
        return Err(anyhow!("editor {program} exited with {status}"));
    }
    fs::read_to_string(file.path()).context("read edit buffer")
}

fn resolve_command(vars: &[&str], fallback: &str) -> Vec<String> {
    for var in vars {
        if let Ok(value) = std::env::var(var) {
            if let Ok(parts) = shell_split(&value) {
                if !parts.is_empty() {
                    return parts;
                }
            }
        }
    }
    vec![fallback.to_string()]
}

/// Leave the alternate screen while `f` runs, then restore it.
pub(super) fn run_external<T, F>(guard: &mut TerminalGuard, terminal: &mut Term, f: F) -> Result<T>
where
    F: FnOnce() -> Result<T>,
{
    guard.suspend()?;
    let result = f();
    guard.resume()?;
    terminal.clear().ok();
    result
}

pub(super) struct TerminalGuard {
    active: bool,
}

impl TerminalGuard {
    pub(super) fn enter() -> Result<Self> {
        enable_raw_mode().context("enable raw mode")?;
        execute!(io::stdout(), EnterAlternateScreen, Hide).context("enter alt screen")?;
        Ok(Self { active: true })
    }

    pub(super) fn suspend(&mut self) -> Result<()> {
        if self.active {
            disable_raw_mode().ok();
            execute!(io::stdout(), LeaveAlternateScreen, Show).ok();
            self.active = false;
        }
        Ok(())
    }

    pub(super) fn resume(&mut self) -> Result<()> {
        if !self.active {
            execute!(io::stdout(), EnterAlternateScreen, Hide).ok();
            enable_raw_mode().ok();
            self.active = true;
        }
        Ok(())
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = self.suspend();
    }
}

pub(super) fn open_terminal() -> Result<Term> {
    let backend = CrosstermBackend::new(io::stdout());
    ratatui::Terminal::new(backend).context("init terminal")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fallback_editor_when_unset() {
        assert_eq!(
            resolve_command(&["OUTREACH_TEST_UNSET_EDITOR_VAR"], "vi"),
            vec!["vi".to_string()]
        );
    }
}
