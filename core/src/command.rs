//! Text commands: `move <digits>`, `bridge`, `reset`
//!
//! Tokens run left to right against the session as they are read. A
//! failing token aborts the rest of the command; whatever the earlier tokens
//! did stays done, and the failure carries their reports.
//!
//! Within `move`, the first digit names an arrow directly (1-based). Every
//! later digit counts clockwise from the edge just traversed:
//! `slot = (incoming + 1 + raw) % arrows`, where `incoming` is the slot of
//! the new cell that leads back (-1 when none does).

use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::fmt;

use thiserror::Error;

use crate::graph::Control;
use crate::session::{MoveReport, OutcomeKind, Session};
use crate::error::SessionError;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("unrecognized command: {0}")]
    UnrecognizedToken(String),

    #[error("no numbers provided after 'move'")]
    MissingDigits,

    #[error("those are not valid numbers")]
    NoValidDigits,

    #[error("that first number is not a valid arrow")]
    FirstArrowOutOfRange,

    /// A later digit exceeded the arrows of the cell it was applied in
    #[error("{}", chain_message(*executed))]
    ArrowOutOfRange { executed: usize },

    #[error("the maze is already solved")]
    Solved,
}

fn chain_message(executed: usize) -> String {
    match executed {
        1 => "I executed the first move but the second one is greater than the number of arrows".to_string(),
        n => alloc::format!(
            "I executed the first {} of your moves but the next one is greater than the number of arrows",
            n
        ),
    }
}

impl From<SessionError> for CommandError {
    fn from(err: SessionError) -> Self {
        match err {
            SessionError::Solved => CommandError::Solved,
        }
    }
}

/// A command that stopped early, with the reports of what did run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandFailure {
    pub error: CommandError,
    pub reports: Vec<MoveReport>,
}

impl fmt::Display for CommandFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.error, f)
    }
}

impl core::error::Error for CommandFailure {
    fn source(&self) -> Option<&(dyn core::error::Error + 'static)> {
        Some(&self.error)
    }
}

/// One executed step of a command, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandStep {
    Press(MoveReport),
    /// A `reset` token sent the session back to `to`
    Reset { to: usize },
}

/// Digits `1`..=`8` of a move argument as 0-based values; anything else is skipped
fn arrow_digits(arg: &str) -> Vec<usize> {
    arg.bytes()
        .filter(|b| (b'1'..=b'8').contains(b))
        .map(|b| (b - b'1') as usize)
        .collect()
}

/// Run one command line against `session`
///
/// # Returns
/// * `Ok(reports)` - every press made; a failed press or reaching the goal
///   ends the command early, so the last report tells why it stopped
/// * `Err(CommandFailure)` - a token could not be run
pub fn run_command(session: &mut Session, command: &str) -> Result<Vec<MoveReport>, CommandFailure> {
    run_command_observed(session, command, |_| {})
}

/// [`run_command`], also handing every executed step to `observe`
pub fn run_command_observed<F: FnMut(CommandStep)>(
    session: &mut Session,
    command: &str,
    mut observe: F,
) -> Result<Vec<MoveReport>, CommandFailure> {
    let mut reports = Vec::new();
    let mut tokens = command.split_whitespace();

    while let Some(token) = tokens.next() {
        let step = if token.eq_ignore_ascii_case("reset") {
            session
                .reset()
                .map(|()| observe(CommandStep::Reset { to: session.start() }))
                .map_err(CommandError::from)
        } else if token.eq_ignore_ascii_case("bridge") {
            press(session, Control::Bridge, &mut reports, &mut observe)
        } else if token.eq_ignore_ascii_case("move") {
            match tokens.next() {
                Some(arg) => run_chain(session, arg, &mut reports, &mut observe),
                None => Err(CommandError::MissingDigits),
            }
        } else {
            Err(CommandError::UnrecognizedToken(token.to_string()))
        };

        if let Err(error) = step {
            return Err(CommandFailure { error, reports });
        }
        if reports.last().is_some_and(|r| r.kind != OutcomeKind::Moved) {
            break;
        }
    }

    Ok(reports)
}

fn press<F: FnMut(CommandStep)>(
    session: &mut Session,
    control: Control,
    reports: &mut Vec<MoveReport>,
    observe: &mut F,
) -> Result<(), CommandError> {
    let report = session.handle_move(control)?;
    reports.push(report);
    observe(CommandStep::Press(report));
    Ok(())
}

fn run_chain<F: FnMut(CommandStep)>(
    session: &mut Session,
    arg: &str,
    reports: &mut Vec<MoveReport>,
    observe: &mut F,
) -> Result<(), CommandError> {
    let digits = arrow_digits(arg);
    if digits.is_empty() {
        return Err(CommandError::NoValidDigits);
    }

    let mut incoming: Option<usize> = None;
    for (executed, &raw) in digits.iter().enumerate() {
        let arrows = session.control_count();
        let slot = if executed == 0 {
            if raw >= arrows {
                return Err(CommandError::FirstArrowOutOfRange);
            }
            raw
        } else {
            if arrows == 0 || raw > arrows {
                return Err(CommandError::ArrowOutOfRange { executed });
            }
            (incoming.map_or(0, |slot| slot + 1) + raw) % arrows
        };

        let previous = session.current();
        press(session, Control::Slot(slot), reports, observe)?;
        let kind = reports.last().map(|r| r.kind);
        if kind != Some(OutcomeKind::Moved) {
            return Ok(());
        }
        incoming = session.incoming_slot(previous);
    }

    Ok(())
}
