//! Runtime entrypoint and the mapping from [`Outcome`] to the host's
//! return convention.

use solana_program::account_info::AccountInfo;
use solana_program::entrypoint::ProgramResult;
use solana_program::msg;
use solana_program::program_error::ProgramError;
use solana_program::pubkey::Pubkey;

use crate::consts::{LOG_EXHAUSTED_CODE, PATTERN_FOUND_CODE};
use crate::error::FilterError;
use crate::filter;
use crate::outcome::Outcome;
use crate::reporter::LogSink;

#[cfg(not(feature = "no-entrypoint"))]
solana_program::entrypoint!(process_instruction);

/// Writes through the runtime log syscall. The runtime keeps its own
/// compute-unit accounting line; nothing here suppresses it.
pub struct MsgSink;

impl LogSink for MsgSink {
    fn log(&mut self, line: &str) -> Result<(), FilterError> {
        msg!(line);
        Ok(())
    }
}

/// Scan the instruction data for the signature. Accounts are ignored.
pub fn process_instruction(
    _program_id: &Pubkey,
    _accounts: &[AccountInfo],
    instruction_data: &[u8],
) -> ProgramResult {
    let outcome = filter::invoke(instruction_data, &mut MsgSink);
    if let Outcome::Aborted(err @ FilterError::MalformedInput { .. }) = &outcome {
        msg!("aborted: {}", err);
    }
    to_program_result(outcome)
}

/// `Accepted` returns 0, a filter rejection returns 1, aborts map to
/// errors the runtime reports distinctly.
pub fn to_program_result(outcome: Outcome) -> ProgramResult {
    match outcome {
        Outcome::Accepted => Ok(()),
        Outcome::RejectedByFilter { .. } => Err(ProgramError::Custom(PATTERN_FOUND_CODE)),
        Outcome::Aborted(FilterError::MalformedInput { .. }) => {
            Err(ProgramError::InvalidInstructionData)
        }
        Outcome::Aborted(FilterError::LogExhausted { .. }) => {
            Err(ProgramError::Custom(LOG_EXHAUSTED_CODE))
        }
    }
}

/// The raw value the entrypoint hands back to the runtime.
pub fn return_code(result: ProgramResult) -> u64 {
    match result {
        Ok(()) => 0,
        Err(err) => u64::from(err),
    }
}
