//! Command line parsing
//!
//! Turns one upper-cased input line into a [`Command`]. Only the first two
//! characters of the mnemonic are significant, so `GO`, `GO!` and `GOTO`
//! all start channels.

use galvani_core::config::{ChannelSelect, PhaseTimes, RampDelta, SettingsError, Voltage};

/// Access code required by the reboot command
pub const ACCESS_CODE: u32 = 0xC0DE;

/// Parsed operator command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Command {
    /// `HE`: list commands
    Help,
    /// `VE`: firmware version
    Version,
    /// `BO <code>`: reboot, code already checked
    Reboot,
    /// `HA`: echo-only mode
    EchoOnly,
    /// `ST`: engine state of every channel
    State,
    /// `GO <ch|A>`
    Start(ChannelSelect),
    /// `SP <ch|A>`
    Stop(ChannelSelect),
    /// `VO <ch>,<pos>,<neg>`
    SetVoltage {
        /// Target channel
        channel: usize,
        /// New amplitudes
        voltage: Voltage,
    },
    /// `TI <ch>,<t0>,<t1>,<t2>,<t3>,<t4>`
    SetTimes {
        /// Target channel
        channel: usize,
        /// New phase timing
        times: PhaseTimes,
    },
    /// `DE <ch>,<step>,<pulses>,<max>`
    SetDelta {
        /// Target channel
        channel: usize,
        /// New ramp
        delta: RampDelta,
    },
    /// `RC <ch>,<count>`
    SetRepeatCount {
        /// Target channel
        channel: usize,
        /// Pulse limit (0 = unlimited)
        count: u16,
    },
    /// `QS <ch>`
    Query(usize),
    /// `SS`: write settings to flash
    Store,
    /// `LS`: reload settings from flash
    Load,
}

/// Reasons a line is rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CommandError {
    /// Mnemonic not in the command table
    UnknownCommand,
    /// Fewer arguments than the command needs
    ParameterMissing,
    /// Argument is not a number in range of its field
    InvalidNumber,
    /// Value outside the accepted bounds
    ParameterOutOfBounds,
    /// Channel index not present on this board
    NoSuchChannel,
    /// Wrong access code
    AccessDenied,
}

impl CommandError {
    /// Short operator-facing description
    pub const fn describe(self) -> &'static str {
        match self {
            CommandError::UnknownCommand => "unknown command",
            CommandError::ParameterMissing => "missing",
            CommandError::InvalidNumber => "invalid number",
            CommandError::ParameterOutOfBounds => "out of bounds",
            CommandError::NoSuchChannel => "no such channel",
            CommandError::AccessDenied => "access code",
        }
    }
}

impl From<SettingsError> for CommandError {
    fn from(e: SettingsError) -> Self {
        match e {
            SettingsError::ParameterOutOfBounds => CommandError::ParameterOutOfBounds,
            SettingsError::NoSuchChannel => CommandError::NoSuchChannel,
        }
    }
}

/// Argument separators
pub fn is_separator(c: char) -> bool {
    matches!(c, ' ' | ',' | ':' | '\t')
}

/// Parse one input line
///
/// Returns `Ok(None)` for a line with no mnemonic (empty, or a single
/// character), which the terminal answers with a fresh prompt.
pub fn parse(line: &str) -> Result<Option<Command>, CommandError> {
    let mut tokens = line.split(is_separator).filter(|t| !t.is_empty());
    let Some(mnemonic) = tokens.next() else {
        return Ok(None);
    };
    let Some(key) = mnemonic.get(..2) else {
        return Ok(None);
    };
    let mut args = Args { tokens };

    let command = match key {
        "HE" => Command::Help,
        "VE" => Command::Version,
        "BO" => {
            let code = u32::from_str_radix(args.next()?, 16)
                .map_err(|_| CommandError::InvalidNumber)?;
            if code != ACCESS_CODE {
                return Err(CommandError::AccessDenied);
            }
            Command::Reboot
        }
        "HA" => Command::EchoOnly,
        "ST" => Command::State,
        "GO" => Command::Start(args.select()?),
        "SP" => Command::Stop(args.select()?),
        "VO" => Command::SetVoltage {
            channel: args.channel()?,
            voltage: Voltage {
                positive: args.byte()?,
                negative: args.byte()?,
            },
        },
        "TI" => {
            let channel = args.channel()?;
            let mut t = [0u16; 5];
            for slot in &mut t {
                *slot = args.word()?;
            }
            Command::SetTimes {
                channel,
                times: PhaseTimes::from_array(t),
            }
        }
        "DE" => Command::SetDelta {
            channel: args.channel()?,
            delta: RampDelta {
                step: args.word()?,
                pulses_per_step: args.word()?,
                max_steps: args.word()?,
            },
        },
        "RC" => Command::SetRepeatCount {
            channel: args.channel()?,
            count: args.word()?,
        },
        "QS" => Command::Query(args.channel()?),
        "SS" => Command::Store,
        "LS" => Command::Load,
        _ => return Err(CommandError::UnknownCommand),
    };

    Ok(Some(command))
}

struct Args<I> {
    tokens: I,
}

impl<'a, I: Iterator<Item = &'a str>> Args<I> {
    fn next(&mut self) -> Result<&'a str, CommandError> {
        self.tokens.next().ok_or(CommandError::ParameterMissing)
    }

    fn word(&mut self) -> Result<u16, CommandError> {
        self.next()?
            .parse()
            .map_err(|_| CommandError::InvalidNumber)
    }

    fn byte(&mut self) -> Result<u8, CommandError> {
        u8::try_from(self.word()?).map_err(|_| CommandError::ParameterOutOfBounds)
    }

    fn channel(&mut self) -> Result<usize, CommandError> {
        self.word().map(usize::from)
    }

    fn select(&mut self) -> Result<ChannelSelect, CommandError> {
        let token = self.next()?;
        if token == "A" {
            return Ok(ChannelSelect::All);
        }
        token
            .parse::<u16>()
            .map(|ch| ChannelSelect::One(usize::from(ch)))
            .map_err(|_| CommandError::InvalidNumber)
    }
}
