//! Device command set

use std::borrow::Cow;
use std::fmt;

use super::constants::{
    CMD_BURNER2_OFF, CMD_BURNER2_ON, CMD_FLAME_PREFIX, CMD_POWER_OFF, CMD_POWER_ON_FIRMWARE,
    CMD_POWER_ON_IGNITE, CMD_POWER_ON_INIT, CMD_STATUS,
};

/// A command understood by the fireplace module
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Device info / status query
    Status,
    /// Network standby
    PowerOff,
    /// Power-on step 1
    PowerOnInit,
    /// Power-on step 2
    FirmwareQuery,
    /// Power-on step 3
    Ignite,
    /// Set flame height to a hardware value (0x80-0xFF)
    SetFlame(u8),
    Burner2On,
    Burner2Off,
}

/// Power-on steps, in wire order
pub const POWER_ON_SEQUENCE: [Command; 3] =
    [Command::PowerOnInit, Command::FirmwareQuery, Command::Ignite];

impl Command {
    /// ASCII-hex payload as sent inside the frame
    pub fn payload(&self) -> Cow<'static, [u8]> {
        match self {
            Command::Status => Cow::Borrowed(CMD_STATUS),
            Command::PowerOff => Cow::Borrowed(CMD_POWER_OFF),
            Command::PowerOnInit => Cow::Borrowed(CMD_POWER_ON_INIT),
            Command::FirmwareQuery => Cow::Borrowed(CMD_POWER_ON_FIRMWARE),
            Command::Ignite => Cow::Borrowed(CMD_POWER_ON_IGNITE),
            Command::SetFlame(value) => {
                Cow::Owned(format!("{}{:02X}", CMD_FLAME_PREFIX, value).into_bytes())
            },
            Command::Burner2On => Cow::Borrowed(CMD_BURNER2_ON),
            Command::Burner2Off => Cow::Borrowed(CMD_BURNER2_OFF),
        }
    }

    /// Identify a command from its raw (hex-decoded) payload bytes
    pub fn from_raw(raw: &[u8]) -> Option<Command> {
        let ascii = common::hex::encode_upper(raw);
        let ascii = ascii.as_bytes();

        if let Some(value) = ascii.strip_prefix(CMD_FLAME_PREFIX.as_bytes()) {
            return match raw.last() {
                Some(&hw) if value.len() == 2 => Some(Command::SetFlame(hw)),
                _ => None,
            };
        }

        [
            Command::Status,
            Command::PowerOff,
            Command::PowerOnInit,
            Command::FirmwareQuery,
            Command::Ignite,
            Command::Burner2On,
            Command::Burner2Off,
        ]
        .into_iter()
        .find(|cmd| &cmd.payload()[..] == ascii)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Command::Status => "status",
            Command::PowerOff => "power_off",
            Command::PowerOnInit => "power_on_init",
            Command::FirmwareQuery => "firmware_query",
            Command::Ignite => "ignite",
            Command::SetFlame(_) => "set_flame",
            Command::Burner2On => "burner2_on",
            Command::Burner2Off => "burner2_off",
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::SetFlame(value) => write!(f, "set_flame(0x{:02X})", value),
            other => f.write_str(other.name()),
        }
    }
}
