//! Command descriptors
//!
//! A [`Command`] identifies one hardware operation: the command class, the
//! command id within that class, and the argument byte count the firmware
//! expects back in a response. Descriptors carry no behavior and are meant
//! to be declared as named constants grouped per device family (see the
//! `commands` module in the device crate).

use std::fmt;

/// Immutable descriptor of a hardware command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Command {
    /// Command class byte (e.g. 0x03 for LED control)
    pub class: u8,
    /// Command id within the class
    pub id: u8,
    /// Argument/response payload size the firmware associates with this
    /// command
    pub data_size: u8,
}

impl Command {
    pub const fn new(class: u8, id: u8, data_size: u8) -> Self {
        Self {
            class,
            id,
            data_size,
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "command {:02X}:{:02X}", self.class, self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_shows_class_and_id() {
        let cmd = Command::new(0x0E, 0x84, 0x02);
        assert_eq!(cmd.to_string(), "command 0E:84");
    }

    #[test]
    fn descriptors_compare_by_value() {
        const GET: Command = Command::new(0x03, 0x83, 0x03);
        assert_eq!(GET, Command::new(0x03, 0x83, 0x03));
        assert_ne!(GET, Command::new(0x03, 0x03, 0x03));
    }
}
