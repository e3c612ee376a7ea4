// CLI definitions using clap

use clap::{Parser, Subcommand, ValueEnum};

use chroma_device::LedType;

#[derive(Parser)]
#[command(name = "chroma-driver")]
#[command(author, version, about = "Razer Chroma peripheral driver")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Select device by index when several are connected (see `list`)
    #[arg(long, global = true, value_name = "INDEX")]
    pub device: Option<usize>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List connected supported devices
    #[command(visible_alias = "ls")]
    List,

    /// Show model, firmware version, and serial number
    #[command(visible_alias = "i")]
    Info,

    /// Get or set master brightness
    #[command(visible_aliases = ["bright", "b"])]
    Brightness {
        /// New level, 0-100 (omit to read the current level)
        level: Option<f32>,
    },

    /// Set a static LED color
    #[command(visible_alias = "c")]
    Color {
        /// Red component (0-255)
        r: u8,
        /// Green component (0-255)
        g: u8,
        /// Blue component (0-255)
        b: u8,
        /// Which LED to color
        #[arg(long, value_enum, default_value_t = LedArg::Backlight)]
        led: LedArg,
    },

    /// Return the device to hardware-controlled (normal) mode
    Reset,
}

/// LEDs addressable from the command line
#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum LedArg {
    Backlight,
    Logo,
    ScrollWheel,
}

impl From<LedArg> for LedType {
    fn from(arg: LedArg) -> Self {
        match arg {
            LedArg::Backlight => LedType::Backlight,
            LedArg::Logo => LedType::Logo,
            LedArg::ScrollWheel => LedType::ScrollWheel,
        }
    }
}
