//! Wire protocol constants for the fireplace WiFi module
//!
//! Every payload travels as ASCII hex between an STX and an ETX byte. The
//! payload strings below are exactly what goes on the wire.

use std::time::Duration;

// ============================================================================
// Framing
// ============================================================================

/// Start-of-frame marker
pub const STX: u8 = 0x02;

/// End-of-frame marker
pub const ETX: u8 = 0x03;

/// Smallest well-formed frame: STX + ETX + at least one payload byte
pub const MIN_FRAME_LEN: usize = 3;

/// Largest frame accepted by the stream framer
///
/// The biggest known reply (53-byte device info) is 106 hex characters plus
/// the two markers; anything near this limit is noise.
pub const MAX_FRAME_LEN: usize = 1024;

/// Receive buffer size for one response
pub const RESPONSE_BUFFER_SIZE: usize = 1024;

// ============================================================================
// Command payloads (ASCII hex)
// ============================================================================

pub const CMD_STATUS: &[u8] = b"303030308003";
pub const CMD_POWER_OFF: &[u8] = b"303030308010";

/// Power-on step 1: initialize
pub const CMD_POWER_ON_INIT: &[u8] = b"3030303080FE00";
/// Power-on step 2: firmware query
pub const CMD_POWER_ON_FIRMWARE: &[u8] = b"303030308001";
/// Power-on step 3: ignite trigger
pub const CMD_POWER_ON_IGNITE: &[u8] = b"30303030801A";

pub const CMD_BURNER2_ON: &[u8] = b"30303030802001";
pub const CMD_BURNER2_OFF: &[u8] = b"30303030802000";

/// Flame-set prefix; followed by the hardware value as two uppercase hex digits
pub const CMD_FLAME_PREFIX: &str = "303030308016";

// ============================================================================
// Flame value range
// ============================================================================

/// Lowest "on" flame value (0x80 is the minimum flame, not off)
pub const FLAME_HW_MIN: u8 = 0x80;
pub const FLAME_HW_MAX: u8 = 0xFF;

/// Width of the hardware flame range above the minimum
pub const FLAME_HW_SPAN: f64 = 127.0;

pub const FLAME_PCT_MAX: i32 = 100;

// ============================================================================
// Status response layout
// ============================================================================

/// Minimum decoded length of a status reply
pub const STATUS_MIN_LEN: usize = 18;

/// Byte offset of the flame/power byte
pub const STATUS_FLAME_OFFSET: usize = 7;

/// Byte offset of the status bit field
pub const STATUS_BITS_OFFSET: usize = 9;

/// Status bit 3: second burner engaged
pub const STATUS_BIT_BURNER2: u8 = 0x08;

/// Status bit 7: pilot flame lit
pub const STATUS_BIT_PILOT: u8 = 0x80;

// ============================================================================
// Timings
// ============================================================================

pub const DEFAULT_STATUS_TIMEOUT: Duration = Duration::from_secs(5);
pub const DEFAULT_COMMAND_TIMEOUT: Duration = Duration::from_secs(5);
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Timeout of each power-on step
pub const DEFAULT_STEP_TIMEOUT: Duration = Duration::from_secs(2);

/// Pause between consecutive power-on steps
pub const DEFAULT_STEP_PAUSE: Duration = Duration::from_millis(500);

// ============================================================================
// Device defaults
// ============================================================================

pub const DEFAULT_DEVICE_HOST: &str = "192.168.0.22";
pub const DEFAULT_DEVICE_PORT: u16 = 2000;
