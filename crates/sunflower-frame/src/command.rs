//! Protocol enumerations.
//!
//! Opcodes 0x00-0x13 are request/response commands. 0xFF is the error
//! sentinel whose data word carries an [`ErrorCode`].

use std::fmt;

/// Command opcode carried in byte 3 of every frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Command {
    /// Confirmation, or ping when sent by the host.
    Ok = 0x00,
    /// Put the device into the STOP state.
    Stop = 0x01,
    /// Leave STOP (refused while the physical stop is engaged).
    ResetStop = 0x02,
    /// Query the tracker state.
    GetState = 0x03,
    /// Halt tracking so a new setpoint can be configured.
    HaltTracking = 0x04,
    /// Resume tracking after a halt.
    StartTracking = 0x05,
    /// Run the homing sequence.
    Home = 0x06,
    /// Select a [`TrackingMode`].
    SetTrackingMode = 0x07,
    /// Target position for the right motor.
    SetMotorR = 0x08,
    /// Target position for the left motor.
    SetMotorL = 0x09,
    GetMotorPosR = 0x0A,
    GetMotorPosL = 0x0B,
    GetMotorTargetR = 0x0C,
    GetMotorTargetL = 0x0D,
    GetMotorsMoving = 0x0E,
    GetIsHoming = 0x0F,
    /// Photoresistor readings.
    GetReading1 = 0x10,
    GetReading2 = 0x11,
    GetReading3 = 0x12,
    GetReading4 = 0x13,
    /// Error sentinel; data carries an [`ErrorCode`].
    Error = 0xFF,
}

impl Command {
    /// Every opcode, in wire order.
    pub const ALL: [Command; 21] = [
        Command::Ok,
        Command::Stop,
        Command::ResetStop,
        Command::GetState,
        Command::HaltTracking,
        Command::StartTracking,
        Command::Home,
        Command::SetTrackingMode,
        Command::SetMotorR,
        Command::SetMotorL,
        Command::GetMotorPosR,
        Command::GetMotorPosL,
        Command::GetMotorTargetR,
        Command::GetMotorTargetL,
        Command::GetMotorsMoving,
        Command::GetIsHoming,
        Command::GetReading1,
        Command::GetReading2,
        Command::GetReading3,
        Command::GetReading4,
        Command::Error,
    ];

    /// Look up the opcode for a raw command byte.
    pub fn from_u8(byte: u8) -> Option<Self> {
        Self::ALL.iter().copied().find(|cmd| *cmd as u8 == byte)
    }

    /// The raw command byte.
    pub fn as_u8(self) -> u8 {
        self as u8
    }

    /// Protocol name of the opcode.
    pub fn name(self) -> &'static str {
        match self {
            Command::Ok => "OK",
            Command::Stop => "STOP",
            Command::ResetStop => "RESET_STOP",
            Command::GetState => "GET_STATE",
            Command::HaltTracking => "HALT_TRACKING",
            Command::StartTracking => "START_TRACKING",
            Command::Home => "HOME",
            Command::SetTrackingMode => "SET_TRACKING_MODE",
            Command::SetMotorR => "SET_MOTOR_R",
            Command::SetMotorL => "SET_MOTOR_L",
            Command::GetMotorPosR => "GET_MOTOR_POS_R",
            Command::GetMotorPosL => "GET_MOTOR_POS_L",
            Command::GetMotorTargetR => "GET_MOTOR_TARGET_R",
            Command::GetMotorTargetL => "GET_MOTOR_TARGET_L",
            Command::GetMotorsMoving => "GET_MOTORS_MOVING",
            Command::GetIsHoming => "GET_IS_HOMING",
            Command::GetReading1 => "GET_READING_1",
            Command::GetReading2 => "GET_READING_2",
            Command::GetReading3 => "GET_READING_3",
            Command::GetReading4 => "GET_READING_4",
            Command::Error => "ERROR",
        }
    }

    /// Parse a protocol name (`GET_STATE`, case-insensitive) or a numeric opcode.
    pub fn parse(input: &str) -> Option<Self> {
        let trimmed = input.trim();
        if let Some(hex) = trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"))
        {
            return u8::from_str_radix(hex, 16).ok().and_then(Self::from_u8);
        }
        if let Ok(byte) = trimmed.parse::<u8>() {
            return Self::from_u8(byte);
        }
        let wanted = trimmed.replace('-', "_");
        Self::ALL
            .iter()
            .copied()
            .find(|cmd| cmd.name().eq_ignore_ascii_case(&wanted))
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Operating state reported in the data word of a `GET_STATE` response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TrackerState {
    Idle,
    Tracking,
    Homing,
    Night,
    Stop,
    Warning,
    Error,
    Unknown,
}

impl TrackerState {
    /// Decode a state word. Values outside the table map to `Unknown`.
    pub fn from_data(data: u32) -> Self {
        match data {
            0 => TrackerState::Idle,
            1 => TrackerState::Tracking,
            2 => TrackerState::Homing,
            3 => TrackerState::Night,
            4 => TrackerState::Stop,
            5 => TrackerState::Warning,
            6 => TrackerState::Error,
            _ => TrackerState::Unknown,
        }
    }

    pub fn as_data(self) -> u32 {
        match self {
            TrackerState::Idle => 0,
            TrackerState::Tracking => 1,
            TrackerState::Homing => 2,
            TrackerState::Night => 3,
            TrackerState::Stop => 4,
            TrackerState::Warning => 5,
            TrackerState::Error => 6,
            TrackerState::Unknown => 7,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            TrackerState::Idle => "IDLE",
            TrackerState::Tracking => "TRACKING",
            TrackerState::Homing => "HOMING",
            TrackerState::Night => "NIGHT",
            TrackerState::Stop => "STOP",
            TrackerState::Warning => "WARNING",
            TrackerState::Error => "ERROR",
            TrackerState::Unknown => "UNKNOWN",
        }
    }
}

impl fmt::Display for TrackerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Tracking strategy selected with `SET_TRACKING_MODE`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TrackingMode {
    /// Setpoints come from the host over the link.
    Uart,
    FullSensor,
    Timed,
    Hybrid,
    Ai,
}

impl TrackingMode {
    pub fn from_data(data: u32) -> Option<Self> {
        match data {
            1 => Some(TrackingMode::Uart),
            2 => Some(TrackingMode::FullSensor),
            3 => Some(TrackingMode::Timed),
            4 => Some(TrackingMode::Hybrid),
            5 => Some(TrackingMode::Ai),
            _ => None,
        }
    }

    pub fn as_data(self) -> u32 {
        match self {
            TrackingMode::Uart => 1,
            TrackingMode::FullSensor => 2,
            TrackingMode::Timed => 3,
            TrackingMode::Hybrid => 4,
            TrackingMode::Ai => 5,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            TrackingMode::Uart => "UART_TRACKING",
            TrackingMode::FullSensor => "FULL_SENSOR_TRACKING",
            TrackingMode::Timed => "TIMED_TRACKING",
            TrackingMode::Hybrid => "HYBRID_TRACKING",
            TrackingMode::Ai => "AI_TRACKING",
        }
    }
}

impl fmt::Display for TrackingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Qualifier carried in the data word of an `OK` response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OkCode {
    Ok,
    MotorsStopped,
    HomingFinished,
    Other(u32),
}

impl OkCode {
    pub fn from_data(data: u32) -> Self {
        match data {
            0 => OkCode::Ok,
            1 => OkCode::MotorsStopped,
            2 => OkCode::HomingFinished,
            other => OkCode::Other(other),
        }
    }
}

/// Reason carried in the data word of an `ERROR` response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    Unknown,
    NotImplemented,
    ChecksumMismatch,
    MotorsOutOfRange,
    SafetyButtonNotReleased,
    Other(u32),
}

impl ErrorCode {
    pub fn from_data(data: u32) -> Self {
        match data {
            0 => ErrorCode::Unknown,
            1 => ErrorCode::NotImplemented,
            2 => ErrorCode::ChecksumMismatch,
            3 => ErrorCode::MotorsOutOfRange,
            4 => ErrorCode::SafetyButtonNotReleased,
            other => ErrorCode::Other(other),
        }
    }

    pub fn as_data(self) -> u32 {
        match self {
            ErrorCode::Unknown => 0,
            ErrorCode::NotImplemented => 1,
            ErrorCode::ChecksumMismatch => 2,
            ErrorCode::MotorsOutOfRange => 3,
            ErrorCode::SafetyButtonNotReleased => 4,
            ErrorCode::Other(code) => code,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorCode::Unknown => f.write_str("UNKNOWN"),
            ErrorCode::NotImplemented => f.write_str("NOT_IMPLEMENTED"),
            ErrorCode::ChecksumMismatch => f.write_str("CHECKSUM_MISMATCH"),
            ErrorCode::MotorsOutOfRange => f.write_str("MOTORS_OUT_OF_RANGE"),
            ErrorCode::SafetyButtonNotReleased => f.write_str("SAFETY_BUTTON_NOT_RELEASED"),
            ErrorCode::Other(code) => write!(f, "UNRECOGNIZED({code})"),
        }
    }
}
