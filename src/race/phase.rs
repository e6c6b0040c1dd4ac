use std::fmt;
use std::time::Duration;

/// Progress of one race attempt. Phases only move forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum RacePhase {
    Setup,
    MembersUp,
    ClientUp,
    MembersDown,
    ClientShutdownRequested,
    Settled,
}

impl RacePhase {
    /// Phase that must follow this one, `None` once settled.
    pub fn next(self) -> Option<RacePhase> {
        match self {
            RacePhase::Setup => Some(RacePhase::MembersUp),
            RacePhase::MembersUp => Some(RacePhase::ClientUp),
            RacePhase::ClientUp => Some(RacePhase::MembersDown),
            RacePhase::MembersDown => Some(RacePhase::ClientShutdownRequested),
            RacePhase::ClientShutdownRequested => Some(RacePhase::Settled),
            RacePhase::Settled => None,
        }
    }
}

/// When the client shutdown is issued relative to member shutdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownTiming {
    /// Right after the last member is down
    Immediate,
    /// After the given pause, while the client sits in its reconnect loop
    Delayed(Duration),
}

impl ShutdownTiming {
    pub fn delay(self) -> Duration {
        match self {
            ShutdownTiming::Immediate => Duration::ZERO,
            ShutdownTiming::Delayed(d) => d,
        }
    }
}

impl fmt::Display for ShutdownTiming {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        match self {
            ShutdownTiming::Immediate => f.write_str("immediate"),
            ShutdownTiming::Delayed(d) => write!(f, "delayed({}ms)", d.as_millis()),
        }
    }
}
