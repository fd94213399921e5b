use serde::{Deserialize, Serialize};
use std::fmt;

/// Worker lifecycle phases.
///
/// `Idle → Provisioning → Running → {Rotating, Degraded, Draining}`;
/// `Rotating` and `Degraded` loop back through `Provisioning`, `Draining`
/// terminates the worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkerPhase {
    /// No resource held; the worker has not started provisioning yet.
    Idle,
    /// Acquiring a fresh resource from the provisioner.
    Provisioning,
    /// Executing tasks against the held resource.
    Running,
    /// Releasing the current resource ahead of re-provisioning.
    Rotating,
    /// Provisioning retries exhausted; cooling down before trying again.
    Degraded,
    /// Queue drained or stop requested; releasing and terminating.
    Draining,
}

impl WorkerPhase {
    /// Check if this phase ends the worker's run loop.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Draining)
    }

    /// Check if the worker holds a resource while in this phase.
    pub fn holds_resource(&self) -> bool {
        matches!(self, Self::Running | Self::Rotating)
    }
}

impl Default for WorkerPhase {
    fn default() -> Self {
        Self::Idle
    }
}

impl fmt::Display for WorkerPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Provisioning => write!(f, "provisioning"),
            Self::Running => write!(f, "running"),
            Self::Rotating => write!(f, "rotating"),
            Self::Degraded => write!(f, "degraded"),
            Self::Draining => write!(f, "draining"),
        }
    }
}

impl std::str::FromStr for WorkerPhase {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "idle" => Ok(Self::Idle),
            "provisioning" => Ok(Self::Provisioning),
            "running" => Ok(Self::Running),
            "rotating" => Ok(Self::Rotating),
            "degraded" => Ok(Self::Degraded),
            "draining" => Ok(Self::Draining),
            _ => Err(format!("Invalid worker phase: {s}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_check() {
        assert!(WorkerPhase::Draining.is_terminal());
        assert!(!WorkerPhase::Idle.is_terminal());
        assert!(!WorkerPhase::Running.is_terminal());
        assert!(!WorkerPhase::Degraded.is_terminal());
    }

    #[test]
    fn test_resource_holding_phases() {
        assert!(WorkerPhase::Running.holds_resource());
        assert!(WorkerPhase::Rotating.holds_resource());
        assert!(!WorkerPhase::Provisioning.holds_resource());
        assert!(!WorkerPhase::Degraded.holds_resource());
    }

    #[test]
    fn test_phase_string_conversion() {
        assert_eq!(WorkerPhase::Provisioning.to_string(), "provisioning");
        assert_eq!("rotating".parse::<WorkerPhase>().unwrap(), WorkerPhase::Rotating);
        assert!("unknown".parse::<WorkerPhase>().is_err());
    }

    #[test]
    fn test_phase_serde() {
        let json = serde_json::to_string(&WorkerPhase::Degraded).unwrap();
        assert_eq!(json, "\"degraded\"");

        let parsed: WorkerPhase = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, WorkerPhase::Degraded);
    }
}
