/// Prefix marking a linearized model name.
pub const LINEAR_PREFIX: &str = "linear_";

/// Separator between the base name and the active DOF indices.
pub const DOF_MARKER: &str = "_j";

/// Default multiple-shooting step size in milliseconds.
pub const DEFAULT_STEP_SIZE_MS: u64 = 2;

/// Default number of multiple-shooting nodes.
pub const DEFAULT_SHOOTING_NODES: usize = 25;

/// Default magnitude of the symmetric state bounds (unbounded).
pub const DEFAULT_STATE_BOUND: f64 = f64::INFINITY;

/// Default magnitude of the symmetric control bounds (unbounded).
pub const DEFAULT_CONTROL_BOUND: f64 = f64::INFINITY;

/// Standard gravity (m/s²)
pub const GRAVITY: f64 = 9.80665;

/// Prefix of the actuator torque symbols (`T0`, `T1`, ...).
pub const TORQUE_PREFIX: &str = "T";

/// Suffix appended to a position symbol to name its velocity.
pub const VELOCITY_SUFFIX: &str = "_dot";
