//! Error types for jitterfield.
//!
//! Cancelling a worker is never an error; these cover configuration,
//! thread lifecycle, GPU setup and the window event loop.

use std::fmt;

/// Invalid startup configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// At least one worker is required.
    ZeroWorkers,
    /// The canvas has no area, so no position is valid.
    EmptyCanvas { width: u32, height: u32 },
    /// A side does not fit the `i32` coordinate type.
    CanvasTooLarge { width: u32, height: u32 },
    /// Workers would spin without pacing.
    ZeroFrameInterval,
    /// Offset magnitude must be non-negative.
    NegativeJitter(i32),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::ZeroWorkers => write!(f, "worker count must be at least 1"),
            ConfigError::EmptyCanvas { width, height } => {
                write!(f, "canvas must have a positive area, got {}x{}", width, height)
            }
            ConfigError::CanvasTooLarge { width, height } => {
                write!(f, "canvas {}x{} exceeds the coordinate range", width, height)
            }
            ConfigError::ZeroFrameInterval => write!(f, "frame interval must be greater than zero"),
            ConfigError::NegativeJitter(j) => write!(f, "jitter must be non-negative, got {}", j),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Errors raised by the worker lifecycle controller.
#[derive(Debug)]
pub enum LifecycleError {
    /// `start` was called on a controller that already left the idle state.
    AlreadyStarted,
    /// The OS refused to spawn a worker thread.
    Spawn(std::io::Error),
}

impl fmt::Display for LifecycleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LifecycleError::AlreadyStarted => write!(f, "workers were already started"),
            LifecycleError::Spawn(e) => write!(f, "failed to spawn worker thread: {}", e),
        }
    }
}

impl std::error::Error for LifecycleError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LifecycleError::Spawn(e) => Some(e),
            LifecycleError::AlreadyStarted => None,
        }
    }
}

/// Errors that can occur during GPU initialization.
#[derive(Debug)]
pub enum GpuError {
    /// Failed to create a surface for rendering.
    SurfaceCreation(wgpu::CreateSurfaceError),
    /// No compatible GPU adapter found.
    NoAdapter(wgpu::RequestAdapterError),
    /// Failed to create GPU device.
    DeviceCreation(wgpu::RequestDeviceError),
}

impl fmt::Display for GpuError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GpuError::SurfaceCreation(e) => write!(f, "Failed to create GPU surface: {}", e),
            GpuError::NoAdapter(e) => write!(f, "No compatible GPU adapter found: {}", e),
            GpuError::DeviceCreation(e) => write!(f, "Failed to create GPU device: {}", e),
        }
    }
}

impl std::error::Error for GpuError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            GpuError::SurfaceCreation(e) => Some(e),
            GpuError::NoAdapter(e) => Some(e),
            GpuError::DeviceCreation(e) => Some(e),
        }
    }
}

impl From<wgpu::CreateSurfaceError> for GpuError {
    fn from(e: wgpu::CreateSurfaceError) -> Self {
        GpuError::SurfaceCreation(e)
    }
}

impl From<wgpu::RequestAdapterError> for GpuError {
    fn from(e: wgpu::RequestAdapterError) -> Self {
        GpuError::NoAdapter(e)
    }
}

impl From<wgpu::RequestDeviceError> for GpuError {
    fn from(e: wgpu::RequestDeviceError) -> Self {
        GpuError::DeviceCreation(e)
    }
}

/// Errors that can occur when running a simulation.
#[derive(Debug)]
pub enum SimulationError {
    /// Configuration rejected before anything started.
    Config(ConfigError),
    /// Failed to create or run the event loop.
    EventLoop(winit::error::EventLoopError),
    /// Failed to create window.
    Window(winit::error::OsError),
    /// GPU initialization failed.
    Gpu(GpuError),
    /// Workers could not be started.
    Lifecycle(LifecycleError),
}

impl fmt::Display for SimulationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SimulationError::Config(e) => write!(f, "Invalid configuration: {}", e),
            SimulationError::EventLoop(e) => write!(f, "Event loop error: {}", e),
            SimulationError::Window(e) => write!(f, "Failed to create window: {}", e),
            SimulationError::Gpu(e) => write!(f, "GPU error: {}", e),
            SimulationError::Lifecycle(e) => write!(f, "Worker error: {}", e),
        }
    }
}

impl std::error::Error for SimulationError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SimulationError::Config(e) => Some(e),
            SimulationError::EventLoop(e) => Some(e),
            SimulationError::Window(e) => Some(e),
            SimulationError::Gpu(e) => Some(e),
            SimulationError::Lifecycle(e) => Some(e),
        }
    }
}

impl From<ConfigError> for SimulationError {
    fn from(e: ConfigError) -> Self {
        SimulationError::Config(e)
    }
}

impl From<winit::error::EventLoopError> for SimulationError {
    fn from(e: winit::error::EventLoopError) -> Self {
        SimulationError::EventLoop(e)
    }
}

impl From<winit::error::OsError> for SimulationError {
    fn from(e: winit::error::OsError) -> Self {
        SimulationError::Window(e)
    }
}

impl From<GpuError> for SimulationError {
    fn from(e: GpuError) -> Self {
        SimulationError::Gpu(e)
    }
}

impl From<LifecycleError> for SimulationError {
    fn from(e: LifecycleError) -> Self {
        SimulationError::Lifecycle(e)
    }
}
