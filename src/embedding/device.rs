use candle_core::Device;
use tracing::{debug, info, warn};

type BackendInit = fn() -> candle_core::Result<Device>;

/// GPU backends compiled into this build, in order of preference.
fn gpu_backends() -> Vec<(&'static str, BackendInit)> {
    #[allow(unused_mut)]
    let mut backends: Vec<(&'static str, BackendInit)> = Vec::new();

    #[cfg(feature = "metal")]
    backends.push(("metal", || Device::new_metal(0)));

    #[cfg(feature = "cuda")]
    backends.push(("cuda", || Device::new_cuda(0)));

    backends
}

/// Picks the first GPU backend that opens, otherwise the CPU.
pub fn select_device() -> Device {
    for (backend, init) in gpu_backends() {
        match init() {
            Ok(device) => {
                info!(backend, "Embedders using GPU acceleration");
                return device;
            }
            Err(e) => warn!(backend, error = %e, "GPU backend unavailable"),
        }
    }

    debug!("Embedders running on CPU");
    Device::Cpu
}
