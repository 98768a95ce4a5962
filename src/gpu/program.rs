use crate::config::TileConfig;
use crate::defines::{compiler_options, compiler_options_for};
use crate::error::{Result, TilingError};
use crate::kernels::GemmKernel;
use ocl::enums::{DeviceInfo, DeviceInfoResult};
use ocl::{Context, Device, DeviceType, Platform, Program};

/// Pick a device to compile for: the first GPU, else the first CPU device
pub fn find_device() -> Result<(Platform, Device)> {
    let platforms = match std::panic::catch_unwind(Platform::list) {
        Ok(platforms) => platforms,
        Err(_) => return Err(TilingError::Gpu("OpenCL not available".to_string())),
    };

    if platforms.is_empty() {
        return Err(TilingError::Gpu("No OpenCL platforms found".to_string()));
    }

    for wanted in [DeviceType::GPU, DeviceType::CPU] {
        for platform in &platforms {
            let devices = Device::list_all(platform)
                .map_err(|e| TilingError::Gpu(format!("Failed to list devices: {}", e)))?;

            for device in &devices {
                let info = device
                    .info(DeviceInfo::Type)
                    .map_err(|e| TilingError::Gpu(e.to_string()))?;
                if let DeviceInfoResult::Type(dtype) = info {
                    if dtype == wanted {
                        log::debug!("Selected OpenCL device {:?}", device.name());
                        return Ok((*platform, *device));
                    }
                }
            }
        }
    }

    Err(TilingError::Gpu("No OpenCL device found (neither GPU nor CPU)".to_string()))
}

/// Compile `src` for `device` with the tuning constants passed as `-D` options.
///
/// With `kernels` set, only the constants those kernels read are defined. The config's
/// `TS x TS` work-group must fit the device.
pub fn build_program(
    context: &Context,
    device: Device,
    src: &str,
    config: &TileConfig,
    kernels: Option<&[GemmKernel]>,
) -> Result<Program> {
    let max_work_group_size = device
        .max_wg_size()
        .map_err(|e| TilingError::Gpu(e.to_string()))?;
    config.check_work_group_limit(max_work_group_size)?;

    let options = match kernels {
        Some(kernels) => compiler_options_for(config, kernels),
        None => compiler_options(config),
    };
    log::debug!("Building program with options: {}", options);

    Program::builder()
        .source(src)
        .devices(device)
        .cmplr_opt(options)
        .build(context)
        .map_err(|e| TilingError::Gpu(format!("Failed to build program: {}", e)))
}
