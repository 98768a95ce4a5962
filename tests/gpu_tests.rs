#[cfg(feature = "gpu")]
mod gpu_tests {
    use gemm_tiling::config::TileConfig;
    use gemm_tiling::gpu::{build_program, find_device};
    use gemm_tiling::kernels::GemmKernel;
    use ocl::Context;

    // Fails to compile unless every constant arrives through the -D options
    const PROBE_KERNEL: &str = r#"
        __kernel void probe(__global int* out) {
            out[0] = TS;
            out[1] = WPT;
            out[2] = RTS;
            out[3] = WIDTH;
            out[4] = TSDK;
            out[5] = LPT;
        }
    "#;

    fn context() -> Option<(Context, ocl::Device)> {
        let (platform, device) = find_device().ok()?;
        let context = Context::builder()
            .platform(platform)
            .devices(device)
            .build()
            .ok()?;
        Some((context, device))
    }

    #[test]
    fn test_program_builds_with_defines() {
        let Some((context, device)) = context() else {
            eprintln!("No OpenCL device, skipping");
            return;
        };

        let program = build_program(&context, device, PROBE_KERNEL, &TileConfig::default(), None);
        assert!(program.is_ok(), "{:?}", program.err());
    }

    #[test]
    fn test_restricted_defines_leave_others_undefined() {
        let Some((context, device)) = context() else {
            eprintln!("No OpenCL device, skipping");
            return;
        };

        let program = build_program(
            &context,
            device,
            PROBE_KERNEL,
            &TileConfig::default(),
            Some(&[GemmKernel::Naive]),
        );
        assert!(program.is_err());
    }
}
