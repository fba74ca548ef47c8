//! Measurement modes of the GPU performance tester.
//!
//! Only the mode selection lives here; the measurements themselves are run by the renderer.

bitflags! {
    /// Measurement modes. Setting a mode set replaces the previous one.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct PerformanceEnables: u32 {
        const CONSTANTS        = 0x01;
        const BASELINE         = 0x02;
        const NO_DRAW          = 0x04;
        const MINIMUM_VIEWPORT = 0x08;
        const RESOURCE         = 0x10;
        const GPU_MEMORY       = 0x20;
        const GL_TRACE         = 0x40;
    }
}

/// Runs GPU benchmarks against a render window of a fixed size.
#[derive(Clone, Debug)]
pub struct GpuPerformanceTester {
    width: u32,
    height: u32,
    enables: PerformanceEnables,
}

impl GpuPerformanceTester {
    /// `width` and `height` are the dimensions of the GL render window.
    ///
    /// Every mode but `RESOURCE` starts enabled.
    pub fn new(width: u32, height: u32) -> GpuPerformanceTester {
        GpuPerformanceTester {
            width,
            height,
            enables: PerformanceEnables::all() - PerformanceEnables::RESOURCE,
        }
    }

    /// Enables exactly the modes in `enables`.
    ///
    /// `RESOURCE` and `GPU_MEMORY` can't be measured together; when both are requested `RESOURCE`
    /// is dropped and a warning is logged.
    pub fn set_enables(&mut self, mut enables: PerformanceEnables) {
        if enables.contains(PerformanceEnables::RESOURCE | PerformanceEnables::GPU_MEMORY) {
            enables.remove(PerformanceEnables::RESOURCE);
            warn!("GpuPerformanceTester: kResource and kGpuMemory are incompatible. \
                   Disabling kResource.");
        }
        self.enables = enables;
    }

    #[inline]
    pub fn enables(&self) -> PerformanceEnables {
        self.enables
    }

    /// Whether every mode in `enables` is enabled.
    #[inline]
    pub fn are_modes_enabled(&self, enables: PerformanceEnables) -> bool {
        self.enables.contains(enables)
    }

    #[inline]
    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}

#[cfg(test)]
mod tests {
    use super::{GpuPerformanceTester, PerformanceEnables};
    use crate::tests::log_checker::LogChecker;

    #[test]
    fn test_default_enables() {
        let perf = GpuPerformanceTester::new(32, 16);
        assert_eq!(perf.size(), (32, 16));
        assert!(perf.are_modes_enabled(PerformanceEnables::CONSTANTS | PerformanceEnables::GL_TRACE));
        assert!(!perf.are_modes_enabled(PerformanceEnables::RESOURCE));
    }

    #[test]
    fn test_set_enables() {
        let log_checker = LogChecker::new();
        let mut perf = GpuPerformanceTester::new(1, 1);

        perf.set_enables(PerformanceEnables::CONSTANTS);
        assert_eq!(perf.enables(), PerformanceEnables::CONSTANTS);
        perf.set_enables(PerformanceEnables::empty());
        assert_eq!(perf.enables(), PerformanceEnables::empty());
        perf.set_enables(PerformanceEnables::MINIMUM_VIEWPORT | PerformanceEnables::GPU_MEMORY);
        assert_eq!(perf.enables(),
                   PerformanceEnables::MINIMUM_VIEWPORT | PerformanceEnables::GPU_MEMORY);
        assert!(!log_checker.has_any_messages());

        perf.set_enables(PerformanceEnables::MINIMUM_VIEWPORT |
                         PerformanceEnables::GPU_MEMORY |
                         PerformanceEnables::RESOURCE);
        assert_eq!(perf.enables(),
                   PerformanceEnables::MINIMUM_VIEWPORT | PerformanceEnables::GPU_MEMORY);
        assert!(log_checker.has_message(log::Level::Warn,
                                        "kResource and kGpuMemory are incompatible"));
    }

    #[test]
    fn test_resource_alone_is_kept() {
        let log_checker = LogChecker::new();
        let mut perf = GpuPerformanceTester::new(1, 1);
        perf.set_enables(PerformanceEnables::RESOURCE | PerformanceEnables::BASELINE);
        assert!(perf.are_modes_enabled(PerformanceEnables::RESOURCE));
        assert!(!log_checker.has_any_messages());
    }
}
