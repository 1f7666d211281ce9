// Facade that dispatches to either the real output or a mock in tests.

use std::io;
use std::path::Path;
#[cfg(test)]
use std::sync::Arc;

#[cfg(test)]
use crate::pal::MockOutput;
use crate::pal::{BuildTargetOutput, Output};

/// Dispatches to the real output or, in tests, to a mock.
#[derive(Clone)]
pub(crate) enum OutputFacade {
    Target(&'static BuildTargetOutput),

    #[cfg(test)]
    Mock(Arc<MockOutput>),
}

static BUILD_TARGET_OUTPUT: BuildTargetOutput = BuildTargetOutput;

// Facade types are trivial pass-through layers - not worth testing.
#[cfg_attr(coverage_nightly, coverage(off))]
#[cfg_attr(test, mutants::skip)]
impl OutputFacade {
    pub(crate) const fn target() -> Self {
        Self::Target(&BUILD_TARGET_OUTPUT)
    }

    #[cfg(test)]
    pub(crate) fn from_mock(mock: MockOutput) -> Self {
        Self::Mock(Arc::new(mock))
    }
}

// Facade types are trivial pass-through layers - not worth testing.
#[cfg_attr(coverage_nightly, coverage(off))]
#[cfg_attr(test, mutants::skip)]
impl Output for OutputFacade {
    fn write_console(&self, text: &str) {
        match self {
            Self::Target(output) => output.write_console(text),
            #[cfg(test)]
            Self::Mock(mock) => mock.write_console(text),
        }
    }

    fn overwrite_file(&self, path: &Path, text: &str) -> io::Result<()> {
        match self {
            Self::Target(output) => output.overwrite_file(path, text),
            #[cfg(test)]
            Self::Mock(mock) => mock.overwrite_file(path, text),
        }
    }
}

// Debug implementations have no API contract to test.
#[cfg_attr(coverage_nightly, coverage(off))]
#[cfg_attr(test, mutants::skip)]
impl std::fmt::Debug for OutputFacade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Target(_) => f.debug_struct("OutputFacade::Target").finish(),
            #[cfg(test)]
            Self::Mock(_) => f.debug_struct("OutputFacade::Mock").finish(),
        }
    }
}
