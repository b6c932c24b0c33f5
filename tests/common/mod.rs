#![allow(dead_code, unused_imports)]

pub use terrapolice_test_utils::builders::ConfigFileBuilder;
pub use terrapolice_test_utils::capture::{BrokenWriter, SharedBuffer};
pub use terrapolice_test_utils::fake_runner::{FakeRunner, Script};
pub use terrapolice_test_utils::recording_notifier::RecordingNotifier;
pub use terrapolice_test_utils::{init_tracing, with_timeout};

#[cfg(unix)]
pub use terrapolice_test_utils::fake_project::{FAKE_TOOL, FakeProject};
