//! Test support utilities for passport-qa.
//!
//! Provides synthetic portraits, analysis builders and mocks for every port.
//!
//! # Example
//!
//! ```
//! use passport_qa_test_support::{MockImageSource, SyntheticPortraitBuilder};
//!
//! let clean = SyntheticPortraitBuilder::new().build();
//! let haloed = SyntheticPortraitBuilder::new()
//!     .background(211, 211, 211)
//!     .with_halo()
//!     .build();
//!
//! let source = MockImageSource::new(vec![clean.info, haloed.info]);
//! ```

mod builders;
mod mocks;

pub use builders::{AnalysisBuilder, SyntheticPortrait, SyntheticPortraitBuilder};
pub use mocks::{
    MockExportSink, MockFaceProvider, MockImageSource, MockProgressSink, MockResultOutput,
};
