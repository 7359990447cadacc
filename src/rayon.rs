//! Parallel batch checks.
//!
//! Inspection runs share no mutable state, so independent files can be
//! checked concurrently. Each rayon worker opens its own file and drives
//! its own engine run through the shared [`Inspector`].

use std::path::Path;

use ::rayon::iter::{IntoParallelIterator, ParallelIterator};

use crate::engine::InspectionEngine;
use crate::error::CheckError;
use crate::inspector::Inspector;
use crate::report::ReportCollection;

impl<E: InspectionEngine + Sync> Inspector<E> {
    /// Check several files on rayon's global thread pool.
    ///
    /// Same contract as [`check_paths`](Inspector::check_paths): one result
    /// per input, in input order, each failing independently.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use mediacheck::Inspector;
    ///
    /// let results = Inspector::new().check_paths_parallel(&["a.mp4", "b.mkv"], true);
    /// for result in &results {
    ///     match result {
    ///         Ok(collection) => print!("{collection}"),
    ///         Err(error) => eprintln!("{error}"),
    ///     }
    /// }
    /// ```
    pub fn check_paths_parallel<P: AsRef<Path> + Sync>(
        &self,
        paths: &[P],
        expect_video: bool,
    ) -> Vec<Result<ReportCollection, CheckError>> {
        log::debug!("Checking {} file(s) in parallel", paths.len());
        paths
            .into_par_iter()
            .map(|path| self.check_path(path, expect_video))
            .collect()
    }
}
