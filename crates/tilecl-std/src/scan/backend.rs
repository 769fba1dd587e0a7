use thiserror::Error;
use tilecl_runtime::{ComputeClient, Element};

/// Errors reported by a [ScanBackend].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScanError {
    /// A vendor library rejected the scan.
    #[error("The scan backend failed with status {status}\nCaused by:\n  {message}")]
    Vendor {
        /// The status code returned by the library.
        status: i32,
        /// The message describing the status.
        message: String,
    },

    /// The output can't hold the scanned input.
    #[error("The output has {output} elements but the input has {input}")]
    LengthMismatch {
        /// Number of elements in the input.
        input: usize,
        /// Number of elements in the output.
        output: usize,
    },

    /// The head flags don't match the input of a segmented scan.
    #[error("The input has {input} elements but {heads} head flags")]
    HeadsMismatch {
        /// Number of elements in the input.
        input: usize,
        /// Number of head flags.
        heads: usize,
    },
}

/// Scan entry points provided by an execution backend.
///
/// [TiledScan] runs the tiled scans of this crate. Other implementations can delegate to a vendor
/// library, reporting its failures as [ScanError::Vendor].
pub trait ScanBackend {
    /// Inclusive scan of `input` into `output`.
    fn inclusive_scan<T, F>(&self, input: &[T], output: &mut [T], op: F) -> Result<(), ScanError>
    where
        T: Element,
        F: Fn(T, T) -> T + Sync;

    /// Exclusive scan of `input` into `output`, starting from `init`.
    fn exclusive_scan<T, F>(
        &self,
        input: &[T],
        output: &mut [T],
        init: T,
        op: F,
    ) -> Result<(), ScanError>
    where
        T: Element,
        F: Fn(T, T) -> T + Sync;

    /// Inclusive scan of `input` into `output`, restarting at every head flag.
    fn segmented_inclusive_scan<T, F>(
        &self,
        input: &[T],
        heads: &[bool],
        output: &mut [T],
        op: F,
    ) -> Result<(), ScanError>
    where
        T: Element,
        F: Fn(T, T) -> T + Sync;
}

/// Scan backend running the tiled scans on a compute client.
#[derive(new, Debug, Clone, Copy)]
pub struct TiledScan<'a> {
    client: &'a ComputeClient,
}

impl TiledScan<'_> {
    fn check_output(input: usize, output: usize) -> Result<(), ScanError> {
        match output == input {
            true => Ok(()),
            false => Err(ScanError::LengthMismatch { input, output }),
        }
    }
}

impl ScanBackend for TiledScan<'_> {
    fn inclusive_scan<T, F>(&self, input: &[T], output: &mut [T], op: F) -> Result<(), ScanError>
    where
        T: Element,
        F: Fn(T, T) -> T + Sync,
    {
        Self::check_output(input.len(), output.len())?;
        super::inclusive_scan(self.client, input, output, op);
        Ok(())
    }

    fn exclusive_scan<T, F>(
        &self,
        input: &[T],
        output: &mut [T],
        init: T,
        op: F,
    ) -> Result<(), ScanError>
    where
        T: Element,
        F: Fn(T, T) -> T + Sync,
    {
        Self::check_output(input.len(), output.len())?;
        super::exclusive_scan(self.client, input, output, init, op);
        Ok(())
    }

    fn segmented_inclusive_scan<T, F>(
        &self,
        input: &[T],
        heads: &[bool],
        output: &mut [T],
        op: F,
    ) -> Result<(), ScanError>
    where
        T: Element,
        F: Fn(T, T) -> T + Sync,
    {
        Self::check_output(input.len(), output.len())?;
        if heads.len() != input.len() {
            return Err(ScanError::HeadsMismatch {
                input: input.len(),
                heads: heads.len(),
            });
        }
        super::segmented_inclusive_scan(self.client, input, heads, output, op);
        Ok(())
    }
}
