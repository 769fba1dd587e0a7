/// Element types that can be captured by value into tile kernels.
///
/// Every element is trivially copyable and can be shared between the tiles of a launch.
pub trait Element: Copy + Send + Sync + 'static {}

impl<T: Copy + Send + Sync + 'static> Element for T {}
