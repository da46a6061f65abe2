use tinyfit_core::TinyfitError;

/// Represents a dataset that can be accessed by index.
///
/// A dataset is a collection of items, where each item can be a single tensor,
/// a pair of tensors (features, label), or any other type.
pub trait Dataset {
    /// The type of a single item returned by the dataset.
    type Item;

    /// Returns the item at the given index.
    ///
    /// # Errors
    ///
    /// Returns `TinyfitError::IndexOutOfBounds` if `index >= self.len()`, or
    /// any error raised while building the item.
    fn get(&self, index: usize) -> Result<Self::Item, TinyfitError>;

    /// Returns the total number of items in the dataset.
    fn len(&self) -> usize;

    /// Checks if the dataset is empty.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
