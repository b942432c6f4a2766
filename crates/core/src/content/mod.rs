//! Page content model.
//!
//! One document per site. Stored documents are merged onto the built-in
//! defaults when loaded ([`merge_stored`]) and coerced into the exact shape
//! before they are written ([`sanitize`]).

mod merge;
mod model;
mod sanitize;

pub use merge::merge_stored;
pub use model::*;
pub use sanitize::sanitize;

/// Default ceiling for a serialized content document, in bytes.
///
/// Kept under the 1 MiB limit common to hosted document stores.
pub const MAX_DOCUMENT_BYTES: usize = 900_000;

/// A content document is too large to store.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error(
    "content is {size} bytes, over the {limit} byte limit; \
     use hosted image URLs instead of uploading or embedding images"
)]
pub struct DocumentTooLarge {
    pub size: usize,
    pub limit: usize,
}

/// Size of the document as it will be written.
#[must_use]
pub fn serialized_size(content: &PageContent) -> usize {
    serde_json::to_vec(content).map_or(usize::MAX, |bytes| bytes.len())
}

/// Check a document against a size ceiling.
///
/// # Errors
///
/// Returns [`DocumentTooLarge`] when the serialized document exceeds `limit`.
pub fn check_size(content: &PageContent, limit: usize) -> Result<usize, DocumentTooLarge> {
    let size = serialized_size(content);
    if size > limit {
        return Err(DocumentTooLarge { size, limit });
    }
    Ok(size)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_check_size() {
        let mut content = PageContent::defaults();
        assert!(check_size(&content, MAX_DOCUMENT_BYTES).is_ok());

        content.side_image_url = format!("data:image/png;base64,{}", "A".repeat(MAX_DOCUMENT_BYTES));
        let err = check_size(&content, MAX_DOCUMENT_BYTES).unwrap_err();
        assert_eq!(err.limit, MAX_DOCUMENT_BYTES);
        assert!(err.size > MAX_DOCUMENT_BYTES);
        assert!(err.to_string().contains("hosted image URLs"));
    }
}
