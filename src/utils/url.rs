// src/utils/url.rs

//! URL building utilities.

use url::Url;

use crate::error::{AppError, Result};

/// Append `segment` to the path of `base` and attach query parameters.
///
/// # Examples
/// ```
/// use photo_crawler::utils::url::endpoint;
///
/// let url = endpoint("https://api.inaturalist.org/v1", "taxa", &[("q", "Esox lucius")]).unwrap();
/// assert_eq!(url.as_str(), "https://api.inaturalist.org/v1/taxa?q=Esox+lucius");
/// ```
pub fn endpoint(base: &str, segment: &str, params: &[(&str, &str)]) -> Result<Url> {
    let mut url = Url::parse(base)?;
    url.path_segments_mut()
        .map_err(|_| AppError::config(format!("Base URL cannot carry a path: {base}")))?
        .pop_if_empty()
        .push(segment);

    if !params.is_empty() {
        url.query_pairs_mut().extend_pairs(params);
    }
    Ok(url)
}

/// Swap the size token of a photo URL by literal substring replacement.
///
/// URLs that do not contain `from` come back unchanged.
///
/// # Examples
/// ```
/// use photo_crawler::utils::url::resize_photo_url;
///
/// assert_eq!(
///     resize_photo_url("https://static.example.org/photos/1/square.jpg", "square", "large"),
///     "https://static.example.org/photos/1/large.jpg"
/// );
/// ```
pub fn resize_photo_url(url: &str, from: &str, to: &str) -> String {
    url.replace(from, to)
}
