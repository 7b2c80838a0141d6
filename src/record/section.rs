/// Section of a request path: everything before the second `/`
///
/// `/pages/create` maps to `/pages`. Paths with fewer than two slashes map
/// to `/`.
#[must_use]
pub fn section_key(path: &str) -> &str {
    let mut slashes = path.match_indices('/').map(|(i, _)| i);
    match (slashes.next(), slashes.next()) {
        (Some(_), Some(second)) => &path[..second],
        _ => "/",
    }
}
