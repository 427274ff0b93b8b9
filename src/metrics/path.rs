// ─── Endpoint path normalization ─────────────────────────────────

/// Collapses a raw request path into its route template so that requests
/// to different resource instances aggregate under one endpoint key:
///
///   /sessions/42/summary?verbose=1  →  /sessions/:id/summary
///
/// The query string is stripped first, then every `/`-separated segment
/// made up entirely of ASCII digits is replaced with the `:id` placeholder.
pub fn normalize_path(path: &str) -> String {
    let path = match path.find('?') {
        Some(idx) => &path[..idx],
        None => path,
    };

    path.split('/')
        .map(|segment| {
            if !segment.is_empty() && segment.bytes().all(|b| b.is_ascii_digit()) {
                ":id"
            } else {
                segment
            }
        })
        .collect::<Vec<_>>()
        .join("/")
}
