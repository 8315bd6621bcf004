/// Join `rel` onto the absolute container path `base` and normalize the result.
///
/// Absolute `rel` values replace `base`. `.` segments are dropped and `..`
/// never climbs above `/`.
pub fn join_container_path(base: &str, rel: &str) -> String {
  let mut parts: Vec<&str> = Vec::new();
  let start = if rel.starts_with('/') { "" } else { base };

  for segment in start.split('/').chain(rel.split('/')) {
    match segment {
      "" | "." => {}
      ".." => {
        parts.pop();
      }
      other => parts.push(other),
    }
  }

  format!("/{}", parts.join("/"))
}
