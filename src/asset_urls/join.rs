use percent_encoding::percent_decode_str;
use url::{Position, Url};

/// Origin used to resolve references against bases that carry no scheme or host.
const PLACEHOLDER_ORIGIN: &str = "http://placeholder.invalid";

/// Resolve `reference` against `base` following RFC 3986 reference resolution.
///
/// Bases may be absolute URLs (`http://localhost:3000`) or bare paths (`/static/`,
/// `static/`). A base without a trailing slash has its last segment replaced, a
/// reference starting with `/` replaces the whole path, and absolute references are
/// returned as-is. Path-only bases produce path-only results.
///
/// Characters are never percent-encoded: a file name containing spaces or non-ASCII
/// text comes back exactly as it went in.
pub fn join_url(base: &str, reference: &str) -> String {
  if base.is_empty() {
    return reference.to_string();
  }
  if reference.is_empty() {
    return base.to_string();
  }

  // `%` is escaped up front so decoding the result restores existing escapes verbatim.
  let escaped_base = escape_percent(base);
  let escaped_reference = escape_percent(reference);

  if let Ok(absolute) = Url::parse(&escaped_base) {
    return match absolute.join(&escaped_reference) {
      Ok(joined) => render(&joined, true),
      Err(_) => reference.to_string(),
    };
  }

  let rooted = base.starts_with('/');
  let anchor = if rooted {
    format!("{PLACEHOLDER_ORIGIN}{escaped_base}")
  } else {
    format!("{PLACEHOLDER_ORIGIN}/{escaped_base}")
  };
  let Ok(anchor) = Url::parse(&anchor) else {
    return naive_join(base, reference);
  };
  let Ok(joined) = anchor.join(&escaped_reference) else {
    return naive_join(base, reference);
  };

  if joined.origin() != anchor.origin() {
    return render(&joined, true);
  }

  let mut resolved = render(&joined, false);
  if !rooted && !reference.starts_with('/') {
    resolved.remove(0);
  }
  resolved
}

/// Rebuild a joined URL with its path, query and fragment decoded.
fn render(joined: &Url, with_origin: bool) -> String {
  let mut out = if with_origin {
    joined[..Position::BeforePath].to_string()
  } else {
    String::new()
  };
  out.push_str(&decode(joined.path()));
  if let Some(query) = joined.query() {
    out.push('?');
    out.push_str(&decode(query));
  }
  if let Some(fragment) = joined.fragment() {
    out.push('#');
    out.push_str(&decode(fragment));
  }
  out
}

fn decode(component: &str) -> String {
  percent_decode_str(component).decode_utf8_lossy().into_owned()
}

fn escape_percent(raw: &str) -> String {
  raw.replace('%', "%25")
}

fn naive_join(base: &str, reference: &str) -> String {
  format!(
    "{}/{}",
    base.trim_end_matches('/'),
    reference.trim_start_matches('/')
  )
}
