//! Development server with live reload support.
//!
//! Built on `tiny_http`:
//!
//! - Static file serving from `public/`
//! - Automatic `index.html` resolution for directories
//! - `/live-reload` polling endpoint backed by [`BuildClock`]
//! - Reload script injected into served HTML documents
//! - File watching and auto-rebuild (via `watch` module)
//! - Graceful shutdown on Ctrl+C
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────┐     ┌──────────────────┐
//! │   Main Thread   │     │  Watcher Thread  │
//! │  (HTTP Server)  │     │  (File Monitor)  │
//! └────────┬────────┘     └────────┬─────────┘
//!          │                       │
//!    GET /live-reload        rebuild on change
//!    read BuildClock ◀────── BuildClock::mark()
//!          │                       │
//!          └────── public/ ◀───────┘
//! ```

use crate::{
    build::build_site,
    config::{ServeOptions, SitePaths, paths::INDEX_FILE},
    log,
    watch::{BuildClock, spawn_watcher},
};
use anyhow::{Context, Result, anyhow};
use std::{
    borrow::Cow,
    fs,
    io::Cursor,
    net::{IpAddr, SocketAddr},
    path::{Component, Path, PathBuf},
    sync::Arc,
};
use tiny_http::{Header, Request, Response, Server, StatusCode};

/// Reload script appended to HTML documents (embedded at compile time)
const LIVE_RELOAD_SCRIPT: &str = include_str!("embed/live_reload.html");
const BUILD_STAMP_SLOT: &str = "{build_stamp}";

/// Polling endpoint used by the reload script.
pub const LIVE_RELOAD_PATH: &str = "/live-reload";

/// Try binding to port, retry with incremented port if in use
const MAX_PORT_RETRIES: u16 = 10;

// ============================================================================
// Server Entry Point
// ============================================================================

/// Build the site, then serve it until Ctrl+C.
///
/// With `options.watch` the sources are watched and rebuilt in the
/// background; open pages reload after each successful rebuild.
pub fn serve_site(paths: &SitePaths, options: &ServeOptions) -> Result<()> {
    let summary = build_site(paths).context("failed to build site")?;
    let clock = BuildClock::new();

    let interface: IpAddr = options
        .interface
        .parse()
        .with_context(|| format!("Invalid interface address `{}`", options.interface))?;
    let (server, addr) = try_bind_port(interface, options.port, MAX_PORT_RETRIES)?;
    let server = Arc::new(server);

    let server_for_signal = Arc::clone(&server);
    ctrlc::set_handler(move || {
        log!("serve"; "shutting down...");
        server_for_signal.unblock();
    })
    .context("Failed to set Ctrl+C handler")?;

    let watcher = if options.watch {
        Some(spawn_watcher(paths.clone(), clock.clone())?)
    } else {
        None
    };

    log!("serve"; "{} posts, {} pages at http://{addr}", summary.posts, summary.pages);
    log!("serve"; "press Ctrl+C to stop");

    let root = paths.output_dir();
    for request in server.incoming_requests() {
        if let Err(e) = handle_request(request, &root, &clock) {
            log!("serve"; "request error: {e}");
        }
    }

    if let Some(watcher) = watcher {
        watcher.stop();
    }
    Ok(())
}

/// Try to bind to a port, retrying with incremented port numbers if in use.
fn try_bind_port(interface: IpAddr, base_port: u16, max_retries: u16) -> Result<(Server, SocketAddr)> {
    let mut last_error = None;

    for offset in 0..max_retries {
        let port = base_port.saturating_add(offset);
        let addr = SocketAddr::new(interface, port);

        match Server::http(addr) {
            Ok(server) => {
                if offset > 0 {
                    log!("serve"; "port {} in use, using {} instead", base_port, port);
                }
                return Ok((server, addr));
            }
            Err(e) => last_error = Some(e),
        }
    }

    Err(anyhow!(
        "Failed to bind after {} attempts (ports {}-{}): {}",
        max_retries,
        base_port,
        base_port.saturating_add(max_retries.saturating_sub(1)),
        last_error.map(|e| e.to_string()).unwrap_or_default()
    ))
}

// ============================================================================
// Request Handling
// ============================================================================

/// Handle a single HTTP request.
///
/// Resolution order:
/// 1. `/live-reload` → last build timestamp
/// 2. Exact file match → serve file
/// 3. Directory with index.html → serve index.html
/// 4. Nothing found, or a path leaving `public/` → 404
fn handle_request(request: Request, root: &Path, clock: &BuildClock) -> Result<()> {
    let url = request.url().to_owned();
    let path_without_query = url.split('?').next().unwrap_or(&url);

    if path_without_query == LIVE_RELOAD_PATH {
        return serve_build_time(request, clock);
    }

    match resolve_path(root, path_without_query) {
        Some(path) => serve_file(request, &path, clock.millis()),
        None => serve_not_found(request),
    }
}

/// Map a request path to a file under `root`.
///
/// The path is percent-decoded; `..` and absolute components are rejected.
fn resolve_path(root: &Path, url_path: &str) -> Option<PathBuf> {
    let decoded = urlencoding::decode(url_path).ok()?;
    let relative = Path::new(decoded.trim_start_matches('/'));

    if relative
        .components()
        .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir))
    {
        return None;
    }

    let local = root.join(relative);
    if local.is_file() {
        return Some(local);
    }
    let index = local.join(INDEX_FILE);
    index.is_file().then_some(index)
}

// ============================================================================
// Response Helpers
// ============================================================================

/// Header from static ASCII parts.
fn header(name: &'static str, value: &'static str) -> Header {
    Header::from_bytes(name, value).expect("static header is valid ASCII")
}

/// Serve a file with appropriate content type, injecting the reload script
/// stamped with `build_stamp` into HTML documents.
fn serve_file(request: Request, path: &Path, build_stamp: u64) -> Result<()> {
    let content = fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let content_type = guess_content_type(path);

    let body = if content_type.starts_with("text/html") {
        match String::from_utf8(content) {
            Ok(html) => inject_live_reload(&html, build_stamp).into_owned().into_bytes(),
            Err(err) => err.into_bytes(),
        }
    } else {
        content
    };

    let response = Response::from_data(body).with_header(header("Content-Type", content_type));
    request.respond(response)?;
    Ok(())
}

/// Respond with the last build time as plain text, never cached.
fn serve_build_time(request: Request, clock: &BuildClock) -> Result<()> {
    let response = Response::from_string(clock.millis().to_string())
        .with_header(header("Content-Type", "text/plain; charset=utf-8"))
        .with_header(header("Cache-Control", "no-cache, no-store, must-revalidate"));
    request.respond(response)?;
    Ok(())
}

/// Serve 404 Not Found response.
fn serve_not_found(request: Request) -> Result<()> {
    let response = Response::new(
        StatusCode(404),
        vec![header("Content-Type", "text/plain")],
        Cursor::new("404 Not Found"),
        Some(13),
        None,
    );
    request.respond(response)?;
    Ok(())
}

// ============================================================================
// Live Reload Injection
// ============================================================================

/// Insert the reload script before the last `</body>` (or `</BODY>`), or
/// append it when there is none. Content that is not an HTML document is
/// returned untouched.
///
/// The script reloads the page as soon as `/live-reload` reports a stamp
/// other than `build_stamp`, the build the page was served from.
pub fn inject_live_reload(html: &str, build_stamp: u64) -> Cow<'_, str> {
    if !html.contains("<html") && !html.contains("<HTML") {
        return Cow::Borrowed(html);
    }

    let script = LIVE_RELOAD_SCRIPT.replace(BUILD_STAMP_SLOT, &build_stamp.to_string());
    let at = html.rfind("</body>").or_else(|| html.rfind("</BODY>"));
    let mut out = String::with_capacity(html.len() + script.len());
    match at {
        Some(i) => {
            out.push_str(&html[..i]);
            out.push_str(&script);
            out.push_str(&html[i..]);
        }
        None => {
            out.push_str(html);
            out.push_str(&script);
        }
    }
    Cow::Owned(out)
}

// ============================================================================
// Content Type Detection
// ============================================================================

/// Guess MIME content type from file extension.
///
/// Returns `application/octet-stream` for unknown extensions.
fn guess_content_type(path: &Path) -> &'static str {
    match path.extension().and_then(|e| e.to_str()) {
        // Web content
        Some("html" | "htm") => "text/html; charset=utf-8",
        Some("css") => "text/css; charset=utf-8",
        Some("js" | "mjs") => "application/javascript; charset=utf-8",
        Some("json") => "application/json; charset=utf-8",
        Some("xml") => "application/rss+xml; charset=utf-8",

        // Images
        Some("svg") => "image/svg+xml",
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("ico") => "image/x-icon",

        // Fonts
        Some("woff") => "font/woff",
        Some("woff2") => "font/woff2",
        Some("ttf") => "font/ttf",
        Some("otf") => "font/otf",

        Some("txt") => "text/plain; charset=utf-8",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_inject_before_last_body() {
        let html = "<html><body><p>x</p></body></html>";
        let out = inject_live_reload(html, 7);

        let script = out.find("<script>").unwrap();
        let close = out.rfind("</body>").unwrap();
        assert!(script < close);
        assert!(out.ends_with("</body></html>"));
        assert!(out.contains("/live-reload"));
    }

    #[test]
    fn test_inject_uppercase_body() {
        let out = inject_live_reload("<HTML><BODY>x</BODY></HTML>", 7);
        assert!(out.find("<script>").unwrap() < out.find("</BODY>").unwrap());
    }

    #[test]
    fn test_inject_appends_without_body_close() {
        let out = inject_live_reload("<html><p>no close", 7);
        assert!(out.starts_with("<html><p>no close"));
        assert!(out.trim_end().ends_with("</script>"));
    }

    #[test]
    fn test_injected_script_carries_build_stamp() {
        let out = inject_live_reload("<html><body></body></html>", 1_700_000_000_123);
        assert!(out.contains("const seen = \"1700000000123\";"));
        assert!(!out.contains(BUILD_STAMP_SLOT));
        // the first poll already compares against the served build
        assert!(!out.contains("null"));
    }

    #[test]
    fn test_fragments_untouched() {
        let fragment = "<p>just a fragment</p></body>";
        assert!(matches!(inject_live_reload(fragment, 7), Cow::Borrowed(_)));
    }

    #[test]
    fn test_resolve_path() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("posts")).unwrap();
        fs::write(root.join("index.html"), "i").unwrap();
        fs::write(root.join("posts/First Steps.html"), "p").unwrap();

        assert_eq!(resolve_path(root, "/"), Some(root.join("index.html")));
        assert_eq!(
            resolve_path(root, "/posts/First%20Steps.html"),
            Some(root.join("posts/First Steps.html"))
        );
        assert_eq!(resolve_path(root, "/missing.html"), None);
        assert_eq!(resolve_path(root, "/posts"), None);
    }

    #[test]
    fn test_resolve_path_rejects_escape() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("public");
        fs::create_dir_all(&root).unwrap();
        fs::write(dir.path().join("bazel.toml"), "secret").unwrap();

        assert_eq!(resolve_path(&root, "/../bazel.toml"), None);
        assert_eq!(resolve_path(&root, "/%2e%2e/bazel.toml"), None);
    }

    #[test]
    fn test_guess_content_type() {
        assert_eq!(guess_content_type(Path::new("a.html")), "text/html; charset=utf-8");
        assert_eq!(guess_content_type(Path::new("style.css")), "text/css; charset=utf-8");
        assert_eq!(guess_content_type(Path::new("feed.xml")), "application/rss+xml; charset=utf-8");
        assert_eq!(guess_content_type(Path::new("blob")), "application/octet-stream");
    }

    #[test]
    fn test_live_reload_endpoint() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("index.html"), "<html><body>hi</body></html>").unwrap();

        let server = Server::http("127.0.0.1:0").unwrap();
        let port = server.server_addr().to_ip().unwrap().port();
        let clock = BuildClock::new();
        let stamp = clock.millis();

        let client = std::thread::spawn(move || {
            use std::io::{Read, Write};
            let get = |path: &str| {
                let mut stream = std::net::TcpStream::connect(("127.0.0.1", port)).unwrap();
                write!(stream, "GET {path} HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n").unwrap();
                let mut response = String::new();
                stream.read_to_string(&mut response).unwrap();
                response
            };
            (get("/live-reload?123"), get("/"), get("/nope"))
        });

        for _ in 0..3 {
            let request = server.recv().unwrap();
            handle_request(request, dir.path(), &clock).unwrap();
        }
        let (reload, index, missing) = client.join().unwrap();

        assert!(reload.ends_with(&stamp.to_string()));
        assert!(reload.contains("no-cache, no-store, must-revalidate"));
        assert!(index.contains("<script>"));
        assert!(index.contains(&format!("const seen = \"{stamp}\";")));
        assert!(missing.starts_with("HTTP/1.1 404"));
    }
}
