//! Release text transforms
//!
//! The rewrites applied when turning a development frontend into a
//! release build: pointing linked tables at the production server and
//! share, and silencing debug output in modules.

use crate::config::ReleaseConfig;

/// Swap the test server name for the production one in a connect string.
///
/// A no-op when either name is unconfigured, so partially filled
/// configurations never mangle connect strings.
pub fn swap_server(connect: &str, test_server: &str, prod_server: &str) -> String {
    if test_server.is_empty() || prod_server.is_empty() {
        return connect.to_string();
    }
    connect.replace(test_server, prod_server)
}

/// Swap a path prefix in a connect string, for file-backed links.
pub fn swap_link_prefix(connect: &str, old_prefix: &str, new_prefix: &str) -> String {
    if old_prefix.is_empty() {
        return connect.to_string();
    }
    connect.replace(old_prefix, new_prefix)
}

/// Apply every configured connect-string rewrite.
pub fn rewrite_connect(connect: &str, release: &ReleaseConfig) -> String {
    let connect = swap_server(connect, &release.test_server, &release.prod_server);
    swap_link_prefix(&connect, &release.old_link_prefix, &release.new_link_prefix)
}

/// Comment out every active `Debug.Print` statement in a module.
///
/// Indentation and line endings are preserved; lines already commented
/// are left alone. Returns the rewritten text and how many lines were
/// touched.
pub fn comment_debug_prints(text: &str) -> (String, usize) {
    let mut out = String::with_capacity(text.len() + 16);
    let mut commented = 0;

    for line in text.split_inclusive('\n') {
        let body = line.strip_suffix('\n').unwrap_or(line);
        let body = body.strip_suffix('\r').unwrap_or(body);
        let trimmed = body.trim_start();

        if trimmed.starts_with("Debug.Print") {
            let indent = &body[..body.len() - trimmed.len()];
            out.push_str(indent);
            out.push('\'');
            out.push_str(trimmed);
            out.push_str(&line[body.len()..]);
            commented += 1;
        } else {
            out.push_str(line);
        }
    }

    (out, commented)
}
